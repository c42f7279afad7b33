use goal_digger_core::{SyncError, SyncResult};
use std::time::Duration;

pub const URL_VAR: &str = "GOAL_DIGGER_URL";
pub const ANON_KEY_VAR: &str = "GOAL_DIGGER_ANON_KEY";
pub const TIMEOUT_VAR: &str = "GOAL_DIGGER_TIMEOUT_SECS";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Where the hosted backend lives and how to talk to it.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// Project base URL, e.g. `https://xyz.supabase.co`.
    pub project_url: String,
    /// Public API key sent with every request.
    pub anon_key: String,
    pub request_timeout: Duration,
}

impl ClientConfig {
    pub fn new(project_url: impl Into<String>, anon_key: impl Into<String>) -> Self {
        Self {
            project_url: project_url.into().trim_end_matches('/').to_string(),
            anon_key: anon_key.into(),
            request_timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn from_env() -> SyncResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> SyncResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| SyncError::Configuration(format!("{} is not set", key)))
        };

        let project_url = required(URL_VAR)?;
        let anon_key = required(ANON_KEY_VAR)?;
        let timeout = match lookup(TIMEOUT_VAR) {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .map(Duration::from_secs)
                .map_err(|e| SyncError::Configuration(format!("{}: {}", TIMEOUT_VAR, e)))?,
            None => DEFAULT_TIMEOUT,
        };

        Ok(Self::new(project_url, anon_key).with_timeout(timeout))
    }

    pub fn rest_url(&self, collection: &str) -> String {
        format!("{}/rest/v1/{}", self.project_url, collection)
    }

    pub fn auth_url(&self, path: &str) -> String {
        format!("{}/auth/v1/{}", self.project_url, path.trim_start_matches('/'))
    }

    pub fn http_client(&self) -> SyncResult<reqwest::Client> {
        reqwest::Client::builder()
            .timeout(self.request_timeout)
            .build()
            .map_err(|e| SyncError::Configuration(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_from_lookup_defaults_timeout() {
        let config = ClientConfig::from_lookup(lookup(&[
            (URL_VAR, "https://demo.supabase.co/"),
            (ANON_KEY_VAR, "anon"),
        ]))
        .unwrap();

        assert_eq!(config.project_url, "https://demo.supabase.co");
        assert_eq!(config.request_timeout, Duration::from_secs(10));
        assert_eq!(config.rest_url("tasks"), "https://demo.supabase.co/rest/v1/tasks");
        assert_eq!(config.auth_url("/user"), "https://demo.supabase.co/auth/v1/user");
    }

    #[test]
    fn test_missing_and_malformed_values() {
        let missing = ClientConfig::from_lookup(lookup(&[(URL_VAR, "https://demo")]));
        assert_eq!(
            missing.unwrap_err(),
            SyncError::Configuration("GOAL_DIGGER_ANON_KEY is not set".into())
        );

        let bad_timeout = ClientConfig::from_lookup(lookup(&[
            (URL_VAR, "https://demo"),
            (ANON_KEY_VAR, "anon"),
            (TIMEOUT_VAR, "soon"),
        ]));
        assert!(matches!(bad_timeout, Err(SyncError::Configuration(_))));
    }
}
