//! `RemoteStore` over the hosted backend's REST interface (PostgREST query syntax).

use crate::auth::AccessToken;
use crate::config::ClientConfig;
use crate::store::RemoteStore;
use async_trait::async_trait;
use goal_digger_core::{Record, SyncError, SyncResult};
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use uuid::Uuid;

const PREFER_REPRESENTATION: &str = "return=representation";

pub struct RestStore {
    http: reqwest::Client,
    config: ClientConfig,
    token: AccessToken,
}

impl RestStore {
    /// Requests are authorized with `token` when a session is active, with the anon key otherwise.
    pub fn new(config: ClientConfig, token: AccessToken) -> SyncResult<Self> {
        Ok(Self {
            http: config.http_client()?,
            config,
            token,
        })
    }

    async fn request<R: Record>(&self, method: Method, query: &[(&str, String)]) -> RequestBuilder {
        let bearer = self
            .token
            .get()
            .await
            .unwrap_or_else(|| self.config.anon_key.clone());

        self.http
            .request(method, self.config.rest_url(R::COLLECTION.as_ref()))
            .query(query)
            .header("apikey", &self.config.anon_key)
            .bearer_auth(bearer)
    }

    fn id_filter<R: Record>(id: Uuid) -> (&'static str, String) {
        (R::ID_COLUMN, format!("eq.{}", id))
    }
}

#[async_trait]
impl RemoteStore for RestStore {
    async fn select_all<R: Record>(&self, owner: Uuid) -> SyncResult<Vec<R>> {
        let query = [
            ("select", "*".to_string()),
            ("user_id", format!("eq.{}", owner)),
            ("order", format!("created_at.{}", R::ORDER.as_query())),
        ];
        tracing::debug!("REST: select {} for {}", R::COLLECTION, owner);

        let response = self
            .request::<R>(Method::GET, &query)
            .await
            .send()
            .await
            .map_err(transport)?;
        read_json(response).await
    }

    async fn insert<R: Record>(&self, record: &R::Insert) -> SyncResult<R> {
        tracing::debug!("REST: insert into {}", R::COLLECTION);

        let response = self
            .request::<R>(Method::POST, &[("select", "*".to_string())])
            .await
            .header("Prefer", PREFER_REPRESENTATION)
            .json(&[record])
            .send()
            .await
            .map_err(transport)?;

        let mut rows: Vec<R> = read_json(response).await?;
        if rows.is_empty() {
            return Err(SyncError::remote(format!(
                "insert into {} returned no rows",
                R::COLLECTION
            )));
        }
        Ok(rows.swap_remove(0))
    }

    async fn update<R: Record>(&self, id: Uuid, patch: &R::Patch) -> SyncResult<R> {
        tracing::debug!("REST: update {} {}", R::COLLECTION, id);

        let query = [Self::id_filter::<R>(id), ("select", "*".to_string())];
        let response = self
            .request::<R>(Method::PATCH, &query)
            .await
            .header("Prefer", PREFER_REPRESENTATION)
            .json(patch)
            .send()
            .await
            .map_err(transport)?;

        let mut rows: Vec<R> = read_json(response).await?;
        if rows.is_empty() {
            return Err(SyncError::NotFound(id));
        }
        Ok(rows.swap_remove(0))
    }

    async fn delete<R: Record>(&self, id: Uuid) -> SyncResult<()> {
        tracing::debug!("REST: delete {} {}", R::COLLECTION, id);

        let response = self
            .request::<R>(Method::DELETE, &[Self::id_filter::<R>(id)])
            .await
            .send()
            .await
            .map_err(transport)?;
        expect_success(response).await
    }
}

pub(crate) fn transport(err: reqwest::Error) -> SyncError {
    SyncError::Remote(err.to_string())
}

pub(crate) async fn read_json<T: DeserializeOwned>(response: Response) -> SyncResult<T> {
    let status = response.status();
    let body = response.text().await.map_err(transport)?;
    if !status.is_success() {
        return Err(SyncError::Remote(error_message(status, &body)));
    }
    Ok(serde_json::from_str(&body)?)
}

pub(crate) async fn expect_success(response: Response) -> SyncResult<()> {
    let status = response.status();
    if status.is_success() {
        return Ok(());
    }
    let body = response.text().await.map_err(transport)?;
    Err(SyncError::Remote(error_message(status, &body)))
}

/// The backend's own error text if the body carries one, else the HTTP status.
pub(crate) fn error_message(status: StatusCode, body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return format!("HTTP {}", status);
    }

    if let Ok(value) = serde_json::from_str::<serde_json::Value>(trimmed) {
        for key in ["message", "msg", "error_description", "error"] {
            if let Some(text) = value.get(key).and_then(|v| v.as_str()) {
                return text.to_string();
            }
        }
    }
    trimmed.to_string()
}
