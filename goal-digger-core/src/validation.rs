//! Credential and profile form checks, run before the auth backend is contacted.
//!
//! All failing rules are reported together, joined with ", ".

use crate::errors::{SyncError, SyncResult};
use regex::Regex;
use std::sync::LazyLock;

static EMAIL: LazyLock<Result<Regex, regex::Error>> =
    LazyLock::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$"));
static DISPLAY_NAME: LazyLock<Result<Regex, regex::Error>> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9 ]+$"));

const PASSWORD_MIN: usize = 6;
const PASSWORD_MAX: usize = 32;
const DISPLAY_NAME_MIN: usize = 2;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SignUpForm {
    pub display_name: String,
    pub email: String,
    pub password: String,
}

/// Profile edits. Blank fields mean "leave unchanged".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileForm {
    pub display_name: String,
    pub password: String,
    pub confirm_password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }

    pub fn validate(&self) -> SyncResult<()> {
        let mut issues = Vec::new();
        if !is_match(&EMAIL, &self.email) {
            issues.push("Invalid email address".to_string());
        }
        if self.password.chars().count() < PASSWORD_MIN {
            issues.push("Password must be at least 6 characters long".to_string());
        }
        finish(issues)
    }
}

impl SignUpForm {
    pub fn validate(&self) -> SyncResult<()> {
        let mut issues = Vec::new();
        if self.display_name.chars().count() < DISPLAY_NAME_MIN {
            issues.push("Display name must be at least 2 characters long".to_string());
        }
        if !is_match(&DISPLAY_NAME, &self.display_name) {
            issues.push(
                "Display name can only contain letters, numbers, and spaces".to_string(),
            );
        }
        if !is_match(&EMAIL, &self.email) {
            issues.push("Invalid email address".to_string());
        }
        issues.extend(password_issues(&self.password, "Password"));
        finish(issues)
    }
}

impl ProfileForm {
    pub fn validate(&self) -> SyncResult<()> {
        let mut issues = Vec::new();
        if !self.display_name.is_empty() && self.display_name.chars().count() < DISPLAY_NAME_MIN {
            issues.push("Display name is required, min 2 char".to_string());
        }
        if !self.password.is_empty() {
            issues.extend(password_issues(&self.password, "Password"));
        }
        if !self.confirm_password.is_empty() {
            issues.extend(password_issues(&self.confirm_password, "Confirm password"));
        }
        if !self.password.is_empty() && self.password != self.confirm_password {
            issues.push("Passwords do not match".to_string());
        }
        finish(issues)
    }
}

/// 6-32 characters with at least one lowercase, one uppercase letter and one digit.
pub fn is_strong_password(password: &str) -> bool {
    let len = password.chars().count();
    (PASSWORD_MIN..=PASSWORD_MAX).contains(&len)
        && password.chars().any(|c| c.is_ascii_lowercase())
        && password.chars().any(|c| c.is_ascii_uppercase())
        && password.chars().any(|c| c.is_ascii_digit())
}

fn password_issues(password: &str, label: &str) -> Vec<String> {
    let len = password.chars().count();
    let mut issues = Vec::new();
    if len < PASSWORD_MIN {
        issues.push(format!("{} must be at least 6 characters long", label));
    }
    if len > PASSWORD_MAX {
        issues.push(format!("{} must be at most 32 characters long", label));
    }
    if !is_strong_password(password) {
        issues.push(format!(
            "{} must be 6-32 characters long, contain lowercase, uppercase letters and digits",
            label
        ));
    }
    issues
}

fn is_match(pattern: &LazyLock<Result<Regex, regex::Error>>, value: &str) -> bool {
    match pattern.as_ref() {
        Ok(re) => re.is_match(value),
        Err(e) => {
            tracing::error!("Invalid validation pattern: {}", e);
            false
        }
    }
}

fn finish(issues: Vec<String>) -> SyncResult<()> {
    if issues.is_empty() {
        Ok(())
    } else {
        Err(SyncError::Validation(issues.join(", ")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_in_rules() {
        assert!(Credentials::new("ada@example.com", "secret").validate().is_ok());

        let err = Credentials::new("not-an-email", "123").validate().unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid email address, Password must be at least 6 characters long"
        );
    }

    #[test]
    fn test_sign_up_rules() {
        let form = SignUpForm {
            display_name: "Ada L".into(),
            email: "ada@example.com".into(),
            password: "Secret1".into(),
        };
        assert!(form.validate().is_ok());

        let weak = SignUpForm {
            password: "secret".into(),
            ..form.clone()
        };
        assert!(weak.validate().is_err());

        let punctuated = SignUpForm {
            display_name: "Ada!".into(),
            ..form
        };
        let err = punctuated.validate().unwrap_err();
        assert!(err.to_string().contains("letters, numbers, and spaces"));
    }

    #[test]
    fn test_profile_rules() {
        assert!(ProfileForm::default().validate().is_ok());

        let mismatch = ProfileForm {
            display_name: String::new(),
            password: "Secret1".into(),
            confirm_password: "Secret2".into(),
        };
        assert_eq!(
            mismatch.validate().unwrap_err().to_string(),
            "Passwords do not match"
        );

        let short_name = ProfileForm {
            display_name: "A".into(),
            ..ProfileForm::default()
        };
        assert!(short_name.validate().is_err());
    }

    #[test]
    fn test_password_strength() {
        assert!(is_strong_password("Abcde1"));
        assert!(!is_strong_password("abcde1"));
        assert!(!is_strong_password("ABCDE1"));
        assert!(!is_strong_password("Abcdef"));
        assert!(!is_strong_password(&format!("Aa1{}", "x".repeat(30))));
    }
}
