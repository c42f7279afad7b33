//! Authentication collaborator.
//!
//! The controllers only need to know who the current user is. Signing up,
//! signing in and editing the account go through the hosted auth service
//! (`RestAuth`), which also owns the access token the REST store authorizes with.

use crate::config::ClientConfig;
use crate::rest::{expect_success, read_json, transport};
use async_trait::async_trait;
use goal_digger_core::validation::{Credentials, SignUpForm};
use goal_digger_core::{SyncError, SyncResult, User, UserAttributes};
use reqwest::StatusCode;
use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::RwLock;

#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// The signed-in user, or `None` when there is no valid session.
    async fn current_user(&self) -> SyncResult<Option<User>>;

    async fn update_user(&self, attributes: &UserAttributes) -> SyncResult<User>;

    async fn sign_out(&self) -> SyncResult<()>;
}

/// Bearer token of the active session, shared between auth and store.
#[derive(Clone, Default)]
pub struct AccessToken(Arc<RwLock<Option<String>>>);

impl AccessToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self) -> Option<String> {
        self.0.read().await.clone()
    }

    pub async fn set(&self, token: Option<String>) {
        *self.0.write().await = token;
    }
}

#[derive(Deserialize)]
struct SessionResponse {
    access_token: String,
    user: User,
}

pub struct RestAuth {
    http: reqwest::Client,
    config: ClientConfig,
    token: AccessToken,
}

impl RestAuth {
    pub fn new(config: ClientConfig, token: AccessToken) -> SyncResult<Self> {
        Ok(Self {
            http: config.http_client()?,
            config,
            token,
        })
    }

    pub fn token(&self) -> AccessToken {
        self.token.clone()
    }

    /// Register a new account. When the service issues a session right away
    /// (no email confirmation), it becomes the active session.
    pub async fn sign_up(&self, form: &SignUpForm) -> SyncResult<User> {
        form.validate()?;

        let body = serde_json::json!({
            "email": form.email,
            "password": form.password,
            "data": { "name": form.display_name },
        });
        let response = self
            .http
            .post(self.config.auth_url("signup"))
            .header("apikey", &self.config.anon_key)
            .json(&body)
            .send()
            .await
            .map_err(transport)?;

        let value: serde_json::Value = read_json(response).await?;
        if let Ok(session) = serde_json::from_value::<SessionResponse>(value.clone()) {
            self.token.set(Some(session.access_token)).await;
            tracing::info!("AUTH: signed up and signed in {}", session.user.id);
            return Ok(session.user);
        }

        let user: User = serde_json::from_value(value)?;
        tracing::info!("AUTH: signed up {}, awaiting confirmation", user.id);
        Ok(user)
    }

    pub async fn sign_in_with_password(&self, credentials: &Credentials) -> SyncResult<User> {
        credentials.validate()?;

        let response = self
            .http
            .post(self.config.auth_url("token"))
            .query(&[("grant_type", "password")])
            .header("apikey", &self.config.anon_key)
            .json(&serde_json::json!({
                "email": credentials.email,
                "password": credentials.password,
            }))
            .send()
            .await
            .map_err(transport)?;

        let session: SessionResponse = read_json(response).await?;
        self.token.set(Some(session.access_token)).await;
        tracing::info!("AUTH: signed in {}", session.user.id);
        Ok(session.user)
    }

    async fn bearer(&self) -> SyncResult<String> {
        self.token.get().await.ok_or(SyncError::UserNotLoaded)
    }
}

#[async_trait]
impl AuthProvider for RestAuth {
    async fn current_user(&self) -> SyncResult<Option<User>> {
        let Some(token) = self.token.get().await else {
            return Ok(None);
        };

        let response = self
            .http
            .get(self.config.auth_url("user"))
            .header("apikey", &self.config.anon_key)
            .bearer_auth(token)
            .send()
            .await
            .map_err(transport)?;

        if matches!(
            response.status(),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN
        ) {
            tracing::warn!("AUTH: session rejected, treating as signed out");
            self.token.set(None).await;
            return Ok(None);
        }
        read_json(response).await.map(Some)
    }

    async fn update_user(&self, attributes: &UserAttributes) -> SyncResult<User> {
        let token = self.bearer().await?;
        let response = self
            .http
            .put(self.config.auth_url("user"))
            .header("apikey", &self.config.anon_key)
            .bearer_auth(token)
            .json(attributes)
            .send()
            .await
            .map_err(transport)?;
        read_json(response).await
    }

    async fn sign_out(&self) -> SyncResult<()> {
        let Some(token) = self.token.get().await else {
            return Ok(());
        };

        let response = self
            .http
            .post(self.config.auth_url("logout"))
            .header("apikey", &self.config.anon_key)
            .bearer_auth(token)
            .send()
            .await
            .map_err(transport)?;
        expect_success(response).await?;

        self.token.set(None).await;
        tracing::info!("AUTH: signed out");
        Ok(())
    }
}
