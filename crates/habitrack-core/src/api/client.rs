//! API client for the Appwrite account service.
//!
//! This module provides the `AppwriteClient` struct, which implements
//! [`IdentityService`] over Appwrite's REST account endpoints.

use std::sync::RwLock;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use reqwest::{header, Client, Method, RequestBuilder, Response};
use serde::Serialize;
use tracing::{debug, warn};

use crate::auth::{CredentialStore, Identity, IdentityService};
use crate::config::Config;

use super::ApiError;

// ============================================================================
// Constants
// ============================================================================

/// HTTP request timeout in seconds when no config is supplied.
/// 30s allows for slow API responses while failing fast enough for good UX.
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Header carrying the project the request belongs to.
const PROJECT_HEADER: &str = "x-appwrite-project";

/// Header Appwrite uses to hand session cookies to clients without a cookie jar.
const FALLBACK_COOKIES_HEADER: &str = "x-fallback-cookies";

/// Prefix of Appwrite session cookie names.
const SESSION_COOKIE_PREFIX: &str = "a_session_";

#[derive(Debug, Serialize)]
struct CreateSessionRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Serialize)]
struct CreateAccountRequest<'a> {
    #[serde(rename = "userId")]
    user_id: &'a str,
    email: &'a str,
    password: &'a str,
    name: &'a str,
}

/// Appwrite account API client.
///
/// Holds the session credential of the signed-in user and replays it on
/// every request. With `remember_session` the credential is also kept in the
/// OS keychain so the next launch starts signed in.
pub struct AppwriteClient {
    client: Client,
    endpoint: String,
    project_id: String,
    session: RwLock<Option<String>>,
    persist: bool,
}

impl AppwriteClient {
    /// Create a client with no session and no keychain persistence
    pub fn new(endpoint: &str, project_id: &str) -> Result<Self> {
        Self::build(endpoint, project_id, DEFAULT_REQUEST_TIMEOUT_SECS, false)
    }

    /// Create a client from the application config, restoring a remembered
    /// session credential when enabled.
    pub fn from_config(config: &Config) -> Result<Self> {
        let client = Self::build(
            &config.endpoint,
            &config.project_id,
            config.request_timeout_secs,
            config.remember_session,
        )?;

        if client.persist {
            match CredentialStore::load(&client.project_id) {
                Ok(Some(credential)) => {
                    debug!("Restored session credential from keychain");
                    client.replace_session(Some(credential));
                }
                Ok(None) => debug!("No remembered session"),
                Err(e) => warn!(error = %e, "Failed to read remembered session"),
            }
        }

        Ok(client)
    }

    fn build(endpoint: &str, project_id: &str, timeout_secs: u64, persist: bool) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;

        Ok(Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            project_id: project_id.to_string(),
            session: RwLock::new(None),
            persist,
        })
    }

    /// Use the given session credential for subsequent requests
    pub fn with_session(self, credential: impl Into<String>) -> Self {
        self.replace_session(Some(credential.into()));
        self
    }

    /// Check whether a session credential is currently held
    pub fn has_session(&self) -> bool {
        self.session.read().map(|s| s.is_some()).unwrap_or(false)
    }

    fn session(&self) -> Option<String> {
        self.session.read().ok().and_then(|s| s.clone())
    }

    fn replace_session(&self, credential: Option<String>) {
        if let Ok(mut slot) = self.session.write() {
            *slot = credential;
        }
    }

    /// Hold a new credential and remember it if enabled
    fn store_session(&self, credential: String) {
        if self.persist {
            if let Err(e) = CredentialStore::store(&self.project_id, &credential) {
                warn!(error = %e, "Failed to remember session");
            }
        }
        self.replace_session(Some(credential));
    }

    /// Drop the held credential and forget it if enabled
    fn clear_session(&self) {
        if self.persist {
            if let Err(e) = CredentialStore::delete(&self.project_id) {
                warn!(error = %e, "Failed to forget session");
            }
        }
        self.replace_session(None);
    }

    /// Request without the held credential.
    fn guest_request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.endpoint, path);
        self.client
            .request(method, url)
            .header(PROJECT_HEADER, &self.project_id)
            .header(header::ACCEPT, "application/json")
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self.guest_request(method, path);
        match self.session() {
            Some(credential) => builder.header(FALLBACK_COOKIES_HEADER, credential),
            None => builder,
        }
    }

    /// Check if response is successful, returning an error with body if not.
    async fn check_response(response: Response) -> Result<Response, ApiError> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body))
        }
    }

    /// Pull the session credential out of a session-creation response.
    ///
    /// Appwrite sends it as JSON in `X-Fallback-Cookies`; when that header is
    /// absent the `a_session_*` cookies are packed into the same JSON shape.
    fn extract_session_credential(headers: &header::HeaderMap) -> Option<String> {
        if let Some(value) = headers
            .get(FALLBACK_COOKIES_HEADER)
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.trim().is_empty() && v.trim() != "[]")
        {
            return Some(value.to_string());
        }

        let cookies: serde_json::Map<String, serde_json::Value> = headers
            .get_all(header::SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .filter_map(|cookie| {
                let pair = cookie.split(';').next()?.trim();
                let (name, value) = pair.split_once('=')?;
                if name.starts_with(SESSION_COOKIE_PREFIX) && !value.is_empty() {
                    Some((name.to_string(), serde_json::Value::String(value.to_string())))
                } else {
                    None
                }
            })
            .collect();

        if cookies.is_empty() {
            None
        } else {
            Some(serde_json::Value::Object(cookies).to_string())
        }
    }
}

#[async_trait]
impl IdentityService for AppwriteClient {
    async fn current_identity(&self) -> Result<Identity, ApiError> {
        let response = self.request(Method::GET, "/account").send().await?;

        let response = match Self::check_response(response).await {
            Ok(response) => response,
            Err(e @ ApiError::Unauthorized { .. }) => {
                if self.has_session() {
                    debug!("Held session was rejected, dropping it");
                    self.clear_session();
                }
                return Err(e);
            }
            Err(e) => return Err(e),
        };

        response
            .json::<Identity>()
            .await
            .map_err(|e| ApiError::InvalidResponse(format!("Failed to parse account: {}", e)))
    }

    async fn create_session(&self, email: &str, password: &str) -> Result<(), ApiError> {
        // Appwrite refuses to open a session for a caller that already holds
        // one (user_session_already_exists), so a leftover credential is not
        // sent. It stays held until the new one replaces it.
        let response = self
            .guest_request(Method::POST, "/account/sessions/email")
            .json(&CreateSessionRequest { email, password })
            .send()
            .await?;

        let response = Self::check_response(response).await?;

        let credential = Self::extract_session_credential(response.headers()).ok_or_else(|| {
            ApiError::InvalidResponse("Session created but no session credential returned".to_string())
        })?;
        self.store_session(credential);
        debug!("Session created");
        Ok(())
    }

    async fn create_account(
        &self,
        user_id: &str,
        email: &str,
        password: &str,
        name: &str,
    ) -> Result<(), ApiError> {
        let response = self
            .guest_request(Method::POST, "/account")
            .json(&CreateAccountRequest {
                user_id,
                email,
                password,
                name,
            })
            .send()
            .await?;

        Self::check_response(response).await?;
        Ok(())
    }

    async fn delete_session(&self, session_ref: &str) -> Result<(), ApiError> {
        let path = format!("/account/sessions/{}", session_ref);
        let response = self.request(Method::DELETE, &path).send().await?;

        Self::check_response(response).await?;
        self.clear_session();
        debug!(session_ref, "Session deleted");
        Ok(())
    }
}
