//! In-memory identity service for store and guard tests.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};

use super::{Identity, IdentityService};
use crate::api::ApiError;

#[derive(Default)]
struct FakeState {
    accounts: HashMap<String, (String, Identity)>,
    active: Option<String>,
    calls: Vec<&'static str>,
    next_id: u32,
}

/// Behaves like the account API for a single client: at most one active
/// session, duplicate emails rejected, sessions deleted on request.
#[derive(Default)]
pub struct FakeIdentityService {
    state: Mutex<FakeState>,
    unreachable: Mutex<bool>,
    reject_sessions: Mutex<bool>,
}

impl FakeIdentityService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_account(self, email: &str, password: &str, name: &str) -> Self {
        {
            let mut state = self.state.lock().unwrap();
            let identity = Self::make_identity(&mut state, email, name);
            state
                .accounts
                .insert(email.to_string(), (password.to_string(), identity));
        }
        self
    }

    pub fn with_active_session(self, email: &str) -> Self {
        self.state.lock().unwrap().active = Some(email.to_string());
        self
    }

    /// Every call fails as if the service were down.
    pub fn set_unreachable(&self, unreachable: bool) {
        *self.unreachable.lock().unwrap() = unreachable;
    }

    /// Session creation fails even for valid credentials.
    pub fn set_reject_sessions(&self, reject: bool) {
        *self.reject_sessions.lock().unwrap() = reject;
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn has_account(&self, email: &str) -> bool {
        self.state.lock().unwrap().accounts.contains_key(email)
    }

    pub fn active_session(&self) -> Option<String> {
        self.state.lock().unwrap().active.clone()
    }

    fn make_identity(state: &mut FakeState, email: &str, name: &str) -> Identity {
        state.next_id += 1;
        Identity {
            id: format!("user-{}", state.next_id),
            name: Some(name.to_string()),
            email: Some(email.to_string()),
            email_verified: false,
            created_at: Utc.with_ymd_and_hms(2025, 1, 5, 14, 3, 11).unwrap(),
        }
    }

    fn record(&self, call: &'static str) -> Result<(), ApiError> {
        self.state.lock().unwrap().calls.push(call);
        if *self.unreachable.lock().unwrap() {
            return Err(ApiError::ServerError("Service Unavailable".to_string()));
        }
        Ok(())
    }

    fn missing_scope() -> ApiError {
        ApiError::Unauthorized {
            kind: "general_unauthorized_scope".to_string(),
            message: "User (role: guests) missing scope (account)".to_string(),
        }
    }
}

#[async_trait]
impl IdentityService for FakeIdentityService {
    async fn current_identity(&self) -> Result<Identity, ApiError> {
        self.record("current_identity")?;
        let state = self.state.lock().unwrap();
        state
            .active
            .as_ref()
            .and_then(|email| state.accounts.get(email))
            .map(|(_, identity)| identity.clone())
            .ok_or_else(Self::missing_scope)
    }

    async fn create_session(&self, email: &str, password: &str) -> Result<(), ApiError> {
        self.record("create_session")?;
        let invalid = ApiError::Unauthorized {
            kind: "user_invalid_credentials".to_string(),
            message: "Invalid credentials. Please check the email and password.".to_string(),
        };
        if *self.reject_sessions.lock().unwrap() {
            return Err(invalid);
        }
        let mut state = self.state.lock().unwrap();
        if state.active.is_some() {
            return Err(ApiError::Unauthorized {
                kind: "user_session_already_exists".to_string(),
                message: "Creation of a session is prohibited when a session is active."
                    .to_string(),
            });
        }
        let matches = state
            .accounts
            .get(email)
            .is_some_and(|(stored, _)| stored == password);
        if !matches {
            return Err(invalid);
        }
        state.active = Some(email.to_string());
        Ok(())
    }

    async fn create_account(
        &self,
        _user_id: &str,
        email: &str,
        password: &str,
        name: &str,
    ) -> Result<(), ApiError> {
        self.record("create_account")?;
        let mut state = self.state.lock().unwrap();
        if state.accounts.contains_key(email) {
            return Err(ApiError::Conflict {
                kind: "user_already_exists".to_string(),
                message: "A user with the same id, email, or phone already exists in this project."
                    .to_string(),
            });
        }
        if password.len() < 8 {
            return Err(ApiError::BadRequest {
                kind: "general_argument_invalid".to_string(),
                message: "Invalid `password` param: Password must be between 8 and 265 characters long."
                    .to_string(),
            });
        }
        let identity = Self::make_identity(&mut state, email, name);
        state
            .accounts
            .insert(email.to_string(), (password.to_string(), identity));
        Ok(())
    }

    async fn delete_session(&self, _session_ref: &str) -> Result<(), ApiError> {
        self.record("delete_session")?;
        let mut state = self.state.lock().unwrap();
        if state.active.take().is_none() {
            return Err(Self::missing_scope());
        }
        Ok(())
    }
}
