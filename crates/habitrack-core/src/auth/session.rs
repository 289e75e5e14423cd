//! The session store: who is signed in, and the operations that change it.

use std::sync::Arc;

use tokio::sync::{broadcast, watch, Mutex};
use tracing::{debug, info, warn};

use super::service::{CURRENT_SESSION, UNIQUE_ID};
use super::{AuthError, Identity, IdentityService};

/// Capacity of the transition event channel. Transitions are driven by user
/// actions, so a subscriber that falls this far behind has stopped polling.
const EVENT_CHANNEL_CAPACITY: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub enum SessionStatus {
    Resolving,
    Authenticated,
    Anonymous,
}

/// Current authentication state. The identity is carried by the
/// `Authenticated` variant, so it is present exactly when signed in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Resolving,
    Authenticated(Identity),
    Anonymous,
}

impl SessionState {
    pub fn status(&self) -> SessionStatus {
        match self {
            SessionState::Resolving => SessionStatus::Resolving,
            SessionState::Authenticated(_) => SessionStatus::Authenticated,
            SessionState::Anonymous => SessionStatus::Anonymous,
        }
    }

    pub fn identity(&self) -> Option<&Identity> {
        match self {
            SessionState::Authenticated(identity) => Some(identity),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, SessionState::Resolving)
    }
}

/// What caused a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionTrigger {
    StartupCheck,
    Recheck,
    Login,
    Register,
    Logout,
}

/// Published once per successful transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionEvent {
    pub trigger: SessionTrigger,
    pub status: SessionStatus,
}

/// Single owner of the session state.
///
/// Operations are serialized: each one holds the store's lock from the first
/// service call until the state is published, so at most one identity
/// service request is in flight and transitions never interleave.
pub struct SessionStore {
    service: Arc<dyn IdentityService>,
    state_tx: watch::Sender<SessionState>,
    events_tx: broadcast::Sender<SessionEvent>,
    op_lock: Mutex<()>,
}

impl SessionStore {
    pub fn new(service: Arc<dyn IdentityService>) -> Self {
        let (state_tx, _) = watch::channel(SessionState::Resolving);
        let (events_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            service,
            state_tx,
            events_tx,
            op_lock: Mutex::new(()),
        }
    }

    // =========================================================================
    // Observation
    // =========================================================================

    pub fn state(&self) -> SessionState {
        self.state_tx.borrow().clone()
    }

    pub fn status(&self) -> SessionStatus {
        self.state_tx.borrow().status()
    }

    pub fn identity(&self) -> Option<Identity> {
        self.state_tx.borrow().identity().cloned()
    }

    pub fn is_loading(&self) -> bool {
        self.state_tx.borrow().is_loading()
    }

    /// Receiver that always holds the latest state.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state_tx.subscribe()
    }

    /// Receiver for transition events, in order, from now on.
    pub fn subscribe_events(&self) -> broadcast::Receiver<SessionEvent> {
        self.events_tx.subscribe()
    }

    // =========================================================================
    // Operations
    // =========================================================================

    /// Ask the identity service whether a session is already active.
    ///
    /// Any failure means "signed out"; it is logged and never returned.
    /// Called once at startup, and safe to call again later.
    pub async fn check_session(&self) -> SessionStatus {
        let _op = self.op_lock.lock().await;
        let previous = self.status();

        let next = match self.service.current_identity().await {
            Ok(identity) => {
                info!(user_id = %identity.id, "Active session found");
                SessionState::Authenticated(identity)
            }
            Err(e) => {
                let err = AuthError::from(e);
                if err.is_transport() {
                    warn!(error = %err, "Session check failed, continuing signed out");
                } else {
                    debug!(error = %err, "No active session");
                }
                SessionState::Anonymous
            }
        };

        let status = next.status();
        if previous == status {
            // Refresh the identity without announcing a transition.
            self.state_tx.send_replace(next);
        } else {
            let trigger = if previous == SessionStatus::Resolving {
                SessionTrigger::StartupCheck
            } else {
                SessionTrigger::Recheck
            };
            self.transition(next, trigger);
        }
        status
    }

    /// Sign in with email and password.
    ///
    /// On failure the state is left as it was and the error is returned.
    pub async fn login(&self, email: &str, password: &str) -> Result<Identity, AuthError> {
        let _op = self.op_lock.lock().await;
        let identity = self.sign_in(email, password).await?;
        info!(user_id = %identity.id, "Login successful");
        self.transition(
            SessionState::Authenticated(identity.clone()),
            SessionTrigger::Login,
        );
        Ok(identity)
    }

    /// Create an account, then sign in with the same credentials.
    ///
    /// If account creation fails nothing else is attempted. If the sign-in
    /// fails afterwards, that error is returned: the account exists but
    /// nobody is signed in.
    pub async fn register(
        &self,
        email: &str,
        password: &str,
        name: &str,
    ) -> Result<Identity, AuthError> {
        let _op = self.op_lock.lock().await;

        if let Err(e) = self
            .service
            .create_account(UNIQUE_ID, email, password, name)
            .await
        {
            let err = AuthError::from(e);
            warn!(error = %err, "Account creation failed");
            return Err(err);
        }
        info!("Account created");

        let identity = match self.sign_in(email, password).await {
            Ok(identity) => identity,
            Err(err) => {
                warn!(error = %err, "Account created but sign-in failed");
                return Err(err);
            }
        };

        info!(user_id = %identity.id, "Registration complete");
        self.transition(
            SessionState::Authenticated(identity.clone()),
            SessionTrigger::Register,
        );
        Ok(identity)
    }

    /// End the current session.
    ///
    /// Not guarded when already signed out: the request goes to the service,
    /// which decides whether deleting a missing session is an error.
    pub async fn logout(&self) -> Result<(), AuthError> {
        let _op = self.op_lock.lock().await;

        if let Err(e) = self.service.delete_session(CURRENT_SESSION).await {
            let err = AuthError::from(e);
            warn!(error = %err, "Logout failed");
            return Err(err);
        }

        info!("Logged out");
        self.transition(SessionState::Anonymous, SessionTrigger::Logout);
        Ok(())
    }

    // =========================================================================
    // Internals
    // =========================================================================

    async fn sign_in(&self, email: &str, password: &str) -> Result<Identity, AuthError> {
        if let Err(e) = self.service.create_session(email, password).await {
            let err = AuthError::from(e);
            warn!(error = %err, "Login failed");
            return Err(err);
        }

        self.service.current_identity().await.map_err(|e| {
            let err = AuthError::from(e);
            warn!(error = %err, "Session created but identity fetch failed");
            err
        })
    }

    fn transition(&self, next: SessionState, trigger: SessionTrigger) {
        let status = next.status();
        self.state_tx.send_replace(next);
        debug!(?trigger, ?status, "Session transition");
        // No subscribers is fine; the state itself is already published.
        let _ = self.events_tx.send(SessionEvent { trigger, status });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::testing::FakeIdentityService;

    fn store_with(service: FakeIdentityService) -> (SessionStore, Arc<FakeIdentityService>) {
        let service = Arc::new(service);
        (SessionStore::new(service.clone()), service)
    }

    // -------------------------------------------------------------------------
    // Startup check
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_starts_resolving() {
        let (store, service) = store_with(FakeIdentityService::new());
        assert_eq!(store.status(), SessionStatus::Resolving);
        assert!(store.is_loading());
        assert!(store.identity().is_none());
        assert!(service.calls().is_empty());
    }

    #[tokio::test]
    async fn test_check_session_with_active_session() {
        let (store, _) = store_with(
            FakeIdentityService::new()
                .with_account("a@b.com", "pw1234", "Ada")
                .with_active_session("a@b.com"),
        );

        assert_eq!(store.check_session().await, SessionStatus::Authenticated);
        let identity = store.identity().expect("identity should be set");
        assert_eq!(identity.email.as_deref(), Some("a@b.com"));
        assert!(!store.is_loading());
    }

    #[tokio::test]
    async fn test_check_session_without_session_is_anonymous() {
        let (store, _) = store_with(FakeIdentityService::new());
        assert_eq!(store.check_session().await, SessionStatus::Anonymous);
        assert_eq!(store.state(), SessionState::Anonymous);
    }

    #[tokio::test]
    async fn test_check_session_unreachable_is_anonymous() {
        let service = FakeIdentityService::new()
            .with_account("a@b.com", "pw1234", "Ada")
            .with_active_session("a@b.com");
        service.set_unreachable(true);
        let (store, _) = store_with(service);

        assert_eq!(store.check_session().await, SessionStatus::Anonymous);
        assert!(store.identity().is_none());
    }

    #[tokio::test]
    async fn test_check_session_twice_is_idempotent() {
        let (store, _) = store_with(
            FakeIdentityService::new()
                .with_account("a@b.com", "pw1234", "Ada")
                .with_active_session("a@b.com"),
        );
        let mut events = store.subscribe_events();

        let first = store.check_session().await;
        let first_state = store.state();
        let second = store.check_session().await;

        assert_eq!(first, second);
        assert_eq!(first_state, store.state());
        // Only leaving Resolving is a transition.
        assert_eq!(
            events.try_recv().unwrap(),
            SessionEvent {
                trigger: SessionTrigger::StartupCheck,
                status: SessionStatus::Authenticated,
            }
        );
        assert!(events.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_resolving_never_reentered() {
        let (store, service) = store_with(FakeIdentityService::new().with_account(
            "a@b.com", "pw1234", "Ada",
        ));
        let mut rx = store.subscribe();

        store.check_session().await;
        store.login("a@b.com", "pw1234").await.unwrap();
        service.set_unreachable(true);
        store.check_session().await;
        store.logout().await.unwrap_err();

        assert!(rx.has_changed().unwrap());
        assert!(!rx.borrow_and_update().is_loading());
        assert_ne!(store.status(), SessionStatus::Resolving);
    }

    // -------------------------------------------------------------------------
    // Login / logout
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_login_success() {
        let (store, service) = store_with(FakeIdentityService::new().with_account(
            "a@b.com", "pw1234", "Ada",
        ));
        store.check_session().await;
        let mut events = store.subscribe_events();

        let identity = store.login("a@b.com", "pw1234").await.unwrap();

        assert_eq!(identity.email.as_deref(), Some("a@b.com"));
        assert_eq!(store.status(), SessionStatus::Authenticated);
        assert_eq!(store.identity(), Some(identity));
        assert_eq!(
            events.try_recv().unwrap(),
            SessionEvent {
                trigger: SessionTrigger::Login,
                status: SessionStatus::Authenticated,
            }
        );
        assert_eq!(
            service.calls(),
            vec!["current_identity", "create_session", "current_identity"]
        );
    }

    #[tokio::test]
    async fn test_login_wrong_password_leaves_state_unchanged() {
        let (store, _) = store_with(FakeIdentityService::new().with_account(
            "a@b.com", "pw1234", "Ada",
        ));
        store.check_session().await;
        let mut events = store.subscribe_events();

        let err = store.login("a@b.com", "wrong").await.unwrap_err();

        assert_eq!(err, AuthError::InvalidCredentials);
        assert_eq!(store.state(), SessionState::Anonymous);
        assert!(events.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_login_failure_while_authenticated_keeps_identity() {
        let (store, _) = store_with(
            FakeIdentityService::new()
                .with_account("a@b.com", "pw1234", "Ada")
                .with_active_session("a@b.com"),
        );
        store.check_session().await;
        let before = store.state();

        let err = store.login("a@b.com", "pw1234").await.unwrap_err();

        assert!(matches!(err, AuthError::Rejected(_)));
        assert_eq!(store.state(), before);
    }

    #[tokio::test]
    async fn test_login_transport_failure() {
        let (store, service) = store_with(FakeIdentityService::new().with_account(
            "a@b.com", "pw1234", "Ada",
        ));
        store.check_session().await;
        service.set_unreachable(true);

        let err = store.login("a@b.com", "pw1234").await.unwrap_err();
        assert!(err.is_transport());
        assert_eq!(store.state(), SessionState::Anonymous);
    }

    #[tokio::test]
    async fn test_login_then_logout_round_trip() {
        let (store, service) = store_with(FakeIdentityService::new().with_account(
            "a@b.com", "pw1234", "Ada",
        ));
        store.check_session().await;

        store.login("a@b.com", "pw1234").await.unwrap();
        store.logout().await.unwrap();

        assert_eq!(store.state(), SessionState::Anonymous);
        assert!(store.identity().is_none());
        assert_eq!(service.active_session(), None);
    }

    #[tokio::test]
    async fn test_logout_when_anonymous_surfaces_service_error() {
        let (store, service) = store_with(FakeIdentityService::new());
        store.check_session().await;
        let mut events = store.subscribe_events();

        let err = store.logout().await.unwrap_err();

        assert_eq!(err, AuthError::SessionAbsent);
        assert_eq!(store.state(), SessionState::Anonymous);
        assert!(events.try_recv().is_err());
        assert_eq!(service.calls(), vec!["current_identity", "delete_session"]);
    }

    #[tokio::test]
    async fn test_logout_failure_keeps_session() {
        let (store, service) = store_with(
            FakeIdentityService::new()
                .with_account("a@b.com", "pw1234", "Ada")
                .with_active_session("a@b.com"),
        );
        store.check_session().await;
        service.set_unreachable(true);

        let err = store.logout().await.unwrap_err();
        assert!(err.is_transport());
        assert_eq!(store.status(), SessionStatus::Authenticated);
    }

    // -------------------------------------------------------------------------
    // Register
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_register_success_signs_in() {
        let (store, service) = store_with(FakeIdentityService::new());
        store.check_session().await;
        let mut events = store.subscribe_events();

        let identity = store
            .register("a@b.com", "pw123456", "ab")
            .await
            .unwrap();

        assert_eq!(identity.email.as_deref(), Some("a@b.com"));
        assert_eq!(identity.name.as_deref(), Some("ab"));
        assert_eq!(store.status(), SessionStatus::Authenticated);
        assert_eq!(store.identity().unwrap().name.as_deref(), Some("ab"));

        // One transition, one event.
        assert_eq!(
            events.try_recv().unwrap(),
            SessionEvent {
                trigger: SessionTrigger::Register,
                status: SessionStatus::Authenticated,
            }
        );
        assert!(events.try_recv().is_err());
        assert_eq!(
            service.calls(),
            vec![
                "current_identity",
                "create_account",
                "create_session",
                "current_identity"
            ]
        );
    }

    #[tokio::test]
    async fn test_register_duplicate_email_does_not_login() {
        let (store, service) = store_with(FakeIdentityService::new().with_account(
            "a@b.com", "existing1", "Someone",
        ));
        store.check_session().await;

        let err = store
            .register("a@b.com", "pw123456", "ab")
            .await
            .unwrap_err();

        assert_eq!(err, AuthError::AccountExists);
        assert_eq!(store.state(), SessionState::Anonymous);
        assert!(!service.calls().contains(&"create_session"));
    }

    #[tokio::test]
    async fn test_register_then_login_failure_leaves_account() {
        let (store, service) = store_with(FakeIdentityService::new());
        store.check_session().await;
        service.set_reject_sessions(true);

        let err = store
            .register("new@b.com", "pw123456", "Newbie")
            .await
            .unwrap_err();

        assert_eq!(err, AuthError::InvalidCredentials);
        assert!(service.has_account("new@b.com"));
        assert_eq!(store.state(), SessionState::Anonymous);
    }

    // -------------------------------------------------------------------------
    // Serialization
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_concurrent_operations_are_serialized() {
        let (store, service) = store_with(FakeIdentityService::new().with_account(
            "a@b.com", "pw1234", "Ada",
        ));
        let store = Arc::new(store);

        let a = tokio::spawn({
            let store = store.clone();
            async move { store.check_session().await }
        });
        let b = tokio::spawn({
            let store = store.clone();
            async move { store.login("a@b.com", "pw1234").await }
        });
        a.await.unwrap();
        b.await.unwrap().unwrap();

        // Whatever order they ran in, calls never interleave inside an operation.
        let calls = service.calls();
        let login_start = calls.iter().position(|c| *c == "create_session").unwrap();
        assert_eq!(calls[login_start + 1], "current_identity");
        assert_eq!(calls.len(), 3);
        assert_eq!(store.status(), SessionStatus::Authenticated);
    }
}
