//! Authentication: who is signed in and how that changes.
//!
//! This module provides:
//! - `Identity`: the signed-in account record
//! - `IdentityService`: the seam to the hosted identity service
//! - `SessionStore`: the single owner of session state and its operations
//! - `AuthError`: failures surfaced to the UI
//! - `CredentialStore`: keychain storage for the session credential
//!
//! The store starts `Resolving` and leaves it after the first session
//! check; it then moves between `Authenticated` and `Anonymous`.

pub mod credentials;
pub mod error;
pub mod identity;
pub mod service;
pub mod session;

#[cfg(test)]
pub(crate) mod testing;

pub use credentials::CredentialStore;
pub use error::AuthError;
pub use identity::Identity;
pub use service::IdentityService;
pub use session::{SessionEvent, SessionState, SessionStatus, SessionStore, SessionTrigger};
