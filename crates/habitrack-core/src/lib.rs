//! Core library for habitrack.
//!
//! This crate owns everything that is not presentation:
//!
//! - `api`: Appwrite account API client implementing [`auth::IdentityService`]
//! - `auth`: identity model, session store, keychain credential storage
//! - `forms`: boundary validation for the login and register forms
//! - `router`: routes and the navigation stack
//! - `guard`: the route guard that keeps navigation consistent with the session
//! - `config`: application configuration
//!
//! The UI shell builds one [`auth::SessionStore`] at startup, hands it an
//! [`auth::IdentityService`], and drives a [`guard::RouteGuard`] from it.

pub mod api;
pub mod auth;
pub mod config;
pub mod forms;
pub mod guard;
pub mod router;

pub use api::{ApiError, AppwriteClient};
pub use auth::{AuthError, Identity, IdentityService, SessionEvent, SessionState, SessionStatus, SessionStore};
pub use config::Config;
pub use guard::{GuardDecision, RouteGuard};
pub use router::{NavCommand, Navigator, Route};
