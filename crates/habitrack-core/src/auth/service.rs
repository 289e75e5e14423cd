use async_trait::async_trait;

use super::Identity;
use crate::api::ApiError;

/// Session reference meaning "the session this client is holding".
pub const CURRENT_SESSION: &str = "current";

/// Account id marker asking the service to generate a unique id.
pub const UNIQUE_ID: &str = "unique()";

/// The hosted identity service the session store talks to.
///
/// `AppwriteClient` is the production implementation; tests provide
/// in-memory ones.
#[async_trait]
pub trait IdentityService: Send + Sync {
    /// Fetch the identity behind the active session. Fails if there is none.
    async fn current_identity(&self) -> Result<Identity, ApiError>;

    /// Open an email/password session and keep its credential for later calls.
    async fn create_session(&self, email: &str, password: &str) -> Result<(), ApiError>;

    async fn create_account(
        &self,
        user_id: &str,
        email: &str,
        password: &str,
        name: &str,
    ) -> Result<(), ApiError>;

    async fn delete_session(&self, session_ref: &str) -> Result<(), ApiError>;
}
