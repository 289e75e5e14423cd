use thiserror::Error;

use crate::api::ApiError;

/// Failure of a session operation, as seen by the UI.
///
/// Everything except `Transport` is an answer from the identity service;
/// `Transport` means the service could not be reached or replied with
/// something unusable. The UI presents both the same way.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("An account with this email already exists")]
    AccountExists,

    #[error("{0}")]
    PolicyViolation(String),

    #[error("Too many attempts. Please wait before trying again.")]
    RateLimited,

    #[error("No active session")]
    SessionAbsent,

    #[error("{0}")]
    Rejected(String),

    #[error("Unable to reach the server: {0}")]
    Transport(String),
}

impl AuthError {
    pub fn is_transport(&self) -> bool {
        matches!(self, AuthError::Transport(_))
    }
}

impl From<ApiError> for AuthError {
    fn from(err: ApiError) -> Self {
        if err.is_transport() {
            return AuthError::Transport(err.service_message());
        }

        match err.kind() {
            Some("user_invalid_credentials") => AuthError::InvalidCredentials,
            Some("user_already_exists") | Some("user_email_already_exists") => {
                AuthError::AccountExists
            }
            Some("general_rate_limit_exceeded") => AuthError::RateLimited,
            Some("general_unauthorized_scope") | Some("user_unauthorized")
            | Some("user_session_not_found") => AuthError::SessionAbsent,
            Some(kind)
                if kind == "general_argument_invalid"
                    || kind.starts_with("user_password")
                    || kind.starts_with("user_email") =>
            {
                AuthError::PolicyViolation(password_or_email_message(&err.service_message()))
            }
            _ => AuthError::Rejected(err.service_message()),
        }
    }
}

/// Appwrite's argument errors read like "Invalid `password` param: ...";
/// shorten the common ones to what the register form used to say.
fn password_or_email_message(message: &str) -> String {
    let lower = message.to_lowercase();
    if lower.contains("password") {
        "Password does not meet requirements".to_string()
    } else if lower.contains("email") {
        "Please enter a valid email address".to_string()
    } else {
        message.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unauthorized(kind: &str) -> ApiError {
        ApiError::Unauthorized {
            kind: kind.to_string(),
            message: "msg".to_string(),
        }
    }

    #[test]
    fn test_invalid_credentials() {
        assert_eq!(
            AuthError::from(unauthorized("user_invalid_credentials")),
            AuthError::InvalidCredentials
        );
    }

    #[test]
    fn test_missing_scope_is_session_absent() {
        assert_eq!(
            AuthError::from(unauthorized("general_unauthorized_scope")),
            AuthError::SessionAbsent
        );
    }

    #[test]
    fn test_duplicate_account() {
        let err = ApiError::Conflict {
            kind: "user_already_exists".to_string(),
            message: "A user with the same id, email, or phone already exists in this project."
                .to_string(),
        };
        let auth = AuthError::from(err);
        assert_eq!(auth, AuthError::AccountExists);
        assert_eq!(auth.to_string(), "An account with this email already exists");
    }

    #[test]
    fn test_policy_violation_messages() {
        let weak = ApiError::BadRequest {
            kind: "general_argument_invalid".to_string(),
            message: "Invalid `password` param: Password must be between 8 and 265 characters long."
                .to_string(),
        };
        assert_eq!(
            AuthError::from(weak),
            AuthError::PolicyViolation("Password does not meet requirements".to_string())
        );

        let email = ApiError::BadRequest {
            kind: "general_argument_invalid".to_string(),
            message: "Invalid `email` param: Value must be a valid email address".to_string(),
        };
        assert_eq!(
            AuthError::from(email),
            AuthError::PolicyViolation("Please enter a valid email address".to_string())
        );
    }

    #[test]
    fn test_transport_failures() {
        let err = AuthError::from(ApiError::ServerError("Bad Gateway".to_string()));
        assert!(err.is_transport());
        assert_eq!(err.to_string(), "Unable to reach the server: Bad Gateway");
    }

    #[test]
    fn test_rate_limited() {
        assert_eq!(AuthError::from(ApiError::RateLimited), AuthError::RateLimited);
    }

    #[test]
    fn test_unknown_kind_is_rejected_with_service_message() {
        let err = ApiError::Unauthorized {
            kind: "user_session_already_exists".to_string(),
            message: "Creation of a session is prohibited when a session is active.".to_string(),
        };
        assert_eq!(
            AuthError::from(err),
            AuthError::Rejected(
                "Creation of a session is prohibited when a session is active.".to_string()
            )
        );
    }
}
