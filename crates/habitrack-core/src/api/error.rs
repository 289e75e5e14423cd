use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Bad request: {message}")]
    BadRequest { kind: String, message: String },

    #[error("Unauthorized: {message}")]
    Unauthorized { kind: String, message: String },

    #[error("Access denied: {0}")]
    AccessDenied(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Conflict: {message}")]
    Conflict { kind: String, message: String },

    #[error("Rate limited - please wait before retrying")]
    RateLimited,

    #[error("Server error: {0}")]
    ServerError(String),

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

/// Error body returned by Appwrite for every non-2xx response.
#[derive(Debug, Deserialize)]
struct AppwriteErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default, rename = "type")]
    kind: String,
}

impl ApiError {
    /// Truncate a response body to avoid logging excessive data
    fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            body.to_string()
        } else {
            let mut end = MAX_ERROR_BODY_LENGTH;
            while !body.is_char_boundary(end) {
                end -= 1;
            }
            format!("{}... (truncated, {} total bytes)", &body[..end], body.len())
        }
    }

    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        let (kind, message) = match serde_json::from_str::<AppwriteErrorBody>(body) {
            Ok(parsed) if !parsed.message.is_empty() => (parsed.kind, parsed.message),
            _ => (String::new(), Self::truncate_body(body)),
        };
        match status.as_u16() {
            400 => ApiError::BadRequest { kind, message },
            401 => ApiError::Unauthorized { kind, message },
            403 => ApiError::AccessDenied(message),
            404 => ApiError::NotFound(message),
            409 => ApiError::Conflict { kind, message },
            429 => ApiError::RateLimited,
            500..=599 => ApiError::ServerError(message),
            _ => ApiError::InvalidResponse(format!("Status {}: {}", status, message)),
        }
    }

    /// The Appwrite error `type` string, when the service sent one.
    pub fn kind(&self) -> Option<&str> {
        match self {
            ApiError::BadRequest { kind, .. }
            | ApiError::Unauthorized { kind, .. }
            | ApiError::Conflict { kind, .. }
                if !kind.is_empty() =>
            {
                Some(kind.as_str())
            }
            ApiError::RateLimited => Some("general_rate_limit_exceeded"),
            _ => None,
        }
    }

    /// Message suitable for showing to the user, without the variant prefix.
    pub fn service_message(&self) -> String {
        match self {
            ApiError::BadRequest { message, .. }
            | ApiError::Unauthorized { message, .. }
            | ApiError::Conflict { message, .. }
            | ApiError::AccessDenied(message)
            | ApiError::NotFound(message)
            | ApiError::ServerError(message)
            | ApiError::InvalidResponse(message) => message.clone(),
            other => other.to_string(),
        }
    }

    /// True when the failure happened below the identity service's
    /// application layer (connection, timeout, 5xx, unparseable reply).
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            ApiError::NetworkError(_) | ApiError::ServerError(_) | ApiError::InvalidResponse(_)
        )
    }
}
