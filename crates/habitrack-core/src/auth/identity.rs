use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The signed-in user's account record, as returned by `GET /account`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
#[serde(from = "AccountResponse")]
pub struct Identity {
    pub id: String,
    pub name: Option<String>,
    pub email: Option<String>,
    pub email_verified: bool,
    #[cfg_attr(feature = "ts", ts(type = "string"))]
    pub created_at: DateTime<Utc>,
}

/// Wire shape of an Appwrite user. Appwrite sends empty strings for unset
/// name and email, which become `None` on the domain type.
#[derive(Debug, Deserialize)]
struct AccountResponse {
    #[serde(rename = "$id")]
    id: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    email: String,
    #[serde(rename = "emailVerification", default)]
    email_verification: bool,
    #[serde(rename = "$createdAt")]
    created_at: DateTime<Utc>,
}

fn non_empty(s: String) -> Option<String> {
    if s.trim().is_empty() {
        None
    } else {
        Some(s)
    }
}

impl From<AccountResponse> for Identity {
    fn from(raw: AccountResponse) -> Self {
        Self {
            id: raw.id,
            name: non_empty(raw.name),
            email: non_empty(raw.email),
            email_verified: raw.email_verification,
            created_at: raw.created_at,
        }
    }
}

impl Identity {
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("User")
    }

    /// Account creation date, e.g. "January 5, 2025".
    pub fn member_since(&self) -> String {
        self.created_at.format("%B %-d, %Y").to_string()
    }

    pub fn verification_label(&self) -> &'static str {
        if self.email_verified {
            "Verified"
        } else {
            "Not Verified"
        }
    }
}
