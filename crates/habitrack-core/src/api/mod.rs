//! Appwrite account API client.
//!
//! This module provides the `AppwriteClient` for talking to the hosted
//! identity service: reading the current account, creating and deleting
//! email/password sessions, and creating accounts.
//!
//! The session credential is carried in the `X-Fallback-Cookies` header,
//! the same way Appwrite's native SDKs do when no cookie jar is available.

pub mod client;
pub mod error;

pub use client::AppwriteClient;
pub use error::ApiError;
