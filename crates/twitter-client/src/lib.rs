//! `twitter-client` — minimal blocking client for the Twitter REST v1.1 API.
//!
//! Covers search, follower lookup, status updates and credential
//! verification. Requests are signed with OAuth 1.0a using an access token
//! obtained beforehand.

pub mod client;
pub mod error;
pub mod oauth;
pub mod types;

pub use client::{Client, DEFAULT_BASE_URL};
pub use error::{TwitterError, DUPLICATE_STATUS, RATE_LIMIT_EXCEEDED};
pub use oauth::Credentials;
pub use types::{Geocode, SearchQuery, Status, User};

/// Convenience `Result` alias for this crate.
pub type Result<T> = std::result::Result<T, TwitterError>;
