//! The microblogging capability the bot consumes.
//!
//! [`MicroblogApi`] is the seam between the run logic and the network. The
//! production implementation is [`crate::twitter::TwitterApi`]; tests drive
//! the orchestrator with scripted fakes.

use std::time::Duration;
use thiserror::Error;

// ---------------------------------------------------------------------------
// Fixed search policy
// ---------------------------------------------------------------------------

pub const SEARCH_LANG: &str = "es";
/// Puerta del Sol, Madrid. With a 600 km radius this roughly covers Spain.
pub const SEARCH_LATITUDE: f64 = 40.416775;
pub const SEARCH_LONGITUDE: f64 = -3.703790;
pub const SEARCH_RADIUS_KM: u32 = 600;
pub const SEARCH_RESULT_TYPE: &str = "recent";
pub const SEARCH_COUNT: u32 = 100;

#[derive(Debug, Clone, PartialEq)]
pub struct SearchParams {
    pub query: String,
    pub lang: String,
    pub latitude: f64,
    pub longitude: f64,
    pub radius_km: u32,
    pub result_type: String,
    pub count: u32,
}

impl SearchParams {
    /// Search parameters for `query` under the fixed language/geo policy.
    pub fn for_query(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            lang: SEARCH_LANG.to_string(),
            latitude: SEARCH_LATITUDE,
            longitude: SEARCH_LONGITUDE,
            radius_km: SEARCH_RADIUS_KM,
            result_type: SEARCH_RESULT_TYPE.to_string(),
            count: SEARCH_COUNT,
        }
    }
}

// ---------------------------------------------------------------------------
// Candidate
// ---------------------------------------------------------------------------

/// One search result, as far as reply eligibility is concerned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    /// Author handle as returned by the API (original casing).
    pub handle: String,
    pub post_id: u64,
    /// Follower count reported alongside the post.
    pub follower_count: u64,
    pub is_retweet: bool,
}

impl Candidate {
    pub fn normalized_handle(&self) -> String {
        normalize_handle(&self.handle)
    }
}

/// Handles compare case-insensitively; every stored handle goes through this.
pub fn normalize_handle(handle: &str) -> String {
    handle.trim().to_lowercase()
}

// ---------------------------------------------------------------------------
// ApiError / MicroblogApi
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ApiError {
    #[error("rate limit exceeded")]
    RateLimited { retry_after: Option<Duration> },

    #[error("duplicate content")]
    DuplicateContent,

    #[error("{message}")]
    Other { message: String },
}

impl ApiError {
    pub fn other(message: impl Into<String>) -> Self {
        ApiError::Other {
            message: message.into(),
        }
    }
}

pub trait MicroblogApi {
    /// Posts matching `params`, most recent first.
    fn search(&self, params: &SearchParams) -> Result<Vec<Candidate>, ApiError>;

    /// Number of followers of `handle`, counting at most `limit`.
    fn follower_count(&self, handle: &str, limit: u32) -> Result<u64, ApiError>;

    /// Post `text` as a reply to `in_reply_to`.
    fn post_reply(&self, text: &str, in_reply_to: u64) -> Result<(), ApiError>;

    /// Handle of the authenticated account.
    fn verify_credentials(&self) -> Result<String, ApiError>;
}
