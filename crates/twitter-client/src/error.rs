use thiserror::Error;

/// Error code returned when the request budget for an endpoint is exhausted.
pub const RATE_LIMIT_EXCEEDED: i64 = 88;

/// Error code returned when a status update repeats a recent one verbatim.
pub const DUPLICATE_STATUS: i64 = 187;

#[derive(Debug, Error)]
pub enum TwitterError {
    #[error("twitter API error (HTTP {status}): {message}")]
    Api {
        status: u16,
        code: Option<i64>,
        message: String,
        /// Epoch seconds from the `x-rate-limit-reset` header, when sent.
        rate_limit_reset: Option<i64>,
    },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("failed to sign request: {0}")]
    Signing(String),

    #[error("failed to parse response from {endpoint}: {source}")]
    Parse {
        endpoint: String,
        #[source]
        source: serde_json::Error,
    },
}

impl TwitterError {
    pub fn code(&self) -> Option<i64> {
        match self {
            TwitterError::Api { code, .. } => *code,
            _ => None,
        }
    }

    pub fn is_rate_limited(&self) -> bool {
        match self {
            TwitterError::Api { status, code, .. } => {
                *status == 429 || *code == Some(RATE_LIMIT_EXCEEDED)
            }
            _ => false,
        }
    }

    pub fn is_duplicate_status(&self) -> bool {
        self.code() == Some(DUPLICATE_STATUS)
    }

    pub fn rate_limit_reset(&self) -> Option<i64> {
        match self {
            TwitterError::Api {
                rate_limit_reset, ..
            } => *rate_limit_reset,
            _ => None,
        }
    }
}
