//! Error taxonomy for admin API calls

use thiserror::Error;

/// Everything an admin API call can fail with
///
/// `Validation` never reaches the network; `AlreadyResolved` is benign and
/// callers treat it as success-equivalent. Only `Transport` represents a
/// genuine remote failure.
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    /// Client-detected problem; the call was blocked before any request
    #[error("{0}")]
    Validation(String),

    /// Network failure or a non-2xx reply
    #[error("{message}")]
    Transport {
        /// HTTP status, if a reply arrived at all
        status: Option<u16>,
        message: String,
    },

    /// The hanging request no longer exists; a concurrent poll or another
    /// operator already settled it
    #[error("request was already resolved")]
    AlreadyResolved,
}

impl ApiError {
    /// Build a transport error from a non-2xx reply, preferring the server's
    /// own message text when it sent one
    pub fn from_status(status: u16, body: String, fallback: &str) -> Self {
        let trimmed = body.trim();
        let message = if trimmed.is_empty() {
            format!("{} (HTTP {})", fallback, status)
        } else {
            trimmed.to_string()
        };
        ApiError::Transport {
            status: Some(status),
            message,
        }
    }

    /// Build a transport error from a request that never got a reply
    pub fn from_network(err: &reqwest::Error, fallback: &str) -> Self {
        ApiError::Transport {
            status: None,
            message: format!("{}: {}", fallback, err),
        }
    }

    /// True for outcomes the UI should not present as failures
    pub fn is_benign(&self) -> bool {
        matches!(self, ApiError::AlreadyResolved)
    }
}
