use std::time::Duration;
use thiserror::Error;

/// Why a suggestion request failed.
///
/// The controller treats every variant the same way; the detail is only logged.
#[derive(Debug, Error)]
pub enum SuggestionError {
    #[error("no suggestion endpoint is configured")]
    NotConfigured,

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("suggestion service returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("invalid response: {0}")]
    InvalidResponse(String),

    #[error("timed out after {0:?}")]
    Timeout(Duration),

    #[error("suggestion client panicked")]
    Panicked,
}
