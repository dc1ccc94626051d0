//! Generation provider errors.

use thiserror::Error;

/// A failed call for one target. Never retried here; the caller decides.
#[derive(Debug, Error)]
#[error("generation failed for {target}: {cause}")]
pub struct ProviderError {
    pub target: String,
    #[source]
    pub cause: ProviderCause,
}

impl ProviderError {
    pub fn new(target: impl Into<String>, cause: ProviderCause) -> Self {
        Self {
            target: target.into(),
            cause,
        }
    }
}

#[derive(Debug, Error)]
pub enum ProviderCause {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("provider returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("rate limited")]
    RateLimited,

    #[error("malformed response: {0}")]
    Malformed(String),

    #[error("provider not configured: {0}")]
    NotConfigured(String),
}
