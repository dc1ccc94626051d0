//! Request-level error taxonomy and its HTTP mapping.
//!
//! Every failure leaves the service as a flat `{"error": message}` body.
//! Causes (provider status, SQL errors) are logged, not returned.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

use super::orchestrator::Stage;
use crate::identity::IdentityError;
use crate::provider::ProviderError;
use crate::types::DataError;

#[derive(Debug, Error)]
pub enum GenerateError {
    #[error(transparent)]
    Auth(#[from] IdentityError),

    #[error("{0}")]
    Validation(String),

    #[error("daily limit reached")]
    QuotaExceeded,

    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error("storage error: {0}")]
    Persistence(#[from] DataError),

    #[error("generation not found")]
    NotFound,
}

impl GenerateError {
    pub fn status(&self) -> StatusCode {
        match self {
            GenerateError::Auth(_) => StatusCode::UNAUTHORIZED,
            GenerateError::Validation(_) => StatusCode::BAD_REQUEST,
            GenerateError::QuotaExceeded => StatusCode::TOO_MANY_REQUESTS,
            GenerateError::Provider(_) => StatusCode::BAD_GATEWAY,
            GenerateError::Persistence(_) => StatusCode::INTERNAL_SERVER_ERROR,
            GenerateError::NotFound => StatusCode::NOT_FOUND,
        }
    }

    /// Message safe to show the caller.
    pub fn public_message(&self) -> String {
        match self {
            GenerateError::Auth(IdentityError::MissingToken) => "Authorization required".to_string(),
            GenerateError::Auth(_) => "Invalid token".to_string(),
            GenerateError::Validation(msg) => msg.clone(),
            GenerateError::QuotaExceeded => {
                "Daily limit reached. Upgrade to Pro for unlimited generations.".to_string()
            }
            GenerateError::Provider(e) => format!("Failed to generate content for {}", e.target),
            GenerateError::Persistence(_) => "Internal storage error".to_string(),
            GenerateError::NotFound => "Generation not found".to_string(),
        }
    }

    /// Log the failure with the stage the request reached.
    pub fn log(&self, stage: Stage) {
        match self {
            GenerateError::Provider(_) | GenerateError::Persistence(_) => {
                error!(stage = ?stage, error = %self, "request failed")
            }
            GenerateError::Auth(IdentityError::Unavailable(_)) => {
                error!(stage = ?stage, error = %self, "identity service unavailable")
            }
            _ => warn!(stage = ?stage, error = %self, "request rejected"),
        }
    }
}

impl IntoResponse for GenerateError {
    fn into_response(self) -> Response {
        let body = match &self {
            GenerateError::QuotaExceeded => json!({
                "error": self.public_message(),
                "limitReached": true,
            }),
            _ => json!({ "error": self.public_message() }),
        };

        (self.status(), Json(body)).into_response()
    }
}
