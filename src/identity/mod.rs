//! Caller identity - bearer token in, user id out.
//!
//! Token verification is delegated to an external identity service.

mod http;

use std::future::Future;

use thiserror::Error;

use crate::types::UserId;

pub use http::HttpIdentityVerifier;

#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("authorization required")]
    MissingToken,

    #[error("invalid token")]
    Rejected,

    #[error("identity service unavailable: {0}")]
    Unavailable(String),
}

/// Resolves a bearer token to the user it was issued for.
pub trait IdentityVerifier: Send + Sync {
    fn verify(&self, token: &str) -> impl Future<Output = Result<UserId, IdentityError>> + Send;
}

/// Extract the token from an `Authorization: Bearer <token>` header value.
pub fn bearer_token(header: Option<&str>) -> Result<&str, IdentityError> {
    let value = header.map(str::trim).ok_or(IdentityError::MissingToken)?;

    let token = match value.split_once(' ') {
        Some((scheme, rest)) if scheme.eq_ignore_ascii_case("bearer") => rest.trim(),
        _ => value,
    };

    if token.is_empty() {
        return Err(IdentityError::MissingToken);
    }

    Ok(token)
}
