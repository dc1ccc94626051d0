//! Identity service client.
//!
//! `GET {base}/user` with the caller's token answers with the user object
//! for a live token and a 4xx for anything else.

use std::time::Duration;

use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::{debug, warn};
use url::Url;

use super::{IdentityError, IdentityVerifier};
use crate::types::UserId;

const VERIFY_TIMEOUT: Duration = Duration::from_secs(10);

pub struct HttpIdentityVerifier {
    client: Client,
    user_url: Url,
    api_key: Option<SecretString>,
}

impl HttpIdentityVerifier {
    pub fn new(base_url: &str, api_key: Option<SecretString>) -> anyhow::Result<Self> {
        // Keep any path prefix: join() drops the last segment without a trailing slash
        let mut base = Url::parse(base_url)?;
        if !base.path().ends_with('/') {
            base.set_path(&format!("{}/", base.path()));
        }

        let client = Client::builder().timeout(VERIFY_TIMEOUT).build()?;

        Ok(Self {
            client,
            user_url: base.join("user")?,
            api_key,
        })
    }
}

#[derive(Debug, Deserialize)]
struct UserResponse {
    id: UserId,
}

impl IdentityVerifier for HttpIdentityVerifier {
    async fn verify(&self, token: &str) -> Result<UserId, IdentityError> {
        let mut request = self.client.get(self.user_url.clone()).bearer_auth(token);
        if let Some(key) = &self.api_key {
            request = request.header("apikey", key.expose_secret());
        }

        let response = request.send().await.map_err(|e| {
            warn!(error = %e, "identity service request failed");
            IdentityError::Unavailable(e.to_string())
        })?;

        let status = response.status();
        if status.is_client_error() {
            debug!(status = status.as_u16(), "token rejected");
            return Err(IdentityError::Rejected);
        }
        if !status.is_success() {
            warn!(status = status.as_u16(), "identity service error");
            return Err(IdentityError::Unavailable(format!("status {}", status)));
        }

        let user: UserResponse = response.json().await.map_err(|e| {
            warn!(error = %e, "unreadable identity response");
            IdentityError::Rejected
        })?;

        Ok(user.id)
    }
}
