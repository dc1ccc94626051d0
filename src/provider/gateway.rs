//! OpenAI-compatible chat completions client (OpenRouter by default).

use std::time::Duration;

use reqwest::{Client, StatusCode, header};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use super::client::GenerationProvider;
use super::error::{ProviderCause, ProviderError};
use super::prompt::Prompt;
use crate::store::ServiceConfig;
use crate::types::{Target, Tone};

/// Settings for the outbound call, split out of [`ServiceConfig`].
#[derive(Debug, Clone)]
pub struct GatewaySettings {
    pub base_url: String,
    pub api_key: Option<SecretString>,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub timeout: Duration,
    pub referer: Option<String>,
    pub title: Option<String>,
}

impl From<&ServiceConfig> for GatewaySettings {
    fn from(config: &ServiceConfig) -> Self {
        Self {
            base_url: config.provider_base_url.trim_end_matches('/').to_string(),
            api_key: config.provider_api_key_secret(),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
            timeout: Duration::from_secs(config.request_timeout_secs),
            referer: config.app_referer.clone(),
            title: config.app_title.clone(),
        }
    }
}

/// Calls the external provider once per target.
pub struct ProviderGateway {
    client: Client,
    settings: GatewaySettings,
}

impl ProviderGateway {
    pub fn new(settings: GatewaySettings) -> Result<Self, reqwest::Error> {
        let mut headers = header::HeaderMap::new();
        if let Some(referer) = settings
            .referer
            .as_deref()
            .and_then(|r| header::HeaderValue::from_str(r).ok())
        {
            headers.insert(header::HeaderName::from_static("http-referer"), referer);
        }
        if let Some(title) = settings
            .title
            .as_deref()
            .and_then(|t| header::HeaderValue::from_str(t).ok())
        {
            headers.insert(header::HeaderName::from_static("x-title"), title);
        }

        let client = Client::builder()
            .default_headers(headers)
            .timeout(settings.timeout)
            .build()?;

        Ok(Self { client, settings })
    }

    fn chat_completions_url(&self) -> String {
        format!("{}/chat/completions", self.settings.base_url)
    }
}

// Chat completions request/response types
#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Option<MessageResponse>,
}

#[derive(Debug, Deserialize)]
struct MessageResponse {
    content: Option<String>,
}

impl GenerationProvider for ProviderGateway {
    async fn generate(
        &self,
        text: &str,
        target: &Target,
        tone: &Tone,
    ) -> Result<String, ProviderError> {
        let fail = |cause: ProviderCause| ProviderError::new(target.id(), cause);

        let api_key = self
            .settings
            .api_key
            .as_ref()
            .ok_or_else(|| fail(ProviderCause::NotConfigured("missing API key".to_string())))?;

        let prompt = Prompt::build(text, target, tone);
        let body = ChatRequest {
            model: &self.settings.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: &prompt.system,
                },
                ChatMessage {
                    role: "user",
                    content: &prompt.user,
                },
            ],
            max_tokens: self.settings.max_tokens,
            temperature: self.settings.temperature,
        };

        debug!(platform = %target, model = %self.settings.model, "requesting generation");

        let response = self
            .client
            .post(self.chat_completions_url())
            .bearer_auth(api_key.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(|e| fail(e.into()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(platform = %target, status = status.as_u16(), body = %body, "provider error");

            if status == StatusCode::TOO_MANY_REQUESTS {
                return Err(fail(ProviderCause::RateLimited));
            }
            return Err(fail(ProviderCause::Status {
                status: status.as_u16(),
                body,
            }));
        }

        let chat: ChatResponse = response
            .json()
            .await
            .map_err(|e| fail(ProviderCause::Malformed(e.to_string())))?;

        chat.choices
            .into_iter()
            .next()
            .and_then(|c| c.message)
            .and_then(|m| m.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or_else(|| fail(ProviderCause::Malformed("no content in first choice".to_string())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn settings(base_url: String) -> GatewaySettings {
        GatewaySettings {
            base_url,
            api_key: Some(SecretString::from("sk-or-test")),
            model: "google/gemini-2.5-flash-preview".to_string(),
            max_tokens: 1000,
            temperature: 0.7,
            timeout: Duration::from_secs(5),
            referer: Some("https://repurpose.example".to_string()),
            title: Some("Content Repurposer".to_string()),
        }
    }

    fn completion(content: &str) -> serde_json::Value {
        json!({ "choices": [{ "message": { "role": "assistant", "content": content } }] })
    }

    #[tokio::test]
    async fn test_generate_sends_prompt_and_settings() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("authorization", "Bearer sk-or-test"))
            .and(header("http-referer", "https://repurpose.example"))
            .and(header("x-title", "Content Repurposer"))
            .and(body_partial_json(json!({
                "model": "google/gemini-2.5-flash-preview",
                "max_tokens": 1000,
                "messages": [
                    { "role": "system" },
                    { "role": "user", "content": "Please repurpose this content:\n\nHello world" }
                ]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion("Hello, world! 🌍")))
            .expect(1)
            .mount(&server)
            .await;

        let gateway = ProviderGateway::new(settings(server.uri())).unwrap();
        let text = gateway
            .generate("Hello world", &Target::Instagram, &Tone::Casual)
            .await
            .unwrap();

        assert_eq!(text, "Hello, world! 🌍");
    }

    #[tokio::test]
    async fn test_non_success_status_is_provider_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_string("upstream exploded"))
            .mount(&server)
            .await;

        let gateway = ProviderGateway::new(settings(server.uri())).unwrap();
        let err = gateway
            .generate("text", &Target::Linkedin, &Tone::Professional)
            .await
            .unwrap_err();

        assert_eq!(err.target, "linkedin");
        assert!(matches!(err.cause, ProviderCause::Status { status: 500, .. }));
    }

    #[tokio::test]
    async fn test_rate_limit_is_distinguished() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&server)
            .await;

        let gateway = ProviderGateway::new(settings(server.uri())).unwrap();
        let err = gateway
            .generate("text", &Target::Twitter, &Tone::Viral)
            .await
            .unwrap_err();

        assert!(matches!(err.cause, ProviderCause::RateLimited));
    }

    #[tokio::test]
    async fn test_malformed_bodies_are_provider_errors() {
        let bodies = [
            json!({ "choices": [] }),
            json!({ "choices": [{ "message": { "content": null } }] }),
            json!({ "choices": [{ "message": { "content": "   " } }] }),
            json!({ "unexpected": true }),
        ];

        for body in bodies {
            let server = MockServer::start().await;
            Mock::given(method("POST"))
                .respond_with(ResponseTemplate::new(200).set_body_json(body))
                .mount(&server)
                .await;

            let gateway = ProviderGateway::new(settings(server.uri())).unwrap();
            let err = gateway
                .generate("text", &Target::Facebook, &Tone::Friendly)
                .await
                .unwrap_err();

            assert!(matches!(err.cause, ProviderCause::Malformed(_)));
        }
    }

    #[tokio::test]
    async fn test_missing_key_fails_without_calling_out() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion("never")))
            .expect(0)
            .mount(&server)
            .await;

        let gateway = ProviderGateway::new(GatewaySettings {
            api_key: None,
            ..settings(server.uri())
        })
        .unwrap();
        let err = gateway
            .generate("text", &Target::Twitter, &Tone::Casual)
            .await
            .unwrap_err();

        assert!(matches!(err.cause, ProviderCause::NotConfigured(_)));
    }

    #[tokio::test]
    async fn test_timeout_is_provider_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(completion("late"))
                    .set_delay(Duration::from_secs(2)),
            )
            .mount(&server)
            .await;

        let gateway = ProviderGateway::new(GatewaySettings {
            timeout: Duration::from_millis(100),
            ..settings(server.uri())
        })
        .unwrap();
        let err = gateway
            .generate("text", &Target::Instagram, &Tone::Casual)
            .await
            .unwrap_err();

        assert!(matches!(err.cause, ProviderCause::Http(_)));
    }
}
