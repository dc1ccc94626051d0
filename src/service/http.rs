//! HTTP surface over the orchestrator.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, HeaderName, Method, StatusCode, header};
use axum::response::IntoResponse;
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use serde_json::json;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;
use uuid::Uuid;

use super::error::GenerateError;
use super::orchestrator::{GenerateRequest, GenerationOrchestrator, Stage};
use crate::identity::IdentityVerifier;
use crate::provider::GenerationProvider;
use crate::types::UserId;

type Shared<P, I> = Arc<GenerationOrchestrator<P, I>>;

pub fn router<P, I>(orchestrator: Shared<P, I>) -> Router
where
    P: GenerationProvider + 'static,
    I: IdentityVerifier + 'static,
{
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([
            header::AUTHORIZATION,
            header::CONTENT_TYPE,
            HeaderName::from_static("apikey"),
            HeaderName::from_static("x-client-info"),
        ]);

    Router::new()
        .route("/generate", post(generate::<P, I>))
        .route("/quota", get(quota::<P, I>))
        .route("/history", get(history::<P, I>))
        .route("/history/:id", delete(delete_history::<P, I>))
        .route("/healthz", get(healthz))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(orchestrator)
}

fn authorization(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
}

async fn caller<P, I>(
    orchestrator: &GenerationOrchestrator<P, I>,
    headers: &HeaderMap,
) -> Result<UserId, GenerateError>
where
    P: GenerationProvider,
    I: IdentityVerifier,
{
    orchestrator
        .authenticate(authorization(headers))
        .await
        .inspect_err(|e| e.log(Stage::Received))
}

async fn generate<P, I>(
    State(orchestrator): State<Shared<P, I>>,
    headers: HeaderMap,
    payload: Result<Json<GenerateRequest>, JsonRejection>,
) -> Result<impl IntoResponse, GenerateError>
where
    P: GenerationProvider,
    I: IdentityVerifier,
{
    let user_id = caller(&orchestrator, &headers).await?;

    let Json(request) = payload.map_err(|rejection| {
        warn!(error = %rejection, "unreadable request body");
        GenerateError::Validation("Invalid request body".to_string())
    })?;

    let response = orchestrator.generate_for(user_id, request).await?;
    Ok(Json(response))
}

async fn quota<P, I>(
    State(orchestrator): State<Shared<P, I>>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, GenerateError>
where
    P: GenerationProvider,
    I: IdentityVerifier,
{
    let user_id = caller(&orchestrator, &headers).await?;
    Ok(Json(orchestrator.quota(user_id).await?))
}

async fn history<P, I>(
    State(orchestrator): State<Shared<P, I>>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, GenerateError>
where
    P: GenerationProvider,
    I: IdentityVerifier,
{
    let user_id = caller(&orchestrator, &headers).await?;
    Ok(Json(orchestrator.history(user_id).await?))
}

async fn delete_history<P, I>(
    State(orchestrator): State<Shared<P, I>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<StatusCode, GenerateError>
where
    P: GenerationProvider,
    I: IdentityVerifier,
{
    let user_id = caller(&orchestrator, &headers).await?;

    // A malformed id can't name anything the caller owns
    let id = Uuid::parse_str(&id).map_err(|_| GenerateError::NotFound)?;
    orchestrator.delete_history(user_id, id).await?;

    Ok(StatusCode::NO_CONTENT)
}

async fn healthz() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::testing::{Fixture, ScriptedProvider, TEST_TOKEN, fixture};
    use chrono::NaiveDate;
    use serde_json::Value;

    async fn serve(fx: &Fixture) -> String {
        let app = router(fx.orchestrator.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 10).unwrap()
    }

    #[tokio::test]
    async fn test_generate_and_list_history() {
        let fx = fixture(today(), ScriptedProvider::new()).await;
        let base = serve(&fx).await;
        let client = reqwest::Client::new();

        let response = client
            .post(format!("{}/generate", base))
            .bearer_auth(TEST_TOKEN)
            .json(&json!({
                "content": "Hello world",
                "platforms": ["instagram", "twitter"],
                "tone": "casual",
            }))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 200);

        let body: Value = response.json().await.unwrap();
        assert_eq!(body["generationsRemaining"], 4);
        assert!(body["results"]["instagram"].as_str().unwrap().contains("Hello world"));
        assert!(body["results"]["twitter"].is_string());

        let history: Value = client
            .get(format!("{}/history", base))
            .bearer_auth(TEST_TOKEN)
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(history.as_array().unwrap().len(), 1);
        assert_eq!(history[0]["platforms"], json!(["instagram", "twitter"]));
    }

    #[tokio::test]
    async fn test_quota_exhausted_returns_429() {
        let fx = fixture(today(), ScriptedProvider::new()).await;
        fx.db.ensure_profile(fx.user).await.unwrap();
        for _ in 0..5 {
            fx.db.commit_generation(fx.user, today()).await.unwrap();
        }
        let base = serve(&fx).await;

        let response = reqwest::Client::new()
            .post(format!("{}/generate", base))
            .bearer_auth(TEST_TOKEN)
            .json(&json!({ "text": "x", "targets": ["linkedin"], "tone": "professional" }))
            .send()
            .await
            .unwrap();

        assert_eq!(response.status(), 429);
        let body: Value = response.json().await.unwrap();
        assert_eq!(body["limitReached"], true);
        assert_eq!(
            body["error"],
            "Daily limit reached. Upgrade to Pro for unlimited generations."
        );
    }

    #[tokio::test]
    async fn test_auth_precedes_body_validation() {
        let fx = fixture(today(), ScriptedProvider::new()).await;
        let base = serve(&fx).await;
        let client = reqwest::Client::new();

        let unauthenticated = client
            .post(format!("{}/generate", base))
            .header("content-type", "application/json")
            .body("not json")
            .send()
            .await
            .unwrap();
        assert_eq!(unauthenticated.status(), 401);

        let malformed = client
            .post(format!("{}/generate", base))
            .bearer_auth(TEST_TOKEN)
            .header("content-type", "application/json")
            .body("not json")
            .send()
            .await
            .unwrap();
        assert_eq!(malformed.status(), 400);
    }

    #[tokio::test]
    async fn test_provider_failure_returns_502() {
        let fx = fixture(today(), ScriptedProvider::failing_on(&["facebook"])).await;
        let base = serve(&fx).await;

        let response = reqwest::Client::new()
            .post(format!("{}/generate", base))
            .bearer_auth(TEST_TOKEN)
            .json(&json!({ "text": "x", "targets": ["facebook"], "tone": "friendly" }))
            .send()
            .await
            .unwrap();

        assert_eq!(response.status(), 502);
        let body: Value = response.json().await.unwrap();
        assert_eq!(body["error"], "Failed to generate content for facebook");
    }

    #[tokio::test]
    async fn test_delete_unknown_or_foreign_is_404() {
        let fx = fixture(today(), ScriptedProvider::new()).await;
        let base = serve(&fx).await;
        let client = reqwest::Client::new();

        for id in ["not-a-uuid".to_string(), Uuid::new_v4().to_string()] {
            let response = client
                .delete(format!("{}/history/{}", base, id))
                .bearer_auth(TEST_TOKEN)
                .send()
                .await
                .unwrap();
            assert_eq!(response.status(), 404);
        }
    }

    #[tokio::test]
    async fn test_cors_preflight() {
        let fx = fixture(today(), ScriptedProvider::new()).await;
        let base = serve(&fx).await;

        let response = reqwest::Client::new()
            .request(reqwest::Method::OPTIONS, format!("{}/generate", base))
            .header("origin", "https://app.example")
            .header("access-control-request-method", "POST")
            .header(
                "access-control-request-headers",
                "authorization,apikey,x-client-info",
            )
            .send()
            .await
            .unwrap();

        assert!(response.status().is_success());

        let headers = response.headers();
        assert_eq!(headers["access-control-allow-origin"], "*");

        let allowed = headers["access-control-allow-headers"]
            .to_str()
            .unwrap()
            .to_ascii_lowercase();
        for name in ["authorization", "content-type", "apikey", "x-client-info"] {
            assert!(allowed.contains(name), "{} missing from {}", name, allowed);
        }

        let methods = headers["access-control-allow-methods"].to_str().unwrap();
        assert!(methods.contains("POST"));
        assert!(methods.contains("DELETE"));

        // Preflight never reaches the provider
        assert!(fx.provider.calls().is_empty());
    }

    #[tokio::test]
    async fn test_cors_on_regular_response() {
        let fx = fixture(today(), ScriptedProvider::new()).await;
        let base = serve(&fx).await;

        let response = reqwest::Client::new()
            .get(format!("{}/healthz", base))
            .header("origin", "https://app.example")
            .send()
            .await
            .unwrap();

        assert_eq!(response.headers()["access-control-allow-origin"], "*");
    }

    #[tokio::test]
    async fn test_quota_view_and_health() {
        let fx = fixture(today(), ScriptedProvider::new()).await;
        let base = serve(&fx).await;
        let client = reqwest::Client::new();

        let view: Value = client
            .get(format!("{}/quota", base))
            .bearer_auth(TEST_TOKEN)
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(view["generationsRemaining"], 5);
        assert_eq!(view["dailyLimit"], 5);
        assert_eq!(view["tier"], "free");

        let health = client.get(format!("{}/healthz", base)).send().await.unwrap();
        assert_eq!(health.status(), 200);
    }
}
