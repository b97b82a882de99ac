// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use crate::common::SAMPLE_DESCRIPTION;
use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use herbal_leaf_node::classifier::HerbalSpecies;
use herbal_leaf_node::config::EnrichmentConfig;
use herbal_leaf_node::enrichment::{
    EnrichmentChain, EnrichmentError, EnrichmentOutcome, GeminiProvider, GenerativeProvider,
};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use std::time::Duration;

const TEST_KEY: &str = "test-gemini-key";

#[derive(Clone, Default)]
struct FakeGemini {
    calls: Arc<Mutex<Vec<String>>>,
    prompts: Arc<Mutex<Vec<String>>>,
}

/// Serves `POST /v1beta/models/{model}:generateContent`
///
/// Behaviour is keyed on the model name: `quota-*` answers 429,
/// `missing-*` 404, `blocked-*` a blocked prompt, `slow-*` sleeps, and
/// anything else returns the sample description.
async fn generate_content(
    State(fake): State<FakeGemini>,
    Path(model_action): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if headers.get("x-goog-api-key").and_then(|v| v.to_str().ok()) != Some(TEST_KEY) {
        return (
            StatusCode::FORBIDDEN,
            error_body(403, "API key not valid", "PERMISSION_DENIED"),
        )
            .into_response();
    }

    let Some(model) = model_action.strip_suffix(":generateContent") else {
        return StatusCode::NOT_FOUND.into_response();
    };
    fake.calls.lock().unwrap().push(model.to_string());
    fake.prompts.lock().unwrap().push(
        body["contents"][0]["parts"][0]["text"]
            .as_str()
            .unwrap_or_default()
            .to_string(),
    );

    if model.starts_with("quota-") {
        return (
            StatusCode::TOO_MANY_REQUESTS,
            error_body(
                429,
                "Resource has been exhausted (e.g. check quota).",
                "RESOURCE_EXHAUSTED",
            ),
        )
            .into_response();
    }
    if model.starts_with("missing-") {
        return (
            StatusCode::NOT_FOUND,
            error_body(404, &format!("models/{} is not found", model), "NOT_FOUND"),
        )
            .into_response();
    }
    if model.starts_with("blocked-") {
        return Json(json!({"promptFeedback": {"blockReason": "SAFETY"}})).into_response();
    }
    if model.starts_with("slow-") {
        tokio::time::sleep(Duration::from_secs(3)).await;
    }

    Json(json!({
        "candidates": [{
            "content": {"parts": [{"text": SAMPLE_DESCRIPTION}], "role": "model"},
            "finishReason": "STOP"
        }]
    }))
    .into_response()
}

fn error_body(code: u16, message: &str, status: &str) -> Json<Value> {
    Json(json!({"error": {"code": code, "message": message, "status": status}}))
}

async fn spawn_fake_gemini() -> (String, FakeGemini) {
    let fake = FakeGemini::default();
    let app = Router::new()
        .route("/v1beta/models/:model_action", post(generate_content))
        .with_state(fake.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{}/v1beta", addr), fake)
}

fn config(api_base: &str, models: &[&str], timeout_ms: u64) -> EnrichmentConfig {
    EnrichmentConfig {
        api_key: Some(TEST_KEY.to_string()),
        api_base: api_base.to_string(),
        models: models.iter().map(|m| m.to_string()).collect(),
        timeout_ms,
        language: "Bahasa Indonesia".to_string(),
    }
}

#[tokio::test]
async fn test_provider_returns_candidate_text() {
    let (base, fake) = spawn_fake_gemini().await;
    let provider = GeminiProvider::new(TEST_KEY, base, Duration::from_secs(5)).unwrap();

    let text = provider.generate("gemini-2.0-flash", "hello").await.unwrap();

    assert_eq!(text, SAMPLE_DESCRIPTION);
    assert_eq!(*fake.calls.lock().unwrap(), vec!["gemini-2.0-flash"]);
    assert_eq!(*fake.prompts.lock().unwrap(), vec!["hello"]);
}

#[tokio::test]
async fn test_provider_maps_429_to_rate_limited() {
    let (base, _fake) = spawn_fake_gemini().await;
    let provider = GeminiProvider::new(TEST_KEY, base, Duration::from_secs(5)).unwrap();

    let err = provider.generate("quota-model", "hello").await.unwrap_err();

    assert_eq!(
        err,
        EnrichmentError::RateLimited {
            model: "quota-model".to_string(),
            message: "Resource has been exhausted (e.g. check quota).".to_string(),
        }
    );
}

#[tokio::test]
async fn test_provider_maps_wrong_key_to_api_error() {
    let (base, _fake) = spawn_fake_gemini().await;
    let provider = GeminiProvider::new("wrong-key", base, Duration::from_secs(5)).unwrap();

    let err = provider.generate("gemini-2.0-flash", "hello").await.unwrap_err();

    assert!(matches!(err, EnrichmentError::Api { status: 403, .. }));
    assert!(err.to_string().contains("API key not valid"));
}

#[tokio::test]
async fn test_provider_reports_blocked_prompt() {
    let (base, _fake) = spawn_fake_gemini().await;
    let provider = GeminiProvider::new(TEST_KEY, base, Duration::from_secs(5)).unwrap();

    let err = provider.generate("blocked-model", "hello").await.unwrap_err();

    assert_eq!(
        err,
        EnrichmentError::EmptyResponse {
            model: "blocked-model".to_string(),
            reason: Some("SAFETY".to_string()),
        }
    );
}

#[tokio::test]
async fn test_chain_over_http_falls_back_in_order() {
    let (base, fake) = spawn_fake_gemini().await;
    let chain = EnrichmentChain::from_config(&config(
        &base,
        &["quota-a", "quota-b", "gemini-1.5-flash", "gemini-flash-latest"],
        5_000,
    ))
    .unwrap();

    let outcome = chain.enrich(HerbalSpecies::LidahBuaya).await;

    assert_eq!(
        outcome,
        EnrichmentOutcome::Text {
            body: SAMPLE_DESCRIPTION.to_string(),
            model: Some("gemini-1.5-flash".to_string()),
        }
    );
    assert_eq!(
        *fake.calls.lock().unwrap(),
        vec!["quota-a", "quota-b", "gemini-1.5-flash"]
    );
    assert!(fake.prompts.lock().unwrap()[0].contains("\"Lidah Buaya\""));
}

#[tokio::test]
async fn test_chain_over_http_reports_last_error() {
    let (base, _fake) = spawn_fake_gemini().await;
    let chain = EnrichmentChain::from_config(&config(&base, &["quota-a", "missing-b"], 5_000))
        .unwrap();

    let outcome = chain.enrich(HerbalSpecies::Pandan).await;

    let description = outcome.description();
    assert!(outcome.is_failed());
    assert!(description.contains("models/missing-b is not found"));
    assert!(!description.contains("exhausted"));
}

#[tokio::test]
async fn test_chain_over_http_times_out_slow_candidate() {
    let (base, fake) = spawn_fake_gemini().await;
    let chain = EnrichmentChain::from_config(&config(&base, &["slow-a", "gemini-2.0-flash"], 300))
        .unwrap();

    let outcome = chain.enrich(HerbalSpecies::Mint).await;

    assert_eq!(outcome.model(), Some("gemini-2.0-flash"));
    assert_eq!(
        *fake.calls.lock().unwrap(),
        vec!["slow-a", "gemini-2.0-flash"]
    );
}
