// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use super::support::{
    multipart_body, predict_request, send_json, test_app, text_only_body, TestApp,
};
use crate::common::{
    chain_with, green_png, pipeline_with, MockClassifier, MockProvider, SAMPLE_DESCRIPTION,
};
use axum::http::StatusCode;
use herbal_leaf_node::classifier::{ClassificationEngine, HerbalSpecies};
use herbal_leaf_node::enrichment::EnrichmentChain;
use herbal_leaf_node::pipeline::InferencePipeline;
use std::sync::Arc;

fn working_pipeline(classifier: Arc<MockClassifier>) -> InferencePipeline {
    pipeline_with(
        classifier,
        chain_with(Arc::new(
            MockProvider::new().succeed("gemini-2.0-flash", SAMPLE_DESCRIPTION),
        )),
    )
}

#[tokio::test]
async fn test_predict_success() {
    let classifier = Arc::new(MockClassifier::confident(HerbalSpecies::Sirih, 0.912));
    let app = test_app(working_pipeline(classifier.clone()), 1024 * 1024);

    let body = multipart_body("file", "daun sirih.png", &green_png());
    let (status, json) = send_json(&app.router, predict_request(body)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["predictedClass"], "sirih");
    assert_eq!(json["name"], "Sirih");
    assert_eq!(json["confidenceDisplay"], "91.2");
    assert_eq!(json["description"], SAMPLE_DESCRIPTION);
    assert_eq!(json["enrichment"]["status"], "generated");
    assert_eq!(json["enrichment"]["model"], "gemini-2.0-flash");
    let image_path = json["imagePath"].as_str().unwrap();
    assert!(image_path.starts_with("/uploads/daun_sirih_"));
    assert!(image_path.ends_with(".png"));
    let stored = image_path.trim_start_matches("/uploads/");
    assert!(app.upload_dir.path().join(stored).exists());
    assert_eq!(classifier.calls(), 1);
}

#[tokio::test]
async fn test_predict_missing_file_field() {
    let classifier = Arc::new(MockClassifier::confident(HerbalSpecies::Sirih, 0.9));
    let app = test_app(working_pipeline(classifier.clone()), 1024 * 1024);

    let (status, json) =
        send_json(&app.router, predict_request(text_only_body("note", "hello"))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["errorType"], "validation_error");
    assert_eq!(classifier.calls(), 0);
}

#[tokio::test]
async fn test_predict_rejects_disallowed_extension() {
    let classifier = Arc::new(MockClassifier::confident(HerbalSpecies::Sirih, 0.9));
    let app = test_app(working_pipeline(classifier.clone()), 1024 * 1024);

    let body = multipart_body("file", "leaf.gif", &green_png());
    let (status, json) = send_json(&app.router, predict_request(body)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].as_str().unwrap().contains("Invalid file type"));
    assert_eq!(classifier.calls(), 0);
}

#[tokio::test]
async fn test_predict_text_as_jpeg_is_decode_error() {
    let classifier = Arc::new(MockClassifier::confident(HerbalSpecies::Sirih, 0.9));
    let app = test_app(working_pipeline(classifier.clone()), 1024 * 1024);

    let body = multipart_body("file", "fake.jpg", b"plain text pretending to be a photo");
    let (status, json) = send_json(&app.router, predict_request(body)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["errorType"], "image_decode_error");
    assert_eq!(classifier.calls(), 0);
    assert_eq!(stored_files(&app), 0);
}

#[tokio::test]
async fn test_predict_model_unavailable_is_503() {
    let pipeline = InferencePipeline::new(
        Arc::new(ClassificationEngine::unavailable("model file missing")),
        Arc::new(EnrichmentChain::not_configured()),
    );
    let app = test_app(pipeline, 1024 * 1024);

    let body = multipart_body("file", "leaf.png", &green_png());
    let (status, json) = send_json(&app.router, predict_request(body)).await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(json["errorType"], "model_unavailable");
    assert!(json["error"].as_str().unwrap().contains("model file missing"));
}

#[tokio::test]
async fn test_predict_classifier_failure_is_500() {
    let classifier = Arc::new(MockClassifier::with_scores(vec![0.5, 0.5]));
    let app = test_app(working_pipeline(classifier), 1024 * 1024);

    let body = multipart_body("file", "leaf.png", &green_png());
    let (status, json) = send_json(&app.router, predict_request(body)).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["errorType"], "classification_error");
}

#[tokio::test]
async fn test_predict_enrichment_failure_still_succeeds() {
    let classifier = Arc::new(MockClassifier::confident(HerbalSpecies::Pegagan, 0.8));
    let pipeline = pipeline_with(classifier, chain_with(Arc::new(MockProvider::new())));
    let app = test_app(pipeline, 1024 * 1024);

    let body = multipart_body("file", "pegagan.jpg", &green_png());
    let (status, json) = send_json(&app.router, predict_request(body)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["name"], "Pegagan");
    assert_eq!(json["enrichment"]["status"], "failed");
    assert!(json["description"]
        .as_str()
        .unwrap()
        .contains("gemini-flash-latest"));
}

#[tokio::test]
async fn test_predict_upload_over_limit() {
    let classifier = Arc::new(MockClassifier::confident(HerbalSpecies::Sirih, 0.9));
    let app = test_app(working_pipeline(classifier.clone()), 1024);

    let body = multipart_body("file", "big.png", &vec![0u8; 4096]);
    let (status, _json) = send_json(&app.router, predict_request(body)).await;

    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(classifier.calls(), 0);
}

#[tokio::test]
async fn test_predict_rejects_name_without_usable_stem() {
    let classifier = Arc::new(MockClassifier::confident(HerbalSpecies::Sirih, 0.9));
    let app = test_app(working_pipeline(classifier.clone()), 1024 * 1024);

    // ".png" sanitizes to "png", which has no extension left
    let body = multipart_body("file", ".png", &green_png());
    let (status, json) = send_json(&app.router, predict_request(body)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["errorType"], "validation_error");
    assert_eq!(classifier.calls(), 0);
    assert_eq!(stored_files(&app), 0);
}

fn stored_files(app: &TestApp) -> usize {
    std::fs::read_dir(app.upload_dir.path())
        .map(|entries| entries.count())
        .unwrap_or(0)
}
