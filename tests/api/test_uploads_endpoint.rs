// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use super::support::{get_request, multipart_body, predict_request, send, send_json, test_app};
use crate::common::{green_png, pipeline_with, MockClassifier};
use axum::http::StatusCode;
use herbal_leaf_node::classifier::HerbalSpecies;
use herbal_leaf_node::enrichment::EnrichmentChain;
use std::sync::Arc;

#[tokio::test]
async fn test_uploaded_image_is_served_back() {
    let pipeline = pipeline_with(
        Arc::new(MockClassifier::confident(HerbalSpecies::Mint, 0.9)),
        EnrichmentChain::not_configured(),
    );
    let app = test_app(pipeline, 1024 * 1024);
    let png = green_png();

    let (status, json) =
        send_json(&app.router, predict_request(multipart_body("file", "mint.png", &png))).await;
    assert_eq!(status, StatusCode::OK);

    let path = json["imagePath"].as_str().unwrap().to_string();
    let (status, bytes) = send(&app.router, get_request(&path)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(bytes, png);
}

#[tokio::test]
async fn test_missing_upload_is_404() {
    let pipeline = pipeline_with(
        Arc::new(MockClassifier::confident(HerbalSpecies::Mint, 0.9)),
        EnrichmentChain::not_configured(),
    );
    let app = test_app(pipeline, 1024 * 1024);

    let (status, _) = send(&app.router, get_request("/uploads/absent.png")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_encoded_traversal_is_rejected() {
    let pipeline = pipeline_with(
        Arc::new(MockClassifier::confident(HerbalSpecies::Mint, 0.9)),
        EnrichmentChain::not_configured(),
    );
    let app = test_app(pipeline, 1024 * 1024);

    let (status, _) = send(&app.router, get_request("/uploads/..%2Fsecret.png")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_failed_upload_keeps_earlier_file_with_same_name() {
    let pipeline = pipeline_with(
        Arc::new(MockClassifier::confident(HerbalSpecies::Pandan, 0.8)),
        EnrichmentChain::not_configured(),
    );
    let app = test_app(pipeline, 1024 * 1024);
    let png = green_png();

    let (status, json) =
        send_json(&app.router, predict_request(multipart_body("file", "leaf.png", &png))).await;
    assert_eq!(status, StatusCode::OK);
    let path = json["imagePath"].as_str().unwrap().to_string();

    let bogus = multipart_body("file", "leaf.png", b"not an image at all");
    let (status, _) = send_json(&app.router, predict_request(bogus)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, bytes) = send(&app.router, get_request(&path)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(bytes, png);
}
