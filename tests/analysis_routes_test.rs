//! `/analyze_frame` と `/analyze_flow` の統合テスト

mod common;

use axum::http::StatusCode;
use common::{
    gray_png, uniform_png, BrokenClassifier, ConstantReconstruction, FailingReconstruction,
    FixedClass, TestAppBuilder, TruncatedReconstruction,
};
use serde_json::json;
use surveil_rs::detection::frame::{MAX_FRAME_BYTES, MAX_FRAME_DIMENSION};

#[tokio::test]
async fn test_frame_requires_session() {
    let app = TestAppBuilder::new().build();
    let response = app.upload_frame("surveil_session=bogus", "a.png", &uniform_png(0, 8)).await;
    assert_eq!(response.status, StatusCode::SEE_OTHER);
}

#[tokio::test]
async fn test_invalid_extension_checked_before_model() {
    // モデルなし
    let app = TestAppBuilder::new().build();
    let cookie = app.login().await;

    let response = app.upload_frame(&cookie, "notes.txt", b"hello").await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.json()["error"], "Invalid file type. Only images are allowed.");

    let app = TestAppBuilder::new().frame_model(ConstantReconstruction(0.0)).build();
    let cookie = app.login().await;
    let response = app.upload_frame(&cookie, "notes.txt", b"hello").await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_empty_filename() {
    let app = TestAppBuilder::new().build();
    let cookie = app.login().await;

    let response = app.upload_frame(&cookie, "", b"hello").await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.json()["error"], "No file selected");
}

#[tokio::test]
async fn test_missing_frame_field() {
    let app = TestAppBuilder::new().build();
    let cookie = app.login().await;

    let response = app.post_json("/analyze_frame", &cookie, json!({})).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.json()["error"], "No file provided");
}

#[tokio::test]
async fn test_oversized_upload_is_rejected() {
    let app = TestAppBuilder::new().frame_model(ConstantReconstruction(0.0)).build();
    let cookie = app.login().await;

    let mut bytes = uniform_png(0, 8);
    bytes.resize(MAX_FRAME_BYTES + 1, 0);

    let response = app.upload_frame(&cookie, "big.png", &bytes).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.json()["error"], "File too large. Maximum size is 10MB.");
}

#[tokio::test]
async fn test_frame_without_model() {
    let app = TestAppBuilder::new().build();
    let cookie = app.login().await;

    let response = app.upload_frame(&cookie, "cam1.png", &uniform_png(0, 16)).await;
    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.json()["error"], "Anomaly detection model not available");
}

#[tokio::test]
async fn test_undecodable_image() {
    let app = TestAppBuilder::new().frame_model(ConstantReconstruction(0.0)).build();
    let cookie = app.login().await;

    let response = app.upload_frame(&cookie, "cam1.PNG", b"not really a png").await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.json()["error"], "Invalid image file");
}

#[tokio::test]
async fn test_oversized_dimensions_are_undecodable() {
    let app = TestAppBuilder::new().frame_model(ConstantReconstruction(0.0)).build();
    let cookie = app.login().await;

    // 数KBのPNGでも画素数が上限を超えれば展開しない
    let bytes = gray_png(MAX_FRAME_DIMENSION + 1, 2, 0);
    assert!(bytes.len() < MAX_FRAME_BYTES);

    let response = app.upload_frame(&cookie, "wide.png", &bytes).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.json()["error"], "Invalid image file");
}

#[tokio::test]
async fn test_model_failure_is_generic() {
    let app = TestAppBuilder::new().frame_model(FailingReconstruction).build();
    let cookie = app.login().await;

    let response = app.upload_frame(&cookie, "cam1.png", &uniform_png(0, 32)).await;
    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.json()["error"], "Analysis failed");
    assert!(!response.text().contains("0x7f3a"));
}

#[tokio::test]
async fn test_reconstruction_shape_mismatch_is_generic() {
    let app = TestAppBuilder::new().frame_model(TruncatedReconstruction).build();
    let cookie = app.login().await;

    let response = app.upload_frame(&cookie, "cam1.png", &uniform_png(0, 32)).await;
    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.json(), json!({"error": "Analysis failed"}));
}

#[tokio::test]
async fn test_frame_verdicts() {
    // 黒フレームを 0.0 で再構成 → 誤差 0
    let app = TestAppBuilder::new().frame_model(ConstantReconstruction(0.0)).build();
    let cookie = app.login().await;
    let response = app.upload_frame(&cookie, "cam1.png", &uniform_png(0, 64)).await;
    assert_eq!(response.status, StatusCode::OK);
    let body = response.json();
    assert_eq!(body["anomaly"], false);
    assert_eq!(body["error"].as_f64(), Some(0.0));

    // 0.1 で再構成 → 誤差 0.01 > 0.0025
    let app = TestAppBuilder::new().frame_model(ConstantReconstruction(0.1)).build();
    let cookie = app.login().await;
    let response = app.upload_frame(&cookie, "cam1.jpg.png", &uniform_png(0, 64)).await;
    assert_eq!(response.status, StatusCode::OK);
    let body = response.json();
    assert_eq!(body["anomaly"], true);
    assert!((body["error"].as_f64().unwrap() - 0.01).abs() < 1e-6);
}

#[tokio::test]
async fn test_flow_missing_fields_named_in_order() {
    let app = TestAppBuilder::new().flow_model(FixedClass(0)).build();
    let cookie = app.login().await;

    let cases = [
        (json!({"Pkt Len Std": 1.0, "Flow Pkts/s": 2.0}), "Flow Byts/s"),
        (json!({"Flow Byts/s": 1.0, "Flow Pkts/s": 2.0}), "Pkt Len Std"),
        (json!({"Flow Byts/s": 1.0}), "Pkt Len Std"),
        (json!({"Flow Byts/s": 1.0, "Pkt Len Std": 2.0}), "Flow Pkts/s"),
    ];

    for (body, field) in cases {
        let response = app.post_json("/analyze_flow", &cookie, body).await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST);
        assert_eq!(
            response.json()["error"],
            format!("Missing required field: {}", field)
        );
    }
}

#[tokio::test]
async fn test_flow_empty_body() {
    let app = TestAppBuilder::new().build();
    let cookie = app.login().await;

    let response = app.post_json("/analyze_flow", &cookie, json!({})).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.json()["error"], "No data provided");
}

#[tokio::test]
async fn test_flow_without_model() {
    let app = TestAppBuilder::new().build();
    let cookie = app.login().await;

    let response = app
        .post_json("/analyze_flow", &cookie, json!({"Flow Byts/s": 1.0}))
        .await;
    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.json()["error"], "Network analysis model not available");
}

#[tokio::test]
async fn test_flow_classification() {
    let app = TestAppBuilder::new().flow_model(FixedClass(1)).build();
    let cookie = app.login().await;

    let body = json!({"Flow Byts/s": 1500.0, "Pkt Len Std": 60.5, "Flow Pkts/s": 30.0});
    let response = app.post_json("/analyze_flow", &cookie, body).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json(), json!({"attack": true, "label": "Attack"}));
}

#[tokio::test]
async fn test_flow_non_numeric_value() {
    let app = TestAppBuilder::new().flow_model(FixedClass(0)).build();
    let cookie = app.login().await;

    let body = json!({"Flow Byts/s": "fast", "Pkt Len Std": 1.0, "Flow Pkts/s": 2.0});
    let response = app.post_json("/analyze_flow", &cookie, body).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.json()["error"], "Invalid value for field: Flow Byts/s");
}

#[tokio::test]
async fn test_flow_classifier_failure_is_generic() {
    let app = TestAppBuilder::new().flow_model(BrokenClassifier).build();
    let cookie = app.login().await;

    let body = json!({"Flow Byts/s": 1.0, "Pkt Len Std": 1.0, "Flow Pkts/s": 1.0});
    let response = app.post_json("/analyze_flow", &cookie, body).await;
    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.json()["error"], "Flow analysis failed");
    assert!(!response.text().contains("tree walk"));
}
