//! 統合テスト共通ヘルパー
#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    body::{Body, Bytes},
    http::{header, HeaderMap, Request, StatusCode},
    Router,
};
use image::{DynamicImage, GrayImage, ImageFormat, Luma};
use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use surveil_rs::config::{AppConfig, AuthConfig};
use surveil_rs::detection::{
    DetectionError, DetectionResult, Detectors, FlowModel, Frame, ReconstructionModel,
};
use surveil_rs::llm::providers::LlmProvider;
use surveil_rs::llm::{LlmClient, LlmConfig, LlmError, LlmRequest, LlmResponse, LlmResult};
use surveil_rs::security::InMemoryUserRepository;
use surveil_rs::session::{SessionManager, SessionManagerConfig};
use surveil_rs::{build_router, AppState};
use tempfile::TempDir;
use tower::ServiceExt;

pub const USERNAME: &str = "admin";
pub const PASSWORD: &str = "password123";
pub const MULTIPART_BOUNDARY: &str = "surveil-test-boundary";

/// Reconstruction stand-in answering every pixel with the same value
pub struct ConstantReconstruction(pub f32);

impl ReconstructionModel for ConstantReconstruction {
    fn reconstruct(&self, frame: &Frame) -> DetectionResult<Vec<f32>> {
        Ok(vec![self.0; frame.len()])
    }

    fn name(&self) -> &str {
        "constant"
    }
}

/// Reconstruction stand-in whose inference always fails
pub struct FailingReconstruction;

impl ReconstructionModel for FailingReconstruction {
    fn reconstruct(&self, _frame: &Frame) -> DetectionResult<Vec<f32>> {
        Err(DetectionError::Inference("session tensor 0x7f3a corrupted".to_string()))
    }

    fn name(&self) -> &str {
        "failing"
    }
}

/// Reconstruction stand-in returning too few values
pub struct TruncatedReconstruction;

impl ReconstructionModel for TruncatedReconstruction {
    fn reconstruct(&self, frame: &Frame) -> DetectionResult<Vec<f32>> {
        Ok(vec![0.0; frame.len() / 2])
    }

    fn name(&self) -> &str {
        "truncated"
    }
}

/// Flow classifier stand-in with a fixed answer
pub struct FixedClass(pub i64);

impl FlowModel for FixedClass {
    fn predict(&self, _features: &[f64; 3]) -> DetectionResult<i64> {
        Ok(self.0)
    }

    fn name(&self) -> &str {
        "fixed"
    }
}

pub struct BrokenClassifier;

impl FlowModel for BrokenClassifier {
    fn predict(&self, _features: &[f64; 3]) -> DetectionResult<i64> {
        Err(DetectionError::Inference("tree walk failed".to_string()))
    }

    fn name(&self) -> &str {
        "broken"
    }
}

/// Chat provider stand-in that counts calls
#[derive(Default)]
pub struct CountingProvider {
    pub calls: AtomicUsize,
}

#[async_trait]
impl LlmProvider for CountingProvider {
    async fn complete(&self, request: &LlmRequest) -> LlmResult<LlmResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(LlmResponse {
            content: format!("analyst: {}", request.prompt),
            model: "stand-in".to_string(),
            finish_reason: Some("STOP".to_string()),
        })
    }

    fn name(&self) -> &str {
        "stand-in"
    }
}

/// Chat provider stand-in answering every call with an upstream 403
pub struct RejectingProvider;

#[async_trait]
impl LlmProvider for RejectingProvider {
    async fn complete(&self, _request: &LlmRequest) -> LlmResult<LlmResponse> {
        Err(LlmError::ApiError {
            status: 403,
            message: "API key not valid. Please pass a valid API key.".to_string(),
        })
    }

    fn name(&self) -> &str {
        "rejecting"
    }
}

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    _static_dir: TempDir,
}

pub struct TestAppBuilder {
    detectors: Detectors,
    chat: Option<LlmClient>,
}

impl TestAppBuilder {
    pub fn new() -> Self {
        Self {
            detectors: Detectors::default(),
            chat: None,
        }
    }

    pub fn frame_model(mut self, model: impl ReconstructionModel + 'static) -> Self {
        self.detectors = self.detectors.with_frame_model(Arc::new(model));
        self
    }

    pub fn flow_model(mut self, model: impl FlowModel + 'static) -> Self {
        self.detectors = self.detectors.with_flow_model(Arc::new(model));
        self
    }

    pub fn chat_provider(mut self, provider: Arc<dyn LlmProvider>) -> Self {
        self.chat = Some(LlmClient::with_provider(provider, LlmConfig::default()));
        self
    }

    pub fn build(self) -> TestApp {
        let static_dir = tempfile::tempdir().unwrap();
        for page in ["login", "dashboard", "surveillance", "alerts", "settings"] {
            std::fs::write(
                static_dir.path().join(format!("{}.html", page)),
                format!("<title>{}</title>", page),
            )
            .unwrap();
        }

        let mut config = AppConfig::default();
        config.server.static_dir = static_dir.path().to_path_buf();

        // ユーザー未設定なので開発用アカウントが入る
        let users = InMemoryUserRepository::from_config(&AuthConfig::default()).unwrap();
        let manager = Arc::new(SessionManager::new(SessionManagerConfig::default()));

        let state = AppState::new(config, self.detectors, Arc::new(users), self.chat, manager);
        TestApp {
            router: build_router(state.clone()),
            state,
            _static_dir: static_dir,
        }
    }
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl TestResponse {
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_slice(&self.body).unwrap()
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    pub fn location(&self) -> Option<&str> {
        self.headers
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok())
    }

    /// `name=value` part of the Set-Cookie header, if any
    pub fn cookie(&self) -> Option<String> {
        self.headers
            .get(header::SET_COOKIE)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(';').next())
            .map(str::to_string)
    }
}

impl TestApp {
    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        TestResponse {
            status,
            headers,
            body,
        }
    }

    pub async fn login_as(&self, username: &str, password: &str) -> TestResponse {
        let form = format!("username={}&password={}", username, password);
        self.send(
            Request::post("/login")
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from(form))
                .unwrap(),
        )
        .await
    }

    /// Log in with the development account and return the session cookie
    pub async fn login(&self) -> String {
        let response = self.login_as(USERNAME, PASSWORD).await;
        assert_eq!(response.status, StatusCode::SEE_OTHER);
        response.cookie().expect("login sets a session cookie")
    }

    pub async fn get(&self, path: &str, cookie: Option<&str>) -> TestResponse {
        let mut builder = Request::get(path);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        self.send(builder.body(Body::empty()).unwrap()).await
    }

    pub async fn post_json(&self, path: &str, cookie: &str, body: serde_json::Value) -> TestResponse {
        self.send(
            Request::post(path)
                .header(header::COOKIE, cookie)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
    }

    pub async fn upload_frame(&self, cookie: &str, filename: &str, bytes: &[u8]) -> TestResponse {
        self.send(
            Request::post("/analyze_frame")
                .header(header::COOKIE, cookie)
                .header(
                    header::CONTENT_TYPE,
                    format!("multipart/form-data; boundary={}", MULTIPART_BOUNDARY),
                )
                .body(Body::from(multipart_body("frame", filename, bytes)))
                .unwrap(),
        )
        .await
    }
}

/// Single-part multipart body
pub fn multipart_body(field: &str, filename: &str, bytes: &[u8]) -> Vec<u8> {
    let mut body = format!(
        "--{b}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"{filename}\"\r\nContent-Type: application/octet-stream\r\n\r\n",
        b = MULTIPART_BOUNDARY,
    )
    .into_bytes();
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{}--\r\n", MULTIPART_BOUNDARY).as_bytes());
    body
}

/// Uniform square grayscale PNG
pub fn uniform_png(value: u8, size: u32) -> Vec<u8> {
    gray_png(size, size, value)
}

/// Uniform grayscale PNG of any shape
pub fn gray_png(width: u32, height: u32, value: u8) -> Vec<u8> {
    let image = GrayImage::from_pixel(width, height, Luma([value]));
    let mut buf = Cursor::new(Vec::new());
    DynamicImage::ImageLuma8(image)
        .write_to(&mut buf, ImageFormat::Png)
        .unwrap();
    buf.into_inner()
}
