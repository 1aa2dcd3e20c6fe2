//! ログイン / セッションゲートの統合テスト

mod common;

use axum::http::StatusCode;
use common::{TestAppBuilder, PASSWORD, USERNAME};

#[tokio::test]
async fn test_root_redirects_to_login() {
    let app = TestAppBuilder::new().build();
    let response = app.get("/", None).await;

    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert_eq!(response.location(), Some("/login"));
}

#[tokio::test]
async fn test_login_page_is_public() {
    let app = TestAppBuilder::new().build();
    let response = app.get("/login", None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.text().contains("login"));
}

#[tokio::test]
async fn test_protected_routes_redirect_without_session() {
    let app = TestAppBuilder::new().build();

    for path in [
        "/dashboard",
        "/surveillance",
        "/alerts",
        "/settings",
        "/reports",
        "/metrics",
        "/api/alerts",
        "/api/logs",
        "/api/settings",
        "/api/network/stats",
    ] {
        let response = app.get(path, None).await;
        assert_eq!(response.status, StatusCode::SEE_OTHER, "{}", path);
        assert_eq!(response.location(), Some("/login"), "{}", path);
    }
}

#[tokio::test]
async fn test_login_then_dashboard() {
    let app = TestAppBuilder::new().build();

    let before = app.get("/dashboard", None).await;
    assert_eq!(before.status, StatusCode::SEE_OTHER);

    let login = app.login_as(USERNAME, PASSWORD).await;
    assert_eq!(login.status, StatusCode::SEE_OTHER);
    assert_eq!(login.location(), Some("/dashboard"));
    let cookie = login.cookie().unwrap();

    let after = app.get("/dashboard", Some(&cookie)).await;
    assert_eq!(after.status, StatusCode::OK);
    assert!(after.text().contains("dashboard"));
}

#[tokio::test]
async fn test_login_trims_fields() {
    let app = TestAppBuilder::new().build();
    let response = app.login_as("%20admin%20", "password123%20").await;
    assert_eq!(response.status, StatusCode::SEE_OTHER);
}

#[tokio::test]
async fn test_wrong_credentials_reserve_login_page() {
    let app = TestAppBuilder::new().build();

    for (username, password) in [(USERNAME, "wrong"), ("nobody", PASSWORD), ("", ""), (USERNAME, "")] {
        let response = app.login_as(username, password).await;
        assert_eq!(response.status, StatusCode::OK);
        assert!(response.text().contains("login"));
        assert!(response.cookie().is_none());
    }
}

#[tokio::test]
async fn test_logout_invalidates_session() {
    let app = TestAppBuilder::new().build();
    let cookie = app.login().await;

    assert_eq!(app.get("/metrics", Some(&cookie)).await.status, StatusCode::OK);

    let logout = app.get("/logout", Some(&cookie)).await;
    assert_eq!(logout.status, StatusCode::SEE_OTHER);
    assert_eq!(logout.location(), Some("/login"));

    // 古いクッキーを再送しても通らない
    let replay = app.get("/metrics", Some(&cookie)).await;
    assert_eq!(replay.status, StatusCode::SEE_OTHER);
}

#[tokio::test]
async fn test_forged_cookie_is_rejected() {
    let app = TestAppBuilder::new().build();
    let session = app
        .state
        .sessions
        .manager()
        .create_session(USERNAME)
        .await
        .unwrap();

    let forged = format!("{}={}", app.state.sessions.cookie_name(), session.id);
    let response = app.get("/dashboard", Some(&forged)).await;
    assert_eq!(response.status, StatusCode::SEE_OTHER);
}

#[tokio::test]
async fn test_missing_page_is_404() {
    let app = TestAppBuilder::new().build();
    let cookie = app.login().await;

    // テスト用の静的ディレクトリには reports.html がない
    let response = app.get("/reports", Some(&cookie)).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_static_tree_is_public() {
    let app = TestAppBuilder::new().build();

    // 素の HTML はデータを含まない。API 側は引き続きゲートされる
    let page = app.get("/static/dashboard.html", None).await;
    assert_eq!(page.status, StatusCode::OK);
    assert!(page.text().contains("dashboard"));

    let api = app.get("/api/alerts", None).await;
    assert_eq!(api.status, StatusCode::SEE_OTHER);
}
