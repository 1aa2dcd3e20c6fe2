//! HTTP server for the surveillance dashboard
//!
//! Builds the shared [`AppState`] from configuration and wires every route.
//! Everything except `/`, `/login`, `/logout` and the static asset trees
//! sits behind [`require_session`].

use crate::config::AppConfig;
use crate::detection::Detectors;
use crate::error::Result;
use crate::handlers::{analysis, auth, chat, pages, telemetry};
use crate::llm::LlmClient;
use crate::monitoring::SettingsStore;
use crate::security::auth::{InMemoryUserRepository, UserRepository};
use crate::session::{require_session, SessionGate, SessionManager, SessionManagerConfig};
use axum::{
    extract::{DefaultBodyLimit, FromRef},
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use axum_extra::extract::cookie::Key;
use secrecy::ExposeSecret;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::{services::ServeDir, trace::TraceLayer};
use tracing::{info, warn};

/// State shared by every handler
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub detectors: Detectors,
    pub sessions: SessionGate,
    pub users: Arc<dyn UserRepository>,
    /// `None` when no API key is configured
    pub chat: Option<LlmClient>,
    pub settings: SettingsStore,
}

impl FromRef<AppState> for SessionGate {
    fn from_ref(state: &AppState) -> Self {
        state.sessions.clone()
    }
}

impl FromRef<AppState> for Key {
    fn from_ref(state: &AppState) -> Self {
        Key::from_ref(&state.sessions)
    }
}

impl AppState {
    /// Load models, seed the user store and set up the chat client
    pub fn from_config(config: AppConfig) -> Result<Self> {
        let manager = Arc::new(SessionManager::new(SessionManagerConfig::from_auth_config(
            &config.auth,
        )?));
        let detectors = Detectors::load(&config.models);
        let users = InMemoryUserRepository::from_config(&config.auth)?;

        let chat = if config.llm.is_configured() {
            let client = LlmClient::new(config.llm.clone())?;
            info!(provider = client.provider_name(), "Chat provider configured");
            Some(client)
        } else {
            warn!("No LLM API key configured, /api/chat is disabled");
            None
        };

        Ok(Self::new(config, detectors, Arc::new(users), chat, manager))
    }

    /// Assemble state from already-built parts
    pub fn new(
        config: AppConfig,
        detectors: Detectors,
        users: Arc<dyn UserRepository>,
        chat: Option<LlmClient>,
        manager: Arc<SessionManager>,
    ) -> Self {
        let sessions = SessionGate::new(
            manager,
            &config.auth.cookie_name,
            config.auth.cookie_secure,
            signing_key(&config),
        );

        Self {
            config: Arc::new(config),
            detectors,
            sessions,
            users,
            chat,
            settings: SettingsStore::default(),
        }
    }
}

/// Cookie signing key from `auth.cookie_secret`, or a random one
fn signing_key(config: &AppConfig) -> Key {
    match &config.auth.cookie_secret {
        Some(secret) => match Key::try_from(secret.expose_secret().as_bytes()) {
            Ok(key) => key,
            Err(_) => {
                warn!("auth.cookie_secret is shorter than 64 bytes, using a random key");
                Key::generate()
            }
        },
        None => {
            warn!("No cookie secret configured, sessions will not survive a restart");
            Key::generate()
        }
    }
}

/// ルーター構築
pub fn build_router(state: AppState) -> Router {
    let protected = Router::new()
        .route("/dashboard", get(pages::dashboard))
        .route("/surveillance", get(pages::surveillance))
        .route("/alerts", get(pages::alerts))
        .route("/settings", get(pages::settings))
        .route("/reports", get(pages::reports))
        .route(
            "/analyze_frame",
            post(analysis::analyze_frame).layer(DefaultBodyLimit::disable()),
        )
        .route("/analyze_flow", post(analysis::analyze_flow))
        .route("/metrics", get(telemetry::metrics))
        .route("/api/alerts", get(telemetry::alerts))
        .route("/api/logs", get(telemetry::logs))
        .route("/api/system/status", get(telemetry::system_status))
        .route(
            "/api/settings",
            get(telemetry::get_settings).post(telemetry::update_settings),
        )
        .route("/api/network/stats", get(telemetry::network_stats))
        .route("/api/network/analyze", post(telemetry::network_analyze))
        .route("/api/chat", post(chat::chat))
        .route_layer(from_fn_with_state(state.sessions.clone(), require_session));

    let public = Router::new()
        .route("/", get(pages::index))
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/logout", get(auth::logout));

    // /static と /dist はセッション不要 (ページ HTML の素ファイルも含む)
    let server = &state.config.server;
    let static_files = ServeDir::new(&server.static_dir);
    let dist_files = ServeDir::new(&server.dist_dir);

    Router::new()
        .merge(public)
        .merge(protected)
        .nest_service("/static", static_files)
        .nest_service("/dist", dist_files)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind, start the session purge task and serve until the process exits
pub async fn serve(config: AppConfig) -> anyhow::Result<()> {
    let bind_addr = config.server.bind_addr.clone();
    let state = AppState::from_config(config)?;

    let cleanup = state.sessions.manager().start_cleanup_task();
    let app = build_router(state);

    let listener = TcpListener::bind(&bind_addr).await?;
    info!("Dashboard listening on http://{}", listener.local_addr()?);

    let result = axum::serve(listener, app).await;
    cleanup.abort();
    result?;
    Ok(())
}
