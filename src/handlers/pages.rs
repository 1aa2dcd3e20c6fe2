//! HTMLページ配信

use crate::error::AppError;
use crate::http_server::AppState;
use crate::session::LOGIN_PATH;
use axum::{
    extract::State,
    response::{Html, Redirect},
};
use std::path::Path;
use tracing::{error, warn};

pub async fn index() -> Redirect {
    Redirect::to(LOGIN_PATH)
}

/// Read `<static_dir>/<name>.html`
pub async fn load_page(static_dir: &Path, name: &str) -> Result<Html<String>, AppError> {
    let path = static_dir.join(format!("{}.html", name));
    match tokio::fs::read_to_string(&path).await {
        Ok(body) => Ok(Html(body)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            warn!(path = %path.display(), "Page not found");
            Err(AppError::NotFound)
        }
        Err(e) => {
            error!(path = %path.display(), error = %e, "Failed to read page");
            Err(AppError::Internal)
        }
    }
}

macro_rules! page_handler {
    ($($handler:ident => $page:literal),* $(,)?) => {
        $(
            pub async fn $handler(State(state): State<AppState>) -> Result<Html<String>, AppError> {
                load_page(&state.config.server.static_dir, $page).await
            }
        )*
    };
}

page_handler!(
    dashboard => "dashboard",
    surveillance => "surveillance",
    alerts => "alerts",
    settings => "settings",
    reports => "reports",
);
