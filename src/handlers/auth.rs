//! ログイン / ログアウト
//!
//! A failed login re-serves the login page with no hint about which field
//! was wrong and no cookie.

use super::pages::load_page;
use crate::error::AppError;
use crate::http_server::AppState;
use crate::security::auth::Credentials;
use crate::session::LOGIN_PATH;
use axum::{
    extract::{rejection::FormRejection, State},
    response::{Html, IntoResponse, Redirect, Response},
    Form,
};
use axum_extra::extract::cookie::SignedCookieJar;
use tracing::{error, info, instrument, warn};

const LOGIN_PAGE: &str = "login";
const AFTER_LOGIN_PATH: &str = "/dashboard";

pub async fn login_page(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    load_page(&state.config.server.static_dir, LOGIN_PAGE).await
}

#[instrument(skip_all)]
pub async fn login(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    form: Result<Form<Credentials>, FormRejection>,
) -> Result<Response, AppError> {
    let credentials = form.map(|Form(c)| c).unwrap_or_default();

    let Some((username, password)) = credentials.normalized() else {
        return Ok(login_page(State(state)).await?.into_response());
    };

    let user = state
        .users
        .verify_password(username, password)
        .await
        .map_err(|e| {
            error!(error = %e, "Credential lookup failed");
            AppError::Internal
        })?;

    let Some(user) = user else {
        warn!(username, "Login failed");
        return Ok(login_page(State(state)).await?.into_response());
    };

    let session = state
        .sessions
        .manager()
        .create_session(&user.username)
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to create session");
            AppError::Internal
        })?;

    info!(username = %user.username, session_id = %session.id, "User logged in");
    let jar = jar.add(state.sessions.session_cookie(&session.id));
    Ok((jar, Redirect::to(AFTER_LOGIN_PATH)).into_response())
}

#[instrument(skip_all)]
pub async fn logout(State(state): State<AppState>, jar: SignedCookieJar) -> Response {
    if let Some(id) = state.sessions.session_id(&jar) {
        match state.sessions.manager().delete_session(&id).await {
            Ok(true) => info!(session_id = %id, "User logged out"),
            Ok(false) => {}
            Err(e) => error!(error = %e, "Failed to delete session"),
        }
    }

    let jar = jar.remove(state.sessions.removal_cookie());
    (jar, Redirect::to(LOGIN_PATH)).into_response()
}
