//! セッションゲート
//!
//! Protected routes sit behind [`require_session`]. The session id travels
//! in a signed cookie; anything that does not resolve to a live session is
//! redirected to the login page.

use crate::session::{SessionId, SessionManager};
use axum::{
    extract::{FromRef, Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::{Cookie, Key, SameSite, SignedCookieJar};
use std::sync::Arc;
use tracing::{debug, error, instrument};

pub const LOGIN_PATH: &str = "/login";

/// Authenticated caller, inserted into request extensions by the gate
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub username: String,
    pub session_id: SessionId,
}

/// State shared by the gate and the login/logout handlers
#[derive(Clone)]
pub struct SessionGate {
    manager: Arc<SessionManager>,
    cookie_name: Arc<str>,
    cookie_secure: bool,
    key: Key,
}

impl SessionGate {
    pub fn new(manager: Arc<SessionManager>, cookie_name: &str, cookie_secure: bool, key: Key) -> Self {
        Self {
            manager,
            cookie_name: Arc::from(cookie_name),
            cookie_secure,
            key,
        }
    }

    pub fn manager(&self) -> &Arc<SessionManager> {
        &self.manager
    }

    pub fn cookie_name(&self) -> &str {
        &self.cookie_name
    }

    /// Session id carried by a correctly signed cookie, if any
    pub fn session_id(&self, jar: &SignedCookieJar) -> Option<SessionId> {
        jar.get(&self.cookie_name)
            .map(|cookie| SessionId::from(cookie.value()))
    }

    /// Cookie carrying a freshly created session id
    pub fn session_cookie(&self, id: &SessionId) -> Cookie<'static> {
        Cookie::build((self.cookie_name.to_string(), id.to_string()))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .secure(self.cookie_secure)
            .build()
    }

    /// Cookie that clears the session id on the client
    pub fn removal_cookie(&self) -> Cookie<'static> {
        Cookie::build(self.cookie_name.to_string()).path("/").build()
    }
}

impl FromRef<SessionGate> for Key {
    fn from_ref(gate: &SessionGate) -> Self {
        gate.key.clone()
    }
}

/// Redirect to `/login` unless the request carries a live session
#[instrument(skip_all, fields(path = %request.uri().path()))]
pub async fn require_session(
    State(gate): State<SessionGate>,
    jar: SignedCookieJar,
    mut request: Request,
    next: Next,
) -> Response {
    let Some(id) = gate.session_id(&jar) else {
        debug!("No session cookie");
        return Redirect::to(LOGIN_PATH).into_response();
    };

    match gate.manager.validate(&id).await {
        Ok(Some(session)) => {
            request.extensions_mut().insert(CurrentUser {
                username: session.username,
                session_id: session.id,
            });
            next.run(request).await
        }
        Ok(None) => {
            debug!(session_id = %id, "Unknown or expired session");
            Redirect::to(LOGIN_PATH).into_response()
        }
        Err(e) => {
            error!(error = %e, "Session lookup failed");
            Redirect::to(LOGIN_PATH).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        extract::Extension,
        http::{header, Request as HttpRequest, StatusCode},
        middleware::from_fn_with_state,
        routing::get,
        Router,
    };
    use tower::ServiceExt;

    fn gate() -> SessionGate {
        SessionGate::new(
            Arc::new(SessionManager::default()),
            "surveil_session",
            false,
            Key::generate(),
        )
    }

    fn app(gate: SessionGate) -> Router {
        Router::new()
            .route(
                "/private",
                get(|Extension(user): Extension<CurrentUser>| async move { user.username }),
            )
            .layer(from_fn_with_state(gate, require_session))
    }

    /// Produce the Cookie header a browser would send back
    fn signed_cookie_header(gate: &SessionGate, id: &SessionId) -> String {
        let jar = SignedCookieJar::new(gate.key.clone()).add(gate.session_cookie(id));
        // 署名済みの値は Set-Cookie 経由でしか得られない
        let response = (jar, ()).into_response();
        let set_cookie = response.headers()[header::SET_COOKIE].to_str().unwrap();
        set_cookie.split(';').next().unwrap().to_string()
    }

    #[tokio::test]
    async fn test_missing_cookie_redirects_to_login() {
        let response = app(gate())
            .oneshot(HttpRequest::get("/private").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[header::LOCATION], LOGIN_PATH);
    }

    #[tokio::test]
    async fn test_unsigned_cookie_is_ignored() {
        let gate = gate();
        let session = gate.manager().create_session("admin").await.unwrap();

        let response = app(gate)
            .oneshot(
                HttpRequest::get("/private")
                    .header(header::COOKIE, format!("surveil_session={}", session.id))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
    }

    #[tokio::test]
    async fn test_valid_session_passes_through() {
        let gate = gate();
        let session = gate.manager().create_session("admin").await.unwrap();
        let cookie = signed_cookie_header(&gate, &session.id);

        let response = app(gate)
            .oneshot(
                HttpRequest::get("/private")
                    .header(header::COOKIE, cookie)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&body[..], b"admin");
    }

    #[tokio::test]
    async fn test_deleted_session_redirects() {
        let gate = gate();
        let session = gate.manager().create_session("admin").await.unwrap();
        let cookie = signed_cookie_header(&gate, &session.id);
        gate.manager().delete_session(&session.id).await.unwrap();

        let response = app(gate)
            .oneshot(
                HttpRequest::get("/private")
                    .header(header::COOKIE, cookie)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
    }

    #[test]
    fn test_session_cookie_attributes() {
        let gate = gate();
        let cookie = gate.session_cookie(&SessionId::from("abc"));
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Lax));
        assert_eq!(cookie.path(), Some("/"));
    }
}
