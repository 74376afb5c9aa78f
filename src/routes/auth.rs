//! Auth routes — signup, login, logout, current-user lookup.
//!
//! Login writes the two cookies the navigation gate reads: `token`
//! (HttpOnly session credential) and `role` (readable by the client so it
//! can render role-appropriate navigation). Logout clears both.

use axum::extract::{FromRef, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::Deserialize;
use time::Duration;

use crate::gate::{ROLE_COOKIE, TOKEN_COOKIE};
use crate::roles::Role;
use crate::services::account::{self, AccountError};
use crate::services::session;
use crate::state::AppState;

pub(crate) fn env_bool(key: &str) -> Option<bool> {
    std::env::var(key)
        .ok()
        .and_then(|raw| match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Some(true),
            "0" | "false" | "no" | "off" => Some(false),
            _ => None,
        })
}

pub(crate) fn cookie_secure() -> bool {
    secure_cookies(env_bool("COOKIE_SECURE"), std::env::var("PUBLIC_BASE_URL").ok().as_deref())
}

/// Secure-flag policy: an explicit `COOKIE_SECURE` override wins; otherwise
/// infer from whether the public base URL is served over https.
fn secure_cookies(explicit: Option<bool>, base_url: Option<&str>) -> bool {
    explicit.unwrap_or_else(|| base_url.is_some_and(|url| url.starts_with("https://")))
}

// =============================================================================
// COOKIE BUILDERS
// =============================================================================

/// Session cookie: HttpOnly, whole-site path so the gate sees it everywhere.
pub(crate) fn token_cookie(token: String, secure: bool) -> Cookie<'static> {
    Cookie::build((TOKEN_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .build()
}

/// Role cookie: intentionally not HttpOnly — the client reads it to pick
/// which dashboard shell to render.
pub(crate) fn role_cookie(role: Role, secure: bool) -> Cookie<'static> {
    Cookie::build((ROLE_COOKIE, role.as_str()))
        .path("/")
        .same_site(SameSite::Lax)
        .secure(secure)
        .build()
}

fn expired(name: &'static str, http_only: bool, secure: bool) -> Cookie<'static> {
    Cookie::build((name, ""))
        .path("/")
        .http_only(http_only)
        .same_site(SameSite::Lax)
        .secure(secure)
        .max_age(Duration::ZERO)
        .build()
}

// =============================================================================
// AUTH EXTRACTOR
// =============================================================================

/// Authenticated user resolved from the session cookie.
/// Use as a handler parameter to require a valid session.
pub struct AuthUser {
    pub user: session::SessionUser,
    pub token: String,
}

impl<S> axum::extract::FromRequestParts<S> for AuthUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = StatusCode;

    async fn from_request_parts(parts: &mut axum::http::request::Parts, state: &S) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        let token = jar.get(TOKEN_COOKIE).map(Cookie::value).unwrap_or_default();
        if token.is_empty() {
            return Err(StatusCode::UNAUTHORIZED);
        }

        let app_state = AppState::from_ref(state);
        let user = session::validate_session(&app_state.pool, token)
            .await
            .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
            .ok_or(StatusCode::UNAUTHORIZED)?;

        Ok(Self { user, token: token.to_owned() })
    }
}

// =============================================================================
// HANDLERS
// =============================================================================

pub(crate) fn account_error_to_status(err: &AccountError) -> StatusCode {
    match err {
        AccountError::InvalidEmail | AccountError::WeakPassword => StatusCode::UNPROCESSABLE_ENTITY,
        AccountError::EmailTaken => StatusCode::CONFLICT,
        AccountError::InvalidCredentials => StatusCode::UNAUTHORIZED,
        AccountError::Db(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

#[derive(Deserialize)]
pub struct SignupRequest {
    pub email: String,
    pub name: String,
    pub password: String,
    pub role: Role,
}

/// `POST /api/auth/signup` — create an account, log it in, set cookies.
pub async fn signup(State(state): State<AppState>, Json(req): Json<SignupRequest>) -> Response {
    let user_id = match account::create_account(&state.pool, &req.email, &req.name, &req.password, req.role).await {
        Ok(id) => id,
        Err(e) => {
            let status = account_error_to_status(&e);
            if status == StatusCode::INTERNAL_SERVER_ERROR {
                tracing::error!(error = %e, "signup failed");
            }
            return (status, e.to_string()).into_response();
        }
    };

    let token = match session::create_session(&state.pool, user_id).await {
        Ok(t) => t,
        Err(e) => {
            tracing::error!(error = %e, "session creation failed");
            return (StatusCode::INTERNAL_SERVER_ERROR, "failed to create session").into_response();
        }
    };

    let secure = cookie_secure();
    let jar = CookieJar::new()
        .add(token_cookie(token, secure))
        .add(role_cookie(req.role, secure));
    let body = Json(serde_json::json!({ "id": user_id, "redirect": req.role.dashboard_path() }));
    (StatusCode::CREATED, jar, body).into_response()
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// `POST /api/auth/login` — verify credentials, set `token` + `role` cookies.
pub async fn login(State(state): State<AppState>, Json(req): Json<LoginRequest>) -> Response {
    let user = match account::verify_login(&state.pool, &req.email, &req.password).await {
        Ok(u) => u,
        Err(e) => {
            let status = account_error_to_status(&e);
            if status == StatusCode::INTERNAL_SERVER_ERROR {
                tracing::error!(error = %e, "login failed");
            }
            return (status, e.to_string()).into_response();
        }
    };

    let token = match session::create_session(&state.pool, user.id).await {
        Ok(t) => t,
        Err(e) => {
            tracing::error!(error = %e, "session creation failed");
            return (StatusCode::INTERNAL_SERVER_ERROR, "failed to create session").into_response();
        }
    };

    let secure = cookie_secure();
    let jar = CookieJar::new()
        .add(token_cookie(token, secure))
        .add(role_cookie(user.role, secure));
    let body = Json(serde_json::json!({ "redirect": user.role.dashboard_path() }));
    (jar, body).into_response()
}

/// `POST /api/auth/logout` — delete the session, clear both cookies.
pub async fn logout(State(state): State<AppState>, auth: AuthUser) -> impl IntoResponse {
    let _ = session::delete_session(&state.pool, &auth.token).await;

    let secure = cookie_secure();
    let jar = CookieJar::new()
        .add(expired(TOKEN_COOKIE, true, secure))
        .add(expired(ROLE_COOKIE, false, secure));
    (jar, StatusCode::NO_CONTENT)
}

/// `GET /api/auth/me` — return the current session user.
pub async fn me(auth: AuthUser) -> Json<session::SessionUser> {
    Json(auth.user)
}

#[cfg(test)]
#[path = "auth_test.rs"]
mod tests;
