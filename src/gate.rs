//! Navigation gate: cookie-based redirect decisions for role dashboards.
//!
//! DESIGN
//! ======
//! Every guarded navigation request is reduced to an immutable snapshot of
//! the two auth cookies (`token`, `role`) plus the request path, and fed to
//! a pure decision function. The function either lets the request continue
//! or names a redirect target; it performs no I/O and never fails.
//!
//! The decision procedure, first match wins:
//! 1. Protected prefix without a `token` cookie -> redirect to `/login`.
//! 2. Exact entry path (`/login`, `/signup`) with both `token` and `role`
//!    -> redirect to `/{role}/dashboard`.
//! 3. Otherwise -> continue.
//!
//! TRADE-OFFS
//! ==========
//! The `role` cookie is passed through verbatim when computing the dashboard
//! redirect. An unrecognized role yields a well-formed path that simply 404s
//! at the router. Validating it here would couple the gate to the role set;
//! the login flow writes the cookie from the user row, so a bad value only
//! appears through tampering.

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};
use axum_extra::extract::cookie::{Cookie, CookieJar};

/// Session credential cookie. Presence alone gates protected prefixes;
/// the value is validated later by the session extractor, not here.
pub const TOKEN_COOKIE: &str = "token";

/// Role cookie, written at login alongside the token.
pub const ROLE_COOKIE: &str = "role";

const LOGIN_PATH: &str = "/login";

// =============================================================================
// CONFIG
// =============================================================================

/// Which paths the gate protects and which it treats as public entry points.
///
/// Protected prefixes match by path prefix; entry paths match exactly.
#[derive(Debug, Clone)]
pub struct GateConfig {
    protected_prefixes: Vec<String>,
    entry_paths: Vec<String>,
}

impl GateConfig {
    #[must_use]
    pub fn new(protected_prefixes: Vec<String>, entry_paths: Vec<String>) -> Self {
        Self { protected_prefixes, entry_paths }
    }

    fn is_protected(&self, path: &str) -> bool {
        self.protected_prefixes.iter().any(|p| path.starts_with(p.as_str()))
    }

    fn is_entry(&self, path: &str) -> bool {
        self.entry_paths.iter().any(|p| p == path)
    }
}

impl Default for GateConfig {
    /// Staff dashboards are protected; patient routes are deliberately not
    /// (they carry no navigation guard, only session checks at the data layer).
    fn default() -> Self {
        Self::new(
            vec![
                "/lab-technician".to_owned(),
                "/pathologist".to_owned(),
                "/nutritionist".to_owned(),
            ],
            vec!["/login".to_owned(), "/signup".to_owned()],
        )
    }
}

// =============================================================================
// DECISION FUNCTION
// =============================================================================

/// The auth cookies of one request. Empty values normalize to absent.
#[derive(Debug, Clone, Copy, Default)]
pub struct AuthCookies<'a> {
    pub token: Option<&'a str>,
    pub role: Option<&'a str>,
}

impl<'a> AuthCookies<'a> {
    #[must_use]
    pub fn from_jar(jar: &'a CookieJar) -> Self {
        Self { token: cookie_value(jar, TOKEN_COOKIE), role: cookie_value(jar, ROLE_COOKIE) }
    }
}

fn cookie_value<'a>(jar: &'a CookieJar, name: &str) -> Option<&'a str> {
    jar.get(name).map(Cookie::value).filter(|v| !v.is_empty())
}

/// Outcome of a gate evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateOutcome {
    /// Serve the originally requested resource, unmodified.
    Continue,
    /// Redirect the client to this same-origin path instead.
    Redirect(String),
}

/// Decide whether a navigation request passes through or redirects.
///
/// Pure function of `(config, path, cookies)`; no side effects, no errors.
#[must_use]
pub fn evaluate(config: &GateConfig, path: &str, cookies: &AuthCookies<'_>) -> GateOutcome {
    if config.is_protected(path) && cookies.token.is_none() {
        return GateOutcome::Redirect(LOGIN_PATH.to_owned());
    }

    if config.is_entry(path) {
        if let (Some(_), Some(role)) = (cookies.token, cookies.role) {
            return GateOutcome::Redirect(format!("/{role}/dashboard"));
        }
    }

    GateOutcome::Continue
}

// =============================================================================
// MIDDLEWARE ADAPTER
// =============================================================================

/// Axum middleware applying [`evaluate`] to each matched request.
///
/// The route matcher lives in router assembly: this layer is attached only
/// to entry paths and protected sub-routes, so unmatched paths never reach
/// the gate at all.
pub async fn guard(State(config): State<Arc<GateConfig>>, request: Request, next: Next) -> Response {
    let jar = CookieJar::from_headers(request.headers());
    let cookies = AuthCookies::from_jar(&jar);

    match evaluate(&config, request.uri().path(), &cookies) {
        GateOutcome::Continue => next.run(request).await,
        GateOutcome::Redirect(target) => Redirect::temporary(&target).into_response(),
    }
}

#[cfg(test)]
#[path = "gate_test.rs"]
mod tests;
