use super::*;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use axum::routing::get;
use tower::ServiceExt;

fn no_cookies() -> AuthCookies<'static> {
    AuthCookies::default()
}

fn with_token() -> AuthCookies<'static> {
    AuthCookies { token: Some("abc"), role: None }
}

fn with_token_and_role(role: &'static str) -> AuthCookies<'static> {
    AuthCookies { token: Some("abc"), role: Some(role) }
}

// =============================================================================
// RULE 1: protected prefix without a token redirects to /login
// =============================================================================

#[test]
fn protected_path_without_token_redirects_to_login() {
    let cfg = GateConfig::default();
    let outcome = evaluate(&cfg, "/lab-technician/dashboard", &no_cookies());
    assert_eq!(outcome, GateOutcome::Redirect("/login".to_owned()));
}

#[test]
fn protected_path_with_token_continues() {
    let cfg = GateConfig::default();
    let outcome = evaluate(&cfg, "/lab-technician/dashboard", &with_token());
    assert_eq!(outcome, GateOutcome::Continue);
}

#[test]
fn protected_path_with_token_continues_regardless_of_role() {
    let cfg = GateConfig::default();
    for cookies in [with_token(), with_token_and_role("patient"), with_token_and_role("junk")] {
        let outcome = evaluate(&cfg, "/pathologist/dashboard", &cookies);
        assert_eq!(outcome, GateOutcome::Continue);
    }
}

#[test]
fn all_protected_prefixes_redirect_without_token() {
    let cfg = GateConfig::default();
    for path in ["/lab-technician/dashboard", "/pathologist/dashboard", "/nutritionist/dashboard"] {
        let outcome = evaluate(&cfg, path, &no_cookies());
        assert_eq!(outcome, GateOutcome::Redirect("/login".to_owned()), "path {path}");
    }
}

#[test]
fn prefix_match_covers_nested_paths() {
    let cfg = GateConfig::default();
    let outcome = evaluate(&cfg, "/nutritionist/appointments/123/notes", &no_cookies());
    assert_eq!(outcome, GateOutcome::Redirect("/login".to_owned()));
}

#[test]
fn nutritionist_appointments_with_token_continues() {
    let cfg = GateConfig::default();
    let outcome = evaluate(&cfg, "/nutritionist/appointments", &with_token());
    assert_eq!(outcome, GateOutcome::Continue);
}

#[test]
fn unprotected_path_without_token_continues() {
    let cfg = GateConfig::default();
    let outcome = evaluate(&cfg, "/patient/dashboard", &no_cookies());
    assert_eq!(outcome, GateOutcome::Continue);
}

// =============================================================================
// RULE 2: entry path with token + role redirects to the role dashboard
// =============================================================================

#[test]
fn login_with_token_and_role_redirects_to_dashboard() {
    let cfg = GateConfig::default();
    let outcome = evaluate(&cfg, "/login", &with_token_and_role("patient"));
    assert_eq!(outcome, GateOutcome::Redirect("/patient/dashboard".to_owned()));
}

#[test]
fn signup_with_token_and_role_redirects_to_dashboard() {
    let cfg = GateConfig::default();
    let outcome = evaluate(&cfg, "/signup", &with_token_and_role("nutritionist"));
    assert_eq!(outcome, GateOutcome::Redirect("/nutritionist/dashboard".to_owned()));
}

#[test]
fn login_without_cookies_continues() {
    let cfg = GateConfig::default();
    assert_eq!(evaluate(&cfg, "/login", &no_cookies()), GateOutcome::Continue);
}

#[test]
fn login_with_token_but_no_role_continues() {
    let cfg = GateConfig::default();
    assert_eq!(evaluate(&cfg, "/login", &with_token()), GateOutcome::Continue);
}

#[test]
fn login_with_role_but_no_token_continues() {
    let cfg = GateConfig::default();
    let cookies = AuthCookies { token: None, role: Some("patient") };
    assert_eq!(evaluate(&cfg, "/login", &cookies), GateOutcome::Continue);
}

#[test]
fn unrecognized_role_is_passed_through_verbatim() {
    let cfg = GateConfig::default();
    let outcome = evaluate(&cfg, "/login", &with_token_and_role("superuser"));
    assert_eq!(outcome, GateOutcome::Redirect("/superuser/dashboard".to_owned()));
}

#[test]
fn entry_match_is_exact_not_prefix() {
    let cfg = GateConfig::default();
    let outcome = evaluate(&cfg, "/login/extra", &with_token_and_role("patient"));
    assert_eq!(outcome, GateOutcome::Continue);
}

// =============================================================================
// RULE ORDER AND CONFIG
// =============================================================================

#[test]
fn protected_check_wins_over_entry_check() {
    // A path configured as both protected and entry: rule 1 fires first when
    // the token is missing.
    let cfg = GateConfig::new(vec!["/login".to_owned()], vec!["/login".to_owned()]);
    assert_eq!(evaluate(&cfg, "/login", &no_cookies()), GateOutcome::Redirect("/login".to_owned()));

    // With a token present rule 1 passes and rule 2 takes over.
    let outcome = evaluate(&cfg, "/login", &with_token_and_role("patient"));
    assert_eq!(outcome, GateOutcome::Redirect("/patient/dashboard".to_owned()));
}

#[test]
fn custom_config_protects_custom_prefixes() {
    let cfg = GateConfig::new(vec!["/admin".to_owned()], vec![]);
    assert_eq!(evaluate(&cfg, "/admin/settings", &no_cookies()), GateOutcome::Redirect("/login".to_owned()));
    assert_eq!(evaluate(&cfg, "/lab-technician/dashboard", &no_cookies()), GateOutcome::Continue);
}

#[test]
fn empty_config_gates_nothing() {
    let cfg = GateConfig::new(vec![], vec![]);
    for path in ["/login", "/lab-technician/dashboard", "/anything"] {
        assert_eq!(evaluate(&cfg, path, &no_cookies()), GateOutcome::Continue);
        assert_eq!(evaluate(&cfg, path, &with_token_and_role("patient")), GateOutcome::Continue);
    }
}

// =============================================================================
// COOKIE NORMALIZATION
// =============================================================================

fn jar_from(cookie_header: &str) -> CookieJar {
    let mut headers = axum::http::HeaderMap::new();
    headers.insert(header::COOKIE, cookie_header.parse().unwrap());
    CookieJar::from_headers(&headers)
}

#[test]
fn empty_token_value_is_treated_as_absent() {
    let jar = jar_from("token=; role=patient");
    let cookies = AuthCookies::from_jar(&jar);
    assert!(cookies.token.is_none());
    assert_eq!(cookies.role, Some("patient"));
}

#[test]
fn empty_role_value_is_treated_as_absent() {
    let jar = jar_from("token=abc; role=");
    let cookies = AuthCookies::from_jar(&jar);
    assert_eq!(cookies.token, Some("abc"));
    assert!(cookies.role.is_none());
}

#[test]
fn missing_cookies_are_absent() {
    let jar = CookieJar::new();
    let cookies = AuthCookies::from_jar(&jar);
    assert!(cookies.token.is_none());
    assert!(cookies.role.is_none());
}

#[test]
fn unrelated_cookies_are_ignored() {
    let jar = jar_from("theme=dark; tracking=no");
    let cookies = AuthCookies::from_jar(&jar);
    assert!(cookies.token.is_none());
    assert!(cookies.role.is_none());
}

// =============================================================================
// MIDDLEWARE + MATCHER
// =============================================================================

/// Router mirroring the production matcher, with stub handlers so tests run
/// without a database. `/patient/dashboard` is registered after
/// `route_layer`, so the gate never sees it.
fn test_router() -> Router {
    let config = std::sync::Arc::new(GateConfig::default());
    Router::new()
        .route("/login", get(|| async { "login page" }))
        .route("/signup", get(|| async { "signup page" }))
        .route("/lab-technician/dashboard", get(|| async { "lab dashboard" }))
        .route("/nutritionist/appointments", get(|| async { "appointments" }))
        .route_layer(axum::middleware::from_fn_with_state(config, guard))
        .route("/patient/dashboard", get(|| async { "patient dashboard" }))
}

fn request(path: &str, cookie_header: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(path);
    if let Some(cookie) = cookie_header {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).unwrap()
}

fn location(response: &axum::response::Response) -> &str {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
}

#[tokio::test]
async fn middleware_redirects_protected_request_without_token() {
    let response = test_router()
        .oneshot(request("/lab-technician/dashboard", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location(&response), "/login");
}

#[tokio::test]
async fn middleware_passes_protected_request_with_token() {
    let response = test_router()
        .oneshot(request("/lab-technician/dashboard", Some("token=abc")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn middleware_redirects_login_when_logged_in() {
    let response = test_router()
        .oneshot(request("/login", Some("token=abc; role=patient")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location(&response), "/patient/dashboard");
}

#[tokio::test]
async fn middleware_serves_login_page_when_logged_out() {
    let response = test_router().oneshot(request("/login", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn middleware_serves_login_page_with_token_but_no_role() {
    let response = test_router()
        .oneshot(request("/login", Some("token=abc")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn unmatched_route_bypasses_gate() {
    // No auth cookies at all, yet the patient route serves normally because
    // the matcher excludes it.
    let response = test_router()
        .oneshot(request("/patient/dashboard", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn nutritionist_route_with_token_reaches_handler() {
    let response = test_router()
        .oneshot(request("/nutritionist/appointments", Some("token=abc")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), 1024).await.unwrap();
    assert_eq!(&body[..], b"appointments");
}
