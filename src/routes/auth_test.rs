use super::*;

// =============================================================================
// env_bool — unique env var names to avoid races with parallel tests.
// =============================================================================

#[test]
fn env_bool_true_variants() {
    for (i, val) in ["1", "true", "yes", "on"].iter().enumerate() {
        let key = format!("__NUTRILAB_EB_TRUE_{i}__");
        unsafe { std::env::set_var(&key, val) };
        assert_eq!(env_bool(&key), Some(true), "expected true for {val:?}");
        unsafe { std::env::remove_var(&key) };
    }
}

#[test]
fn env_bool_false_variants() {
    for (i, val) in ["0", "false", "no", "off"].iter().enumerate() {
        let key = format!("__NUTRILAB_EB_FALSE_{i}__");
        unsafe { std::env::set_var(&key, val) };
        assert_eq!(env_bool(&key), Some(false), "expected false for {val:?}");
        unsafe { std::env::remove_var(&key) };
    }
}

#[test]
fn env_bool_trims_and_ignores_case() {
    let key = "__NUTRILAB_EB_TRIM__";
    unsafe { std::env::set_var(key, "  TRUE  ") };
    assert_eq!(env_bool(key), Some(true));
    unsafe { std::env::remove_var(key) };
}

#[test]
fn env_bool_invalid_or_unset_is_none() {
    let key = "__NUTRILAB_EB_INVALID__";
    unsafe { std::env::set_var(key, "maybe") };
    assert_eq!(env_bool(key), None);
    unsafe { std::env::remove_var(key) };

    assert_eq!(env_bool("__NUTRILAB_EB_SURELY_UNSET__"), None);
}

// =============================================================================
// secure_cookies — pure policy, no shared env vars involved.
// =============================================================================

#[test]
fn secure_cookies_explicit_override_wins() {
    assert!(secure_cookies(Some(true), Some("http://localhost:3000")));
    assert!(!secure_cookies(Some(false), Some("https://nutrilab.example.com")));
}

#[test]
fn secure_cookies_infers_from_https_base_url() {
    assert!(secure_cookies(None, Some("https://nutrilab.example.com")));
    assert!(!secure_cookies(None, Some("http://localhost:3000")));
}

#[test]
fn secure_cookies_defaults_to_insecure_without_signals() {
    assert!(!secure_cookies(None, None));
}

// =============================================================================
// cookie builders
// =============================================================================

#[test]
fn token_cookie_is_http_only_and_site_wide() {
    let cookie = token_cookie("abc123".to_owned(), true);
    assert_eq!(cookie.name(), "token");
    assert_eq!(cookie.value(), "abc123");
    assert_eq!(cookie.path(), Some("/"));
    assert_eq!(cookie.http_only(), Some(true));
    assert_eq!(cookie.secure(), Some(true));
    assert_eq!(cookie.same_site(), Some(SameSite::Lax));
}

#[test]
fn role_cookie_is_client_readable() {
    let cookie = role_cookie(Role::Nutritionist, false);
    assert_eq!(cookie.name(), "role");
    assert_eq!(cookie.value(), "nutritionist");
    assert_eq!(cookie.path(), Some("/"));
    // Deliberately readable by client-side code.
    assert_ne!(cookie.http_only(), Some(true));
    assert_eq!(cookie.secure(), Some(false));
}

#[test]
fn expired_cookie_clears_value() {
    let cookie = expired(crate::gate::TOKEN_COOKIE, true, false);
    assert_eq!(cookie.value(), "");
    assert_eq!(cookie.max_age(), Some(Duration::ZERO));
}

// =============================================================================
// error mapping
// =============================================================================

#[test]
fn account_errors_map_to_expected_statuses() {
    assert_eq!(account_error_to_status(&AccountError::InvalidEmail), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(account_error_to_status(&AccountError::WeakPassword), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(account_error_to_status(&AccountError::EmailTaken), StatusCode::CONFLICT);
    assert_eq!(account_error_to_status(&AccountError::InvalidCredentials), StatusCode::UNAUTHORIZED);
}

#[test]
fn db_error_maps_to_internal_server_error() {
    let err = AccountError::Db(sqlx::Error::PoolClosed);
    assert_eq!(account_error_to_status(&err), StatusCode::INTERNAL_SERVER_ERROR);
}

// =============================================================================
// request payloads
// =============================================================================

#[test]
fn signup_request_parses_role_string() {
    let req: SignupRequest = serde_json::from_str(
        r#"{"email":"ana@example.com","name":"Ana","password":"hunter22","role":"lab-technician"}"#,
    )
    .unwrap();
    assert_eq!(req.role, Role::LabTechnician);
}

#[test]
fn signup_request_rejects_unknown_role() {
    let result = serde_json::from_str::<SignupRequest>(
        r#"{"email":"ana@example.com","name":"Ana","password":"hunter22","role":"admin"}"#,
    );
    assert!(result.is_err());
}
