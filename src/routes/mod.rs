//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! Two route groups share one axum router. The gate middleware is attached
//! only to the group it is configured to see (entry pages and protected
//! staff dashboards); everything else — patient routes, the auth API,
//! health — bypasses the gate entirely. This is the route-matcher half of
//! the gate contract: unmatched paths never invoke it.

pub mod auth;
pub mod dashboards;

use std::sync::Arc;

use axum::Router;
use axum::http::StatusCode;
use axum::middleware;
use axum::response::Html;
use axum::routing::{get, patch, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::gate::{self, GateConfig};
use crate::state::AppState;

/// Full application router with the default gate configuration.
pub fn app(state: AppState) -> Router {
    app_with_gate(state, Arc::new(GateConfig::default()))
}

/// Router with an explicit gate configuration (used by tests).
pub fn app_with_gate(state: AppState, gate_config: Arc<GateConfig>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Routes the gate's matcher covers. `route_layer` scopes the middleware
    // to exactly these paths.
    let gated = Router::new()
        .route("/login", get(login_page))
        .route("/signup", get(signup_page))
        .route("/nutritionist/dashboard", get(dashboards::nutritionist_dashboard))
        .route(
            "/nutritionist/appointments",
            get(dashboards::nutritionist_appointments).post(dashboards::create_appointment),
        )
        .route("/nutritionist/appointments/{id}", patch(dashboards::update_appointment))
        .route("/lab-technician/dashboard", get(dashboards::lab_technician_dashboard))
        .route(
            "/lab-technician/reports",
            get(dashboards::technician_reports).post(dashboards::submit_report),
        )
        .route("/pathologist/dashboard", get(dashboards::pathologist_dashboard))
        .route("/pathologist/reports", get(dashboards::pending_reports))
        .route("/pathologist/reports/{id}/review", post(dashboards::review_report))
        .route_layer(middleware::from_fn_with_state(gate_config, gate::guard));

    let ungated = Router::new()
        .route("/patient/dashboard", get(dashboards::patient_dashboard))
        .route("/patient/appointments", get(dashboards::patient_appointments))
        .route("/patient/reports", get(dashboards::patient_reports))
        .route("/api/auth/signup", post(auth::signup))
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/logout", post(auth::logout))
        .route("/api/auth/me", get(auth::me))
        .route("/healthz", get(healthz));

    gated
        .merge(ungated)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn login_page() -> Html<&'static str> {
    Html(include_str!("../../pages/login.html"))
}

async fn signup_page() -> Html<&'static str> {
    Html(include_str!("../../pages/signup.html"))
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}
