//! Per-role dashboard and data routes.
//!
//! DESIGN
//! ======
//! The navigation gate only decides redirect vs. pass-through; actual data
//! access is authorized here. Every handler requires a valid session via
//! `AuthUser` and additionally checks that the session user's role matches
//! the dashboard being served, so a tampered `role` cookie buys nothing.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::Deserialize;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::roles::Role;
use crate::routes::auth::AuthUser;
use crate::services::appointments::{self, AppointmentError};
use crate::services::reports::{self, ReportError, ReportStatus};
use crate::state::AppState;

fn require_role(auth: &AuthUser, role: Role) -> Result<(), StatusCode> {
    if auth.user.role == role { Ok(()) } else { Err(StatusCode::FORBIDDEN) }
}

pub(crate) fn appointment_error_to_status(err: &AppointmentError) -> StatusCode {
    match err {
        AppointmentError::NotFound(_) | AppointmentError::UnknownPatient(_) => StatusCode::NOT_FOUND,
        AppointmentError::InvalidStatus(_) => StatusCode::UNPROCESSABLE_ENTITY,
        AppointmentError::Db(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

pub(crate) fn report_error_to_status(err: &ReportError) -> StatusCode {
    match err {
        ReportError::NotReviewable(_) => StatusCode::CONFLICT,
        ReportError::UnknownPatient(_) => StatusCode::NOT_FOUND,
        ReportError::InvalidStatus(_) | ReportError::InvalidDecision(_) => StatusCode::UNPROCESSABLE_ENTITY,
        ReportError::Db(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn appointment_error_response(err: &AppointmentError) -> Response {
    let status = appointment_error_to_status(err);
    if status == StatusCode::INTERNAL_SERVER_ERROR {
        tracing::error!(error = %err, "appointment operation failed");
    }
    (status, err.to_string()).into_response()
}

fn report_error_response(err: &ReportError) -> Response {
    let status = report_error_to_status(err);
    if status == StatusCode::INTERNAL_SERVER_ERROR {
        tracing::error!(error = %err, "report operation failed");
    }
    (status, err.to_string()).into_response()
}

// =============================================================================
// PATIENT
// =============================================================================

/// `GET /patient/dashboard`
pub async fn patient_dashboard(State(state): State<AppState>, auth: AuthUser) -> Response {
    if let Err(status) = require_role(&auth, Role::Patient) {
        return status.into_response();
    }

    let appointments = match appointments::list_for_patient(&state.pool, auth.user.id).await {
        Ok(a) => a,
        Err(e) => return appointment_error_response(&e),
    };
    let released = match reports::list_released_for_patient(&state.pool, auth.user.id).await {
        Ok(r) => r,
        Err(e) => return report_error_response(&e),
    };

    Json(serde_json::json!({
        "role": auth.user.role,
        "name": auth.user.name,
        "upcoming_appointments": appointments.iter().filter(|a| a.status == "scheduled").count(),
        "released_reports": released.len(),
    }))
    .into_response()
}

/// `GET /patient/appointments`
pub async fn patient_appointments(State(state): State<AppState>, auth: AuthUser) -> Response {
    if let Err(status) = require_role(&auth, Role::Patient) {
        return status.into_response();
    }

    match appointments::list_for_patient(&state.pool, auth.user.id).await {
        Ok(list) => Json(list).into_response(),
        Err(e) => appointment_error_response(&e),
    }
}

/// `GET /patient/reports` — released reports only.
pub async fn patient_reports(State(state): State<AppState>, auth: AuthUser) -> Response {
    if let Err(status) = require_role(&auth, Role::Patient) {
        return status.into_response();
    }

    match reports::list_released_for_patient(&state.pool, auth.user.id).await {
        Ok(list) => Json(list).into_response(),
        Err(e) => report_error_response(&e),
    }
}

// =============================================================================
// NUTRITIONIST
// =============================================================================

/// `GET /nutritionist/dashboard`
pub async fn nutritionist_dashboard(State(state): State<AppState>, auth: AuthUser) -> Response {
    if let Err(status) = require_role(&auth, Role::Nutritionist) {
        return status.into_response();
    }

    match appointments::list_for_nutritionist(&state.pool, auth.user.id).await {
        Ok(list) => Json(serde_json::json!({
            "role": auth.user.role,
            "name": auth.user.name,
            "upcoming_appointments": list.iter().filter(|a| a.status == "scheduled").count(),
            "total_appointments": list.len(),
        }))
        .into_response(),
        Err(e) => appointment_error_response(&e),
    }
}

/// `GET /nutritionist/appointments`
pub async fn nutritionist_appointments(State(state): State<AppState>, auth: AuthUser) -> Response {
    if let Err(status) = require_role(&auth, Role::Nutritionist) {
        return status.into_response();
    }

    match appointments::list_for_nutritionist(&state.pool, auth.user.id).await {
        Ok(list) => Json(list).into_response(),
        Err(e) => appointment_error_response(&e),
    }
}

#[derive(Deserialize)]
pub struct CreateAppointmentRequest {
    pub patient_id: Uuid,
    #[serde(with = "time::serde::rfc3339")]
    pub scheduled_at: OffsetDateTime,
    pub notes: Option<String>,
}

/// `POST /nutritionist/appointments`
pub async fn create_appointment(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<CreateAppointmentRequest>,
) -> Response {
    if let Err(status) = require_role(&auth, Role::Nutritionist) {
        return status.into_response();
    }

    match appointments::create(&state.pool, auth.user.id, req.patient_id, req.scheduled_at, req.notes.as_deref())
        .await
    {
        Ok(appt) => (StatusCode::CREATED, Json(appt)).into_response(),
        Err(e) => appointment_error_response(&e),
    }
}

#[derive(Deserialize)]
pub struct UpdateAppointmentRequest {
    pub status: String,
}

/// `PATCH /nutritionist/appointments/{id}`
pub async fn update_appointment(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateAppointmentRequest>,
) -> Response {
    if let Err(status) = require_role(&auth, Role::Nutritionist) {
        return status.into_response();
    }

    match appointments::update_status(&state.pool, id, auth.user.id, &req.status).await {
        Ok(appt) => Json(appt).into_response(),
        Err(e) => appointment_error_response(&e),
    }
}

// =============================================================================
// LAB TECHNICIAN
// =============================================================================

/// `GET /lab-technician/dashboard`
pub async fn lab_technician_dashboard(State(state): State<AppState>, auth: AuthUser) -> Response {
    if let Err(status) = require_role(&auth, Role::LabTechnician) {
        return status.into_response();
    }

    match reports::list_for_technician(&state.pool, auth.user.id).await {
        Ok(list) => Json(serde_json::json!({
            "role": auth.user.role,
            "name": auth.user.name,
            "submitted_reports": list.iter().filter(|r| r.status == ReportStatus::Submitted).count(),
            "total_reports": list.len(),
        }))
        .into_response(),
        Err(e) => report_error_response(&e),
    }
}

/// `GET /lab-technician/reports` — reports this technician submitted.
pub async fn technician_reports(State(state): State<AppState>, auth: AuthUser) -> Response {
    if let Err(status) = require_role(&auth, Role::LabTechnician) {
        return status.into_response();
    }

    match reports::list_for_technician(&state.pool, auth.user.id).await {
        Ok(list) => Json(list).into_response(),
        Err(e) => report_error_response(&e),
    }
}

#[derive(Deserialize)]
pub struct SubmitReportRequest {
    pub patient_id: Uuid,
    pub test_name: String,
    pub result_summary: String,
}

/// `POST /lab-technician/reports`
pub async fn submit_report(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<SubmitReportRequest>,
) -> Response {
    if let Err(status) = require_role(&auth, Role::LabTechnician) {
        return status.into_response();
    }

    match reports::submit(&state.pool, auth.user.id, req.patient_id, &req.test_name, &req.result_summary).await {
        Ok(report) => (StatusCode::CREATED, Json(report)).into_response(),
        Err(e) => report_error_response(&e),
    }
}

// =============================================================================
// PATHOLOGIST
// =============================================================================

/// `GET /pathologist/dashboard`
pub async fn pathologist_dashboard(State(state): State<AppState>, auth: AuthUser) -> Response {
    if let Err(status) = require_role(&auth, Role::Pathologist) {
        return status.into_response();
    }

    match reports::list_pending(&state.pool).await {
        Ok(list) => Json(serde_json::json!({
            "role": auth.user.role,
            "name": auth.user.name,
            "pending_reviews": list.len(),
        }))
        .into_response(),
        Err(e) => report_error_response(&e),
    }
}

/// `GET /pathologist/reports` — reports awaiting review.
pub async fn pending_reports(State(state): State<AppState>, auth: AuthUser) -> Response {
    if let Err(status) = require_role(&auth, Role::Pathologist) {
        return status.into_response();
    }

    match reports::list_pending(&state.pool).await {
        Ok(list) => Json(list).into_response(),
        Err(e) => report_error_response(&e),
    }
}

#[derive(Deserialize)]
pub struct ReviewRequest {
    pub decision: ReportStatus,
}

/// `POST /pathologist/reports/{id}/review`
pub async fn review_report(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(req): Json<ReviewRequest>,
) -> Response {
    if let Err(status) = require_role(&auth, Role::Pathologist) {
        return status.into_response();
    }

    match reports::review(&state.pool, id, auth.user.id, req.decision).await {
        Ok(report) => Json(report).into_response(),
        Err(e) => report_error_response(&e),
    }
}

#[cfg(test)]
#[path = "dashboards_test.rs"]
mod tests;
