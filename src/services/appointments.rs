//! Appointments between patients and nutritionists.

use serde::Serialize;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use time::OffsetDateTime;
use uuid::Uuid;

/// Allowed appointment statuses, stored as text.
pub const STATUSES: [&str; 3] = ["scheduled", "completed", "cancelled"];

pub const DEFAULT_STATUS: &str = "scheduled";

#[must_use]
pub fn is_valid_status(status: &str) -> bool {
    STATUSES.contains(&status)
}

#[derive(Debug, thiserror::Error)]
pub enum AppointmentError {
    #[error("appointment {0} not found")]
    NotFound(Uuid),
    #[error("unknown appointment status {0:?}")]
    InvalidStatus(String),
    #[error("patient {0} not found")]
    UnknownPatient(Uuid),
    #[error("database error: {0}")]
    Db(#[from] sqlx::Error),
}

#[derive(Debug, Clone, Serialize)]
pub struct Appointment {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub nutritionist_id: Uuid,
    #[serde(with = "time::serde::rfc3339")]
    pub scheduled_at: OffsetDateTime,
    pub status: String,
    pub notes: Option<String>,
}

fn appointment_from_row(row: &PgRow) -> Appointment {
    Appointment {
        id: row.get("id"),
        patient_id: row.get("patient_id"),
        nutritionist_id: row.get("nutritionist_id"),
        scheduled_at: row.get("scheduled_at"),
        status: row.get("status"),
        notes: row.get("notes"),
    }
}

/// List a patient's appointments, soonest first.
pub async fn list_for_patient(pool: &PgPool, patient_id: Uuid) -> Result<Vec<Appointment>, AppointmentError> {
    let rows = sqlx::query(
        r"SELECT id, patient_id, nutritionist_id, scheduled_at, status, notes
          FROM appointments
          WHERE patient_id = $1
          ORDER BY scheduled_at",
    )
    .bind(patient_id)
    .fetch_all(pool)
    .await?;

    Ok(rows.iter().map(appointment_from_row).collect())
}

/// List a nutritionist's appointments, soonest first.
pub async fn list_for_nutritionist(
    pool: &PgPool,
    nutritionist_id: Uuid,
) -> Result<Vec<Appointment>, AppointmentError> {
    let rows = sqlx::query(
        r"SELECT id, patient_id, nutritionist_id, scheduled_at, status, notes
          FROM appointments
          WHERE nutritionist_id = $1
          ORDER BY scheduled_at",
    )
    .bind(nutritionist_id)
    .fetch_all(pool)
    .await?;

    Ok(rows.iter().map(appointment_from_row).collect())
}

/// Create an appointment on behalf of a nutritionist.
pub async fn create(
    pool: &PgPool,
    nutritionist_id: Uuid,
    patient_id: Uuid,
    scheduled_at: OffsetDateTime,
    notes: Option<&str>,
) -> Result<Appointment, AppointmentError> {
    let patient = sqlx::query("SELECT 1 AS one FROM users WHERE id = $1 AND role = 'patient'")
        .bind(patient_id)
        .fetch_optional(pool)
        .await?;
    if patient.is_none() {
        return Err(AppointmentError::UnknownPatient(patient_id));
    }

    let row = sqlx::query(
        r"INSERT INTO appointments (patient_id, nutritionist_id, scheduled_at, status, notes)
          VALUES ($1, $2, $3, $4, $5)
          RETURNING id, patient_id, nutritionist_id, scheduled_at, status, notes",
    )
    .bind(patient_id)
    .bind(nutritionist_id)
    .bind(scheduled_at)
    .bind(DEFAULT_STATUS)
    .bind(notes)
    .fetch_one(pool)
    .await?;

    Ok(appointment_from_row(&row))
}

/// Update an appointment's status. Only the owning nutritionist may update.
pub async fn update_status(
    pool: &PgPool,
    id: Uuid,
    nutritionist_id: Uuid,
    status: &str,
) -> Result<Appointment, AppointmentError> {
    if !is_valid_status(status) {
        return Err(AppointmentError::InvalidStatus(status.to_owned()));
    }

    let row = sqlx::query(
        r"UPDATE appointments
          SET status = $3
          WHERE id = $1 AND nutritionist_id = $2
          RETURNING id, patient_id, nutritionist_id, scheduled_at, status, notes",
    )
    .bind(id)
    .bind(nutritionist_id)
    .bind(status)
    .fetch_optional(pool)
    .await?;

    row.map(|r| appointment_from_row(&r)).ok_or(AppointmentError::NotFound(id))
}

#[cfg(test)]
#[path = "appointments_test.rs"]
mod tests;
