//! Lab report lifecycle.
//!
//! ARCHITECTURE
//! ============
//! Technicians submit reports, pathologists review them, patients see only
//! released ones. Transitions are one-way: `submitted` moves to `released`
//! or `rejected` exactly once, enforced by the review UPDATE's WHERE clause.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReportStatus {
    Submitted,
    Released,
    Rejected,
}

impl ReportStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Submitted => "submitted",
            Self::Released => "released",
            Self::Rejected => "rejected",
        }
    }

    /// Whether this status is a legal review decision.
    #[must_use]
    pub fn is_decision(self) -> bool {
        matches!(self, Self::Released | Self::Rejected)
    }
}

impl fmt::Display for ReportStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReportStatus {
    type Err = ReportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "submitted" => Ok(Self::Submitted),
            "released" => Ok(Self::Released),
            "rejected" => Ok(Self::Rejected),
            other => Err(ReportError::InvalidStatus(other.to_owned())),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("report {0} not found or already reviewed")]
    NotReviewable(Uuid),
    #[error("unknown report status {0:?}")]
    InvalidStatus(String),
    #[error("{0:?} is not a review decision")]
    InvalidDecision(ReportStatus),
    #[error("patient {0} not found")]
    UnknownPatient(Uuid),
    #[error("database error: {0}")]
    Db(#[from] sqlx::Error),
}

#[derive(Debug, Clone, Serialize)]
pub struct LabReport {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub technician_id: Uuid,
    pub reviewer_id: Option<Uuid>,
    pub test_name: String,
    pub result_summary: String,
    pub status: ReportStatus,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

fn report_from_row(row: &PgRow) -> Result<LabReport, ReportError> {
    let status = row.get::<String, _>("status").parse()?;
    Ok(LabReport {
        id: row.get("id"),
        patient_id: row.get("patient_id"),
        technician_id: row.get("technician_id"),
        reviewer_id: row.get("reviewer_id"),
        test_name: row.get("test_name"),
        result_summary: row.get("result_summary"),
        status,
        created_at: row.get("created_at"),
    })
}

const REPORT_COLUMNS: &str = "id, patient_id, technician_id, reviewer_id, test_name, result_summary, status, created_at";

/// Submit a new report for a patient. Starts in `submitted`.
pub async fn submit(
    pool: &PgPool,
    technician_id: Uuid,
    patient_id: Uuid,
    test_name: &str,
    result_summary: &str,
) -> Result<LabReport, ReportError> {
    let patient = sqlx::query("SELECT 1 AS one FROM users WHERE id = $1 AND role = 'patient'")
        .bind(patient_id)
        .fetch_optional(pool)
        .await?;
    if patient.is_none() {
        return Err(ReportError::UnknownPatient(patient_id));
    }

    let row = sqlx::query(&format!(
        r"INSERT INTO lab_reports (patient_id, technician_id, test_name, result_summary, status)
          VALUES ($1, $2, $3, $4, 'submitted')
          RETURNING {REPORT_COLUMNS}",
    ))
    .bind(patient_id)
    .bind(technician_id)
    .bind(test_name)
    .bind(result_summary)
    .fetch_one(pool)
    .await?;

    report_from_row(&row)
}

/// Reports awaiting review, oldest first.
pub async fn list_pending(pool: &PgPool) -> Result<Vec<LabReport>, ReportError> {
    let rows = sqlx::query(&format!(
        "SELECT {REPORT_COLUMNS} FROM lab_reports WHERE status = 'submitted' ORDER BY created_at",
    ))
    .fetch_all(pool)
    .await?;

    rows.iter().map(report_from_row).collect()
}

/// Reports a technician has submitted, newest first.
pub async fn list_for_technician(pool: &PgPool, technician_id: Uuid) -> Result<Vec<LabReport>, ReportError> {
    let rows = sqlx::query(&format!(
        "SELECT {REPORT_COLUMNS} FROM lab_reports WHERE technician_id = $1 ORDER BY created_at DESC",
    ))
    .bind(technician_id)
    .fetch_all(pool)
    .await?;

    rows.iter().map(report_from_row).collect()
}

/// Released reports visible to a patient, newest first.
pub async fn list_released_for_patient(pool: &PgPool, patient_id: Uuid) -> Result<Vec<LabReport>, ReportError> {
    let rows = sqlx::query(&format!(
        "SELECT {REPORT_COLUMNS} FROM lab_reports WHERE patient_id = $1 AND status = 'released' ORDER BY created_at DESC",
    ))
    .bind(patient_id)
    .fetch_all(pool)
    .await?;

    rows.iter().map(report_from_row).collect()
}

/// Apply a review decision to a submitted report.
pub async fn review(
    pool: &PgPool,
    report_id: Uuid,
    reviewer_id: Uuid,
    decision: ReportStatus,
) -> Result<LabReport, ReportError> {
    if !decision.is_decision() {
        return Err(ReportError::InvalidDecision(decision));
    }

    let row = sqlx::query(&format!(
        r"UPDATE lab_reports
          SET status = $3, reviewer_id = $2, reviewed_at = now()
          WHERE id = $1 AND status = 'submitted'
          RETURNING {REPORT_COLUMNS}",
    ))
    .bind(report_id)
    .bind(reviewer_id)
    .bind(decision.as_str())
    .fetch_optional(pool)
    .await?;

    match row {
        Some(row) => report_from_row(&row),
        None => Err(ReportError::NotReviewable(report_id)),
    }
}

#[cfg(test)]
#[path = "reports_test.rs"]
mod tests;
