//! Domain services used by route handlers.
//!
//! ARCHITECTURE
//! ============
//! Service modules own credential, session, and clinical-record persistence
//! so route handlers stay focused on extraction, cookies, and status codes.

pub mod account;
pub mod appointments;
pub mod reports;
pub mod session;

#[cfg(all(test, feature = "live-db-tests"))]
#[path = "live_db_test.rs"]
mod live_db_tests;
