//! The closed set of user roles and their dashboard landing paths.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A user's role, stored on the user row and mirrored into the `role` cookie
/// at login. The navigation gate never parses this enum — it forwards the
/// cookie string as-is — but route assembly and permission checks do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Role {
    Patient,
    Nutritionist,
    LabTechnician,
    Pathologist,
}

impl Role {
    pub const ALL: [Self; 4] = [Self::Patient, Self::Nutritionist, Self::LabTechnician, Self::Pathologist];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Patient => "patient",
            Self::Nutritionist => "nutritionist",
            Self::LabTechnician => "lab-technician",
            Self::Pathologist => "pathologist",
        }
    }

    /// Landing path a logged-in user of this role is sent to.
    #[must_use]
    pub fn dashboard_path(self) -> String {
        format!("/{}/dashboard", self.as_str())
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown role: {0:?}")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "patient" => Ok(Self::Patient),
            "nutritionist" => Ok(Self::Nutritionist),
            "lab-technician" => Ok(Self::LabTechnician),
            "pathologist" => Ok(Self::Pathologist),
            other => Err(UnknownRole(other.to_owned())),
        }
    }
}

#[cfg(test)]
#[path = "roles_test.rs"]
mod tests;
