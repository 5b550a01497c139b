//! Progression status shared by workshops and exercise slots

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle status, used identically at workshop and slot level.
///
/// Transitions only move forward: Pending → Active → Completed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    #[default]
    Pending,
    Active,
    Completed,
}

impl Status {
    /// Persisted string form
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Pending => "pending",
            Status::Active => "active",
            Status::Completed => "completed",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Status> for bson::Bson {
    fn from(status: Status) -> Self {
        bson::Bson::String(status.as_str().to_string())
    }
}
