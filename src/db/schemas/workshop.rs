//! Workshop document schema
//!
//! A workshop is a stateful instance of a chain. Callers may persist
//! arbitrary extra fields (name, facilitator, ...) alongside the fields
//! below; the engine only ever touches these through field-level updates,
//! so extra fields survive every mutation.

use bson::{oid::ObjectId, DateTime, Document};
use serde::{Deserialize, Serialize};

use crate::db::schemas::{Breadcrumb, Status};
use crate::types::{Result, WorkshopError};

/// Collection name for workshops
pub const WORKSHOP_COLLECTION: &str = "workshops";

pub const STATUS_FIELD: &str = "status";
pub const CURRENT_EXERCISE_FIELD: &str = "current_exercise";
pub const EXERCISES_FIELD: &str = "exercises";
pub const LAST_SAVED_FIELD: &str = "last_saved";
pub const NAME_FIELD: &str = "name";
pub const WHEN_FROM_FIELD: &str = "when.from";

/// Dotted path of a slot's status, e.g. `exercises.2.status`
pub fn slot_status_path(index: usize) -> String {
    format!("{}.{}.status", EXERCISES_FIELD, index)
}

/// Dotted path of a slot's observation list
pub fn slot_observations_path(index: usize) -> String {
    format!("{}.{}.observations", EXERCISES_FIELD, index)
}

/// Per-workshop progress record for one chain exercise
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ExerciseSlot {
    pub status: Status,

    /// Reference into the exercise catalog (not owned)
    pub exercise_id: ObjectId,

    /// Caller-supplied notes, append-only
    #[serde(default)]
    pub observations: Vec<Document>,
}

impl ExerciseSlot {
    /// Fresh slot for a newly materialized workshop
    pub fn pending(exercise_id: ObjectId) -> Self {
        Self {
            status: Status::Pending,
            exercise_id,
            observations: Vec::new(),
        }
    }
}

/// Time window of a workshop
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct When {
    /// Set when the workshop is started
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<DateTime>,
}

/// Typed view of a persisted workshop
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct WorkshopDoc {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub _id: Option<ObjectId>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    pub status: Status,

    /// Zero-based index into `exercises`; meaningless once Completed
    #[serde(default)]
    pub current_exercise: i32,

    /// Fixed length once created, never reordered
    #[serde(default)]
    pub exercises: Vec<ExerciseSlot>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_saved: Option<Breadcrumb>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub when: Option<When>,
}

impl WorkshopDoc {
    /// Decode the typed view out of a raw document
    pub fn from_document(doc: Document) -> Result<Self> {
        Ok(bson::from_document(doc)?)
    }

    /// Current exercise index, validated against the slot list
    pub fn current_index(&self) -> Result<usize> {
        usize::try_from(self.current_exercise)
            .ok()
            .filter(|i| *i < self.exercises.len())
            .ok_or_else(|| {
                WorkshopError::Internal(format!(
                    "current_exercise {} out of range for {} exercises",
                    self.current_exercise,
                    self.exercises.len()
                ))
            })
    }

    /// Fail with `InvalidState` unless the workshop is in `expected`
    pub fn require_status(&self, expected: Status) -> Result<()> {
        if self.status == expected {
            Ok(())
        } else {
            Err(WorkshopError::InvalidState {
                expected,
                actual: self.status,
            })
        }
    }
}
