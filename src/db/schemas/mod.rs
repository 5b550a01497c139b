//! Database schemas for the workshop API
//!
//! Defines the document structures for chains, exercises and workshops.

mod breadcrumb;
mod chain;
mod status;
mod workshop;

pub use breadcrumb::Breadcrumb;
pub use chain::{Chain, Exercise, CHAIN_COLLECTION, EXERCISE_COLLECTION};
pub use status::Status;
pub use workshop::{
    slot_observations_path, slot_status_path, ExerciseSlot, When, WorkshopDoc,
    CURRENT_EXERCISE_FIELD, EXERCISES_FIELD, LAST_SAVED_FIELD, NAME_FIELD, STATUS_FIELD,
    WHEN_FROM_FIELD, WORKSHOP_COLLECTION,
};
