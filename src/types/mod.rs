//! Shared types for the workshop API

mod error;

pub use error::{Result, WorkshopError};
