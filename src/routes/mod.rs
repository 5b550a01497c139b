//! HTTP route handlers

pub mod catalog;
pub mod context;
pub mod health;
pub mod json;
pub mod workshops;

pub use catalog::{handle_chains_request, handle_exercises_request};
pub use context::{RequestContext, REQUEST_ID_HEADER};
pub use health::{health_check, version_info};
pub use json::{error_response, not_found_response, FullBody};
pub use workshops::handle_workshops_request;
