//! Access checks for the workshop API
//!
//! Provides:
//! - Actor tokens extracted from requests
//! - Operation names and the pluggable `AccessPolicy` capability

pub mod permissions;
pub mod token;

pub use permissions::{AccessDecision, AccessPolicy, AllowAll, Operation, RequireActor};
pub use token::{extract_token_from_header, ActorToken};
