//! Workshop API - guided learning through ordered exercise chains
//!
//! A workshop is created from a chain of exercises and walks through them
//! in order: started once, advanced one exercise at a time until the last
//! one completes, with observations recorded against whichever exercise is
//! current.
//!
//! ## Layers
//!
//! - **routes / server**: hyper HTTP surface, JSON in and out
//! - **services**: access check, then catalog reads or workshop state machine
//! - **db**: document store gateway (MongoDB, or in-memory for dev and tests)

pub mod auth;
pub mod config;
pub mod db;
pub mod routes;
pub mod server;
pub mod services;
pub mod types;

pub use config::Args;
pub use server::{run, AppState};
pub use types::{Result, WorkshopError};
