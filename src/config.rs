//! Configuration for the workshop API
//!
//! CLI arguments and environment variable handling using clap.

use clap::{Parser, ValueEnum};
use std::net::SocketAddr;
use std::sync::Arc;

use crate::auth::{AccessPolicy, AllowAll, RequireActor};

/// Workshop API - guided learning through ordered exercise chains
#[derive(Parser, Debug, Clone)]
#[command(name = "workshop-api")]
#[command(about = "HTTP API for workshop progression over exercise chains")]
pub struct Args {
    /// Address to listen on
    #[arg(long, env = "LISTEN", default_value = "0.0.0.0:8080")]
    pub listen: SocketAddr,

    /// MongoDB connection URI
    #[arg(long, env = "MONGODB_URI", default_value = "mongodb://localhost:27017")]
    pub mongodb_uri: String,

    /// MongoDB database name
    #[arg(long, env = "MONGODB_DB", default_value = "workshops")]
    pub mongodb_db: String,

    /// Enable development mode (falls back to an in-memory store when
    /// MongoDB is unreachable)
    #[arg(long, env = "DEV_MODE", default_value = "false")]
    pub dev_mode: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Emit logs as JSON lines instead of human-readable text
    #[arg(long, env = "LOG_JSON", default_value = "false")]
    pub log_json: bool,

    /// Access policy applied before every operation
    #[arg(long, env = "ACCESS_POLICY", value_enum, default_value_t = PolicyKind::Permissive)]
    pub access_policy: PolicyKind,
}

/// Selectable access policies
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyKind {
    /// Allow every operation
    Permissive,
    /// Mutations require a bearer token
    RequireActor,
}

impl PolicyKind {
    pub fn build(self) -> Arc<dyn AccessPolicy> {
        match self {
            PolicyKind::Permissive => Arc::new(AllowAll),
            PolicyKind::RequireActor => Arc::new(RequireActor),
        }
    }
}

impl Args {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.mongodb_db.trim().is_empty() {
            return Err("MONGODB_DB must not be empty".to_string());
        }

        if !self.mongodb_uri.starts_with("mongodb://") && !self.mongodb_uri.starts_with("mongodb+srv://") {
            return Err("MONGODB_URI must use the mongodb:// or mongodb+srv:// scheme".to_string());
        }

        Ok(())
    }
}
