//! Health and version endpoints
//!
//! - /health, /healthz - liveness probe, 200 whenever the process is serving
//! - /version - build metadata stamped by build.rs

use hyper::{Response, StatusCode};
use serde::Serialize;
use std::sync::Arc;

use crate::routes::json::{json_response, FullBody};
use crate::server::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub healthy: bool,
    pub version: &'static str,
    /// Uptime in seconds
    pub uptime: u64,
    /// Which document store backs this instance ("mongodb" or "memory")
    pub store: &'static str,
    #[serde(rename = "accessPolicy")]
    pub access_policy: String,
    pub timestamp: String,
}

#[derive(Serialize)]
pub struct VersionResponse {
    pub version: &'static str,
    pub commit: &'static str,
    pub commit_full: &'static str,
    pub build_time: &'static str,
    pub service: &'static str,
}

pub fn health_check(state: Arc<AppState>) -> Response<FullBody> {
    let response = HealthResponse {
        healthy: true,
        version: env!("CARGO_PKG_VERSION"),
        uptime: state.started_at.elapsed().as_secs(),
        store: state.store_kind,
        access_policy: format!("{:?}", state.args.access_policy),
        timestamp: chrono::Utc::now().to_rfc3339(),
    };
    json_response(StatusCode::OK, &response)
}

pub fn version_info() -> Response<FullBody> {
    let response = VersionResponse {
        version: env!("CARGO_PKG_VERSION"),
        commit: option_env!("GIT_COMMIT_SHORT").unwrap_or("unknown"),
        commit_full: option_env!("GIT_COMMIT_FULL").unwrap_or("unknown"),
        build_time: option_env!("BUILD_TIMESTAMP").unwrap_or("unknown"),
        service: "workshop-api",
    };
    json_response(StatusCode::OK, &response)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Args;
    use crate::db::MemoryDocumentStore;
    use crate::routes::json::body_json;
    use clap::Parser;

    #[tokio::test]
    async fn test_health_reports_store() {
        let args = Args::parse_from(["workshop-api"]);
        let state = Arc::new(AppState::new(
            args,
            Arc::new(MemoryDocumentStore::new()),
            "memory",
        ));
        let response = health_check(state);
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["healthy"], true);
        assert_eq!(body["store"], "memory");
        assert_eq!(body["accessPolicy"], "Permissive");
    }

    #[tokio::test]
    async fn test_version_info() {
        let body = body_json(version_info()).await;
        assert_eq!(body["service"], "workshop-api");
        assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    }
}
