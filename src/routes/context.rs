//! Per-request caller context: actor token and audit breadcrumb

use hyper::HeaderMap;
use uuid::Uuid;

use crate::auth::ActorToken;
use crate::db::schemas::Breadcrumb;

/// Header carrying the caller's correlation id
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Who is calling, and the breadcrumb their mutations will carry
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub actor: ActorToken,
    pub breadcrumb: Breadcrumb,
}

impl RequestContext {
    pub fn new(actor: ActorToken, correlation_id: impl Into<String>) -> Self {
        let breadcrumb = Breadcrumb::new(correlation_id, actor.subject());
        Self { actor, breadcrumb }
    }

    /// Build from request headers; a missing request id gets a fresh UUID
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let actor = ActorToken::from_header(
            headers
                .get(hyper::header::AUTHORIZATION)
                .and_then(|v| v.to_str().ok()),
        );
        let correlation_id = headers
            .get(REQUEST_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        Self::new(actor, correlation_id)
    }

    pub fn correlation_id(&self) -> &str {
        &self.breadcrumb.correlation_id
    }
}
