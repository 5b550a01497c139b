//! Read-only catalog endpoints
//!
//! - `GET /chains` - id + name of every chain
//! - `GET /chains/{id}` - full chain
//! - `GET /exercises` - active exercises
//! - `GET /exercises/{id}` - one exercise

use hyper::{Method, Response, StatusCode};

use crate::db::parse_object_id;
use crate::routes::context::RequestContext;
use crate::routes::json::{
    document_response, documents_response, error_response, method_not_allowed, FullBody,
};
use crate::services::ServiceFacade;

/// Handle `/chains` and `/chains/{id}`
pub async fn handle_chains_request(
    facade: &ServiceFacade,
    method: &Method,
    path: &str,
    ctx: &RequestContext,
) -> Response<FullBody> {
    if method != Method::GET {
        return method_not_allowed();
    }

    let subpath = path.strip_prefix("/chains").unwrap_or("").trim_matches('/');
    let result = if subpath.is_empty() {
        facade
            .list_chains(&ctx.actor)
            .await
            .map(|docs| documents_response(&docs))
    } else {
        match parse_object_id(subpath) {
            Ok(id) => facade
                .get_chain(&ctx.actor, &id)
                .await
                .map(|doc| document_response(StatusCode::OK, &doc)),
            Err(e) => Err(e),
        }
    };

    result.unwrap_or_else(|e| error_response(&e))
}

/// Handle `/exercises` and `/exercises/{id}`
pub async fn handle_exercises_request(
    facade: &ServiceFacade,
    method: &Method,
    path: &str,
    ctx: &RequestContext,
) -> Response<FullBody> {
    if method != Method::GET {
        return method_not_allowed();
    }

    let subpath = path
        .strip_prefix("/exercises")
        .unwrap_or("")
        .trim_matches('/');
    let result = if subpath.is_empty() {
        facade
            .list_exercises(&ctx.actor)
            .await
            .map(|docs| documents_response(&docs))
    } else {
        match parse_object_id(subpath) {
            Ok(id) => facade
                .get_exercise(&ctx.actor, &id)
                .await
                .map(|doc| document_response(StatusCode::OK, &doc)),
            Err(e) => Err(e),
        }
    };

    result.unwrap_or_else(|e| error_response(&e))
}
