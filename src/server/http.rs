//! HTTP server implementation
//!
//! hyper http1 with TokioIo; one spawned task per connection.

use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::body::Incoming;
use hyper::header::{
    HeaderValue, ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS,
    ACCESS_CONTROL_ALLOW_ORIGIN,
};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Method, Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tokio::net::TcpListener;
use tracing::{debug, error, info, warn};

use crate::config::Args;
use crate::db::DocumentStore;
use crate::routes::{self, FullBody, RequestContext};
use crate::services::ServiceFacade;
use crate::types::{Result, WorkshopError};

/// Shared application state
pub struct AppState {
    pub args: Args,
    pub facade: ServiceFacade,
    /// "mongodb" or "memory", reported by /health
    pub store_kind: &'static str,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(args: Args, store: Arc<dyn DocumentStore>, store_kind: &'static str) -> Self {
        let facade = ServiceFacade::new(store, args.access_policy.build());
        Self {
            args,
            facade,
            store_kind,
            started_at: Instant::now(),
        }
    }
}

/// Run the HTTP server
pub async fn run(state: Arc<AppState>) -> Result<()> {
    let listener = TcpListener::bind(state.args.listen).await?;

    info!(
        "Workshop API listening on {} (store: {}, policy: {:?})",
        state.args.listen, state.store_kind, state.args.access_policy
    );

    if state.args.dev_mode {
        warn!("Development mode enabled");
    }

    loop {
        match listener.accept().await {
            Ok((stream, addr)) => {
                let state = Arc::clone(&state);
                tokio::spawn(async move {
                    let io = TokioIo::new(stream);

                    let service = service_fn(move |req| {
                        let state = Arc::clone(&state);
                        async move { handle_request(state, addr, req).await }
                    });

                    if let Err(err) = http1::Builder::new()
                        .preserve_header_case(true)
                        .title_case_headers(true)
                        .serve_connection(io, service)
                        .await
                    {
                        error!("Error serving connection from {}: {:?}", addr, err);
                    }
                });
            }
            Err(e) => {
                error!("Error accepting connection: {:?}", e);
            }
        }
    }
}

/// Collect the request and hand it to the router
async fn handle_request(
    state: Arc<AppState>,
    addr: SocketAddr,
    req: Request<Incoming>,
) -> std::result::Result<Response<FullBody>, hyper::Error> {
    let started = Instant::now();
    let (parts, body) = req.into_parts();
    let path = parts.uri.path().to_string();
    let query = parts.uri.query().map(str::to_string);
    let ctx = RequestContext::from_headers(&parts.headers);

    let response = match body.collect().await {
        Ok(collected) => {
            dispatch(
                &state,
                &parts.method,
                &path,
                query.as_deref(),
                collected.to_bytes(),
                &ctx,
            )
            .await
        }
        Err(e) => {
            debug!("Request body error from {}: {}", addr, e);
            routes::error_response(&WorkshopError::BadRequest(format!(
                "unreadable request body: {}",
                e
            )))
        }
    };

    info!(
        method = %parts.method,
        path = %path,
        status = response.status().as_u16(),
        correlation_id = %ctx.correlation_id(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "request"
    );

    Ok(response)
}

/// Route a fully read request
pub async fn dispatch(
    state: &Arc<AppState>,
    method: &Method,
    path: &str,
    query: Option<&str>,
    body: Bytes,
    ctx: &RequestContext,
) -> Response<FullBody> {
    let facade = &state.facade;

    match (method, path) {
        (&Method::OPTIONS, _) => preflight_response(),

        (&Method::GET, "/health") | (&Method::GET, "/healthz") => {
            routes::health_check(Arc::clone(state))
        }

        (&Method::GET, "/version") => routes::version_info(),

        (_, p) if p == "/chains" || p.starts_with("/chains/") => {
            routes::handle_chains_request(facade, method, p, ctx).await
        }

        (_, p) if p == "/exercises" || p.starts_with("/exercises/") => {
            routes::handle_exercises_request(facade, method, p, ctx).await
        }

        (_, p) if p == "/workshops" || p.starts_with("/workshops/") => {
            routes::handle_workshops_request(facade, method, p, query, body, ctx).await
        }

        _ => routes::not_found_response(path),
    }
}

/// CORS preflight response
fn preflight_response() -> Response<FullBody> {
    let mut response = Response::new(Full::new(Bytes::new()));
    *response.status_mut() = StatusCode::NO_CONTENT;
    let headers = response.headers_mut();
    headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
    headers.insert(
        ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static("GET, POST, PUT, PATCH, OPTIONS"),
    );
    headers.insert(
        ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static("Content-Type, Authorization, X-Request-Id"),
    );
    response
}
