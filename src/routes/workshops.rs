//! Workshop endpoints
//!
//! ## Endpoints
//!
//! - `GET /workshops?name=<text>&caseSensitive=<bool>` - list id + name
//! - `POST /workshops` - create from a chain: `{ "chainId": "...", "data": { ... } }`
//! - `GET /workshops/{id}` - full workshop
//! - `PATCH /workshops/{id}` (or `PUT`) - merge a partial field object
//! - `POST /workshops/{id}/start` - Pending → Active
//! - `POST /workshops/{id}/advance` - complete the current exercise
//! - `POST /workshops/{id}/observations` - append to the current exercise

use bytes::Bytes;
use hyper::{Method, Response, StatusCode};
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::db::schemas::NAME_FIELD;
use crate::db::{parse_object_id, NamePattern};
use crate::routes::context::RequestContext;
use crate::routes::json::{
    document_response, documents_response, error_response, json_object_to_document,
    method_not_allowed, not_found_response, parse_body, parse_object_body, FullBody,
};
use crate::services::ServiceFacade;
use crate::types::Result;

/// Body of `POST /workshops`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateWorkshopRequest {
    #[serde(alias = "chain_id")]
    chain_id: String,
    #[serde(default)]
    data: Map<String, Value>,
}

/// Query parameters for listing workshops
#[derive(Debug, Default, PartialEq)]
struct ListWorkshopsQuery {
    name: Option<String>,
    case_sensitive: bool,
}

impl ListWorkshopsQuery {
    fn from_query_string(query: Option<&str>) -> Self {
        let mut params = Self::default();

        if let Some(q) = query {
            for pair in q.split('&') {
                if let Some((key, value)) = pair.split_once('=') {
                    // Form encoding sends spaces as '+'
                    let value = value.replace('+', " ");
                    let value = urlencoding::decode(&value).unwrap_or_default();
                    match key {
                        "name" if !value.is_empty() => params.name = Some(value.to_string()),
                        "caseSensitive" | "case_sensitive" => {
                            params.case_sensitive =
                                value.eq_ignore_ascii_case("true") || value == "1"
                        }
                        _ => {}
                    }
                }
            }
        }

        params
    }

    fn pattern(&self) -> Option<NamePattern> {
        self.name
            .as_ref()
            .map(|text| NamePattern::new(NAME_FIELD, text.clone(), !self.case_sensitive))
    }
}

/// Workshop route after the `/workshops` prefix
#[derive(Debug, PartialEq)]
enum WorkshopRoute<'a> {
    Collection,
    Item(&'a str),
    Start(&'a str),
    Advance(&'a str),
    Observations(&'a str),
}

impl<'a> WorkshopRoute<'a> {
    fn parse(path: &'a str) -> Option<Self> {
        let subpath = path.strip_prefix("/workshops")?.trim_matches('/');
        if subpath.is_empty() {
            return Some(Self::Collection);
        }
        match subpath.split_once('/') {
            None => Some(Self::Item(subpath)),
            Some((id, "start")) => Some(Self::Start(id)),
            Some((id, "advance")) => Some(Self::Advance(id)),
            Some((id, "observations")) => Some(Self::Observations(id)),
            Some(_) => None,
        }
    }
}

/// Handle every `/workshops` request
pub async fn handle_workshops_request(
    facade: &ServiceFacade,
    method: &Method,
    path: &str,
    query: Option<&str>,
    body: Bytes,
    ctx: &RequestContext,
) -> Response<FullBody> {
    let route = match WorkshopRoute::parse(path) {
        Some(r) => r,
        None => return not_found_response(path),
    };

    let result = match (method, route) {
        (&Method::GET, WorkshopRoute::Collection) => list(facade, query, ctx).await,
        (&Method::POST, WorkshopRoute::Collection) => create(facade, &body, ctx).await,
        (&Method::GET, WorkshopRoute::Item(id)) => get(facade, id, ctx).await,
        (&Method::PATCH, WorkshopRoute::Item(id)) | (&Method::PUT, WorkshopRoute::Item(id)) => {
            update(facade, id, &body, ctx).await
        }
        (&Method::POST, WorkshopRoute::Start(id)) => start(facade, id, ctx).await,
        (&Method::POST, WorkshopRoute::Advance(id)) => advance(facade, id, ctx).await,
        (&Method::POST, WorkshopRoute::Observations(id)) => {
            observe(facade, id, &body, ctx).await
        }
        _ => return method_not_allowed(),
    };

    result.unwrap_or_else(|e| error_response(&e))
}

async fn list(
    facade: &ServiceFacade,
    query: Option<&str>,
    ctx: &RequestContext,
) -> Result<Response<FullBody>> {
    let params = ListWorkshopsQuery::from_query_string(query);
    let docs = facade.list_workshops(&ctx.actor, params.pattern()).await?;
    Ok(documents_response(&docs))
}

async fn create(
    facade: &ServiceFacade,
    body: &Bytes,
    ctx: &RequestContext,
) -> Result<Response<FullBody>> {
    let request: CreateWorkshopRequest = parse_body(body)?;
    let chain_id = parse_object_id(&request.chain_id)?;
    let data = json_object_to_document(Value::Object(request.data))?;
    let doc = facade
        .create_workshop(&ctx.actor, &chain_id, data, &ctx.breadcrumb)
        .await?;
    Ok(document_response(StatusCode::CREATED, &doc))
}

async fn get(facade: &ServiceFacade, id: &str, ctx: &RequestContext) -> Result<Response<FullBody>> {
    let id = parse_object_id(id)?;
    let doc = facade.get_workshop(&ctx.actor, &id).await?;
    Ok(document_response(StatusCode::OK, &doc))
}

async fn update(
    facade: &ServiceFacade,
    id: &str,
    body: &Bytes,
    ctx: &RequestContext,
) -> Result<Response<FullBody>> {
    let id = parse_object_id(id)?;
    let fields = parse_object_body(body)?;
    let doc = facade
        .update_workshop(&ctx.actor, &id, fields, &ctx.breadcrumb)
        .await?;
    Ok(document_response(StatusCode::OK, &doc))
}

async fn start(facade: &ServiceFacade, id: &str, ctx: &RequestContext) -> Result<Response<FullBody>> {
    let id = parse_object_id(id)?;
    let doc = facade.start_workshop(&ctx.actor, &id, &ctx.breadcrumb).await?;
    Ok(document_response(StatusCode::OK, &doc))
}

async fn advance(
    facade: &ServiceFacade,
    id: &str,
    ctx: &RequestContext,
) -> Result<Response<FullBody>> {
    let id = parse_object_id(id)?;
    let doc = facade
        .advance_workshop(&ctx.actor, &id, &ctx.breadcrumb)
        .await?;
    Ok(document_response(StatusCode::OK, &doc))
}

async fn observe(
    facade: &ServiceFacade,
    id: &str,
    body: &Bytes,
    ctx: &RequestContext,
) -> Result<Response<FullBody>> {
    let id = parse_object_id(id)?;
    let observation = parse_object_body(body)?;
    let doc = facade
        .add_observation(&ctx.actor, &id, observation, &ctx.breadcrumb)
        .await?;
    Ok(document_response(StatusCode::OK, &doc))
}
