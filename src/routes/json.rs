//! JSON encoding and response helpers shared by all routes
//!
//! Documents leave the service with ids as hex strings and timestamps as
//! RFC 3339 strings; everything else uses relaxed extended JSON.

use bson::{Bson, Document};
use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::header::{HeaderValue, ACCESS_CONTROL_ALLOW_ORIGIN, CACHE_CONTROL, CONTENT_TYPE};
use hyper::{Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{error, warn};

use crate::types::{Result, WorkshopError};

pub type FullBody = Full<Bytes>;

/// Convert a BSON value to its API JSON form
pub fn bson_to_json(value: &Bson) -> Value {
    match value {
        Bson::ObjectId(oid) => Value::String(oid.to_hex()),
        Bson::DateTime(dt) => dt
            .try_to_rfc3339_string()
            .map(Value::String)
            .unwrap_or_else(|_| Value::from(dt.timestamp_millis())),
        Bson::Document(doc) => document_to_json(doc),
        Bson::Array(items) => Value::Array(items.iter().map(bson_to_json).collect()),
        other => other.clone().into_relaxed_extjson(),
    }
}

pub fn document_to_json(doc: &Document) -> Value {
    Value::Object(
        doc.iter()
            .map(|(key, value)| (key.clone(), bson_to_json(value)))
            .collect(),
    )
}

pub fn documents_to_json(docs: &[Document]) -> Value {
    Value::Array(docs.iter().map(document_to_json).collect())
}

/// Parse a request body; an empty body reads as `{}`
pub fn parse_body<T: DeserializeOwned>(body: &Bytes) -> Result<T> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(serde_json::from_str("{}")?);
    }
    Ok(serde_json::from_slice(body)?)
}

/// Parse a request body that must be a JSON object into a BSON document
pub fn parse_object_body(body: &Bytes) -> Result<Document> {
    let value: Value = parse_body(body)?;
    json_object_to_document(value)
}

pub fn json_object_to_document(value: Value) -> Result<Document> {
    match value {
        Value::Object(map) => bson::to_document(&map)
            .map_err(|e| WorkshopError::BadRequest(format!("body cannot be stored: {}", e))),
        other => Err(WorkshopError::BadRequest(format!(
            "expected a JSON object, got {}",
            json_type_name(&other)
        ))),
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

pub fn json_response<T: Serialize>(status: StatusCode, body: &T) -> Response<FullBody> {
    let json = serde_json::to_vec(body).unwrap_or_else(|_| b"{}".to_vec());
    let mut response = Response::new(Full::new(Bytes::from(json)));
    *response.status_mut() = status;
    let headers = response.headers_mut();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-store"));
    headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
    response
}

pub fn document_response(status: StatusCode, doc: &Document) -> Response<FullBody> {
    json_response(status, &document_to_json(doc))
}

pub fn documents_response(docs: &[Document]) -> Response<FullBody> {
    json_response(StatusCode::OK, &documents_to_json(docs))
}

/// Render an error without leaking store or internal detail
pub fn error_response(err: &WorkshopError) -> Response<FullBody> {
    let status = err.status_code();
    if status.is_server_error() {
        error!(error = %err, "Request failed");
    } else {
        warn!(error = %err, "Request rejected");
    }
    json_response(
        status,
        &json!({ "error": err.public_message(), "code": err.code() }),
    )
}

pub fn not_found_response(path: &str) -> Response<FullBody> {
    json_response(
        StatusCode::NOT_FOUND,
        &json!({ "error": "Not Found", "code": "NOT_FOUND", "path": path }),
    )
}

pub fn method_not_allowed() -> Response<FullBody> {
    json_response(
        StatusCode::METHOD_NOT_ALLOWED,
        &json!({ "error": "Method not allowed", "code": "METHOD_NOT_ALLOWED" }),
    )
}

/// Read a JSON response body back into a value
pub async fn body_json(response: Response<FullBody>) -> Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .map(|collected| collected.to_bytes())
        .unwrap_or_default();
    serde_json::from_slice(&bytes).unwrap_or(Value::Null)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::{doc, oid::ObjectId, DateTime};

    #[test]
    fn test_ids_and_dates_are_strings() {
        let id = ObjectId::new();
        let at = DateTime::from_millis(0);
        let value = document_to_json(&doc! {
            "_id": id,
            "when": { "from": at },
            "current_exercise": 2_i32,
            "exercises": [ { "exercise_id": id } ],
        });
        assert_eq!(value["_id"], Value::String(id.to_hex()));
        assert_eq!(value["when"]["from"], Value::String("1970-01-01T00:00:00Z".into()));
        assert_eq!(value["current_exercise"], json!(2));
        assert_eq!(value["exercises"][0]["exercise_id"], Value::String(id.to_hex()));
    }

    #[test]
    fn test_object_body_required() {
        assert!(parse_object_body(&Bytes::from_static(b"{\"a\":1}")).is_ok());
        assert_eq!(parse_object_body(&Bytes::new()).unwrap(), Document::new());
        assert!(matches!(
            parse_object_body(&Bytes::from_static(b"[1,2]")),
            Err(WorkshopError::BadRequest(_))
        ));
        assert!(matches!(
            parse_object_body(&Bytes::from_static(b"{oops")),
            Err(WorkshopError::BadRequest(_))
        ));
    }

    #[tokio::test]
    async fn test_store_error_is_opaque() {
        let response = error_response(&WorkshopError::Store("socket closed".into()));
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        let body = body_json(response).await;
        assert_eq!(body["error"], "Storage unavailable");
        assert_eq!(body["code"], "STORE_FAILURE");
    }
}
