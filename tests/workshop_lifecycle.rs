//! End-to-end workshop lifecycle through the router, backed by the in-memory store

use bson::{doc, oid::ObjectId};
use bytes::Bytes;
use clap::Parser;
use hyper::{Method, StatusCode};
use serde_json::{json, Value};
use std::sync::Arc;

use workshop_api::auth::ActorToken;
use workshop_api::config::Args;
use workshop_api::db::schemas::{CHAIN_COLLECTION, EXERCISE_COLLECTION};
use workshop_api::db::{DocumentStore, MemoryDocumentStore};
use workshop_api::routes::json::body_json;
use workshop_api::routes::RequestContext;
use workshop_api::server::{dispatch, AppState};

struct Harness {
    state: Arc<AppState>,
    store: Arc<MemoryDocumentStore>,
    chain_id: ObjectId,
    exercise_ids: Vec<ObjectId>,
}

impl Harness {
    async fn new(extra_args: &[&str]) -> Self {
        let store = Arc::new(MemoryDocumentStore::new());
        let mut exercise_ids = Vec::new();
        for name in ["warmup", "pairing", "retro"] {
            let id = store
                .create_document(EXERCISE_COLLECTION, doc! { "name": name, "active": true })
                .await
                .unwrap();
            exercise_ids.push(id);
        }
        let chain_id = store
            .create_document(
                CHAIN_COLLECTION,
                doc! { "name": "Kata Evening", "exercises": exercise_ids.clone() },
            )
            .await
            .unwrap();

        let mut argv = vec!["workshop-api"];
        argv.extend_from_slice(extra_args);
        let args = Args::parse_from(argv);
        let state = Arc::new(AppState::new(args, store.clone(), "memory"));

        Self {
            state,
            store,
            chain_id,
            exercise_ids,
        }
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
        actor: ActorToken,
    ) -> (StatusCode, Value) {
        let (path, query) = match path.split_once('?') {
            Some((p, q)) => (p, Some(q)),
            None => (path, None),
        };
        let bytes = body
            .map(|b| Bytes::from(b.to_string()))
            .unwrap_or_default();
        let ctx = RequestContext::new(actor, "it-req");
        let response = dispatch(&self.state, &method, path, query, bytes, &ctx).await;
        let status = response.status();
        (status, body_json(response).await)
    }

    async fn post(&self, path: &str, body: Option<Value>) -> (StatusCode, Value) {
        self.send(Method::POST, path, body, ActorToken::bearer("facilitator-1"))
            .await
    }

    async fn get(&self, path: &str) -> (StatusCode, Value) {
        self.send(Method::GET, path, None, ActorToken::anonymous()).await
    }
}

#[tokio::test]
async fn workshop_runs_from_creation_to_completion() {
    let h = Harness::new(&[]).await;

    let (status, created) = h
        .post(
            "/workshops",
            Some(json!({
                "chainId": h.chain_id.to_hex(),
                "data": { "name": "Thursday Kata", "room": "B2" }
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["room"], "B2");
    assert_eq!(created["status"], "pending");
    let slots = created["exercises"].as_array().unwrap();
    assert_eq!(slots.len(), 3);
    for (slot, id) in slots.iter().zip(&h.exercise_ids) {
        assert_eq!(slot["exercise_id"], id.to_hex());
        assert_eq!(slot["status"], "pending");
        assert_eq!(slot["observations"], json!([]));
    }
    let id = created["_id"].as_str().unwrap().to_string();

    // Advancing before start is rejected and writes nothing
    let writes = h.store.writes();
    let (status, body) = h.post(&format!("/workshops/{}/advance", id), None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "INVALID_STATE");
    assert_eq!(h.store.writes(), writes);

    let (status, started) = h.post(&format!("/workshops/{}/start", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(started["status"], "active");
    assert_eq!(started["last_saved"]["actor"], "token:facilita");

    for step in 1..3usize {
        let (_, advanced) = h.post(&format!("/workshops/{}/advance", id), None).await;
        assert_eq!(advanced["status"], "active");
        assert_eq!(advanced["current_exercise"], step);
        assert_eq!(advanced["exercises"][step - 1]["status"], "completed");
    }

    let (_, observed) = h
        .post(
            &format!("/workshops/{}/observations", id),
            Some(json!({ "note": "ran long" })),
        )
        .await;
    assert_eq!(observed["exercises"][2]["observations"], json!([{ "note": "ran long" }]));
    assert_eq!(observed["exercises"][0]["observations"], json!([]));

    let (_, finished) = h.post(&format!("/workshops/{}/advance", id), None).await;
    assert_eq!(finished["status"], "completed");
    assert_eq!(finished["current_exercise"], 2);
    assert!(finished["exercises"]
        .as_array()
        .unwrap()
        .iter()
        .all(|slot| slot["status"] == "completed"));

    let (status, _) = h
        .post(&format!("/workshops/{}/observations", id), Some(json!({ "note": "late" })))
        .await;
    assert_eq!(status, StatusCode::OK);

    let (_, fetched) = h.get(&format!("/workshops/{}", id)).await;
    assert_eq!(fetched["exercises"][2]["observations"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn listing_filters_by_name_substring() {
    let h = Harness::new(&[]).await;
    for name in ["Kata (advanced)", "kata basics", "Retro"] {
        h.post(
            "/workshops",
            Some(json!({ "chainId": h.chain_id.to_hex(), "data": { "name": name } })),
        )
        .await;
    }

    let (_, all) = h.get("/workshops").await;
    assert_eq!(all.as_array().unwrap().len(), 3);
    assert!(all[0].get("exercises").is_none());

    let (_, insensitive) = h.get("/workshops?name=KATA").await;
    assert_eq!(insensitive.as_array().unwrap().len(), 2);

    let (_, sensitive) = h.get("/workshops?name=Kata&caseSensitive=true").await;
    assert_eq!(sensitive.as_array().unwrap().len(), 1);

    let (_, literal) = h.get("/workshops?name=%28advanced%29").await;
    assert_eq!(literal[0]["name"], "Kata (advanced)");
}

#[tokio::test]
async fn require_actor_policy_blocks_anonymous_writes() {
    let h = Harness::new(&["--access-policy", "require-actor"]).await;

    let (status, body) = h
        .send(
            Method::POST,
            "/workshops",
            Some(json!({ "chainId": h.chain_id.to_hex() })),
            ActorToken::anonymous(),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "FORBIDDEN");
    assert_eq!(h.store.len("workshops").await, 0);

    let (status, _) = h.get("/chains").await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = h
        .post("/workshops", Some(json!({ "chainId": h.chain_id.to_hex() })))
        .await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn router_handles_probes_and_unknown_paths() {
    let h = Harness::new(&[]).await;

    let (status, health) = h.get("/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(health["store"], "memory");

    let (status, version) = h.get("/version").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(version["service"], "workshop-api");

    let (status, missing) = h.get("/nowhere").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(missing["path"], "/nowhere");

    let ctx = RequestContext::new(ActorToken::anonymous(), "preflight");
    let response = dispatch(&h.state, &Method::OPTIONS, "/workshops", None, Bytes::new(), &ctx).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let (status, exercises) = h.get("/exercises").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(exercises.as_array().unwrap().len(), 3);
}
