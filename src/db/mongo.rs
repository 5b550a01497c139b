//! MongoDB client and document store

use async_trait::async_trait;
use bson::{doc, oid::ObjectId, Document};
use futures_util::TryStreamExt;
use mongodb::{
    options::{IndexOptions, ReturnDocument},
    Client, Collection, IndexModel,
};
use tracing::{debug, info};

use crate::db::gateway::{DocumentFilter, DocumentStore};
use crate::db::schemas::{CHAIN_COLLECTION, EXERCISE_COLLECTION, NAME_FIELD, WORKSHOP_COLLECTION};
use crate::types::{Result, WorkshopError};

/// MongoDB client wrapper
#[derive(Clone)]
pub struct MongoClient {
    client: Client,
    db_name: String,
}

impl MongoClient {
    /// Connect and verify the server answers a ping
    pub async fn new(uri: &str, db_name: &str) -> Result<Self> {
        info!("Connecting to MongoDB at {}", uri);

        // Fail fast on an unreachable server instead of hanging at startup
        let timeout_uri = if uri.contains('?') {
            format!("{}&serverSelectionTimeoutMS=3000&connectTimeoutMS=3000", uri)
        } else {
            format!("{}?serverSelectionTimeoutMS=3000&connectTimeoutMS=3000", uri)
        };

        let client = Client::with_uri_str(&timeout_uri)
            .await
            .map_err(|e| WorkshopError::Store(format!("Failed to connect to MongoDB: {}", e)))?;

        client
            .database(db_name)
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|e| WorkshopError::Store(format!("MongoDB ping failed: {}", e)))?;

        info!("Connected to MongoDB database '{}'", db_name);

        Ok(Self {
            client,
            db_name: db_name.to_string(),
        })
    }

    /// Untyped handle on a collection
    pub fn collection(&self, name: &str) -> Collection<Document> {
        self.client.database(&self.db_name).collection::<Document>(name)
    }
}

/// Indexes each collection needs for the listing queries
fn collection_indexes(collection: &str) -> Vec<IndexModel> {
    let named = |keys: Document, name: &str| {
        IndexModel::builder()
            .keys(keys)
            .options(IndexOptions::builder().name(name.to_string()).build())
            .build()
    };

    match collection {
        CHAIN_COLLECTION | WORKSHOP_COLLECTION => {
            vec![named(doc! { NAME_FIELD: 1 }, "name_index")]
        }
        EXERCISE_COLLECTION => vec![named(doc! { "active": 1 }, "active_index")],
        _ => Vec::new(),
    }
}

/// `DocumentStore` backed by a MongoDB database
#[derive(Clone)]
pub struct MongoDocumentStore {
    client: MongoClient,
}

impl MongoDocumentStore {
    pub fn new(client: MongoClient) -> Self {
        Self { client }
    }

    /// Create listing indexes on every collection this service reads
    pub async fn ensure_indexes(&self) -> Result<()> {
        for name in [CHAIN_COLLECTION, EXERCISE_COLLECTION, WORKSHOP_COLLECTION] {
            let indexes = collection_indexes(name);
            if indexes.is_empty() {
                continue;
            }
            self.client
                .collection(name)
                .create_indexes(indexes)
                .await
                .map_err(|e| WorkshopError::Store(format!("Failed to create indexes: {}", e)))?;
            debug!(collection = name, "Indexes applied");
        }
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for MongoDocumentStore {
    async fn get_document(&self, collection: &str, id: &ObjectId) -> Result<Document> {
        self.client
            .collection(collection)
            .find_one(doc! { "_id": *id })
            .await
            .map_err(|e| WorkshopError::Store(format!("Find failed: {}", e)))?
            .ok_or_else(|| WorkshopError::NotFound(format!("{} {}", collection, id)))
    }

    async fn get_documents(
        &self,
        collection: &str,
        filter: &DocumentFilter,
        projection: &[&str],
    ) -> Result<Vec<Document>> {
        let coll = self.client.collection(collection);
        let mut find = coll.find(filter.to_mongo());
        if !projection.is_empty() {
            let mut fields = Document::new();
            for field in projection {
                fields.insert(*field, 1);
            }
            find = find.projection(fields);
        }

        let cursor = find
            .await
            .map_err(|e| WorkshopError::Store(format!("Find failed: {}", e)))?;

        cursor
            .try_collect()
            .await
            .map_err(|e| WorkshopError::Store(format!("Error reading documents: {}", e)))
    }

    async fn create_document(&self, collection: &str, document: Document) -> Result<ObjectId> {
        let result = self
            .client
            .collection(collection)
            .insert_one(document)
            .await
            .map_err(|e| WorkshopError::Store(format!("Insert failed: {}", e)))?;

        result
            .inserted_id
            .as_object_id()
            .ok_or_else(|| WorkshopError::Store("Failed to get inserted ID".into()))
    }

    async fn update_document(
        &self,
        collection: &str,
        id: &ObjectId,
        set: Document,
        push: Option<Document>,
    ) -> Result<Document> {
        let mut update = doc! { "$set": set };
        if let Some(push) = push {
            update.insert("$push", push);
        }

        self.client
            .collection(collection)
            .find_one_and_update(doc! { "_id": *id }, update)
            .return_document(ReturnDocument::After)
            .await
            .map_err(|e| WorkshopError::Store(format!("Update failed: {}", e)))?
            .ok_or_else(|| WorkshopError::NotFound(format!("{} {}", collection, id)))
    }
}
