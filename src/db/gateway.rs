//! Document store gateway
//!
//! The narrow interface the engine consumes: read by id, read many by
//! filter, create, and a single atomic set(+push) update per call.
//! Implementations must apply each `update_document` call atomically
//! against one document; nothing more is assumed.

use async_trait::async_trait;
use bson::{doc, oid::ObjectId, Bson, Document};
use regex::RegexBuilder;

use crate::db::path::get_path;
use crate::types::{Result, WorkshopError};

/// Collection-scoped document operations
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Fetch one document; `NotFound` if the id does not exist
    async fn get_document(&self, collection: &str, id: &ObjectId) -> Result<Document>;

    /// Fetch all documents matching `filter`, projected to `projection`
    /// (plus `_id`). An empty projection returns full documents.
    async fn get_documents(
        &self,
        collection: &str,
        filter: &DocumentFilter,
        projection: &[&str],
    ) -> Result<Vec<Document>>;

    /// Insert a new document; the store assigns the id
    async fn create_document(&self, collection: &str, document: Document) -> Result<ObjectId>;

    /// Apply `$set` (and optional `$push`) in one atomic call and return
    /// the document as it is after the update
    async fn update_document(
        &self,
        collection: &str,
        id: &ObjectId,
        set: Document,
        push: Option<Document>,
    ) -> Result<Document>;
}

/// Literal substring match on a single field
#[derive(Debug, Clone, PartialEq)]
pub struct NamePattern {
    pub field: String,
    pub text: String,
    pub case_insensitive: bool,
}

impl NamePattern {
    pub fn new(field: impl Into<String>, text: impl Into<String>, case_insensitive: bool) -> Self {
        Self {
            field: field.into(),
            text: text.into(),
            case_insensitive,
        }
    }

    fn is_match(&self, value: &str) -> bool {
        RegexBuilder::new(&regex::escape(&self.text))
            .case_insensitive(self.case_insensitive)
            .build()
            .map(|re| re.is_match(value))
            .unwrap_or(false)
    }
}

/// Conjunction of equality checks and an optional name pattern
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentFilter {
    pub equals: Vec<(String, Bson)>,
    pub pattern: Option<NamePattern>,
}

impl DocumentFilter {
    /// Matches every document
    pub fn all() -> Self {
        Self::default()
    }

    pub fn eq(mut self, field: impl Into<String>, value: impl Into<Bson>) -> Self {
        self.equals.push((field.into(), value.into()));
        self
    }

    pub fn matching(mut self, pattern: Option<NamePattern>) -> Self {
        self.pattern = pattern;
        self
    }

    /// MongoDB query form
    pub fn to_mongo(&self) -> Document {
        let mut filter = Document::new();
        for (field, value) in &self.equals {
            filter.insert(field.clone(), value.clone());
        }
        if let Some(ref pattern) = self.pattern {
            let options = if pattern.case_insensitive { "i" } else { "" };
            filter.insert(
                pattern.field.clone(),
                doc! { "$regex": regex::escape(&pattern.text), "$options": options },
            );
        }
        filter
    }

    /// In-process evaluation, same semantics as `to_mongo`
    pub fn matches(&self, document: &Document) -> bool {
        let equal = self
            .equals
            .iter()
            .all(|(field, value)| get_path(document, field) == Some(value));
        if !equal {
            return false;
        }
        match self.pattern {
            Some(ref pattern) => match get_path(document, &pattern.field) {
                Some(Bson::String(s)) => pattern.is_match(s),
                _ => false,
            },
            None => true,
        }
    }
}

/// Parse a hex document id supplied by a caller
pub fn parse_object_id(raw: &str) -> Result<ObjectId> {
    ObjectId::parse_str(raw.trim())
        .map_err(|_| WorkshopError::BadRequest(format!("'{}' is not a valid id", raw)))
}
