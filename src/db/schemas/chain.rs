//! Chain and exercise catalog schemas
//!
//! Both collections are read-only from this service's point of view.

use bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

/// Collection name for chains
pub const CHAIN_COLLECTION: &str = "chains";

/// Collection name for exercises
pub const EXERCISE_COLLECTION: &str = "exercises";

/// Ordered template of exercises a workshop is created from
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct Chain {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub _id: Option<ObjectId>,

    #[serde(default)]
    pub name: String,

    /// Exercise ids in the order they are worked through
    #[serde(default)]
    pub exercises: Vec<ObjectId>,
}

/// Exercise catalog entry
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct Exercise {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub _id: Option<ObjectId>,

    #[serde(default)]
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Only active exercises are listed
    #[serde(default)]
    pub active: bool,
}
