//! Audit breadcrumb stamped onto every mutation

use bson::DateTime;
use serde::{Deserialize, Serialize};

/// Who touched a document, and when.
///
/// Opaque to the engine: it is written to `last_saved` verbatim.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Breadcrumb {
    /// When the mutation was issued
    pub at: DateTime,

    /// Correlation identifier of the originating request
    pub correlation_id: String,

    /// Acting identity, if the caller presented one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actor: Option<String>,
}

impl Breadcrumb {
    /// Create a breadcrumb stamped with the current time
    pub fn new(correlation_id: impl Into<String>, actor: Option<String>) -> Self {
        Self {
            at: DateTime::now(),
            correlation_id: correlation_id.into(),
            actor,
        }
    }
}
