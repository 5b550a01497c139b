//! Document storage for the workshop API
//!
//! The engine talks to `DocumentStore`; MongoDB is the production backend
//! and the in-memory store backs dev mode and tests.

pub mod gateway;
pub mod memory;
pub mod mongo;
pub mod path;
pub mod schemas;

pub use gateway::{parse_object_id, DocumentFilter, DocumentStore, NamePattern};
pub use memory::MemoryDocumentStore;
pub use mongo::{MongoClient, MongoDocumentStore};
