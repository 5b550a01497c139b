//! Service facade consumed by the HTTP layer
//!
//! Every call is checked against the configured `AccessPolicy` first,
//! then delegated to the catalog or the workshop engine. Errors keep
//! their kind; it is the transport's job to decide what to reveal.

use bson::{oid::ObjectId, Document};
use std::sync::Arc;
use tracing::warn;

use crate::auth::{AccessDecision, AccessPolicy, ActorToken, Operation};
use crate::db::schemas::Breadcrumb;
use crate::db::{DocumentStore, NamePattern};
use crate::services::{Catalog, ChainReader, StoreChainReader, WorkshopEngine};
use crate::types::{Result, WorkshopError};

pub struct ServiceFacade {
    catalog: Catalog,
    engine: WorkshopEngine,
    policy: Arc<dyn AccessPolicy>,
}

impl ServiceFacade {
    /// Wire the facade over a store, reading chains from the same store
    pub fn new(store: Arc<dyn DocumentStore>, policy: Arc<dyn AccessPolicy>) -> Self {
        let chains = Arc::new(StoreChainReader::new(Arc::clone(&store)));
        Self::with_chain_reader(store, chains, policy)
    }

    pub fn with_chain_reader(
        store: Arc<dyn DocumentStore>,
        chains: Arc<dyn ChainReader>,
        policy: Arc<dyn AccessPolicy>,
    ) -> Self {
        Self {
            catalog: Catalog::new(Arc::clone(&store)),
            engine: WorkshopEngine::new(store, chains),
            policy,
        }
    }

    fn authorize(&self, actor: &ActorToken, operation: Operation) -> Result<()> {
        match self.policy.check(actor, operation) {
            AccessDecision::Allow => Ok(()),
            AccessDecision::Deny(reason) => {
                warn!(operation = %operation, reason = %reason, "Access denied");
                Err(WorkshopError::Forbidden(reason))
            }
        }
    }

    pub async fn list_chains(&self, actor: &ActorToken) -> Result<Vec<Document>> {
        self.authorize(actor, Operation::ListChains)?;
        self.catalog.list_chains().await
    }

    pub async fn get_chain(&self, actor: &ActorToken, id: &ObjectId) -> Result<Document> {
        self.authorize(actor, Operation::GetChain)?;
        self.catalog.get_chain(id).await
    }

    pub async fn list_exercises(&self, actor: &ActorToken) -> Result<Vec<Document>> {
        self.authorize(actor, Operation::ListExercises)?;
        self.catalog.list_exercises().await
    }

    pub async fn get_exercise(&self, actor: &ActorToken, id: &ObjectId) -> Result<Document> {
        self.authorize(actor, Operation::GetExercise)?;
        self.catalog.get_exercise(id).await
    }

    pub async fn list_workshops(
        &self,
        actor: &ActorToken,
        pattern: Option<NamePattern>,
    ) -> Result<Vec<Document>> {
        self.authorize(actor, Operation::ListWorkshops)?;
        self.engine.list_workshops(pattern).await
    }

    pub async fn get_workshop(&self, actor: &ActorToken, id: &ObjectId) -> Result<Document> {
        self.authorize(actor, Operation::GetWorkshop)?;
        self.engine.get_workshop(id).await
    }

    pub async fn create_workshop(
        &self,
        actor: &ActorToken,
        chain_id: &ObjectId,
        data: Document,
        breadcrumb: &Breadcrumb,
    ) -> Result<Document> {
        self.authorize(actor, Operation::CreateWorkshop)?;
        self.engine.create_workshop(chain_id, data, breadcrumb).await
    }

    pub async fn update_workshop(
        &self,
        actor: &ActorToken,
        id: &ObjectId,
        fields: Document,
        breadcrumb: &Breadcrumb,
    ) -> Result<Document> {
        self.authorize(actor, Operation::UpdateWorkshop)?;
        self.engine.update_workshop(id, fields, breadcrumb).await
    }

    pub async fn start_workshop(
        &self,
        actor: &ActorToken,
        id: &ObjectId,
        breadcrumb: &Breadcrumb,
    ) -> Result<Document> {
        self.authorize(actor, Operation::StartWorkshop)?;
        self.engine.start_workshop(id, breadcrumb).await
    }

    pub async fn advance_workshop(
        &self,
        actor: &ActorToken,
        id: &ObjectId,
        breadcrumb: &Breadcrumb,
    ) -> Result<Document> {
        self.authorize(actor, Operation::AdvanceWorkshop)?;
        self.engine.advance_workshop(id, breadcrumb).await
    }

    pub async fn add_observation(
        &self,
        actor: &ActorToken,
        id: &ObjectId,
        observation: Document,
        breadcrumb: &Breadcrumb,
    ) -> Result<Document> {
        self.authorize(actor, Operation::AddObservation)?;
        self.engine.add_observation(id, observation, breadcrumb).await
    }
}
