//! Workshop state engine
//!
//! Owns the workshop lifecycle: materializing a chain into a new workshop,
//! generic field updates, start, advance and observation append.
//!
//! ## Transitions
//!
//! ```text
//! Pending ──start──▶ Active ──advance (last slot)──▶ Completed
//!                      │  ▲
//!                      └──┘ advance (slot i → Completed, current = i+1)
//! ```
//!
//! The slot at `current_exercise` is implicitly the active one; slots are
//! never stamped `active`. Every mutation is a single `update_document`
//! call carrying `last_saved`. Advance and add-observation read first and
//! write second, so two concurrent calls against the same workshop can
//! interleave; per-call atomicity is all the store guarantees.

use bson::{oid::ObjectId, Bson, DateTime, Document};
use std::sync::Arc;
use tracing::{debug, info};

use crate::db::schemas::{
    slot_observations_path, slot_status_path, Breadcrumb, Chain, ExerciseSlot, Status, WorkshopDoc,
    CURRENT_EXERCISE_FIELD, EXERCISES_FIELD, LAST_SAVED_FIELD, NAME_FIELD, STATUS_FIELD,
    WHEN_FROM_FIELD, WORKSHOP_COLLECTION,
};
use crate::db::{DocumentFilter, DocumentStore, NamePattern};
use crate::services::ChainReader;
use crate::types::{Result, WorkshopError};

/// Computed outcome of advancing an active workshop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    /// Slot `from` completes and `to` becomes current
    Next { from: usize, to: usize },
    /// The last slot completes and so does the workshop
    Finish { last: usize },
}

impl Advance {
    /// Plan the transition for `workshop`; it must be Active
    pub fn plan(workshop: &WorkshopDoc) -> Result<Self> {
        workshop.require_status(Status::Active)?;
        let index = workshop.current_index()?;
        let next = index + 1;
        if next >= workshop.exercises.len() {
            Ok(Advance::Finish { last: index })
        } else {
            Ok(Advance::Next { from: index, to: next })
        }
    }

    /// Field set applied by the store.
    ///
    /// On finish `current_exercise` is left where it was.
    pub fn into_set(self) -> Document {
        let mut set = Document::new();
        match self {
            Advance::Next { from, to } => {
                set.insert(slot_status_path(from), Status::Completed);
                set.insert(CURRENT_EXERCISE_FIELD, to as i32);
                set.insert(slot_status_path(to), Status::Pending);
            }
            Advance::Finish { last } => {
                set.insert(slot_status_path(last), Status::Completed);
                set.insert(STATUS_FIELD, Status::Completed);
            }
        }
        set
    }
}

/// Build one pending slot per chain exercise, in chain order
pub fn materialize(chain: &Chain) -> Result<Vec<ExerciseSlot>> {
    if chain.exercises.is_empty() {
        return Err(WorkshopError::InvalidChain(format!(
            "chain '{}' has no exercises",
            chain.name
        )));
    }
    Ok(chain
        .exercises
        .iter()
        .copied()
        .map(ExerciseSlot::pending)
        .collect())
}

pub struct WorkshopEngine {
    store: Arc<dyn DocumentStore>,
    chains: Arc<dyn ChainReader>,
}

impl WorkshopEngine {
    pub fn new(store: Arc<dyn DocumentStore>, chains: Arc<dyn ChainReader>) -> Self {
        Self { store, chains }
    }

    /// Materialize `chain_id` into a new workshop and return it as persisted
    pub async fn create_workshop(
        &self,
        chain_id: &ObjectId,
        mut data: Document,
        breadcrumb: &Breadcrumb,
    ) -> Result<Document> {
        let chain = self.chains.get_chain(chain_id).await?;
        let slots = materialize(&chain)?;
        let slot_count = slots.len();

        data.remove("_id");
        data.insert(STATUS_FIELD, Status::Pending);
        data.insert(CURRENT_EXERCISE_FIELD, 0_i32);
        data.insert(EXERCISES_FIELD, bson::to_bson(&slots)?);
        data.insert(LAST_SAVED_FIELD, bson::to_bson(breadcrumb)?);

        let id = self.store.create_document(WORKSHOP_COLLECTION, data).await?;
        info!(
            workshop_id = %id,
            chain_id = %chain_id,
            exercises = slot_count,
            "Workshop created"
        );

        self.store.get_document(WORKSHOP_COLLECTION, &id).await
    }

    /// Merge `fields` plus the breadcrumb into the workshop.
    ///
    /// `_id` is never written.
    pub async fn update_workshop(
        &self,
        id: &ObjectId,
        mut fields: Document,
        breadcrumb: &Breadcrumb,
    ) -> Result<Document> {
        fields.remove("_id");
        fields.insert(LAST_SAVED_FIELD, bson::to_bson(breadcrumb)?);
        debug!(workshop_id = %id, fields = fields.len(), "Updating workshop");
        self.store
            .update_document(WORKSHOP_COLLECTION, id, fields, None)
            .await
    }

    /// Mark the workshop Active and stamp `when.from`.
    ///
    /// Prior status is not checked.
    pub async fn start_workshop(&self, id: &ObjectId, breadcrumb: &Breadcrumb) -> Result<Document> {
        let mut fields = Document::new();
        fields.insert(STATUS_FIELD, Status::Active);
        fields.insert(WHEN_FROM_FIELD, DateTime::now());
        let updated = self.update_workshop(id, fields, breadcrumb).await?;
        info!(workshop_id = %id, "Workshop started");
        Ok(updated)
    }

    /// Complete the current slot and move to the next, or finish
    pub async fn advance_workshop(
        &self,
        id: &ObjectId,
        breadcrumb: &Breadcrumb,
    ) -> Result<Document> {
        let workshop = self.load(id).await?;
        let advance = Advance::plan(&workshop)?;

        let mut set = advance.into_set();
        set.insert(LAST_SAVED_FIELD, bson::to_bson(breadcrumb)?);
        let updated = self
            .store
            .update_document(WORKSHOP_COLLECTION, id, set, None)
            .await?;

        match advance {
            Advance::Next { from, to } => {
                info!(workshop_id = %id, from, to, "Workshop advanced")
            }
            Advance::Finish { last } => {
                info!(workshop_id = %id, last, "Workshop completed")
            }
        }
        Ok(updated)
    }

    /// Append `observation` to the slot that is current at read time
    pub async fn add_observation(
        &self,
        id: &ObjectId,
        observation: Document,
        breadcrumb: &Breadcrumb,
    ) -> Result<Document> {
        let workshop = self.load(id).await?;
        let index = workshop.current_index()?;

        let mut set = Document::new();
        set.insert(LAST_SAVED_FIELD, bson::to_bson(breadcrumb)?);
        let mut push = Document::new();
        push.insert(slot_observations_path(index), Bson::Document(observation));

        let updated = self
            .store
            .update_document(WORKSHOP_COLLECTION, id, set, Some(push))
            .await?;
        debug!(workshop_id = %id, index, "Observation recorded");
        Ok(updated)
    }

    pub async fn get_workshop(&self, id: &ObjectId) -> Result<Document> {
        self.store.get_document(WORKSHOP_COLLECTION, id).await
    }

    /// Id + name of every workshop whose name matches `pattern`
    pub async fn list_workshops(&self, pattern: Option<NamePattern>) -> Result<Vec<Document>> {
        let filter = DocumentFilter::all().matching(pattern);
        self.store
            .get_documents(WORKSHOP_COLLECTION, &filter, &[NAME_FIELD])
            .await
    }

    async fn load(&self, id: &ObjectId) -> Result<WorkshopDoc> {
        let doc = self.store.get_document(WORKSHOP_COLLECTION, id).await?;
        WorkshopDoc::from_document(doc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::schemas::CHAIN_COLLECTION;
    use crate::db::MemoryDocumentStore;
    use crate::services::StoreChainReader;
    use bson::doc;

    struct Fixture {
        store: Arc<MemoryDocumentStore>,
        engine: WorkshopEngine,
        exercises: Vec<ObjectId>,
        chain_id: ObjectId,
    }

    async fn fixture(n: usize) -> Fixture {
        let store = Arc::new(MemoryDocumentStore::new());
        let exercises: Vec<ObjectId> = (0..n).map(|_| ObjectId::new()).collect();
        let chain_id = store
            .create_document(
                CHAIN_COLLECTION,
                doc! { "name": "basics", "exercises": exercises.clone() },
            )
            .await
            .unwrap();
        let chains = Arc::new(StoreChainReader::new(store.clone()));
        let engine = WorkshopEngine::new(store.clone(), chains);
        Fixture {
            store,
            engine,
            exercises,
            chain_id,
        }
    }

    fn crumb() -> Breadcrumb {
        Breadcrumb::new("req-1", Some("token:tester".into()))
    }

    fn typed(doc: Document) -> WorkshopDoc {
        WorkshopDoc::from_document(doc).unwrap()
    }

    async fn active_workshop(f: &Fixture) -> ObjectId {
        let created = f
            .engine
            .create_workshop(&f.chain_id, doc! { "name": "evening" }, &crumb())
            .await
            .unwrap();
        let id = created.get_object_id("_id").unwrap();
        f.engine.start_workshop(&id, &crumb()).await.unwrap();
        id
    }

    fn slot_statuses(w: &WorkshopDoc) -> Vec<Status> {
        w.exercises.iter().map(|s| s.status).collect()
    }

    #[tokio::test]
    async fn test_create_materializes_chain() {
        let f = fixture(3).await;
        let created = f
            .engine
            .create_workshop(
                &f.chain_id,
                doc! { "name": "evening", "status": "completed", "current_exercise": 9 },
                &crumb(),
            )
            .await
            .unwrap();

        let w = typed(created.clone());
        assert_eq!(w.status, Status::Pending);
        assert_eq!(w.current_exercise, 0);
        assert_eq!(w.name.as_deref(), Some("evening"));
        assert_eq!(slot_statuses(&w), vec![Status::Pending; 3]);
        let ids: Vec<ObjectId> = w.exercises.iter().map(|s| s.exercise_id).collect();
        assert_eq!(ids, f.exercises);
        assert!(w.exercises.iter().all(|s| s.observations.is_empty()));
        let saved = w.last_saved.clone().unwrap();
        assert_eq!(saved.correlation_id, "req-1");
        assert_eq!(saved.actor.as_deref(), Some("token:tester"));

        let fetched = f.engine.get_workshop(&w._id.unwrap()).await.unwrap();
        assert_eq!(fetched, created);
    }

    #[tokio::test]
    async fn test_create_from_missing_chain() {
        let f = fixture(2).await;
        let err = f
            .engine
            .create_workshop(&ObjectId::new(), doc! {}, &crumb())
            .await
            .unwrap_err();
        assert!(matches!(err, WorkshopError::NotFound(_)));
        assert_eq!(f.store.len(WORKSHOP_COLLECTION).await, 0);
    }

    #[tokio::test]
    async fn test_create_rejects_empty_chain() {
        let f = fixture(0).await;
        let err = f
            .engine
            .create_workshop(&f.chain_id, doc! {}, &crumb())
            .await
            .unwrap_err();
        assert!(matches!(err, WorkshopError::InvalidChain(_)));
        assert_eq!(f.store.len(WORKSHOP_COLLECTION).await, 0);
    }

    #[tokio::test]
    async fn test_start_sets_active_and_timestamp() {
        let f = fixture(2).await;
        let id = active_workshop(&f).await;
        let w = typed(f.engine.get_workshop(&id).await.unwrap());
        assert_eq!(w.status, Status::Active);
        assert!(w.when.as_ref().and_then(|when| when.from).is_some());
        assert_eq!(slot_statuses(&w), vec![Status::Pending; 2]);
    }

    #[tokio::test]
    async fn test_advance_moves_to_next_slot() {
        let f = fixture(3).await;
        let id = active_workshop(&f).await;

        let w = typed(f.engine.advance_workshop(&id, &crumb()).await.unwrap());
        assert_eq!(w.status, Status::Active);
        assert_eq!(w.current_exercise, 1);
        assert_eq!(
            slot_statuses(&w),
            vec![Status::Completed, Status::Pending, Status::Pending]
        );
    }

    #[tokio::test]
    async fn test_advance_from_last_slot_completes() {
        let f = fixture(3).await;
        let id = active_workshop(&f).await;
        f.engine.advance_workshop(&id, &crumb()).await.unwrap();
        f.engine.advance_workshop(&id, &crumb()).await.unwrap();

        let w = typed(f.engine.advance_workshop(&id, &crumb()).await.unwrap());
        assert_eq!(w.status, Status::Completed);
        assert_eq!(w.current_exercise, 2);
        assert_eq!(slot_statuses(&w), vec![Status::Completed; 3]);
    }

    #[tokio::test]
    async fn test_advance_requires_active() {
        let f = fixture(2).await;
        let created = f
            .engine
            .create_workshop(&f.chain_id, doc! {}, &crumb())
            .await
            .unwrap();
        let id = created.get_object_id("_id").unwrap();
        let writes = f.store.writes();

        let err = f.engine.advance_workshop(&id, &crumb()).await.unwrap_err();
        match err {
            WorkshopError::InvalidState { actual, .. } => assert_eq!(actual, Status::Pending),
            other => panic!("unexpected error: {:?}", other),
        }
        assert_eq!(f.store.writes(), writes);
        assert_eq!(f.engine.get_workshop(&id).await.unwrap(), created);
    }

    #[tokio::test]
    async fn test_advance_after_completion_fails() {
        let f = fixture(1).await;
        let id = active_workshop(&f).await;
        f.engine.advance_workshop(&id, &crumb()).await.unwrap();

        let err = f.engine.advance_workshop(&id, &crumb()).await.unwrap_err();
        assert!(err.to_string().contains("completed"));
    }

    #[tokio::test]
    async fn test_observation_appends_to_current_slot() {
        let f = fixture(3).await;
        let id = active_workshop(&f).await;
        f.engine.advance_workshop(&id, &crumb()).await.unwrap();
        let before = f.engine.get_workshop(&id).await.unwrap();

        let after = f
            .engine
            .add_observation(&id, doc! { "note": "paired well" }, &crumb())
            .await
            .unwrap();

        let w = typed(after.clone());
        assert_eq!(w.exercises[1].observations, vec![doc! { "note": "paired well" }]);
        assert!(w.exercises[0].observations.is_empty());
        assert!(w.exercises[2].observations.is_empty());

        // Nothing but the slot's observations and last_saved changed
        let strip = |mut d: Document| {
            d.remove(LAST_SAVED_FIELD);
            d.remove(EXERCISES_FIELD);
            d
        };
        assert_eq!(strip(before.clone()), strip(after.clone()));
        let mut expected = typed(before).exercises;
        expected[1].observations.push(doc! { "note": "paired well" });
        assert_eq!(w.exercises, expected);
    }

    #[tokio::test]
    async fn test_update_merges_fields_and_keeps_id() {
        let f = fixture(2).await;
        let created = f
            .engine
            .create_workshop(&f.chain_id, doc! { "name": "old" }, &crumb())
            .await
            .unwrap();
        let id = created.get_object_id("_id").unwrap();

        let updated = f
            .engine
            .update_workshop(
                &id,
                doc! { "_id": ObjectId::new(), "name": "new", "room": "B2" },
                &Breadcrumb::new("req-2", None),
            )
            .await
            .unwrap();

        assert_eq!(updated.get_object_id("_id").unwrap(), id);
        assert_eq!(updated.get_str("name").unwrap(), "new");
        assert_eq!(updated.get_str("room").unwrap(), "B2");
        let w = typed(updated);
        assert_eq!(w.last_saved.unwrap().correlation_id, "req-2");
        assert_eq!(w.exercises.len(), 2);
    }

    #[tokio::test]
    async fn test_update_missing_workshop() {
        let f = fixture(1).await;
        let err = f
            .engine
            .update_workshop(&ObjectId::new(), doc! { "name": "x" }, &crumb())
            .await
            .unwrap_err();
        assert!(matches!(err, WorkshopError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_list_filters_by_name() {
        let f = fixture(1).await;
        for name in ["Morning Kata", "evening kata", "Retro"] {
            f.engine
                .create_workshop(&f.chain_id, doc! { "name": name }, &crumb())
                .await
                .unwrap();
        }

        let all = f.engine.list_workshops(None).await.unwrap();
        assert_eq!(all.len(), 3);
        assert!(all.iter().all(|d| d.get("exercises").is_none()));

        let insensitive = f
            .engine
            .list_workshops(Some(NamePattern::new(NAME_FIELD, "KATA", true)))
            .await
            .unwrap();
        assert_eq!(insensitive.len(), 2);

        let sensitive = f
            .engine
            .list_workshops(Some(NamePattern::new(NAME_FIELD, "Kata", false)))
            .await
            .unwrap();
        assert_eq!(sensitive.len(), 1);
    }

    #[test]
    fn test_plan_and_field_set() {
        let slots = (0..3).map(|_| ExerciseSlot::pending(ObjectId::new())).collect();
        let mut w = WorkshopDoc {
            _id: None,
            name: None,
            status: Status::Active,
            current_exercise: 0,
            exercises: slots,
            last_saved: None,
            when: None,
        };
        assert_eq!(Advance::plan(&w).unwrap(), Advance::Next { from: 0, to: 1 });
        assert_eq!(
            Advance::Next { from: 0, to: 1 }.into_set(),
            doc! {
                "exercises.0.status": "completed",
                "current_exercise": 1,
                "exercises.1.status": "pending",
            }
        );

        w.current_exercise = 2;
        assert_eq!(Advance::plan(&w).unwrap(), Advance::Finish { last: 2 });
        assert_eq!(
            Advance::Finish { last: 2 }.into_set(),
            doc! { "exercises.2.status": "completed", "status": "completed" }
        );

        w.status = Status::Completed;
        assert!(matches!(
            Advance::plan(&w),
            Err(WorkshopError::InvalidState { actual: Status::Completed, .. })
        ));
    }
}
