//! The store: live ids, relations, indexes and listeners
//!
//! This module provides the main [`Store`] struct that orchestrates:
//! - Column alignment of incoming batches onto relations
//! - Insertion and deletion across every relation
//! - Index notification (dynamic indexes follow, static ones go stale)
//! - Change events to registered listeners
//!
//! ## Mutation order
//!
//! Every mutating call commits in this order:
//!
//! 1. Relations and the live id set are updated
//! 2. Dynamic indexes receive one batched notification; static indexes are
//!    flagged stale
//! 3. Listeners receive one event
//!
//! Errors from steps 2 and 3 are reported after the mutation is committed.
//!
//! ## Concurrency
//!
//! Single writer. `Store` takes `&mut self` for every mutation and has no
//! internal locking. Use [`Store::into_shared`] to hand readers on other
//! threads a lock-protected handle.

mod align;
pub mod builder;
pub mod config;
pub mod events;

pub use builder::StoreBuilder;
pub use config::{StoreConfig, CONFIG_FILE_NAME};
pub use events::{ListenerId, StoreEvent, StoreListener};

use crate::index::{Index, IndexId};
use crate::source::DataSource;
use events::ListenerList;
use parking_lot::RwLock;
use relstore_core::{
    Batch, BundleStream, Error, Result, RowId, RowSnapshot, StreamEvent, TypeDescriptor, Value,
};
use relstore_storage::{IdAllocator, IdentityRelation, Relation};
use rustc_hash::FxHashSet;
use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

/// Position of a relation in the store
///
/// The identity relation is always [`RelationId::IDENTITY`]; relations
/// created by alignment follow in creation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RelationId(usize);

impl RelationId {
    /// The identity relation
    pub const IDENTITY: RelationId = RelationId(0);

    /// Id of the `pos`-th created relation
    pub const fn from_position(pos: usize) -> Self {
        RelationId(pos + 1)
    }

    /// Creation position, `None` for the identity relation
    pub fn position(&self) -> Option<usize> {
        self.0.checked_sub(1)
    }

    /// True for the identity relation
    pub fn is_identity(&self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for RelationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.position() {
            None => write!(f, "identity"),
            Some(pos) => write!(f, "r{}", pos),
        }
    }
}

/// Store handle shared between threads
pub type SharedStore = Arc<RwLock<Store>>;

pub(crate) struct AttachedIndex {
    pub(crate) relation: RelationId,
    pub(crate) index: Box<dyn Index>,
    pub(crate) stale: bool,
}

#[derive(Debug, Clone, Copy)]
enum IndexOp {
    InsertOne,
    InsertAll,
    DeleteOne,
    DeleteAll,
}

/// In-memory columnar object store
pub struct Store {
    config: StoreConfig,
    ids: IdentityRelation,
    relations: Vec<Box<dyn Relation>>,
    allocator: IdAllocator,
    indexes: Vec<AttachedIndex>,
    factories: Vec<Box<dyn crate::index::IndexFactory>>,
    listeners: ListenerList,
    source: Option<Box<dyn DataSource>>,
}

fn relation_ref<'a>(
    ids: &'a IdentityRelation,
    relations: &'a [Box<dyn Relation>],
    rid: RelationId,
) -> Result<&'a dyn Relation> {
    match rid.position() {
        None => Ok(ids as &dyn Relation),
        Some(pos) => relations
            .get(pos)
            .map(|r| r.as_ref())
            .ok_or_else(|| Error::invalid_input(format!("no relation {}", rid))),
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}

impl Store {
    /// Create an empty store with default configuration
    pub fn new() -> Self {
        Self::with_config(StoreConfig::default())
    }

    /// Create an empty store with `config`
    pub fn with_config(config: StoreConfig) -> Self {
        Self {
            config,
            ids: IdentityRelation::new(),
            relations: Vec::new(),
            allocator: IdAllocator::new(),
            indexes: Vec::new(),
            factories: Vec::new(),
            listeners: ListenerList::default(),
            source: None,
        }
    }

    /// Start building a store
    pub fn builder() -> StoreBuilder {
        StoreBuilder::new()
    }

    /// Active configuration
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Wrap into a lock-protected handle for sharing across threads
    pub fn into_shared(self) -> SharedStore {
        Arc::new(RwLock::new(self))
    }

    // ========================================================================
    // Initialization
    // ========================================================================

    /// Load the configured data source, if any
    ///
    /// The source is consumed; later calls are no-ops returning no ids.
    pub fn initialize(&mut self) -> Result<Vec<RowId>> {
        let Some(mut source) = self.source.take() else {
            return Ok(Vec::new());
        };
        let batch = source.load_data()?;
        debug!(
            target: "relstore::db",
            rows = batch.row_count(),
            columns = batch.column_count(),
            "Loading initial data"
        );
        self.insert(batch)
    }

    /// True until [`Store::initialize`] consumed the data source
    pub fn has_pending_source(&self) -> bool {
        self.source.is_some()
    }

    pub(crate) fn set_source(&mut self, source: Box<dyn DataSource>) {
        self.source = Some(source);
    }

    // ========================================================================
    // Insertion
    // ========================================================================

    /// Insert every row of `batch`
    ///
    /// Returns the row ids in batch order. An identity column supplies
    /// explicit ids; `Null` identity cells and batches without an identity
    /// column get fresh ids.
    ///
    /// # Errors
    ///
    /// - `DuplicateIdentity` if an explicit id is already live. Unless
    ///   `atomic_insert` is set, rows before the conflicting one stay
    ///   inserted and are still index-notified and evented.
    /// - `InvalidInput` for more than one identity column
    /// - `ListenerFailed` after a committed insert
    pub fn insert(&mut self, batch: Batch) -> Result<Vec<RowId>> {
        if batch.row_count() == 0 {
            return Ok(Vec::new());
        }
        if self.config.atomic_insert {
            self.check_identities(&batch)?;
        }

        let (inserted, failure) = self.insert_rows(batch)?;
        debug!(
            target: "relstore::db",
            rows = inserted.len(),
            failed = failure.is_some(),
            "Inserted batch"
        );

        let index_result = self.notify_indexes(&inserted, IndexOp::InsertAll);
        let event_result = if inserted.is_empty() {
            Ok(())
        } else {
            self.listeners
                .fire(&StoreEvent::ObjectsInserted(inserted.clone()))
        };
        if let Some(e) = failure {
            return Err(e);
        }
        index_result?;
        event_result?;
        Ok(inserted)
    }

    /// Insert a single row
    ///
    /// Fires `ObjectInserted` and uses the single-id index notification.
    pub fn insert_row(&mut self, row: RowSnapshot) -> Result<RowId> {
        let batch = row.into_batch();
        let id = if batch.row_count() == 0 {
            // A row without cells still gets an identity
            let id = self.allocator.allocate();
            self.ids.insert_id(id);
            id
        } else {
            if self.config.atomic_insert {
                self.check_identities(&batch)?;
            }
            let (inserted, failure) = self.insert_rows(batch)?;
            if let Some(e) = failure {
                return Err(e);
            }
            match inserted.first() {
                Some(&id) => id,
                None => return Err(Error::invalid_input("row produced no id")),
            }
        };
        debug!(target: "relstore::db", %id, "Inserted row");

        let index_result = self.notify_indexes(&[id], IndexOp::InsertOne);
        let event_result = self.listeners.fire(&StoreEvent::ObjectInserted(id));
        index_result?;
        event_result?;
        Ok(id)
    }

    /// Insert everything a bundle stream yields
    ///
    /// The stream is cut into chunks at every layout change and every
    /// `stream_chunk_size` rows; each chunk is aligned and inserted like a
    /// batch. Rows seen before the first layout are skipped. On error,
    /// chunks inserted earlier stay committed.
    pub fn insert_stream(&mut self, stream: &mut dyn BundleStream) -> Result<Vec<RowId>> {
        let chunk_size = self.config.stream_chunk_size.max(1);
        let mut meta: Vec<TypeDescriptor> = Vec::new();
        let mut pending: Vec<Vec<Value>> = Vec::new();
        let mut inserted = Vec::new();
        loop {
            match stream.next_event()? {
                StreamEvent::MetaChanged => {
                    inserted.extend(self.flush_chunk(&meta, &mut pending)?);
                    meta = stream.meta().to_vec();
                    pending = vec![Vec::new(); meta.len()];
                }
                StreamEvent::NextObject => {
                    if meta.is_empty() {
                        continue;
                    }
                    for (i, column) in pending.iter_mut().enumerate() {
                        column.push(stream.data(i).cloned().unwrap_or(Value::Null));
                    }
                    if pending.first().map_or(0, Vec::len) >= chunk_size {
                        inserted.extend(self.flush_chunk(&meta, &mut pending)?);
                    }
                }
                StreamEvent::EndOfStream => {
                    inserted.extend(self.flush_chunk(&meta, &mut pending)?);
                    return Ok(inserted);
                }
            }
        }
    }

    fn flush_chunk(
        &mut self,
        meta: &[TypeDescriptor],
        pending: &mut [Vec<Value>],
    ) -> Result<Vec<RowId>> {
        if pending.first().map_or(true, Vec::is_empty) {
            return Ok(Vec::new());
        }
        let mut batch = Batch::new();
        for (descriptor, column) in meta.iter().zip(pending.iter_mut()) {
            batch.append_column(*descriptor, std::mem::take(column))?;
        }
        self.insert(batch)
    }

    /// Reject a batch whose explicit ids are live or repeated
    fn check_identities(&self, batch: &Batch) -> Result<()> {
        let Some(col) = batch.identity_column() else {
            return Ok(());
        };
        let mut seen = FxHashSet::default();
        for value in &batch.columns()[col].values {
            if let Some(id) = value.as_id() {
                if self.ids.contains(id) || !seen.insert(id) {
                    return Err(Error::DuplicateIdentity(id));
                }
            }
        }
        Ok(())
    }

    /// Align and write rows; stops at the first failing row
    ///
    /// Returns the committed ids and the error that stopped the loop.
    fn insert_rows(&mut self, batch: Batch) -> Result<(Vec<RowId>, Option<Error>)> {
        let targets = self.align_columns(&batch.metas())?;
        let rows = batch.row_count();
        let mut columns: Vec<_> = batch
            .into_columns()
            .into_iter()
            .map(|c| c.values.into_iter())
            .collect();

        let mut inserted = Vec::with_capacity(rows);
        for _ in 0..rows {
            let cells: Vec<(RelationId, Value)> = targets
                .iter()
                .zip(columns.iter_mut())
                .map(|(rid, values)| (*rid, values.next().unwrap_or(Value::Null)))
                .collect();
            match self.insert_cells(cells) {
                Ok(id) => inserted.push(id),
                Err(e) => return Ok((inserted, Some(e))),
            }
        }
        Ok((inserted, None))
    }

    /// Commit one aligned row; on failure nothing of this row remains
    fn insert_cells(&mut self, cells: Vec<(RelationId, Value)>) -> Result<RowId> {
        let explicit = cells
            .iter()
            .find(|(rid, _)| rid.is_identity())
            .and_then(|(_, value)| value.as_id());
        let id = match explicit {
            Some(id) => {
                if self.ids.contains(id) || !self.allocator.reserve(id) {
                    return Err(Error::DuplicateIdentity(id));
                }
                id
            }
            None => self.allocator.allocate(),
        };
        self.ids.insert_id(id);

        let mut written: Vec<usize> = Vec::with_capacity(cells.len());
        for (rid, value) in cells {
            let Some(pos) = rid.position() else {
                continue;
            };
            if value.is_null() {
                continue;
            }
            let result = match self.relations.get_mut(pos) {
                Some(relation) => relation.set(id, value),
                None => Err(Error::invalid_input(format!("no relation {}", rid))),
            };
            if let Err(e) = result {
                for pos in written {
                    if let Some(relation) = self.relations.get_mut(pos) {
                        let _ = relation.delete(id);
                    }
                }
                self.ids.remove_id(id);
                self.allocator.release(id);
                return Err(e);
            }
            written.push(pos);
        }
        Ok(id)
    }

    // ========================================================================
    // Deletion
    // ========================================================================

    /// Delete one row, returning its cells
    ///
    /// The snapshot starts with the identity cell, followed by one cell per
    /// relation (`Null` where the relation did not hold the id).
    ///
    /// # Errors
    ///
    /// `UnknownIdentity` if `id` is not live; nothing is mutated.
    pub fn delete(&mut self, id: RowId) -> Result<RowSnapshot> {
        if !self.ids.contains(id) {
            return Err(Error::UnknownIdentity(id));
        }
        let snapshot = self.snapshot(id)?;
        self.remove(id)?;
        debug!(target: "relstore::db", %id, "Deleted row");

        let index_result = self.notify_indexes(&[id], IndexOp::DeleteOne);
        let event_result = self.listeners.fire(&StoreEvent::ObjectRemoved(id));
        index_result?;
        event_result?;
        Ok(snapshot)
    }

    /// Delete several rows, returning their cells as a batch
    ///
    /// The batch carries the identity column first, so inserting it again
    /// restores the rows under their original ids.
    ///
    /// # Errors
    ///
    /// `UnknownIdentity` if any id is not live, `InvalidInput` if an id is
    /// listed twice; nothing is mutated in either case.
    pub fn delete_all(&mut self, ids: &[RowId]) -> Result<Batch> {
        let mut seen = FxHashSet::default();
        for &id in ids {
            if !self.ids.contains(id) {
                return Err(Error::UnknownIdentity(id));
            }
            if !seen.insert(id) {
                return Err(Error::invalid_input(format!("{} listed twice", id)));
            }
        }
        if ids.is_empty() {
            return Ok(Batch::new());
        }

        let mut payload = Batch::new().with_column(
            TypeDescriptor::Identity,
            ids.iter().map(|&id| Value::Id(id)).collect(),
        )?;
        for relation in &self.relations {
            let values = ids
                .iter()
                .map(|&id| {
                    if relation.contains(id) {
                        relation.get(id).map(Cow::into_owned)
                    } else {
                        Ok(Value::Null)
                    }
                })
                .collect::<Result<Vec<_>>>()?;
            payload.append_column(relation.type_descriptor(), values)?;
        }

        for &id in ids {
            self.remove(id)?;
        }
        debug!(target: "relstore::db", rows = ids.len(), "Deleted rows");

        let index_result = self.notify_indexes(ids, IndexOp::DeleteAll);
        let event_result = self
            .listeners
            .fire(&StoreEvent::ObjectsRemoved(ids.to_vec()));
        index_result?;
        event_result?;
        Ok(payload)
    }

    fn snapshot(&self, id: RowId) -> Result<RowSnapshot> {
        let mut row = RowSnapshot::new().with(TypeDescriptor::Identity, Value::Id(id))?;
        for relation in &self.relations {
            let value = if relation.contains(id) {
                relation.get(id)?.into_owned()
            } else {
                Value::Null
            };
            row.append(relation.type_descriptor(), value)?;
        }
        Ok(row)
    }

    fn remove(&mut self, id: RowId) -> Result<()> {
        for relation in self.relations.iter_mut() {
            relation.delete(id)?;
        }
        self.ids.remove_id(id);
        self.allocator.release(id);
        Ok(())
    }

    // ========================================================================
    // Index notification
    // ========================================================================

    fn notify_indexes(&mut self, ids: &[RowId], op: IndexOp) -> Result<()> {
        if ids.is_empty() {
            return Ok(());
        }
        let mut first_error = None;
        for (pos, attached) in self.indexes.iter_mut().enumerate() {
            let result = match attached.index.as_dynamic() {
                Some(dynamic) => {
                    match relation_ref(&self.ids, &self.relations, attached.relation) {
                        Ok(relation) => match op {
                            IndexOp::InsertOne => dynamic.insert(ids[0], relation),
                            IndexOp::InsertAll => dynamic.insert_all(ids, relation),
                            IndexOp::DeleteOne => dynamic.delete(ids[0]),
                            IndexOp::DeleteAll => dynamic.delete_all(ids),
                        },
                        Err(e) => Err(e),
                    }
                }
                None => {
                    attached.stale = true;
                    if self.config.warn_on_static_index {
                        warn!(
                            target: "relstore::index",
                            index = attached.index.name(),
                            relation = %attached.relation,
                            operation = ?op,
                            "Non-dynamic index attached; updates are not applied"
                        );
                    }
                    Ok(())
                }
            };
            if let Err(e) = result {
                warn!(
                    target: "relstore::index",
                    index = attached.index.name(),
                    position = pos,
                    error = %e,
                    "Index notification failed"
                );
                first_error.get_or_insert(e);
            }
        }
        first_error.map_or(Ok(()), Err)
    }

    // ========================================================================
    // Indexes
    // ========================================================================

    /// Attach `index` to an existing relation
    ///
    /// The index is initialized against the relation's current contents.
    pub fn attach_index(&mut self, relation: RelationId, mut index: Box<dyn Index>) -> Result<IndexId> {
        let rel = relation_ref(&self.ids, &self.relations, relation)?;
        index.initialize(rel)?;
        tracing::info!(
            target: "relstore::index",
            index = index.name(),
            %relation,
            dynamic = index.is_dynamic(),
            "Attached index"
        );
        self.indexes.push(AttachedIndex {
            relation,
            index,
            stale: false,
        });
        Ok(IndexId(self.indexes.len() - 1))
    }

    /// Attached index by handle
    pub fn index(&self, id: IndexId) -> Option<&dyn Index> {
        self.indexes.get(id.0).map(|a| a.index.as_ref())
    }

    /// Attached index downcast to its concrete type
    pub fn index_as<T: Index>(&self, id: IndexId) -> Option<&T> {
        self.index(id)?.as_any().downcast_ref::<T>()
    }

    /// Has a static index missed a mutation since it was built?
    pub fn is_index_stale(&self, id: IndexId) -> bool {
        self.indexes.get(id.0).map_or(false, |a| a.stale)
    }

    /// Indexes attached to `relation`, in attachment order
    pub fn indexes_for(&self, relation: RelationId) -> Vec<IndexId> {
        self.indexes
            .iter()
            .enumerate()
            .filter(|(_, a)| a.relation == relation)
            .map(|(i, _)| IndexId(i))
            .collect()
    }

    /// Number of attached indexes
    pub fn index_count(&self) -> usize {
        self.indexes.len()
    }

    /// Register a factory for relations created from now on
    pub fn add_index_factory(&mut self, factory: Box<dyn crate::index::IndexFactory>) {
        self.factories.push(factory);
    }

    // ========================================================================
    // Relations
    // ========================================================================

    /// Relation by id
    pub fn relation(&self, id: RelationId) -> Result<&dyn Relation> {
        relation_ref(&self.ids, &self.relations, id)
    }

    /// Every relation, identity first, then in creation order
    pub fn relations(&self) -> impl Iterator<Item = (RelationId, &dyn Relation)> + '_ {
        std::iter::once((RelationId::IDENTITY, &self.ids as &dyn Relation)).chain(
            self.relations
                .iter()
                .enumerate()
                .map(|(pos, r)| (RelationId::from_position(pos), r.as_ref())),
        )
    }

    /// Number of relations, not counting the identity relation
    pub fn relation_count(&self) -> usize {
        self.relations.len()
    }

    /// First relation whose descriptor `restriction` accepts
    ///
    /// # Errors
    ///
    /// `NoSupportedDataType` if no relation matches.
    pub fn relation_by_type(&self, restriction: TypeDescriptor) -> Result<(RelationId, &dyn Relation)> {
        self.relations()
            .find(|(_, r)| restriction.accepts(&r.type_descriptor()))
            .ok_or(Error::NoSupportedDataType(restriction))
    }

    /// Value of `id` in `relation`
    pub fn get(&self, relation: RelationId, id: RowId) -> Result<Cow<'_, Value>> {
        self.relation(relation)?.get(id)
    }

    // ========================================================================
    // Live ids
    // ========================================================================

    /// Live ids, ascending
    pub fn ids(&self) -> impl Iterator<Item = RowId> + '_ {
        self.ids.iter()
    }

    /// Number of live rows
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Is `id` live?
    pub fn contains(&self, id: RowId) -> bool {
        self.ids.contains(id)
    }

    // ========================================================================
    // Listeners
    // ========================================================================

    /// Register a listener
    pub fn add_listener(&mut self, listener: Box<dyn StoreListener>) -> ListenerId {
        self.listeners.add(listener)
    }

    /// Register a closure listener
    pub fn on_change<F>(&mut self, f: F) -> ListenerId
    where
        F: FnMut(&StoreEvent) -> Result<()> + Send + Sync + 'static,
    {
        self.listeners.add(Box::new(f))
    }

    /// Unregister a listener; returns false if it was not registered
    pub fn remove_listener(&mut self, id: ListenerId) -> bool {
        self.listeners.remove(id)
    }

    /// Number of registered listeners
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }
}

impl fmt::Debug for Store {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Store")
            .field("config", &self.config)
            .field("rows", &self.ids.len())
            .field("relations", &self.relations.len())
            .field("indexes", &self.indexes.len())
            .field("factories", &self.factories.len())
            .field("listeners", &self.listeners)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::{DynamicIndex, MembershipIndex, MembershipIndexFactory, SortedValueIndex};
    use parking_lot::Mutex;
    use std::any::Any;

    fn floats(values: &[f64]) -> Batch {
        Batch::new()
            .with_column(
                TypeDescriptor::Float,
                values.iter().map(|&v| Value::Float(v)).collect(),
            )
            .unwrap()
    }

    fn with_ids(ids: &[u64], values: &[f64]) -> Batch {
        Batch::new()
            .with_column(
                TypeDescriptor::Identity,
                ids.iter().map(|&i| Value::Id(RowId::new(i))).collect(),
            )
            .unwrap()
            .with_column(
                TypeDescriptor::Float,
                values.iter().map(|&v| Value::Float(v)).collect(),
            )
            .unwrap()
    }

    const R0: RelationId = RelationId::from_position(0);

    #[test]
    fn test_empty_batch_is_noop() {
        let mut store = Store::new();
        assert!(store.insert(Batch::new()).unwrap().is_empty());
        assert_eq!(store.relation_count(), 0);
        assert!(store.is_empty());
    }

    #[test]
    fn test_insert_and_get() {
        let mut store = Store::new();
        let ids = store.insert(floats(&[1.0, 2.0, 3.0])).unwrap();
        assert_eq!(ids.len(), 3);
        for (id, expected) in ids.iter().zip([1.0, 2.0, 3.0]) {
            assert_eq!(store.get(R0, *id).unwrap().as_float(), Some(expected));
        }
        assert_eq!(store.relation(R0).unwrap().len(), 3);
        assert_eq!(store.relation(RelationId::IDENTITY).unwrap().len(), 3);
    }

    #[test]
    fn test_identity_relation_returns_ids() {
        let mut store = Store::new();
        let ids = store.insert(floats(&[1.0])).unwrap();
        assert_eq!(
            store.get(RelationId::IDENTITY, ids[0]).unwrap().into_owned(),
            Value::Id(ids[0])
        );
    }

    #[test]
    fn test_explicit_ids_used() {
        let mut store = Store::new();
        let ids = store.insert(with_ids(&[7, 3], &[1.0, 2.0])).unwrap();
        assert_eq!(ids, vec![RowId::new(7), RowId::new(3)]);
        // allocation skips explicitly used ids
        let fresh = store.insert(floats(&[0.0; 10])).unwrap();
        assert!(!fresh.contains(&RowId::new(7)));
        assert!(!fresh.contains(&RowId::new(3)));
    }

    #[test]
    fn test_duplicate_mid_batch_keeps_prefix() {
        let mut store = Store::new();
        store.insert(with_ids(&[2], &[0.0])).unwrap();

        let err = store
            .insert(with_ids(&[1, 2, 3], &[1.0, 2.0, 3.0]))
            .unwrap_err();
        assert!(matches!(err, Error::DuplicateIdentity(id) if id == RowId::new(2)));
        assert!(store.contains(RowId::new(1)));
        assert!(!store.contains(RowId::new(3)));
        assert_eq!(store.get(R0, RowId::new(2)).unwrap().as_float(), Some(0.0));
    }

    #[test]
    fn test_atomic_insert_rejects_whole_batch() {
        let config = StoreConfig {
            atomic_insert: true,
            ..StoreConfig::default()
        };
        let mut store = Store::with_config(config);
        store.insert(with_ids(&[2], &[0.0])).unwrap();

        assert!(store.insert(with_ids(&[1, 2], &[1.0, 2.0])).is_err());
        assert!(!store.contains(RowId::new(1)));

        // intra-batch repeat
        assert!(matches!(
            store.insert(with_ids(&[5, 5], &[1.0, 2.0])),
            Err(Error::DuplicateIdentity(_))
        ));
        assert!(!store.contains(RowId::new(5)));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_null_cells_leave_domain() {
        let mut store = Store::new();
        let batch = Batch::new()
            .with_column(TypeDescriptor::Float, vec![Value::Float(1.0), Value::Null])
            .unwrap();
        let ids = store.insert(batch).unwrap();
        let rel = store.relation(R0).unwrap();
        assert!(rel.contains(ids[0]));
        assert!(!rel.contains(ids[1]));
        assert!(store.contains(ids[1]));

        let row = store.delete(ids[1]).unwrap();
        assert_eq!(row.value(1), Some(&Value::Null));
    }

    #[test]
    fn test_delete_returns_snapshot_and_recycles() {
        let mut store = Store::new();
        let ids = store.insert(floats(&[1.0, 2.0])).unwrap();

        let row = store.delete(ids[0]).unwrap();
        assert_eq!(row.value_of(&TypeDescriptor::Identity), Some(&Value::Id(ids[0])));
        assert_eq!(row.value_of(&TypeDescriptor::Float), Some(&Value::Float(1.0)));
        assert!(!store.contains(ids[0]));
        assert!(store.relation(R0).unwrap().get(ids[0]).is_err());

        let again = store.insert(floats(&[9.0])).unwrap();
        assert_eq!(again, vec![ids[0]]);
    }

    #[test]
    fn test_delete_unknown_id() {
        let mut store = Store::new();
        store.insert(floats(&[1.0])).unwrap();
        assert!(matches!(
            store.delete(RowId::new(99)),
            Err(Error::UnknownIdentity(_))
        ));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_delete_all_validates_up_front() {
        let mut store = Store::new();
        let ids = store.insert(floats(&[1.0, 2.0])).unwrap();

        assert!(matches!(
            store.delete_all(&[ids[0], RowId::new(50)]),
            Err(Error::UnknownIdentity(_))
        ));
        assert!(matches!(
            store.delete_all(&[ids[0], ids[0]]),
            Err(Error::InvalidInput(_))
        ));
        assert_eq!(store.len(), 2);

        assert!(store.delete_all(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_delete_all_payload_reinserts_with_same_ids() {
        let mut store = Store::new();
        let ids = store.insert(floats(&[1.0, 2.0, 3.0])).unwrap();

        let payload = store.delete_all(&[ids[0], ids[2]]).unwrap();
        assert_eq!(payload.row_count(), 2);
        assert_eq!(payload.meta(0), Some(&TypeDescriptor::Identity));
        assert_eq!(store.len(), 1);

        let restored = store.insert(payload).unwrap();
        assert_eq!(restored, vec![ids[0], ids[2]]);
        assert_eq!(store.relation_count(), 1);
        assert_eq!(store.get(R0, ids[2]).unwrap().as_float(), Some(3.0));
    }

    #[test]
    fn test_dynamic_index_follows_mutations() {
        let mut store = Store::builder()
            .index_factory(MembershipIndexFactory)
            .build()
            .unwrap();
        let ids = store.insert(floats(&[1.0, 2.0, 3.0, 4.0, 5.0])).unwrap();
        store.delete_all(&ids[..2]).unwrap();

        let index_id = store.indexes_for(R0)[0];
        let index = store.index_as::<MembershipIndex>(index_id).unwrap();
        assert_eq!(index.members(), ids[2..].to_vec());
        assert!(!store.is_index_stale(index_id));
    }

    #[test]
    fn test_static_index_goes_stale() {
        let mut store = Store::new();
        store.insert(floats(&[1.0, 2.0])).unwrap();
        let index_id = store
            .attach_index(R0, Box::new(SortedValueIndex::new()))
            .unwrap();
        assert!(!store.is_index_stale(index_id));

        store.insert(floats(&[3.0])).unwrap();
        let index = store.index_as::<SortedValueIndex>(index_id).unwrap();
        assert_eq!(index.len(), 2);
        assert!(store.is_index_stale(index_id));
    }

    #[test]
    fn test_attach_index_to_missing_relation() {
        let mut store = Store::new();
        let err = store
            .attach_index(R0, Box::new(MembershipIndex::new()))
            .unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[test]
    fn test_relation_by_type() {
        let mut store = Store::new();
        store.insert(floats(&[1.0])).unwrap();

        let (rid, _) = store.relation_by_type(TypeDescriptor::Number).unwrap();
        assert_eq!(rid, R0);
        let (rid, _) = store.relation_by_type(TypeDescriptor::Identity).unwrap();
        assert_eq!(rid, RelationId::IDENTITY);
        assert!(matches!(
            store.relation_by_type(TypeDescriptor::String),
            Err(Error::NoSupportedDataType(TypeDescriptor::String))
        ));
    }

    #[test]
    fn test_insert_row_fires_single_event() {
        let events = Arc::new(Mutex::new(Vec::new()));
        let mut store = Store::new();
        let sink = Arc::clone(&events);
        store.on_change(move |e: &StoreEvent| {
            sink.lock().push(e.clone());
            Ok(())
        });

        let row = RowSnapshot::new()
            .with(TypeDescriptor::String, Value::from("a"))
            .unwrap();
        let id = store.insert_row(row).unwrap();
        store.delete(id).unwrap();

        assert_eq!(
            *events.lock(),
            vec![StoreEvent::ObjectInserted(id), StoreEvent::ObjectRemoved(id)]
        );
    }

    #[test]
    fn test_listener_failure_after_commit() {
        let mut store = Store::new();
        store.on_change(|_: &StoreEvent| Err(Error::invalid_input("nope")));
        let err = store.insert(floats(&[1.0])).unwrap_err();
        assert!(matches!(err, Error::ListenerFailed(_)));
        assert!(err.is_partial_commit());
        assert_eq!(store.len(), 1);
    }

    /// Dynamic index whose every notification fails
    struct BrokenIndex;

    impl Index for BrokenIndex {
        fn name(&self) -> &'static str {
            "broken"
        }

        fn initialize(&mut self, _relation: &dyn Relation) -> Result<()> {
            Ok(())
        }

        fn as_dynamic(&mut self) -> Option<&mut dyn DynamicIndex> {
            Some(self)
        }

        fn is_dynamic(&self) -> bool {
            true
        }

        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    impl DynamicIndex for BrokenIndex {
        fn insert(&mut self, _id: RowId, _relation: &dyn Relation) -> Result<()> {
            Err(Error::invalid_input("index broke"))
        }

        fn delete(&mut self, _id: RowId) -> Result<()> {
            Err(Error::invalid_input("index broke"))
        }
    }

    #[test]
    fn test_index_error_reported_before_listener_error() {
        let mut store = Store::new();
        store
            .attach_index(RelationId::IDENTITY, Box::new(BrokenIndex))
            .unwrap();
        store.on_change(|_: &StoreEvent| Err(Error::invalid_input("listener down")));

        let err = store.insert(floats(&[1.0, 2.0, 3.0])).unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
        let ids: Vec<RowId> = store.ids().collect();
        assert_eq!(ids.len(), 3);

        let row = RowSnapshot::new()
            .with(TypeDescriptor::Float, Value::Float(4.0))
            .unwrap();
        assert!(matches!(store.insert_row(row), Err(Error::InvalidInput(_))));
        assert!(matches!(store.delete(ids[0]), Err(Error::InvalidInput(_))));
        assert!(matches!(
            store.delete_all(&ids[1..]),
            Err(Error::InvalidInput(_))
        ));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_relation_id_display() {
        assert_eq!(RelationId::IDENTITY.to_string(), "identity");
        assert_eq!(RelationId::from_position(2).to_string(), "r2");
        assert_eq!(RelationId::from_position(2).position(), Some(2));
    }

    #[test]
    fn test_shared_store_readable_across_threads() {
        let mut store = Store::new();
        store.insert(floats(&[1.0, 2.0])).unwrap();
        let shared = store.into_shared();

        let reader = Arc::clone(&shared);
        let len = std::thread::spawn(move || reader.read().len())
            .join()
            .unwrap();
        assert_eq!(len, 2);
        shared.write().insert(floats(&[3.0])).unwrap();
        assert_eq!(shared.read().len(), 3);
    }
}
