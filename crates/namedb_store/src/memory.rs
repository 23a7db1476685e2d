//! In-memory sorted store for testing.

use crate::batch::{BatchOp, WriteBatch};
use crate::error::StoreResult;
use crate::key::NameId;
use crate::store::{SortedStore, StoreCursor};
use parking_lot::RwLock;
use std::collections::BTreeMap;

/// An in-memory sorted store.
///
/// This store keeps all records in a `BTreeMap` keyed by [`NameId`], so its
/// physical order is the shared ordering relation by construction. It is
/// suitable for:
/// - Unit tests
/// - Integration tests
/// - Ephemeral registries that don't need persistence
///
/// # Cursor Semantics
///
/// Cursors take a point-in-time snapshot of the store when created; writes
/// committed afterwards are not visible through an existing cursor.
///
/// # Example
///
/// ```rust
/// use namedb_store::{MemoryStore, NameId, SortedStore, WriteBatch};
///
/// let mut store = MemoryStore::new();
/// let mut batch = WriteBatch::new();
/// batch.put(NameId::new("ns", "k"), vec![1, 2, 3]);
/// store.commit(batch).unwrap();
/// assert_eq!(store.len(), 1);
/// ```
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: RwLock<BTreeMap<NameId, Vec<u8>>>,
}

impl MemoryStore {
    /// Creates a new empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    /// Checks whether the store holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }

    /// Removes all records.
    pub fn clear(&mut self) {
        self.records.write().clear();
    }
}

impl SortedStore for MemoryStore {
    fn get(&self, id: &NameId) -> StoreResult<Option<Vec<u8>>> {
        Ok(self.records.read().get(id).cloned())
    }

    fn cursor(&self) -> Box<dyn StoreCursor> {
        let snapshot: Vec<(NameId, Vec<u8>)> = self
            .records
            .read()
            .iter()
            .map(|(id, value)| (id.clone(), value.clone()))
            .collect();
        Box::new(MemoryCursor { snapshot, pos: 0 })
    }

    fn commit(&mut self, batch: WriteBatch) -> StoreResult<()> {
        let mut records = self.records.write();
        for op in batch.into_ops() {
            match op {
                BatchOp::Put { id, value } => {
                    records.insert(id, value);
                }
                BatchOp::Erase { id } => {
                    records.remove(&id);
                }
            }
        }
        Ok(())
    }
}

/// Snapshot cursor over a [`MemoryStore`].
struct MemoryCursor {
    snapshot: Vec<(NameId, Vec<u8>)>,
    pos: usize,
}

impl StoreCursor for MemoryCursor {
    fn seek(&mut self, id: &NameId) {
        // Snapshot is sorted, so the lower bound is a partition point.
        self.pos = self.snapshot.partition_point(|(entry_id, _)| entry_id < id);
    }

    fn next(&mut self) -> StoreResult<Option<(NameId, Vec<u8>)>> {
        let item = self.snapshot.get(self.pos).cloned();
        if item.is_some() {
            self.pos += 1;
        }
        Ok(item)
    }
}
