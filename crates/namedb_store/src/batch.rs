//! Atomic write batches.

use crate::key::NameId;

/// A single staged store mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchOp {
    /// Insert or overwrite a record.
    Put {
        /// Identifier of the record.
        id: NameId,
        /// Serialized record bytes (opaque to the store).
        value: Vec<u8>,
    },
    /// Erase a record.
    Erase {
        /// Identifier of the record.
        id: NameId,
    },
}

/// An ordered collection of staged mutations, applied atomically by
/// [`SortedStore::commit`](crate::SortedStore::commit).
///
/// The batch itself performs no reads and never interprets values; it is
/// filled by the caller (typically an overlay cache flush) and handed to
/// the store whole.
#[derive(Debug, Default)]
pub struct WriteBatch {
    ops: Vec<BatchOp>,
}

impl WriteBatch {
    /// Creates an empty batch.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stages a put of `value` under `id`.
    pub fn put(&mut self, id: NameId, value: Vec<u8>) {
        self.ops.push(BatchOp::Put { id, value });
    }

    /// Stages an erase of `id`.
    pub fn erase(&mut self, id: NameId) {
        self.ops.push(BatchOp::Erase { id });
    }

    /// Returns the staged operations in insertion order.
    #[must_use]
    pub fn ops(&self) -> &[BatchOp] {
        &self.ops
    }

    /// Returns the number of staged operations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ops.len()
    }

    /// Checks whether no operations are staged.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Consumes the batch, yielding the staged operations.
    #[must_use]
    pub fn into_ops(self) -> Vec<BatchOp> {
        self.ops
    }
}
