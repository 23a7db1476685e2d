//! Sorted store trait definitions.

use crate::batch::WriteBatch;
use crate::error::StoreResult;
use crate::key::NameId;

/// An ascending cursor over a sorted store.
///
/// # Invariants
///
/// - Records are yielded in strictly ascending [`NameId`] order.
/// - After `seek(id)`, the next `next()` call yields the first record whose
///   identifier is greater than or equal to `id`, if any.
pub trait StoreCursor {
    /// Positions the cursor at the given lower bound.
    fn seek(&mut self, id: &NameId);

    /// Advances the cursor and yields the next record, or `None` when the
    /// store is exhausted.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying store cannot be read.
    fn next(&mut self) -> StoreResult<Option<(NameId, Vec<u8>)>>;
}

/// A sorted key-value store holding namespaced records.
///
/// Stores are **opaque value stores**: they never interpret record bytes.
/// The single ordering contract is [`NameId`]'s `Ord` implementation; a
/// store's iteration order must match it exactly, which holding keys as
/// `NameId` guarantees by construction.
///
/// # Implementors
///
/// - [`crate::MemoryStore`] - For testing and ephemeral registries.
pub trait SortedStore {
    /// Reads the record stored under `id`, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying store cannot be read.
    fn get(&self, id: &NameId) -> StoreResult<Option<Vec<u8>>>;

    /// Returns a cursor positioned before the first record.
    fn cursor(&self) -> Box<dyn StoreCursor>;

    /// Applies all operations in `batch` atomically.
    ///
    /// Later operations in the batch win over earlier ones for the same
    /// identifier. Commit is all-or-nothing; a failed commit leaves the
    /// store unchanged.
    ///
    /// # Errors
    ///
    /// Returns an error if the mutations cannot be made durable.
    fn commit(&mut self, batch: WriteBatch) -> StoreResult<()>;
}
