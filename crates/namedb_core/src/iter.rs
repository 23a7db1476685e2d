//! Ascending iteration over records.

use crate::error::{CoreError, CoreResult};
use crate::record::NameRecord;
use namedb_store::{NameId, StoreCursor};

/// Ascending enumeration over persisted or merged records.
///
/// Implemented by [`StoreRecordIterator`] over a raw store cursor and by
/// [`crate::CacheIterator`] for the merged view of a store plus an overlay
/// cache. There is no reverse iteration, and no snapshot isolation beyond
/// what the underlying implementation chooses.
pub trait NameIterator {
    /// Positions the iterator so the next [`next`](Self::next) call yields
    /// the first record whose identifier is greater than or equal to `id`.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying source cannot be repositioned or
    /// read.
    fn seek(&mut self, id: &NameId) -> CoreResult<()>;

    /// Advances and yields the next record, or `None` when exhausted.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying source cannot be read or a stored
    /// record fails to decode.
    fn next(&mut self) -> CoreResult<Option<(NameId, NameRecord)>>;
}

/// Adapter decoding a raw [`StoreCursor`] into records.
///
/// This is the persistent store's side of the [`NameIterator`] capability;
/// the cursor's raw values are decoded with the [`NameRecord`] codec, so a
/// value that fails to decode surfaces as [`CoreError::Corrupted`].
pub struct StoreRecordIterator<'s> {
    cursor: Box<dyn StoreCursor + 's>,
}

impl<'s> StoreRecordIterator<'s> {
    /// Wraps a store cursor.
    pub fn new(cursor: Box<dyn StoreCursor + 's>) -> Self {
        Self { cursor }
    }
}

impl NameIterator for StoreRecordIterator<'_> {
    fn seek(&mut self, id: &NameId) -> CoreResult<()> {
        self.cursor.seek(id);
        Ok(())
    }

    fn next(&mut self) -> CoreResult<Option<(NameId, NameRecord)>> {
        match self.cursor.next()? {
            Some((id, raw)) => {
                let record = NameRecord::decode(&raw).map_err(|err| {
                    CoreError::corrupted(format!("record under {id} failed to decode: {err}"))
                })?;
                Ok(Some((id, record)))
            }
            None => Ok(None),
        }
    }
}
