//! Per-identifier history stacks for rollback bookkeeping.

use crate::error::{CoreError, CoreResult};
use crate::record::{read_u32, NameRecord};

/// Audit trail of a record's obsoleted states, oldest at the bottom.
///
/// The surrounding rollback logic pushes the previous state whenever a
/// record is updated and pops it when undoing the update. An empty stack
/// is the external signal to purge the identifier's history entry from
/// persistent storage entirely.
///
/// This is a standalone primitive; it has no knowledge of the overlay
/// cache.
///
/// # Serialized Layout
///
/// A `u32 LE` record count followed by each record in bottom-to-top order,
/// using the [`NameRecord`] framing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NameHistory {
    records: Vec<NameRecord>,
}

impl NameHistory {
    /// Creates an empty history.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Checks whether the stack holds no records.
    ///
    /// Used to decide when to fully delete the identifier's history entry
    /// in the database.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Read access to the stack, oldest record first.
    #[must_use]
    pub fn records(&self) -> &[NameRecord] {
        &self.records
    }

    /// Pushes a newly obsoleted state onto the stack.
    ///
    /// # Panics
    ///
    /// Panics if `entry`'s height is below the current top's. Heights on
    /// the stack are non-decreasing; a violation means the cache state is
    /// corrupted and processing must not continue.
    pub fn push(&mut self, entry: NameRecord) {
        if let Some(top) = self.records.last() {
            assert!(
                top.height() <= entry.height(),
                "history push with decreasing height: top {} > entry {}",
                top.height(),
                entry.height()
            );
        }
        self.records.push(entry);
    }

    /// Pops the top entry while undoing a record change. The record's value
    /// after undoing is passed in and must match the removed entry.
    ///
    /// # Panics
    ///
    /// Panics if the stack is empty or the top does not structurally equal
    /// `entry`; either means the cache state is corrupted and processing
    /// must not continue.
    pub fn pop(&mut self, entry: &NameRecord) {
        let top = self
            .records
            .last()
            .expect("history pop on an empty stack");
        assert!(
            top == entry,
            "history pop does not match the stack top (top height {}, entry height {})",
            top.height(),
            entry.height()
        );
        self.records.pop();
    }

    /// Serializes the history.
    ///
    /// # Errors
    ///
    /// Returns an error if any record's fields exceed the encoding limits.
    pub fn encode(&self) -> CoreResult<Vec<u8>> {
        let mut buf = Vec::new();
        buf.extend_from_slice(&(self.records.len() as u32).to_le_bytes());
        for record in &self.records {
            record.encode_into(&mut buf)?;
        }
        Ok(buf)
    }

    /// Deserializes a history, rejecting trailing bytes.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Corrupted`] if the payload is truncated or has
    /// trailing bytes.
    pub fn decode(payload: &[u8]) -> CoreResult<Self> {
        let mut cursor = 0;
        let count = read_u32(payload, &mut cursor)? as usize;
        let mut records = Vec::with_capacity(count.min(1024));
        for _ in 0..count {
            records.push(NameRecord::decode_from(payload, &mut cursor)?);
        }
        if cursor != payload.len() {
            return Err(CoreError::corrupted(format!(
                "trailing bytes in history: expected {} bytes, got {}",
                cursor,
                payload.len()
            )));
        }
        Ok(Self { records })
    }
}
