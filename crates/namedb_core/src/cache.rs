//! Overlay cache of pending record mutations.

use crate::error::CoreResult;
use crate::iter::NameIterator;
use crate::record::NameRecord;
use namedb_store::{NameId, WriteBatch};
use std::cmp::Ordering;
use std::collections::{btree_map, BTreeMap, BTreeSet};
use tracing::debug;

/// Cache of pending updates to the record registry.
///
/// One cache accumulates the mutations of one transactional unit (for
/// example connecting or disconnecting a block): new or updated records in
/// `entries`, deleted records in `deleted`. The two sets are disjoint at
/// all times; `set` and `remove` each reconcile the other set, so the last
/// point operation for an identifier always wins within a layer.
///
/// At the end of the unit the cache is either flushed with
/// [`write_batch`](Self::write_batch) or absorbed into a parent layer with
/// [`apply`](Self::apply), never both.
///
/// The cache is not internally synchronized; callers serialize access for
/// the duration of the transactional unit.
#[derive(Debug, Clone, Default)]
pub struct NameCache {
    /// New or updated records, ordered by the shared `NameId` ordering.
    entries: BTreeMap<NameId, NameRecord>,
    /// Deleted records.
    deleted: BTreeSet<NameId>,
}

impl NameCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Discards all cached changes.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.deleted.clear();
    }

    /// Checks whether no changes are cached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty() && self.deleted.is_empty()
    }

    /// Looks up a pending record.
    ///
    /// This consults `entries` only: it reports `None` for anything not
    /// explicitly staged in this layer, including identifiers staged for
    /// deletion. A miss here says nothing about the persistent store.
    #[must_use]
    pub fn get(&self, id: &NameId) -> Option<&NameRecord> {
        self.entries.get(id)
    }

    /// Looks up a namespace's pending root record (the record stored under
    /// the namespace paired with itself).
    #[must_use]
    pub fn get_namespace(&self, namespace: &[u8]) -> Option<&NameRecord> {
        self.get(&NameId::namespace_root(namespace))
    }

    /// Reports whether `id` is marked as deleted.
    ///
    /// Always `false` in the current design, regardless of the staged
    /// deletion set: deletions take effect only through merge iteration,
    /// [`apply`](Self::apply), and [`write_batch`](Self::write_batch), not
    /// through direct querying.
    #[must_use]
    pub fn is_deleted(&self, _id: &NameId) -> bool {
        false
    }

    /// Stages an insert or overwrite of `id`.
    ///
    /// Clears any deletion staged for the same identifier: a set always
    /// wins over a prior delete within one layer.
    pub fn set(&mut self, id: NameId, record: NameRecord) {
        self.deleted.remove(&id);
        self.entries.insert(id, record);
    }

    /// Stages a deletion of `id`.
    ///
    /// Clears any entry staged for the same identifier: a delete always
    /// wins over a prior set within one layer.
    pub fn remove(&mut self, id: NameId) {
        self.entries.remove(&id);
        self.deleted.insert(id);
    }

    /// Read access to the staged entries, in the shared ordering.
    #[must_use]
    pub fn pending_entries(&self) -> &BTreeMap<NameId, NameRecord> {
        &self.entries
    }

    /// Read access to the staged deletions.
    #[must_use]
    pub fn pending_deletions(&self) -> &BTreeSet<NameId> {
        &self.deleted
    }

    /// Composes `other` (a layer logically applied after this one) onto
    /// this cache, leaving `other` untouched.
    ///
    /// Deletions are absorbed first, then entries through the same
    /// reconciliation as [`set`](Self::set); when both layers touch an
    /// identifier, `other`'s net effect stands, and entries take precedence
    /// over deletions.
    pub fn apply(&mut self, other: &NameCache) {
        debug!(
            entries = other.entries.len(),
            deletions = other.deleted.len(),
            "applying overlay layer"
        );
        for id in &other.deleted {
            self.entries.remove(id);
            self.deleted.insert(id.clone());
        }
        for (id, record) in &other.entries {
            self.set(id.clone(), record.clone());
        }
    }

    /// Appends all cached changes to a store write batch: one erase per
    /// staged deletion, one put of the serialized record per staged entry.
    ///
    /// Emits no reads; committing the batch is the store's business.
    ///
    /// # Errors
    ///
    /// Returns an error if a record's fields exceed the encoding limits.
    pub fn write_batch(&self, batch: &mut WriteBatch) -> CoreResult<()> {
        debug!(
            puts = self.entries.len(),
            erases = self.deleted.len(),
            "flushing overlay to batch"
        );
        for id in &self.deleted {
            batch.erase(id.clone());
        }
        for (id, record) in &self.entries {
            batch.put(id.clone(), record.encode()?);
        }
        Ok(())
    }

    /// Reconciles a candidate set of names the store associates with expiry
    /// processing at `height` against cached expire-index changes.
    ///
    /// Stable extension point: the cache tracks no expire-index state, so
    /// this is a passthrough that leaves `names` untouched.
    pub fn update_names_for_height(&self, _height: u32, _names: &mut BTreeSet<Vec<u8>>) {}

    /// Returns an iterator that merges `base` with this cache's pending
    /// state into one ascending stream.
    ///
    /// The returned iterator takes exclusive ownership of `base` and
    /// releases it exactly once when dropped.
    pub fn iterate_names<'a>(&'a self, base: Box<dyn NameIterator + 'a>) -> CacheIterator<'a> {
        CacheIterator {
            entry_range: self.entries.range::<NameId, _>(..),
            entry_next: None,
            cache: self,
            base,
            base_next: None,
            primed: false,
        }
    }
}

/// Which source supplies the next merged item.
enum Pick {
    /// Yield the cache entry.
    Entry,
    /// Yield the cache entry; it overrides an equal base record.
    EntryOverride,
    /// Yield (or skip) the base record.
    Base,
}

/// Merge iterator over a base record stream and an overlay cache.
///
/// Yields each identifier at most once, in strictly ascending order:
/// staged entries override equal base records, staged deletions suppress
/// base records, and identifiers present in only one source pass through.
pub struct CacheIterator<'a> {
    cache: &'a NameCache,
    base: Box<dyn NameIterator + 'a>,
    /// One-item lookahead of the base stream; `None` once primed means
    /// the base is exhausted.
    base_next: Option<(NameId, NameRecord)>,
    primed: bool,
    entry_range: btree_map::Range<'a, NameId, NameRecord>,
    entry_next: Option<(&'a NameId, &'a NameRecord)>,
}

impl CacheIterator<'_> {
    fn prime(&mut self) -> CoreResult<()> {
        if !self.primed {
            self.base_next = self.base.next()?;
            self.entry_next = self.entry_range.next();
            self.primed = true;
        }
        Ok(())
    }

    /// Yields the current cache entry and advances the entry cursor.
    fn pop_entry(&mut self) -> Option<(NameId, NameRecord)> {
        let item = self
            .entry_next
            .map(|(id, record)| (id.clone(), record.clone()));
        self.entry_next = self.entry_range.next();
        item
    }

    /// Yields the current base record and advances the lookahead, or
    /// `None` if the record is suppressed by a staged deletion.
    fn pop_base(&mut self) -> CoreResult<Option<(NameId, NameRecord)>> {
        let item = self.base_next.take();
        if item.is_some() {
            self.base_next = self.base.next()?;
        }
        match item {
            Some((id, _)) if self.cache.deleted.contains(&id) => Ok(None),
            other => Ok(other),
        }
    }
}

impl NameIterator for CacheIterator<'_> {
    fn seek(&mut self, id: &NameId) -> CoreResult<()> {
        self.base.seek(id)?;
        self.base_next = self.base.next()?;
        self.entry_range = self.cache.entries.range(id.clone()..);
        self.entry_next = self.entry_range.next();
        self.primed = true;
        Ok(())
    }

    fn next(&mut self) -> CoreResult<Option<(NameId, NameRecord)>> {
        self.prime()?;
        loop {
            let pick = match (&self.base_next, &self.entry_next) {
                (None, None) => return Ok(None),
                (None, Some(_)) => Pick::Entry,
                (Some(_), None) => Pick::Base,
                (Some((base_id, _)), Some((entry_id, _))) => match (*entry_id).cmp(base_id) {
                    Ordering::Equal => Pick::EntryOverride,
                    Ordering::Less => Pick::Entry,
                    Ordering::Greater => Pick::Base,
                },
            };

            match pick {
                // Entries never hold pending deletions, so no filtering.
                Pick::Entry => return Ok(self.pop_entry()),
                Pick::EntryOverride => {
                    // The equal base record is overridden; discard it.
                    self.base_next = self.base.next()?;
                    return Ok(self.pop_entry());
                }
                Pick::Base => {
                    if let Some(item) = self.pop_base()? {
                        return Ok(Some(item));
                    }
                    // Suppressed by a staged deletion; keep scanning.
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{OutPoint, Txid};
    use proptest::prelude::*;

    fn record(tag: u8, height: u32) -> NameRecord {
        NameRecord::new(
            vec![tag],
            height,
            OutPoint::new(Txid::new([tag; 32]), 0),
            b"addr".to_vec(),
        )
    }

    fn id(key: &str) -> NameId {
        NameId::new("ns", key)
    }

    /// Base iterator over a fixed ascending list, for merge tests.
    struct FixedIterator {
        items: Vec<(NameId, NameRecord)>,
        pos: usize,
    }

    impl FixedIterator {
        fn new(items: Vec<(NameId, NameRecord)>) -> Self {
            Self { items, pos: 0 }
        }
    }

    impl NameIterator for FixedIterator {
        fn seek(&mut self, id: &NameId) -> CoreResult<()> {
            self.pos = self.items.partition_point(|(item_id, _)| item_id < id);
            Ok(())
        }

        fn next(&mut self) -> CoreResult<Option<(NameId, NameRecord)>> {
            let item = self.items.get(self.pos).cloned();
            if item.is_some() {
                self.pos += 1;
            }
            Ok(item)
        }
    }

    fn drain(mut iter: CacheIterator<'_>) -> Vec<(NameId, NameRecord)> {
        let mut out = Vec::new();
        while let Some(item) = iter.next().unwrap() {
            out.push(item);
        }
        out
    }

    #[test]
    fn set_then_get_returns_record() {
        let mut cache = NameCache::new();
        cache.set(id("a"), record(1, 10));
        assert_eq!(cache.get(&id("a")), Some(&record(1, 10)));
    }

    #[test]
    fn remove_then_get_returns_none() {
        let mut cache = NameCache::new();
        cache.remove(id("a"));
        assert_eq!(cache.get(&id("a")), None);
        assert!(cache.pending_deletions().contains(&id("a")));
    }

    #[test]
    fn set_then_remove_leaves_only_deletion() {
        let mut cache = NameCache::new();
        cache.set(id("a"), record(1, 10));
        cache.remove(id("a"));

        assert!(!cache.pending_entries().contains_key(&id("a")));
        assert!(cache.pending_deletions().contains(&id("a")));
    }

    #[test]
    fn remove_then_set_leaves_only_entry() {
        let mut cache = NameCache::new();
        cache.remove(id("a"));
        cache.set(id("a"), record(1, 10));

        assert_eq!(cache.get(&id("a")), Some(&record(1, 10)));
        assert!(!cache.pending_deletions().contains(&id("a")));
    }

    #[test]
    fn get_namespace_uses_the_root_identifier() {
        let mut cache = NameCache::new();
        cache.set(NameId::namespace_root("wiki"), record(7, 3));
        assert_eq!(cache.get_namespace(b"wiki"), Some(&record(7, 3)));
        assert_eq!(cache.get_namespace(b"other"), None);
    }

    /// Deliberate contract: a staged deletion is not reported here.
    /// Deletions act only through merge iteration, `apply`, and
    /// `write_batch`.
    #[test]
    fn is_deleted_stays_false_for_staged_deletions() {
        let mut cache = NameCache::new();
        cache.remove(id("a"));
        assert!(cache.pending_deletions().contains(&id("a")));
        assert!(!cache.is_deleted(&id("a")));
    }

    #[test]
    fn clear_discards_all_staged_changes() {
        let mut cache = NameCache::new();
        cache.set(id("a"), record(1, 10));
        cache.remove(id("b"));
        assert!(!cache.is_empty());

        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn merge_overrides_suppresses_and_interleaves() {
        // Base yields a, b, d; the cache deletes a, overrides b, and adds
        // c, which sorts strictly between b and d.
        let base = FixedIterator::new(vec![
            (id("a"), record(1, 1)),
            (id("b"), record(2, 1)),
            (id("d"), record(3, 1)),
        ]);

        let mut cache = NameCache::new();
        cache.set(id("b"), record(20, 2));
        cache.set(id("c"), record(30, 2));
        cache.remove(id("a"));

        let got = drain(cache.iterate_names(Box::new(base)));
        assert_eq!(
            got,
            vec![
                (id("b"), record(20, 2)),
                (id("c"), record(30, 2)),
                (id("d"), record(3, 1)),
            ]
        );
    }

    #[test]
    fn merge_with_exhausted_base_drains_entries() {
        let mut cache = NameCache::new();
        cache.set(id("a"), record(1, 1));
        cache.set(id("b"), record(2, 1));

        let got = drain(cache.iterate_names(Box::new(FixedIterator::new(Vec::new()))));
        assert_eq!(got, vec![(id("a"), record(1, 1)), (id("b"), record(2, 1))]);
    }

    #[test]
    fn merge_with_empty_cache_passes_base_through() {
        let base = FixedIterator::new(vec![(id("a"), record(1, 1)), (id("b"), record(2, 1))]);
        let cache = NameCache::new();

        let got = drain(cache.iterate_names(Box::new(base)));
        assert_eq!(got, vec![(id("a"), record(1, 1)), (id("b"), record(2, 1))]);
    }

    #[test]
    fn merge_yields_strictly_ascending_ids() {
        let base = FixedIterator::new(vec![
            (id("a"), record(1, 1)),
            (id("c"), record(3, 1)),
            (NameId::new("ns", "abc"), record(4, 1)),
        ]);

        let mut cache = NameCache::new();
        cache.set(id("b"), record(2, 2));
        cache.set(NameId::new("ns", "abc"), record(5, 2));
        cache.remove(id("c"));

        let got = drain(cache.iterate_names(Box::new(base)));
        for window in got.windows(2) {
            assert!(window[0].0 < window[1].0);
        }
        assert!(!got.iter().any(|(item_id, _)| *item_id == id("c")));
    }

    #[test]
    fn merge_seek_repositions_both_sources() {
        let base = FixedIterator::new(vec![
            (id("a"), record(1, 1)),
            (id("b"), record(2, 1)),
            (id("d"), record(4, 1)),
        ]);

        let mut cache = NameCache::new();
        cache.set(id("c"), record(3, 2));
        cache.remove(id("b"));

        let mut iter = cache.iterate_names(Box::new(base));
        iter.seek(&id("b")).unwrap();

        let mut got = Vec::new();
        while let Some(item) = iter.next().unwrap() {
            got.push(item);
        }
        assert_eq!(got, vec![(id("c"), record(3, 2)), (id("d"), record(4, 1))]);
    }

    #[test]
    fn apply_deletion_drops_parent_entry() {
        let mut parent = NameCache::new();
        parent.set(id("a"), record(1, 1));

        let mut child = NameCache::new();
        child.remove(id("a"));

        parent.apply(&child);
        assert_eq!(parent.get(&id("a")), None);
        assert!(parent.pending_deletions().contains(&id("a")));
    }

    #[test]
    fn apply_entry_clears_parent_deletion() {
        let mut parent = NameCache::new();
        parent.remove(id("a"));

        let mut child = NameCache::new();
        child.set(id("a"), record(2, 2));

        parent.apply(&child);
        assert_eq!(parent.get(&id("a")), Some(&record(2, 2)));
        assert!(!parent.pending_deletions().contains(&id("a")));
    }

    #[test]
    fn apply_in_sequence_matches_last_layer_wins() {
        let mut a = NameCache::new();
        a.set(id("keep"), record(1, 1));

        let mut b = NameCache::new();
        b.set(id("both"), record(2, 2));
        b.remove(id("only-b"));

        let mut c = NameCache::new();
        c.remove(id("both"));
        c.set(id("only-c"), record(3, 3));

        a.apply(&b);
        a.apply(&c);

        // Identifier touched by both B and C: C dictates the state.
        assert_eq!(a.get(&id("both")), None);
        assert!(a.pending_deletions().contains(&id("both")));
        // Touched by only one layer: that layer's state.
        assert!(a.pending_deletions().contains(&id("only-b")));
        assert_eq!(a.get(&id("only-c")), Some(&record(3, 3)));
        // Untouched parent state survives.
        assert_eq!(a.get(&id("keep")), Some(&record(1, 1)));
    }

    #[test]
    fn apply_leaves_the_donor_layer_untouched() {
        let mut parent = NameCache::new();
        let mut child = NameCache::new();
        child.set(id("a"), record(1, 1));
        child.remove(id("b"));

        parent.apply(&child);
        assert_eq!(child.get(&id("a")), Some(&record(1, 1)));
        assert!(child.pending_deletions().contains(&id("b")));
    }

    #[test]
    fn write_batch_stages_erases_and_puts() {
        let mut cache = NameCache::new();
        cache.set(id("a"), record(1, 1));
        cache.remove(id("b"));

        let mut batch = WriteBatch::new();
        cache.write_batch(&mut batch).unwrap();

        assert_eq!(batch.len(), 2);
        let ops = batch.into_ops();
        assert!(ops.iter().any(|op| matches!(
            op,
            namedb_store::BatchOp::Erase { id: erased } if *erased == id("b")
        )));
        assert!(ops.iter().any(|op| matches!(
            op,
            namedb_store::BatchOp::Put { id: put, value }
                if *put == id("a") && *value == record(1, 1).encode().unwrap()
        )));
    }

    #[test]
    fn update_names_for_height_is_a_passthrough() {
        let mut cache = NameCache::new();
        cache.set(id("a"), record(1, 1));
        cache.remove(id("b"));

        let mut names: BTreeSet<Vec<u8>> = [b"one".to_vec(), b"two".to_vec()].into();
        let before = names.clone();
        cache.update_names_for_height(100, &mut names);
        assert_eq!(names, before);
    }

    proptest! {
        /// Invariant: `entries` and `deleted` never share an identifier,
        /// whatever the sequence of point operations.
        #[test]
        fn entries_and_deletions_stay_disjoint(
            ops in prop::collection::vec(
                (prop::collection::vec(any::<u8>(), 0..4), any::<bool>()),
                0..64,
            )
        ) {
            let mut cache = NameCache::new();
            for (key, is_set) in ops {
                let op_id = NameId::new("ns", key);
                if is_set {
                    cache.set(op_id, record(0, 0));
                } else {
                    cache.remove(op_id);
                }
            }
            for entry_id in cache.pending_entries().keys() {
                prop_assert!(!cache.pending_deletions().contains(entry_id));
            }
        }
    }
}
