//! Record identifiers and their ordering.

use std::cmp::Ordering;
use std::fmt;

/// Identifier of one record: a (namespace, key) pair.
///
/// Identifiers carry the single ordering relation the whole system agrees
/// on: shorter pairs (by total byte length of namespace plus key) sort
/// first, ties broken by lexicographic comparison of the (namespace, key)
/// tuple. The store's physical map and the overlay cache's pending-entry
/// map both sort by this `Ord`, so merge iteration can rely on the two
/// sources agreeing on order.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NameId {
    namespace: Vec<u8>,
    key: Vec<u8>,
}

impl NameId {
    /// Creates an identifier from a namespace and a key.
    pub fn new(namespace: impl Into<Vec<u8>>, key: impl Into<Vec<u8>>) -> Self {
        Self {
            namespace: namespace.into(),
            key: key.into(),
        }
    }

    /// Creates the self-referential identifier under which a namespace's
    /// own root record is stored (the namespace paired with itself).
    pub fn namespace_root(namespace: impl Into<Vec<u8>>) -> Self {
        let namespace = namespace.into();
        Self {
            key: namespace.clone(),
            namespace,
        }
    }

    /// Returns the namespace bytes.
    #[must_use]
    pub fn namespace(&self) -> &[u8] {
        &self.namespace
    }

    /// Returns the key bytes.
    #[must_use]
    pub fn key(&self) -> &[u8] {
        &self.key
    }

    /// Returns the total byte length of namespace plus key.
    ///
    /// This is the primary sort criterion.
    #[must_use]
    pub fn total_len(&self) -> usize {
        self.namespace.len() + self.key.len()
    }
}

impl Ord for NameId {
    fn cmp(&self, other: &Self) -> Ordering {
        self.total_len()
            .cmp(&other.total_len())
            .then_with(|| self.namespace.cmp(&other.namespace))
            .then_with(|| self.key.cmp(&other.key))
    }
}

impl PartialOrd for NameId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for NameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}",
            String::from_utf8_lossy(&self.namespace),
            String::from_utf8_lossy(&self.key)
        )
    }
}
