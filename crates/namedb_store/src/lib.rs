//! # namedb Store
//!
//! Sorted key-value store contract for namedb.
//!
//! This crate provides the lowest-level storage abstraction for the
//! namespaced record registry. Stores hold records keyed by [`NameId`]
//! (a namespace/key pair) in a single well-defined ascending order, and
//! apply staged mutations atomically via a [`WriteBatch`].
//!
//! ## Design Principles
//!
//! - Record values are **opaque bytes**; the core crate owns all record
//!   format interpretation.
//! - Keys are typed as [`NameId`] so that physical store order and the
//!   order used elsewhere in the system come from one `Ord` implementation
//!   rather than two comparators that happen to agree.
//! - Iteration is ascending only, via [`StoreCursor`].
//!
//! ## Available Stores
//!
//! - [`MemoryStore`] - For testing and ephemeral registries.
//!
//! ## Example
//!
//! ```rust
//! use namedb_store::{MemoryStore, NameId, SortedStore, WriteBatch};
//!
//! let mut store = MemoryStore::new();
//! let mut batch = WriteBatch::new();
//! batch.put(NameId::new("ns", "key"), b"record bytes".to_vec());
//! store.commit(batch).unwrap();
//! assert_eq!(store.get(&NameId::new("ns", "key")).unwrap().unwrap(), b"record bytes");
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod batch;
mod error;
mod key;
mod memory;
mod store;

pub use batch::{BatchOp, WriteBatch};
pub use error::{StoreError, StoreResult};
pub use key::NameId;
pub use memory::MemoryStore;
pub use store::{SortedStore, StoreCursor};
