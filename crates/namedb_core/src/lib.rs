//! # namedb Core
//!
//! Overlay cache and merge iteration for the namedb record registry.
//!
//! This crate is the in-memory layer that sits in front of a persistent
//! sorted record store. While the surrounding node processes one
//! transactional unit (connecting or disconnecting a block), all pending
//! record mutations accumulate in a [`NameCache`]; at the end of the unit
//! the cache is either flushed to a [`namedb_store::WriteBatch`] or merged
//! onto a parent cache.
//!
//! This crate provides:
//! - [`NameRecord`] - the immutable per-record state and its byte codec
//! - [`NameHistory`] - rollback bookkeeping for one identifier
//! - [`NameIterator`] - the ascending-iteration capability
//! - [`NameCache`] - pending inserts/overwrites and deletions, layer
//!   composition, flush, and merge iteration over a base iterator

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod cache;
mod config;
mod error;
mod history;
mod iter;
mod record;
mod types;

pub use cache::{CacheIterator, NameCache};
pub use config::ChainConfig;
pub use error::{CoreError, CoreResult};
pub use history::NameHistory;
pub use iter::{NameIterator, StoreRecordIterator};
pub use record::NameRecord;
pub use types::{OutPoint, Script, Txid, UpdateOp};

pub use namedb_store::NameId;
