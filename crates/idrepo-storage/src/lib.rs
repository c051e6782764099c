//! # idrepo-storage
//!
//! Storage abstraction layer for the identity repository draft service.
//!
//! Drafts, canonical identity rows and object-store blobs all live in
//! column families of a single key/value store. Multi-row mutations are
//! staged in a [`Batch`] and committed atomically.

#![warn(clippy::all)]

pub mod column_families;
pub mod errors;
pub mod rocksdb_impl;
pub mod traits;

pub use column_families::*;
pub use errors::{Result, StorageError};
pub use rocksdb_impl::RocksDbStorage;
pub use traits::{Batch, BatchExt, Storage};
