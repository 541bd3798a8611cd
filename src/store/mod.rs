//! Document store internals.
//!
//! # Architecture
//!
//! - `index`: in-memory vector table keyed by document id
//! - `persist`: documents.json + vectors.bin file I/O
//! - `catalog`: the store proper, tying memory and disk together

pub mod catalog;
pub mod index;
pub mod persist;

pub use catalog::{DocumentStore, StoreError};
pub use index::{IndexError, VectorIndex};
pub use persist::{CatalogPersist, PersistError};
