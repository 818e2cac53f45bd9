//! The persisted FAQ vector store.
//!
//! # Architecture
//!
//! - `index`: In-memory vector index with cosine-distance search
//! - `persist`: Binary file I/O for the faqs.bin collection
//! - `collection`: High-level store facade (open/create/rebuild/query)

mod collection;
mod index;
mod persist;

pub use collection::{FaqStore, StoreError};
pub use index::{FaqIndex, IndexError, IndexedEntry, ScoredEntry};
pub use persist::{CollectionFile, PersistError};

/// Subdirectory of the data dir holding persisted collections
pub const COLLECTION_DIR: &str = "vector_db";

/// File name of the FAQ collection
pub const COLLECTION_FILE: &str = "faqs.bin";
