//! The persisted FAQ collection.
//!
//! `FaqStore` owns the on-disk collection file and the in-memory index:
//! - `open` loads an existing collection for answering questions
//! - `create` starts an empty one for a rebuild
//! - queries share a read lock; a rebuild holds the write lock for its
//!   whole duration, so readers never observe a half-built collection

use std::path::Path;
use std::sync::RwLock;

use crate::faq::FaqRecord;
use crate::openai::{Embedder, ServiceError};
use crate::store::{
    CollectionFile, FaqIndex, IndexError, IndexedEntry, PersistError, ScoredEntry,
    COLLECTION_DIR, COLLECTION_FILE,
};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Embedding error: {0}")]
    Embedding(#[from] ServiceError),

    #[error("Index error: {0}")]
    Index(#[from] IndexError),

    #[error("Storage error: {0}")]
    Persist(#[from] PersistError),

    #[error("{0}; run `faqbot rebuild` to re-create the collection")]
    RebuildRequired(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub struct FaqStore {
    file: CollectionFile,
    fingerprint: [u8; 32],
    index: RwLock<FaqIndex>,
}

impl FaqStore {
    /// Open the collection under `data_dir` for answering questions.
    ///
    /// A missing file is an empty collection. A file written by a
    /// different embedding model, an unsupported format version, or a
    /// failed checksum is an error; those states need an explicit
    /// rebuild, not a silent empty store.
    pub fn open(data_dir: &Path, fingerprint: [u8; 32]) -> Result<Self, StoreError> {
        let file = CollectionFile::new(data_dir.join(COLLECTION_DIR).join(COLLECTION_FILE));

        let index = if file.exists() {
            match file.load(&fingerprint) {
                Ok(index) => {
                    log::info!(
                        "Loaded {} faqs from {}",
                        index.len(),
                        file.path().display()
                    );
                    index
                }
                Err(PersistError::ModelMismatch) => {
                    return Err(StoreError::RebuildRequired(
                        "collection was built with a different embedding model".to_string(),
                    ));
                }
                Err(PersistError::VersionMismatch(file_version, supported)) => {
                    return Err(StoreError::RebuildRequired(format!(
                        "collection uses format version {file_version}, supported version is {supported}"
                    )));
                }
                Err(PersistError::ChecksumMismatch) => {
                    return Err(StoreError::RebuildRequired(
                        "collection file is corrupted".to_string(),
                    ));
                }
                Err(err) => return Err(err.into()),
            }
        } else {
            log::info!("No collection at {}, starting empty", file.path().display());
            FaqIndex::new()
        };

        Ok(Self {
            file,
            fingerprint,
            index: RwLock::new(index),
        })
    }

    /// Open the collection under `data_dir` as a rebuild target.
    ///
    /// Never reads the existing file; whatever is there will be replaced.
    pub fn create(data_dir: &Path, fingerprint: [u8; 32]) -> Result<Self, StoreError> {
        let path = data_dir.join(COLLECTION_DIR).join(COLLECTION_FILE);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(PersistError::Io)?;
        }

        Ok(Self {
            file: CollectionFile::new(path),
            fingerprint,
            index: RwLock::new(FaqIndex::new()),
        })
    }

    /// Replace the whole collection with freshly embedded `records`.
    ///
    /// Embeds every record's question, persists atomically, then swaps
    /// the in-memory index. On any error the previous in-memory index
    /// stays in place. Returns the number of entries written.
    pub fn rebuild(
        &self,
        records: &[FaqRecord],
        embedder: &dyn Embedder,
    ) -> Result<usize, StoreError> {
        let mut guard = self
            .index
            .write()
            .map_err(|e| StoreError::Internal(format!("Lock poisoned: {e}")))?;

        // Clearing is best-effort; the save below replaces the file anyway
        if let Err(err) = self.file.delete() {
            log::warn!("Failed to clear existing collection: {err}");
        }

        let mut index = FaqIndex::new();
        for record in records {
            let embedding = embedder.embed(&record.question)?;
            index.insert(IndexedEntry {
                id: record.id,
                question: record.question.clone(),
                answer: record.answer.clone(),
                embedding,
            })?;
        }

        self.file.save(&index, &self.fingerprint)?;

        let count = index.len();
        *guard = index;

        log::info!(
            "Rebuilt collection at {} with {} faqs",
            self.file.path().display(),
            count
        );
        Ok(count)
    }

    /// Return the `k` entries nearest to `embedding`, closest first.
    pub fn query(&self, embedding: &[f32], k: usize) -> Result<Vec<ScoredEntry>, StoreError> {
        let guard = self
            .index
            .read()
            .map_err(|e| StoreError::Internal(format!("Lock poisoned: {e}")))?;

        Ok(guard.nearest(embedding, k)?)
    }

    /// Number of indexed entries.
    pub fn len(&self) -> usize {
        self.index.read().map(|guard| guard.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.index.read().map(|guard| guard.is_empty()).unwrap_or(true)
    }
}
