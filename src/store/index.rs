//! In-memory vector index over FAQ entries.
//!
//! Keyed by FAQ id, so the no-duplicate invariant is structural. Scoring
//! is cosine distance (1 - cosine similarity): lower means more similar,
//! 0.0 is an exact directional match, 2.0 is diametrically opposed.

use std::collections::HashMap;

/// One indexed FAQ: the source record plus the embedding of its question.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexedEntry {
    pub id: i64,
    pub question: String,
    pub answer: String,
    pub embedding: Vec<f32>,
}

/// A nearest-neighbor hit: the matched entry and its cosine distance
/// from the query.
#[derive(Debug, Clone)]
pub struct ScoredEntry {
    pub entry: IndexedEntry,
    pub distance: f32,
}

/// In-memory index over all FAQ entries.
///
/// Dimensionality is fixed by the first inserted entry; every later
/// insert and every query must match it.
pub struct FaqIndex {
    entries: HashMap<i64, IndexedEntry>,
    dimensions: Option<usize>,
}

impl FaqIndex {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
            dimensions: None,
        }
    }

    /// Embedding dimensionality, once known. Empty index has none.
    pub fn dimensions(&self) -> Option<usize> {
        self.dimensions
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[allow(dead_code)]
    pub fn get(&self, id: i64) -> Option<&IndexedEntry> {
        self.entries.get(&id)
    }

    /// Iterate over all entries, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = &IndexedEntry> {
        self.entries.values()
    }

    /// Insert or replace an entry.
    ///
    /// Rejects vectors whose length differs from the index dimensionality
    /// and vectors whose norm is zero or non-finite; neither has a usable
    /// direction to compare.
    pub fn insert(&mut self, entry: IndexedEntry) -> Result<(), IndexError> {
        if let Some(expected) = self.dimensions {
            if entry.embedding.len() != expected {
                return Err(IndexError::DimensionMismatch {
                    expected,
                    got: entry.embedding.len(),
                });
            }
        }

        let norm = l2_norm(&entry.embedding);
        if !norm.is_finite() {
            return Err(IndexError::NonFiniteVector);
        }
        if norm < f32::EPSILON {
            return Err(IndexError::ZeroNormVector);
        }

        self.dimensions = Some(entry.embedding.len());
        self.entries.insert(entry.id, entry);
        Ok(())
    }

    /// Bulk load entries, as when reading a persisted collection.
    pub fn bulk_load(&mut self, entries: Vec<IndexedEntry>) -> Result<(), IndexError> {
        for entry in entries {
            self.insert(entry)?;
        }
        Ok(())
    }

    /// Return the `k` entries nearest to `query`, closest first.
    ///
    /// An empty index yields an empty vec. A query of the wrong
    /// dimensionality or with a zero or non-finite norm is an error.
    pub fn nearest(&self, query: &[f32], k: usize) -> Result<Vec<ScoredEntry>, IndexError> {
        if self.entries.is_empty() || k == 0 {
            return Ok(vec![]);
        }

        if let Some(expected) = self.dimensions {
            if query.len() != expected {
                return Err(IndexError::DimensionMismatch {
                    expected,
                    got: query.len(),
                });
            }
        }

        let query_norm = l2_norm(query);
        if !query_norm.is_finite() {
            return Err(IndexError::NonFiniteVector);
        }
        if query_norm < f32::EPSILON {
            return Err(IndexError::ZeroNormVector);
        }

        let mut results: Vec<ScoredEntry> = self
            .entries
            .values()
            .map(|entry| ScoredEntry {
                entry: entry.clone(),
                distance: cosine_distance(query, query_norm, &entry.embedding),
            })
            .collect();

        results.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        results.truncate(k);

        Ok(results)
    }
}

impl Default for FaqIndex {
    fn default() -> Self {
        Self::new()
    }
}

fn l2_norm(v: &[f32]) -> f32 {
    v.iter().map(|x| x * x).sum::<f32>().sqrt()
}

/// Cosine distance with a precomputed query norm. Stored vectors always
/// have a positive finite norm (insert rejects the rest), so the
/// division is safe.
/// Clamped at zero: f32 rounding can push 1 - cos slightly negative.
fn cosine_distance(query: &[f32], query_norm: f32, target: &[f32]) -> f32 {
    let target_norm = l2_norm(target);
    let dot: f32 = query.iter().zip(target.iter()).map(|(a, b)| a * b).sum();
    (1.0 - dot / (query_norm * target_norm)).max(0.0)
}

#[derive(Debug, thiserror::Error)]
pub enum IndexError {
    #[error("Dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    #[error("Cannot store or search with zero-norm vector")]
    ZeroNormVector,

    #[error("Cannot store or search with non-finite vector")]
    NonFiniteVector,
}
