//! In-memory vector table keyed by document id.
//!
//! Owns the embedding side of the catalog; scoring lives in
//! [`crate::search`].

use std::collections::HashMap;

use crate::id::DocId;

/// Errors that can occur during index operations.
#[derive(Debug, thiserror::Error)]
pub enum IndexError {
    #[error("Dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },
}

/// Embedding vectors for every live document, fixed to one dimension.
///
/// Zero-magnitude vectors are accepted: they score 0.0 against every
/// query and never pass the relevance threshold.
pub struct VectorIndex {
    entries: HashMap<DocId, Vec<f32>>,
    dimensions: usize,
}

impl VectorIndex {
    pub fn new(dimensions: usize) -> Self {
        Self {
            entries: HashMap::new(),
            dimensions,
        }
    }

    pub fn with_capacity(dimensions: usize, capacity: usize) -> Self {
        Self {
            entries: HashMap::with_capacity(capacity),
            dimensions,
        }
    }

    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Insert or replace the vector for `id`.
    pub fn insert(&mut self, id: DocId, embedding: Vec<f32>) -> Result<(), IndexError> {
        if embedding.len() != self.dimensions {
            return Err(IndexError::DimensionMismatch {
                expected: self.dimensions,
                got: embedding.len(),
            });
        }

        self.entries.insert(id, embedding);
        Ok(())
    }

    pub fn remove(&mut self, id: &DocId) -> Option<Vec<f32>> {
        self.entries.remove(id)
    }

    pub fn get(&self, id: &DocId) -> Option<&[f32]> {
        self.entries.get(id).map(|v| v.as_slice())
    }

    pub fn contains(&self, id: &DocId) -> bool {
        self.entries.contains_key(id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &DocId> {
        self.entries.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&DocId, &[f32])> {
        self.entries.iter().map(|(k, v)| (k, v.as_slice()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(s: &str) -> DocId {
        DocId::from(s)
    }

    #[test]
    fn test_new_index() {
        let index = VectorIndex::new(384);
        assert_eq!(index.dimensions(), 384);
        assert!(index.is_empty());
        assert_eq!(index.len(), 0);
    }

    #[test]
    fn test_insert_and_get() {
        let mut index = VectorIndex::new(3);
        let embedding = vec![1.0, 0.0, 0.0];

        index.insert(id("a"), embedding.clone()).unwrap();

        assert_eq!(index.len(), 1);
        assert!(index.contains(&id("a")));
        assert_eq!(index.get(&id("a")), Some(embedding.as_slice()));
    }

    #[test]
    fn test_insert_dimension_mismatch() {
        let mut index = VectorIndex::new(3);
        let wrong_dims = vec![1.0, 0.0, 0.0, 0.0];

        let result = index.insert(id("a"), wrong_dims);
        assert!(matches!(result, Err(IndexError::DimensionMismatch { .. })));
        assert!(index.is_empty());
    }

    #[test]
    fn test_zero_vector_is_accepted() {
        let mut index = VectorIndex::new(3);
        index.insert(id("a"), vec![0.0, 0.0, 0.0]).unwrap();
        assert!(index.contains(&id("a")));
    }

    #[test]
    fn test_remove() {
        let mut index = VectorIndex::new(3);
        index.insert(id("a"), vec![1.0, 0.0, 0.0]).unwrap();

        let removed = index.remove(&id("a"));
        assert_eq!(removed, Some(vec![1.0, 0.0, 0.0]));
        assert!(!index.contains(&id("a")));
        assert!(index.is_empty());

        assert!(index.remove(&id("a")).is_none());
    }

    #[test]
    fn test_insert_replaces_existing() {
        let mut index = VectorIndex::new(3);
        index.insert(id("a"), vec![1.0, 0.0, 0.0]).unwrap();
        index.insert(id("a"), vec![0.0, 1.0, 0.0]).unwrap();

        assert_eq!(index.len(), 1);
        assert_eq!(index.get(&id("a")), Some([0.0, 1.0, 0.0].as_slice()));
    }

    #[test]
    fn test_ids_iterator() {
        let mut index = VectorIndex::new(3);
        index.insert(id("a"), vec![1.0, 0.0, 0.0]).unwrap();
        index.insert(id("b"), vec![0.0, 1.0, 0.0]).unwrap();

        let ids: Vec<&DocId> = index.ids().collect();
        assert_eq!(ids.len(), 2);
        assert!(ids.contains(&&id("a")));
        assert!(ids.contains(&&id("b")));
    }
}
