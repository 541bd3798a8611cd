//! The document store: authoritative in-memory collection of documents
//! and their embeddings, kept in lockstep with the persisted catalog.
//!
//! Single-writer, many-reader: mutations hold the write lock across both
//! the memory update and the persistence write, so a mutation is atomic
//! end-to-end and readers always observe a consistent snapshot.

use std::path::PathBuf;
use std::sync::RwLock;

use crate::document::Document;
use crate::id::DocId;
use crate::search::{self, QueryError, SearchResult};
use crate::store::index::{IndexError, VectorIndex};
use crate::store::persist::{CatalogPersist, PersistError};

/// Errors that can occur during store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("store is not initialized")]
    NotInitialized,

    #[error("document {0} already exists")]
    DuplicateId(DocId),

    #[error("document {0} not found")]
    NotFound(DocId),

    #[error("Index error: {0}")]
    Index(#[from] IndexError),

    #[error("Query error: {0}")]
    Query(#[from] QueryError),

    #[error("Persistence error: {0}")]
    Persistence(#[from] PersistError),

    #[error("Internal error: {0}")]
    Internal(String),
}

struct StoreState {
    /// Documents in insertion order.
    documents: Vec<Document>,
    index: VectorIndex,
}

/// Owns the canonical document/embedding collections and their durable
/// persistence. `None` until [`DocumentStore::initialize`] runs; every
/// other operation fails with [`StoreError::NotInitialized`] before
/// that.
pub struct DocumentStore {
    dimensions: usize,
    provider_id: [u8; 32],
    persist: CatalogPersist,
    state: RwLock<Option<StoreState>>,
}

impl DocumentStore {
    /// Create a store over `base_dir`. Nothing is read from disk until
    /// `initialize` is called.
    pub fn new(base_dir: PathBuf, dimensions: usize, provider_id: [u8; 32]) -> Self {
        Self {
            dimensions,
            provider_id,
            persist: CatalogPersist::new(base_dir),
            state: RwLock::new(None),
        }
    }

    /// Load the persisted catalog into memory. Idempotent: a second call
    /// on an initialized store is a no-op. A load failure leaves the
    /// store uninitialized rather than partially loaded.
    pub fn initialize(&self) -> Result<(), StoreError> {
        let mut guard = self
            .state
            .write()
            .map_err(|e| StoreError::Internal(format!("Lock poisoned: {}", e)))?;

        if guard.is_some() {
            return Ok(());
        }

        let (documents, index) = self.persist.load(&self.provider_id, self.dimensions)?;
        let state = Self::reconcile(documents, index);

        log::info!("Loaded {} documents from catalog", state.documents.len());
        *guard = Some(state);
        Ok(())
    }

    /// Drop catalog entries that lost their counterpart to a crash
    /// between the two file writes: vectors with no document complete an
    /// interrupted add's rollback, documents with no vector complete an
    /// interrupted removal.
    fn reconcile(documents: Vec<Document>, mut index: VectorIndex) -> StoreState {
        let mut kept = Vec::with_capacity(documents.len());
        for document in documents {
            if index.contains(&document.id) {
                kept.push(document);
            } else {
                log::warn!("Dropping document {} with no embedding", document.id);
            }
        }

        let orphaned: Vec<DocId> = index
            .ids()
            .filter(|id| !kept.iter().any(|d| d.id == **id))
            .cloned()
            .collect();
        for id in orphaned {
            log::warn!("Dropping orphaned embedding for {}", id);
            index.remove(&id);
        }

        StoreState {
            documents: kept,
            index,
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.state
            .read()
            .map(|guard| guard.is_some())
            .unwrap_or(false)
    }

    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    /// Insert a new document/embedding pair and persist it. The pair is
    /// durable once this returns; on persistence failure the in-memory
    /// insertion is rolled back and the error propagates.
    pub fn add(&self, document: Document, embedding: Vec<f32>) -> Result<(), StoreError> {
        let mut guard = self
            .state
            .write()
            .map_err(|e| StoreError::Internal(format!("Lock poisoned: {}", e)))?;
        let state = guard.as_mut().ok_or(StoreError::NotInitialized)?;

        if state.index.contains(&document.id) {
            return Err(StoreError::DuplicateId(document.id));
        }

        state.index.insert(document.id.clone(), embedding)?;
        state.documents.push(document);

        if let Err(err) = self
            .persist
            .save(&state.documents, &state.index, &self.provider_id)
        {
            if let Some(document) = state.documents.pop() {
                state.index.remove(&document.id);
            }
            return Err(err.into());
        }

        Ok(())
    }

    /// Remove a document and its embedding, persisting the removal before
    /// returning. Memory and disk both change or neither does.
    pub fn remove(&self, id: &DocId) -> Result<(), StoreError> {
        let mut guard = self
            .state
            .write()
            .map_err(|e| StoreError::Internal(format!("Lock poisoned: {}", e)))?;
        let state = guard.as_mut().ok_or(StoreError::NotInitialized)?;

        let position = state
            .documents
            .iter()
            .position(|d| &d.id == id)
            .ok_or_else(|| StoreError::NotFound(id.clone()))?;

        let document = state.documents.remove(position);
        let embedding = state.index.remove(id);

        if let Err(err) = self
            .persist
            .save(&state.documents, &state.index, &self.provider_id)
        {
            // roll back, preserving insertion order
            state.documents.insert(position, document);
            if let Some(embedding) = embedding {
                let _ = state.index.insert(id.clone(), embedding);
            }
            return Err(err.into());
        }

        Ok(())
    }

    /// Snapshot of all documents, in insertion order.
    pub fn all(&self) -> Result<Vec<Document>, StoreError> {
        let guard = self
            .state
            .read()
            .map_err(|e| StoreError::Internal(format!("Lock poisoned: {}", e)))?;
        let state = guard.as_ref().ok_or(StoreError::NotInitialized)?;

        Ok(state.documents.clone())
    }

    pub fn count(&self) -> Result<usize, StoreError> {
        let guard = self
            .state
            .read()
            .map_err(|e| StoreError::Internal(format!("Lock poisoned: {}", e)))?;
        let state = guard.as_ref().ok_or(StoreError::NotInitialized)?;

        Ok(state.documents.len())
    }

    /// Rank the corpus against a query vector. Runs under the read lock,
    /// so it sees a consistent snapshot and never blocks other readers.
    pub fn search(
        &self,
        query_vector: &[f32],
        query_text: &str,
        limit: usize,
    ) -> Result<Vec<SearchResult>, StoreError> {
        let guard = self
            .state
            .read()
            .map_err(|e| StoreError::Internal(format!("Lock poisoned: {}", e)))?;
        let state = guard.as_ref().ok_or(StoreError::NotInitialized)?;

        Ok(search::execute(
            &state.documents,
            &state.index,
            query_vector,
            query_text,
            limit,
        )?)
    }
}
