//! Knowledge facade: the surface callers use.
//!
//! Sequences embedding generation with store mutation so a document can
//! never exist without a matching embedding, and exposes the retrieval
//! operations (search, list, count, tag lookup).

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use crate::document::{Document, DocumentType};
use crate::embeddings::{EmbeddingError, EmbeddingProvider};
use crate::id::DocId;
use crate::search::SearchResult;
use crate::store::catalog::{DocumentStore, StoreError};

/// Errors surfaced by the facade.
#[derive(Debug, thiserror::Error)]
pub enum KnowledgeError {
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Embedding error: {0}")]
    Embedding(#[from] EmbeddingError),
}

/// One owned instance per process, handed explicitly to collaborators.
/// The store serializes writers internally; the facade itself keeps no
/// mutable state.
pub struct KnowledgeBase {
    provider: Arc<dyn EmbeddingProvider>,
    store: DocumentStore,
}

impl KnowledgeBase {
    /// Create a knowledge base persisting under `base_dir`, with vectors
    /// produced by `provider`. The store dimension is fixed to the
    /// provider's for the lifetime of the catalog.
    pub fn new(provider: Arc<dyn EmbeddingProvider>, base_dir: PathBuf) -> Self {
        let store = DocumentStore::new(base_dir, provider.dimensions(), provider.id_hash());
        Self { provider, store }
    }

    /// Load the persisted catalog. Must complete before any other
    /// operation; idempotent once it has.
    pub fn initialize(&self) -> Result<(), KnowledgeError> {
        self.store.initialize()?;
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.store.is_initialized()
    }

    /// Ingest a document: embed the content, then add the pair to the
    /// store. A returned id guarantees the pair is live and persisted.
    /// If embedding fails nothing is stored.
    pub fn add_document(
        &self,
        title: &str,
        content: &str,
        doc_type: DocumentType,
        tags: Vec<String>,
        metadata: HashMap<String, String>,
    ) -> Result<DocId, KnowledgeError> {
        let embedding = self.provider.embed(content)?;

        let document = Document::new(title, content, doc_type, tags, metadata);
        let id = document.id.clone();

        self.store.add(document, embedding)?;

        log::debug!("Added document {} ({})", id, doc_type);
        Ok(id)
    }

    /// Sugar over [`Self::add_document`] for free-form notes.
    pub fn add_note(
        &self,
        title: &str,
        content: &str,
        tags: Vec<String>,
    ) -> Result<DocId, KnowledgeError> {
        self.add_document(title, content, DocumentType::Note, tags, HashMap::new())
    }

    /// Sugar over [`Self::add_document`] for code snippets; the language
    /// lands in metadata.
    pub fn add_code_snippet(
        &self,
        title: &str,
        code: &str,
        language: &str,
        tags: Vec<String>,
    ) -> Result<DocId, KnowledgeError> {
        let mut metadata = HashMap::new();
        metadata.insert("language".to_string(), language.to_string());
        self.add_document(title, code, DocumentType::Code, tags, metadata)
    }

    /// Embed the query and rank the corpus against it.
    pub fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchResult>, KnowledgeError> {
        let query_vector = self.provider.embed(query)?;
        Ok(self.store.search(&query_vector, query, limit)?)
    }

    /// Remove a document and its embedding; durable before returning.
    pub fn remove_document(&self, id: &DocId) -> Result<(), KnowledgeError> {
        self.store.remove(id)?;
        log::debug!("Removed document {}", id);
        Ok(())
    }

    /// Snapshot of all documents in insertion order.
    pub fn list_documents(&self) -> Result<Vec<Document>, KnowledgeError> {
        Ok(self.store.all()?)
    }

    pub fn count(&self) -> Result<usize, KnowledgeError> {
        Ok(self.store.count()?)
    }

    /// Documents carrying `tag` exactly. Independent of similarity
    /// search.
    pub fn documents_with_tag(&self, tag: &str) -> Result<Vec<Document>, KnowledgeError> {
        Ok(self
            .store
            .all()?
            .into_iter()
            .filter(|d| d.has_tag(tag))
            .collect())
    }
}
