//! Integration tests for catalog durability: everything a process
//! restart (a fresh store over the same directory) must preserve.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use crate::document::{Document, DocumentType};
use crate::embeddings::HashingProvider;
use crate::id::DocId;
use crate::knowledge::KnowledgeBase;
use crate::store::catalog::{DocumentStore, StoreError};
use crate::store::index::VectorIndex;
use crate::store::persist::{CatalogPersist, PersistError};

fn provider_id() -> [u8; 32] {
    [3u8; 32]
}

fn doc(title: &str) -> Document {
    Document::new(title, "content", DocumentType::Text, vec![], HashMap::new())
}

fn ready_store(dir: &Path) -> DocumentStore {
    let store = DocumentStore::new(dir.to_path_buf(), 3, provider_id());
    store.initialize().unwrap();
    store
}

#[test]
fn test_restart_preserves_documents_and_vectors() {
    let dir = tempfile::tempdir().unwrap();

    let a = doc("first");
    let b = doc("second");
    let c = doc("third");

    {
        let store = ready_store(dir.path());
        store.add(a.clone(), vec![1.0, 0.0, 0.0]).unwrap();
        store.add(b.clone(), vec![0.0, 1.0, 0.0]).unwrap();
        store.add(c.clone(), vec![0.0, 0.0, 1.0]).unwrap();
    }

    let store = ready_store(dir.path());
    assert_eq!(store.count().unwrap(), 3);

    let ids: Vec<DocId> = store.all().unwrap().into_iter().map(|d| d.id).collect();
    assert_eq!(ids, vec![a.id.clone(), b.id.clone(), c.id]);

    // embeddings survived too: b's own vector finds b first
    let results = store.search(&[0.0, 1.0, 0.0], "", 10).unwrap();
    assert_eq!(results[0].document.id, b.id);
    assert!((results[0].score - 1.0).abs() < 1e-6);
}

#[test]
fn test_restart_preserves_removal() {
    let dir = tempfile::tempdir().unwrap();

    let a = doc("kept");
    let b = doc("removed");

    {
        let store = ready_store(dir.path());
        store.add(a.clone(), vec![1.0, 0.0, 0.0]).unwrap();
        store.add(b.clone(), vec![0.0, 1.0, 0.0]).unwrap();
        store.remove(&b.id).unwrap();
    }

    let store = ready_store(dir.path());
    assert_eq!(store.count().unwrap(), 1);
    assert_eq!(store.all().unwrap()[0].id, a.id);

    let results = store.search(&[0.0, 1.0, 0.0], "", 10).unwrap();
    assert!(results.is_empty());
}

#[test]
fn test_empty_directory_initializes_empty() {
    let dir = tempfile::tempdir().unwrap();
    let store = ready_store(dir.path());
    assert_eq!(store.count().unwrap(), 0);
    assert!(store.all().unwrap().is_empty());
}

#[test]
fn test_corrupted_vectors_fail_initialize() {
    let dir = tempfile::tempdir().unwrap();

    {
        let store = ready_store(dir.path());
        store.add(doc("a"), vec![1.0, 0.0, 0.0]).unwrap();
    }

    // flip a byte inside the header
    let path = dir.path().join("vectors.bin");
    let mut bytes = std::fs::read(&path).unwrap();
    bytes[10] ^= 0xFF;
    std::fs::write(&path, &bytes).unwrap();

    let store = DocumentStore::new(dir.path().to_path_buf(), 3, provider_id());
    let result = store.initialize();
    assert!(matches!(
        result,
        Err(StoreError::Persistence(PersistError::ChecksumMismatch))
    ));
    assert!(!store.is_initialized());
}

#[test]
fn test_different_provider_fails_initialize() {
    let dir = tempfile::tempdir().unwrap();

    {
        let store = ready_store(dir.path());
        store.add(doc("a"), vec![1.0, 0.0, 0.0]).unwrap();
    }

    let store = DocumentStore::new(dir.path().to_path_buf(), 3, [9u8; 32]);
    let result = store.initialize();
    assert!(matches!(
        result,
        Err(StoreError::Persistence(PersistError::ProviderMismatch))
    ));
}

#[test]
fn test_orphaned_vector_dropped_on_load() {
    let dir = tempfile::tempdir().unwrap();

    let a = doc("kept");
    let orphan_id = DocId::new();

    // Simulate a crash between the vector write and the document write:
    // vectors.bin carries an entry documents.json never got.
    {
        let persist = CatalogPersist::new(dir.path().to_path_buf());
        let mut index = VectorIndex::new(3);
        index.insert(a.id.clone(), vec![1.0, 0.0, 0.0]).unwrap();
        index.insert(orphan_id.clone(), vec![0.0, 1.0, 0.0]).unwrap();
        persist
            .save(std::slice::from_ref(&a), &index, &provider_id())
            .unwrap();
    }

    let store = ready_store(dir.path());
    assert_eq!(store.count().unwrap(), 1);

    // the orphaned vector is gone, not just hidden
    let results = store.search(&[0.0, 1.0, 0.0], "", 10).unwrap();
    assert!(results.is_empty());
}

#[test]
fn test_document_without_vector_dropped_on_load() {
    let dir = tempfile::tempdir().unwrap();

    let a = doc("with vector");
    let b = doc("vector lost");

    // Simulate a crash mid-removal: the vector write landed, the
    // document write did not.
    {
        let persist = CatalogPersist::new(dir.path().to_path_buf());
        let mut index = VectorIndex::new(3);
        index.insert(a.id.clone(), vec![1.0, 0.0, 0.0]).unwrap();
        persist
            .save(&[a.clone(), b.clone()], &index, &provider_id())
            .unwrap();
    }

    let store = ready_store(dir.path());
    assert_eq!(store.count().unwrap(), 1);
    assert_eq!(store.all().unwrap()[0].id, a.id);
}

#[test]
fn test_facade_restart_round_trip() {
    let dir = tempfile::tempdir().unwrap();

    let (a, b) = {
        let kb = KnowledgeBase::new(
            Arc::new(HashingProvider::default()),
            dir.path().to_path_buf(),
        );
        kb.initialize().unwrap();
        let a = kb
            .add_note("swift", "swift programming notes", vec!["swift".to_string()])
            .unwrap();
        let b = kb.add_note("rust", "rust programming notes", vec![]).unwrap();
        (a, b)
    };

    let kb = KnowledgeBase::new(
        Arc::new(HashingProvider::default()),
        dir.path().to_path_buf(),
    );
    kb.initialize().unwrap();

    assert_eq!(kb.count().unwrap(), 2);
    let ids: Vec<DocId> = kb.list_documents().unwrap().into_iter().map(|d| d.id).collect();
    assert_eq!(ids, vec![a.clone(), b]);

    // vectors survive the restart: searching old content still works
    let results = kb.search("swift programming notes", 10).unwrap();
    assert_eq!(results[0].document.id, a);
    assert!((results[0].score - 1.0).abs() < 1e-5);

    // and tags survive inside the document payload
    assert_eq!(kb.documents_with_tag("swift").unwrap().len(), 1);
}
