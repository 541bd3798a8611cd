//! Durable persistence for the document catalog.
//!
//! Two files under the data directory, both written atomically
//! (temp file -> fsync -> rename):
//!
//! - `documents.json`: serde_json array of documents, in insertion order.
//! - `vectors.bin`: binary embedding table.
//!
//! vectors.bin header (47 bytes):
//! - version: u8 (1)
//! - provider_id: [u8; 32] (SHA256 hash of the embedding provider name)
//! - dimensions: u16 (little-endian)
//! - entry_count: u64 (little-endian)
//! - checksum: u32 (CRC32 of header fields before checksum)
//!
//! Entries (repeated):
//! - id_len: u16 (little-endian), id: UTF-8 bytes
//! - embedding: [f32; dimensions] (little-endian)

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use crate::document::Document;
use crate::id::DocId;
use crate::store::index::VectorIndex;

/// Current vectors.bin format version
const FORMAT_VERSION: u8 = 1;

/// Header size in bytes: version(1) + provider_id(32) + dimensions(2) + entry_count(8) + checksum(4)
const HEADER_SIZE: usize = 47;

/// Longest id accepted when reading an entry. Ids are 26-char ULIDs;
/// anything bigger means the file is damaged.
const MAX_ID_LEN: usize = 128;

/// Errors that can occur during persistence operations.
#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Catalog serialization error: {0}")]
    Catalog(#[from] serde_json::Error),

    #[error("Invalid file format: {0}")]
    InvalidFormat(String),

    #[error("Version mismatch: file version {0}, supported version {1}")]
    VersionMismatch(u8, u8),

    #[error("Provider mismatch: vectors were written by a different embedding provider")]
    ProviderMismatch,

    #[error("Checksum mismatch: vectors file may be corrupted")]
    ChecksumMismatch,

    #[error("Dimension mismatch: expected {expected}, file has {got}")]
    DimensionMismatch { expected: usize, got: usize },
}

/// vectors.bin header structure.
#[derive(Debug)]
struct Header {
    version: u8,
    provider_id: [u8; 32],
    dimensions: u16,
    entry_count: u64,
}

/// Reads and writes the two catalog files under one base directory.
pub struct CatalogPersist {
    base_dir: PathBuf,
}

impl CatalogPersist {
    pub fn new(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    pub fn documents_path(&self) -> PathBuf {
        self.base_dir.join("documents.json")
    }

    pub fn vectors_path(&self) -> PathBuf {
        self.base_dir.join("vectors.bin")
    }

    /// Load the persisted catalog. Missing files mean an empty store, not
    /// an error; anything else unreadable is surfaced to the caller.
    pub fn load(
        &self,
        expected_provider_id: &[u8; 32],
        expected_dimensions: usize,
    ) -> Result<(Vec<Document>, VectorIndex), PersistError> {
        let documents = self.load_documents()?;
        let index = if self.vectors_path().exists() {
            self.load_vectors(expected_provider_id, expected_dimensions)?
        } else {
            VectorIndex::new(expected_dimensions)
        };

        Ok((documents, index))
    }

    /// Persist the full catalog. Vectors are written before documents, so
    /// a crash in between leaves an orphaned vector (dropped on next
    /// load) rather than a document with no embedding acknowledged.
    pub fn save(
        &self,
        documents: &[Document],
        index: &VectorIndex,
        provider_id: &[u8; 32],
    ) -> Result<(), PersistError> {
        std::fs::create_dir_all(&self.base_dir)?;
        self.save_vectors(index, provider_id)?;
        self.save_documents(documents)?;
        Ok(())
    }

    fn load_documents(&self) -> Result<Vec<Document>, PersistError> {
        let path = self.documents_path();
        if !path.exists() {
            return Ok(Vec::new());
        }

        let file = File::open(&path)?;
        let documents = serde_json::from_reader(BufReader::new(file))?;
        Ok(documents)
    }

    fn save_documents(&self, documents: &[Document]) -> Result<(), PersistError> {
        let path = self.documents_path();
        let temp_path = path.with_extension("json.tmp");

        let result = Self::write_documents_file(&temp_path, documents);
        if result.is_err() {
            let _ = std::fs::remove_file(&temp_path);
            return result;
        }

        std::fs::rename(&temp_path, &path)?;
        Ok(())
    }

    fn write_documents_file(path: &Path, documents: &[Document]) -> Result<(), PersistError> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);

        serde_json::to_writer(&mut writer, documents)?;

        writer.flush()?;
        let file = writer
            .into_inner()
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
        file.sync_all()?;
        Ok(())
    }

    fn save_vectors(&self, index: &VectorIndex, provider_id: &[u8; 32]) -> Result<(), PersistError> {
        let path = self.vectors_path();
        let temp_path = path.with_extension("bin.tmp");

        let result = Self::write_vectors_file(&temp_path, index, provider_id);
        if result.is_err() {
            let _ = std::fs::remove_file(&temp_path);
            return result;
        }

        std::fs::rename(&temp_path, &path)?;
        Ok(())
    }

    fn write_vectors_file(
        path: &Path,
        index: &VectorIndex,
        provider_id: &[u8; 32],
    ) -> Result<(), PersistError> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);

        let header = Header {
            version: FORMAT_VERSION,
            provider_id: *provider_id,
            dimensions: index.dimensions() as u16,
            entry_count: index.len() as u64,
        };
        Self::write_header(&mut writer, &header)?;

        for (id, embedding) in index.iter() {
            Self::write_entry(&mut writer, id, embedding)?;
        }

        writer.flush()?;
        let file = writer
            .into_inner()
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
        file.sync_all()?;
        Ok(())
    }

    fn load_vectors(
        &self,
        expected_provider_id: &[u8; 32],
        expected_dimensions: usize,
    ) -> Result<VectorIndex, PersistError> {
        let file = File::open(self.vectors_path())?;
        let mut reader = BufReader::new(file);

        let header = Self::read_header(&mut reader)?;
        Self::validate_header(&header, expected_provider_id, expected_dimensions)?;

        let mut index =
            VectorIndex::with_capacity(header.dimensions as usize, header.entry_count as usize);

        for _ in 0..header.entry_count {
            let (id, embedding) = Self::read_entry(&mut reader, header.dimensions as usize)?;
            // Entries match the header dimension by construction
            let _ = index.insert(id, embedding);
        }

        Ok(index)
    }

    fn write_header(writer: &mut BufWriter<File>, header: &Header) -> Result<(), PersistError> {
        let mut header_bytes = [0u8; HEADER_SIZE];

        header_bytes[0] = header.version;
        header_bytes[1..33].copy_from_slice(&header.provider_id);
        header_bytes[33..35].copy_from_slice(&header.dimensions.to_le_bytes());
        header_bytes[35..43].copy_from_slice(&header.entry_count.to_le_bytes());

        let checksum = crc32fast::hash(&header_bytes[0..43]);
        header_bytes[43..47].copy_from_slice(&checksum.to_le_bytes());

        writer.write_all(&header_bytes)?;
        Ok(())
    }

    fn read_header(reader: &mut BufReader<File>) -> Result<Header, PersistError> {
        let mut header_bytes = [0u8; HEADER_SIZE];
        reader.read_exact(&mut header_bytes)?;

        let version = header_bytes[0];
        if version > FORMAT_VERSION {
            return Err(PersistError::VersionMismatch(version, FORMAT_VERSION));
        }

        let mut provider_id = [0u8; 32];
        provider_id.copy_from_slice(&header_bytes[1..33]);

        let dimensions = u16::from_le_bytes([header_bytes[33], header_bytes[34]]);

        let mut count_bytes = [0u8; 8];
        count_bytes.copy_from_slice(&header_bytes[35..43]);
        let entry_count = u64::from_le_bytes(count_bytes);

        let mut checksum_bytes = [0u8; 4];
        checksum_bytes.copy_from_slice(&header_bytes[43..47]);
        let stored_checksum = u32::from_le_bytes(checksum_bytes);

        let computed_checksum = crc32fast::hash(&header_bytes[0..43]);
        if stored_checksum != computed_checksum {
            return Err(PersistError::ChecksumMismatch);
        }

        Ok(Header {
            version,
            provider_id,
            dimensions,
            entry_count,
        })
    }

    fn validate_header(
        header: &Header,
        expected_provider_id: &[u8; 32],
        expected_dimensions: usize,
    ) -> Result<(), PersistError> {
        if header.provider_id != *expected_provider_id {
            return Err(PersistError::ProviderMismatch);
        }

        if header.dimensions as usize != expected_dimensions {
            return Err(PersistError::DimensionMismatch {
                expected: expected_dimensions,
                got: header.dimensions as usize,
            });
        }

        Ok(())
    }

    fn write_entry(
        writer: &mut BufWriter<File>,
        id: &DocId,
        embedding: &[f32],
    ) -> Result<(), PersistError> {
        let id_bytes = id.as_bytes();
        writer.write_all(&(id_bytes.len() as u16).to_le_bytes())?;
        writer.write_all(id_bytes)?;

        for &value in embedding {
            writer.write_all(&value.to_le_bytes())?;
        }

        Ok(())
    }

    fn read_entry(
        reader: &mut BufReader<File>,
        dimensions: usize,
    ) -> Result<(DocId, Vec<f32>), PersistError> {
        let mut len_bytes = [0u8; 2];
        reader.read_exact(&mut len_bytes)?;
        let id_len = u16::from_le_bytes(len_bytes) as usize;

        if id_len == 0 || id_len > MAX_ID_LEN {
            return Err(PersistError::InvalidFormat(format!(
                "entry id length {} out of range",
                id_len
            )));
        }

        let mut id_bytes = vec![0u8; id_len];
        reader.read_exact(&mut id_bytes)?;
        let id = String::from_utf8(id_bytes)
            .map_err(|e| PersistError::InvalidFormat(format!("entry id is not UTF-8: {}", e)))?;

        let mut embedding = Vec::with_capacity(dimensions);
        for _ in 0..dimensions {
            let mut float_bytes = [0u8; 4];
            reader.read_exact(&mut float_bytes)?;
            embedding.push(f32::from_le_bytes(float_bytes));
        }

        Ok((DocId::from(id), embedding))
    }
}
