use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt::Display;
use std::hash::Hash;
use std::str::FromStr;

use crate::id::DocId;

/// Kind of source a document came from. Informational only; retrieval
/// scoring never looks at it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentType {
    Text,
    Pdf,
    Docx,
    Markdown,
    Webpage,
    Note,
    Code,
}

impl Display for DocumentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            DocumentType::Text => "text",
            DocumentType::Pdf => "pdf",
            DocumentType::Docx => "docx",
            DocumentType::Markdown => "markdown",
            DocumentType::Webpage => "webpage",
            DocumentType::Note => "note",
            DocumentType::Code => "code",
        };
        write!(f, "{name}")
    }
}

impl FromStr for DocumentType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(DocumentType::Text),
            "pdf" => Ok(DocumentType::Pdf),
            "docx" => Ok(DocumentType::Docx),
            "markdown" | "md" => Ok(DocumentType::Markdown),
            "webpage" | "web" => Ok(DocumentType::Webpage),
            "note" => Ok(DocumentType::Note),
            "code" => Ok(DocumentType::Code),
            other => Err(format!(
                "unknown document type '{other}', expected one of: text, pdf, docx, markdown, webpage, note, code"
            )),
        }
    }
}

/// A unit of stored knowledge. `id` and `created_at` are assigned at
/// creation and never change; everything else is replaced wholesale when
/// a caller re-ingests the document.
#[derive(Debug, Clone, Eq, Serialize, Deserialize)]
pub struct Document {
    pub id: DocId,

    pub title: String,
    pub content: String,
    pub doc_type: DocumentType,

    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub metadata: HashMap<String, String>,

    pub created_at: DateTime<Utc>,
}

impl Hash for Document {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state)
    }
}

impl PartialEq for Document {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Document {
    pub fn new(
        title: &str,
        content: &str,
        doc_type: DocumentType,
        tags: Vec<String>,
        metadata: HashMap<String, String>,
    ) -> Self {
        Self {
            id: DocId::new(),
            title: title.to_string(),
            content: content.to_string(),
            doc_type,
            tags,
            metadata,
            created_at: Utc::now(),
        }
    }

    /// Exact tag membership, independent of similarity search.
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }
}
