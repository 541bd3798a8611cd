use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Add a document
    Add {
        /// Document title
        #[clap(short, long)]
        title: String,

        /// Document body. Omit to read it from --file instead.
        content: Option<String>,

        /// Read the document body from a plain-text file
        #[clap(long, conflicts_with = "content")]
        file: Option<PathBuf>,

        /// Document kind: text, pdf, docx, markdown, webpage, note, code
        #[clap(short, long, default_value = "text")]
        kind: String,

        /// Comma-separated tags
        #[clap(long)]
        tags: Option<String>,

        /// Extra metadata as key=value, repeatable
        #[clap(short, long)]
        meta: Vec<String>,
    },

    /// Add a quick note
    Note {
        /// Note title
        #[clap(short, long)]
        title: String,

        /// Note body
        content: String,

        /// Comma-separated tags
        #[clap(long)]
        tags: Option<String>,
    },

    /// Add a code snippet
    Code {
        /// Snippet title
        #[clap(short, long)]
        title: String,

        /// The code itself
        content: String,

        /// Snippet language (stored as metadata)
        #[clap(short, long)]
        language: String,

        /// Comma-separated tags
        #[clap(long)]
        tags: Option<String>,
    },

    /// Search documents by semantic similarity
    Search {
        /// Query text
        query: String,

        /// Maximum number of results
        #[clap(short, long, default_value = "10")]
        limit: usize,
    },

    /// List all documents
    List {},

    /// Remove a document by id
    Remove {
        /// Document id
        id: String,
    },

    /// Print the number of stored documents
    Count {},

    /// List documents carrying an exact tag
    Tag {
        /// Tag to match
        tag: String,
    },
}
