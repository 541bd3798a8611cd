use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use lore::cli::{self, Command};
use lore::config::{Config, ProviderKind};
use lore::embeddings::{EmbeddingProvider, FastembedProvider, HashingProvider};
use lore::id::DocId;
use lore::knowledge::KnowledgeBase;

pub fn parse_tags(tags: String) -> Vec<String> {
    tags.split(',')
        .map(|value| value.trim())
        .filter(|value| !value.is_empty())
        .map(|s| s.to_lowercase())
        .collect::<Vec<_>>()
}

fn parse_meta(pairs: Vec<String>) -> anyhow::Result<HashMap<String, String>> {
    let mut metadata = HashMap::new();
    for pair in pairs {
        let (key, value) = pair
            .split_once('=')
            .with_context(|| format!("metadata '{pair}' is not key=value"))?;
        metadata.insert(key.to_string(), value.to_string());
    }
    Ok(metadata)
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = cli::Args::parse();
    let config = Config::load();

    let provider: Arc<dyn EmbeddingProvider> = match config.provider {
        ProviderKind::Fastembed => Arc::new(FastembedProvider::new(
            &config.model,
            config.base_path().to_path_buf(),
        )?),
        ProviderKind::Hashing => Arc::new(HashingProvider::new(config.hashing_dimensions)),
    };

    tracing::debug!("using data dir {}", config.base_path().display());

    let kb = KnowledgeBase::new(provider, config.base_path().to_path_buf());
    kb.initialize()?;

    match args.command {
        Command::Add {
            title,
            content,
            file,
            kind,
            tags,
            meta,
        } => {
            let content = match (content, file) {
                (Some(content), _) => content,
                (None, Some(path)) => std::fs::read_to_string(&path)
                    .with_context(|| format!("couldnt read {}", path.display()))?,
                (None, None) => anyhow::bail!("either a content argument or --file is required"),
            };

            let doc_type = kind.parse().map_err(anyhow::Error::msg)?;
            let tags = tags.map(parse_tags).unwrap_or_default();
            let metadata = parse_meta(meta)?;

            let id = kb.add_document(&title, &content, doc_type, tags, metadata)?;
            println!("{id}");
            Ok(())
        }

        Command::Note {
            title,
            content,
            tags,
        } => {
            let id = kb.add_note(&title, &content, tags.map(parse_tags).unwrap_or_default())?;
            println!("{id}");
            Ok(())
        }

        Command::Code {
            title,
            content,
            language,
            tags,
        } => {
            let id = kb.add_code_snippet(
                &title,
                &content,
                &language,
                tags.map(parse_tags).unwrap_or_default(),
            )?;
            println!("{id}");
            Ok(())
        }

        Command::Search { query, limit } => {
            let results = kb.search(&query, limit)?;
            println!("{}", serde_json::to_string_pretty(&results)?);
            Ok(())
        }

        Command::List {} => {
            let documents = kb.list_documents()?;
            println!("{}", serde_json::to_string_pretty(&documents)?);
            Ok(())
        }

        Command::Remove { id } => {
            kb.remove_document(&DocId::from(id))?;
            println!("removed");
            Ok(())
        }

        Command::Count {} => {
            println!("{} documents", kb.count()?);
            Ok(())
        }

        Command::Tag { tag } => {
            let documents = kb.documents_with_tag(&tag)?;
            println!("{}", serde_json::to_string_pretty(&documents)?);
            Ok(())
        }
    }
}
