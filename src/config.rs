use homedir::my_home;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default embedding model for the fastembed provider
const DEFAULT_MODEL: &str = "all-MiniLM-L6-v2";
/// Bucket count for the hashing provider; matches the small
/// sentence-embedding models
const DEFAULT_HASHING_DIMENSIONS: usize = 384;

/// Which embedding provider backs the knowledge base.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// Local ONNX sentence-embedding model (downloaded on first use)
    Fastembed,
    /// Deterministic bag-of-words hashing; works fully offline
    Hashing,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_provider")]
    pub provider: ProviderKind,

    /// Model name for the fastembed provider (e.g., "all-MiniLM-L6-v2")
    #[serde(default = "default_model")]
    pub model: String,

    /// Vector dimension when the hashing provider is selected
    #[serde(default = "default_hashing_dimensions")]
    pub hashing_dimensions: usize,

    #[serde(skip_serializing, skip_deserializing)]
    base_path: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: default_model(),
            hashing_dimensions: default_hashing_dimensions(),
            base_path: PathBuf::new(),
        }
    }
}

fn default_provider() -> ProviderKind {
    ProviderKind::Fastembed
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_hashing_dimensions() -> usize {
    DEFAULT_HASHING_DIMENSIONS
}

impl Config {
    fn validate(&self) {
        if self.model.trim().is_empty() {
            panic!("model must not be empty");
        }

        if self.hashing_dimensions == 0 {
            panic!("hashing_dimensions must be greater than 0");
        }
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Data directory: `LORE_BASE_PATH` when set, otherwise
    /// `~/.local/share/lore`.
    pub fn data_dir() -> PathBuf {
        if let Ok(path) = std::env::var("LORE_BASE_PATH") {
            return PathBuf::from(path);
        }

        let home = my_home()
            .expect("couldnt find home dir")
            .expect("couldnt find home dir");
        home.join(".local/share/lore")
    }

    pub fn load() -> Self {
        Self::load_with(&Self::data_dir())
    }

    /// Load config.yaml from `base_path`, creating it with defaults on
    /// first run and resaving when new fields gained defaults.
    pub fn load_with(base_path: &Path) -> Self {
        std::fs::create_dir_all(base_path).expect("couldnt create data dir");
        let config_path = base_path.join("config.yaml");

        if !config_path.exists() {
            std::fs::write(
                &config_path,
                serde_yml::to_string(&Self::default()).expect("default config serializes"),
            )
            .expect("couldnt write default config");
        }

        let config_str = std::fs::read_to_string(&config_path).expect("couldnt read config");
        let mut config: Self = serde_yml::from_str(&config_str).expect("config is malformed");

        config.base_path = base_path.to_path_buf();
        config.validate();

        // resave in case config version needs an upgrade
        if config_str != serde_yml::to_string(&config).expect("config serializes") {
            config.save();
        }

        config
    }

    pub fn save(&self) {
        let config_path = self.base_path.join("config.yaml");
        std::fs::write(
            &config_path,
            serde_yml::to_string(&self).expect("config serializes"),
        )
        .expect("couldnt write config");
    }
}
