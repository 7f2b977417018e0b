use serde::Deserialize;
use std::path::PathBuf;

use crate::services::vectorizer::DEFAULT_MAX_FEATURES;

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Product table (CSV)
    #[serde(default = "default_catalog_path")]
    pub catalog_path: PathBuf,

    /// Optional image table (CSV) joined to products by name
    #[serde(default = "default_images_path")]
    pub images_path: Option<PathBuf>,

    /// PostgreSQL URL for recommendation history; history is disabled when unset
    #[serde(default)]
    pub database_url: Option<String>,

    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Number of recommendations when a request does not specify one
    #[serde(default = "default_top_n")]
    pub default_top_n: i64,

    /// Vocabulary cap for the TF-IDF space
    #[serde(default = "default_max_features")]
    pub max_features: usize,
}

fn default_catalog_path() -> PathBuf {
    PathBuf::from("data/wardah_skincare_clean.csv")
}

fn default_images_path() -> Option<PathBuf> {
    Some(PathBuf::from("data/wardah_product_images.csv"))
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_top_n() -> i64 {
    6
}

fn default_max_features() -> usize {
    DEFAULT_MAX_FEATURES
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_vars(std::env::vars())
    }

    /// Load configuration from key/value pairs
    pub fn from_vars<I>(vars: I) -> anyhow::Result<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        envy::from_iter::<_, Config>(vars).map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }

    /// Socket address the server binds to
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
