//! Runtime configuration
//!
//! Read from environment variables:
//! - `KB_PATH`: knowledge base JSON file (default `data/knowledge_base.json`)
//! - `CF_OUTPUT`: report format, `markdown` or `json` (default `markdown`)
//! - `RUST_LOG`: log filter, handled by tracing-subscriber

use crate::kb_cache::KnowledgeBaseStore;
use anyhow::{bail, Result};
use std::path::PathBuf;
use std::str::FromStr;

pub const DEFAULT_KB_PATH: &str = "data/knowledge_base.json";

/// Default log level: info for our crate, warn for others
pub const DEFAULT_LOG_FILTER: &str = "nutrient_cf_rust=info,warn";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Markdown,
    Json,
}

impl FromStr for OutputFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "markdown" | "md" => Ok(OutputFormat::Markdown),
            "json" => Ok(OutputFormat::Json),
            other => bail!("Unknown output format '{}' (expected markdown or json)", other),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    pub kb_path: PathBuf,
    pub output: OutputFormat,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            kb_path: PathBuf::from(DEFAULT_KB_PATH),
            output: OutputFormat::Markdown,
        }
    }
}

impl EngineConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key → value lookup (environment, test maps)
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(path) = lookup("KB_PATH").filter(|p| !p.trim().is_empty()) {
            config.kb_path = PathBuf::from(path);
        }
        if let Some(format) = lookup("CF_OUTPUT") {
            config.output = format.parse()?;
        }

        Ok(config)
    }

    /// Store over the configured knowledge base file (not loaded yet)
    pub fn open_store(&self) -> KnowledgeBaseStore {
        KnowledgeBaseStore::from_path(&self.kb_path)
    }
}
