//! Knowledge Base Store - snapshot cache with explicit reload
//!
//! Holds at most one validated [`KnowledgeBase`] behind an `Arc`. Readers clone
//! the `Arc`; `reload` swaps the whole snapshot under the write lock, so a
//! reader sees either the old snapshot or the new one, never a mixture.

use crate::data::KnowledgeBase;
use crate::error::KnowledgeBaseError;
use parking_lot::RwLock;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Where the knowledge base document comes from
#[derive(Debug, Clone)]
pub enum KnowledgeBaseSource {
    File(PathBuf),
    /// Document already held in memory (embedded data, tests)
    Json(String),
}

impl KnowledgeBaseSource {
    fn read(&self) -> Result<KnowledgeBase, KnowledgeBaseError> {
        match self {
            KnowledgeBaseSource::File(path) => KnowledgeBase::load(path),
            KnowledgeBaseSource::Json(json) => KnowledgeBase::from_json_str(json),
        }
    }
}

/// Single-writer / many-reader cache around a knowledge base source
pub struct KnowledgeBaseStore {
    source: KnowledgeBaseSource,
    snapshot: RwLock<Option<Arc<KnowledgeBase>>>,
}

impl KnowledgeBaseStore {
    pub fn new(source: KnowledgeBaseSource) -> Self {
        Self {
            source,
            snapshot: RwLock::new(None),
        }
    }

    pub fn from_path(path: impl AsRef<Path>) -> Self {
        Self::new(KnowledgeBaseSource::File(path.as_ref().to_path_buf()))
    }

    pub fn from_json(json: impl Into<String>) -> Self {
        Self::new(KnowledgeBaseSource::Json(json.into()))
    }

    /// Cached snapshot, loading and validating the source on first use
    ///
    /// Concurrent first callers are serialized on the write lock; only one of
    /// them reads the source.
    pub fn load(&self) -> Result<Arc<KnowledgeBase>, KnowledgeBaseError> {
        if let Some(kb) = self.snapshot.read().as_ref() {
            tracing::debug!("Using cached knowledge base");
            return Ok(Arc::clone(kb));
        }

        let mut guard = self.snapshot.write();
        if let Some(kb) = guard.as_ref() {
            return Ok(Arc::clone(kb));
        }

        let kb = Arc::new(self.read_source()?);
        *guard = Some(Arc::clone(&kb));
        Ok(kb)
    }

    /// Re-read and re-validate the source, replacing the cached snapshot
    ///
    /// On failure the cache is left empty: an invalid source must not keep
    /// serving inference from the stale snapshot.
    pub fn reload(&self) -> Result<Arc<KnowledgeBase>, KnowledgeBaseError> {
        let mut guard = self.snapshot.write();
        match self.read_source() {
            Ok(kb) => {
                let kb = Arc::new(kb);
                *guard = Some(Arc::clone(&kb));
                tracing::info!("Knowledge base reloaded");
                Ok(kb)
            }
            Err(e) => {
                *guard = None;
                Err(e)
            }
        }
    }

    /// Drop the cached snapshot; the next `load` re-reads the source
    pub fn clear_cache(&self) {
        *self.snapshot.write() = None;
        tracing::debug!("Knowledge base cache cleared");
    }

    pub fn is_cached(&self) -> bool {
        self.snapshot.read().is_some()
    }

    fn read_source(&self) -> Result<KnowledgeBase, KnowledgeBaseError> {
        match self.source.read() {
            Ok(kb) => {
                let summary = kb.summary();
                tracing::info!(
                    "Knowledge base ready: {} symptoms, {} nutrients, {} rules",
                    summary.symptoms_count,
                    summary.nutrients_count,
                    summary.rules_count
                );
                Ok(kb)
            }
            Err(e) => {
                tracing::error!("Failed to load knowledge base: {}", e);
                Err(e)
            }
        }
    }
}
