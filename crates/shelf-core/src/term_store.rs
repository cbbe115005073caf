//! Persistence for the last applied search term of each list.
//!
//! Lists are keyed by a caller-chosen name (e.g. `my-books`). A cache with a
//! store attached reads its initial term from it and writes every applied
//! term back.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;
use tokio::fs;

use crate::error::{ListError, ListResult};

/// Stores one search term per list key.
#[async_trait]
pub trait TermStore: Send + Sync {
    async fn load(&self, key: &str) -> ListResult<Option<String>>;
    async fn save(&self, key: &str, term: &str) -> ListResult<()>;
}

/// Process-local store; lives as long as the value.
#[derive(Debug, Default)]
pub struct MemoryTermStore {
    terms: Mutex<BTreeMap<String, String>>,
}

impl MemoryTermStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TermStore for MemoryTermStore {
    async fn load(&self, key: &str) -> ListResult<Option<String>> {
        Ok(self
            .terms
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(key)
            .cloned())
    }

    async fn save(&self, key: &str, term: &str) -> ListResult<()> {
        self.terms
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(key.to_string(), term.to_string());
        Ok(())
    }
}

/// JSON file holding `{ "<key>": "<term>" }`.
///
/// Writes go to a temp file and are renamed into place.
#[derive(Debug)]
pub struct FileTermStore {
    path: PathBuf,
    lock: tokio::sync::Mutex<()>,
}

impl FileTermStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: tokio::sync::Mutex::new(()),
        }
    }

    /// Store at `<cache dir>/shelf/search_terms.json`.
    pub fn default_location() -> ListResult<Self> {
        Ok(Self::new(default_terms_path()?))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_all(&self) -> ListResult<BTreeMap<String, String>> {
        let content = match fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => {
                return Err(ListError::Storage {
                    message: format!("failed to read {}: {}", self.path.display(), e),
                })
            }
        };

        serde_json::from_str(&content).map_err(|e| ListError::Storage {
            message: format!("corrupt term file {}: {}", self.path.display(), e),
        })
    }
}

#[async_trait]
impl TermStore for FileTermStore {
    async fn load(&self, key: &str) -> ListResult<Option<String>> {
        let _guard = self.lock.lock().await;
        Ok(self.read_all().await?.remove(key))
    }

    async fn save(&self, key: &str, term: &str) -> ListResult<()> {
        let _guard = self.lock.lock().await;

        // A corrupt file is replaced rather than blocking every later save.
        let mut terms = self.read_all().await.unwrap_or_default();
        terms.insert(key.to_string(), term.to_string());

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let content = serde_json::to_string_pretty(&terms).map_err(|e| ListError::Storage {
            message: format!("failed to encode terms: {}", e),
        })?;
        write_atomic(&self.path, &content).await
    }
}

fn default_terms_path() -> ListResult<PathBuf> {
    let base = dirs::cache_dir()
        .or_else(dirs::home_dir)
        .ok_or_else(|| ListError::Config {
            message: "could not determine cache directory".to_string(),
        })?;

    Ok(base.join("shelf").join("search_terms.json"))
}

async fn write_atomic(path: &Path, content: &str) -> ListResult<()> {
    let temp_path = path.with_extension("tmp");

    fs::write(&temp_path, content)
        .await
        .map_err(|e| ListError::Storage {
            message: format!("failed to write temp file: {}", e),
        })?;

    fs::rename(&temp_path, path).await.map_err(|e| ListError::Storage {
        message: format!("failed to rename temp file: {}", e),
    })
}
