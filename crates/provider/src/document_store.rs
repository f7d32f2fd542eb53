use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;
use dashmap::DashMap;
use tracing::{debug, warn};

/// Retrieves static documents by relative path.
///
/// `None` means the document does not exist (or may not be served).
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn get(&self, path: &str) -> Option<Bytes>;
}

/// Serves documents from a directory, caching each file after its first
/// read for the life of the process.
#[derive(Debug)]
pub struct FsDocumentStore {
    root: PathBuf,
    cache: DashMap<String, Bytes>,
}

impl FsDocumentStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            cache: DashMap::new(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Number of cached documents.
    pub fn cached(&self) -> usize {
        self.cache.len()
    }

    /// Join `path` onto the root, refusing anything that could escape it.
    fn resolve(&self, path: &str) -> Option<PathBuf> {
        let relative = Path::new(path.trim_start_matches('/'));
        let mut resolved = self.root.clone();
        for component in relative.components() {
            match component {
                Component::Normal(part) => resolved.push(part),
                Component::CurDir => {}
                Component::ParentDir | Component::RootDir | Component::Prefix(_) => return None,
            }
        }
        (resolved != self.root).then_some(resolved)
    }
}

#[async_trait]
impl DocumentStore for FsDocumentStore {
    async fn get(&self, path: &str) -> Option<Bytes> {
        if let Some(hit) = self.cache.get(path) {
            return Some(hit.value().clone());
        }
        let Some(file) = self.resolve(path) else {
            warn!(path, "rejected document path");
            return None;
        };
        match tokio::fs::read(&file).await {
            Ok(raw) => {
                let bytes = Bytes::from(raw);
                self.cache.insert(path.to_owned(), bytes.clone());
                debug!(path, size = bytes.len(), "document cached");
                Some(bytes)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path, "document not found");
                None
            }
            Err(e) => {
                warn!(path, error = %e, "failed to read document");
                None
            }
        }
    }
}
