use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

use super::{ResourceStore, StoreError, StoreResult};

#[derive(Debug, Clone)]
struct StoredResource {
    bytes: Vec<u8>,
    content_type: String,
}

/// In-memory resource store.
///
/// Containers are implicit: a container exists when the root is asked for or
/// when any stored document lives below it.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    documents: Arc<RwLock<BTreeMap<String, StoredResource>>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a document at `path`, replacing any previous content.
    ///
    /// ## Errors
    /// Returns an error if `path` names a container or the store lock is poisoned.
    pub fn put(
        &self,
        path: &str,
        bytes: impl Into<Vec<u8>>,
        content_type: &str,
    ) -> StoreResult<()> {
        if path.ends_with('/') || !path.starts_with('/') {
            return Err(StoreError::Backend {
                path: path.to_string(),
                message: "documents need an absolute, non-container path".to_string(),
            });
        }

        let mut documents = self
            .documents
            .write()
            .map_err(|_poisoned| StoreError::Unavailable("memory store lock poisoned".into()))?;
        documents.insert(
            path.to_string(),
            StoredResource {
                bytes: bytes.into(),
                content_type: content_type.to_string(),
            },
        );
        Ok(())
    }

    /// Removes the document at `path`, returning whether it existed.
    ///
    /// ## Errors
    /// Returns an error if the store lock is poisoned.
    pub fn remove(&self, path: &str) -> StoreResult<bool> {
        let mut documents = self
            .documents
            .write()
            .map_err(|_poisoned| StoreError::Unavailable("memory store lock poisoned".into()))?;
        Ok(documents.remove(path).is_some())
    }
}

impl ResourceStore for MemoryStore {
    fn has(&self, path: &str) -> StoreResult<bool> {
        if path == "/" {
            return Ok(true);
        }

        let documents = self
            .documents
            .read()
            .map_err(|_poisoned| StoreError::Unavailable("memory store lock poisoned".into()))?;

        if path.ends_with('/') {
            Ok(documents
                .range(path.to_string()..)
                .next()
                .is_some_and(|(key, _)| key.starts_with(path)))
        } else {
            Ok(documents.contains_key(path))
        }
    }

    fn read_raw(&self, path: &str) -> StoreResult<Option<Vec<u8>>> {
        let documents = self
            .documents
            .read()
            .map_err(|_poisoned| StoreError::Unavailable("memory store lock poisoned".into()))?;
        Ok(documents.get(path).map(|doc| doc.bytes.clone()))
    }

    fn mimetype(&self, path: &str) -> StoreResult<Option<String>> {
        let documents = self
            .documents
            .read()
            .map_err(|_poisoned| StoreError::Unavailable("memory store lock poisoned".into()))?;
        Ok(documents.get(path).map(|doc| doc.content_type.clone()))
    }
}
