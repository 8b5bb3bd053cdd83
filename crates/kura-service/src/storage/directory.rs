use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use super::{ResourceStore, StoreError, StoreResult};

/// Read-only view of a local directory as a Pod.
///
/// Pod paths map onto the directory tree below `root`. Paths containing `.`
/// or `..` segments never resolve, so nothing outside `root` is reachable.
#[derive(Debug, Clone)]
pub struct DirectoryStore {
    root: PathBuf,
}

impl DirectoryStore {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, path: &str) -> Option<PathBuf> {
        let mut resolved = self.root.clone();
        for segment in path.split('/').filter(|segment| !segment.is_empty()) {
            if segment == "." || segment == ".." || segment.contains('\\') {
                return None;
            }
            resolved.push(segment);
        }
        Some(resolved)
    }
}

/// Media type guessed from the file extension.
fn mimetype_for(path: &str) -> &'static str {
    let extension = path
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "ttl" | "acl" | "meta" => "text/turtle",
        "jsonld" => "application/ld+json",
        "json" => "application/json",
        "html" | "htm" => "text/html",
        "txt" => "text/plain",
        "ics" => "text/calendar",
        "vcf" => "text/vcard",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        _ => "application/octet-stream",
    }
}

impl ResourceStore for DirectoryStore {
    fn has(&self, path: &str) -> StoreResult<bool> {
        let Some(resolved) = self.resolve(path) else {
            return Ok(false);
        };

        match std::fs::metadata(&resolved) {
            Ok(metadata) if path.ends_with('/') => Ok(metadata.is_dir()),
            Ok(metadata) => Ok(metadata.is_file()),
            Err(error) if error.kind() == ErrorKind::NotFound => Ok(false),
            Err(error) => Err(StoreError::Backend {
                path: path.to_string(),
                message: error.to_string(),
            }),
        }
    }

    #[tracing::instrument(skip(self), fields(root = %self.root.display()))]
    fn read_raw(&self, path: &str) -> StoreResult<Option<Vec<u8>>> {
        if path.ends_with('/') {
            return Ok(None);
        }
        let Some(resolved) = self.resolve(path) else {
            return Ok(None);
        };

        match std::fs::read(&resolved) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(error) if error.kind() == ErrorKind::NotFound => Ok(None),
            Err(error) if error.kind() == ErrorKind::IsADirectory => Ok(None),
            Err(error) => {
                tracing::warn!(error = %error, "Failed to read stored document");
                Err(StoreError::Backend {
                    path: path.to_string(),
                    message: error.to_string(),
                })
            }
        }
    }

    fn mimetype(&self, path: &str) -> StoreResult<Option<String>> {
        if self.has(path)? && !path.ends_with('/') {
            Ok(Some(mimetype_for(path).to_string()))
        } else {
            Ok(None)
        }
    }
}
