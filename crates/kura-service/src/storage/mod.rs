//! Resource store interface consumed by the access-control core.
//!
//! Paths are absolute and `/`-separated; containers end in `/`. Reads through
//! [`ResourceStore::read_raw`] are never content-converted, which is what the
//! `.acl` lookup relies on.

mod directory;
mod memory;

pub use directory::DirectoryStore;
pub use memory::MemoryStore;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Storage backend failed on {path}: {message}")]
    Backend { path: String, message: String },
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Byte-oriented view of a Pod's storage.
pub trait ResourceStore: Send + Sync {
    /// Returns `true` if a resource or container exists at `path`.
    ///
    /// ## Errors
    /// Returns an error if the backend cannot answer.
    fn has(&self, path: &str) -> StoreResult<bool>;

    /// Reads the stored bytes at `path` without any format conversion.
    ///
    /// Returns `Ok(None)` when the path exists but cannot be read as a
    /// document (for example a container).
    ///
    /// ## Errors
    /// Returns an error if the backend fails while reading.
    fn read_raw(&self, path: &str) -> StoreResult<Option<Vec<u8>>>;

    /// Returns the media type of the document at `path`, if known.
    ///
    /// ## Errors
    /// Returns an error if the backend cannot answer.
    fn mimetype(&self, path: &str) -> StoreResult<Option<String>>;
}

impl<T: ResourceStore + ?Sized> ResourceStore for std::sync::Arc<T> {
    fn has(&self, path: &str) -> StoreResult<bool> {
        (**self).has(path)
    }

    fn read_raw(&self, path: &str) -> StoreResult<Option<Vec<u8>>> {
        (**self).read_raw(path)
    }

    fn mimetype(&self, path: &str) -> StoreResult<Option<String>> {
        (**self).mimetype(path)
    }
}
