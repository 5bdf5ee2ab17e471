mod cache_error;
mod cache_key;
mod fs_cache;

pub use cache_error::*;
pub use cache_key::*;
pub use fs_cache::*;

use std::path::{Path, PathBuf};

/// Content-addressed store of downloaded archives, extracted tool roots,
/// installed runtimes, and generated scripts.
///
/// Slots are append-only: once a key has been populated, its location is
/// authoritative and is never re-validated or overwritten.
#[async_trait::async_trait]
pub trait ToolCache: Send + Sync {
    /// Return the directory of a populated slot, or `None` if it was never populated.
    async fn find(&self, key: &CacheKey) -> Result<Option<PathBuf>, ToolCacheError>;

    /// Copy a single file into the slot as `file_name`, and return the slot directory.
    async fn cache_file(
        &self,
        source_file: &Path,
        file_name: &str,
        key: &CacheKey,
    ) -> Result<PathBuf, ToolCacheError>;

    /// Copy the contents of a directory into the slot, and return the slot directory.
    async fn cache_dir(&self, source_dir: &Path, key: &CacheKey)
        -> Result<PathBuf, ToolCacheError>;
}
