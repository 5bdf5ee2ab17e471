use super::cache_error::ToolCacheError;
use super::cache_key::CacheKey;
use super::ToolCache;
use starbase_styles::color;
use starbase_utils::fs;
use std::env::consts;
use std::path::{Path, PathBuf};
use tracing::{debug, instrument, trace};

/// A [`ToolCache`] backed by a directory on the runner, using the same layout
/// as the hosted tool cache: `<root>/<name>/<version>/<arch>/`, with a sibling
/// `<arch>.complete` marker written once the slot has been fully populated.
#[derive(Clone, Debug)]
pub struct FsToolCache {
    pub root: PathBuf,
    pub arch: String,
}

impl FsToolCache {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            arch: consts::ARCH.to_owned(),
        }
    }

    pub fn get_slot_dir(&self, key: &CacheKey) -> PathBuf {
        self.root.join(&key.name).join(&key.version).join(&self.arch)
    }

    pub fn get_marker_file(&self, key: &CacheKey) -> PathBuf {
        self.root
            .join(&key.name)
            .join(&key.version)
            .join(format!("{}.complete", self.arch))
    }

    fn locate(&self, key: &CacheKey) -> Result<Option<PathBuf>, ToolCacheError> {
        if !key.is_valid() {
            return Err(ToolCacheError::InvalidKey {
                key: key.to_string(),
            });
        }

        let slot_dir = self.get_slot_dir(key);

        if slot_dir.is_dir() && self.get_marker_file(key).exists() {
            return Ok(Some(slot_dir));
        }

        Ok(None)
    }

    /// Create a fresh slot directory, discarding any partially populated
    /// leftovers from an interrupted run.
    fn prepare_slot(&self, key: &CacheKey) -> Result<PathBuf, ToolCacheError> {
        let slot_dir = self.get_slot_dir(key);

        fs::remove_dir_all(&slot_dir)?;
        fs::create_dir_all(&slot_dir)?;

        Ok(slot_dir)
    }

    fn complete_slot(&self, key: &CacheKey) -> Result<(), ToolCacheError> {
        fs::write_file(self.get_marker_file(key), "")?;

        Ok(())
    }
}

#[async_trait::async_trait]
impl ToolCache for FsToolCache {
    async fn find(&self, key: &CacheKey) -> Result<Option<PathBuf>, ToolCacheError> {
        let found = self.locate(key)?;

        trace!(key = %key, found = ?found, "Looked up cache slot");

        Ok(found)
    }

    #[instrument(skip(self))]
    async fn cache_file(
        &self,
        source_file: &Path,
        file_name: &str,
        key: &CacheKey,
    ) -> Result<PathBuf, ToolCacheError> {
        if let Some(existing) = self.locate(key)? {
            debug!(key = %key, "Cache slot already populated, keeping existing entry");

            return Ok(existing);
        }

        if !source_file.is_file() {
            return Err(ToolCacheError::MissingSource {
                path: source_file.to_path_buf(),
            });
        }

        let slot_dir = self.prepare_slot(key)?;

        debug!(
            source = ?source_file,
            slot = ?slot_dir,
            "Caching file {} as {}",
            color::path(source_file),
            color::id(key.to_string()),
        );

        fs::copy_file(source_file, slot_dir.join(file_name))?;

        self.complete_slot(key)?;

        Ok(slot_dir)
    }

    #[instrument(skip(self))]
    async fn cache_dir(
        &self,
        source_dir: &Path,
        key: &CacheKey,
    ) -> Result<PathBuf, ToolCacheError> {
        if let Some(existing) = self.locate(key)? {
            debug!(key = %key, "Cache slot already populated, keeping existing entry");

            return Ok(existing);
        }

        if !source_dir.is_dir() {
            return Err(ToolCacheError::MissingSource {
                path: source_dir.to_path_buf(),
            });
        }

        let slot_dir = self.prepare_slot(key)?;

        debug!(
            source = ?source_dir,
            slot = ?slot_dir,
            "Caching directory {} as {}",
            color::path(source_dir),
            color::id(key.to_string()),
        );

        copy_dir_contents(source_dir, &slot_dir)?;

        self.complete_slot(key)?;

        Ok(slot_dir)
    }
}

fn copy_dir_contents(from_dir: &Path, to_dir: &Path) -> Result<(), ToolCacheError> {
    fs::create_dir_all(to_dir)?;

    for entry in fs::read_dir(from_dir)? {
        let from_path = entry.path();
        let to_path = to_dir.join(entry.file_name());
        let file_type = entry
            .file_type()
            .map_err(|error| ToolCacheError::CopyEntry {
                path: from_path.clone(),
                error: Box::new(error),
            })?;

        if file_type.is_symlink() {
            copy_symlink(&from_path, &to_path)?;
        } else if file_type.is_dir() {
            copy_dir_contents(&from_path, &to_path)?;
        } else {
            fs::copy_file(&from_path, &to_path)?;
        }
    }

    Ok(())
}

// Installed runtimes link their executables (python3 -> python3.11),
// so links are recreated instead of followed.
#[cfg(unix)]
fn copy_symlink(from_path: &Path, to_path: &Path) -> Result<(), ToolCacheError> {
    let map_error = |error: std::io::Error| ToolCacheError::CopyEntry {
        path: from_path.to_path_buf(),
        error: Box::new(error),
    };

    let target = std::fs::read_link(from_path).map_err(map_error)?;

    std::os::unix::fs::symlink(target, to_path).map_err(map_error)?;

    Ok(())
}

#[cfg(not(unix))]
fn copy_symlink(from_path: &Path, to_path: &Path) -> Result<(), ToolCacheError> {
    if from_path.is_dir() {
        copy_dir_contents(from_path, to_path)
    } else {
        fs::copy_file(from_path, to_path)?;

        Ok(())
    }
}
