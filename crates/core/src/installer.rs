use crate::cache::{CacheKey, ARCHIVE_CACHE_NAME};
use crate::env::HostServices;
use crate::error::PyenvError;
use starbase_styles::color;
use starbase_utils::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument, warn};

/// Repository that pyenv source archives are downloaded from.
pub const PYENV_REPOSITORY: &str = "github.com/pyenv/pyenv";

/// Name of the output that publishes the pyenv root to later steps.
pub const PYENV_ROOT_OUTPUT: &str = "pyenv_root";

/// Acquires a specific pyenv release: downloads its source archive
/// (or reuses a cached copy), extracts it, and registers the extracted
/// root in the tool cache.
pub struct PyenvInstaller {
    pub pyenv_version: String,
    pub temp_dir: PathBuf,

    services: HostServices,
}

impl PyenvInstaller {
    pub fn new(pyenv_version: &str, temp_dir: impl AsRef<Path>, services: HostServices) -> Self {
        Self {
            pyenv_version: pyenv_version.to_owned(),
            temp_dir: temp_dir.as_ref().to_path_buf(),
            services,
        }
    }

    /// Note the mandatory `v` prefix of the release tag.
    pub fn get_archive_url(&self) -> String {
        format!(
            "https://{PYENV_REPOSITORY}/archive/v{}.zip",
            self.pyenv_version
        )
    }

    /// Directory the archive is extracted into. Recreated on every extraction.
    pub fn get_inflate_dir(&self) -> PathBuf {
        self.temp_dir
            .join(format!("pyenv-{}-inflated", self.pyenv_version))
    }

    /// Name of the top-level directory inside the source archive.
    pub fn get_archive_prefix(&self) -> String {
        format!("pyenv-{}", self.pyenv_version)
    }

    /// Return the pyenv root, downloading and extracting it when it
    /// has not been cached yet.
    #[instrument(skip(self), fields(version = self.pyenv_version.as_str()))]
    pub async fn acquire(&self) -> Result<PathBuf, PyenvError> {
        if let Some(root) = self.find_pyenv_root().await? {
            debug!(root = ?root, "pyenv has already been cached, skipping download");

            self.publish_root(&root)?;

            return Ok(root);
        }

        let archive_file = self.download_archive().await?;

        self.install_from_archive(&archive_file).await
    }

    pub async fn find_pyenv_root(&self) -> Result<Option<PathBuf>, PyenvError> {
        Ok(self
            .services
            .cache
            .find(&CacheKey::pyenv_root(&self.pyenv_version))
            .await?)
    }

    /// Return a local path to the release archive, preferring a cached copy.
    /// Failing to cache a fresh download is not fatal, the downloaded file
    /// is used instead.
    #[instrument(skip(self))]
    pub async fn download_archive(&self) -> Result<PathBuf, PyenvError> {
        let key = CacheKey::pyenv_archive(&self.pyenv_version);

        if let Some(cached_dir) = self.services.cache.find(&key).await? {
            let cached_file = cached_dir.join(ARCHIVE_CACHE_NAME);

            if cached_file.is_file() {
                debug!(archive = ?cached_file, "Using cached pyenv archive");

                return Ok(cached_file);
            }
        }

        let url = self.get_archive_url();

        info!("Downloading {}", color::url(&url));

        let archive_file = self
            .services
            .downloader
            .download_tool(&url)
            .await
            .map_err(|error| PyenvError::DownloadFailed {
                version: self.pyenv_version.clone(),
                error: Box::new(error),
            })?;

        match self
            .services
            .cache
            .cache_file(&archive_file, ARCHIVE_CACHE_NAME, &key)
            .await
        {
            Ok(cached_dir) => Ok(cached_dir.join(ARCHIVE_CACHE_NAME)),
            Err(error) => {
                warn!(
                    archive = ?archive_file,
                    "Failed to cache {}, proceeding anyway: {error}",
                    color::path(&archive_file),
                );

                Ok(archive_file)
            }
        }
    }

    /// Extract the archive, locate the pyenv root inside of it, and register
    /// that root in the cache.
    #[instrument(skip(self))]
    pub async fn install_from_archive(&self, archive_file: &Path) -> Result<PathBuf, PyenvError> {
        let inflate_dir = self.get_inflate_dir();

        fs::remove_dir_all(&inflate_dir).map_err(|error| PyenvError::ExtractFailed {
            archive: archive_file.to_path_buf(),
            error: Box::new(error.into()),
        })?;

        let inflated_dir = self
            .services
            .downloader
            .extract_zip(archive_file, &inflate_dir)
            .await
            .map_err(|error| PyenvError::ExtractFailed {
                archive: archive_file.to_path_buf(),
                error: Box::new(error),
            })?;

        debug!(
            archive = ?archive_file,
            dest = ?inflated_dir,
            "Extracted pyenv archive",
        );

        let extracted_root = inflated_dir.join(self.get_archive_prefix());

        if !extracted_root.is_dir() {
            return Err(PyenvError::MissingArchiveLayout {
                archive: archive_file.to_path_buf(),
                expected: extracted_root,
            });
        }

        let root = match self
            .services
            .cache
            .cache_dir(&extracted_root, &CacheKey::pyenv_root(&self.pyenv_version))
            .await
        {
            Ok(root) => root,
            Err(error) => {
                warn!(
                    root = ?extracted_root,
                    "Failed to cache {}, proceeding anyway: {error}",
                    color::path(&extracted_root),
                );

                extracted_root
            }
        };

        self.publish_root(&root)?;

        info!("Installed pyenv {} to {}", self.pyenv_version, color::path(&root));

        Ok(root)
    }

    fn publish_root(&self, root: &Path) -> Result<(), PyenvError> {
        self.services
            .host
            .set_output(PYENV_ROOT_OUTPUT, &root.to_string_lossy())?;

        Ok(())
    }
}
