use starbase_archive::Archiver;
use starbase_styles::{color, Style, Stylize};
use starbase_utils::fs::{self, FsError};
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, instrument};

#[derive(Error, Debug, miette::Diagnostic)]
pub enum DownloaderError {
    #[diagnostic(transparent)]
    #[error(transparent)]
    Fs(#[from] Box<FsError>),

    #[diagnostic(
        code(pyenv::download::missing),
        help = "Check that the requested pyenv release exists."
    )]
    #[error("Download {} does not exist.", .url.style(Style::Url))]
    NotFound { url: String },

    #[diagnostic(code(pyenv::download::failed))]
    #[error("Failed to download {}: {status}", .url.style(Style::Url))]
    FailedDownload { url: String, status: String },

    #[diagnostic(code(pyenv::download::http))]
    #[error("Failure for {}", .url.style(Style::Url))]
    Http {
        url: String,
        #[source]
        error: Box<reqwest::Error>,
    },

    #[diagnostic(code(pyenv::download::write_failed))]
    #[error("Failed to write download to {}.", .path.style(Style::Path))]
    WriteFailed {
        path: PathBuf,
        #[source]
        error: Box<io::Error>,
    },

    #[diagnostic(code(pyenv::unpack::failed))]
    #[error("Failed to unpack {}. {error}", .archive.style(Style::Path))]
    FailedUnpack { archive: PathBuf, error: String },
}

impl From<FsError> for DownloaderError {
    fn from(e: FsError) -> DownloaderError {
        DownloaderError::Fs(Box::new(e))
    }
}

/// Fetches and unpacks remote archives.
#[async_trait::async_trait]
pub trait Downloader: Send + Sync {
    /// Download the URL into a fresh local file and return its path.
    async fn download_tool(&self, url: &str) -> Result<PathBuf, DownloaderError>;

    /// Unpack a zip archive into the destination directory and return it.
    async fn extract_zip(
        &self,
        archive_file: &Path,
        dest_dir: &Path,
    ) -> Result<PathBuf, DownloaderError>;
}

/// Downloads over HTTPS into a scratch directory, one unique
/// sub-directory per download.
#[derive(Clone, Debug)]
pub struct HttpDownloader {
    pub temp_dir: PathBuf,
    client: reqwest::Client,
}

impl HttpDownloader {
    pub fn new(temp_dir: impl AsRef<Path>) -> Self {
        Self {
            temp_dir: temp_dir.as_ref().to_path_buf(),
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait::async_trait]
impl Downloader for HttpDownloader {
    #[instrument(skip(self))]
    async fn download_tool(&self, url: &str) -> Result<PathBuf, DownloaderError> {
        let dest_file = self
            .temp_dir
            .join(uuid::Uuid::new_v4().to_string())
            .join(extract_filename_from_url(url));

        download_from_url(&self.client, url, &dest_file).await?;

        Ok(dest_file)
    }

    #[instrument(skip(self))]
    async fn extract_zip(
        &self,
        archive_file: &Path,
        dest_dir: &Path,
    ) -> Result<PathBuf, DownloaderError> {
        debug!(
            archive = ?archive_file,
            dest = ?dest_dir,
            "Unpacking zip archive {}",
            color::path(archive_file)
        );

        fs::create_dir_all(dest_dir)?;

        Archiver::new(dest_dir, archive_file)
            .unpack_from_ext()
            .map_err(|error| DownloaderError::FailedUnpack {
                archive: archive_file.to_path_buf(),
                error: error.to_string(),
            })?;

        Ok(dest_dir.to_path_buf())
    }
}

/// Last path segment of a URL, without query or fragment.
pub fn extract_filename_from_url(url: &str) -> String {
    let path = url.split(['?', '#']).next().unwrap_or(url);

    match path.rsplit('/').find(|segment| !segment.is_empty()) {
        Some(name) => name.to_owned(),
        None => "download".to_owned(),
    }
}

pub async fn download_from_url(
    client: &reqwest::Client,
    url: &str,
    dest_file: &Path,
) -> Result<(), DownloaderError> {
    let handle_http_error = |error: reqwest::Error| DownloaderError::Http {
        url: url.to_owned(),
        error: Box::new(error),
    };

    debug!(
        dest_file = ?dest_file,
        "Downloading file from {}",
        color::url(url)
    );

    // Ensure parent directories exist
    if let Some(parent) = dest_file.parent() {
        fs::create_dir_all(parent)?;
    }

    let response = client.get(url).send().await.map_err(handle_http_error)?;
    let status = response.status();

    if status.as_u16() == 404 {
        return Err(DownloaderError::NotFound {
            url: url.to_owned(),
        });
    }

    if !status.is_success() {
        return Err(DownloaderError::FailedDownload {
            url: url.to_owned(),
            status: status.to_string(),
        });
    }

    let bytes = response.bytes().await.map_err(handle_http_error)?;

    tokio::fs::write(dest_file, &bytes)
        .await
        .map_err(|error| DownloaderError::WriteFailed {
            path: dest_file.to_path_buf(),
            error: Box::new(error),
        })?;

    Ok(())
}
