use crate::cache::ToolCacheError;
use crate::downloader::DownloaderError;
use crate::host::HostError;
use crate::utils::process::ProcessError;
use starbase_styles::{Style, Stylize};
use starbase_utils::fs::FsError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug, miette::Diagnostic)]
pub enum PyenvError {
    #[diagnostic(transparent)]
    #[error(transparent)]
    Cache(#[from] Box<ToolCacheError>),

    #[diagnostic(transparent)]
    #[error(transparent)]
    Host(#[from] Box<HostError>),

    #[diagnostic(
        code(pyenv::version::invalid),
        help = "Python versions must be at least 4 characters, for example 3.11.4."
    )]
    #[error("Invalid Python version {}.", .version.style(Style::Hash))]
    InvalidVersion { version: String },

    #[diagnostic(
        code(pyenv::setup::missing_root),
        help = "Make sure pyenv has been installed before setting up the environment."
    )]
    #[error("pyenv root {} does not exist.", .path.style(Style::Path))]
    MissingPyenvRoot { path: PathBuf },

    #[diagnostic(
        code(pyenv::setup::missing_bin),
        help = "Make sure pyenv has been installed before setting up the environment."
    )]
    #[error("pyenv binary directory {} does not exist.", .path.style(Style::Path))]
    MissingPyenvBin { path: PathBuf },

    #[diagnostic(code(pyenv::acquire::download_failed))]
    #[error("Cannot download archive for pyenv {}.", .version.style(Style::Hash))]
    DownloadFailed {
        version: String,
        #[source]
        error: Box<DownloaderError>,
    },

    #[diagnostic(code(pyenv::acquire::extract_failed))]
    #[error("Failed to extract pyenv archive {}.", .archive.style(Style::Path))]
    ExtractFailed {
        archive: PathBuf,
        #[source]
        error: Box<DownloaderError>,
    },

    #[diagnostic(code(pyenv::acquire::invalid_layout))]
    #[error(
        "Failed to extract {}, expected directory {} does not exist.",
        .archive.style(Style::Path),
        .expected.style(Style::Path),
    )]
    MissingArchiveLayout { archive: PathBuf, expected: PathBuf },

    #[diagnostic(code(pyenv::install::failed))]
    #[error("Failed to install Python {}.", .version.style(Style::Hash))]
    InstallFailed {
        version: String,
        #[source]
        error: Box<ProcessError>,
    },

    #[diagnostic(code(pyenv::script::write_failed))]
    #[error("Failed to write post-install script {}.", .path.style(Style::Path))]
    ScriptWriteFailed {
        path: PathBuf,
        #[source]
        error: Box<FsError>,
    },

    #[diagnostic(code(pyenv::script::cache_failed))]
    #[error("Failed to cache the post-install script for Python {}.", .version.style(Style::Hash))]
    ScriptCacheFailed {
        version: String,
        #[source]
        error: Box<ToolCacheError>,
    },

    #[diagnostic(
        code(pyenv::script::missing_cached),
        help = "Remove the cache entry so the script can be generated again."
    )]
    #[error("Cached post-install script {} does not exist.", .path.style(Style::Path))]
    MissingCachedScript { path: PathBuf },

    #[diagnostic(code(pyenv::script::run_failed))]
    #[error(
        "Failed to run command {} for Python {}.",
        .script.style(Style::Path),
        .version.style(Style::Hash),
    )]
    ScriptRunFailed {
        version: String,
        script: PathBuf,
        #[source]
        error: Box<ProcessError>,
    },

    #[diagnostic(
        code(pyenv::default::not_installed),
        help = "Add the version to the list of versions to install."
    )]
    #[error("Python {} was not installed via pyenv.", .version.style(Style::Hash))]
    NotInstalled { version: String },

    #[diagnostic(code(pyenv::default::failed))]
    #[error("Failed to set Python {} as the default version.", .version.style(Style::Hash))]
    SetDefaultFailed {
        version: String,
        #[source]
        error: Box<ProcessError>,
    },
}

impl From<ToolCacheError> for PyenvError {
    fn from(e: ToolCacheError) -> PyenvError {
        PyenvError::Cache(Box::new(e))
    }
}

impl From<HostError> for PyenvError {
    fn from(e: HostError) -> PyenvError {
        PyenvError::Host(Box::new(e))
    }
}
