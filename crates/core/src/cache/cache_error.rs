use starbase_styles::{Style, Stylize};
use starbase_utils::fs::FsError;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug, miette::Diagnostic)]
pub enum ToolCacheError {
    #[diagnostic(transparent)]
    #[error(transparent)]
    Fs(#[from] Box<FsError>),

    #[diagnostic(code(pyenv::cache::missing_source))]
    #[error("Unable to cache {}, the source does not exist.", .path.style(Style::Path))]
    MissingSource { path: PathBuf },

    #[diagnostic(code(pyenv::cache::invalid_key))]
    #[error("Invalid cache key {}, names and versions must be non-empty and not contain path separators.", .key.style(Style::Id))]
    InvalidKey { key: String },

    #[diagnostic(code(pyenv::cache::copy_failed))]
    #[error("Failed to copy {} into the cache.", .path.style(Style::Path))]
    CopyEntry {
        path: PathBuf,
        #[source]
        error: Box<io::Error>,
    },
}

impl From<FsError> for ToolCacheError {
    fn from(e: FsError) -> ToolCacheError {
        ToolCacheError::Fs(Box::new(e))
    }
}
