use crate::cache::{FsToolCache, ToolCache};
use crate::downloader::{Downloader, HttpDownloader};
use crate::host::{ActionsHost, HostEnvironment};
use crate::utils::process::{CommandExecutor, ProcessExecutor};
use std::env;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// Directories a setup run works in.
#[derive(Clone, Debug)]
pub struct ActionEnvironment {
    /// Scratch space for downloads, extracted archives, and generated scripts.
    pub temp_dir: PathBuf,
    /// Root of the persistent tool cache.
    pub tool_cache_dir: PathBuf,
}

impl ActionEnvironment {
    /// Resolve directories from the runner, falling back to the system
    /// temporary directory when running outside of CI.
    pub fn new(temp_dir: Option<PathBuf>, tool_cache_dir: Option<PathBuf>) -> Self {
        let fallback = env::temp_dir().join("pyenv-setup");
        let temp_dir = temp_dir.unwrap_or_else(|| fallback.join("temp"));
        let tool_cache_dir = tool_cache_dir.unwrap_or_else(|| fallback.join("tool-cache"));

        Self::from(temp_dir, tool_cache_dir)
    }

    pub fn new_testing(sandbox: &Path) -> Self {
        Self::from(sandbox.join(".temp"), sandbox.join(".tool-cache"))
    }

    pub fn from<T: AsRef<Path>, C: AsRef<Path>>(temp_dir: T, tool_cache_dir: C) -> Self {
        let temp_dir = temp_dir.as_ref();
        let tool_cache_dir = tool_cache_dir.as_ref();

        debug!(
            temp_dir = ?temp_dir,
            tool_cache_dir = ?tool_cache_dir,
            "Creating setup environment",
        );

        Self {
            temp_dir: temp_dir.to_path_buf(),
            tool_cache_dir: tool_cache_dir.to_path_buf(),
        }
    }
}

/// The external collaborators the pipeline drives.
#[derive(Clone)]
pub struct HostServices {
    pub cache: Arc<dyn ToolCache>,
    pub downloader: Arc<dyn Downloader>,
    pub executor: Arc<dyn ProcessExecutor>,
    pub host: Arc<dyn HostEnvironment>,
}

impl HostServices {
    /// Services backed by the real filesystem cache, network, subprocesses,
    /// and runner command files.
    pub fn from_environment(env: &ActionEnvironment) -> Self {
        Self {
            cache: Arc::new(FsToolCache::new(&env.tool_cache_dir)),
            downloader: Arc::new(HttpDownloader::new(&env.temp_dir)),
            executor: Arc::new(CommandExecutor::new()),
            host: Arc::new(ActionsHost::from_env()),
        }
    }

    pub fn with_executor(self, executor: Arc<dyn ProcessExecutor>) -> Self {
        Self { executor, ..self }
    }
}

impl fmt::Debug for HostServices {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostServices").finish_non_exhaustive()
    }
}
