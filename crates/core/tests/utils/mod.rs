#![allow(dead_code)]

use pyenv_setup_core::cache::{CacheKey, FsToolCache, ToolCache, ToolCacheError};
use pyenv_setup_core::utils::process::format_command_line;
use pyenv_setup_core::*;
use starbase_sandbox::{create_empty_sandbox, Sandbox};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub const PYENV_VERSION: &str = "2.3.35";

/// Wraps the filesystem cache and counts how often each operation ran.
pub struct CountingCache {
    pub inner: FsToolCache,
    pub finds: AtomicUsize,
    pub cached_files: AtomicUsize,
    pub cached_dirs: AtomicUsize,
}

impl CountingCache {
    pub fn new(root: &Path) -> Self {
        Self {
            inner: FsToolCache::new(root),
            finds: AtomicUsize::new(0),
            cached_files: AtomicUsize::new(0),
            cached_dirs: AtomicUsize::new(0),
        }
    }

    pub fn contains(&self, key: &CacheKey) -> bool {
        self.inner.get_marker_file(key).exists()
    }
}

#[async_trait::async_trait]
impl ToolCache for CountingCache {
    async fn find(&self, key: &CacheKey) -> Result<Option<PathBuf>, ToolCacheError> {
        self.finds.fetch_add(1, Ordering::SeqCst);
        self.inner.find(key).await
    }

    async fn cache_file(
        &self,
        source_file: &Path,
        file_name: &str,
        key: &CacheKey,
    ) -> Result<PathBuf, ToolCacheError> {
        self.cached_files.fetch_add(1, Ordering::SeqCst);
        self.inner.cache_file(source_file, file_name, key).await
    }

    async fn cache_dir(
        &self,
        source_dir: &Path,
        key: &CacheKey,
    ) -> Result<PathBuf, ToolCacheError> {
        self.cached_dirs.fetch_add(1, Ordering::SeqCst);
        self.inner.cache_dir(source_dir, key).await
    }
}

/// Never finds anything and refuses to store anything.
pub struct FailingCache;

#[async_trait::async_trait]
impl ToolCache for FailingCache {
    async fn find(&self, _key: &CacheKey) -> Result<Option<PathBuf>, ToolCacheError> {
        Ok(None)
    }

    async fn cache_file(
        &self,
        source_file: &Path,
        _file_name: &str,
        _key: &CacheKey,
    ) -> Result<PathBuf, ToolCacheError> {
        Err(ToolCacheError::MissingSource {
            path: source_file.to_path_buf(),
        })
    }

    async fn cache_dir(
        &self,
        source_dir: &Path,
        _key: &CacheKey,
    ) -> Result<PathBuf, ToolCacheError> {
        Err(ToolCacheError::MissingSource {
            path: source_dir.to_path_buf(),
        })
    }
}

/// Pretends to download by writing a placeholder archive, and pretends to
/// extract by creating a pyenv source layout under `layout_dir`.
pub struct FakeDownloader {
    pub temp_dir: PathBuf,
    pub layout_dir: String,
    pub fail_download: bool,
    pub downloads: Mutex<Vec<String>>,
    pub extractions: AtomicUsize,
}

impl FakeDownloader {
    pub fn new(temp_dir: &Path, layout_dir: &str) -> Self {
        Self {
            temp_dir: temp_dir.to_path_buf(),
            layout_dir: layout_dir.to_owned(),
            fail_download: false,
            downloads: Mutex::new(vec![]),
            extractions: AtomicUsize::new(0),
        }
    }

    pub fn download_count(&self) -> usize {
        self.downloads.lock().unwrap().len()
    }
}

#[async_trait::async_trait]
impl Downloader for FakeDownloader {
    async fn download_tool(&self, url: &str) -> Result<PathBuf, DownloaderError> {
        if self.fail_download {
            return Err(DownloaderError::NotFound {
                url: url.to_owned(),
            });
        }

        let mut downloads = self.downloads.lock().unwrap();
        downloads.push(url.to_owned());

        let file = self
            .temp_dir
            .join(format!("download-{}", downloads.len()))
            .join(extract_filename_from_url(url));

        fs::create_dir_all(file.parent().unwrap()).unwrap();
        fs::write(&file, "zip").unwrap();

        Ok(file)
    }

    async fn extract_zip(
        &self,
        _archive_file: &Path,
        dest_dir: &Path,
    ) -> Result<PathBuf, DownloaderError> {
        self.extractions.fetch_add(1, Ordering::SeqCst);

        let bin_dir = dest_dir.join(&self.layout_dir).join("bin");

        fs::create_dir_all(&bin_dir).unwrap();
        fs::write(bin_dir.join("pyenv"), "#!/usr/bin/env bash").unwrap();

        Ok(dest_dir.to_path_buf())
    }
}

/// Records every command. `pyenv install <version>` creates the version
/// directory under the pyenv root, unless the version is set to fail.
pub struct RecordingExecutor {
    pub pyenv_root: PathBuf,
    pub failing_installs: Vec<String>,
    pub failing_scripts: AtomicBool,
    pub calls: Mutex<Vec<String>>,
}

impl RecordingExecutor {
    pub fn new(pyenv_root: &Path) -> Self {
        Self {
            pyenv_root: pyenv_root.to_path_buf(),
            failing_installs: vec![],
            failing_scripts: AtomicBool::new(false),
            calls: Mutex::new(vec![]),
        }
    }

    pub fn set_failing_scripts(&self, failing: bool) {
        self.failing_scripts.store(failing, Ordering::SeqCst);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count_calls(&self, prefix: &str) -> usize {
        self.calls()
            .iter()
            .filter(|call| call.starts_with(prefix))
            .count()
    }
}

#[async_trait::async_trait]
impl ProcessExecutor for RecordingExecutor {
    async fn exec(&self, program: &str, args: &[String]) -> Result<ProcessResult, ProcessError> {
        let command = format_command_line(program, args);

        self.calls.lock().unwrap().push(command.clone());

        let fail = || ProcessError::FailedCommandNonZeroExit {
            command: command.clone(),
            code: 1,
        };

        match (program, args.first().map(|arg| arg.as_str())) {
            ("pyenv", Some("install")) => {
                let version = &args[1];

                if self.failing_installs.contains(version) {
                    return Err(fail());
                }

                let bin_dir = self.pyenv_root.join("versions").join(version).join("bin");

                fs::create_dir_all(&bin_dir).unwrap();
                fs::write(bin_dir.join("python"), version).unwrap();
            }
            ("bash", Some(script)) => {
                assert!(Path::new(script).is_file(), "script {script} is missing");

                if self.failing_scripts.load(Ordering::SeqCst) {
                    return Err(fail());
                }
            }
            _ => {}
        };

        Ok(ProcessResult {
            command,
            exit_code: 0,
            working_dir: None,
        })
    }
}

/// Applies host changes to in-memory state.
#[derive(Default)]
pub struct MemoryHost {
    pub vars: Mutex<BTreeMap<String, String>>,
    pub paths: Mutex<Vec<PathBuf>>,
    pub outputs: Mutex<BTreeMap<String, String>>,
}

impl HostEnvironment for MemoryHost {
    fn export_variable(&self, name: &str, value: &str) -> Result<(), HostError> {
        self.vars
            .lock()
            .unwrap()
            .insert(name.to_owned(), value.to_owned());
        Ok(())
    }

    fn add_path(&self, dir: &Path) -> Result<(), HostError> {
        self.paths.lock().unwrap().insert(0, dir.to_path_buf());
        Ok(())
    }

    fn set_output(&self, name: &str, value: &str) -> Result<(), HostError> {
        self.outputs
            .lock()
            .unwrap()
            .insert(name.to_owned(), value.to_owned());
        Ok(())
    }
}

pub struct SetupSandbox {
    pub sandbox: Sandbox,
    pub env: ActionEnvironment,
    pub cache: Arc<CountingCache>,
    pub executor: Arc<RecordingExecutor>,
    pub host: Arc<MemoryHost>,
}

impl SetupSandbox {
    pub fn pyenv_root(&self) -> PathBuf {
        self.sandbox.path().join("pyenv")
    }

    pub fn services_with_downloader(&self, downloader: Arc<dyn Downloader>) -> HostServices {
        HostServices {
            cache: self.cache.clone(),
            downloader,
            executor: self.executor.clone(),
            host: self.host.clone(),
        }
    }

    pub fn services(&self) -> HostServices {
        self.services_with_downloader(Arc::new(FakeDownloader::new(
            &self.env.temp_dir,
            &format!("pyenv-{PYENV_VERSION}"),
        )))
    }

    pub fn create_orchestrator(&self, command: &str) -> InstallationOrchestrator {
        self.create_orchestrator_with(command, &self.env.temp_dir, self.services())
    }

    pub fn create_orchestrator_with(
        &self,
        command: &str,
        scratch_dir: &Path,
        services: HostServices,
    ) -> InstallationOrchestrator {
        InstallationOrchestrator::new(OrchestratorParams {
            command,
            pyenv_root: &self.pyenv_root(),
            pyenv_version: PYENV_VERSION,
            scratch_dir,
            services,
        })
        .unwrap()
    }

    /// Services whose cache never finds or stores anything.
    pub fn services_without_cache(&self) -> HostServices {
        HostServices {
            cache: Arc::new(FailingCache),
            ..self.services()
        }
    }
}

pub fn create_setup_sandbox() -> SetupSandbox {
    create_setup_sandbox_with(|_| {})
}

pub fn create_setup_sandbox_with(configure: impl FnOnce(&mut RecordingExecutor)) -> SetupSandbox {
    let sandbox = create_empty_sandbox();
    sandbox.create_file("pyenv/bin/pyenv", "#!/usr/bin/env bash");

    let env = ActionEnvironment::new_testing(sandbox.path());
    let mut executor = RecordingExecutor::new(&sandbox.path().join("pyenv"));

    configure(&mut executor);

    SetupSandbox {
        cache: Arc::new(CountingCache::new(&env.tool_cache_dir)),
        executor: Arc::new(executor),
        host: Arc::new(MemoryHost::default()),
        env,
        sandbox,
    }
}
