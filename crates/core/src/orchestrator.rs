use crate::cache::CacheKey;
use crate::env::HostServices;
use crate::env_configurator::{get_pyenv_bin_dir, get_pyenv_shims_dir};
use crate::error::PyenvError;
use crate::script::{generate_script, SCRIPT_SHELL};
use crate::version::validate_version;
use futures::future::join_all;
use starbase_styles::color;
use starbase_utils::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, instrument};

/// File name that post-install scripts are cached under.
pub const COMMAND_FILENAME: &str = "pyenv_post_install.sh";

/// Executable of the version manager, resolved through `PATH`.
pub const PYENV_BIN: &str = "pyenv";

pub struct OrchestratorParams<'a> {
    pub command: &'a str,
    pub pyenv_root: &'a Path,
    pub pyenv_version: &'a str,
    pub scratch_dir: &'a Path,
    pub services: HostServices,
}

/// Drives the installation of Python versions through an acquired pyenv,
/// running the user's command after every fresh installation. Every step is
/// keyed in the tool cache, so repeated runs skip work that already happened.
pub struct InstallationOrchestrator {
    pub command: String,
    pub pyenv_root: PathBuf,
    pub pyenv_bin_dir: PathBuf,
    pub pyenv_shims_dir: PathBuf,
    pub pyenv_version: String,
    pub scratch_dir: PathBuf,
    pub shell: String,

    services: HostServices,
}

impl InstallationOrchestrator {
    /// Fails when pyenv has not been installed at the given root.
    pub fn new(params: OrchestratorParams<'_>) -> Result<Self, PyenvError> {
        let pyenv_root = params.pyenv_root.to_path_buf();
        let pyenv_bin_dir = get_pyenv_bin_dir(&pyenv_root);

        if !pyenv_root.is_dir() {
            return Err(PyenvError::MissingPyenvRoot { path: pyenv_root });
        }

        if !pyenv_bin_dir.is_dir() {
            return Err(PyenvError::MissingPyenvBin {
                path: pyenv_bin_dir,
            });
        }

        Ok(Self {
            command: params.command.to_owned(),
            pyenv_shims_dir: get_pyenv_shims_dir(&pyenv_root),
            pyenv_bin_dir,
            pyenv_root,
            pyenv_version: params.pyenv_version.to_owned(),
            scratch_dir: params.scratch_dir.to_path_buf(),
            shell: SCRIPT_SHELL.to_owned(),
            services: params.services,
        })
    }

    /// Directory pyenv installs a Python version into.
    pub fn get_python_install_dir(&self, python_version: &str) -> PathBuf {
        self.pyenv_root.join("versions").join(python_version)
    }

    /// Scratch file a script is written to before being cached.
    /// One per version, so concurrent installs never share a file.
    pub fn get_scratch_script_path(&self, python_version: &str) -> PathBuf {
        self.scratch_dir
            .join(format!("command-{python_version}.sh"))
    }

    /// Return the cached post-install script for a version, generating
    /// and caching it first if needed.
    #[instrument(skip(self))]
    pub async fn ensure_script(&self, python_version: &str) -> Result<PathBuf, PyenvError> {
        validate_version(python_version)?;

        let key = CacheKey::command_script(&self.pyenv_version, python_version);

        if let Some(cached_dir) = self.services.cache.find(&key).await? {
            let cached_script = cached_dir.join(COMMAND_FILENAME);

            // Slots are never overwritten, so a missing file cannot be repaired here
            if !cached_script.is_file() {
                return Err(PyenvError::MissingCachedScript {
                    path: cached_script,
                });
            }

            debug!(script = ?cached_script, "Using cached post-install script");

            return Ok(cached_script);
        }

        let body = generate_script(&self.shell, python_version, &self.command);
        let scratch_path = self.get_scratch_script_path(python_version);

        fs::write_file(&scratch_path, body).map_err(|error| PyenvError::ScriptWriteFailed {
            path: scratch_path.clone(),
            error: Box::new(error),
        })?;

        let cached_dir = self
            .services
            .cache
            .cache_file(&scratch_path, COMMAND_FILENAME, &key)
            .await
            .map_err(|error| PyenvError::ScriptCacheFailed {
                version: python_version.to_owned(),
                error: Box::new(error),
            })?;

        debug!(key = %key, "Cached post-install script");

        Ok(cached_dir.join(COMMAND_FILENAME))
    }

    /// Run the post-install script of a version, and record that it
    /// completed once it succeeds.
    #[instrument(skip(self))]
    pub async fn run_script(&self, python_version: &str) -> Result<(), PyenvError> {
        validate_version(python_version)?;

        let script = self.ensure_script(python_version).await?;

        self.services
            .executor
            .exec("bash", &[script.to_string_lossy().to_string()])
            .await
            .map_err(|error| PyenvError::ScriptRunFailed {
                version: python_version.to_owned(),
                script: script.clone(),
                error: Box::new(error),
            })?;

        self.services
            .cache
            .cache_file(
                &script,
                COMMAND_FILENAME,
                &CacheKey::script_ran(&self.pyenv_version, python_version),
            )
            .await
            .map_err(|error| PyenvError::ScriptCacheFailed {
                version: python_version.to_owned(),
                error: Box::new(error),
            })?;

        Ok(())
    }

    /// Whether the post-install script of a version has run to completion.
    pub async fn has_script_run(&self, python_version: &str) -> Result<bool, PyenvError> {
        Ok(self
            .services
            .cache
            .find(&CacheKey::script_ran(&self.pyenv_version, python_version))
            .await?
            .is_some())
    }

    /// Install a single Python version and run the user's command against it.
    /// A version is only considered installed once its script succeeded, so
    /// a cached runtime whose script failed has the script run again.
    /// Returns the cached installation directory.
    #[instrument(skip(self))]
    pub async fn install_one(&self, python_version: &str) -> Result<PathBuf, PyenvError> {
        validate_version(python_version)?;

        let key = CacheKey::python(&self.pyenv_version, python_version);

        let cached_python = match self.services.cache.find(&key).await? {
            Some(cached_python) => {
                if self.has_script_run(python_version).await? {
                    debug!(
                        install_dir = ?cached_python,
                        "Python {python_version} has already been installed"
                    );

                    return Ok(cached_python);
                }

                debug!(
                    install_dir = ?cached_python,
                    "Python {python_version} is cached but its command never completed"
                );

                cached_python
            }
            None => {
                info!("Installing Python {python_version}");

                self.services
                    .executor
                    .exec(PYENV_BIN, &["install".to_owned(), python_version.to_owned()])
                    .await
                    .map_err(|error| {
                        error!("Failed to install Python {python_version}");

                        PyenvError::InstallFailed {
                            version: python_version.to_owned(),
                            error: Box::new(error),
                        }
                    })?;

                info!("Successfully installed Python {python_version}");

                self.services
                    .cache
                    .cache_dir(&self.get_python_install_dir(python_version), &key)
                    .await?
            }
        };

        if let Err(error) = self.run_script(python_version).await {
            error!("Failed to run command for Python {python_version}");

            return Err(error);
        }

        Ok(cached_python)
    }

    /// Install every requested version concurrently and wait for all of them
    /// to settle. If any failed, the first failure (in request order) is
    /// returned; versions that did install remain cached.
    #[instrument(skip(self))]
    pub async fn install_all(&self, python_versions: &[String]) -> Result<Vec<String>, PyenvError> {
        let results = join_all(
            python_versions
                .iter()
                .map(|version| async move { (version, self.install_one(version).await) }),
        )
        .await;

        let mut installed = vec![];
        let mut first_error = None;

        for (version, result) in results {
            match result {
                Ok(_) => installed.push(version.to_owned()),
                Err(error) => {
                    if first_error.is_none() {
                        first_error = Some(error);
                    }
                }
            }
        }

        if let Some(error) = first_error {
            return Err(error);
        }

        Ok(installed)
    }

    /// Pin a previously installed version as the default for the
    /// current working directory.
    #[instrument(skip(self))]
    pub async fn set_default(&self, python_version: &str) -> Result<PathBuf, PyenvError> {
        validate_version(python_version)?;

        let Some(cached_python) = self
            .services
            .cache
            .find(&CacheKey::python(&self.pyenv_version, python_version))
            .await?
        else {
            return Err(PyenvError::NotInstalled {
                version: python_version.to_owned(),
            });
        };

        if !self.has_script_run(python_version).await? {
            return Err(PyenvError::NotInstalled {
                version: python_version.to_owned(),
            });
        }

        self.services
            .executor
            .exec(PYENV_BIN, &["local".to_owned(), python_version.to_owned()])
            .await
            .map_err(|error| PyenvError::SetDefaultFailed {
                version: python_version.to_owned(),
                error: Box::new(error),
            })?;

        info!(
            "Python {python_version} is now the default, located at {}",
            color::path(&cached_python)
        );

        Ok(cached_python)
    }
}
