use starbase_styles::{Style, Stylize};
use std::env;
use std::ffi::OsString;
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, trace};

#[derive(Error, Debug, miette::Diagnostic)]
pub enum HostError {
    #[diagnostic(code(pyenv::host::command_file))]
    #[error("Failed to append to runner command file {}.", .path.style(Style::Path))]
    CommandFile {
        path: PathBuf,
        #[source]
        error: Box<io::Error>,
    },

    #[diagnostic(code(pyenv::host::invalid_path))]
    #[error("Unable to add {} to PATH.", .path.style(Style::Path))]
    InvalidPath {
        path: PathBuf,
        #[source]
        error: Box<env::JoinPathsError>,
    },

    #[diagnostic(code(pyenv::host::multiline_name))]
    #[error("Names of exported variables and outputs must be a single line, received {}.", .name.style(Style::Id))]
    MultilineName { name: String },
}

/// The ambient environment of the job that later steps observe.
pub trait HostEnvironment: Send + Sync {
    /// Bind an environment variable for the rest of the job.
    fn export_variable(&self, name: &str, value: &str) -> Result<(), HostError>;

    /// Prepend a directory to the executable search path for the rest of the job.
    fn add_path(&self, dir: &Path) -> Result<(), HostError>;

    /// Publish a named step output.
    fn set_output(&self, name: &str, value: &str) -> Result<(), HostError>;
}

/// A GitHub Actions style runner. Changes are applied to the current process
/// (so subprocesses spawned by this run see them) and appended to the runner's
/// command files (so subsequent steps see them).
#[derive(Clone, Debug, Default)]
pub struct ActionsHost {
    pub env_file: Option<PathBuf>,
    pub output_file: Option<PathBuf>,
    pub path_file: Option<PathBuf>,
}

impl ActionsHost {
    pub fn from_env() -> Self {
        let file_var = |name: &str| {
            env::var_os(name)
                .filter(|value| !value.is_empty())
                .map(PathBuf::from)
        };

        Self {
            env_file: file_var("GITHUB_ENV"),
            output_file: file_var("GITHUB_OUTPUT"),
            path_file: file_var("GITHUB_PATH"),
        }
    }
}

impl HostEnvironment for ActionsHost {
    fn export_variable(&self, name: &str, value: &str) -> Result<(), HostError> {
        debug!("export {name}=\"{value}\"");

        env::set_var(name, value);

        if let Some(file) = &self.env_file {
            append_to_file(file, &format_key_value(name, value)?)?;
        }

        Ok(())
    }

    fn add_path(&self, dir: &Path) -> Result<(), HostError> {
        debug!(dir = ?dir, "Prepending to PATH");

        let mut paths = vec![dir.to_path_buf()];

        if let Some(current) = env::var_os("PATH") {
            paths.extend(env::split_paths(&current));
        }

        let joined: OsString = env::join_paths(paths).map_err(|error| HostError::InvalidPath {
            path: dir.to_path_buf(),
            error: Box::new(error),
        })?;

        env::set_var("PATH", joined);

        if let Some(file) = &self.path_file {
            append_to_file(file, &format!("{}\n", dir.display()))?;
        }

        Ok(())
    }

    fn set_output(&self, name: &str, value: &str) -> Result<(), HostError> {
        debug!("output {name}=\"{value}\"");

        match &self.output_file {
            Some(file) => append_to_file(file, &format_key_value(name, value)?),
            None => {
                // Runners without command files still understand the workflow command
                println!("::set-output name={name}::{value}");

                Ok(())
            }
        }
    }
}

/// Format an entry for the runner's env/output files, using a heredoc
/// delimiter so that values may span multiple lines.
pub fn format_key_value(name: &str, value: &str) -> Result<String, HostError> {
    if name.contains(['\n', '\r']) {
        return Err(HostError::MultilineName {
            name: name.to_owned(),
        });
    }

    let mut delimiter = format!("ghadelimiter_{}", uuid::Uuid::new_v4());

    while value.contains(&delimiter) {
        delimiter = format!("ghadelimiter_{}", uuid::Uuid::new_v4());
    }

    Ok(format!("{name}<<{delimiter}\n{value}\n{delimiter}\n"))
}

fn append_to_file(path: &Path, content: &str) -> Result<(), HostError> {
    let handle_error = |error: io::Error| HostError::CommandFile {
        path: path.to_path_buf(),
        error: Box::new(error),
    };

    trace!(file = ?path, "Appending to runner command file");

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(handle_error)?;

    file.write_all(content.as_bytes()).map_err(handle_error)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_heredoc_entries() {
        let entry = format_key_value("PYENV_ROOT", "/opt/pyenv").unwrap();
        let lines = entry.lines().collect::<Vec<_>>();

        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("PYENV_ROOT<<ghadelimiter_"));
        assert_eq!(lines[1], "/opt/pyenv");
        assert_eq!(lines[0].trim_start_matches("PYENV_ROOT<<"), lines[2]);
    }

    #[test]
    fn rejects_multiline_names() {
        assert!(matches!(
            format_key_value("A\nB", "value"),
            Err(HostError::MultilineName { .. })
        ));
    }
}
