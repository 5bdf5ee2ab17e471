use rustc_hash::FxHashMap;
use starbase_styles::{color, Style, Stylize};
use std::io;
use std::path::PathBuf;
use std::process::{ExitStatus, Stdio};
use thiserror::Error;
use tokio::process::Command;
use tracing::{instrument, trace};

#[derive(Error, Debug, miette::Diagnostic)]
pub enum ProcessError {
    #[diagnostic(code(pyenv::process::command_failed))]
    #[error("Failed to execute command {}.", .command.style(Style::Shell))]
    FailedCommand {
        command: String,
        #[source]
        error: Box<io::Error>,
    },

    #[diagnostic(code(pyenv::process::command_failed))]
    #[error("Command {} returned a {code} exit code.", .command.style(Style::Shell))]
    FailedCommandNonZeroExit { command: String, code: i32 },
}

#[derive(Debug)]
pub struct ProcessResult {
    pub command: String,
    pub exit_code: i32,
    pub working_dir: Option<PathBuf>,
}

/// Runs external programs on behalf of the pipeline: the `pyenv` executable
/// itself, and generated post-install scripts through `bash`.
#[async_trait::async_trait]
pub trait ProcessExecutor: Send + Sync {
    /// Run the program to completion. A non-zero exit code is an error.
    async fn exec(&self, program: &str, args: &[String]) -> Result<ProcessResult, ProcessError>;
}

/// Spawns real subprocesses. Output is inherited so that tool logs
/// stream straight into the job log.
#[derive(Clone, Debug, Default)]
pub struct CommandExecutor {
    pub env: FxHashMap<String, String>,
}

impl CommandExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a variable for every spawned process, regardless of the
    /// environment this process was started with.
    pub fn with_env(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(name.into(), value.into());
        self
    }
}

#[async_trait::async_trait]
impl ProcessExecutor for CommandExecutor {
    #[instrument(skip(self))]
    async fn exec(&self, program: &str, args: &[String]) -> Result<ProcessResult, ProcessError> {
        let mut command = Command::new(program);
        command.args(args);
        command.envs(&self.env);
        command.stdin(Stdio::null());

        handle_exec(exec_command(&mut command).await?)
    }
}

pub fn format_command_line(program: &str, args: &[String]) -> String {
    if args.is_empty() {
        return program.to_owned();
    }

    format!("{program} {}", shell_words::join(args))
}

async fn spawn_command(command: &mut Command) -> io::Result<ExitStatus> {
    let mut child = command.spawn()?;

    child.wait().await
}

pub async fn exec_command(command: &mut Command) -> Result<ProcessResult, ProcessError> {
    let inner = command.as_std();
    let command_line = format_command_line(
        &inner.get_program().to_string_lossy(),
        &inner
            .get_args()
            .map(|arg| arg.to_string_lossy().to_string())
            .collect::<Vec<_>>(),
    );

    trace!(
        cwd = ?inner.get_current_dir(),
        env = ?inner.get_envs()
            .filter_map(|(key, val)| val.map(|v| (key, v.to_string_lossy())))
            .collect::<FxHashMap<_, _>>(),
        "Running command {}", color::shell(&command_line)
    );

    let working_dir = inner.get_current_dir().map(PathBuf::from);
    let status = spawn_command(command)
        .await
        .map_err(|error| ProcessError::FailedCommand {
            command: command_line.clone(),
            error: Box::new(error),
        })?;
    let code = status.code().unwrap_or(-1);

    trace!(code, "Ran command {}", color::shell(&command_line));

    Ok(ProcessResult {
        command: command_line,
        exit_code: code,
        working_dir,
    })
}

pub fn handle_exec(result: ProcessResult) -> Result<ProcessResult, ProcessError> {
    if result.exit_code != 0 {
        return Err(ProcessError::FailedCommandNonZeroExit {
            command: result.command,
            code: result.exit_code,
        });
    }

    Ok(result)
}
