#![allow(dead_code)]

use starbase_sandbox::{assert_cmd, create_empty_sandbox, Sandbox};
use std::path::Path;

pub fn create_setup_sandbox() -> Sandbox {
    create_empty_sandbox()
}

/// Build a command for the binary that never touches the real runner
/// files or caches.
pub fn create_setup_command<T: AsRef<Path>>(root: T) -> assert_cmd::Command {
    let root = root.as_ref();

    let mut cmd = assert_cmd::Command::cargo_bin("pyenv-setup").unwrap();
    cmd.current_dir(root);
    cmd.timeout(std::time::Duration::from_secs(60));
    cmd.env("NO_COLOR", "1");
    cmd.env("PYENV_SETUP_LOG", "trace");
    cmd.env("PYENV_SETUP_TEST", "true");
    cmd.env("RUNNER_TEMP", root.join(".temp"));
    cmd.env("RUNNER_TOOL_CACHE", root.join(".tool-cache"));
    cmd.env("GITHUB_ENV", root.join(".github-env"));
    cmd.env("GITHUB_OUTPUT", root.join(".github-output"));
    cmd.env("GITHUB_PATH", root.join(".github-path"));

    for name in ["INPUT_PYENV_VERSION", "INPUT_VERSIONS", "INPUT_DEFAULT", "INPUT_COMMAND"] {
        cmd.env_remove(name);
    }

    cmd
}

pub fn get_stderr(output: &std::process::Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}
