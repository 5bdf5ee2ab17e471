/// Interpreter used for generated post-install scripts.
pub const SCRIPT_SHELL: &str = "/bin/bash";

/// Environment variable pyenv reads to select the active Python version.
pub const PYENV_VERSION_VAR: &str = "PYENV_VERSION";

/// Command run after each installation when none was provided.
pub const DEFAULT_COMMAND: &str = "pip install -U pip";

/// Join the lines of a user command into a single statement list,
/// terminating every line with `;`.
///
/// Every line becomes a statement, so an empty command or a trailing line
/// break yields a bare `;` that bash rejects. Callers should trim the
/// command first, see [`ActionInputs::new`](crate::ActionInputs::new).
pub fn sanitize_command(command: &str) -> String {
    let lines = command
        .split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .collect::<Vec<_>>();

    format!("{};", lines.join(";\n"))
}

/// Render the post-install script that runs `command` against one
/// Python version. Equal inputs always produce byte-identical output,
/// which is what makes the generated scripts cacheable.
pub fn generate_script(shell: &str, python_version: &str, command: &str) -> String {
    [
        format!("#!{shell}"),
        "# generated by pyenv-setup".to_owned(),
        String::new(),
        "# select the python version for this script".to_owned(),
        format!("export {PYENV_VERSION_VAR}=\"{python_version}\";"),
        String::new(),
        "# user provided command:".to_owned(),
        sanitize_command(command),
    ]
    .join("\n")
}
