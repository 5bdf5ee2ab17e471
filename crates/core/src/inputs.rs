use crate::script::DEFAULT_COMMAND;
use crate::version::{derive_working_versions, includes_default_version, split_commas, unique};

/// Validated inputs of a setup run.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ActionInputs {
    pub default_version: String,
    pub explicit_versions: Vec<String>,
    /// User command, possibly spanning multiple lines. Never blank.
    pub command: String,
}

impl ActionInputs {
    /// A blank command falls back to [`DEFAULT_COMMAND`]. Trailing line
    /// breaks are removed so that every remaining line is a statement.
    pub fn new(default_version: &str, versions: &str, command: &str) -> Self {
        let command = command.trim_end();

        Self {
            default_version: default_version.trim().to_owned(),
            explicit_versions: unique(&split_commas(versions)),
            command: if command.trim().is_empty() {
                DEFAULT_COMMAND.to_owned()
            } else {
                command.to_owned()
            },
        }
    }

    /// The working set of versions to install, see [`derive_working_versions`].
    pub fn versions(&self) -> Vec<String> {
        derive_working_versions(&self.explicit_versions, &self.default_version)
    }

    /// Whether a default version should be activated once installation finishes.
    pub fn has_default_version(&self) -> bool {
        includes_default_version(&self.default_version)
    }
}
