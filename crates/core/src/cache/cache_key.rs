use std::fmt;

/// Logical name of the slot holding the downloaded pyenv archive.
pub const ARCHIVE_CACHE_NAME: &str = "pyenv-archive.zip";

/// Logical name of the slot holding the extracted pyenv root.
pub const ROOT_CACHE_NAME: &str = "pyenv_root";

/// Address of a single cache slot. The same pair always resolves
/// to the same slot.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey {
    pub name: String,
    pub version: String,
}

impl CacheKey {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
        }
    }

    pub fn pyenv_archive(pyenv_version: &str) -> Self {
        Self::new(ARCHIVE_CACHE_NAME, pyenv_version)
    }

    pub fn pyenv_root(pyenv_version: &str) -> Self {
        Self::new(ROOT_CACHE_NAME, pyenv_version)
    }

    /// Slot of the post-install script generated for a Python version.
    pub fn command_script(pyenv_version: &str, python_version: &str) -> Self {
        Self::new(
            format!("pyenv-{pyenv_version}-command-{python_version}"),
            python_version,
        )
    }

    /// Slot recording that the post-install script of a Python version
    /// ran to completion. Holds a copy of the script that ran.
    pub fn script_ran(pyenv_version: &str, python_version: &str) -> Self {
        Self::new(
            format!("pyenv-{pyenv_version}-command-ran-{python_version}"),
            python_version,
        )
    }

    /// Slot of a Python installation produced by a specific pyenv release.
    pub fn python(pyenv_version: &str, python_version: &str) -> Self {
        Self::new(format!("pyenv-{pyenv_version}-python"), python_version)
    }

    pub fn is_valid(&self) -> bool {
        let valid_part = |part: &str| {
            !part.is_empty() && part != "." && part != ".." && !part.contains(['/', '\\'])
        };

        valid_part(&self.name) && valid_part(&self.version)
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.name, self.version)
    }
}
