use crate::host::{HostEnvironment, HostError};
use starbase_styles::color;
use std::path::{Path, PathBuf};
use tracing::info;

/// Environment variable that points pyenv at its root.
pub const PYENV_ROOT_VAR: &str = "PYENV_ROOT";

pub fn get_pyenv_bin_dir(pyenv_root: &Path) -> PathBuf {
    pyenv_root.join("bin")
}

pub fn get_pyenv_shims_dir(pyenv_root: &Path) -> PathBuf {
    pyenv_root.join("shims")
}

/// Export `PYENV_ROOT` and put pyenv's binary and shim directories at the
/// front of `PATH`, with the binary directory taking priority.
pub fn configure_environment(
    host: &dyn HostEnvironment,
    pyenv_root: &Path,
) -> Result<(), HostError> {
    let bin_dir = get_pyenv_bin_dir(pyenv_root);
    let shims_dir = get_pyenv_shims_dir(pyenv_root);

    host.export_variable(PYENV_ROOT_VAR, &pyenv_root.to_string_lossy())?;

    info!("export {PYENV_ROOT_VAR}=\"{}\"", pyenv_root.display());

    // Each addition is prepended, so add in reverse priority order
    host.add_path(&shims_dir)?;
    host.add_path(&bin_dir)?;

    info!(
        "Patched PATH with {} and {}",
        color::path(&bin_dir),
        color::path(&shims_dir)
    );

    Ok(())
}
