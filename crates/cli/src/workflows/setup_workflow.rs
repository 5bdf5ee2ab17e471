use crate::app::App;
use pyenv_setup_core::{
    configure_environment, validate_version, ActionEnvironment, ActionInputs, CommandExecutor,
    HostServices, InstallationOrchestrator, OrchestratorParams, PyenvInstaller, PYENV_ROOT_VAR,
};
use starbase_styles::color;
use std::sync::Arc;
use tracing::{info, warn};

/// Acquire pyenv, expose it to later steps, install every requested
/// Python version, and activate the default version when one was given.
pub async fn setup(args: App) -> miette::Result<()> {
    let inputs = ActionInputs::new(&args.default, &args.versions, &args.command);
    let versions = inputs.versions();

    // Fail fast, before anything is downloaded
    for version in &versions {
        validate_version(version)?;
    }

    let env = ActionEnvironment::new(args.temp_dir, args.tool_cache);
    let services = HostServices::from_environment(&env);

    let pyenv_root = PyenvInstaller::new(&args.pyenv_version, &env.temp_dir, services.clone())
        .acquire()
        .await?;

    configure_environment(services.host.as_ref(), &pyenv_root)?;

    // pyenv and the post-install scripts must see this root
    let services = services.with_executor(Arc::new(
        CommandExecutor::new().with_env(PYENV_ROOT_VAR, pyenv_root.to_string_lossy()),
    ));

    let orchestrator = InstallationOrchestrator::new(OrchestratorParams {
        command: &inputs.command,
        pyenv_root: &pyenv_root,
        pyenv_version: &args.pyenv_version,
        scratch_dir: &env.temp_dir,
        services,
    })?;

    let installed = orchestrator.install_all(&versions).await?;

    if installed.is_empty() {
        warn!("No Python versions were requested, only pyenv has been installed");
    } else {
        info!(
            "Installed Python {}",
            installed
                .iter()
                .map(color::id)
                .collect::<Vec<_>>()
                .join(", ")
        );
    }

    if inputs.has_default_version() {
        orchestrator.set_default(&inputs.default_version).await?;
    }

    info!(
        "pyenv {} is ready at {}",
        args.pyenv_version,
        color::path(&pyenv_root)
    );

    Ok(())
}
