pub mod cache;
mod downloader;
mod env;
mod env_configurator;
mod error;
mod host;
mod inputs;
mod installer;
mod orchestrator;
mod script;
pub mod utils;
mod version;

pub use downloader::*;
pub use env::*;
pub use env_configurator::*;
pub use error::*;
pub use host::*;
pub use inputs::*;
pub use installer::*;
pub use orchestrator::*;
pub use script::*;
pub use starbase_styles::color;
pub use utils::process::{CommandExecutor, ProcessError, ProcessExecutor, ProcessResult};
pub use version::*;
