use clap::builder::styling::{Color, Style, Styles};
use clap::{Parser, ValueEnum};
use pyenv_setup_core::DEFAULT_COMMAND;
use starbase_styles::color::Color as ColorType;
use std::fmt::{Display, Error, Formatter};
use std::path::PathBuf;

#[derive(ValueEnum, Clone, Debug, Default)]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl Display for LogLevel {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), Error> {
        write!(
            f,
            "{}",
            match self {
                LogLevel::Off => "off",
                LogLevel::Error => "error",
                LogLevel::Warn => "warn",
                LogLevel::Info => "info",
                LogLevel::Debug => "debug",
                LogLevel::Trace => "trace",
            }
        )?;

        Ok(())
    }
}

fn fg(ty: ColorType) -> Style {
    Style::new().fg_color(Some(Color::from(ty as u8)))
}

fn create_styles() -> Styles {
    Styles::default()
        .error(fg(ColorType::Red))
        .header(Style::new().bold())
        .invalid(fg(ColorType::Yellow))
        .literal(fg(ColorType::Pink)) // args, options, etc
        .placeholder(fg(ColorType::GrayLight))
        .usage(fg(ColorType::Purple).bold())
        .valid(fg(ColorType::Green))
}

/// Flags mirror the inputs of the hosted action, so every flag can also be
/// provided through the `INPUT_*` variables a CI runner sets.
#[derive(Debug, Parser)]
#[command(
    name = "pyenv-setup",
    version,
    about,
    long_about = None,
    next_line_help = false,
    styles = create_styles()
)]
pub struct App {
    #[arg(
        value_enum,
        long,
        env = "PYENV_SETUP_LOG",
        help = "Lowest log level to output"
    )]
    pub log: Option<LogLevel>,

    #[arg(
        long = "pyenv-version",
        env = "INPUT_PYENV_VERSION",
        default_value = "2.3.35",
        help = "Release of pyenv to install"
    )]
    pub pyenv_version: String,

    #[arg(
        long,
        env = "INPUT_VERSIONS",
        default_value = "",
        hide_default_value = true,
        help = "Comma separated list of Python versions to install"
    )]
    pub versions: String,

    #[arg(
        long,
        env = "INPUT_DEFAULT",
        default_value = "",
        hide_default_value = true,
        help = "Python version to install and activate as the default"
    )]
    pub default: String,

    #[arg(
        long,
        env = "INPUT_COMMAND",
        default_value = DEFAULT_COMMAND,
        help = "Command to run after each Python version is installed"
    )]
    pub command: String,

    #[arg(
        long = "tool-cache",
        env = "RUNNER_TOOL_CACHE",
        help = "Directory to cache pyenv and installed Python versions in"
    )]
    pub tool_cache: Option<PathBuf>,

    #[arg(
        long = "temp-dir",
        env = "RUNNER_TEMP",
        help = "Directory for downloads and generated scripts"
    )]
    pub temp_dir: Option<PathBuf>,
}
