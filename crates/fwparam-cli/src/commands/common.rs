//! Shared CLI helpers used across multiple commands.

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Args, ValueEnum};
use fwparam_config::{MemorySpace, ProjectConfig, RoundingMode, paths};
use fwparam_core::{LegalValues, SystemConstants};
use tracing_subscriber::EnvFilter;

/// Options accepted by every subcommand.
#[derive(Args)]
pub struct GlobalArgs {
    /// Project configuration file (default: ./fwparam.toml, then the user config dir)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// More log output (-v info, -vv debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,
}

/// Install the stderr log subscriber. `RUST_LOG` overrides the flags.
pub fn init_tracing(global: &GlobalArgs) {
    let default = if global.quiet {
        "error"
    } else {
        match global.verbose {
            0 => "warn",
            1 => "info",
            _ => "debug",
        }
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| default.into()))
        .with_writer(std::io::stderr)
        .init();
}

/// Project configuration with its derived system constants.
pub struct Project {
    /// The parsed `fwparam.toml`, or defaults when none was found.
    pub config: ProjectConfig,
    /// System constants with the project's overrides applied.
    pub constants: SystemConstants,
}

impl Project {
    /// Find and load the project configuration.
    pub fn load(explicit: Option<&Path>) -> anyhow::Result<Self> {
        let config = match paths::find_project_config(explicit) {
            Some(path) => {
                tracing::info!(path = %path.display(), "using project config");
                ProjectConfig::load(&path)?
            }
            None => ProjectConfig::default(),
        };
        let constants = config
            .system_constants()
            .context("invalid [constants] in project config")?;
        Ok(Self { config, constants })
    }

    /// Definition directory: the flag if given, else the project setting.
    pub fn defs_dir(&self, flag: Option<PathBuf>) -> PathBuf {
        flag.unwrap_or_else(|| self.config.defs_dir())
    }
}

/// Parameter space as a CLI value.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum SpaceArg {
    /// Persistent parameters
    Persist,
    /// Profile parameters
    Profile,
}

impl From<SpaceArg> for MemorySpace {
    fn from(arg: SpaceArg) -> Self {
        match arg {
            SpaceArg::Persist => MemorySpace::Persist,
            SpaceArg::Profile => MemorySpace::Profile,
        }
    }
}

/// Integer rounding as a CLI value.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum RoundingArg {
    /// Toward zero
    Truncate,
    /// To nearest, halves away from zero
    Nearest,
}

impl From<RoundingArg> for RoundingMode {
    fn from(arg: RoundingArg) -> Self {
        match arg {
            RoundingArg::Truncate => RoundingMode::Truncate,
            RoundingArg::Nearest => RoundingMode::Nearest,
        }
    }
}

/// Short text for a legal-value set: `-`, `step 5`, or `0=Off, 1=On`.
pub fn describe_legal(legal: Option<&LegalValues>) -> String {
    match legal {
        None => "-".to_string(),
        Some(LegalValues::Step(step)) => format!("step {step}"),
        Some(LegalValues::List(entries)) => entries
            .iter()
            .map(|e| match &e.label {
                Some(label) => format!("{}={label}", e.value),
                None => e.value.to_string(),
            })
            .collect::<Vec<_>>()
            .join(", "),
    }
}

/// Format a number compactly for tables.
pub fn short_num(value: f64) -> String {
    let text = format!("{value:.6}");
    let text = text.trim_end_matches('0').trim_end_matches('.');
    if text == "-0" { "0".to_string() } else { text.to_string() }
}
