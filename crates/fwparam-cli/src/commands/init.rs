//! Parameter init code generation command.

use std::path::PathBuf;

use clap::Args;
use fwparam_codegen::InitGenerator;
use fwparam_config::{ConfigError, RoundingMode, ValueFile, paths};
use fwparam_core::IntegerRounding;

use super::common::{Project, RoundingArg};

#[derive(Args)]
pub struct InitArgs {
    /// Parameter value file (JSON)
    #[arg(value_name = "VALUES")]
    values: PathBuf,

    /// Profile to emit, 1-4 (default: from project config, else 1)
    #[arg(short, long)]
    profile: Option<u8>,

    /// Directory of *_ParamDef.json files (default: from project config)
    #[arg(long, value_name = "DIR")]
    defs: Option<PathBuf>,

    /// Output file (default: init_output from project config, else stdout)
    #[arg(short, long, value_name = "FILE")]
    out: Option<PathBuf>,

    /// Integer rounding (default: from project config, else truncate)
    #[arg(long, value_enum)]
    rounding: Option<RoundingArg>,
}

pub fn run(args: InitArgs, project: &Project) -> anyhow::Result<()> {
    let profile = args.profile.unwrap_or_else(|| project.config.profile());
    let rounding: IntegerRounding = args
        .rounding
        .map_or(project.config.integer_rounding, RoundingMode::from)
        .into();

    let values = ValueFile::load(&args.values)?;
    let mut generator = InitGenerator::new(&project.constants)
        .with_defs_dir(project.defs_dir(args.defs))
        .with_profile(profile)
        .with_rounding(rounding);
    let output = generator.generate(&values)?;

    match args.out.or_else(|| project.config.init_output()) {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                paths::ensure_dir(parent)?;
            }
            std::fs::write(&path, &output.code).map_err(|e| ConfigError::write_file(&path, e))?;
            println!(
                "Wrote {} ({} assignments, profile {profile})",
                path.display(),
                output.assignments
            );
            for diag in &output.diagnostics {
                println!("  clamped: {diag}");
            }
        }
        None => print!("{}", output.code),
    }
    Ok(())
}
