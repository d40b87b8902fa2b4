//! Struct header generation command.

use std::path::PathBuf;

use clap::Args;
use fwparam_codegen::{struct_headers, write_headers};
use fwparam_config::DefFile;

use super::common::Project;

#[derive(Args)]
pub struct StructsArgs {
    /// Directory of *_ParamDef.json files (default: from project config)
    #[arg(long, value_name = "DIR")]
    defs: Option<PathBuf>,

    /// Output directory for *_ParamStruct.h files (default: include_dir from project config, else .)
    #[arg(short, long, value_name = "DIR")]
    out: Option<PathBuf>,
}

pub fn run(args: StructsArgs, project: &Project) -> anyhow::Result<()> {
    let defs_dir = project.defs_dir(args.defs);
    let out_dir = args
        .out
        .or_else(|| project.config.include_dir())
        .unwrap_or_else(|| PathBuf::from("."));

    let files = DefFile::load_dir(&defs_dir, &project.constants)?;
    if files.is_empty() {
        anyhow::bail!("no *_ParamDef.json files in {}", defs_dir.display());
    }

    let headers = struct_headers(&files);
    for path in write_headers(&headers, &out_dir)? {
        println!("Wrote {}", path.display());
    }
    Ok(())
}
