//! fwparam CLI - firmware parameter struct and init code generation.

mod commands;

use clap::{Parser, Subcommand};
use commands::common::{GlobalArgs, Project, init_tracing};

#[derive(Parser)]
#[command(name = "fwparam")]
#[command(author, version, about = "Firmware parameter code generator", long_about = None)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate C struct headers from parameter definitions
    Structs(commands::structs::StructsArgs),

    /// Generate the parameter init function from a value file
    Init(commands::init::InitArgs),

    /// Convert a single user value and show the firmware result
    Convert(commands::convert::ConvertArgs),

    /// List the parameters of a module
    Params(commands::params::ParamsArgs),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.global);

    let project = Project::load(cli.global.config.as_deref())?;

    match cli.command {
        Commands::Structs(args) => commands::structs::run(args, &project),
        Commands::Init(args) => commands::init::run(args, &project),
        Commands::Convert(args) => commands::convert::run(args, &project),
        Commands::Params(args) => commands::params::run(args, &project),
    }
}
