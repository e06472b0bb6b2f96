use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::cmd::{
    self, navigate::NavigateArgs, path::PathArgs, status::StatusArgs, validate::ValidateArgs,
};

#[derive(Parser, Debug)]
#[command(
    name = "survey-runner",
    about = "Inspect routing and progress of a questionnaire schema",
    version,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Raise log verbosity (-v debug, -vv trace); RUST_LOG takes precedence
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Parse and validate a schema
    Validate(ValidateArgs),
    /// Print the routing path of a section instance, or of the whole questionnaire
    Path(PathArgs),
    /// Print the location after the given one
    Next(NavigateArgs),
    /// Print the location before the given one
    Previous(NavigateArgs),
    /// Summarise section progress and overall completion
    Status(StatusArgs),
}

pub fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match cli.command {
        Commands::Validate(args) => cmd::validate::run(&args),
        Commands::Path(args) => cmd::path::run(&args),
        Commands::Next(args) => cmd::navigate::run(&args, cmd::navigate::Direction::Next),
        Commands::Previous(args) => cmd::navigate::run(&args, cmd::navigate::Direction::Previous),
        Commands::Status(args) => cmd::status::run(&args),
    }
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
