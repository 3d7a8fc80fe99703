
mod cli;
mod commands;

use cli::{Cli, Commands};
use commands::{aggregate, build, validate};

pub fn run() -> anyhow::Result<()> {
    use clap::Parser;

    let cli = Cli::parse();
    commands::init_logging(cli.verbose);
    match &cli.command {
        Commands::Build(args) => build::run(&cli, args),
        Commands::Aggregate(args) => aggregate::run(&cli, args),
        Commands::Validate(args) => validate::run(&cli, args),
    }
}

fn main() -> anyhow::Result<()> { run() }
