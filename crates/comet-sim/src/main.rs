use std::process::ExitCode;

use clap::{Parser, Subcommand};
use commands::{
    exhaustive::{self, ExhaustiveArgs},
    mcmc::{self, McmcArgs},
};
use tracing::error;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod commands;

#[derive(Parser, Debug)]
#[command(name = "comet", about = "Mutually exclusive gene set sampler")]
struct Cli {
    /// Emit debug-level progress for every chain and round.
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Sample collections of gene sets with adaptive multi-chain MCMC.
    Mcmc(McmcArgs),
    /// Score every gene set of one size.
    Exhaustive(ExhaustiveArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Command::Mcmc(args) => mcmc::run(&args),
        Command::Exhaustive(args) => exhaustive::run(&args),
    };
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("comet=debug")
    } else {
        EnvFilter::new("comet=info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).without_time().with_writer(std::io::stderr))
        .with(filter)
        .init();
}
