mod run_fit;
mod run_simulate;

use run_fit::*;
use run_simulate::*;

use clap::{Parser, Subcommand};
use log::info;

#[derive(Parser, Debug)]
#[command(
    version,
    about = "LENTIL",
    long_about = "Hierarchical Dirichlet process topic model\n\
		  fitted by Chinese restaurant franchise Gibbs sampling.\n\
		  Input corpora are in lda-c format (`.gz` accepted)."
)]
struct Cli {
    /// verbosity
    #[arg(short = 'v', long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    commands: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(
        about = "Fit an HDP topic model to an lda-c corpus",
        long_about = "Fit an HDP topic model in the three stages: \n\
		      (1) Seat every token by sequential sampling\n\
		      (2) Alternate table and dish sweeps for `max-iter` iterations\n\
		      (3) Write topic and assignment snapshots every `out-iter`.\n"
    )]
    Fit(FitArgs),

    #[command(
        about = "Simulate an lda-c corpus from a finite topic model",
        long_about = "Draw topic-word and document-topic weights from Gamma\n\
		      distributions and Poisson document lengths. Writes the corpus\n\
		      with the true topic-word and document-topic counts.\n"
    )]
    Simulate(SimulateArgs),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if cli.verbose {
        std::env::set_var("RUST_LOG", "info");
    }
    env_logger::init();

    match &cli.commands {
        Commands::Fit(args) => {
            fit_hdp(args, cli.verbose)?;
        }
        Commands::Simulate(args) => {
            simulate_corpus(args)?;
        }
    }

    info!("Done");
    Ok(())
}
