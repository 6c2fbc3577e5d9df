//! Report design command line
//!
//! Loads JSON design scripts and reports on them.

use clap::{Parser, Subcommand};
use rdm_core::logging_facility::{init, Profile};

mod commands;

#[derive(Debug, Parser)]
#[command(name = "rdm")]
#[command(about = "Report design model - load, check and inspect designs", long_about = None)]
struct Cli {
    /// Log engine activity to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Load a design script and report its semantic errors
    Check(commands::check::CheckArgs),
    /// Print the element outline of a design script
    Tree(commands::tree::TreeArgs),
}

fn main() {
    let cli = Cli::parse();
    if cli.verbose {
        init(Profile::Development);
    }

    let result = match cli.command {
        Commands::Check(args) => commands::check::execute(args),
        Commands::Tree(args) => commands::tree::execute(args),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
