//! protodep CLI
//!
//! Vendors `.proto` files from git repositories into the current project.

mod cli;
mod commands;
mod error;
mod logging;

use clap::Parser;
use colored::Colorize;

use cli::{Cli, Commands};
use error::{CliError, Result};

fn main() {
    if let Err(e) = run() {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    logging::init(cli.verbose)?;
    tracing::debug!("Verbose mode enabled");

    match cli.command {
        Some(Commands::Up(args)) => {
            let cwd = std::env::current_dir()?;
            let home = dirs::home_dir()
                .ok_or_else(|| CliError::user("Could not determine the home directory"))?;
            commands::run_up(&cwd, &home, &args)
        }
        Some(Commands::Version { json }) => commands::run_version(json),
        None => {
            println!("{} protobuf dependency manager", "protodep".green().bold());
            println!();
            println!("Run {} for available commands.", "protodep --help".cyan());
            Ok(())
        }
    }
}
