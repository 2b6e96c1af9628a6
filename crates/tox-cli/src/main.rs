//! toxcfg - inspect tox configuration from the command line

mod cli;
mod commands;
mod error;
mod logging;

use clap::Parser;
use colored::Colorize;

use cli::{Cli, Commands};
use error::Result;

fn main() {
    if let Err(e) = run() {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);
    tracing::debug!("Verbose mode enabled");

    match cli.command {
        Commands::Find { dir } => commands::run_find(dir.as_deref()),
        Commands::Show {
            target,
            resolve,
            posargs,
        } => commands::run_show(&target, resolve, &posargs),
        Commands::Envs { target } => commands::run_envs(&target),
    }
}
