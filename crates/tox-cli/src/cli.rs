//! CLI argument parsing using clap derive

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Inspect tox configuration files
#[derive(Parser, Debug)]
#[command(name = "toxcfg")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable debug logging on stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Print the configuration file that applies to a directory
    ///
    /// Examples:
    ///   toxcfg find              # Search from the current directory
    ///   toxcfg find services/api # Search from services/api upwards
    Find {
        /// Directory to start searching from
        dir: Option<PathBuf>,
    },

    /// Print the configuration as JSON
    ///
    /// Examples:
    ///   toxcfg show
    ///   toxcfg show -c ci/tox.ini --resolve
    ///   toxcfg show --resolve -- -k smoke
    Show {
        #[command(flatten)]
        target: Target,

        /// Resolve {...} substitutions before printing
        #[arg(long)]
        resolve: bool,

        /// Positional arguments used for {posargs}
        #[arg(last = true)]
        posargs: Vec<String>,
    },

    /// List environment names, one per line
    Envs {
        #[command(flatten)]
        target: Target,
    },
}

/// Which configuration a command reads.
#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct Target {
    /// Directory to start searching from
    pub dir: Option<PathBuf>,

    /// Read this file instead of searching
    #[arg(short, long, env = "TOXCFG_CONFIG")]
    pub config: Option<PathBuf>,
}
