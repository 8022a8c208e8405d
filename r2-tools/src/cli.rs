//! Root CLI structure for r2-tools

use clap::{Parser, Subcommand};

use crate::commands::convert::ConvertArgs;

#[derive(Parser)]
#[command(name = "r2-tools")]
#[command(about = "Command-line tools for R2 Online asset formats", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Verbosity level (can be repeated for more detail)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// RMB skinned-mesh operations
    Rmb {
        #[command(subcommand)]
        command: crate::commands::rmb::RmbCommands,
    },

    /// RAB animation-clip operations
    Rab {
        #[command(subcommand)]
        command: crate::commands::rab::RabCommands,
    },

    /// Model manifest (.txt) operations
    Manifest {
        #[command(subcommand)]
        command: crate::commands::manifest::ManifestCommands,
    },

    /// Batch-convert a model and its clips to scene JSON
    Convert(ConvertArgs),
}
