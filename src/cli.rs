use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// assetplan - plan and build static assets
#[derive(Parser, Debug)]
#[command(name = "assetplan")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Config file (default: assetplan.toml or assetplan.json in the current directory)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Plan and write every asset into the output directory
    Build {
        /// Dry run - show what would be done
        #[arg(long)]
        dry_run: bool,
    },

    /// Show the planned operations and manifest without writing anything
    Plan {
        /// Machine-readable output
        #[arg(long)]
        json: bool,
    },

    /// Print an asset's dependencies in load order
    Deps {
        /// Asset name
        name: String,
    },
}
