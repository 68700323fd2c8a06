//! Core CLI definitions

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "skyplan")]
#[command(about = "Skyrim build planner URL tool", long_about = None)]
pub struct Cli {
    /// Reference data location: a directory or an http(s) base URL
    /// (uses configured default if not provided)
    #[arg(long, global = true, env = "SKYPLAN_DATA")]
    pub data: Option<String>,

    /// Increase log output (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Decode a planner URL and print the build
    #[command(visible_alias = "d")]
    Decode {
        /// Planner URL (or bare query string, e.g. "?b=AgEAAQ...")
        url: String,

        /// Print the imported build as JSON
        #[arg(long)]
        json: bool,
    },

    /// Encode a build (JSON file) as a planner URL
    #[command(visible_alias = "e")]
    Encode {
        /// Path to build JSON, or "-" for stdin
        build: PathBuf,

        /// Perk list name (e.g. "LoreRim v3.0.4")
        #[arg(short, long)]
        perk_list: String,

        /// Game mechanics name (e.g. "LoreRim")
        #[arg(short, long)]
        mechanics: String,

        /// Planner base URL (uses configured default if not provided)
        #[arg(long)]
        base_url: Option<String>,
    },

    /// Show the raw bytes of a planner URL's build code
    #[command(visible_alias = "i")]
    Inspect {
        /// Planner URL (or bare query string)
        url: String,
    },

    /// Configure default settings (`--data` sets the default data location)
    #[command(visible_alias = "c")]
    Configure {
        /// Set default planner base URL
        #[arg(long)]
        base_url: Option<String>,

        /// Show current configuration
        #[arg(long)]
        show: bool,
    },
}
