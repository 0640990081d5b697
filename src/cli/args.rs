//! CLI argument definitions using clap
//!
//! Commands:
//! - devcamp start --config <path>
//! - devcamp query --config <path> --collection <name> --query <qs>

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// devcamp - bootcamp directory API server
#[derive(Parser, Debug)]
#[command(name = "devcamp")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Load seed data and serve the HTTP API
    Start {
        /// Path to configuration file
        #[arg(long, default_value = "./devcamp.json")]
        config: PathBuf,
    },

    /// Run one list query against the seeded store and print the result
    Query {
        /// Path to configuration file
        #[arg(long, default_value = "./devcamp.json")]
        config: PathBuf,

        /// Collection to query (bootcamps, courses, reviews, users)
        #[arg(long)]
        collection: String,

        /// Query string, e.g. "averageCost[lte]=10000&sort=-averageCost&page=2"
        #[arg(long, default_value = "")]
        query: String,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
