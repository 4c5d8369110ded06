//! CLI argument definitions using clap

use clap::{Parser, Subcommand};

/// bites - a restaurant directory REST service
#[derive(Parser, Debug)]
#[command(name = "bites")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start the HTTP server
    Serve {
        /// Port to listen on (overrides the PORT environment variable)
        #[arg(long)]
        port: Option<u16>,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
