//! bites server binary
//!
//! All logic is delegated to the CLI module.

use bites::cli::{run_command, Cli};

#[tokio::main]
async fn main() {
    if let Err(e) = run_command(Cli::parse_args()).await {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}
