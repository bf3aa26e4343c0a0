//! Space Cadet CLI - explore the classes of a TypeScript project

mod cli;
mod table;

use clap::Parser;
use space_cadet::core::logging::init_logging;

fn main() {
    let cli_args = cli::Cli::parse();

    // Environment variables win over flags; logs go to stderr
    let (level, format) = cli_args.log_settings();
    if let Err(e) = init_logging(Some(level.as_str()), Some(format.as_str())) {
        eprintln!("Warning: Failed to initialize logging: {}", e);
    }

    let mut app = cli::SpaceCadetApp::new();

    if let Err(e) = app.run(cli_args) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
