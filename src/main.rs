use attend::cli::commands::Cli;
use attend::cli::handlers;
use attend::io::{logging, paths};
use clap::Parser;

fn main() {
    let cli = Cli::parse();

    let log_path = paths::default_log_path();
    if let Err(e) = logging::init_logging(&log_path) {
        eprintln!("warning: could not open log file {}: {}", log_path.display(), e);
    }

    if let Err(e) = handlers::dispatch(cli) {
        tracing::error!(error = %e, "command failed");
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}
