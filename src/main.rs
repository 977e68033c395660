use clap::Parser;

use lngraph::cli::{run, Cli};
use lngraph::observability::init_logging;

fn main() {
    init_logging();
    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        tracing::error!(error = %e, "Command failed");
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
