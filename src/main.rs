//! secretsync - provision Azure credentials and publish them as GitHub secrets.

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use secretsync::cli::output;
use secretsync::cli::{execute, Cli};

fn main() {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_env("SECRETSYNC_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("secretsync=debug")
        } else {
            EnvFilter::new("secretsync=warn")
        }
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .without_time(),
        )
        .init();

    if let Err(e) = execute(cli.command) {
        output::error(&e.to_string());
        if let Some(hint) = e.hint() {
            output::hint(hint);
        }
        std::process::exit(e.exit_code());
    }
}
