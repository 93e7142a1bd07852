//! gotc: convert `go test -v` output into TeamCity service messages
//!
//! Typical use in a TeamCity build step:
//!
//! ```text
//! go test -v -race ./... 2>&1 | gotc --name "$(go env GOOS)"
//! ```

use clap::Parser;
use tracing::{error, info};

use gotc::config::Config;
use gotc::pipeline;

fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Logs go to stderr, stdout carries service messages
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(config.log_level().into()),
        )
        .init();

    if let Err(e) = config.validate() {
        error!("Invalid configuration: {e}");
        return Err(e.into());
    }

    info!("Starting gotc...");
    pipeline::run(&config)?;
    Ok(())
}
