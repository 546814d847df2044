use anyhow::Result;
use clap::Parser;
use cli::Cli;
use tracing_subscriber::EnvFilter;

mod app_config;
mod cli;

fn main() -> Result<()> {
    // Logs go to stderr so stdout carries only the final performance line.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("digit_identifier=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    Cli::parse().run()
}
