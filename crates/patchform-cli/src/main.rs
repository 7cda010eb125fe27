mod config;
mod pipeline;
mod report;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::config::Config;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
    tracing::info!("patchform v{}", env!("CARGO_PKG_VERSION"));

    let config = Config::parse();
    pipeline::run(&config, report::open_in_browser).await?;
    Ok(())
}
