use anyhow::Result;
use tracing_subscriber::EnvFilter;
use url_shortener::config::{self, Config};
use url_shortener::server;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let config = config::load_from_env()?;
    init_tracing(&config)?;
    config.print_summary();

    server::run(config).await
}

/// Installs the global subscriber with `RUST_LOG` filtering and the configured format.
fn init_tracing(config: &Config) -> Result<()> {
    let filter = EnvFilter::try_new(&config.log_level)?;

    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    if config.log_format == "json" {
        builder
            .json()
            .try_init()
            .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {e}"))?;
    } else {
        builder
            .try_init()
            .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {e}"))?;
    }

    Ok(())
}
