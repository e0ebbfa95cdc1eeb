//! Storefront intake server
//!
//! Configuration comes from `CONFIG_FILE` (YAML) overlaid with the `HOST`,
//! `PORT`, `ALLOWED_ORIGINS`, `DEBUG` and `DATA_DIR` environment variables.

use intake::prelude::*;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let config = ServerConfig::load()?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_filter()));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    tracing::info!(
        data_dir = %config.data_dir.display(),
        origins = ?config.allowed_origins,
        "starting storefront intake"
    );

    ServerBuilder::new(config).serve().await
}
