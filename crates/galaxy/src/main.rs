//! `galaxy-party` server binary.
//!
//! # Usage
//!
//! ```bash
//! galaxy-party                      # 0.0.0.0:3000
//! PORT=8080 galaxy-party            # 0.0.0.0:8080
//! galaxy-party --bind 127.0.0.1:4000
//! ```

use clap::Parser;
use galaxy::prelude::*;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = ServerArgs::parse();
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));
    tracing_subscriber::registry().with(fmt::layer()).with(filter).init();

    let config = ServerConfig::from(&args);
    let server = GalaxyServerBuilder::from_config(config).build().await?;
    tracing::info!(addr = %server.local_addr()?, "galaxy-party listening");

    tokio::select! {
        result = server.run() => result?,
        _ = tokio::signal::ctrl_c() => tracing::info!("shutting down"),
    }
    Ok(())
}
