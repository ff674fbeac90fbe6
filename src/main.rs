//! Budget allocation HTTP server.
//!
//! Reads the configuration directory from `ALLOCATION_CONFIG_DIR`
//! (default `./config/default`) and serves the allocation API on the
//! configured bind address.

use std::env;
use std::error::Error;

use budget_allocation::api::{AppState, create_router};
use budget_allocation::config::ConfigLoader;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_CONFIG_DIR: &str = "./config/default";

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config_dir = env::var("ALLOCATION_CONFIG_DIR").unwrap_or_else(|_| DEFAULT_CONFIG_DIR.into());
    let config = ConfigLoader::load(&config_dir)?;
    let bind_address = config.server().bind_address.clone();

    info!(
        config_dir = %config_dir,
        engine = %config.metadata().name,
        version = %config.metadata().version,
        departments = config.departments().len(),
        "Configuration loaded"
    );

    let router = create_router(AppState::new(config));
    let listener = TcpListener::bind(&bind_address).await?;
    info!(address = %bind_address, "Allocation server listening");

    axum::serve(listener, router).await?;
    Ok(())
}
