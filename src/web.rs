#![cfg(not(tarpaulin_include))]

use cart::{app, config::Config};

/// Main entry point for the web application
///
/// Initialises logging (`RUST_LOG`, default `info`), reads the server
/// settings from the environment and serves the catalog and bill API until
/// interrupted.
///
/// # Returns
/// * `Result<(), Box<dyn std::error::Error>>` - Success or error object
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::load();
    log::info!(
        "Starting {} with catalog at {}",
        config.shop_name,
        config.catalog_path.display()
    );

    app::run(config).await
}
