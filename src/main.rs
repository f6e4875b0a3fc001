pub mod api;
pub mod auth;
pub mod billing;
pub mod cases;
pub mod config;
pub mod models;
pub mod store;

use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    tracing::info!("Starting Fortuna Legal backend...");

    let config = config::Config::from_env();
    api::server::start_server(config).await;
}
