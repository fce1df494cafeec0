//! Pokedex service entry point.

use tracing::{error, info};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use pokedex::config::Config;
use pokedex_server::ShutdownSignal;

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "pokedex=info,pokedex_server=info,pokedex_clients=info,pokedex_core=info,warn"
                    .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("invalid configuration: {}", e);
            std::process::exit(1);
        }
    };

    info!("starting pokedex v{}", pokedex::VERSION);
    info!("listen address: {}", config.addr);
    info!("pokemon api: {}", config.pokemon_api_url);
    info!("translation api: {}", config.translation_api_url);

    if let Err(e) = pokedex::app::run(config, ShutdownSignal::new()).await {
        error!("server error: {}", e);
        std::process::exit(1);
    }
}
