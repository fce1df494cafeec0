//! Application assembly.
//!
//! Wires the concrete gateways into the pipelines, the pipelines into the
//! handler set, and the handler set into the server. Nothing here has logic
//! of its own; every seam is constructor injection so tests can assemble
//! the same stack against mock upstreams.

use std::sync::Arc;

use tracing::info;

use pokedex_clients::{PokeApiClient, TranslationClient};
use pokedex_core::{SpeciesProvider, SpeciesService, TranslatedSpeciesService};
use pokedex_server::{PokedexApi, Server, ServerConfig, ShutdownSignal};

use crate::config::Config;

/// Builds every layer and runs the server until shutdown completes.
///
/// `shutdown` is the caller's handle for programmatic shutdown; OS signals
/// are watched independently by the server, so a plain deployment can pass
/// a signal it never fires.
///
/// # Errors
///
/// Fails when a gateway client cannot be built, when the listen address
/// cannot be bound, or when the server run itself fails.
pub async fn run(config: Config, shutdown: ShutdownSignal) -> anyhow::Result<()> {
    let pokeapi = PokeApiClient::new(config.pokemon_api_url.clone())?;
    let translation = TranslationClient::new(config.translation_api_url.clone())?;

    let species: Arc<dyn SpeciesProvider> = Arc::new(SpeciesService::new(pokeapi.clone()));
    let translated: Arc<dyn SpeciesProvider> =
        Arc::new(TranslatedSpeciesService::new(pokeapi, translation));

    let api = PokedexApi::new(species, translated);

    let server_config = ServerConfig::builder()
        .http_addr(config.addr.clone())
        .shutdown_timeout(config.shutdown_timeout)
        .build();

    let server = Server::bind(server_config, api)
        .await?
        .on_shutdown(|| info!("shutting down application"));

    server.run_with_shutdown(shutdown).await?;
    Ok(())
}
