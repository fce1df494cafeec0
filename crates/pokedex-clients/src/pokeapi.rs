//! Client for the upstream species data API.
//!
//! Speaks `GET {base}/api/v2/pokemon-species/{name}` and decodes the reply
//! into the domain [`Species`]. The wire payload is decoded leniently: any
//! missing field becomes its empty value, and judging completeness is left
//! to the fetch pipeline. Only malformed JSON is an error here.

use std::time::Duration;

use anyhow::Context as _;
use futures_util::future::BoxFuture;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::debug;

use pokedex_core::{
    Legendary, RequestContext, ServiceError, ServiceResult, Species, SpeciesSource,
};

/// Total budget for one upstream call, connect included.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Budget for establishing the TCP connection alone.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Idle connections kept per upstream host.
const MAX_IDLE_PER_HOST: usize = 100;

/// Client for the species endpoint of the upstream data API.
///
/// Cheap to clone; clones share the underlying connection pool.
#[derive(Debug, Clone)]
pub struct PokeApiClient {
    client: Client,
    base_url: String,
}

impl PokeApiClient {
    /// Creates a client for the API at `base_url`.
    ///
    /// # Errors
    ///
    /// Fails when `base_url` is empty or the HTTP client cannot be built.
    pub fn new(base_url: impl Into<String>) -> anyhow::Result<Self> {
        let base_url = base_url.into();
        if base_url.is_empty() {
            anyhow::bail!("pokemon api base url is empty");
        }

        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .connect_timeout(CONNECT_TIMEOUT)
            .pool_max_idle_per_host(MAX_IDLE_PER_HOST)
            .build()
            .context("failed to build pokemon api client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn fetch_species(&self, ctx: &RequestContext, name: &str) -> ServiceResult<Species> {
        let url = format!("{}/api/v2/pokemon-species/{name}", self.base_url);

        let response = self.client.get(&url).send().await.map_err(|e| {
            ServiceError::unavailable_with_source("pokemon api request failed", e)
        })?;

        match response.status() {
            StatusCode::OK => {}
            StatusCode::NOT_FOUND => return Err(ServiceError::not_found(name)),
            status => {
                return Err(ServiceError::unavailable(format!(
                    "pokemon api answered with status {status}"
                )));
            }
        }

        let payload: SpeciesPayload = response.json().await.map_err(|e| {
            ServiceError::unavailable_with_source("pokemon api payload is malformed", e)
        })?;

        debug!(
            request_id = %ctx.request_id(),
            species = %payload.name,
            "fetched species payload"
        );

        Ok(payload.into_species())
    }
}

impl SpeciesSource for PokeApiClient {
    fn fetch<'a>(
        &'a self,
        ctx: &'a RequestContext,
        name: &'a str,
    ) -> BoxFuture<'a, ServiceResult<Species>> {
        Box::pin(self.fetch_species(ctx, name))
    }
}

/// Wire shape of `GET /api/v2/pokemon-species/{name}`.
#[derive(Debug, Deserialize)]
struct SpeciesPayload {
    #[serde(default)]
    name: String,
    #[serde(default)]
    habitat: Option<String>,
    #[serde(default)]
    is_legendary: Option<bool>,
    #[serde(default)]
    flavor_text_entries: Vec<FlavorTextEntry>,
}

#[derive(Debug, Deserialize)]
struct FlavorTextEntry {
    #[serde(default)]
    flavor_text: String,
    #[serde(default)]
    language: LanguageRef,
}

#[derive(Debug, Default, Deserialize)]
struct LanguageRef {
    #[serde(default)]
    name: String,
}

impl SpeciesPayload {
    fn into_species(self) -> Species {
        let description = english_description(&self.flavor_text_entries);
        Species {
            name: self.name,
            description,
            habitat: self.habitat.unwrap_or_default(),
            legendary: Legendary::from_flag(self.is_legendary),
        }
    }
}

/// Picks the first English flavor text, or empty when there is none.
fn english_description(entries: &[FlavorTextEntry]) -> String {
    entries
        .iter()
        .find(|entry| entry.language.name.eq_ignore_ascii_case("en"))
        .map(|entry| entry.flavor_text.clone())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn species_body(name: &str) -> serde_json::Value {
        json!({
            "id": 150,
            "name": name,
            "habitat": "rare",
            "is_legendary": true,
            "flavor_text_entries": [
                {
                    "flavor_text": "Ein Pokemon, dessen Gencode manipuliert wurde.",
                    "language": { "name": "de", "url": "https://pokeapi.co/api/v2/language/6/" }
                },
                {
                    "flavor_text": "It was created by a scientist.",
                    "language": { "name": "en", "url": "https://pokeapi.co/api/v2/language/9/" }
                }
            ]
        })
    }

    #[tokio::test]
    async fn test_fetch_decodes_species() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v2/pokemon-species/mewtwo"))
            .respond_with(ResponseTemplate::new(200).set_body_json(species_body("mewtwo")))
            .mount(&server)
            .await;

        let client = PokeApiClient::new(server.uri()).unwrap();
        let ctx = RequestContext::new();
        let species = client.fetch(&ctx, "mewtwo").await.unwrap();

        assert_eq!(species.name, "mewtwo");
        assert_eq!(species.habitat, "rare");
        assert_eq!(species.legendary, Legendary::True);
        assert_eq!(species.description, "It was created by a scientist.");
    }

    #[tokio::test]
    async fn test_fetch_matches_language_case_insensitively() {
        let server = MockServer::start().await;
        let body = json!({
            "name": "onix",
            "habitat": "cave",
            "is_legendary": false,
            "flavor_text_entries": [
                { "flavor_text": "As it grows, it turns harder.", "language": { "name": "EN" } }
            ]
        });
        Mock::given(method("GET"))
            .and(path("/api/v2/pokemon-species/onix"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&server)
            .await;

        let client = PokeApiClient::new(server.uri()).unwrap();
        let ctx = RequestContext::new();
        let species = client.fetch(&ctx, "onix").await.unwrap();

        assert_eq!(species.description, "As it grows, it turns harder.");
    }

    #[tokio::test]
    async fn test_fetch_maps_404_to_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v2/pokemon-species/agumon"))
            .respond_with(ResponseTemplate::new(404).set_body_string("Not Found"))
            .mount(&server)
            .await;

        let client = PokeApiClient::new(server.uri()).unwrap();
        let ctx = RequestContext::new();
        let err = client.fetch(&ctx, "agumon").await.unwrap_err();

        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_fetch_maps_server_error_to_unavailable() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v2/pokemon-species/mewtwo"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let client = PokeApiClient::new(server.uri()).unwrap();
        let ctx = RequestContext::new();
        let err = client.fetch(&ctx, "mewtwo").await.unwrap_err();

        assert!(err.is_unavailable());
        assert!(err.to_string().contains("503"));
    }

    #[tokio::test]
    async fn test_fetch_maps_malformed_payload_to_unavailable() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v2/pokemon-species/mewtwo"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json at all"))
            .mount(&server)
            .await;

        let client = PokeApiClient::new(server.uri()).unwrap();
        let ctx = RequestContext::new();
        let err = client.fetch(&ctx, "mewtwo").await.unwrap_err();

        assert!(err.is_unavailable());
    }

    #[tokio::test]
    async fn test_fetch_decodes_sparse_payload_without_error() {
        let server = MockServer::start().await;
        // No legendary flag, no habitat, no flavor texts. Decoding succeeds;
        // the fetch pipeline is the one that rejects the result.
        let body = json!({ "name": "missingno", "habitat": null });
        Mock::given(method("GET"))
            .and(path("/api/v2/pokemon-species/missingno"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&server)
            .await;

        let client = PokeApiClient::new(server.uri()).unwrap();
        let ctx = RequestContext::new();
        let species = client.fetch(&ctx, "missingno").await.unwrap();

        assert_eq!(species.name, "missingno");
        assert_eq!(species.habitat, "");
        assert_eq!(species.legendary, Legendary::Unknown);
        assert_eq!(species.description, "");
    }

    #[tokio::test]
    async fn test_fetch_skips_entries_without_english() {
        let server = MockServer::start().await;
        let body = json!({
            "name": "mew",
            "habitat": "rare",
            "is_legendary": true,
            "flavor_text_entries": [
                { "flavor_text": "Seine DNS soll die Gene aller Pokemon enthalten.", "language": { "name": "de" } }
            ]
        });
        Mock::given(method("GET"))
            .and(path("/api/v2/pokemon-species/mew"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&server)
            .await;

        let client = PokeApiClient::new(server.uri()).unwrap();
        let ctx = RequestContext::new();
        let species = client.fetch(&ctx, "mew").await.unwrap();

        assert_eq!(species.description, "");
    }

    #[test]
    fn test_new_rejects_empty_base_url() {
        assert!(PokeApiClient::new("").is_err());
    }

    #[test]
    fn test_new_trims_trailing_slash() {
        let client = PokeApiClient::new("http://localhost:9090/").unwrap();
        assert_eq!(client.base_url, "http://localhost:9090");
    }
}
