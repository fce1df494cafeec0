//! # Pokedex Clients
//!
//! Outbound HTTP gateways for the pokedex service: the upstream species
//! data API and the text translation API. Both clients map transport
//! failures into the shared [`ServiceError`](pokedex_core::ServiceError)
//! taxonomy and implement the pipeline seams defined in `pokedex-core`, so
//! the pipelines never see a raw transport error.

#![doc(html_root_url = "https://docs.rs/pokedex-clients/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod pokeapi;
pub mod translation;

pub use pokeapi::PokeApiClient;
pub use translation::TranslationClient;
