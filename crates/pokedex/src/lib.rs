//! # Pokedex
//!
//! Aggregation service that serves pokemon species from an upstream data
//! API, optionally rewriting their descriptions through a translation API.
//!
//! ## Endpoints
//!
//! | Route | Behavior |
//! |---|---|
//! | `GET /api/pokemon/{name}` | Species as reported upstream |
//! | `GET /api/pokemon/translated/{name}` | Species with a themed description |
//! | `GET /health` | Liveness probe |
//!
//! The translated endpoint picks its style from the species itself: cave
//! dwellers and legendaries get Yoda, everything else Shakespeare. A failed
//! translation falls back to the original description rather than failing
//! the request.
//!
//! This crate is the thin assembly layer; the domain pipelines live in
//! `pokedex-core`, the HTTP gateways in `pokedex-clients`, and the server
//! lifecycle in `pokedex-server`.

#![doc(html_root_url = "https://docs.rs/pokedex/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod app;
pub mod config;

pub use config::{Config, ConfigError};

/// Service version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
