//! # Pokedex Server
//!
//! HTTP serving for the pokedex service:
//!
//! - Listener lifecycle with graceful drain ([`Server`])
//! - Shutdown coordination ([`ShutdownSignal`], [`ConnectionTracker`])
//! - Route matching ([`router::Route`]) and the species handlers
//! - The JSON response envelope ([`response`])
//!
//! A server is bound once, run once, and drained once; see the [`server`]
//! module docs for the full state walk-through.
//!
//! # Example
//!
//! ```rust,ignore
//! use pokedex_server::{PokedexApi, Server, ServerConfig, ShutdownSignal};
//!
//! let config = ServerConfig::builder().http_addr("0.0.0.0:8080").build();
//! let server = Server::bind(config, api).await?;
//! server.run_with_shutdown(ShutdownSignal::with_os_signals()).await?;
//! ```

#![doc(html_root_url = "https://docs.rs/pokedex-server/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod config;
pub mod error;
pub mod handlers;
pub mod health;
pub mod response;
pub mod router;
pub mod server;
pub mod shutdown;

pub use config::{ServerConfig, ServerConfigBuilder};
pub use error::{ServerError, ServerResult};
pub use handlers::{PokedexApi, SpeciesDto};
pub use server::{Server, REQUEST_ID_HEADER};
pub use shutdown::{ConnectionToken, ConnectionTracker, ShutdownSignal};
