//! # Pokedex Core
//!
//! Domain model and species pipelines for the pokedex service.
//!
//! This crate holds the parts of the service that perform no I/O:
//!
//! - The [`Species`] entity and its tri-state [`Legendary`] flag
//! - The [`ServiceError`] taxonomy shared by every layer
//! - Request correlation ([`RequestId`], [`RequestContext`])
//! - The fetch and enrichment pipelines ([`SpeciesService`],
//!   [`TranslatedSpeciesService`]) and the trait seams they consume
//!
//! The pipelines are wired to concrete HTTP gateways by the service binary;
//! tests exercise them through in-memory implementations of
//! [`SpeciesSource`] and [`Translator`].

#![doc(html_root_url = "https://docs.rs/pokedex-core/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod context;
pub mod error;
pub mod model;
pub mod species;

pub use context::{RequestContext, RequestId};
pub use error::{ServiceError, ServiceResult};
pub use model::{Legendary, Species, TranslationStyle};
pub use species::{
    style_for, SpeciesProvider, SpeciesService, SpeciesSource, TranslatedSpeciesService, Translator,
};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
