//! The fetch and enrichment pipelines.
//!
//! Both pipelines expose the same [`SpeciesProvider`] seam that request
//! handlers consume. [`SpeciesService`] fetches a species and enforces the
//! completeness contract; [`TranslatedSpeciesService`] runs that same fetch
//! and then rewrites the description on a best-effort basis.
//!
//! # Error discipline
//!
//! Fetch and validation failures propagate unchanged. The single place where
//! an error is deliberately absorbed is the translation call: a failed
//! rewrite degrades to the original description and the request still
//! succeeds.

use futures_util::future::BoxFuture;
use tracing::debug;

use crate::context::RequestContext;
use crate::error::{ServiceError, ServiceResult};
use crate::model::{Species, TranslationStyle};

/// Habitat name that forces the Yoda rewrite style.
const CAVE_HABITAT: &str = "cave";

/// Source of raw species data, implemented by the upstream gateway.
///
/// Implementations map their transport failures into the [`ServiceError`]
/// taxonomy and perform no completeness checks of their own; the fetch
/// pipeline owns the contract.
pub trait SpeciesSource: Send + Sync {
    /// Fetches the species with the given name.
    fn fetch<'a>(
        &'a self,
        ctx: &'a RequestContext,
        name: &'a str,
    ) -> BoxFuture<'a, ServiceResult<Species>>;
}

/// Text rewriting service, implemented by the translation gateway.
pub trait Translator: Send + Sync {
    /// Rewrites `text` in the given style.
    fn translate<'a>(
        &'a self,
        ctx: &'a RequestContext,
        style: TranslationStyle,
        text: &'a str,
    ) -> BoxFuture<'a, ServiceResult<String>>;
}

/// What request handlers consume: a name in, a complete species out.
pub trait SpeciesProvider: Send + Sync {
    /// Returns the species for `name`, validated and ready to serve.
    fn get<'a>(
        &'a self,
        ctx: &'a RequestContext,
        name: &'a str,
    ) -> BoxFuture<'a, ServiceResult<Species>>;
}

/// The fetch pipeline: fetch from the source, then gate on completeness.
///
/// This is the single checkpoint for the completeness contract. A species
/// that passes here is safe for every downstream consumer, which is why the
/// enrichment pipeline reads descriptions and flags without re-checking.
#[derive(Debug, Clone)]
pub struct SpeciesService<S> {
    source: S,
}

impl<S: SpeciesSource> SpeciesService<S> {
    /// Creates a fetch pipeline over the given source.
    pub fn new(source: S) -> Self {
        Self { source }
    }
}

impl<S: SpeciesSource> SpeciesProvider for SpeciesService<S> {
    fn get<'a>(
        &'a self,
        ctx: &'a RequestContext,
        name: &'a str,
    ) -> BoxFuture<'a, ServiceResult<Species>> {
        Box::pin(async move {
            let species = self.source.fetch(ctx, name).await?;
            validate(&species)?;
            Ok(species)
        })
    }
}

/// The enrichment pipeline: fetch, validate, then rewrite the description.
///
/// Translation is best-effort. A failed rewrite keeps the original
/// description and the request still succeeds; this is the only sanctioned
/// error absorption in the service.
#[derive(Debug, Clone)]
pub struct TranslatedSpeciesService<S, T> {
    fetcher: SpeciesService<S>,
    translator: T,
}

impl<S: SpeciesSource, T: Translator> TranslatedSpeciesService<S, T> {
    /// Creates an enrichment pipeline over the given source and translator.
    pub fn new(source: S, translator: T) -> Self {
        Self {
            fetcher: SpeciesService::new(source),
            translator,
        }
    }
}

impl<S: SpeciesSource, T: Translator> SpeciesProvider for TranslatedSpeciesService<S, T> {
    fn get<'a>(
        &'a self,
        ctx: &'a RequestContext,
        name: &'a str,
    ) -> BoxFuture<'a, ServiceResult<Species>> {
        Box::pin(async move {
            let mut species = self.fetcher.get(ctx, name).await?;

            let style = style_for(&species);
            match self
                .translator
                .translate(ctx, style, &species.description)
                .await
            {
                Ok(translated) => species.description = translated,
                Err(error) => {
                    debug!(
                        request_id = %ctx.request_id(),
                        species = %species.name,
                        %error,
                        "translation failed, serving original description"
                    );
                }
            }

            Ok(species)
        })
    }
}

/// Selects the rewrite style for a validated species.
///
/// Cave dwellers and legendaries get Yoda; everything else Shakespeare. The
/// decision reads only the habitat and the legendary flag, so it holds even
/// if more presentation rules grow around it.
#[must_use]
pub fn style_for(species: &Species) -> TranslationStyle {
    if species.habitat == CAVE_HABITAT || species.legendary.is_true() {
        TranslationStyle::Yoda
    } else {
        TranslationStyle::Shakespeare
    }
}

fn validate(species: &Species) -> ServiceResult<()> {
    if species.name.is_empty() {
        return Err(ServiceError::missing_data("name is empty"));
    }
    if species.description.is_empty() {
        return Err(ServiceError::missing_data("no english description"));
    }
    if species.habitat.is_empty() {
        return Err(ServiceError::missing_data("habitat is empty"));
    }
    if !species.legendary.is_known() {
        return Err(ServiceError::missing_data("legendary flag not reported"));
    }
    Ok(())
}
