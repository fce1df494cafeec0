//! Domain model for pokemon species.
//!
//! The model mirrors what the upstream data API exposes, with one deliberate
//! difference: the legendary flag is the three-valued [`Legendary`] enum
//! rather than an optional boolean, so "the upstream did not say" can never
//! be confused with "not legendary".

/// Tri-state legendary flag for a species.
///
/// Upstream payloads may omit the flag entirely. That absence is meaningful:
/// a species with an unreported flag is incomplete and must not be served,
/// while a species that is known not to be legendary is perfectly valid.
///
/// # Example
///
/// ```rust
/// use pokedex_core::Legendary;
///
/// assert_eq!(Legendary::from_flag(None), Legendary::Unknown);
/// assert_eq!(Legendary::from_flag(Some(true)), Legendary::True);
/// assert!(!Legendary::Unknown.is_known());
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Legendary {
    /// The upstream payload did not carry the flag.
    #[default]
    Unknown,
    /// The species is legendary.
    True,
    /// The species is not legendary.
    False,
}

impl Legendary {
    /// Decodes the wire representation, an optional boolean.
    #[must_use]
    pub const fn from_flag(flag: Option<bool>) -> Self {
        match flag {
            None => Self::Unknown,
            Some(true) => Self::True,
            Some(false) => Self::False,
        }
    }

    /// Returns `true` only when the species is known to be legendary.
    #[must_use]
    pub const fn is_true(self) -> bool {
        matches!(self, Self::True)
    }

    /// Returns `true` when the upstream actually reported the flag.
    #[must_use]
    pub const fn is_known(self) -> bool {
        !matches!(self, Self::Unknown)
    }
}

impl From<Option<bool>> for Legendary {
    fn from(flag: Option<bool>) -> Self {
        Self::from_flag(flag)
    }
}

/// A pokemon species as served by this API.
///
/// Instances are built fresh from an upstream response for every request and
/// never cached. After the fetch pipeline validates one, the only mutation it
/// undergoes is the description substitution performed by the enrichment
/// pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Species {
    /// Canonical species name.
    pub name: String,
    /// English flavor-text description. Empty when the upstream had no
    /// English entry; the fetch pipeline rejects that as incomplete.
    pub description: String,
    /// Habitat name as reported upstream.
    pub habitat: String,
    /// Legendary flag, tri-state.
    pub legendary: Legendary,
}

/// Rewrite style applied by the enrichment pipeline.
///
/// The style is derived from a validated species, never from request input,
/// so an unsupported style cannot occur at this level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TranslationStyle {
    /// Yoda-style rewrite, used for cave dwellers and legendaries.
    Yoda,
    /// Shakespearean rewrite, used for everything else.
    Shakespeare,
}
