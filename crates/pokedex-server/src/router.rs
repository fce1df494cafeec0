//! Route matching.
//!
//! Three routes exist, all `GET`. Matching is a pure function from method
//! and path to a [`Route`], so it can be tested without a socket.

use http::Method;

/// A matched route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// `GET /api/pokemon/{name}`: species as reported upstream.
    Species {
        /// The species name from the path. May be empty; the handler
        /// rejects that case.
        name: String,
    },
    /// `GET /api/pokemon/translated/{name}`: species with a themed
    /// description.
    TranslatedSpecies {
        /// The species name from the path. May be empty.
        name: String,
    },
    /// `GET /health`: liveness probe.
    Health,
}

impl Route {
    /// Matches a request line against the route table.
    ///
    /// Returns `None` for unknown paths, deeper nesting under a known
    /// prefix, and any method other than `GET`.
    #[must_use]
    pub fn match_request(method: &Method, path: &str) -> Option<Self> {
        if method != Method::GET {
            return None;
        }

        if path == "/health" {
            return Some(Self::Health);
        }

        // The translated prefix is longer, so it has to be tried first.
        if let Some(name) = path.strip_prefix("/api/pokemon/translated/") {
            return single_segment(name).map(|name| Self::TranslatedSpecies { name });
        }
        if let Some(name) = path.strip_prefix("/api/pokemon/") {
            return single_segment(name).map(|name| Self::Species { name });
        }

        None
    }
}

/// Accepts the remainder only when it is a single path segment.
fn single_segment(rest: &str) -> Option<String> {
    if rest.contains('/') {
        None
    } else {
        Some(rest.to_string())
    }
}
