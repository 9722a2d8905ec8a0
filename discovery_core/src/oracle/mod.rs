//! Oracle contract - the external service that says what two items make.
//!
//! The engine only sees [`ResolutionOutcome`]. Transport, status, and decode
//! failures all collapse into [`ResolutionOutcome::Failed`] and are never
//! fatal to a run.

mod http;
#[cfg(test)]
pub(crate) mod scripted;

pub use http::*;

use thiserror::Error;

/// Why an oracle call produced no usable answer.
#[derive(Debug, Error)]
pub enum OracleError {
    /// The request never completed.
    #[error("transport error: {0}")]
    Transport(#[source] reqwest::Error),

    /// The oracle answered with a non-success status.
    #[error("oracle returned status {status}")]
    Protocol { status: u16 },

    /// The response body was not the expected JSON document.
    #[error("malformed oracle response: {0}")]
    Decode(#[source] serde_json::Error),
}

/// Result of asking the oracle about one pair.
#[derive(Debug)]
pub enum ResolutionOutcome {
    /// The pair combines into `result`.
    Found { result: String, glyph: String },
    /// Valid pair with no crafting result.
    Empty,
    /// The call failed; the pair may be retried later.
    Failed(OracleError),
}

impl ResolutionOutcome {
    pub fn found(result: impl Into<String>, glyph: impl Into<String>) -> Self {
        Self::Found {
            result: result.into(),
            glyph: glyph.into(),
        }
    }
}

/// Something that can combine two items.
///
/// Implementations must not touch engine state; the engine applies the
/// outcome itself.
pub trait Oracle {
    fn resolve(&mut self, first: &str, second: &str) -> ResolutionOutcome;
}
