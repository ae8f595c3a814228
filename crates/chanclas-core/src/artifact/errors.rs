use thiserror::Error;

use crate::{chain::ChainError, generator::GeneratorError, types::TokenId};

/// Errors from the artifact cache.
///
/// Cloneable: one generation outcome fans out to every caller waiting on
/// the same token.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ArtifactError {
    /// The chain reports no owner for this token.
    #[error("Token {0} is not minted")]
    NotMinted(TokenId),

    /// Chain data could not be fetched.
    #[error(transparent)]
    Chain(#[from] ChainError),

    /// Selection, compositing, or metadata assembly failed.
    #[error(transparent)]
    Generation(#[from] GeneratorError),

    /// Durable storage read or write failed.
    #[error("Storage error: {0}")]
    Storage(String),

    /// The shared generation task ended without producing an outcome.
    #[error("Generation aborted: {0}")]
    Aborted(String),
}

impl ArtifactError {
    /// Returns `true` when the condition is a property of the request
    /// rather than the service (drives a 404 instead of a 5xx).
    #[must_use]
    pub fn is_not_minted(&self) -> bool {
        matches!(self, Self::NotMinted(_))
    }

    /// Returns `true` when the chain could not be reached at all (drives
    /// a 503: retrying later may succeed).
    #[must_use]
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::Chain(ChainError::Unavailable { .. }))
    }
}
