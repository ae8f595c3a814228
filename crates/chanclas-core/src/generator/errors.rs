use thiserror::Error;

use crate::rarity::RarityError;

/// Errors from the generation pipeline (selection, compositing, metadata).
///
/// Cloneable so one failed generation can be reported to every waiter.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum GeneratorError {
    /// A selected asset file does not exist under the layers root. Always
    /// a data-integrity problem in the rarity table, never tolerated
    /// silently.
    #[error("Missing layer asset: {path}")]
    MissingAsset { path: String },

    /// Selection produced no drawable layers.
    #[error("Selection produced an empty composite")]
    EmptyComposite,

    /// Image decode, compose, or encode failure.
    #[error("Image processing failed: {0}")]
    Image(String),

    /// The period's rarity table could not be loaded.
    #[error(transparent)]
    Rarity(#[from] RarityError),
}
