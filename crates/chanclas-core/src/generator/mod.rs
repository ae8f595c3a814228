//! The deterministic generation pipeline.
//!
//! [`Generator`] wires the pieces end to end for one token: load the
//! period's rarity table, select traits with the curve-adjusted weights,
//! render the composite, and assemble metadata. It performs no chain
//! access and no persistence; the artifact cache owns both sides of that.

pub mod compositor;
pub mod errors;
pub mod metadata;
pub mod names;
pub mod selector;

use std::sync::Arc;

pub use compositor::LayerCompositor;
pub use errors::GeneratorError;
pub use metadata::MetadataBuilder;
pub use selector::{Selection, TraitSelector};

use crate::{
    rarity::RarityLoader,
    types::{CachedArtifact, TokenChainData, TokenId},
};

/// End-to-end artwork and metadata generation for one token.
pub struct Generator {
    selector: TraitSelector,
    compositor: LayerCompositor,
    metadata: MetadataBuilder,
    rarity: Arc<RarityLoader>,
}

impl Generator {
    #[must_use]
    pub fn new(
        selector: TraitSelector,
        compositor: LayerCompositor,
        metadata: MetadataBuilder,
        rarity: Arc<RarityLoader>,
    ) -> Self {
        Self { selector, compositor, metadata, rarity }
    }

    /// Generates the artifact for a minted token.
    ///
    /// # Errors
    ///
    /// Returns [`GeneratorError`] if the rarity table cannot be loaded or
    /// rendering fails.
    pub fn generate(
        &self,
        token_id: TokenId,
        chain_data: &TokenChainData,
    ) -> Result<CachedArtifact, GeneratorError> {
        let table = self.rarity.load(chain_data.period)?;
        let d = chain_data.curve.discount();

        let selection = self.selector.select(token_id, &chain_data.seed, &table, d);
        tracing::debug!(
            token_id,
            period = chain_data.period,
            discount = d,
            layers = selection.traits.len(),
            "traits selected"
        );

        let image = self.compositor.render(&selection.traits)?;
        let metadata = self.metadata.build(token_id, selection.attributes);

        Ok(CachedArtifact { image, metadata })
    }
}
