//! Marketplace metadata assembly.

use crate::{
    config::CollectionConfig,
    types::{Metadata, TokenId, TraitPair},
};

/// Builds the metadata document for one token. Pure function of the
/// collection settings, token id, and attribute pairs.
#[derive(Debug, Clone)]
pub struct MetadataBuilder {
    collection: CollectionConfig,
}

impl MetadataBuilder {
    #[must_use]
    pub fn new(collection: CollectionConfig) -> Self {
        Self { collection }
    }

    /// Assembles the document. Attribute order is the selection draw
    /// order, carried through untouched.
    #[must_use]
    pub fn build(&self, token_id: TokenId, attributes: Vec<TraitPair>) -> Metadata {
        Metadata {
            description: self.collection.description.clone(),
            external_url: format!("{}/{token_id}", self.collection.external_url_base),
            image: format!("{}/{token_id}", self.collection.image_url_base),
            name: format!("{} #{token_id}", self.collection.name_prefix),
            attributes,
        }
    }
}
