//! Deterministic trait selection.
//!
//! One private ChaCha20 stream is seeded per token from the SHA-256 of the
//! concatenated token id, chain seed, and process-wide secret salt. The
//! concatenation is order-sensitive so distinct `(tokenId, seed)` pairs
//! practically never collide. Every draw consumes stream state, which
//! makes the fixed layer iteration order part of the determinism contract:
//! skipping or reordering a draw changes every draw after it.
//!
//! Selection rules beyond plain weighted sampling:
//! - The `Base` pick is mirrored verbatim into `ToeGuards`; the guards
//!   never draw independently.
//! - An `EMPTY` pick on `Hat` or `Eyewear` omits that layer from the
//!   output, but the draw itself still consumed stream state.
//! - An `Astronaut` hat skips the `Eyewear` draw entirely.

use rand::Rng;
use rand_chacha::{rand_core::SeedableRng, ChaCha20Rng};
use sha2::{Digest, Sha256};

use crate::{
    generator::names,
    rarity::RarityTable,
    types::{Layer, SelectedTraits, TokenId, TraitOption, TraitPair},
};

/// Hat value that suppresses the eyewear draw.
const ASTRONAUT: &str = "Astronaut";

/// Selection output: the per-layer picks plus the attribute pairs in draw
/// order, ready for the metadata builder.
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    pub traits: SelectedTraits,
    pub attributes: Vec<TraitPair>,
}

/// Deterministic weighted trait selector.
#[derive(Debug, Clone)]
pub struct TraitSelector {
    secret_salt: String,
}

impl TraitSelector {
    #[must_use]
    pub fn new(secret_salt: impl Into<String>) -> Self {
        Self { secret_salt: secret_salt.into() }
    }

    /// Power-law weight tilt: `weight^(-d)` for positive weights, else 0.
    ///
    /// For d > 0 this disproportionately boosts sub-1.0 weights, which is
    /// the intended rarity reward for bonding-curve participation.
    #[must_use]
    pub fn adjusted_weight(weight: f64, d: f64) -> f64 {
        if weight > 0.0 {
            weight.powf(-d)
        } else {
            0.0
        }
    }

    fn stream_for(&self, token_id: TokenId, seed: &str) -> ChaCha20Rng {
        let mut hasher = Sha256::new();
        hasher.update(token_id.to_string().as_bytes());
        hasher.update(seed.as_bytes());
        hasher.update(self.secret_salt.as_bytes());
        ChaCha20Rng::from_seed(hasher.finalize().into())
    }

    /// Draws one option by cumulative weighted sampling. Consumes exactly
    /// one value from the stream; returns `None` when no option carries
    /// positive adjusted weight.
    fn draw<'t>(
        rng: &mut ChaCha20Rng,
        options: &'t [TraitOption],
        d: f64,
    ) -> Option<&'t TraitOption> {
        let weights: Vec<f64> =
            options.iter().map(|o| Self::adjusted_weight(o.weight, d)).collect();
        let total: f64 = weights.iter().sum();
        if total <= 0.0 {
            return None;
        }

        let roll = rng.random_range(0.0..total);
        let mut cumulative = 0.0;
        for (option, weight) in options.iter().zip(&weights) {
            cumulative += weight;
            if roll < cumulative {
                return Some(option);
            }
        }
        // Floating-point edge: roll landed on the upper bound.
        options.last()
    }

    /// Selects one option per layer for a token.
    ///
    /// Pure function of its inputs and the immutable table: equal inputs
    /// yield an identical [`Selection`] across runs and restarts.
    #[must_use]
    pub fn select(
        &self,
        token_id: TokenId,
        seed: &str,
        table: &RarityTable,
        d: f64,
    ) -> Selection {
        let mut rng = self.stream_for(token_id, seed);
        let mut traits = SelectedTraits::new();
        let mut attributes = Vec::new();
        let mut astronaut_hat = false;

        let push =
            |traits: &mut SelectedTraits, attrs: &mut Vec<TraitPair>, layer: Layer, option: &TraitOption| {
                traits.push(layer, option.clone());
                attrs.push(TraitPair {
                    trait_type: names::clean(layer.dir_name()),
                    value: names::clean(&option.file),
                });
            };

        for layer in Layer::ALL {
            match layer {
                Layer::ToeGuards => {
                    // Mirrors Base with no independent draw.
                    if let Some(base) = traits.get(Layer::Base).cloned() {
                        push(&mut traits, &mut attributes, layer, &base);
                    }
                }
                Layer::Eyewear if astronaut_hat => {
                    // No draw at all: the skip itself must be deterministic.
                }
                _ => {
                    let Some(options) = table.options(layer) else { continue };
                    let Some(option) = Self::draw(&mut rng, options, d) else { continue };

                    let omit_empty = matches!(layer, Layer::Hat | Layer::Eyewear)
                        && option.is_empty_sentinel();

                    if layer == Layer::Hat && names::clean(&option.file) == ASTRONAUT {
                        astronaut_hat = true;
                    }

                    if !omit_empty {
                        push(&mut traits, &mut attributes, layer, option);
                    }
                }
            }
        }

        Selection { traits, attributes }
    }
}
