//! Core type definitions: layers, trait options, bonding-curve parameters,
//! chain data, metadata, and the JSON-RPC envelope.
//!
//! The [`Layer`] ordering is load-bearing twice over: it is the compositing
//! stack order (back to front) and the trait draw order, and the draw order
//! feeds the shared random stream. Reordering variants changes every rendered
//! output, so `ALL` is treated as an invariant.

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

/// External token identifier; primary cache key.
pub type TokenId = u64;

/// Issuance period identifier; selects which rarity table applies.
pub type PeriodId = u64;

/// Reserved file name marking a trait option that contributes no layer.
pub const EMPTY_SENTINEL: &str = "EMPTY";

/// JSON-RPC protocol version constant to avoid repeated allocations.
pub const JSONRPC_VERSION: &str = "2.0";

/// One visual dimension of the artwork.
///
/// Declaration order defines both the compositing stack (back to front) and
/// the trait draw order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Layer {
    Background,
    QuadUpperLeft,
    QuadUpperRight,
    QuadLowerLeft,
    QuadLowerRight,
    Base,
    ToeGuards,
    Hat,
    Eyewear,
}

impl Layer {
    /// All layers in stacking/draw order.
    pub const ALL: [Layer; 9] = [
        Layer::Background,
        Layer::QuadUpperLeft,
        Layer::QuadUpperRight,
        Layer::QuadLowerLeft,
        Layer::QuadLowerRight,
        Layer::Base,
        Layer::ToeGuards,
        Layer::Hat,
        Layer::Eyewear,
    ];

    /// Asset directory name for this layer; also the key used in rarity
    /// table files.
    #[must_use]
    pub fn dir_name(&self) -> &'static str {
        match self {
            Layer::Background => "01_Background",
            Layer::QuadUpperLeft => "02_Quad_UL",
            Layer::QuadUpperRight => "03_Quad_UR",
            Layer::QuadLowerLeft => "04_Quad_DL",
            Layer::QuadLowerRight => "05_Quad_DR",
            Layer::Base => "06_Base",
            Layer::ToeGuards => "07_ToeGuards",
            Layer::Hat => "08_Hats",
            Layer::Eyewear => "09_Eyewears",
        }
    }

    /// Resolves a rarity-table key back to a layer.
    #[must_use]
    pub fn from_dir_name(name: &str) -> Option<Layer> {
        Layer::ALL.iter().copied().find(|l| l.dir_name() == name)
    }
}

/// One selectable option within a layer: a file reference and its base
/// rarity weight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraitOption {
    pub file: String,
    pub weight: f64,
}

impl TraitOption {
    /// Returns `true` if this option is the reserved no-layer sentinel.
    #[must_use]
    pub fn is_empty_sentinel(&self) -> bool {
        self.file == EMPTY_SENTINEL
    }
}

/// Economic parameters supplied per token by the bonding-curve contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BondingCurveParams {
    pub extra_mints: u64,
    pub curve_steepness: u64,
    pub max_rebate: u64,
}

impl BondingCurveParams {
    /// Scalar discount factor `d` applied as a power-law weight tilt.
    ///
    /// `d = (maxRebate × extraMints) / (extraMints + curveSteepness) / 100`,
    /// with the boundary case `extraMints = 0 ⇒ d = 0` regardless of the
    /// other parameters.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn discount(&self) -> f64 {
        if self.extra_mints == 0 {
            return 0.0;
        }
        (self.max_rebate as f64 * self.extra_mints as f64)
            / (self.extra_mints as f64 + self.curve_steepness as f64)
            / 100.0
    }
}

/// Everything the chain knows about a token that generation needs.
#[derive(Debug, Clone, PartialEq)]
pub struct TokenChainData {
    /// Whether the ownership query succeeded (a clean revert means "not
    /// minted", never a fetch failure).
    pub exists: bool,
    /// Canonical seed string (lowercase `0x`-prefixed hex, leading zeros
    /// stripped). Part of the determinism contract.
    pub seed: String,
    pub period: PeriodId,
    pub curve: BondingCurveParams,
}

/// The chosen option per layer for one token, in draw order. Immutable once
/// produced.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectedTraits {
    entries: Vec<(Layer, TraitOption)>,
}

impl SelectedTraits {
    #[must_use]
    pub fn new() -> Self {
        Self { entries: Vec::new() }
    }

    pub fn push(&mut self, layer: Layer, option: TraitOption) {
        self.entries.push((layer, option));
    }

    #[must_use]
    pub fn get(&self, layer: Layer) -> Option<&TraitOption> {
        self.entries.iter().find(|(l, _)| *l == layer).map(|(_, o)| o)
    }

    pub fn iter(&self) -> impl Iterator<Item = &(Layer, TraitOption)> {
        self.entries.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// One marketplace attribute, in selection order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraitPair {
    pub trait_type: String,
    pub value: String,
}

/// Marketplace-facing metadata. Field order matters: it is the serialized
/// JSON shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    pub description: String,
    pub external_url: String,
    pub image: String,
    pub name: String,
    pub attributes: Vec<TraitPair>,
}

/// The durable (image, metadata) pair for one token. `Bytes` keeps clones
/// cheap when one generation outcome fans out to many waiters.
#[derive(Debug, Clone, PartialEq)]
pub struct CachedArtifact {
    pub image: Bytes,
    pub metadata: Metadata,
}

/// JSON-RPC 2.0 request envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: Cow<'static, str>,
    pub method: Cow<'static, str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<serde_json::Value>,
    pub id: serde_json::Value,
}

impl JsonRpcRequest {
    #[must_use]
    pub fn new(
        method: &'static str,
        params: Option<serde_json::Value>,
        id: serde_json::Value,
    ) -> Self {
        Self {
            jsonrpc: Cow::Borrowed(JSONRPC_VERSION),
            method: Cow::Borrowed(method),
            params,
            id,
        }
    }
}

/// JSON-RPC 2.0 response envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
    pub id: serde_json::Value,
}

/// JSON-RPC 2.0 error object.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcError {
    pub code: i64,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}
