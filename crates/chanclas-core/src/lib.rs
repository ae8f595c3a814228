//! # Chanclas Core
//!
//! Core library for the Chanclas deterministic artwork service.
//!
//! Given a token identifier, this crate derives a generative artwork and its
//! marketplace metadata from on-chain state, then persists the pair so that
//! repeated requests are served from disk without recomputation.
//!
//! - **[`chain`]**: Read-only chain access over a rotating pool of JSON-RPC
//!   endpoints with connectivity probing, exponential backoff, and an explicit
//!   minted / not-minted / unavailable error split.
//!
//! - **[`rarity`]**: Per-issuance-period rarity tables (layer → weighted trait
//!   options), loaded once per period and memoized for the process lifetime.
//!
//! - **[`generator`]**: The deterministic pipeline — seeded trait selection
//!   with a bonding-curve weight tilt, alpha-over layer compositing, and
//!   metadata assembly.
//!
//! - **[`artifact`]**: The orchestrator — content-addressed artifact cache
//!   with generate-on-miss, at-most-one-concurrent-generation-per-token
//!   deduplication, and atomic on-disk persistence.
//!
//! - **[`config`]**: Layered TOML + environment configuration.
//!
//! ## Request Flow
//!
//! ```text
//! get_or_generate(token_id)
//!       │
//!       ▼
//! ┌─────────────┐
//! │ Disk Check  │ ─── Hit ──► Cached (image, metadata)
//! └──────┬──────┘
//!        │ Miss
//!        ▼
//! ┌──────────────────┐
//! │ Inflight Registry│ ─── Occupied ──► await shared outcome
//! └────────┬─────────┘
//!          │ First caller (spawns detached task)
//!          ▼
//! ┌──────────────────┐
//! │ ChainDataFetcher │ ─── not minted ──► NotMinted
//! └────────┬─────────┘
//!          ▼
//! ┌──────────────────┐
//! │  TraitSelector   │  (seeded ChaCha20 stream, curve-adjusted weights)
//! └────────┬─────────┘
//!     ┌────┴─────┐
//!     ▼          ▼
//! Compositor  MetadataBuilder
//!     └────┬─────┘
//!          ▼
//! ┌──────────────────┐
//! │ Atomic Persist   │  (temp + rename, image before metadata)
//! └────────┬─────────┘
//!          ▼
//!   Outcome to all waiters
//! ```
//!
//! The central contract is determinism: for a fixed token id, chain seed,
//! rarity table, and bonding-curve parameters, the selected traits — and
//! therefore the rendered bytes and metadata — are bit-for-bit reproducible
//! across runs and process restarts.

pub mod artifact;
pub mod chain;
pub mod config;
pub mod generator;
pub mod rarity;
pub mod types;
