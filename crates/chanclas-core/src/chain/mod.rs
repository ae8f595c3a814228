//! Read-only chain access.
//!
//! The service needs two facts from the chain per token: whether it is
//! minted, and the generation inputs `(seed, period, bonding-curve
//! parameters)`. Both come from `eth_call` against the collection contract
//! over a rotating pool of JSON-RPC endpoints.

pub mod abi;
pub mod errors;
pub mod fetcher;
pub mod transport;

pub use errors::ChainError;
pub use fetcher::{ChainFetcher, RotatingFetcher};
pub use transport::{HttpTransport, RpcTransport};
