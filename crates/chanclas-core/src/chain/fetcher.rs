//! Rotating chain-data fetcher.
//!
//! One logical fetch walks the endpoint pool round-robin, giving each
//! endpoint one attempt with exponential backoff between failures. Within
//! one endpoint attempt the sequence is: connectivity probe
//! (`eth_blockNumber`), ownership check (`ownerOf`), then the token data
//! query (`getTokenData`).
//!
//! A clean `ownerOf` revert is an answer — the token is not minted — and
//! ends the fetch immediately. Only transport-level failures rotate to the
//! next endpoint; exhausting the pool yields [`ChainError::Unavailable`].

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;

use crate::{
    chain::{
        abi,
        errors::ChainError,
        transport::RpcTransport,
    },
    types::{BondingCurveParams, JsonRpcRequest, TokenChainData, TokenId},
};

/// Resolves token existence and economic parameters from the chain.
///
/// The artifact cache consumes this trait rather than the concrete
/// fetcher so tests can script chain behavior.
#[async_trait]
pub trait ChainFetcher: Send + Sync {
    /// Fetches everything generation needs for one token.
    ///
    /// # Errors
    ///
    /// Returns [`ChainError::Unavailable`] when every endpoint in the
    /// rotation has been exhausted, or a permanent [`ChainError`] when an
    /// endpoint returned an answer that retrying cannot improve.
    async fn fetch_token_data(&self, token_id: TokenId) -> Result<TokenChainData, ChainError>;
}

/// Production fetcher over a rotating endpoint pool.
pub struct RotatingFetcher<T: RpcTransport> {
    transport: T,
    endpoints: Vec<String>,
    contract_address: String,
    backoff_base: Duration,
    cursor: AtomicUsize,
    request_id: AtomicU64,
}

impl<T: RpcTransport> RotatingFetcher<T> {
    /// Creates a fetcher over the given endpoint pool.
    ///
    /// # Errors
    ///
    /// Returns [`ChainError::InvalidResponse`] if the pool is empty; an
    /// empty rotation can never answer.
    pub fn new(
        transport: T,
        endpoints: Vec<String>,
        contract_address: String,
        backoff_base: Duration,
    ) -> Result<Self, ChainError> {
        if endpoints.is_empty() {
            return Err(ChainError::InvalidResponse(
                "endpoint pool cannot be empty".to_string(),
            ));
        }

        Ok(Self {
            transport,
            endpoints,
            contract_address,
            backoff_base,
            cursor: AtomicUsize::new(0),
            request_id: AtomicU64::new(1),
        })
    }

    fn next_request_id(&self) -> serde_json::Value {
        serde_json::Value::from(self.request_id.fetch_add(1, Ordering::Relaxed))
    }

    /// Cheap liveness probe before committing contract calls to an
    /// endpoint.
    async fn probe(&self, url: &str) -> Result<(), ChainError> {
        let request = JsonRpcRequest::new("eth_blockNumber", None, self.next_request_id());
        let response = self.transport.call(url, &request).await?;

        if let Some(error) = response.error {
            return Err(ChainError::Rpc(error.code, error.message));
        }
        if response.result.is_none() {
            return Err(ChainError::InvalidResponse(
                "probe response missing result".to_string(),
            ));
        }
        Ok(())
    }

    /// Performs one `eth_call` against the collection contract and returns
    /// the raw hex return data.
    async fn eth_call(
        &self,
        url: &str,
        signature: &str,
        token_id: TokenId,
    ) -> Result<String, ChainError> {
        let calldata = abi::encode_call(signature, token_id);
        let params = json!([
            { "to": self.contract_address, "data": calldata },
            "latest"
        ]);
        let request = JsonRpcRequest::new("eth_call", Some(params), self.next_request_id());
        let response = self.transport.call(url, &request).await?;

        if let Some(error) = response.error {
            return Err(ChainError::Rpc(error.code, error.message));
        }

        match response.result {
            Some(serde_json::Value::String(data)) => Ok(data),
            other => Err(ChainError::InvalidResponse(format!(
                "eth_call result was not a hex string: {other:?}"
            ))),
        }
    }

    async fn fetch_from_endpoint(
        &self,
        url: &str,
        token_id: TokenId,
    ) -> Result<TokenChainData, ChainError> {
        self.probe(url).await?;

        match self.eth_call(url, abi::OWNER_OF_SIG, token_id).await {
            Ok(_owner) => {}
            Err(e) if e.is_revert() => {
                tracing::debug!(token_id, "ownerOf reverted, token not minted");
                return Ok(TokenChainData {
                    exists: false,
                    seed: String::new(),
                    period: 0,
                    curve: BondingCurveParams::default(),
                });
            }
            Err(e) => return Err(e),
        }

        let data = self.eth_call(url, abi::GET_TOKEN_DATA_SIG, token_id).await?;
        let words = abi::decode_words(&data, abi::TOKEN_DATA_WORDS)?;

        Ok(TokenChainData {
            exists: true,
            seed: abi::canonical_seed(&words[0]),
            period: abi::word_to_u64(&words[1])?,
            curve: BondingCurveParams {
                extra_mints: abi::word_to_u64(&words[2])?,
                curve_steepness: abi::word_to_u64(&words[3])?,
                max_rebate: abi::word_to_u64(&words[4])?,
            },
        })
    }
}

#[async_trait]
impl<T: RpcTransport> ChainFetcher for RotatingFetcher<T> {
    async fn fetch_token_data(&self, token_id: TokenId) -> Result<TokenChainData, ChainError> {
        let pool_size = self.endpoints.len();

        for attempt in 0..pool_size {
            let index = self.cursor.fetch_add(1, Ordering::Relaxed) % pool_size;
            let url = &self.endpoints[index];

            tracing::trace!(token_id, endpoint = %url, attempt, "chain fetch attempt");

            match self.fetch_from_endpoint(url, token_id).await {
                Ok(data) => return Ok(data),
                Err(e) if e.is_transient() => {
                    tracing::warn!(
                        token_id,
                        endpoint = %url,
                        error = %e,
                        "endpoint attempt failed, rotating"
                    );
                    if attempt + 1 < pool_size {
                        let delay = self
                            .backoff_base
                            .saturating_mul(1u32 << attempt.min(6) as u32);
                        tokio::time::sleep(delay).await;
                    }
                }
                Err(e) => {
                    tracing::error!(token_id, endpoint = %url, error = %e, "chain fetch failed");
                    return Err(e);
                }
            }
        }

        Err(ChainError::Unavailable { attempted: pool_size })
    }
}
