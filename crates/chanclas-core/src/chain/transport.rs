//! HTTP JSON-RPC transport.
//!
//! The [`RpcTransport`] trait is the seam between the rotation logic in
//! [`crate::chain::fetcher`] and the wire: production uses the
//! reqwest-backed [`HttpTransport`], tests substitute scripted transports
//! to exercise failover without a network.

use std::time::Duration;

use async_trait::async_trait;

use crate::{
    chain::errors::ChainError,
    types::{JsonRpcRequest, JsonRpcResponse},
};

/// Sends one JSON-RPC request to one endpoint URL.
#[async_trait]
pub trait RpcTransport: Send + Sync {
    /// Performs the request and returns the parsed response envelope.
    ///
    /// A JSON-RPC `error` member in the body is NOT an `Err` here; the
    /// caller classifies it. `Err` means the request never produced a
    /// parseable envelope.
    async fn call(
        &self,
        url: &str,
        request: &JsonRpcRequest,
    ) -> Result<JsonRpcResponse, ChainError>;
}

#[async_trait]
impl<T: RpcTransport + ?Sized> RpcTransport for std::sync::Arc<T> {
    async fn call(
        &self,
        url: &str,
        request: &JsonRpcRequest,
    ) -> Result<JsonRpcResponse, ChainError> {
        (**self).call(url, request).await
    }
}

/// Production transport over a shared reqwest client.
///
/// Connection pooling and keepalive are tuned for a small set of
/// long-lived endpoint URLs that are hit repeatedly.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// Creates a transport with the given per-request timeout.
    ///
    /// # Errors
    ///
    /// Returns [`ChainError::ConnectionFailed`] if the underlying client
    /// cannot be constructed.
    pub fn new(request_timeout: Duration) -> Result<Self, ChainError> {
        let client = reqwest::Client::builder()
            .timeout(request_timeout)
            .connect_timeout(Duration::from_secs(5))
            .pool_idle_timeout(Duration::from_secs(90))
            .pool_max_idle_per_host(8)
            .tcp_keepalive(Duration::from_secs(60))
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|e| ChainError::ConnectionFailed(format!("client build failed: {e}")))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl RpcTransport for HttpTransport {
    async fn call(
        &self,
        url: &str,
        request: &JsonRpcRequest,
    ) -> Result<JsonRpcResponse, ChainError> {
        let response = self.client.post(url).json(request).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ChainError::Http(status.as_u16(), body));
        }

        response
            .json::<JsonRpcResponse>()
            .await
            .map_err(|e| ChainError::InvalidResponse(format!("malformed JSON-RPC body: {e}")))
    }
}
