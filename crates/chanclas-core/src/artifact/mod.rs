//! Content-addressed artifact cache with generate-on-miss.
//!
//! The cache is the orchestrator: disk check, chain fetch, generation,
//! persistence. Two properties it must hold under concurrency:
//!
//! - **Per-token singleflight.** At most one generation per token is in
//!   flight; callers arriving during it wait for and share that outcome.
//!   Distinct tokens proceed fully in parallel.
//! - **Cancellation isolation.** Generation runs in a detached task and a
//!   watch channel fans the outcome out, so a caller abandoning its
//!   request never cancels the generation other waiters depend on.
//!
//! A disk hit answers without any chain query: present data is served
//! as-is rather than re-validated against mint status.

pub mod errors;
pub mod store;

use std::sync::Arc;

use dashmap::{mapref::entry::Entry, DashMap};
use tokio::sync::watch;

pub use errors::ArtifactError;
pub use store::ArtifactStore;

use crate::{
    chain::ChainFetcher,
    generator::Generator,
    types::{CachedArtifact, TokenId},
};

type Outcome = Result<Arc<CachedArtifact>, ArtifactError>;
type OutcomeReceiver = watch::Receiver<Option<Outcome>>;

/// The artifact cache.
pub struct ArtifactCache {
    store: Arc<ArtifactStore>,
    fetcher: Arc<dyn ChainFetcher>,
    generator: Arc<Generator>,
    inflight: Arc<DashMap<TokenId, OutcomeReceiver>>,
}

impl ArtifactCache {
    #[must_use]
    pub fn new(
        store: ArtifactStore,
        fetcher: Arc<dyn ChainFetcher>,
        generator: Generator,
    ) -> Self {
        Self {
            store: Arc::new(store),
            fetcher,
            generator: Arc::new(generator),
            inflight: Arc::new(DashMap::new()),
        }
    }

    /// Returns the cached artifact for a token, generating it on a miss.
    ///
    /// # Errors
    ///
    /// Returns [`ArtifactError::NotMinted`] for unowned tokens,
    /// [`ArtifactError::Chain`] when the chain cannot answer, or a
    /// generation/storage error.
    pub async fn get_or_generate(&self, token_id: TokenId) -> Outcome {
        if let Some(artifact) = self.store.read(token_id).await? {
            tracing::trace!(token_id, "artifact cache hit");
            return Ok(Arc::new(artifact));
        }

        loop {
            let receiver = match self.inflight.entry(token_id) {
                Entry::Occupied(occupied) => occupied.get().clone(),
                Entry::Vacant(vacant) => {
                    let (sender, receiver) = watch::channel(None);
                    vacant.insert(receiver.clone());
                    self.spawn_generation(token_id, sender);
                    receiver
                }
            };

            match Self::await_outcome(receiver).await {
                Some(outcome) => return outcome,
                // The generation task died without reporting (panic or
                // runtime shutdown). Re-check disk, then retry or fail.
                None => {
                    if let Some(artifact) = self.store.read(token_id).await? {
                        return Ok(Arc::new(artifact));
                    }
                    if self.inflight.contains_key(&token_id) {
                        continue;
                    }
                    return Err(ArtifactError::Aborted(
                        "generation ended without an outcome".to_string(),
                    ));
                }
            }
        }
    }

    fn spawn_generation(&self, token_id: TokenId, sender: watch::Sender<Option<Outcome>>) {
        let store = Arc::clone(&self.store);
        let fetcher = Arc::clone(&self.fetcher);
        let generator = Arc::clone(&self.generator);
        let inflight = Arc::clone(&self.inflight);

        // Detached: must run to completion for all waiters even if the
        // caller that triggered it goes away.
        tokio::spawn(async move {
            let outcome = Self::run_generation(&store, &*fetcher, &generator, token_id).await;
            if let Err(e) = &outcome {
                tracing::warn!(token_id, error = %e, "generation failed");
            }
            let _ = sender.send(Some(outcome));
            inflight.remove(&token_id);
        });
    }

    async fn run_generation(
        store: &ArtifactStore,
        fetcher: &dyn ChainFetcher,
        generator: &Arc<Generator>,
        token_id: TokenId,
    ) -> Outcome {
        // Double check: the artifact may have landed between the caller's
        // miss and this task winning the inflight slot.
        if let Some(artifact) = store.read(token_id).await? {
            return Ok(Arc::new(artifact));
        }

        let chain_data = fetcher.fetch_token_data(token_id).await?;
        if !chain_data.exists {
            return Err(ArtifactError::NotMinted(token_id));
        }

        let generator = Arc::clone(generator);
        let artifact = tokio::task::spawn_blocking(move || {
            generator.generate(token_id, &chain_data)
        })
        .await
        .map_err(|e| ArtifactError::Aborted(format!("generation task failed: {e}")))??;

        store.write(token_id, &artifact).await?;
        tracing::info!(token_id, "artifact generated and persisted");
        Ok(Arc::new(artifact))
    }

    async fn await_outcome(mut receiver: OutcomeReceiver) -> Option<Outcome> {
        loop {
            if let Some(outcome) = receiver.borrow_and_update().clone() {
                return Some(outcome);
            }
            if receiver.changed().await.is_err() {
                return receiver.borrow().clone();
            }
        }
    }
}
