//! Endpoint rotation and failover behavior.

use std::{sync::Arc, time::Duration};

use chanclas_core::chain::{ChainError, ChainFetcher, RotatingFetcher};

use crate::mock_chain::{MockRpc, Script};

const CONTRACT: &str = "0x262cA2E567315300CDdf389A0D2E37212F4DAEF4";

fn fetcher(rpc: &Arc<MockRpc>, urls: &[&str]) -> RotatingFetcher<Arc<MockRpc>> {
    RotatingFetcher::new(
        Arc::clone(rpc),
        urls.iter().map(|u| (*u).to_string()).collect(),
        CONTRACT.to_string(),
        Duration::from_millis(1),
    )
    .unwrap()
}

#[tokio::test]
async fn exhausted_pool_reports_unavailable() {
    let rpc = Arc::new(
        MockRpc::new()
            .endpoint("http://a", Script::Down)
            .endpoint("http://b", Script::Down)
            .endpoint("http://c", Script::Down),
    );
    let f = fetcher(&rpc, &["http://a", "http://b", "http://c"]);

    let err = f.fetch_token_data(7).await.unwrap_err();
    assert_eq!(err, ChainError::Unavailable { attempted: 3 });

    // One probe per endpoint, no endpoint hit twice within one fetch.
    assert_eq!(rpc.calls_to("http://a"), 1);
    assert_eq!(rpc.calls_to("http://b"), 1);
    assert_eq!(rpc.calls_to("http://c"), 1);
}

#[tokio::test]
async fn failover_reaches_the_first_healthy_endpoint() {
    let rpc = Arc::new(
        MockRpc::new()
            .endpoint("http://a", Script::Down)
            .endpoint("http://b", Script::Down)
            .endpoint("http://c", Script::Healthy),
    );
    let f = fetcher(&rpc, &["http://a", "http://b", "http://c"]);

    let data = f.fetch_token_data(7).await.unwrap();
    assert!(data.exists);
    assert_eq!(rpc.calls_to("http://a"), 1);
    assert_eq!(rpc.calls_to("http://b"), 1);
    // Probe, ownerOf, getTokenData.
    assert_eq!(rpc.calls_to("http://c"), 3);
}

#[tokio::test]
async fn rate_limited_endpoint_rotates_away() {
    let rpc = Arc::new(
        MockRpc::new()
            .endpoint("http://limited", Script::RateLimited)
            .endpoint("http://open", Script::Healthy),
    );
    let f = fetcher(&rpc, &["http://limited", "http://open"]);

    let data = f.fetch_token_data(7).await.unwrap();
    assert!(data.exists);
    // The limited endpoint passed its probe, then failed ownerOf.
    assert_eq!(rpc.calls_to("http://limited"), 2);
    assert_eq!(rpc.calls_to("http://open"), 3);
}

#[tokio::test]
async fn revert_is_an_answer_not_a_failover() {
    let rpc = Arc::new(
        MockRpc::new()
            .endpoint("http://a", Script::RevertOwnerOf)
            .endpoint("http://b", Script::Healthy),
    );
    let f = fetcher(&rpc, &["http://a", "http://b"]);

    let data = f.fetch_token_data(999).await.unwrap();
    assert!(!data.exists);
    // The healthy backup must never be consulted for a definitive revert.
    assert_eq!(rpc.calls_to("http://b"), 0);
}

#[tokio::test]
async fn token_data_decodes_in_declared_order() {
    let rpc = Arc::new(
        MockRpc::new()
            .endpoint("http://a", Script::Healthy)
            .with_token_data([0xdead, 3, 100, 50, 90]),
    );
    let f = fetcher(&rpc, &["http://a"]);

    let data = f.fetch_token_data(7).await.unwrap();
    assert_eq!(data.seed, "0xdead");
    assert_eq!(data.period, 3);
    assert_eq!(data.curve.extra_mints, 100);
    assert_eq!(data.curve.curve_steepness, 50);
    assert_eq!(data.curve.max_rebate, 90);
    // d = (90 * 100) / 150 / 100
    assert!((data.curve.discount() - 0.6).abs() < 1e-12);
}

#[tokio::test]
async fn round_robin_spreads_sequential_fetches() {
    let rpc = Arc::new(
        MockRpc::new()
            .endpoint("http://a", Script::Healthy)
            .endpoint("http://b", Script::Healthy),
    );
    let f = fetcher(&rpc, &["http://a", "http://b"]);

    f.fetch_token_data(1).await.unwrap();
    f.fetch_token_data(2).await.unwrap();

    // Each fetch succeeded on its first endpoint, alternating.
    assert_eq!(rpc.calls_to("http://a"), 3);
    assert_eq!(rpc.calls_to("http://b"), 3);
}
