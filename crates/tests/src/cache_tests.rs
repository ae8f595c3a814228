//! Artifact cache behavior through the full stack.

use std::{sync::Arc, time::Duration};

use chanclas_core::{
    artifact::ArtifactError,
    chain::{ChainFetcher, RotatingFetcher},
};

use crate::mock_chain::{MockRpc, Script, StaticChainFetcher, TestCollection};

const TABLE: &str = r#"{
    "01_Background": [
        {"file": "01.-Red.png", "weight": 70.0},
        {"file": "03.-Blue.png", "weight": 30.0}
    ],
    "06_Base": [
        {"file": "01.-Red.png", "weight": 60.0},
        {"file": "03.-Blue.png", "weight": 40.0}
    ],
    "08_Hats": [
        {"file": "EMPTY", "weight": 50.0},
        {"file": "05.-Astronaut.png", "weight": 50.0}
    ],
    "09_Eyewears": [
        {"file": "01.-Monocle.png", "weight": 100.0}
    ]
}"#;

#[tokio::test]
async fn concurrent_callers_share_one_generation() {
    let collection = TestCollection::with_table(0, TABLE);
    let fetcher =
        Arc::new(StaticChainFetcher::minted("abc", 0).with_delay(Duration::from_millis(50)));
    let cache =
        Arc::new(collection.cache(Arc::clone(&fetcher) as Arc<dyn ChainFetcher>, "salt"));

    let handles: Vec<_> = (0..32)
        .map(|_| {
            let cache = Arc::clone(&cache);
            tokio::spawn(async move { cache.get_or_generate(7).await })
        })
        .collect();

    let mut artifacts = Vec::new();
    for handle in handles {
        artifacts.push(handle.await.unwrap().unwrap());
    }

    assert_eq!(fetcher.fetch_count(), 1, "32 callers must collapse to one fetch");
    for artifact in &artifacts[1..] {
        assert_eq!(artifact, &artifacts[0]);
    }
}

#[tokio::test]
async fn disk_cache_survives_a_restart() {
    let collection = TestCollection::with_table(0, TABLE);

    let first_fetcher = Arc::new(StaticChainFetcher::minted("abc", 0));
    let first_cache =
        collection.cache(Arc::clone(&first_fetcher) as Arc<dyn ChainFetcher>, "salt");
    let original = first_cache.get_or_generate(7).await.unwrap();
    assert_eq!(first_fetcher.fetch_count(), 1);

    // A fresh cache over the same output root stands in for a restarted
    // process: the artifact must come from disk, chain untouched.
    let second_fetcher = Arc::new(StaticChainFetcher::minted("abc", 0));
    let second_cache =
        collection.cache(Arc::clone(&second_fetcher) as Arc<dyn ChainFetcher>, "salt");
    let reloaded = second_cache.get_or_generate(7).await.unwrap();

    assert_eq!(second_fetcher.fetch_count(), 0);
    assert_eq!(reloaded.image, original.image);
    assert_eq!(reloaded.metadata, original.metadata);
}

#[tokio::test]
async fn unminted_token_is_not_cached() {
    let collection = TestCollection::with_table(0, TABLE);
    let fetcher = Arc::new(StaticChainFetcher::unminted());
    let cache = collection.cache(Arc::clone(&fetcher) as Arc<dyn ChainFetcher>, "salt");

    assert_eq!(cache.get_or_generate(9).await.unwrap_err(), ArtifactError::NotMinted(9));
    assert!(collection.store().read(9).await.unwrap().is_none());

    // A later mint of the same id must trigger a fresh chain query.
    assert!(cache.get_or_generate(9).await.is_err());
    assert_eq!(fetcher.fetch_count(), 2);
}

#[tokio::test]
async fn full_stack_via_rotating_fetcher() {
    let collection = TestCollection::with_table(0, TABLE);
    let rpc = Arc::new(
        MockRpc::new()
            .endpoint("http://dead", Script::Down)
            .endpoint("http://live", Script::Healthy)
            .with_token_data([0xabc, 0, 0, 50, 90]),
    );
    let fetcher = RotatingFetcher::new(
        Arc::clone(&rpc),
        vec!["http://dead".to_string(), "http://live".to_string()],
        "0x262cA2E567315300CDdf389A0D2E37212F4DAEF4".to_string(),
        Duration::from_millis(1),
    )
    .unwrap();
    let cache = collection.cache(Arc::new(fetcher), "salt");

    let artifact = cache.get_or_generate(7).await.unwrap();
    assert_eq!(artifact.metadata.name, "Chanclas #7");
    assert_eq!(&artifact.image[..8], b"\x89PNG\r\n\x1a\n");

    let rpc_calls_after_first = rpc.total_calls();
    let again = cache.get_or_generate(7).await.unwrap();
    assert_eq!(again, artifact);
    assert_eq!(rpc.total_calls(), rpc_calls_after_first, "hit must not touch the chain");
}

#[tokio::test]
async fn distinct_tokens_do_not_block_each_other() {
    let collection = TestCollection::with_table(0, TABLE);
    let fetcher =
        Arc::new(StaticChainFetcher::minted("abc", 0).with_delay(Duration::from_millis(50)));
    let cache =
        Arc::new(collection.cache(Arc::clone(&fetcher) as Arc<dyn ChainFetcher>, "salt"));

    let started = std::time::Instant::now();
    let handles: Vec<_> = (1..=6)
        .map(|id| {
            let cache = Arc::clone(&cache);
            tokio::spawn(async move { cache.get_or_generate(id).await })
        })
        .collect();
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    assert_eq!(fetcher.fetch_count(), 6);
    // Serialized, six 50ms fetches would need 300ms.
    assert!(started.elapsed() < Duration::from_millis(200));
}
