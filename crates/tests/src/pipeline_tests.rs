//! End-to-end determinism of the generation pipeline.

use chanclas_core::{
    generator::TraitSelector,
    rarity::RarityLoader,
    types::{BondingCurveParams, Layer, TokenChainData},
};

use crate::mock_chain::TestCollection;

const PERIOD_0: &str = r#"{
    "01_Background": [
        {"file": "01.-Red.png", "weight": 70.0},
        {"file": "03.-Blue.png", "weight": 30.0}
    ],
    "06_Base": [
        {"file": "01.-Red.png", "weight": 60.0},
        {"file": "03.-Blue.png", "weight": 40.0}
    ]
}"#;

fn chain_data(seed: &str) -> TokenChainData {
    TokenChainData {
        exists: true,
        seed: seed.to_string(),
        period: 0,
        curve: BondingCurveParams::default(),
    }
}

#[test]
fn token_seven_triple_is_stable_across_reruns() {
    let collection = TestCollection::with_table(0, PERIOD_0);
    let loader = RarityLoader::new(collection.rarity.path());
    let table = loader.load(0).unwrap();
    let selector = TraitSelector::new("salt");

    let baseline = selector.select(7, "abc", &table, 0.0);
    let background = baseline.traits.get(Layer::Background).unwrap().clone();
    let base = baseline.traits.get(Layer::Base).unwrap().clone();
    let toe_guards = baseline.traits.get(Layer::ToeGuards).unwrap().clone();

    // The coupling invariant holds for every rerun of the same inputs,
    // and the triple never drifts.
    assert_eq!(base, toe_guards);
    for _ in 0..10 {
        let rerun = selector.select(7, "abc", &table, 0.0);
        assert_eq!(rerun.traits.get(Layer::Background).unwrap(), &background);
        assert_eq!(rerun.traits.get(Layer::Base).unwrap(), &base);
        assert_eq!(rerun.traits.get(Layer::ToeGuards).unwrap(), &toe_guards);
    }

    // Independently constructed pipeline state (fresh loader, fresh
    // selector) reproduces the identical triple.
    let other_collection = TestCollection::with_table(0, PERIOD_0);
    let other_table = RarityLoader::new(other_collection.rarity.path()).load(0).unwrap();
    let other = TraitSelector::new("salt").select(7, "abc", &other_table, 0.0);
    assert_eq!(other.traits.get(Layer::Background).unwrap(), &background);
    assert_eq!(other.traits.get(Layer::Base).unwrap(), &base);
    assert_eq!(other.traits.get(Layer::ToeGuards).unwrap(), &toe_guards);
}

#[test]
fn artifact_bytes_are_identical_across_process_lifetimes() {
    // Two fixtures with identical tables and assets stand in for two
    // process lifetimes over the same collection.
    let first = TestCollection::with_table(0, PERIOD_0);
    let second = TestCollection::with_table(0, PERIOD_0);

    let a = first.generator("salt").generate(7, &chain_data("abc")).unwrap();
    let b = second.generator("salt").generate(7, &chain_data("abc")).unwrap();

    assert_eq!(a.image, b.image);
    assert_eq!(a.metadata, b.metadata);
}

#[test]
fn attribute_order_matches_draw_order() {
    let collection = TestCollection::with_table(0, PERIOD_0);
    let artifact = collection.generator("salt").generate(7, &chain_data("abc")).unwrap();

    let types: Vec<_> =
        artifact.metadata.attributes.iter().map(|p| p.trait_type.as_str()).collect();
    assert_eq!(types, vec!["Background", "Base", "ToeGuards"]);

    // Mirrored layers report the same cleaned value.
    assert_eq!(artifact.metadata.attributes[1].value, artifact.metadata.attributes[2].value);
    for pair in &artifact.metadata.attributes {
        assert!(["Red", "Blue"].contains(&pair.value.as_str()), "unexpected {}", pair.value);
    }
}

#[test]
fn secret_salt_changes_the_stream() {
    let collection = TestCollection::with_table(0, PERIOD_0);
    let table = RarityLoader::new(collection.rarity.path()).load(0).unwrap();

    let a = TraitSelector::new("salt-a");
    let b = TraitSelector::new("salt-b");
    let differs = (0..64).any(|id| {
        a.select(id, "abc", &table, 0.0).traits.get(Layer::Background)
            != b.select(id, "abc", &table, 0.0).traits.get(Layer::Background)
    });
    assert!(differs, "distinct salts must not produce one identical collection");
}

#[test]
fn chain_seed_changes_the_stream() {
    let collection = TestCollection::with_table(0, PERIOD_0);
    let table = RarityLoader::new(collection.rarity.path()).load(0).unwrap();
    let selector = TraitSelector::new("salt");

    let differs = (0..64).any(|id| {
        selector.select(id, "0xabc", &table, 0.0).traits.get(Layer::Background)
            != selector.select(id, "0xdef", &table, 0.0).traits.get(Layer::Background)
    });
    assert!(differs);
}

#[test]
fn curve_discount_feeds_selection_deterministically() {
    let collection = TestCollection::with_table(0, PERIOD_0);
    let table = RarityLoader::new(collection.rarity.path()).load(0).unwrap();
    let selector = TraitSelector::new("salt");

    // d = (90 * 100) / (100 + 50) / 100 = 0.6
    let curve = BondingCurveParams { extra_mints: 100, curve_steepness: 50, max_rebate: 90 };
    let d = curve.discount();
    assert!((d - 0.6).abs() < 1e-12);

    assert_eq!(selector.select(7, "abc", &table, d), selector.select(7, "abc", &table, d));
}
