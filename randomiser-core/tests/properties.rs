use fragment_randomiser_core::fragments::split_budget;
use fragment_randomiser_core::{RandomHandler, Randomiser, RandomiserSettings, SeedPolicy, StaticData};
use proptest::prelude::*;

const WORLD: &str = include_str!("../../demos/world.json");

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn split_sums_to_budget(seed in any::<u64>(), budget in 0.0f32..2.0, count in 1usize..12) {
        let mut rng = RandomHandler::new(seed);
        let parts = split_budget(&mut rng, budget, count);
        prop_assert_eq!(parts.len(), count);
        let total: f32 = parts.iter().sum();
        prop_assert!((total - budget).abs() < 1e-4, "total {} budget {}", total, budget);
        prop_assert!(parts.iter().all(|p| *p >= 0.0 && *p <= budget + 1e-4));
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn region_cap_holds_for_any_seed(seed in any::<u64>(), cap in 1u32..8) {
        let data = StaticData::from_json_str(WORLD).unwrap();
        let settings = RandomiserSettings {
            max_items_per_region: cap,
            ..Default::default()
        };
        let mut randomiser = Randomiser::new(data, settings).unwrap();
        randomiser.request_run(SeedPolicy::Fixed(seed)).unwrap();
        prop_assert!(randomiser.registry().regions().iter().all(|r| r.used <= cap));
    }
}
