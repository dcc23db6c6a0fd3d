use anytime_mp::{AnytimeCalculator, CalculatorConfig, DiagonalOrder, Error};

#[test]
fn test_config_from_json() {
    let config: CalculatorConfig = serde_json::from_str(
        r#"{ "m": 96, "exclusion_radius": 10, "diagonal_order": "sequential" }"#,
    )
    .unwrap();
    assert_eq!(config.m, 96);
    assert_eq!(config.exclusion_radius(), 10);
    assert_eq!(config.diagonal_order, DiagonalOrder::Sequential);

    let shuffled: CalculatorConfig = serde_json::from_str(
        r#"{ "m": 8, "diagonal_order": { "shuffled": { "seed": 7 } } }"#,
    )
    .unwrap();
    assert_eq!(shuffled.diagonal_order, DiagonalOrder::Shuffled { seed: 7 });
}

#[test]
fn test_config_defaults() {
    let config: CalculatorConfig = serde_json::from_str(r#"{ "m": 9 }"#).unwrap();
    assert_eq!(config, CalculatorConfig::new(9));
    assert_eq!(config.exclusion_radius(), 5);
    assert_eq!(config.diagonal_order, DiagonalOrder::Shuffled { seed: 0 });
}

#[test]
fn test_config_round_trip() {
    let config = CalculatorConfig::new(24)
        .with_exclusion_radius(3)
        .with_diagonal_order(DiagonalOrder::Shuffled { seed: 11 });
    let json = serde_json::to_string(&config).unwrap();
    let back: CalculatorConfig = serde_json::from_str(&json).unwrap();
    assert_eq!(back, config);
}

#[test]
fn test_invalid_config_rejected_by_calculator() {
    let ts: Vec<f64> = (0..50).map(|i| i as f64).collect();
    let zero_radius = CalculatorConfig::new(8).with_exclusion_radius(0);
    assert_eq!(
        AnytimeCalculator::with_config(zero_radius, vec![ts.clone()]).err(),
        Some(Error::InvalidExclusionRadius(0))
    );
    assert_eq!(
        AnytimeCalculator::with_config(CalculatorConfig::new(0), vec![ts]).err(),
        Some(Error::InvalidWindow { m: 0, n: 50 })
    );
}
