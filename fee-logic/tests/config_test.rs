use ethers::types::U256;
use fee_logic::{
    BasicGasEstimates, FeeEditorConfig, FeeEditorConfigToml, FeeEditorInputs, GasFeeSession,
    PriceRatio, WarningKind,
};

fn parse(json: &str) -> FeeEditorConfig {
    let toml: FeeEditorConfigToml = serde_json::from_str(json).unwrap();
    toml.into()
}

fn gwei(n: u64) -> U256 {
    U256::from(n) * U256::exp10(9)
}

fn mainnet_inputs() -> FeeEditorInputs {
    FeeEditorInputs {
        gas_limit_estimate: U256::from(21_000u64),
        gas_price_estimate: gwei(5),
        basic_gas_estimates: Some(BasicGasEstimates::new("1", "5", "10")),
        account_balance: U256::exp10(18),
        is_mainnet_like: true,
        ..Default::default()
    }
}

#[test]
fn test_empty_section_uses_defaults() {
    assert_eq!(parse("{}"), FeeEditorConfig::default());
}

#[test]
fn test_partial_overrides() {
    let config = parse(r#"{ "gas_limit_ceiling": 30000000, "mainnet_chain_ids": [1, 137] }"#);
    assert_eq!(config.gas_limit_floor, 21_000);
    assert_eq!(config.gas_limit_ceiling, 30_000_000);
    assert!(config.is_mainnet_like(137));
    assert_eq!(config.high_price_ratio, PriceRatio::default());
}

#[test]
fn test_zero_denominator_falls_back() {
    let config = parse(r#"{ "high_price_numerator": 2, "high_price_denominator": 0 }"#);
    assert_eq!(
        config.high_price_ratio,
        PriceRatio {
            numerator: 2,
            denominator: 2
        }
    );
}

#[test]
fn test_custom_ratio_changes_high_threshold() {
    // 2x the fast quote instead of 1.5x
    let config = FeeEditorConfig::default().with_high_price_ratio(2, 1);
    let mut session = GasFeeSession::open(mainnet_inputs(), config);
    session.toggle_mode();

    session.set_gas_price("20").unwrap();
    assert!(!session.warnings().contains(WarningKind::HighGasPrice));
    session.set_gas_price("20.000000001").unwrap();
    assert!(session.warnings().contains(WarningKind::HighGasPrice));
}

#[test]
fn test_custom_gas_limit_bounds() {
    let config = FeeEditorConfig::default().with_gas_limit_bounds(21_000, 30_000_000);
    let mut session = GasFeeSession::open(mainnet_inputs(), config);
    session.toggle_mode();

    session.set_gas_limit("7920029").unwrap();
    assert!(!session.warnings().contains(WarningKind::InvalidGasLimit));

    let mut strict = GasFeeSession::open(mainnet_inputs(), FeeEditorConfig::default());
    strict.toggle_mode();
    strict.set_gas_limit("7920029").unwrap();
    assert!(strict.warnings().contains(WarningKind::InvalidGasLimit));
    strict.set_gas_limit("7920028").unwrap();
    assert!(!strict.warnings().contains(WarningKind::InvalidGasLimit));
    strict.set_gas_limit("20999").unwrap();
    assert!(strict.warnings().contains(WarningKind::InvalidGasLimit));
}
