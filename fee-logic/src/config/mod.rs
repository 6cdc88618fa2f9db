use serde::{Deserialize, Serialize};

/// Network floor for a plain transfer
pub const GAS_LIMIT_FLOOR: u64 = 21_000;
/// Upper bound accepted by the editor
pub const GAS_LIMIT_CEILING: u64 = 7_920_028;

/// `numerator / denominator` multiple of the fast quote above which a price
/// is reported as high
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceRatio {
    pub numerator: u64,
    pub denominator: u64,
}

impl Default for PriceRatio {
    fn default() -> Self {
        Self {
            numerator: 3,
            denominator: 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeEditorConfig {
    pub gas_limit_floor: u64,
    pub gas_limit_ceiling: u64,
    pub high_price_ratio: PriceRatio,
    /// Chains where the tier selector is offered
    pub mainnet_chain_ids: Vec<u64>,
}

impl Default for FeeEditorConfig {
    fn default() -> Self {
        Self {
            gas_limit_floor: GAS_LIMIT_FLOOR,
            gas_limit_ceiling: GAS_LIMIT_CEILING,
            high_price_ratio: PriceRatio::default(),
            mainnet_chain_ids: vec![1],
        }
    }
}

impl FeeEditorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_gas_limit_bounds(mut self, floor: u64, ceiling: u64) -> Self {
        self.gas_limit_floor = floor;
        self.gas_limit_ceiling = ceiling;
        self
    }

    pub fn with_high_price_ratio(mut self, numerator: u64, denominator: u64) -> Self {
        self.high_price_ratio = PriceRatio {
            numerator,
            denominator,
        };
        self
    }

    pub fn with_mainnet_chain_ids(mut self, ids: Vec<u64>) -> Self {
        self.mainnet_chain_ids = ids;
        self
    }

    pub fn is_mainnet_like(&self, chain_id: u64) -> bool {
        self.mainnet_chain_ids.contains(&chain_id)
    }
}

/// Deserialize helper for FeeEditorConfig from TOML
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FeeEditorConfigToml {
    pub gas_limit_floor: Option<u64>,
    pub gas_limit_ceiling: Option<u64>,
    pub high_price_numerator: Option<u64>,
    pub high_price_denominator: Option<u64>,
    pub mainnet_chain_ids: Option<Vec<u64>>,
}

impl From<FeeEditorConfigToml> for FeeEditorConfig {
    fn from(toml: FeeEditorConfigToml) -> Self {
        let defaults = FeeEditorConfig::default();
        Self {
            gas_limit_floor: toml.gas_limit_floor.unwrap_or(defaults.gas_limit_floor),
            gas_limit_ceiling: toml.gas_limit_ceiling.unwrap_or(defaults.gas_limit_ceiling),
            high_price_ratio: PriceRatio {
                numerator: toml
                    .high_price_numerator
                    .unwrap_or(defaults.high_price_ratio.numerator),
                // zero would make every price "high"
                denominator: toml
                    .high_price_denominator
                    .filter(|d| *d > 0)
                    .unwrap_or(defaults.high_price_ratio.denominator),
            },
            mainnet_chain_ids: toml.mainnet_chain_ids.unwrap_or(defaults.mainnet_chain_ids),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = FeeEditorConfig::default();
        assert_eq!(config.gas_limit_floor, 21_000);
        assert_eq!(config.gas_limit_ceiling, 7_920_028);
        assert_eq!(config.high_price_ratio, PriceRatio::default());
        assert!(config.is_mainnet_like(1));
        assert!(!config.is_mainnet_like(5));
    }

    #[test]
    fn test_builder() {
        let config = FeeEditorConfig::new()
            .with_gas_limit_bounds(30_000, 1_000_000)
            .with_high_price_ratio(2, 1)
            .with_mainnet_chain_ids(vec![1, 137]);
        assert_eq!(config.gas_limit_floor, 30_000);
        assert_eq!(config.high_price_ratio.numerator, 2);
        assert!(config.is_mainnet_like(137));
    }

    #[test]
    fn test_toml_zero_denominator_falls_back() {
        let toml = FeeEditorConfigToml {
            high_price_denominator: Some(0),
            ..Default::default()
        };
        let config = FeeEditorConfig::from(toml);
        assert_eq!(config.high_price_ratio.denominator, 2);
    }
}
