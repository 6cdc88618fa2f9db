//! # Fee Tier Catalog
//!
//! Maps the three speed tiers to the price quotes supplied by the gas
//! station. A catalog missing any tier forces the editor into advanced-only
//! mode.

use crate::error::CatalogError;
use crate::utils::units::{format_gwei, parse_gwei};
use ethers::types::U256;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeeTier {
    Slow,
    Average,
    Fast,
}

impl FeeTier {
    pub const ALL: [FeeTier; 3] = [FeeTier::Slow, FeeTier::Average, FeeTier::Fast];

    pub fn as_str(&self) -> &'static str {
        match self {
            FeeTier::Slow => "slow",
            FeeTier::Average => "average",
            FeeTier::Fast => "fast",
        }
    }
}

impl fmt::Display for FeeTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for FeeTier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "slow" | "safelow" | "safe_low" => Ok(FeeTier::Slow),
            "average" => Ok(FeeTier::Average),
            "fast" => Ok(FeeTier::Fast),
            other => Err(format!("unknown fee tier '{}'", other)),
        }
    }
}

/// A tier's price, kept in wei
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeQuote {
    pub tier: FeeTier,
    pub price_per_unit: U256,
}

impl FeeQuote {
    /// Quote in gwei as displayed on the tier selector
    pub fn gwei(&self) -> String {
        format_gwei(self.price_per_unit)
    }
}

/// Raw gas station response, prices in gwei
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BasicGasEstimates {
    #[serde(default)]
    pub safe_low_gwei: Option<String>,
    #[serde(default)]
    pub average_gwei: Option<String>,
    #[serde(default)]
    pub fast_gwei: Option<String>,
}

impl BasicGasEstimates {
    pub fn new(safe_low: &str, average: &str, fast: &str) -> Self {
        Self {
            safe_low_gwei: Some(safe_low.to_string()),
            average_gwei: Some(average.to_string()),
            fast_gwei: Some(fast.to_string()),
        }
    }

    fn quote(&self, tier: FeeTier) -> Option<&str> {
        match tier {
            FeeTier::Slow => self.safe_low_gwei.as_deref(),
            FeeTier::Average => self.average_gwei.as_deref(),
            FeeTier::Fast => self.fast_gwei.as_deref(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeeTierCatalog {
    quotes: BTreeMap<FeeTier, FeeQuote>,
}

impl FeeTierCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_quote(mut self, tier: FeeTier, price_per_unit: U256) -> Self {
        self.quotes.insert(
            tier,
            FeeQuote {
                tier,
                price_per_unit,
            },
        );
        self
    }

    /// Builds a catalog from gas station estimates. Absent tiers are skipped;
    /// a present but malformed quote is an error.
    pub fn from_estimates(estimates: &BasicGasEstimates) -> Result<Self, CatalogError> {
        let mut catalog = Self::new();
        for tier in FeeTier::ALL {
            if let Some(raw) = estimates.quote(tier) {
                let price = parse_gwei(raw)
                    .map_err(|source| CatalogError::InvalidQuote { tier, source })?;
                catalog = catalog.with_quote(tier, price);
            }
        }
        Ok(catalog)
    }

    pub fn quote_for(&self, tier: FeeTier) -> Result<&FeeQuote, CatalogError> {
        self.quotes
            .get(&tier)
            .ok_or(CatalogError::MissingTier { tier })
    }

    pub fn price(&self, tier: FeeTier) -> Option<U256> {
        self.quotes.get(&tier).map(|q| q.price_per_unit)
    }

    /// All three tiers are quoted
    pub fn is_complete(&self) -> bool {
        FeeTier::ALL.iter().all(|t| self.quotes.contains_key(t))
    }

    pub fn len(&self) -> usize {
        self.quotes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quotes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FeeQuote> {
        self.quotes.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gwei(n: u64) -> U256 {
        U256::from(n) * U256::exp10(9)
    }

    #[test]
    fn test_from_complete_estimates() {
        let catalog = FeeTierCatalog::from_estimates(&BasicGasEstimates::new("1", "5", "10.5"))
            .unwrap();
        assert!(catalog.is_complete());
        assert_eq!(catalog.price(FeeTier::Slow), Some(gwei(1)));
        assert_eq!(catalog.price(FeeTier::Average), Some(gwei(5)));
        assert_eq!(
            catalog.quote_for(FeeTier::Fast).unwrap().price_per_unit,
            U256::from(10_500_000_000u64)
        );
        assert_eq!(catalog.quote_for(FeeTier::Fast).unwrap().gwei(), "10.5");
    }

    #[test]
    fn test_partial_estimates_are_incomplete() {
        let estimates = BasicGasEstimates {
            average_gwei: Some("5".to_string()),
            ..Default::default()
        };
        let catalog = FeeTierCatalog::from_estimates(&estimates).unwrap();
        assert!(!catalog.is_complete());
        assert_eq!(catalog.len(), 1);
        assert_eq!(
            catalog.quote_for(FeeTier::Fast),
            Err(CatalogError::MissingTier {
                tier: FeeTier::Fast
            })
        );
    }

    #[test]
    fn test_malformed_quote() {
        let result = FeeTierCatalog::from_estimates(&BasicGasEstimates::new("1", "x", "10"));
        assert!(matches!(
            result,
            Err(CatalogError::InvalidQuote {
                tier: FeeTier::Average,
                ..
            })
        ));
    }

    #[test]
    fn test_tier_from_str() {
        assert_eq!("fast".parse::<FeeTier>().unwrap(), FeeTier::Fast);
        assert_eq!("safeLow".parse::<FeeTier>().unwrap(), FeeTier::Slow);
        assert!("turbo".parse::<FeeTier>().is_err());
    }
}
