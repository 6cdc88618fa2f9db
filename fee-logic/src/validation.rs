//! # Fee Validation Rules
//!
//! Each rule is a pure predicate over the current gas limit, gas price and
//! account snapshot. [`RuleSet`] runs them in a fixed order and then drops
//! every warning superseded by a rule that fired:
//!
//! 1. [`GasLimitRule`]
//! 2. [`GasPriceValidityRule`], supersedes `LowGasPrice` and `HighGasPrice`
//! 3. [`LowGasPriceRule`]
//! 4. [`HighGasPriceRule`]
//! 5. [`SufficientFundsRule`]
//!
//! The result is always recomputed from scratch, so a [`WarningSet`] never
//! mixes findings from different inputs.

use crate::config::FeeEditorConfig;
use crate::tiers::{FeeTier, FeeTierCatalog};
use crate::utils::units::{render_fiat, render_from_wei, total_fee, FiatRate};
use ethers::types::U256;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum WarningKind {
    InvalidGasLimit,
    InvalidGasPrice,
    LowGasPrice,
    HighGasPrice,
    InsufficientFunds,
}

impl WarningKind {
    /// Low and high price warnings are advisory; the rest disable saving.
    pub fn blocks_commit(&self) -> bool {
        !matches!(self, WarningKind::LowGasPrice | WarningKind::HighGasPrice)
    }
}

impl fmt::Display for WarningKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            WarningKind::InvalidGasLimit => "invalid_gas_limit",
            WarningKind::InvalidGasPrice => "invalid_gas_price",
            WarningKind::LowGasPrice => "low_gas_price",
            WarningKind::HighGasPrice => "high_gas_price",
            WarningKind::InsufficientFunds => "insufficient_funds",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GasLimitIssue {
    Unparsable,
    OutOfRange { floor: u64, ceiling: u64 },
    BelowEstimate { minimum: U256 },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Warning {
    InvalidGasLimit { issue: GasLimitIssue },
    InvalidGasPrice,
    LowGasPrice,
    /// `cost` is the rendered fee at the typed price
    HighGasPrice { cost: Option<String> },
    InsufficientFunds,
}

impl Warning {
    pub fn kind(&self) -> WarningKind {
        match self {
            Warning::InvalidGasLimit { .. } => WarningKind::InvalidGasLimit,
            Warning::InvalidGasPrice => WarningKind::InvalidGasPrice,
            Warning::LowGasPrice => WarningKind::LowGasPrice,
            Warning::HighGasPrice { .. } => WarningKind::HighGasPrice,
            Warning::InsufficientFunds => WarningKind::InsufficientFunds,
        }
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::InvalidGasLimit {
                issue: GasLimitIssue::Unparsable,
            } => write!(f, "Invalid gas limit"),
            Warning::InvalidGasLimit {
                issue: GasLimitIssue::OutOfRange { floor, ceiling },
            } => write!(f, "Gas limit must be between {} and {}", floor, ceiling),
            Warning::InvalidGasLimit {
                issue: GasLimitIssue::BelowEstimate { minimum },
            } => write!(f, "Gas limit must be at least {}", minimum),
            Warning::InvalidGasPrice => write!(f, "Invalid gas price"),
            Warning::LowGasPrice => write!(
                f,
                "Gas price is below the recommended rate, the transaction may take a long time"
            ),
            Warning::HighGasPrice { cost: Some(cost) } => write!(
                f,
                "Gas price is much higher than the fast rate, this transaction will cost {}",
                cost
            ),
            Warning::HighGasPrice { cost: None } => {
                write!(f, "Gas price is much higher than the fast rate")
            }
            Warning::InsufficientFunds => write!(f, "Insufficient funds"),
        }
    }
}

/// Order in which a single warning is picked for the inline message
const DISPLAY_PRIORITY: [WarningKind; 5] = [
    WarningKind::InvalidGasPrice,
    WarningKind::LowGasPrice,
    WarningKind::InvalidGasLimit,
    WarningKind::InsufficientFunds,
    WarningKind::HighGasPrice,
];

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct WarningSet {
    warnings: BTreeMap<WarningKind, Warning>,
}

impl WarningSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, warning: Warning) {
        self.warnings.insert(warning.kind(), warning);
    }

    pub fn remove(&mut self, kind: WarningKind) -> Option<Warning> {
        self.warnings.remove(&kind)
    }

    pub fn contains(&self, kind: WarningKind) -> bool {
        self.warnings.contains_key(&kind)
    }

    pub fn get(&self, kind: WarningKind) -> Option<&Warning> {
        self.warnings.get(&kind)
    }

    pub fn is_empty(&self) -> bool {
        self.warnings.is_empty()
    }

    pub fn len(&self) -> usize {
        self.warnings.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Warning> {
        self.warnings.values()
    }

    pub fn kinds(&self) -> Vec<WarningKind> {
        self.warnings.keys().copied().collect()
    }

    pub fn blocking(&self) -> Vec<WarningKind> {
        self.warnings
            .keys()
            .copied()
            .filter(WarningKind::blocks_commit)
            .collect()
    }

    /// The one warning shown under the inputs
    pub fn primary(&self) -> Option<&Warning> {
        DISPLAY_PRIORITY.iter().find_map(|kind| self.warnings.get(kind))
    }
}

/// Current numeric values, `None` where the field did not parse
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeeValues {
    pub gas_limit: Option<U256>,
    pub gas_price: Option<U256>,
}

/// Everything besides the typed values that rules look at
#[derive(Debug, Clone)]
pub struct ValidationContext<'a> {
    pub config: &'a FeeEditorConfig,
    pub catalog: Option<&'a FeeTierCatalog>,
    pub minimum_gas_limit: Option<U256>,
    pub minimum_gas_price: Option<U256>,
    pub only_advanced: bool,
    pub balance: U256,
    pub transaction_value: U256,
    pub fiat: Option<&'a FiatRate>,
}

pub trait ValidationRule: Send + Sync {
    fn kind(&self) -> WarningKind;

    /// Warnings dropped from the result when this rule fires
    fn supersedes(&self) -> &'static [WarningKind] {
        &[]
    }

    fn evaluate(&self, values: &FeeValues, ctx: &ValidationContext<'_>) -> Option<Warning>;
}

pub struct GasLimitRule;

impl ValidationRule for GasLimitRule {
    fn kind(&self) -> WarningKind {
        WarningKind::InvalidGasLimit
    }

    fn evaluate(&self, values: &FeeValues, ctx: &ValidationContext<'_>) -> Option<Warning> {
        let issue = match values.gas_limit {
            None => GasLimitIssue::Unparsable,
            Some(limit)
                if limit < U256::from(ctx.config.gas_limit_floor)
                    || limit > U256::from(ctx.config.gas_limit_ceiling) =>
            {
                GasLimitIssue::OutOfRange {
                    floor: ctx.config.gas_limit_floor,
                    ceiling: ctx.config.gas_limit_ceiling,
                }
            }
            Some(limit) => match ctx.minimum_gas_limit {
                Some(minimum) if limit < minimum => GasLimitIssue::BelowEstimate { minimum },
                _ => return None,
            },
        };
        Some(Warning::InvalidGasLimit { issue })
    }
}

pub struct GasPriceValidityRule;

impl ValidationRule for GasPriceValidityRule {
    fn kind(&self) -> WarningKind {
        WarningKind::InvalidGasPrice
    }

    fn supersedes(&self) -> &'static [WarningKind] {
        &[WarningKind::LowGasPrice, WarningKind::HighGasPrice]
    }

    fn evaluate(&self, values: &FeeValues, _ctx: &ValidationContext<'_>) -> Option<Warning> {
        match values.gas_price {
            Some(price) if !price.is_zero() => None,
            _ => Some(Warning::InvalidGasPrice),
        }
    }
}

pub struct LowGasPriceRule;

impl ValidationRule for LowGasPriceRule {
    fn kind(&self) -> WarningKind {
        WarningKind::LowGasPrice
    }

    fn evaluate(&self, values: &FeeValues, ctx: &ValidationContext<'_>) -> Option<Warning> {
        let price = values.gas_price?;
        let below_minimum = ctx.only_advanced
            && ctx
                .minimum_gas_price
                .is_some_and(|minimum| price < minimum);
        let below_slow = ctx
            .catalog
            .and_then(|c| c.price(FeeTier::Slow))
            .is_some_and(|slow| price < slow);
        (below_minimum || below_slow).then_some(Warning::LowGasPrice)
    }
}

pub struct HighGasPriceRule;

impl ValidationRule for HighGasPriceRule {
    fn kind(&self) -> WarningKind {
        WarningKind::HighGasPrice
    }

    fn evaluate(&self, values: &FeeValues, ctx: &ValidationContext<'_>) -> Option<Warning> {
        let price = values.gas_price?;
        let fast = ctx.catalog.and_then(|c| c.price(FeeTier::Fast))?;
        let ratio = ctx.config.high_price_ratio;

        // price / fast > numerator / denominator, without division
        let scaled_price = price.full_mul(U256::from(ratio.denominator));
        let scaled_fast = fast.full_mul(U256::from(ratio.numerator));
        if scaled_price <= scaled_fast {
            return None;
        }

        let cost = values
            .gas_limit
            .and_then(|limit| total_fee(limit, price))
            .map(|wei| match ctx.fiat {
                Some(fiat) => render_fiat(wei, fiat),
                None => format!("{} ETH", render_from_wei(wei)),
            });
        Some(Warning::HighGasPrice { cost })
    }
}

pub struct SufficientFundsRule;

impl ValidationRule for SufficientFundsRule {
    fn kind(&self) -> WarningKind {
        WarningKind::InsufficientFunds
    }

    fn evaluate(&self, values: &FeeValues, ctx: &ValidationContext<'_>) -> Option<Warning> {
        let limit = values.gas_limit?;
        let price = values.gas_price?;
        let required = total_fee(limit, price).and_then(|fee| fee.checked_add(ctx.transaction_value));
        match required {
            Some(required) if ctx.balance >= required => None,
            _ => Some(Warning::InsufficientFunds),
        }
    }
}

/// Ordered rule evaluators with explicit supersession
pub struct RuleSet {
    rules: Vec<Box<dyn ValidationRule>>,
}

impl Default for RuleSet {
    fn default() -> Self {
        Self::standard()
    }
}

impl RuleSet {
    pub fn standard() -> Self {
        Self {
            rules: vec![
                Box::new(GasLimitRule),
                Box::new(GasPriceValidityRule),
                Box::new(LowGasPriceRule),
                Box::new(HighGasPriceRule),
                Box::new(SufficientFundsRule),
            ],
        }
    }

    pub fn kinds(&self) -> Vec<WarningKind> {
        self.rules.iter().map(|r| r.kind()).collect()
    }

    pub fn evaluate(&self, values: &FeeValues, ctx: &ValidationContext<'_>) -> WarningSet {
        let mut set = WarningSet::new();
        let mut superseded = Vec::new();

        for rule in &self.rules {
            if let Some(warning) = rule.evaluate(values, ctx) {
                superseded.extend_from_slice(rule.supersedes());
                set.insert(warning);
            }
        }
        for kind in superseded {
            set.remove(kind);
        }
        set
    }
}

impl fmt::Debug for RuleSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuleSet")
            .field("rules", &self.kinds())
            .finish()
    }
}
