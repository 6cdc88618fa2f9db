//! # Gas Fee Selection Session
//!
//! One editing session of a transaction's gas fee. In basic mode the price
//! comes from a speed tier and the limit from the external estimate; in
//! advanced mode both are typed. Warnings are recomputed from scratch after
//! every change.
//!
//! A session is created from a [`FeeEditorInputs`] snapshot, mutated by user
//! events, and finished by exactly one [`GasFeeSession::commit`] or
//! [`GasFeeSession::cancel`].

use crate::commit::{CommitAdapter, FeeUpdate, GasModeTag};
use crate::config::FeeEditorConfig;
use crate::error::SessionError;
use crate::tiers::{BasicGasEstimates, FeeQuote, FeeTier, FeeTierCatalog};
use crate::traits::{FeeUpdateSink, WalletEngine};
use crate::transaction::TransactionDraft;
use crate::utils::units::{
    format_gwei, parse_gas_limit, parse_gwei, render_fiat, render_from_wei, total_fee, FiatRate,
};
use crate::validation::{FeeValues, RuleSet, ValidationContext, WarningKind, WarningSet};
use ethers::types::U256;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EditorMode {
    Basic,
    Advanced,
}

impl fmt::Display for EditorMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EditorMode::Basic => f.write_str("basic"),
            EditorMode::Advanced => f.write_str("advanced"),
        }
    }
}

/// Values the host hands over when the editor opens
#[derive(Debug, Clone, Default)]
pub struct FeeEditorInputs {
    pub gas_limit_estimate: U256,
    pub gas_price_estimate: U256,
    pub minimum_gas_limit: Option<U256>,
    pub minimum_gas_price: Option<U256>,
    pub basic_gas_estimates: Option<BasicGasEstimates>,
    pub account_balance: U256,
    pub transaction_value: U256,
    pub is_mainnet_like: bool,
    pub conversion_rate: Option<FiatRate>,
    /// Gas estimation failure reported by the engine
    pub gas_error: Option<String>,
    /// Tier highlighted when the editor opens, average if unset
    pub gas_speed_selected: Option<FeeTier>,
}

impl FeeEditorInputs {
    /// Snapshot of the engine state for editing `tx`'s fee
    pub fn gather<E: WalletEngine>(engine: &E, tx: &TransactionDraft, config: &FeeEditorConfig) -> Self {
        let account_balance = engine.balance_of(&tx.from).unwrap_or_else(|| {
            warn!("No balance known for {:?}, assuming zero", tx.from);
            U256::zero()
        });

        Self {
            gas_limit_estimate: tx.gas,
            gas_price_estimate: tx.gas_price,
            minimum_gas_limit: None,
            minimum_gas_price: None,
            basic_gas_estimates: engine.basic_gas_estimates(),
            account_balance,
            transaction_value: tx.value,
            is_mainnet_like: config.is_mainnet_like(engine.chain_id()),
            conversion_rate: engine.conversion_rate(),
            gas_error: None,
            gas_speed_selected: None,
        }
    }

    pub fn with_minimum_gas_limit(mut self, minimum: U256) -> Self {
        self.minimum_gas_limit = Some(minimum);
        self
    }

    pub fn with_minimum_gas_price(mut self, minimum: U256) -> Self {
        self.minimum_gas_price = Some(minimum);
        self
    }

    pub fn with_gas_error(mut self, message: impl Into<String>) -> Self {
        self.gas_error = Some(message.into());
        self
    }

    pub fn with_gas_speed_selected(mut self, tier: FeeTier) -> Self {
        self.gas_speed_selected = Some(tier);
        self
    }
}

/// One row of the tier selector
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TierOption {
    pub tier: FeeTier,
    pub quote: FeeQuote,
    pub fee_eth: String,
    pub fee_fiat: Option<String>,
    pub selected: bool,
}

#[derive(Debug)]
pub struct GasFeeSession {
    config: FeeEditorConfig,
    rules: RuleSet,
    inputs: FeeEditorInputs,
    catalog: Option<FeeTierCatalog>,
    only_advanced: bool,
    mode: EditorMode,
    selected_tier: Option<FeeTier>,
    gas_limit_input: String,
    gas_price_input: String,
    gas_limit: Option<U256>,
    gas_price: Option<U256>,
    warnings: WarningSet,
    finished: bool,
}

impl GasFeeSession {
    pub fn open(inputs: FeeEditorInputs, config: FeeEditorConfig) -> Self {
        let catalog = inputs
            .basic_gas_estimates
            .as_ref()
            .and_then(|estimates| match FeeTierCatalog::from_estimates(estimates) {
                Ok(catalog) => Some(catalog),
                Err(e) => {
                    warn!("Ignoring gas station estimates: {}", e);
                    None
                }
            });

        let catalog_complete = catalog.as_ref().is_some_and(FeeTierCatalog::is_complete);
        let only_advanced = !inputs.is_mainnet_like || !catalog_complete;
        let (mode, selected_tier) = if only_advanced {
            (EditorMode::Advanced, None)
        } else {
            (
                EditorMode::Basic,
                Some(inputs.gas_speed_selected.unwrap_or(FeeTier::Average)),
            )
        };

        let mut session = Self {
            config,
            rules: RuleSet::standard(),
            gas_limit_input: inputs.gas_limit_estimate.to_string(),
            gas_price_input: format_gwei(inputs.gas_price_estimate),
            gas_limit: Some(inputs.gas_limit_estimate),
            gas_price: Some(inputs.gas_price_estimate),
            inputs,
            catalog,
            only_advanced,
            mode,
            selected_tier,
            warnings: WarningSet::new(),
            finished: false,
        };
        session.revalidate();

        info!(
            "Gas fee editor opened: mode={} only_advanced={} tier={:?} warnings={:?}",
            session.mode,
            session.only_advanced,
            session.selected_tier,
            session.warnings.kinds()
        );
        session
    }

    pub fn mode(&self) -> EditorMode {
        self.mode
    }

    pub fn only_advanced(&self) -> bool {
        self.only_advanced
    }

    pub fn selected_tier(&self) -> Option<FeeTier> {
        self.selected_tier
    }

    pub fn catalog(&self) -> Option<&FeeTierCatalog> {
        self.catalog.as_ref()
    }

    pub fn gas_limit_input(&self) -> &str {
        &self.gas_limit_input
    }

    pub fn gas_price_input(&self) -> &str {
        &self.gas_price_input
    }

    pub fn warnings(&self) -> &WarningSet {
        &self.warnings
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Values the current mode would commit and validate
    pub fn effective_values(&self) -> FeeValues {
        match self.mode {
            EditorMode::Advanced => FeeValues {
                gas_limit: self.gas_limit,
                gas_price: self.gas_price,
            },
            EditorMode::Basic => FeeValues {
                gas_limit: Some(self.inputs.gas_limit_estimate),
                gas_price: self.tier_price(),
            },
        }
    }

    fn tier_price(&self) -> Option<U256> {
        let tier = self.selected_tier?;
        self.catalog.as_ref()?.price(tier)
    }

    fn ensure_open(&self) -> Result<(), SessionError> {
        if self.finished {
            return Err(SessionError::Finished);
        }
        Ok(())
    }

    fn ensure_mode(&self, expected: EditorMode) -> Result<(), SessionError> {
        self.ensure_open()?;
        if self.mode != expected {
            return Err(SessionError::WrongMode {
                expected,
                actual: self.mode,
            });
        }
        Ok(())
    }

    fn revalidate(&mut self) {
        let ctx = ValidationContext {
            config: &self.config,
            catalog: self.catalog.as_ref(),
            minimum_gas_limit: self.inputs.minimum_gas_limit,
            minimum_gas_price: self.inputs.minimum_gas_price,
            only_advanced: self.only_advanced,
            balance: self.inputs.account_balance,
            transaction_value: self.inputs.transaction_value,
            fiat: self.inputs.conversion_rate.as_ref(),
        };
        let mut warnings = self.rules.evaluate(&self.effective_values(), &ctx);

        // tier prices are never reported as too high
        if self.mode == EditorMode::Basic {
            warnings.remove(WarningKind::HighGasPrice);
        }
        self.warnings = warnings;
    }

    pub fn select_tier(&mut self, tier: FeeTier) -> Result<(), SessionError> {
        self.ensure_mode(EditorMode::Basic)?;
        let quote = match &self.catalog {
            Some(catalog) => *catalog.quote_for(tier)?,
            None => return Err(crate::error::CatalogError::MissingTier { tier }.into()),
        };

        self.selected_tier = Some(tier);
        self.gas_price_input = quote.gwei();
        self.gas_price = Some(quote.price_per_unit);
        self.revalidate();

        debug!(
            "Tier selected: {} at {} gwei, warnings={:?}",
            tier,
            quote.gwei(),
            self.warnings.kinds()
        );
        Ok(())
    }

    /// Switches between basic and advanced. Returns `false` and changes
    /// nothing when only advanced entry is available.
    pub fn toggle_mode(&mut self) -> bool {
        if self.finished || self.only_advanced {
            debug!("Mode toggle ignored (only_advanced={})", self.only_advanced);
            return false;
        }

        match self.mode {
            EditorMode::Basic => {
                // the advanced form starts from the estimate and the tier price
                let carried_price = self.tier_price().or(self.gas_price);
                self.mode = EditorMode::Advanced;
                self.gas_limit_input = self.inputs.gas_limit_estimate.to_string();
                self.gas_limit = Some(self.inputs.gas_limit_estimate);
                if let Some(price) = carried_price {
                    self.gas_price_input = format_gwei(price);
                    self.gas_price = Some(price);
                }
            }
            EditorMode::Advanced => {
                self.mode = EditorMode::Basic;
                if self.selected_tier.is_none() {
                    self.selected_tier = Some(FeeTier::Average);
                }
            }
        }
        self.revalidate();

        debug!("Mode switched to {}", self.mode);
        true
    }

    pub fn set_gas_limit(&mut self, input: &str) -> Result<(), SessionError> {
        self.ensure_mode(EditorMode::Advanced)?;
        self.gas_limit_input = input.to_string();
        self.gas_limit = parse_gas_limit(input)
            .map_err(|e| debug!("Gas limit rejected: {}", e))
            .ok();
        self.revalidate();

        debug!("Gas limit '{}' -> warnings={:?}", input, self.warnings.kinds());
        Ok(())
    }

    /// `input` is in gwei
    pub fn set_gas_price(&mut self, input: &str) -> Result<(), SessionError> {
        self.ensure_mode(EditorMode::Advanced)?;
        self.gas_price_input = input.to_string();
        self.gas_price = parse_gwei(input)
            .map_err(|e| debug!("Gas price rejected: {}", e))
            .ok();
        self.revalidate();

        debug!("Gas price '{}' -> warnings={:?}", input, self.warnings.kinds());
        Ok(())
    }

    /// Whether the save action is enabled
    pub fn can_commit(&self) -> bool {
        !self.finished && self.decision().is_ok()
    }

    /// The fee a commit would hand off now
    pub fn decision(&self) -> Result<FeeUpdate, SessionError> {
        match self.mode {
            EditorMode::Basic => {
                let tier = self.selected_tier.unwrap_or(FeeTier::Average);
                let quote = match &self.catalog {
                    Some(catalog) => catalog.quote_for(tier)?,
                    None => return Err(crate::error::CatalogError::MissingTier { tier }.into()),
                };
                Ok(FeeUpdate {
                    gas_limit: self.inputs.gas_limit_estimate,
                    gas_price: quote.price_per_unit,
                    warning: None,
                    mode: GasModeTag::Basic(tier),
                })
            }
            EditorMode::Advanced => {
                let blocking = self.warnings.blocking();
                if !blocking.is_empty() {
                    return Err(SessionError::CommitBlocked { blocking });
                }
                if let Some(message) = &self.inputs.gas_error {
                    return Err(SessionError::EstimationFailed {
                        message: message.clone(),
                    });
                }
                let gas_limit = self
                    .gas_limit
                    .ok_or(SessionError::UnresolvedValue { field: "gas_limit" })?;
                let gas_price = self
                    .gas_price
                    .ok_or(SessionError::UnresolvedValue { field: "gas_price" })?;
                Ok(FeeUpdate {
                    gas_limit,
                    gas_price,
                    warning: self.warnings.get(WarningKind::HighGasPrice).cloned(),
                    mode: GasModeTag::Advanced,
                })
            }
        }
    }

    /// Resolves the fee and hands it to `adapter`. A blocked commit leaves the
    /// session open for further edits.
    pub fn commit<S: FeeUpdateSink>(
        &mut self,
        adapter: &mut CommitAdapter<S>,
    ) -> Result<FeeUpdate, SessionError> {
        self.ensure_open()?;
        let update = match self.decision() {
            Ok(update) => update,
            Err(e) => {
                warn!("Gas fee commit BLOCKED: {}", e);
                adapter.record_blocked();
                return Err(e);
            }
        };

        adapter.apply(update.clone());
        self.finished = true;
        Ok(update)
    }

    pub fn cancel<S: FeeUpdateSink>(&mut self, adapter: &mut CommitAdapter<S>) -> Result<(), SessionError> {
        self.ensure_open()?;
        self.finished = true;
        adapter.cancelled();
        Ok(())
    }

    /// Tier selector rows; empty when only advanced entry is offered
    pub fn tier_options(&self) -> Vec<TierOption> {
        let Some(catalog) = self.catalog.as_ref().filter(|_| !self.only_advanced) else {
            return Vec::new();
        };
        let limit = self.inputs.gas_limit_estimate;
        catalog
            .iter()
            .map(|quote| {
                let fee = total_fee(limit, quote.price_per_unit).unwrap_or(U256::MAX);
                TierOption {
                    tier: quote.tier,
                    quote: *quote,
                    fee_eth: render_from_wei(fee),
                    fee_fiat: self
                        .inputs
                        .conversion_rate
                        .as_ref()
                        .map(|fiat| render_fiat(fee, fiat)),
                    selected: self.mode == EditorMode::Basic && self.selected_tier == Some(quote.tier),
                }
            })
            .collect()
    }

    /// Total fee of the typed values in ether, as shown in advanced mode
    pub fn total_fee_display(&self) -> Option<String> {
        let values = self.effective_values();
        total_fee(values.gas_limit?, values.gas_price?).map(render_from_wei)
    }

    /// The single inline message under the inputs
    pub fn primary_message(&self) -> Option<String> {
        self.warnings
            .primary()
            .map(ToString::to_string)
            .or_else(|| self.inputs.gas_error.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gwei(n: u64) -> U256 {
        U256::from(n) * U256::exp10(9)
    }

    fn inputs() -> FeeEditorInputs {
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
    fn test_opens_in_basic_with_average() {
        let session = GasFeeSession::open(inputs(), FeeEditorConfig::default());
        assert_eq!(session.mode(), EditorMode::Basic);
        assert_eq!(session.selected_tier(), Some(FeeTier::Average));
        assert!(session.warnings().is_empty());
        assert_eq!(session.tier_options().len(), 3);
    }

    #[test]
    fn test_malformed_estimates_force_advanced() {
        let mut inputs = inputs();
        inputs.basic_gas_estimates = Some(BasicGasEstimates::new("1", "five", "10"));
        let session = GasFeeSession::open(inputs, FeeEditorConfig::default());
        assert!(session.only_advanced());
        assert_eq!(session.mode(), EditorMode::Advanced);
        assert!(session.tier_options().is_empty());
    }

    #[test]
    fn test_wrong_mode_errors() {
        let mut session = GasFeeSession::open(inputs(), FeeEditorConfig::default());
        assert_eq!(
            session.set_gas_price("3"),
            Err(SessionError::WrongMode {
                expected: EditorMode::Advanced,
                actual: EditorMode::Basic
            })
        );
        assert!(session.toggle_mode());
        assert!(matches!(
            session.select_tier(FeeTier::Fast),
            Err(SessionError::WrongMode { .. })
        ));
    }

    #[test]
    fn test_toggle_carries_tier_price_into_advanced() {
        let mut session = GasFeeSession::open(inputs(), FeeEditorConfig::default());
        session.select_tier(FeeTier::Fast).unwrap();
        session.toggle_mode();
        assert_eq!(session.gas_price_input(), "10");
        assert_eq!(session.gas_limit_input(), "21000");
        assert_eq!(session.total_fee_display().as_deref(), Some("0.00021"));
    }

    #[test]
    fn test_primary_message_falls_back_to_gas_error() {
        let mut inputs = inputs().with_gas_error("Gas estimation failed");
        inputs.is_mainnet_like = false;
        let session = GasFeeSession::open(inputs, FeeEditorConfig::default());
        assert_eq!(
            session.primary_message().as_deref(),
            Some("Gas estimation failed")
        );
        assert!(!session.can_commit());
    }
}
