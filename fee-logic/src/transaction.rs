//! The host application's pending transaction, as far as the fee editor and
//! approval review touch it.

use crate::commit::FeeUpdate;
use crate::traits::FeeUpdateSink;
use crate::utils::units::{render_from_wei, total_fee};
use ethers::types::{Address, Bytes, U256};
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionDraft {
    pub from: Address,
    pub to: Option<Address>,
    pub value: U256,
    pub data: Bytes,
    /// Gas limit
    pub gas: U256,
    pub gas_price: U256,
    /// High gas price warning carried over from the editor
    pub gas_warning: Option<String>,
    /// Dapp origin that requested the transaction
    pub origin: Option<String>,
}

impl TransactionDraft {
    pub fn new(from: Address) -> Self {
        Self {
            from,
            ..Default::default()
        }
    }

    pub fn with_to(mut self, to: Address) -> Self {
        self.to = Some(to);
        self
    }

    pub fn with_value(mut self, value: U256) -> Self {
        self.value = value;
        self
    }

    pub fn with_data(mut self, data: impl Into<Bytes>) -> Self {
        self.data = data.into();
        self
    }

    pub fn with_gas(mut self, gas: U256, gas_price: U256) -> Self {
        self.gas = gas;
        self.gas_price = gas_price;
        self
    }

    pub fn with_origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = Some(origin.into());
        self
    }

    /// `gas * gas_price`, saturating on overflow
    pub fn total_gas_fee(&self) -> U256 {
        total_fee(self.gas, self.gas_price).unwrap_or(U256::MAX)
    }

    pub fn render_gas_fee(&self) -> String {
        render_from_wei(self.total_gas_fee())
    }
}

impl FeeUpdateSink for TransactionDraft {
    fn apply(&mut self, update: FeeUpdate) {
        debug!(
            "Transaction fee updated: gas {} -> {}, price {} -> {}",
            self.gas, update.gas_limit, self.gas_price, update.gas_price
        );
        self.gas = update.gas_limit;
        self.gas_price = update.gas_price;
        self.gas_warning = update.warning.map(|w| w.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commit::GasModeTag;
    use crate::tiers::FeeTier;
    use crate::validation::Warning;

    #[test]
    fn test_apply_overwrites_fee_fields() {
        let mut tx = TransactionDraft::new(Address::zero())
            .with_gas(U256::from(50_000u64), U256::from(1u64))
            .with_value(U256::from(7u64));

        tx.apply(FeeUpdate {
            gas_limit: U256::from(21_000u64),
            gas_price: U256::from(3u64),
            warning: Some(Warning::HighGasPrice { cost: None }),
            mode: GasModeTag::Advanced,
        });

        assert_eq!(tx.gas, U256::from(21_000u64));
        assert_eq!(tx.gas_price, U256::from(3u64));
        assert_eq!(tx.value, U256::from(7u64));
        assert!(tx.gas_warning.is_some());

        tx.apply(FeeUpdate {
            gas_limit: U256::from(21_000u64),
            gas_price: U256::from(3u64),
            warning: None,
            mode: GasModeTag::Basic(FeeTier::Fast),
        });
        assert!(tx.gas_warning.is_none());
    }

    #[test]
    fn test_total_gas_fee_rendering() {
        let tx = TransactionDraft::new(Address::zero())
            .with_gas(U256::from(21_000u64), U256::from(10_000_000_000u64));
        assert_eq!(tx.render_gas_fee(), "0.00021");
    }
}
