//! In-memory [`WalletEngine`] snapshot, used by the CLI and by tests.

use crate::approval::TokenMetadata;
use crate::tiers::BasicGasEstimates;
use crate::traits::WalletEngine;
use crate::utils::units::FiatRate;
use ethers::types::{Address, U256};
use std::collections::HashMap;

#[derive(Debug, Clone)]
pub struct StaticEngine {
    chain_id: u64,
    network_name: String,
    balances: HashMap<Address, U256>,
    estimates: Option<BasicGasEstimates>,
    fiat: Option<FiatRate>,
    tokens: HashMap<Address, TokenMetadata>,
}

impl StaticEngine {
    pub fn new(chain_id: u64, network_name: impl Into<String>) -> Self {
        Self {
            chain_id,
            network_name: network_name.into(),
            balances: HashMap::new(),
            estimates: None,
            fiat: None,
            tokens: HashMap::new(),
        }
    }

    pub fn mainnet() -> Self {
        Self::new(1, "mainnet")
    }

    pub fn with_balance(mut self, account: Address, balance: U256) -> Self {
        self.balances.insert(account, balance);
        self
    }

    pub fn with_estimates(mut self, estimates: BasicGasEstimates) -> Self {
        self.estimates = Some(estimates);
        self
    }

    pub fn with_conversion_rate(mut self, fiat: FiatRate) -> Self {
        self.fiat = Some(fiat);
        self
    }

    pub fn with_token(mut self, token: Address, metadata: TokenMetadata) -> Self {
        self.tokens.insert(token, metadata);
        self
    }
}

impl WalletEngine for StaticEngine {
    fn chain_id(&self) -> u64 {
        self.chain_id
    }

    fn network_name(&self) -> &str {
        &self.network_name
    }

    fn balance_of(&self, account: &Address) -> Option<U256> {
        self.balances.get(account).copied()
    }

    fn basic_gas_estimates(&self) -> Option<BasicGasEstimates> {
        self.estimates.clone()
    }

    fn conversion_rate(&self) -> Option<FiatRate> {
        self.fiat.clone()
    }

    fn token_metadata(&self, token: &Address) -> Option<TokenMetadata> {
        self.tokens.get(token).cloned()
    }
}
