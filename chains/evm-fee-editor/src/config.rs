use anyhow::Result;
use config::{Config, File};
use ethers::types::{Address, Bytes, U256};
use fee_logic::utils::units::{parse_decimal, ETHER_DECIMALS, GWEI_DECIMALS};
use fee_logic::{
    BasicGasEstimates, ConfigError, FeeEditorConfig, FeeEditorConfigToml, FeeTier, FiatRate,
    StaticEngine, TokenMetadata, TransactionDraft,
};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct NetworkSection {
    pub chain_id: u64,
    pub name: String,
    pub fiat_rate: Option<f64>,
    pub fiat_currency: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AccountSection {
    pub address: String,
    /// Balance in ether
    pub balance: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TransactionSection {
    pub to: Option<String>,
    /// Value in ether
    #[serde(default)]
    pub value: Option<String>,
    pub gas_limit: u64,
    pub gas_price_gwei: String,
    pub data: Option<String>,
    pub origin: Option<String>,
}

/// Gas station quotes in gwei
#[derive(Debug, Deserialize)]
pub struct EstimatesSection {
    pub safe_low: Option<String>,
    pub average: Option<String>,
    pub fast: Option<String>,
    pub selected: Option<FeeTier>,
}

#[derive(Debug, Default, Deserialize)]
pub struct MinimumsSection {
    pub gas_limit: Option<u64>,
    pub gas_price_gwei: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TokenSection {
    pub address: String,
    pub symbol: String,
    pub decimals: u32,
}

#[derive(Debug, Deserialize)]
pub struct EditorAppConfig {
    pub network: NetworkSection,
    pub account: AccountSection,
    pub transaction: TransactionSection,
    pub estimates: Option<EstimatesSection>,
    #[serde(default)]
    pub minimums: MinimumsSection,
    #[serde(default)]
    pub editor: FeeEditorConfigToml,
    #[serde(default)]
    pub tokens: Vec<TokenSection>,
    /// Estimation failure to surface in the editor
    pub gas_error: Option<String>,
}

fn parse_address(field: &str, value: &str) -> Result<Address, ConfigError> {
    value.parse().map_err(|e| ConfigError::InvalidValue {
        field: field.to_string(),
        reason: format!("{}", e),
    })
}

fn parse_amount(field: &str, value: &str, decimals: u32) -> Result<U256, ConfigError> {
    parse_decimal(value, decimals).map_err(|source| ConfigError::ParseError {
        field: field.to_string(),
        source,
    })
}

impl EditorAppConfig {
    pub fn load(path: &str) -> Result<Self> {
        let settings = Config::builder()
            .add_source(File::with_name(path))
            .build()?;

        settings.try_deserialize().map_err(|e| anyhow::anyhow!(e))
    }

    pub fn account(&self) -> Result<Address, ConfigError> {
        parse_address("account.address", &self.account.address)
    }

    pub fn to_engine(&self) -> Result<StaticEngine, ConfigError> {
        let balance = match &self.account.balance {
            Some(balance) => parse_amount("account.balance", balance, ETHER_DECIMALS)?,
            None => U256::zero(),
        };
        let mut engine = StaticEngine::new(self.network.chain_id, self.network.name.clone())
            .with_balance(self.account()?, balance);

        if let Some(estimates) = &self.estimates {
            engine = engine.with_estimates(BasicGasEstimates {
                safe_low_gwei: estimates.safe_low.clone(),
                average_gwei: estimates.average.clone(),
                fast_gwei: estimates.fast.clone(),
            });
        }
        if let Some(rate) = self.network.fiat_rate {
            let currency = self.network.fiat_currency.as_deref().unwrap_or("usd");
            engine = engine.with_conversion_rate(FiatRate::new(rate, currency));
        }
        for token in &self.tokens {
            let address = parse_address("tokens.address", &token.address)?;
            engine = engine.with_token(address, TokenMetadata::new(token.symbol.clone(), token.decimals));
        }
        Ok(engine)
    }

    pub fn to_transaction(&self) -> Result<TransactionDraft, ConfigError> {
        let tx_section = &self.transaction;
        let gas_price = parse_amount("transaction.gas_price_gwei", &tx_section.gas_price_gwei, GWEI_DECIMALS)?;
        let mut tx = TransactionDraft::new(self.account()?)
            .with_gas(U256::from(tx_section.gas_limit), gas_price);

        if let Some(to) = &tx_section.to {
            tx = tx.with_to(parse_address("transaction.to", to)?);
        }
        if let Some(value) = &tx_section.value {
            tx = tx.with_value(parse_amount("transaction.value", value, ETHER_DECIMALS)?);
        }
        if let Some(data) = &tx_section.data {
            let bytes: Bytes = data.parse().map_err(|e| ConfigError::InvalidValue {
                field: "transaction.data".to_string(),
                reason: format!("{}", e),
            })?;
            tx = tx.with_data(bytes);
        }
        if let Some(origin) = &tx_section.origin {
            tx = tx.with_origin(origin.clone());
        }
        Ok(tx)
    }

    pub fn minimum_gas_limit(&self) -> Option<U256> {
        self.minimums.gas_limit.map(U256::from)
    }

    pub fn minimum_gas_price(&self) -> Result<Option<U256>, ConfigError> {
        self.minimums
            .gas_price_gwei
            .as_deref()
            .map(|price| parse_amount("minimums.gas_price_gwei", price, GWEI_DECIMALS))
            .transpose()
    }

    pub fn selected_tier(&self) -> Option<FeeTier> {
        self.estimates.as_ref().and_then(|e| e.selected)
    }

    pub fn editor_config(&self) -> FeeEditorConfig {
        self.editor.clone().into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fee_logic::WalletEngine;
    use std::io::Write;

    const SAMPLE: &str = r#"
[network]
chain_id = 1
name = "mainnet"
fiat_rate = 2000.0

[account]
address = "0x00000000000000000000000000000000000000aa"
balance = "1.5"

[transaction]
to = "0x00000000000000000000000000000000000000bb"
value = "0.1"
gas_limit = 21000
gas_price_gwei = "5"

[estimates]
safe_low = "1"
average = "5"
fast = "10"
selected = "fast"

[minimums]
gas_price_gwei = "0.5"

[editor]
high_price_numerator = 2
high_price_denominator = 1
"#;

    fn load(contents: &str) -> EditorAppConfig {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        EditorAppConfig::load(file.path().to_str().unwrap()).unwrap()
    }

    #[test]
    fn test_load_sample() {
        let config = load(SAMPLE);
        assert_eq!(config.network.chain_id, 1);
        assert_eq!(config.selected_tier(), Some(FeeTier::Fast));
        assert_eq!(config.editor_config().high_price_ratio.numerator, 2);
        assert_eq!(
            config.minimum_gas_price().unwrap(),
            Some(U256::from(500_000_000u64))
        );
    }

    #[test]
    fn test_engine_and_transaction() {
        let config = load(SAMPLE);
        let engine = config.to_engine().unwrap();
        let account = config.account().unwrap();
        assert_eq!(
            engine.balance_of(&account),
            Some(U256::from(1_500_000_000_000_000_000u128))
        );
        assert!(engine.basic_gas_estimates().is_some());
        assert!(engine.conversion_rate().is_some());

        let tx = config.to_transaction().unwrap();
        assert_eq!(tx.gas, U256::from(21_000u64));
        assert_eq!(tx.gas_price, U256::from(5_000_000_000u64));
        assert_eq!(tx.value, U256::exp10(17));
    }

    #[test]
    fn test_bad_amount_names_field() {
        let config = load(&SAMPLE.replace(r#"balance = "1.5""#, r#"balance = "1.5.2""#));
        match config.to_engine() {
            Err(ConfigError::ParseError { field, .. }) => assert_eq!(field, "account.balance"),
            other => panic!("Expected ParseError, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_missing_file() {
        assert!(EditorAppConfig::load("/nonexistent/fee-editor").is_err());
    }
}
