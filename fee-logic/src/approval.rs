//! # ERC-20 Approval Review
//!
//! Decodes `approve(address,uint256)` calldata for review, and lets the user
//! replace the requested allowance with a custom spend limit before signing.

use crate::error::ApprovalError;
use crate::transaction::TransactionDraft;
use crate::utils::units::{format_units_exact, parse_decimal};
use ethers::abi::{self, ParamType, Token};
use ethers::types::{Address, Bytes, U256};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// `keccak256("approve(address,uint256)")[..4]`
pub const APPROVE_SELECTOR: [u8; 4] = [0x09, 0x5e, 0xa7, 0xb3];

/// Origin prefix the WalletConnect bridge puts in front of the dapp URL
pub const WALLET_CONNECT_ORIGIN: &str = "wc::";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenMetadata {
    pub symbol: String,
    pub decimals: u32,
}

impl TokenMetadata {
    pub fn new(symbol: impl Into<String>, decimals: u32) -> Self {
        Self {
            symbol: symbol.into(),
            decimals,
        }
    }

    /// Used when the contract cannot be queried
    pub fn fallback() -> Self {
        Self::new("ERC20 Token", 18)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApproveData {
    pub spender: Address,
    pub amount: U256,
}

impl ApproveData {
    pub fn new(spender: Address, amount: U256) -> Self {
        Self { spender, amount }
    }

    pub fn decode(data: &[u8]) -> Result<Self, ApprovalError> {
        if data.len() < 4 {
            return Err(ApprovalError::TooShort { length: data.len() });
        }
        let (selector, args) = data.split_at(4);
        if selector != APPROVE_SELECTOR {
            return Err(ApprovalError::UnexpectedSelector {
                selector: hex::encode(selector),
            });
        }

        let tokens = abi::decode(&[ParamType::Address, ParamType::Uint(256)], args).map_err(|e| {
            ApprovalError::MalformedArguments {
                reason: e.to_string(),
            }
        })?;
        match tokens.as_slice() {
            [Token::Address(spender), Token::Uint(amount)] => Ok(Self::new(*spender, *amount)),
            other => Err(ApprovalError::MalformedArguments {
                reason: format!("unexpected tokens {:?}", other),
            }),
        }
    }

    pub fn encode(&self) -> Bytes {
        let mut data = APPROVE_SELECTOR.to_vec();
        data.extend(abi::encode(&[Token::Address(self.spender), Token::Uint(self.amount)]));
        data.into()
    }

    pub fn is_unlimited(&self) -> bool {
        self.amount == U256::MAX
    }
}

/// Host part of a request origin
pub fn origin_host(origin: &str) -> String {
    let origin = origin.strip_prefix(WALLET_CONNECT_ORIGIN).unwrap_or(origin);
    url::Url::parse(origin)
        .ok()
        .and_then(|u| u.host_str().map(str::to_string))
        .unwrap_or_else(|| origin.to_string())
}

/// What the approval screen shows before the user confirms
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApprovalReview {
    pub host: Option<String>,
    pub token_address: Option<Address>,
    pub token: TokenMetadata,
    pub spender: Address,
    pub encoded_amount: U256,
    /// Requested allowance in token units
    pub original_amount: String,
    pub unlimited_requested: bool,
    /// Network fee in ether
    pub total_gas_fee: String,
}

impl ApprovalReview {
    pub fn new(tx: &TransactionDraft, token: TokenMetadata) -> Result<Self, ApprovalError> {
        let approve = ApproveData::decode(&tx.data)?;
        let review = Self {
            host: tx.origin.as_deref().map(origin_host),
            token_address: tx.to,
            original_amount: format_units_exact(approve.amount, token.decimals),
            token,
            spender: approve.spender,
            encoded_amount: approve.amount,
            unlimited_requested: approve.is_unlimited(),
            total_gas_fee: tx.render_gas_fee(),
        };

        info!(
            "Approval requested: {} {} for spender {:?} (host={:?}, unlimited={})",
            review.original_amount,
            review.token.symbol,
            review.spender,
            review.host,
            review.unlimited_requested
        );
        Ok(review)
    }

    pub fn spend_limit_editor(&self) -> SpendLimitEditor {
        SpendLimitEditor::new(self.spender, self.encoded_amount, self.token.decimals)
    }
}

/// Choice between the requested allowance and a custom one
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpendLimitEditor {
    spender: Address,
    original_amount: U256,
    decimals: u32,
    unlimited_selected: bool,
    custom_value: Option<String>,
}

impl SpendLimitEditor {
    pub fn new(spender: Address, original_amount: U256, decimals: u32) -> Self {
        Self {
            spender,
            original_amount,
            decimals,
            unlimited_selected: true,
            custom_value: None,
        }
    }

    pub fn unlimited_selected(&self) -> bool {
        self.unlimited_selected
    }

    pub fn custom_value(&self) -> Option<&str> {
        self.custom_value.as_deref()
    }

    pub fn select_unlimited(&mut self) {
        self.unlimited_selected = true;
        self.custom_value = None;
    }

    pub fn select_custom(&mut self) {
        self.unlimited_selected = false;
    }

    pub fn set_custom_value(&mut self, value: impl Into<String>) {
        self.custom_value = Some(value.into());
    }

    /// Allowance shown on the review card
    pub fn allowance(&self) -> String {
        match (&self.custom_value, self.unlimited_selected) {
            (Some(custom), false) if !custom.is_empty() => custom.clone(),
            _ => format_units_exact(self.original_amount, self.decimals),
        }
    }

    /// Amount in token base units that the new calldata will carry
    pub fn amount(&self) -> Result<U256, ApprovalError> {
        match (&self.custom_value, self.unlimited_selected) {
            (Some(custom), false) => {
                parse_decimal(custom, self.decimals).map_err(|source| ApprovalError::InvalidAmount {
                    value: custom.clone(),
                    source,
                })
            }
            _ => Ok(self.original_amount),
        }
    }

    pub fn approval_data(&self) -> Result<Bytes, ApprovalError> {
        Ok(ApproveData::new(self.spender, self.amount()?).encode())
    }

    /// Rewrites the transaction's calldata with the chosen allowance
    pub fn apply_to(&self, tx: &mut TransactionDraft) -> Result<(), ApprovalError> {
        let data = self.approval_data()?;
        debug!("Spend limit set to {} for {:?}", self.allowance(), self.spender);
        tx.data = data;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spender() -> Address {
        "0x1111111111111111111111111111111111111111".parse().unwrap()
    }

    #[test]
    fn test_encode_layout() {
        let data = ApproveData::new(spender(), U256::from(1000u64)).encode();
        assert_eq!(data.len(), 4 + 32 + 32);
        assert_eq!(&data[..4], &APPROVE_SELECTOR);
        assert_eq!(data[4 + 31], 0x11);
        assert_eq!(data[4 + 12], 0x11);
        assert_eq!(&data[4 + 32 + 30..], &[0x03u8, 0xe8]);
    }

    #[test]
    fn test_decode_unlimited() {
        let raw = format!(
            "095ea7b3{}{}",
            "0000000000000000000000001111111111111111111111111111111111111111",
            "f".repeat(64)
        );
        let approve = ApproveData::decode(&hex::decode(raw).unwrap()).unwrap();
        assert_eq!(approve.spender, spender());
        assert!(approve.is_unlimited());
    }

    #[test]
    fn test_decode_rejects_other_selectors() {
        let err = ApproveData::decode(&[0xa9, 0x05, 0x9c, 0xbb, 0, 0]).unwrap_err();
        assert_eq!(
            err,
            ApprovalError::UnexpectedSelector {
                selector: "a9059cbb".to_string()
            }
        );
        assert_eq!(
            ApproveData::decode(&[0x09]).unwrap_err(),
            ApprovalError::TooShort { length: 1 }
        );
    }

    #[test]
    fn test_decode_truncated_arguments() {
        let mut data = APPROVE_SELECTOR.to_vec();
        data.extend([0u8; 20]);
        assert!(matches!(
            ApproveData::decode(&data),
            Err(ApprovalError::MalformedArguments { .. })
        ));
    }

    #[test]
    fn test_origin_host() {
        assert_eq!(origin_host("https://app.uniswap.org/#/swap"), "app.uniswap.org");
        assert_eq!(origin_host("wc::https://example.com/path"), "example.com");
        assert_eq!(origin_host("qr-code"), "qr-code");
    }

    #[test]
    fn test_spend_limit_toggle() {
        let mut editor = SpendLimitEditor::new(spender(), U256::exp10(20), 18);
        assert!(editor.unlimited_selected());
        assert_eq!(editor.allowance(), "100");

        editor.select_custom();
        editor.set_custom_value("2.5");
        assert_eq!(editor.allowance(), "2.5");
        assert_eq!(editor.amount().unwrap(), U256::from(2_500_000_000_000_000_000u128));

        editor.select_unlimited();
        assert_eq!(editor.custom_value(), None);
        assert_eq!(editor.amount().unwrap(), U256::exp10(20));
    }

    #[test]
    fn test_review_with_oversized_decimals() {
        let tx = TransactionDraft::new(spender())
            .with_data(ApproveData::new(spender(), U256::from(1234u64)).encode());
        let review = ApprovalReview::new(&tx, TokenMetadata::new("X", 80)).unwrap();
        assert_eq!(review.original_amount, format!("0.{}1234", "0".repeat(76)));

        let mut editor = review.spend_limit_editor();
        assert_eq!(editor.allowance(), review.original_amount);
        editor.select_custom();
        editor.set_custom_value("1");
        assert!(matches!(
            editor.amount(),
            Err(ApprovalError::InvalidAmount { .. })
        ));
    }

    #[test]
    fn test_invalid_custom_value() {
        let mut editor = SpendLimitEditor::new(spender(), U256::from(1u64), 6);
        editor.select_custom();
        editor.set_custom_value("1.0000001");
        assert!(matches!(
            editor.approval_data(),
            Err(ApprovalError::InvalidAmount { .. })
        ));
    }
}
