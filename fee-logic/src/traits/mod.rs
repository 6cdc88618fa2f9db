use crate::approval::TokenMetadata;
use crate::commit::FeeUpdate;
use crate::error::SigningError;
use crate::signing::PersonalMessage;
use crate::tiers::BasicGasEstimates;
use crate::utils::units::FiatRate;
use ethers::types::{Address, U256};

/// Read-only view of the wallet engine taken when an editor opens.
///
/// The engine resolves its own asynchronous lookups; implementors only hand
/// back values that are already known.
pub trait WalletEngine {
    fn chain_id(&self) -> u64;

    fn network_name(&self) -> &str;

    /// Balance in wei, `None` for an account the engine does not track
    fn balance_of(&self, account: &Address) -> Option<U256>;

    /// Tier quotes from the gas station, absent when the station failed
    fn basic_gas_estimates(&self) -> Option<BasicGasEstimates>;

    fn conversion_rate(&self) -> Option<FiatRate>;

    /// Symbol and decimals of an ERC-20 contract, when known
    fn token_metadata(&self, token: &Address) -> Option<TokenMetadata>;
}

/// Receiver of a committed fee decision
pub trait FeeUpdateSink {
    fn apply(&mut self, update: FeeUpdate);

    /// Editing session aborted without changes
    fn cancelled(&mut self) {}
}

/// Personal message manager plus keyring, as seen by the signature prompt
pub trait PersonalMessageSigner {
    /// Returns the cleaned message parameters to sign
    fn approve_message(&mut self, message: &PersonalMessage) -> Result<PersonalMessage, SigningError>;

    fn sign_personal_message(&mut self, message: &PersonalMessage) -> Result<String, SigningError>;

    fn set_message_status_signed(&mut self, id: &str, signature: &str);

    fn reject_message(&mut self, id: &str);
}

/// Secure storage holding the vault password
pub trait KeychainVault {
    type Error: std::fmt::Display;

    fn stored_password(&mut self) -> Result<Option<String>, Self::Error>;

    fn submit_password(&mut self, password: &str) -> Result<(), Self::Error>;

    fn reset_stored_password(&mut self) -> Result<(), Self::Error>;
}
