//! # Fee Logic Error Types
//!
//! Centralized error definitions for the fee-logic crate.
//! All errors implement `std::error::Error` and `std::fmt::Display`.
//!
//! Validation findings on user input are not errors; they live in
//! [`crate::validation::WarningSet`]. The types here cover malformed external
//! data and misuse of the editing session.

use crate::session::EditorMode;
use crate::tiers::FeeTier;
use crate::validation::WarningKind;
use thiserror::Error;

/// Decimal input that cannot be turned into base units
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("Invalid numeric format: '{input}'")]
    InvalidFormat { input: String },

    #[error("'{input}' has more than {decimals} decimal places")]
    ExcessPrecision { input: String, decimals: u32 },

    #[error("'{input}' does not fit in 256 bits")]
    Overflow { input: String },
}

/// Fee tier catalog lookups
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    #[error("No quote available for the {tier} tier")]
    MissingTier { tier: FeeTier },

    #[error("Quote for the {tier} tier is not a valid gwei amount: {source}")]
    InvalidQuote {
        tier: FeeTier,
        #[source]
        source: ParseError,
    },
}

/// Misuse of a gas fee editing session
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("Operation requires {expected} mode but the editor is in {actual} mode")]
    WrongMode {
        expected: EditorMode,
        actual: EditorMode,
    },

    #[error("Commit blocked by: {blocking:?}")]
    CommitBlocked { blocking: Vec<WarningKind> },

    #[error("Commit blocked by gas estimation error: {message}")]
    EstimationFailed { message: String },

    #[error("Advanced values are not committable: {field} is not a valid number")]
    UnresolvedValue { field: &'static str },

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error("Session already finished")]
    Finished,
}

/// ERC-20 approve review errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApprovalError {
    #[error("Calldata too short for approve: {length} bytes")]
    TooShort { length: usize },

    #[error("Not an approve call: selector 0x{selector}")]
    UnexpectedSelector { selector: String },

    #[error("Malformed approve arguments: {reason}")]
    MalformedArguments { reason: String },

    #[error("Invalid spend limit '{value}': {source}")]
    InvalidAmount {
        value: String,
        #[source]
        source: ParseError,
    },
}

/// Personal message signing errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SigningError {
    #[error("Message {id} could not be approved: {reason}")]
    ApprovalFailed { id: String, reason: String },

    #[error("Keyring refused to sign message {id}: {reason}")]
    SignatureFailed { id: String, reason: String },
}

/// Configuration-related errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("Parse error for '{field}': {source}")]
    ParseError {
        field: String,
        #[source]
        source: ParseError,
    },
}
