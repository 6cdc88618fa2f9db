//! # Fee Logic - Wallet Transaction Fee & Approval Logic
//!
//! Validation and state management behind a wallet's gas fee editor, the
//! ERC-20 approval review, the personal message prompt and launch routing.
//! The wallet engine itself is reached only through the traits in [`traits`].
//!
//! ## Modules
//!
//! - [`utils`] - Exact unit parsing/formatting and logger setup
//! - [`tiers`] - Slow/average/fast fee tier catalog
//! - [`validation`] - Ordered gas fee validation rules
//! - [`session`] - Gas fee selection state machine
//! - [`commit`] - Hand-off of the committed fee to the host transaction
//! - [`approval`] - ERC-20 approve calldata and spend limit editing
//! - [`signing`] - Personal message display and signing
//! - [`launch`] - First screen routing and version bookkeeping
//! - [`config`] - Editor thresholds
//! - [`error`] - Typed error handling with thiserror
//! - [`metrics`] - Editor usage counters

pub mod approval;
pub mod commit;
pub mod config;
pub mod engine;
pub mod error;
pub mod launch;
pub mod metrics;
pub mod session;
pub mod signing;
pub mod tiers;
pub mod traits;
pub mod transaction;
pub mod utils;
pub mod validation;

pub use approval::{ApprovalReview, ApproveData, SpendLimitEditor, TokenMetadata};
pub use commit::{AnalyticsParams, CommitAdapter, FeeUpdate, GasModeTag, RecordingSink};
pub use config::{FeeEditorConfig, FeeEditorConfigToml, PriceRatio};
pub use engine::StaticEngine;
pub use error::{
    ApprovalError, CatalogError, ConfigError, ParseError, SessionError, SigningError,
};
pub use launch::{reconcile_versions, unlock_and_route, OnboardingFlags, Route, VersionUpdate};
pub use metrics::{EditorMetrics, MetricsSnapshot};
pub use session::{EditorMode, FeeEditorInputs, GasFeeSession, TierOption};
pub use signing::PersonalMessage;
pub use tiers::{BasicGasEstimates, FeeQuote, FeeTier, FeeTierCatalog};
pub use traits::{FeeUpdateSink, KeychainVault, PersonalMessageSigner, WalletEngine};
pub use transaction::TransactionDraft;
pub use utils::{setup_logger, FiatRate, LogConfig};
pub use validation::{RuleSet, Warning, WarningKind, WarningSet};
