//! # Commit Adapter
//!
//! Hands a resolved fee decision to the host transaction exactly once and
//! tags it for analytics. Downstream failures are the host's concern.

use crate::metrics::EditorMetrics;
use crate::tiers::FeeTier;
use crate::traits::{FeeUpdateSink, WalletEngine};
use crate::validation::Warning;
use ethers::types::U256;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

/// Which part of the editor produced the committed values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GasModeTag {
    Advanced,
    Basic(FeeTier),
}

impl GasModeTag {
    pub fn gas_mode(&self) -> &'static str {
        match self {
            GasModeTag::Advanced => "Advanced",
            GasModeTag::Basic(_) => "Basic",
        }
    }

    pub fn speed_set(&self) -> Option<FeeTier> {
        match self {
            GasModeTag::Advanced => None,
            GasModeTag::Basic(tier) => Some(*tier),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeUpdate {
    pub gas_limit: U256,
    pub gas_price: U256,
    /// Only ever the high gas price warning, passed through from advanced mode
    pub warning: Option<Warning>,
    pub mode: GasModeTag,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnalyticsParams {
    pub network_name: String,
    pub chain_id: u64,
    pub function_type: String,
    pub gas_mode: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speed_set: Option<FeeTier>,
}

pub struct CommitAdapter<S: FeeUpdateSink> {
    sink: S,
    network_name: String,
    chain_id: u64,
    view: String,
    metrics: Option<Arc<EditorMetrics>>,
    last_analytics: Option<AnalyticsParams>,
}

impl<S: FeeUpdateSink> CommitAdapter<S> {
    /// `view` names the screen hosting the editor (approve, send, confirm)
    pub fn new(sink: S, network_name: impl Into<String>, chain_id: u64, view: impl Into<String>) -> Self {
        Self {
            sink,
            network_name: network_name.into(),
            chain_id,
            view: view.into(),
            metrics: None,
            last_analytics: None,
        }
    }

    pub fn for_engine<E: WalletEngine>(sink: S, engine: &E, view: impl Into<String>) -> Self {
        Self::new(sink, engine.network_name(), engine.chain_id(), view)
    }

    pub fn with_metrics(mut self, metrics: Arc<EditorMetrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn analytics_params(&self, mode: GasModeTag) -> AnalyticsParams {
        AnalyticsParams {
            network_name: self.network_name.clone(),
            chain_id: self.chain_id,
            function_type: self.view.clone(),
            gas_mode: mode.gas_mode(),
            speed_set: mode.speed_set(),
        }
    }

    pub fn apply(&mut self, update: FeeUpdate) -> AnalyticsParams {
        let params = self.analytics_params(update.mode);
        info!(
            "Gas fee COMMITTED: limit={} price={} mode={} speed={:?} view={}",
            update.gas_limit,
            update.gas_price,
            params.gas_mode,
            params.speed_set,
            params.function_type
        );
        if let Some(metrics) = &self.metrics {
            metrics.record_commit(update.mode);
        }

        self.sink.apply(update);
        self.last_analytics = Some(params.clone());
        params
    }

    pub fn cancelled(&mut self) {
        info!("Gas fee edit cancelled (view={})", self.view);
        if let Some(metrics) = &self.metrics {
            metrics.record_cancellation();
        }
        self.sink.cancelled();
    }

    pub(crate) fn record_blocked(&self) {
        if let Some(metrics) = &self.metrics {
            metrics.record_blocked_commit();
        }
    }

    /// Analytics tags of the most recent commit
    pub fn last_analytics(&self) -> Option<&AnalyticsParams> {
        self.last_analytics.as_ref()
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }
}

/// Sink that keeps every call, for hosts that apply updates later
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordingSink {
    pub updates: Vec<FeeUpdate>,
    pub cancellations: usize,
}

impl FeeUpdateSink for RecordingSink {
    fn apply(&mut self, update: FeeUpdate) {
        self.updates.push(update);
    }

    fn cancelled(&mut self) {
        self.cancellations += 1;
    }
}
