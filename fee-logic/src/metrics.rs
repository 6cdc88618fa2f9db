use crate::commit::GasModeTag;
use chrono::Utc;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    pub timestamp: String,
    pub sessions_opened: u64,
    pub commits: CommitMetrics,
    pub blocked_commits: u64,
    pub cancellations: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct CommitMetrics {
    pub total: u64,
    pub basic: u64,
    pub advanced: u64,
    /// Share of commits made from the tier selector
    pub basic_rate: f64,
}

/// Counters for fee editor usage
#[derive(Debug, Default)]
pub struct EditorMetrics {
    sessions_opened: AtomicU64,
    commits_basic: AtomicU64,
    commits_advanced: AtomicU64,
    blocked_commits: AtomicU64,
    cancellations: AtomicU64,
}

impl EditorMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_session_opened(&self) {
        self.sessions_opened.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_commit(&self, mode: GasModeTag) {
        match mode {
            GasModeTag::Advanced => self.commits_advanced.fetch_add(1, Ordering::Relaxed),
            GasModeTag::Basic(_) => self.commits_basic.fetch_add(1, Ordering::Relaxed),
        };
    }

    pub fn record_blocked_commit(&self) {
        self.blocked_commits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_cancellation(&self) {
        self.cancellations.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        let basic = self.commits_basic.load(Ordering::Relaxed);
        let advanced = self.commits_advanced.load(Ordering::Relaxed);
        let total = basic + advanced;
        let basic_rate = if total > 0 {
            basic as f64 / total as f64
        } else {
            0.0
        };

        MetricsSnapshot {
            timestamp: Utc::now().to_rfc3339(),
            sessions_opened: self.sessions_opened.load(Ordering::Relaxed),
            commits: CommitMetrics {
                total,
                basic,
                advanced,
                basic_rate,
            },
            blocked_commits: self.blocked_commits.load(Ordering::Relaxed),
            cancellations: self.cancellations.load(Ordering::Relaxed),
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.snapshot())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tiers::FeeTier;

    #[test]
    fn test_snapshot_counts() {
        let metrics = EditorMetrics::new();
        metrics.record_session_opened();
        metrics.record_session_opened();
        metrics.record_commit(GasModeTag::Basic(FeeTier::Fast));
        metrics.record_commit(GasModeTag::Advanced);
        metrics.record_commit(GasModeTag::Basic(FeeTier::Slow));
        metrics.record_blocked_commit();
        metrics.record_cancellation();

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.sessions_opened, 2);
        assert_eq!(snapshot.commits.total, 3);
        assert_eq!(snapshot.commits.basic, 2);
        assert_eq!(snapshot.commits.advanced, 1);
        assert_eq!(snapshot.blocked_commits, 1);
        assert_eq!(snapshot.cancellations, 1);
        assert!((snapshot.commits.basic_rate - 2.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_snapshot_json() {
        let metrics = EditorMetrics::new();
        let json = metrics.to_json().unwrap();
        assert!(json.contains("\"sessions_opened\": 0"));
        assert!(json.contains("\"basic_rate\": 0.0"));
    }
}
