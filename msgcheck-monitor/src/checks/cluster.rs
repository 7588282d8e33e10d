//! Consensus group health: leadership, membership size and peer state

use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::checks::Check;
use crate::error::Result;
use crate::format::compact_duration;
use crate::perfdata::{PerfDatum, Unit};
use crate::result::CheckResult;
use crate::snapshot::{ClusterSnapshot, PeerSnapshot};

#[derive(Debug, Clone)]
pub struct ClusterOptions {
    /// Expected members including the reporting server
    pub expected_peers: Option<usize>,
    /// Peers not heard from for longer than this are inactive
    pub seen_critical: Duration,
    /// Peers further behind than this many operations are lagged
    pub lag_critical: u64,
}

/// Per-pass peer tallies
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PeerCounts {
    pub offline: usize,
    pub not_current: usize,
    pub inactive: usize,
    pub lagged: usize,
}

impl PeerCounts {
    pub fn tally(peers: &[PeerSnapshot], seen_critical: Duration, lag_critical: u64) -> Self {
        let mut counts = Self::default();

        for peer in peers {
            if peer.offline {
                counts.offline += 1;
            }
            if !peer.current {
                counts.not_current += 1;
            }
            if peer.active > seen_critical {
                counts.inactive += 1;
            }
            if peer.lag > lag_critical {
                counts.lagged += 1;
            }
        }

        counts
    }
}

pub struct ClusterCheck {
    options: ClusterOptions,
}

impl ClusterCheck {
    pub fn new(options: ClusterOptions) -> Self {
        Self { options }
    }
}

impl Check for ClusterCheck {
    type Snapshot = ClusterSnapshot;

    fn name(&self) -> &'static str {
        "cluster"
    }

    fn check(
        &self,
        result: &mut CheckResult,
        snapshot: Option<&ClusterSnapshot>,
        _now: DateTime<Utc>,
    ) -> Result<()> {
        let Some(meta) = snapshot else {
            result.add_critical("no cluster information");
            return Ok(());
        };

        if meta.leader.is_empty() {
            result.add_critical("No leader");
            return Ok(());
        }

        let opts = &self.options;
        let criticals_before = result.criticals().len();
        let peers = meta.replicas.len() + 1;

        if let Some(expected) = opts.expected_peers {
            if peers != expected {
                result.add_critical(format!("{} peers of expected {}", peers, expected));
            }
        }

        let counts = PeerCounts::tally(&meta.replicas, opts.seen_critical, opts.lag_critical);
        debug!(group = %meta.name, leader = %meta.leader, peers, ?counts, "tallied cluster peers");

        if counts.not_current > 0 {
            result.add_critical(format!("{} not current", counts.not_current));
        }
        if counts.inactive > 0 {
            result.add_critical(format!(
                "{} inactive more than {}",
                counts.inactive,
                compact_duration(opts.seen_critical)
            ));
        }
        if counts.offline > 0 {
            result.add_critical(format!("{} offline", counts.offline));
        }
        if counts.lagged > 0 {
            result.add_critical(format!(
                "{} lagged more than {} ops",
                counts.lagged, opts.lag_critical
            ));
        }

        let expected = opts.expected_peers.map(|e| e as f64);
        result.add_perf_data(
            PerfDatum::new("peers", peers as f64, Unit::Count).with_thresholds(expected, expected),
        );

        let counters = [
            ("peer_offline", counts.offline),
            ("peer_not_current", counts.not_current),
            ("peer_inactive", counts.inactive),
            ("peer_lagged", counts.lagged),
        ];
        for (label, count) in counters {
            result.add_perf_data(PerfDatum::new(label, count as f64, Unit::Count));
        }

        if result.criticals().len() == criticals_before {
            result.add_ok(format!("{} peers led by {}", peers, meta.leader));
        }

        Ok(())
    }
}
