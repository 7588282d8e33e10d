//! Read-only telemetry handed to the checks.
//!
//! These mirror what the cluster management API reports; the checks never
//! fetch anything themselves.

use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

/// Server variables used by the vitals check
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct VitalsSnapshot {
    pub name: String,
    pub jetstream_enabled: bool,
    pub tls_required: bool,
    pub auth_required: bool,
    pub cpu: f64,
    pub mem: u64,
    pub connections: u64,
    pub subscriptions: u64,
    pub slow_consumers: u64,
    pub now: DateTime<Utc>,
    pub start: DateTime<Utc>,
}

impl VitalsSnapshot {
    pub fn uptime(&self) -> TimeDelta {
        self.now - self.start
    }
}

/// Usage against a server-enforced maximum; a maximum of 0 is unlimited
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResourceUsage {
    pub used: u64,
    pub max: u64,
}

impl ResourceUsage {
    pub fn new(used: u64, max: u64) -> Self {
        Self { used, max }
    }

    pub fn is_limited(&self) -> bool {
        self.max > 0
    }

    /// floor(100 * used / max), 0 when unlimited
    pub fn percent(&self) -> u64 {
        if !self.is_limited() {
            return 0;
        }
        (u128::from(self.used) * 100 / u128::from(self.max)) as u64
    }

    pub fn exceeds_limit(&self) -> bool {
        self.is_limited() && self.used > self.max
    }
}

/// Account level resource usage
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AccountSnapshot {
    pub memory: ResourceUsage,
    pub storage: ResourceUsage,
    pub streams: ResourceUsage,
    pub consumers: ResourceUsage,
}

/// One replica as seen by the leader
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PeerSnapshot {
    pub name: String,
    pub current: bool,
    pub offline: bool,
    /// Time since the leader last heard from this peer
    #[serde(with = "duration_nanos")]
    pub active: Duration,
    /// Operations behind the leader
    pub lag: u64,
}

/// Consensus group metadata; `replicas` excludes the reporting server
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusterSnapshot {
    pub name: String,
    pub leader: String,
    pub replicas: Vec<PeerSnapshot>,
}

/// Extracted credential metadata
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CredentialSnapshot {
    pub expires: Option<DateTime<Utc>>,
}

/// Last message stored on a subject
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredMessage {
    #[serde(default)]
    pub data: Vec<u8>,
    pub published: DateTime<Utc>,
}

/// Durations travel as integer nanoseconds, matching the server API
pub mod duration_nanos {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(u64::try_from(d.as_nanos()).unwrap_or(u64::MAX))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_nanos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percent_truncates() {
        assert_eq!(ResourceUsage::new(128, 1024).percent(), 12);
        assert_eq!(ResourceUsage::new(960, 1024).percent(), 93);
        assert_eq!(ResourceUsage::new(29, 100).percent(), 29);
        assert_eq!(ResourceUsage::new(300, 200).percent(), 150);
        assert_eq!(ResourceUsage::new(0, 0).percent(), 0);
        assert_eq!(ResourceUsage::new(u64::MAX, u64::MAX).percent(), 100);
    }

    #[test]
    fn test_exceeds_limit() {
        assert!(ResourceUsage::new(300, 200).exceeds_limit());
        assert!(!ResourceUsage::new(200, 200).exceeds_limit());
        assert!(!ResourceUsage::new(128, 0).exceeds_limit());
    }

    #[test]
    fn test_peer_active_in_nanos() {
        let peer: PeerSnapshot = serde_json::from_str(
            r#"{"name":"replica1","current":true,"active":10000000,"lag":1}"#,
        )
        .unwrap();
        assert_eq!(peer.active, Duration::from_millis(10));
        assert!(!peer.offline);

        let encoded = serde_json::to_value(&peer).unwrap();
        assert_eq!(encoded["active"], 10_000_000);
    }

    #[test]
    fn test_uptime() {
        let now = Utc::now();
        let vz = VitalsSnapshot {
            now,
            start: now - TimeDelta::seconds(600),
            ..Default::default()
        };
        assert_eq!(vz.uptime(), TimeDelta::seconds(600));
    }
}
