use std::path::Path;
use std::time::Duration;

use chrono::TimeDelta;
use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::checks::{
    AccountOptions, ClusterOptions, CredentialOptions, MessageOptions, VitalsOptions,
};
use crate::error::{CheckError, Result};
use crate::threshold::Thresholds;

/// Thresholds and requirements for every check, one section per check
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckConfig {
    pub vitals: VitalsConfig,
    pub account: AccountConfig,
    pub cluster: ClusterConfig,
    pub credential: CredentialConfig,
    pub message: MessageConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct VitalsConfig {
    /// Expected server name
    pub name: Option<String>,
    pub jetstream_required: bool,
    pub tls_required: bool,
    pub auth_required: bool,

    /// Uptime in seconds
    pub uptime_warn_secs: Option<f64>,
    pub uptime_crit_secs: Option<f64>,

    /// CPU in percent
    pub cpu_warn: Option<f64>,
    pub cpu_crit: Option<f64>,

    /// Resident memory in bytes
    pub mem_warn: Option<u64>,
    pub mem_crit: Option<u64>,

    pub connections_warn: Option<u64>,
    pub connections_crit: Option<u64>,
    pub subscriptions_warn: Option<u64>,
    pub subscriptions_crit: Option<u64>,
    pub slow_consumers_warn: Option<u64>,
    pub slow_consumers_crit: Option<u64>,
}

/// Usage percentages per resource
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AccountConfig {
    pub memory_warn: Option<u64>,
    pub memory_crit: Option<u64>,
    pub storage_warn: Option<u64>,
    pub storage_crit: Option<u64>,
    pub streams_warn: Option<u64>,
    pub streams_crit: Option<u64>,
    pub consumers_warn: Option<u64>,
    pub consumers_crit: Option<u64>,
}

impl Default for AccountConfig {
    fn default() -> Self {
        Self {
            memory_warn: Some(75),
            memory_crit: Some(90),
            storage_warn: Some(75),
            storage_crit: Some(90),
            streams_warn: None,
            streams_crit: None,
            consumers_warn: None,
            consumers_crit: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusterConfig {
    /// Members including the reporting server
    pub expected_peers: Option<usize>,
    pub seen_critical_secs: f64,
    pub lag_critical: u64,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            expected_peers: None,
            seen_critical_secs: 10.0,
            lag_critical: 50,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CredentialConfig {
    pub requires_expiry: bool,
    pub validity_warn_secs: Option<f64>,
    pub validity_crit_secs: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MessageConfig {
    pub stream: String,
    pub subject: String,
    pub body_as_timestamp: bool,
    pub age_warn_secs: Option<f64>,
    pub age_crit_secs: Option<f64>,
}

fn delta(secs: f64) -> TimeDelta {
    TimeDelta::try_milliseconds((secs * 1000.0).round() as i64).unwrap_or(TimeDelta::MAX)
}

fn delta_pair(warn: Option<f64>, crit: Option<f64>) -> Thresholds<TimeDelta> {
    Thresholds {
        warn: warn.map(delta),
        crit: crit.map(delta),
    }
}

impl CheckConfig {
    /// Load from a TOML file with `MSGCHECK__SECTION__KEY` environment overrides
    pub fn load(path: &Path) -> Result<Self> {
        let path = path
            .to_str()
            .ok_or_else(|| CheckError::Config(format!("non UTF-8 path {}", path.display())))?;

        let config = Config::builder()
            .add_source(File::new(path, FileFormat::Toml))
            .add_source(Environment::with_prefix("MSGCHECK").separator("__").try_parsing(true))
            .build()?;

        let loaded: Self = config.try_deserialize()?;
        debug!(path, "loaded check configuration");
        Ok(loaded)
    }

    /// Defaults with environment overrides only
    pub fn from_env() -> Result<Self> {
        let config = Config::builder()
            .add_source(Environment::with_prefix("MSGCHECK").separator("__").try_parsing(true))
            .build()?;

        Ok(config.try_deserialize()?)
    }

    /// Reject values no check could make sense of
    pub fn validate(&self) -> Result<()> {
        let secs = [
            ("vitals.uptime_warn_secs", self.vitals.uptime_warn_secs),
            ("vitals.uptime_crit_secs", self.vitals.uptime_crit_secs),
            ("credential.validity_warn_secs", self.credential.validity_warn_secs),
            ("credential.validity_crit_secs", self.credential.validity_crit_secs),
            ("message.age_warn_secs", self.message.age_warn_secs),
            ("message.age_crit_secs", self.message.age_crit_secs),
            ("cluster.seen_critical_secs", Some(self.cluster.seen_critical_secs)),
        ];

        for (key, value) in secs {
            if let Some(v) = value {
                if !v.is_finite() || v < 0.0 {
                    return Err(CheckError::Config(format!(
                        "{} must be a non-negative number of seconds",
                        key
                    )));
                }
            }
        }

        Ok(())
    }

    pub fn vitals_options(&self) -> VitalsOptions {
        let v = &self.vitals;
        VitalsOptions {
            name: v.name.clone(),
            jetstream_required: v.jetstream_required,
            tls_required: v.tls_required,
            auth_required: v.auth_required,
            uptime: delta_pair(v.uptime_warn_secs, v.uptime_crit_secs),
            cpu: Thresholds {
                warn: v.cpu_warn,
                crit: v.cpu_crit,
            },
            memory: Thresholds {
                warn: v.mem_warn,
                crit: v.mem_crit,
            },
            connections: Thresholds {
                warn: v.connections_warn,
                crit: v.connections_crit,
            },
            subscriptions: Thresholds {
                warn: v.subscriptions_warn,
                crit: v.subscriptions_crit,
            },
            slow_consumers: Thresholds {
                warn: v.slow_consumers_warn,
                crit: v.slow_consumers_crit,
            },
        }
    }

    pub fn account_options(&self) -> AccountOptions {
        let a = &self.account;
        AccountOptions {
            memory: Thresholds {
                warn: a.memory_warn,
                crit: a.memory_crit,
            },
            storage: Thresholds {
                warn: a.storage_warn,
                crit: a.storage_crit,
            },
            streams: Thresholds {
                warn: a.streams_warn,
                crit: a.streams_crit,
            },
            consumers: Thresholds {
                warn: a.consumers_warn,
                crit: a.consumers_crit,
            },
        }
    }

    pub fn cluster_options(&self) -> ClusterOptions {
        ClusterOptions {
            expected_peers: self.cluster.expected_peers,
            seen_critical: Duration::try_from_secs_f64(self.cluster.seen_critical_secs.max(0.0))
                .unwrap_or(Duration::MAX),
            lag_critical: self.cluster.lag_critical,
        }
    }

    pub fn credential_options(&self) -> CredentialOptions {
        CredentialOptions {
            requires_expiry: self.credential.requires_expiry,
            validity: delta_pair(
                self.credential.validity_warn_secs,
                self.credential.validity_crit_secs,
            ),
        }
    }

    pub fn message_options(&self) -> MessageOptions {
        let m = &self.message;
        MessageOptions {
            stream: m.stream.clone(),
            subject: m.subject.clone(),
            body_as_timestamp: m.body_as_timestamp,
            age: delta_pair(m.age_warn_secs, m.age_crit_secs),
        }
    }
}
