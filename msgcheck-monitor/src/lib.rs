//! Threshold evaluation and health checks for a messaging cluster
//!
//! Each check reads a pre-fetched snapshot, classifies its metrics against
//! configured warn/critical thresholds and records findings plus perf data in
//! a [`CheckResult`].

pub mod checks;
pub mod config;
pub mod error;
pub mod format;
pub mod perfdata;
pub mod result;
pub mod snapshot;
pub mod threshold;

pub use checks::{
    AccountCheck, AccountOptions, Check, ClusterCheck, ClusterOptions, CredentialCheck,
    CredentialOptions, MessageCheck, MessageOptions, VitalsCheck, VitalsOptions,
};
pub use config::CheckConfig;
pub use error::{CheckError, Result};
pub use perfdata::{PerfData, PerfDatum, Unit};
pub use result::{CheckResult, Status};
pub use snapshot::{
    AccountSnapshot, ClusterSnapshot, CredentialSnapshot, PeerSnapshot, ResourceUsage,
    StoredMessage, VitalsSnapshot,
};
pub use threshold::{evaluate, Direction, ThresholdPolicy, Thresholds, Verdict};
