//! Check policies built on the threshold evaluator
//!
//! Each check states the policy and labels of its metrics and writes into a
//! caller supplied [`CheckResult`]. Terminal input problems are returned as
//! errors before anything is recorded.

use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::result::CheckResult;

pub mod account;
pub mod cluster;
pub mod credential;
pub mod message;
pub mod vitals;

pub use account::{AccountCheck, AccountOptions};
pub use cluster::{ClusterCheck, ClusterOptions};
pub use credential::{CredentialCheck, CredentialOptions};
pub use message::{MessageCheck, MessageOptions};
pub use vitals::{VitalsCheck, VitalsOptions};

/// A single stateless evaluation pass over one snapshot
pub trait Check {
    type Snapshot;

    /// Short lowercase name used when rendering
    fn name(&self) -> &'static str;

    fn check(
        &self,
        result: &mut CheckResult,
        snapshot: Option<&Self::Snapshot>,
        now: DateTime<Utc>,
    ) -> Result<()>;
}
