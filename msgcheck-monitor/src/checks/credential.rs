//! Remaining validity of a user credential

use chrono::{DateTime, TimeDelta, Utc};
use tracing::debug;

use crate::checks::Check;
use crate::error::{CheckError, Result};
use crate::format::{format_instant, humanize_duration};
use crate::perfdata::{seconds, PerfDatum, Unit};
use crate::result::{CheckResult, Status};
use crate::snapshot::CredentialSnapshot;
use crate::threshold::{evaluate, ThresholdPolicy, Thresholds, Verdict};

#[derive(Debug, Clone, Default)]
pub struct CredentialOptions {
    /// A credential without expiry is critical
    pub requires_expiry: bool,
    /// Less remaining validity is worse
    pub validity: Thresholds<TimeDelta>,
}

pub struct CredentialCheck {
    options: CredentialOptions,
}

impl CredentialCheck {
    pub fn new(options: CredentialOptions) -> Self {
        Self { options }
    }
}

impl Check for CredentialCheck {
    type Snapshot = CredentialSnapshot;

    fn name(&self) -> &'static str {
        "credential"
    }

    fn check(
        &self,
        result: &mut CheckResult,
        snapshot: Option<&CredentialSnapshot>,
        now: DateTime<Utc>,
    ) -> Result<()> {
        let credential = snapshot.ok_or(CheckError::NoData)?;
        let opts = &self.options;

        let Some(expires) = credential.expires else {
            if opts.requires_expiry {
                result.add_critical("never expires");
            } else {
                result.add_ok("never expires");
            }
            return Ok(());
        };

        let remaining = expires - now;
        debug!(%expires, remaining = %humanize_duration(remaining), "credential validity");

        result.add_perf_data(
            PerfDatum::new("expiry", seconds(remaining), Unit::Seconds)
                .with_thresholds(opts.validity.warn.map(seconds), opts.validity.crit.map(seconds)),
        );

        if remaining <= TimeDelta::zero() {
            result.add_critical(format!("expired at {}", format_instant(&expires)));
            return Ok(());
        }

        let ok_message = format!("expires in {}", format_instant(&expires));
        if !opts.validity.is_set() {
            result.add_ok(ok_message);
            return Ok(());
        }

        match evaluate(remaining, &opts.validity, ThresholdPolicy::DescendingOnly) {
            Verdict::InvalidThresholds => result.add_critical("credential: invalid thresholds"),
            Verdict::Status(Status::Ok) => result.add_ok(ok_message),
            Verdict::Status(status) => {
                let breached = match status {
                    Status::Critical => opts.validity.crit,
                    _ => opts.validity.warn,
                };
                let limit = breached.map(humanize_duration).unwrap_or_default();
                result.add(status, format!("expires sooner than {}", limit));
            }
        }

        Ok(())
    }
}
