//! Account resource usage against server-enforced limits

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::checks::Check;
use crate::error::{CheckError, Result};
use crate::perfdata::{PerfDatum, Unit};
use crate::result::CheckResult;
use crate::snapshot::{AccountSnapshot, ResourceUsage};
use crate::threshold::{evaluate, ThresholdPolicy, Thresholds};

/// Percentage thresholds per resource
#[derive(Debug, Clone, Default)]
pub struct AccountOptions {
    pub memory: Thresholds<u64>,
    pub storage: Thresholds<u64>,
    pub streams: Thresholds<u64>,
    pub consumers: Thresholds<u64>,
}

pub struct AccountCheck {
    options: AccountOptions,
}

impl AccountCheck {
    pub fn new(options: AccountOptions) -> Self {
        Self { options }
    }

    fn check_resource(
        result: &mut CheckResult,
        item: &str,
        unit: Unit,
        usage: ResourceUsage,
        thresholds: &Thresholds<u64>,
    ) {
        let pct = usage.percent();
        let limits = thresholds.map(|v| v as f64);

        result.add_perf_data(PerfDatum::new(item, usage.used as f64, unit));
        result.add_perf_data(
            PerfDatum::new(format!("{}_pct", item), pct as f64, Unit::Percent)
                .with_thresholds(limits.warn, limits.crit),
        );

        if usage.is_limited() && thresholds.is_set() {
            result.add_verdict(
                evaluate(pct, thresholds, ThresholdPolicy::AscendingOnly),
                format!("{}% {}", pct, item),
                format!("{}: invalid thresholds", item),
            );
        }

        if usage.exceeds_limit() {
            debug!(item = %item, used = usage.used, max = usage.max, "usage beyond server limit");
            result.add_critical(format!("{}: exceed server limits", item));
        }
    }
}

impl Check for AccountCheck {
    type Snapshot = AccountSnapshot;

    fn name(&self) -> &'static str {
        "account"
    }

    fn check(
        &self,
        result: &mut CheckResult,
        snapshot: Option<&AccountSnapshot>,
        _now: DateTime<Utc>,
    ) -> Result<()> {
        let info = snapshot.ok_or(CheckError::NoData)?;
        let opts = &self.options;

        Self::check_resource(result, "memory", Unit::Bytes, info.memory, &opts.memory);
        Self::check_resource(result, "storage", Unit::Bytes, info.storage, &opts.storage);
        Self::check_resource(result, "streams", Unit::Count, info.streams, &opts.streams);
        Self::check_resource(result, "consumers", Unit::Count, info.consumers, &opts.consumers);

        Ok(())
    }
}
