//! Server level vitals: feature flags, uptime, CPU, memory and client load

use chrono::{DateTime, TimeDelta, Utc};
use humansize::{format_size, BINARY};
use tracing::debug;

use crate::checks::Check;
use crate::error::{CheckError, Result};
use crate::format::humanize_duration;
use crate::perfdata::{seconds, PerfDatum, Unit};
use crate::result::CheckResult;
use crate::snapshot::VitalsSnapshot;
use crate::threshold::{evaluate, ThresholdPolicy, Thresholds};

#[derive(Debug, Clone, Default)]
pub struct VitalsOptions {
    /// Expected server name, any name is accepted when unset
    pub name: Option<String>,
    pub jetstream_required: bool,
    pub tls_required: bool,
    pub auth_required: bool,
    /// Lower uptime is worse
    pub uptime: Thresholds<TimeDelta>,
    pub cpu: Thresholds<f64>,
    pub memory: Thresholds<u64>,
    /// Either direction, operators alert on too few as well as too many
    pub connections: Thresholds<u64>,
    pub subscriptions: Thresholds<u64>,
    pub slow_consumers: Thresholds<u64>,
}

pub struct VitalsCheck {
    options: VitalsOptions,
}

impl VitalsCheck {
    pub fn new(options: VitalsOptions) -> Self {
        Self { options }
    }

    fn check_requirement(
        result: &mut CheckResult,
        required: bool,
        present: bool,
        met: &str,
        unmet: &str,
    ) {
        if !required {
            return;
        }
        if present {
            result.add_ok(met);
        } else {
            result.add_critical(unmet);
        }
    }

    fn classify<T: PartialOrd + Copy>(
        result: &mut CheckResult,
        label: &str,
        value: T,
        shown: String,
        thresholds: &Thresholds<T>,
        policy: ThresholdPolicy,
    ) {
        if !thresholds.is_set() {
            return;
        }

        result.add_verdict(
            evaluate(value, thresholds, policy),
            format!("{} {}", label, shown),
            format!("{} invalid thresholds", label),
        );
    }
}

impl Check for VitalsCheck {
    type Snapshot = VitalsSnapshot;

    fn name(&self) -> &'static str {
        "vitals"
    }

    fn check(
        &self,
        result: &mut CheckResult,
        snapshot: Option<&VitalsSnapshot>,
        _now: DateTime<Utc>,
    ) -> Result<()> {
        let vz = snapshot.ok_or(CheckError::NoData)?;

        if let Some(expected) = &self.options.name {
            if vz.name != *expected {
                debug!(expected = %expected, reported = %vz.name, "vitals from unexpected server");
                return Err(CheckError::WrongTarget(vz.name.clone()));
            }
        }

        let opts = &self.options;
        debug!(server = %vz.name, "checking server vitals");

        Self::check_requirement(
            result,
            opts.jetstream_required,
            vz.jetstream_enabled,
            "JetStream enabled",
            "JetStream not enabled",
        );
        Self::check_requirement(
            result,
            opts.tls_required,
            vz.tls_required,
            "TLS required",
            "TLS not required",
        );
        Self::check_requirement(
            result,
            opts.auth_required,
            vz.auth_required,
            "Authentication required",
            "Authentication not required",
        );

        let uptime = vz.uptime();
        Self::classify(
            result,
            "Up",
            uptime,
            humanize_duration(uptime),
            &opts.uptime,
            ThresholdPolicy::DescendingOnly,
        );
        result.add_perf_data(
            PerfDatum::new("uptime", seconds(uptime), Unit::Seconds)
                .with_thresholds(opts.uptime.warn.map(seconds), opts.uptime.crit.map(seconds)),
        );

        Self::classify(
            result,
            "CPU",
            vz.cpu,
            format!("{:.2}", vz.cpu),
            &opts.cpu,
            ThresholdPolicy::AscendingOnly,
        );
        result.add_perf_data(
            PerfDatum::new("cpu", vz.cpu, Unit::Percent)
                .with_thresholds(opts.cpu.warn, opts.cpu.crit),
        );

        Self::classify(
            result,
            "Memory",
            vz.mem,
            format_size(vz.mem, BINARY),
            &opts.memory,
            ThresholdPolicy::AscendingOnly,
        );
        let memory = opts.memory.map(|v| v as f64);
        result.add_perf_data(
            PerfDatum::new("mem", vz.mem as f64, Unit::Bytes)
                .with_thresholds(memory.warn, memory.crit),
        );

        let counters = [
            (
                "Connections",
                "connections",
                vz.connections,
                &opts.connections,
                ThresholdPolicy::AutoDetect,
            ),
            (
                "Subscriptions",
                "subscriptions",
                vz.subscriptions,
                &opts.subscriptions,
                ThresholdPolicy::AutoDetect,
            ),
            (
                "Slow Consumers",
                "slow_consumers",
                vz.slow_consumers,
                &opts.slow_consumers,
                ThresholdPolicy::AscendingOnly,
            ),
        ];

        for (label, perf_label, value, thresholds, policy) in counters {
            let shown = format!("{:.2}", value as f64);
            Self::classify(result, label, value, shown, thresholds, policy);

            let limits = thresholds.map(|v| v as f64);
            result.add_perf_data(
                PerfDatum::new(perf_label, value as f64, Unit::Count)
                    .with_thresholds(limits.warn, limits.crit),
            );
        }

        Ok(())
    }
}
