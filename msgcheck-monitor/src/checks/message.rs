//! Freshness of the last message stored on a stream subject

use std::time::Duration;

use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use tracing::debug;

use crate::checks::Check;
use crate::error::Result;
use crate::format::compact_duration;
use crate::perfdata::{seconds, PerfDatum, Unit};
use crate::result::{CheckResult, Status};
use crate::snapshot::StoredMessage;
use crate::threshold::{evaluate, ThresholdPolicy, Thresholds, Verdict};

#[derive(Debug, Clone, Default)]
pub struct MessageOptions {
    pub stream: String,
    pub subject: String,
    /// Read the body as decimal Unix seconds instead of using publish time
    pub body_as_timestamp: bool,
    /// Older is worse
    pub age: Thresholds<TimeDelta>,
}

pub struct MessageCheck {
    options: MessageOptions,
}

impl MessageCheck {
    pub fn new(options: MessageOptions) -> Self {
        Self { options }
    }

    fn body_timestamp(data: &[u8]) -> std::result::Result<DateTime<Utc>, String> {
        let text = std::str::from_utf8(data).map_err(|e| e.to_string())?;
        let secs = text.trim().parse::<i64>().map_err(|e| e.to_string())?;
        Utc.timestamp_opt(secs, 0)
            .single()
            .ok_or_else(|| format!("{} is out of range", secs))
    }
}

impl Check for MessageCheck {
    type Snapshot = StoredMessage;

    fn name(&self) -> &'static str {
        "message"
    }

    fn check(
        &self,
        result: &mut CheckResult,
        snapshot: Option<&StoredMessage>,
        now: DateTime<Utc>,
    ) -> Result<()> {
        let opts = &self.options;

        let Some(msg) = snapshot else {
            result.add_critical("no message found");
            return Ok(());
        };

        let stamp = if opts.body_as_timestamp {
            match Self::body_timestamp(&msg.data) {
                Ok(stamp) => stamp,
                Err(reason) => {
                    result.add_critical(format!("invalid timestamp body: {}", reason));
                    return Ok(());
                }
            }
        } else {
            msg.published
        };

        let age = now - stamp;
        debug!(
            stream = %opts.stream,
            subject = %opts.subject,
            age_ms = age.num_milliseconds(),
            "last message age"
        );

        result.add_perf_data(
            PerfDatum::new("age", seconds(age), Unit::Seconds)
                .with_thresholds(opts.age.warn.map(seconds), opts.age.crit.map(seconds)),
        );

        let ok_message = format!("Valid message on {} > {}", opts.stream, opts.subject);
        if !opts.age.is_set() {
            result.add_ok(ok_message);
            return Ok(());
        }

        let shown = age
            .to_std()
            .map(|d| compact_duration(Duration::from_millis(d.as_millis() as u64)))
            .unwrap_or_else(|_| "0s".to_string());

        let verdict = evaluate(age, &opts.age, ThresholdPolicy::AscendingOnly);
        match verdict {
            Verdict::Status(Status::Ok) => result.add_ok(ok_message),
            _ => result.add_verdict(verdict, format!("{} old", shown), "age: invalid thresholds"),
        }

        Ok(())
    }
}
