//! Human readable renderings used inside finding messages

use std::fmt::Write;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};

/// Renders `d` as `<y>y<d>d<h>h<m>m<s>s`, dropping leading zero units.
/// Anything under a minute is shown as fractional seconds (`1.00s`).
/// Negative spans render as zero.
pub fn humanize_duration(d: TimeDelta) -> String {
    let secs = d.num_seconds().max(0);
    let mins = secs / 60;
    let hours = mins / 60;
    let days = hours / 24;
    let years = days / 365;

    if years > 0 {
        format!(
            "{}y{}d{}h{}m{}s",
            years,
            days % 365,
            hours % 24,
            mins % 60,
            secs % 60
        )
    } else if days > 0 {
        format!("{}d{}h{}m{}s", days, hours % 24, mins % 60, secs % 60)
    } else if hours > 0 {
        format!("{}h{}m{}s", hours, mins % 60, secs % 60)
    } else if mins > 0 {
        format!("{}m{}s", mins, secs % 60)
    } else {
        format!("{:.2}s", d.num_milliseconds().max(0) as f64 / 1000.0)
    }
}

/// Compact duration such as `1s`, `1m30s`, `2h0m5.5s` or `250ms`
pub fn compact_duration(d: Duration) -> String {
    if d.is_zero() {
        return "0s".to_string();
    }

    let nanos = d.as_nanos();
    if nanos < 1_000 {
        return format!("{}ns", nanos);
    }
    if nanos < 1_000_000 {
        return format!("{}µs", trim_fraction(nanos as f64 / 1e3));
    }
    if nanos < 1_000_000_000 {
        return format!("{}ms", trim_fraction(nanos as f64 / 1e6));
    }

    let total = d.as_secs();
    let hours = total / 3600;
    let mins = (total % 3600) / 60;
    let secs = total % 60;

    let mut out = String::new();
    if hours > 0 {
        let _ = write!(out, "{}h", hours);
    }
    if hours > 0 || mins > 0 {
        let _ = write!(out, "{}m", mins);
    }

    let frac = d.subsec_nanos();
    if frac == 0 {
        let _ = write!(out, "{}s", secs);
    } else {
        let digits = format!("{:09}", frac);
        let _ = write!(out, "{}.{}s", secs, digits.trim_end_matches('0'));
    }

    out
}

fn trim_fraction(value: f64) -> String {
    let s = format!("{:.3}", value);
    s.trim_end_matches('0').trim_end_matches('.').to_string()
}

/// `2100-01-01 00:00:00 +0000 UTC`
pub fn format_instant(instant: &DateTime<Utc>) -> String {
    instant.format("%Y-%m-%d %H:%M:%S %z UTC").to_string()
}
