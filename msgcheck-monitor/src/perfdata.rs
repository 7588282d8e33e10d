//! Performance data in the Nagios `label=value[unit];warn;crit;min;max` layout

use std::fmt;

use chrono::TimeDelta;
use serde::{Deserialize, Serialize};

/// Seconds in `d` as a float, for [`Unit::Seconds`] data
pub fn seconds(d: TimeDelta) -> f64 {
    match d.num_nanoseconds() {
        Some(nanos) => nanos as f64 / 1e9,
        None => d.num_milliseconds() as f64 / 1e3,
    }
}

/// Unit tag written directly after the value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Unit {
    Bytes,
    Seconds,
    Percent,
    Count,
}

impl Unit {
    pub fn suffix(&self) -> &'static str {
        match self {
            Unit::Bytes => "B",
            Unit::Seconds => "s",
            Unit::Percent => "%",
            Unit::Count => "",
        }
    }

    /// Renders a bare number the way this unit is reported. Seconds always
    /// carry four decimals, anything else is whole or two decimals.
    pub fn format_number(&self, value: f64) -> String {
        match self {
            Unit::Seconds => format!("{:.4}", value),
            _ if value.fract() == 0.0 => format!("{:.0}", value),
            _ => format!("{:.2}", value),
        }
    }
}

/// One measured quantity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerfDatum {
    pub label: String,
    pub value: f64,
    pub unit: Unit,
    pub warn: Option<f64>,
    pub crit: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl PerfDatum {
    pub fn new(label: impl Into<String>, value: f64, unit: Unit) -> Self {
        Self {
            label: label.into(),
            value,
            unit,
            warn: None,
            crit: None,
            min: None,
            max: None,
        }
    }

    /// Attaches the configured thresholds verbatim, in configured order
    pub fn with_thresholds(mut self, warn: Option<f64>, crit: Option<f64>) -> Self {
        self.warn = warn;
        self.crit = crit;
        self
    }

    pub fn with_range(mut self, min: Option<f64>, max: Option<f64>) -> Self {
        self.min = min;
        self.max = max;
        self
    }

    fn field(&self, value: Option<f64>) -> String {
        value
            .map(|v| self.unit.format_number(v))
            .unwrap_or_default()
    }
}

impl fmt::Display for PerfDatum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}={}{}",
            self.label,
            self.unit.format_number(self.value),
            self.unit.suffix()
        )?;

        let has_range = self.min.is_some() || self.max.is_some();
        if self.warn.is_some() || self.crit.is_some() || has_range {
            write!(f, ";{};{}", self.field(self.warn), self.field(self.crit))?;
        }
        if has_range {
            write!(f, ";{};{}", self.field(self.min), self.field(self.max))?;
        }

        Ok(())
    }
}

/// Ordered, append-only list of perf data
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PerfData(Vec<PerfDatum>);

impl PerfData {
    pub fn push(&mut self, datum: PerfDatum) {
        self.0.push(datum);
    }

    pub fn iter(&self) -> impl Iterator<Item = &PerfDatum> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for PerfData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, datum) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{}", datum)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_formatting() {
        let uptime = PerfDatum::new("uptime", 600.0, Unit::Seconds)
            .with_thresholds(Some(1200.0), Some(600.0));
        assert_eq!(uptime.to_string(), "uptime=600.0000s;1200.0000;600.0000");

        let pct = PerfDatum::new("memory_pct", 12.0, Unit::Percent)
            .with_thresholds(Some(75.0), Some(90.0));
        assert_eq!(pct.to_string(), "memory_pct=12%;75;90");

        assert_eq!(PerfDatum::new("memory", 128.0, Unit::Bytes).to_string(), "memory=128B");
        assert_eq!(PerfDatum::new("peer_lagged", 0.0, Unit::Count).to_string(), "peer_lagged=0");
    }

    #[test]
    fn test_fractions_are_not_truncated() {
        let cpu = PerfDatum::new("cpu", 37.5, Unit::Percent)
            .with_thresholds(Some(62.5), Some(80.0));
        assert_eq!(cpu.to_string(), "cpu=37.50%;62.50;80");

        let mem = PerfDatum::new("mem", 1536.25, Unit::Bytes);
        assert_eq!(mem.to_string(), "mem=1536.25B");
    }

    #[test]
    fn test_thresholds_keep_configured_order() {
        let conns = PerfDatum::new("connections", 1024.0, Unit::Count)
            .with_thresholds(Some(1300.0), Some(1200.0));
        assert_eq!(conns.to_string(), "connections=1024;1300;1200");
    }

    #[test]
    fn test_partial_fields() {
        let warn_only = PerfDatum::new("age", 1.5, Unit::Seconds).with_thresholds(Some(1.0), None);
        assert_eq!(warn_only.to_string(), "age=1.5000s;1.0000;");

        let ranged = PerfDatum::new("cpu", 50.0, Unit::Percent).with_range(Some(0.0), Some(100.0));
        assert_eq!(ranged.to_string(), "cpu=50%;;;0;100");
    }

    #[test]
    fn test_line_is_space_separated() {
        let mut pd = PerfData::default();
        assert_eq!(pd.to_string(), "");

        pd.push(PerfDatum::new("streams", 10.0, Unit::Count));
        pd.push(PerfDatum::new("streams_pct", 5.0, Unit::Percent));
        assert_eq!(pd.to_string(), "streams=10 streams_pct=5%");
        assert_eq!(pd.len(), 2);
        let pct = pd.iter().find(|d| d.label == "streams_pct");
        assert_eq!(pct.map(|d| d.value), Some(5.0));
    }
}
