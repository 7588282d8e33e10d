use anyhow::Result;
use clap::ValueEnum;
use msgcheck_monitor::{CheckResult, Status};
use prometheus::{Encoder, Gauge, Opts, Registry, TextEncoder};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Single plugin line with perf data after `|`
    Nagios,
    /// One finding per line
    Text,
    Json,
    /// Text exposition format
    Prometheus,
}

#[derive(Serialize)]
struct JsonReport<'a> {
    check: &'a str,
    status: Status,
    exit_code: i32,
    #[serde(flatten)]
    result: &'a CheckResult,
}

pub fn render(check: &str, result: &CheckResult, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Nagios => Ok(nagios(check, result)),
        OutputFormat::Text => Ok(text(check, result)),
        OutputFormat::Json => json(check, result),
        OutputFormat::Prometheus => prometheus(check, result),
    }
}

pub fn nagios(check: &str, result: &CheckResult) -> String {
    let mut line = format!("{} {}", check.to_uppercase(), result.status());

    let sections = [
        ("Crit", result.criticals()),
        ("Warn", result.warnings()),
        ("OK", result.oks()),
    ];
    for (label, messages) in sections {
        if !messages.is_empty() {
            line.push_str(&format!(" {}:{}", label, messages.join(", ")));
        }
    }

    if !result.perf_data().is_empty() {
        line.push_str(" |");
        line.push_str(&result.render());
    }

    line
}

fn text(check: &str, result: &CheckResult) -> String {
    let mut lines = vec![format!("{}: {}", check, result.status())];

    for status in [Status::Critical, Status::Warning, Status::Ok] {
        for message in result.messages(status) {
            lines.push(format!("  [{}] {}", status, message));
        }
    }
    for datum in result.perf_data().iter() {
        lines.push(format!("  {}", datum));
    }

    lines.join("\n")
}

fn json(check: &str, result: &CheckResult) -> Result<String> {
    let status = result.status();
    let report = JsonReport {
        check,
        status,
        exit_code: status.exit_code(),
        result,
    };
    Ok(serde_json::to_string_pretty(&report)?)
}

fn metric_name(check: &str, label: &str) -> String {
    let label: String = label
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect();
    format!("msgcheck_{}_{}", check, label)
}

fn prometheus(check: &str, result: &CheckResult) -> Result<String> {
    let registry = Registry::new();

    for datum in result.perf_data().iter() {
        let help = match datum.unit.suffix() {
            "" => datum.label.clone(),
            unit => format!("{} ({})", datum.label, unit),
        };
        let gauge = Gauge::with_opts(Opts::new(metric_name(check, &datum.label), help))?;
        gauge.set(datum.value);
        registry.register(Box::new(gauge))?;
    }

    let status = Gauge::with_opts(Opts::new(
        metric_name(check, "status"),
        "Check status: 0 ok, 1 warning, 2 critical",
    ))?;
    status.set(f64::from(result.status().exit_code()));
    registry.register(Box::new(status))?;

    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();
    encoder.encode(&registry.gather(), &mut buffer)?;
    Ok(String::from_utf8(buffer)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use msgcheck_monitor::{PerfDatum, Unit};

    fn sample() -> CheckResult {
        let mut result = CheckResult::new();
        result.add_critical("1 offline");
        result.add_critical("1 not current");
        result.add_warning("CPU 50.00");
        result.add_ok("JetStream enabled");
        result.add_perf_data(
            PerfDatum::new("peers", 3.0, Unit::Count).with_thresholds(Some(3.0), Some(3.0)),
        );
        result.add_perf_data(PerfDatum::new("uptime", 600.0, Unit::Seconds));
        result
    }

    #[test]
    fn test_nagios_line() {
        assert_eq!(
            nagios("cluster", &sample()),
            "CLUSTER CRITICAL Crit:1 offline, 1 not current Warn:CPU 50.00 OK:JetStream enabled |peers=3;3;3 uptime=600.0000s"
        );
    }

    #[test]
    fn test_nagios_without_perf_data() {
        let mut result = CheckResult::new();
        result.add_critical("No leader");
        assert_eq!(nagios("cluster", &result), "CLUSTER CRITICAL Crit:No leader");
    }

    #[test]
    fn test_nagios_empty_result_is_ok() {
        assert_eq!(nagios("account", &CheckResult::new()), "ACCOUNT OK");
    }

    #[test]
    fn test_text_orders_by_severity() {
        let out = text("cluster", &sample());
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "cluster: CRITICAL");
        assert_eq!(lines[1], "  [CRITICAL] 1 offline");
        assert_eq!(lines[3], "  [WARNING] CPU 50.00");
        assert_eq!(lines[4], "  [OK] JetStream enabled");
        assert_eq!(lines[5], "  peers=3;3;3");
    }

    #[test]
    fn test_json_report() {
        let out = json("cluster", &sample()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["check"], "cluster");
        assert_eq!(value["status"], "Critical");
        assert_eq!(value["exit_code"], 2);
        assert_eq!(value["criticals"][0], "1 offline");
        assert_eq!(value["perf_data"][0]["label"], "peers");
    }

    #[test]
    fn test_prometheus_exposition() {
        let out = prometheus("cluster", &sample()).unwrap();
        assert!(out.contains("# TYPE msgcheck_cluster_peers gauge"));
        assert!(out.contains("msgcheck_cluster_peers 3"));
        assert!(out.contains("msgcheck_cluster_uptime 600"));
        assert!(out.contains("msgcheck_cluster_status 2"));
    }

    #[test]
    fn test_metric_name_sanitized() {
        assert_eq!(metric_name("vitals", "slow-consumers"), "msgcheck_vitals_slow_consumers");
    }
}
