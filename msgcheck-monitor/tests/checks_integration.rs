use std::io::Write;

use chrono::{TimeZone, Utc};
use msgcheck_monitor::{
    AccountCheck, AccountSnapshot, Check, CheckConfig, CheckResult, ClusterCheck, ClusterSnapshot,
    CredentialCheck, CredentialSnapshot, Status, VitalsCheck, VitalsSnapshot,
};
use tempfile::Builder;

fn config(contents: &str) -> CheckConfig {
    let mut file = Builder::new().suffix(".toml").tempfile().unwrap();
    write!(file, "{}", contents).unwrap();
    CheckConfig::load(file.path()).unwrap()
}

#[test]
fn test_vitals_from_config_and_json() {
    let config = config(
        r#"
[vitals]
name = "n1"
jetstream_required = true
uptime_warn_secs = 1200
uptime_crit_secs = 600
cpu_warn = 30
cpu_crit = 50
connections_warn = 1300
connections_crit = 1200
"#,
    );

    let vz: VitalsSnapshot = serde_json::from_str(
        r#"{
            "name": "n1",
            "jetstream_enabled": true,
            "cpu": 50.0,
            "connections": 1024,
            "now": "2024-01-01T00:10:00Z",
            "start": "2024-01-01T00:00:00Z"
        }"#,
    )
    .unwrap();

    let mut result = CheckResult::new();
    VitalsCheck::new(config.vitals_options())
        .check(&mut result, Some(&vz), Utc::now())
        .unwrap();

    assert_eq!(result.status(), Status::Critical);
    assert_eq!(result.oks(), ["JetStream enabled"]);
    assert_eq!(result.criticals(), ["Up 10m0s", "CPU 50.00", "Connections 1024.00"]);

    let pd = result.render();
    assert!(pd.contains("uptime=600.0000s;1200.0000;600.0000"));
    assert!(pd.contains("cpu=50%;30;50"));
    assert!(pd.contains("connections=1024;1300;1200"));
}

#[test]
fn test_account_defaults_apply_without_file_values() {
    let config = config("[vitals]\n");

    let info: AccountSnapshot = serde_json::from_str(
        r#"{
            "memory": {"used": 960, "max": 1024},
            "storage": {"used": 1024, "max": 20480}
        }"#,
    )
    .unwrap();

    let mut result = CheckResult::new();
    AccountCheck::new(config.account_options())
        .check(&mut result, Some(&info), Utc::now())
        .unwrap();

    assert_eq!(result.criticals(), ["93% memory"]);
    assert_eq!(result.oks(), ["5% storage"]);
    assert_eq!(result.status().exit_code(), 2);
}

#[test]
fn test_cluster_peer_activity_in_nanoseconds() {
    let config = config(
        r#"
[cluster]
expected_peers = 3
seen_critical_secs = 1
lag_critical = 10
"#,
    );

    let meta: ClusterSnapshot = serde_json::from_str(
        r#"{
            "name": "C1",
            "leader": "l1",
            "replicas": [
                {"name": "r1", "current": true, "active": 36000000000000, "lag": 1},
                {"name": "r2", "current": true, "active": 10000000, "lag": 1}
            ]
        }"#,
    )
    .unwrap();

    let mut result = CheckResult::new();
    ClusterCheck::new(config.cluster_options())
        .check(&mut result, Some(&meta), Utc::now())
        .unwrap();

    assert_eq!(result.criticals(), ["1 inactive more than 1s"]);
    assert!(result.oks().is_empty());
}

#[test]
fn test_credential_thresholds_from_config() {
    let config = config(
        r#"
[credential]
requires_expiry = true
validity_warn_secs = 2592000
validity_crit_secs = 604800
"#,
    );

    let now = Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap();
    let credential = CredentialSnapshot {
        expires: Some(Utc.with_ymd_and_hms(2030, 1, 15, 0, 0, 0).unwrap()),
    };

    let mut result = CheckResult::new();
    CredentialCheck::new(config.credential_options())
        .check(&mut result, Some(&credential), now)
        .unwrap();

    assert_eq!(result.warnings(), ["expires sooner than 30d0h0m0s"]);
    assert_eq!(result.render(), "expiry=1209600.0000s;2592000.0000;604800.0000");
}

#[test]
fn test_result_round_trips_through_json() {
    let mut result = CheckResult::new();
    result.add_warning("CPU 50.00");

    let json = serde_json::to_string(&result).unwrap();
    let back: CheckResult = serde_json::from_str(&json).unwrap();
    assert_eq!(back, result);
}
