use qos_protocol::*;

#[test]
fn test_run_response_truthiness() {
    let ready: RunScriptResponse = serde_json::from_str(r#"{"status":"ready"}"#).unwrap();
    assert!(ready.is_ready());

    let flag: RunScriptResponse = serde_json::from_str(r#"{"status":true}"#).unwrap();
    assert!(flag.is_ready());

    let off: RunScriptResponse = serde_json::from_str(r#"{"status":false}"#).unwrap();
    assert!(!off.is_ready());

    let empty: RunScriptResponse = serde_json::from_str(r#"{"status":""}"#).unwrap();
    assert!(!empty.is_ready());

    let error: RunScriptResponse =
        serde_json::from_str(r#"{"error":"Unknown script."}"#).unwrap();
    assert!(!error.is_ready());
    assert_eq!(error.error.as_deref(), Some("Unknown script."));
}

#[test]
fn test_run_response_serializes_only_present_fields() {
    let json = serde_json::to_string(&RunScriptResponse::status("started")).unwrap();
    assert_eq!(json, r#"{"status":"started"}"#);

    let json = serde_json::to_string(&RunScriptResponse::error("Unknown script.")).unwrap();
    assert_eq!(json, r#"{"error":"Unknown script."}"#);
}

#[test]
fn test_qos_badge_defaults_to_idle() {
    let absent: QosStatusResponse = serde_json::from_str("{}").unwrap();
    assert_eq!(absent.badge_text(), "IDLE");
    assert!(!absent.is_active());

    let null: QosStatusResponse = serde_json::from_str(r#"{"status":null}"#).unwrap();
    assert_eq!(null.badge_text(), "IDLE");

    let active: QosStatusResponse = serde_json::from_str(r#"{"status":"ACTIVE"}"#).unwrap();
    assert_eq!(active.badge_text(), "ACTIVE");
    assert!(active.is_active());

    // Only an exact match highlights the badge.
    let lower: QosStatusResponse = serde_json::from_str(r#"{"status":"active"}"#).unwrap();
    assert_eq!(lower.badge_text(), "active");
    assert!(!lower.is_active());
}

#[test]
fn test_logs_text_joins_lines() {
    let logs: LogsResponse = serde_json::from_str(r#"{"logs":["a","b","c"]}"#).unwrap();
    assert_eq!(logs.text(), "a\nb\nc");
    assert_eq!(LogsResponse::default().text(), "");
}

#[test]
fn test_logs_require_field() {
    assert!(serde_json::from_str::<LogsResponse>("{}").is_err());
}

#[test]
fn test_decision_log_missing_or_null_rows_is_empty() {
    let missing: DecisionLogResponse = serde_json::from_str("{}").unwrap();
    assert!(missing.rows().is_empty());
    let null: DecisionLogResponse = serde_json::from_str(r#"{"rows":null}"#).unwrap();
    assert!(null.rows().is_empty());
    let rows: DecisionLogResponse =
        serde_json::from_str(r#"{"rows":[["a","b"],["1","2"]]}"#).unwrap();
    assert_eq!(rows.rows().len(), 2);
}

#[test]
fn test_traffic_snapshot_accepts_integers() {
    let snap: TrafficSnapshot = serde_json::from_str(
        r#"{"timestamps":["t1","t2"],"video":[1,2],"download":[3,4],"total":[4,6]}"#,
    )
    .unwrap();
    assert_eq!(snap.video, vec![1.0, 2.0]);
    assert_eq!(snap.total, vec![4.0, 6.0]);
    assert!(!snap.is_empty());
}
