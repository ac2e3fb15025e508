use qos_state::read_decision_log;

#[test]
fn test_missing_file_has_no_rows() {
    let dir = tempfile::tempdir().unwrap();
    assert!(read_decision_log(&dir.path().join("decision_engine_log.csv"))
        .unwrap()
        .is_empty());
}

#[test]
fn test_reads_header_and_rows() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("decision_engine_log.csv");
    std::fs::write(
        &path,
        "timestamp,flow,priority,reason\n10:00:00,video,high,\"delay > 50ms, congestion\"\n",
    )
    .unwrap();

    let rows = read_decision_log(&path).unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0], vec!["timestamp", "flow", "priority", "reason"]);
    assert_eq!(rows[1][3], "delay > 50ms, congestion");
}
