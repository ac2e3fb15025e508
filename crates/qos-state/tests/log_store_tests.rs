use qos_state::LogStore;

#[test]
fn test_append_strips_line_terminators() {
    let mut store = LogStore::new();
    store.append("mininet_topo", "*** Creating network\n");
    store.append("mininet_topo", "*** Adding hosts\r\n");
    assert_eq!(
        store.get_logs("mininet_topo", 0),
        vec!["*** Creating network", "*** Adding hosts"]
    );
}

#[test]
fn test_get_logs_returns_tail() {
    let mut store = LogStore::new();
    for i in 0..10 {
        store.append("qos_ryu_app", &format!("line {i}"));
    }
    assert_eq!(store.get_logs("qos_ryu_app", 3), vec!["line 7", "line 8", "line 9"]);
    assert_eq!(store.get_logs("qos_ryu_app", 100).len(), 10);
}

#[test]
fn test_unknown_channel_is_empty() {
    let store = LogStore::new();
    assert!(store.get_logs("nope", 2000).is_empty());
    assert!(store.is_empty());
}

#[test]
fn test_channels_are_independent() {
    let mut store = LogStore::new();
    store.append("traffic_file", "dl");
    store.append("traffic_video_abr", "video");
    store.clear("traffic_file");
    assert_eq!(store.len("traffic_file"), 0);
    assert_eq!(store.get_logs("traffic_video_abr", 0), vec!["video"]);
}

#[test]
fn test_retention_drops_oldest() {
    let mut store = LogStore::with_retention(3);
    for i in 0..5 {
        store.append("current_network", &i.to_string());
    }
    assert_eq!(store.get_logs("current_network", 0), vec!["2", "3", "4"]);
}
