use std::io::Write;

use qos_state::traffic_csv::{parse_traffic_line, read_recent_traffic, to_snapshot};

fn write_csv(lines: &[String]) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    for line in lines {
        writeln!(file, "{line}").unwrap();
    }
    file
}

#[test]
fn test_parse_line() {
    let sample = parse_traffic_line("12:00:01,7.5,5.0,2.5,extra").unwrap();
    assert_eq!(sample.timestamp, "12:00:01");
    assert_eq!(sample.total_mbps, 7.5);
    assert_eq!(sample.video_mbps, 5.0);
    assert_eq!(sample.download_mbps, 2.5);
}

#[test]
fn test_parse_rejects_header_blank_and_malformed() {
    assert!(parse_traffic_line("hh:mm:ss,total,video,download").is_none());
    assert!(parse_traffic_line("   ").is_none());
    assert!(parse_traffic_line("12:00:01,1.0,2.0").is_none());
    assert!(parse_traffic_line("12:00:01,x,2.0,3.0").is_none());
}

#[test]
fn test_missing_file_is_empty() {
    let dir = tempfile::tempdir().unwrap();
    let samples = read_recent_traffic(&dir.path().join("network_traffic.csv"), 60).unwrap();
    assert!(samples.is_empty());
}

#[test]
fn test_window_is_last_lines() {
    let mut lines = vec!["hh:mm:ss,total_mbps,video_mbps,download_mbps".to_string()];
    for i in 0..100 {
        lines.push(format!("00:00:{:02},{}.0,{}.0,0.0", i % 60, i, i));
    }
    let file = write_csv(&lines);

    let samples = read_recent_traffic(file.path(), 60).unwrap();
    assert_eq!(samples.len(), 60);
    assert_eq!(samples.first().unwrap().total_mbps, 40.0);
    assert_eq!(samples.last().unwrap().total_mbps, 99.0);
}

#[test]
fn test_malformed_lines_shrink_window() {
    let lines = vec![
        "00:00:01,1.0,1.0,0.0".to_string(),
        "garbage".to_string(),
        "00:00:02,2.0,1.0,1.0".to_string(),
    ];
    let file = write_csv(&lines);
    let samples = read_recent_traffic(file.path(), 2).unwrap();
    assert_eq!(samples.len(), 1);
    assert_eq!(samples[0].timestamp, "00:00:02");
}

#[test]
fn test_snapshot_splits_series() {
    let lines = vec![
        "00:00:01,4.0,1.0,3.0".to_string(),
        "00:00:02,6.0,2.0,4.0".to_string(),
    ];
    let file = write_csv(&lines);
    let snapshot = to_snapshot(&read_recent_traffic(file.path(), 60).unwrap());
    assert_eq!(snapshot.timestamps, vec!["00:00:01", "00:00:02"]);
    assert_eq!(snapshot.video, vec![1.0, 2.0]);
    assert_eq!(snapshot.download, vec![3.0, 4.0]);
    assert_eq!(snapshot.total, vec![4.0, 6.0]);
}
