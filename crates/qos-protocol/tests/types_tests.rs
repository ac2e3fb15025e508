use qos_protocol::*;

#[test]
fn test_log_target_names_round_trip() {
    let names: Vec<&str> = LogTarget::ALL.iter().map(|t| t.as_str()).collect();
    assert_eq!(
        names,
        vec![
            "qos_ryu_app",
            "mininet_topo",
            "decision_engine_push_to_ryu",
            "current_network",
            "traffic_video_abr",
            "traffic_file",
        ]
    );
    for target in LogTarget::ALL {
        assert_eq!(target.as_str().parse::<LogTarget>().unwrap(), target);
    }
}

#[test]
fn test_unknown_log_target_rejected() {
    let err = "ryu".parse::<LogTarget>().unwrap_err();
    assert_eq!(err, ProtocolError::UnknownLogTarget("ryu".into()));
}

#[test]
fn test_traffic_kind_wiring() {
    assert_eq!(TrafficKind::Video.log_target(), LogTarget::TrafficVideoAbr);
    assert_eq!(TrafficKind::Download.log_target(), LogTarget::TrafficFile);
    assert_eq!(LogTarget::TrafficFile.traffic_kind(), Some(TrafficKind::Download));
    assert_eq!(LogTarget::MininetTopo.traffic_kind(), None);

    assert_eq!(TrafficKind::Video.toggle_path(Toggle::Start), "/api/video/start");
    assert_eq!(TrafficKind::Download.toggle_path(Toggle::from_on(false)), "/api/download/stop");

    for kind in TrafficKind::ALL {
        for control in kind.controls() {
            assert_eq!(control.kind(), kind);
        }
    }
    assert_eq!(ControlId::VideoOff.as_str(), "video-off");
    assert_eq!(ControlId::DownloadOn.toggle(), Toggle::Start);
}

#[test]
fn test_toggle_parsing() {
    assert_eq!("on".parse::<Toggle>().unwrap(), Toggle::Start);
    assert_eq!("stop".parse::<Toggle>().unwrap(), Toggle::Stop);
    assert!("maybe".parse::<Toggle>().is_err());
}

#[test]
fn test_api_paths() {
    assert_eq!(run_path("qos_ryu_app"), "/api/run/qos_ryu_app");
    assert_eq!(logs_path("mininet_topo"), "/api/logs/mininet_topo");
}
