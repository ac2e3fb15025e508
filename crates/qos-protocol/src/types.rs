use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ProtocolError;

/// A named backend log channel. Every runnable script writes to the channel
/// of the same name, so the set doubles as the set of runnable targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogTarget {
    QosRyuApp,
    MininetTopo,
    DecisionEnginePushToRyu,
    CurrentNetwork,
    TrafficVideoAbr,
    TrafficFile,
}

impl LogTarget {
    /// All targets, in panel order.
    pub const ALL: [LogTarget; 6] = [
        LogTarget::QosRyuApp,
        LogTarget::MininetTopo,
        LogTarget::DecisionEnginePushToRyu,
        LogTarget::CurrentNetwork,
        LogTarget::TrafficVideoAbr,
        LogTarget::TrafficFile,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LogTarget::QosRyuApp => "qos_ryu_app",
            LogTarget::MininetTopo => "mininet_topo",
            LogTarget::DecisionEnginePushToRyu => "decision_engine_push_to_ryu",
            LogTarget::CurrentNetwork => "current_network",
            LogTarget::TrafficVideoAbr => "traffic_video_abr",
            LogTarget::TrafficFile => "traffic_file",
        }
    }

    /// The traffic generator this target belongs to, if any.
    pub fn traffic_kind(&self) -> Option<TrafficKind> {
        match self {
            LogTarget::TrafficVideoAbr => Some(TrafficKind::Video),
            LogTarget::TrafficFile => Some(TrafficKind::Download),
            _ => None,
        }
    }

    /// True for the QoS controller whose liveness drives the status badge.
    pub fn is_qos_controller(&self) -> bool {
        matches!(self, LogTarget::QosRyuApp)
    }
}

impl fmt::Display for LogTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogTarget {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LogTarget::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| ProtocolError::UnknownLogTarget(s.to_string()))
    }
}

/// Synthetic traffic generators that can be switched on and off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrafficKind {
    Video,
    Download,
}

impl TrafficKind {
    pub const ALL: [TrafficKind; 2] = [TrafficKind::Video, TrafficKind::Download];

    /// Path segment used by the toggle endpoints.
    pub fn as_str(&self) -> &'static str {
        match self {
            TrafficKind::Video => "video",
            TrafficKind::Download => "download",
        }
    }

    pub fn log_target(&self) -> LogTarget {
        match self {
            TrafficKind::Video => LogTarget::TrafficVideoAbr,
            TrafficKind::Download => LogTarget::TrafficFile,
        }
    }

    /// The start/stop control pair enabled once the generator is ready.
    pub fn controls(&self) -> [ControlId; 2] {
        match self {
            TrafficKind::Video => [ControlId::VideoOn, ControlId::VideoOff],
            TrafficKind::Download => [ControlId::DownloadOn, ControlId::DownloadOff],
        }
    }

    /// `POST /api/{video|download}/{start|stop}`
    pub fn toggle_path(&self, toggle: Toggle) -> String {
        format!("/api/{}/{}", self.as_str(), toggle.as_str())
    }
}

impl fmt::Display for TrafficKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TrafficKind {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "video" => Ok(TrafficKind::Video),
            "download" => Ok(TrafficKind::Download),
            other => Err(ProtocolError::UnknownTrafficKind(other.to_string())),
        }
    }
}

/// Requested generator state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggle {
    Start,
    Stop,
}

impl Toggle {
    pub fn from_on(is_on: bool) -> Self {
        if is_on {
            Toggle::Start
        } else {
            Toggle::Stop
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Toggle::Start => "start",
            Toggle::Stop => "stop",
        }
    }
}

impl FromStr for Toggle {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "on" | "start" => Ok(Toggle::Start),
            "off" | "stop" => Ok(Toggle::Stop),
            other => Err(ProtocolError::UnknownToggle(other.to_string())),
        }
    }
}

/// Identifiers of the generator start/stop controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ControlId {
    VideoOn,
    VideoOff,
    DownloadOn,
    DownloadOff,
}

impl ControlId {
    pub const ALL: [ControlId; 4] = [
        ControlId::VideoOn,
        ControlId::VideoOff,
        ControlId::DownloadOn,
        ControlId::DownloadOff,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ControlId::VideoOn => "video-on",
            ControlId::VideoOff => "video-off",
            ControlId::DownloadOn => "download-on",
            ControlId::DownloadOff => "download-off",
        }
    }

    pub fn kind(&self) -> TrafficKind {
        match self {
            ControlId::VideoOn | ControlId::VideoOff => TrafficKind::Video,
            ControlId::DownloadOn | ControlId::DownloadOff => TrafficKind::Download,
        }
    }

    pub fn toggle(&self) -> Toggle {
        match self {
            ControlId::VideoOn | ControlId::DownloadOn => Toggle::Start,
            ControlId::VideoOff | ControlId::DownloadOff => Toggle::Stop,
        }
    }
}

impl fmt::Display for ControlId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
