use serde::{Deserialize, Serialize};

use crate::{QOS_ACTIVE, QOS_IDLE};

/// Response to `POST /api/run/{name}`.
///
/// The backend answers `{"status": "started" | "running" | "ready"}` on
/// success and `{"error": "..."}` otherwise. Clients only look at whether
/// `status` is truthy, so it is kept as a raw JSON value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunScriptResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RunScriptResponse {
    pub fn status(status: &str) -> Self {
        Self {
            status: Some(serde_json::Value::String(status.to_string())),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: None,
            error: Some(message.into()),
        }
    }

    /// Whether the backend acknowledged the request with a truthy status.
    pub fn is_ready(&self) -> bool {
        self.status.as_ref().map(is_truthy).unwrap_or(false)
    }

    /// The status as text, when it is a string.
    pub fn status_str(&self) -> Option<&str> {
        self.status.as_ref().and_then(|v| v.as_str())
    }
}

/// Response to the generator toggle endpoints. Clients ignore the body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToggleResponse {
    pub status: String,
}

/// Response to `GET /api/logs/{name}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogsResponse {
    pub logs: Vec<String>,
}

impl LogsResponse {
    /// Panel text: the lines joined with newlines.
    pub fn text(&self) -> String {
        self.logs.join("\n")
    }
}

/// Response to `GET /api/traffic`: parallel series, oldest sample first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrafficSnapshot {
    pub timestamps: Vec<String>,
    pub video: Vec<f64>,
    pub download: Vec<f64>,
    pub total: Vec<f64>,
}

impl TrafficSnapshot {
    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
            && self.video.is_empty()
            && self.download.is_empty()
            && self.total.is_empty()
    }
}

/// Response to `GET /api/qos-status`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QosStatusResponse {
    #[serde(default)]
    pub status: Option<String>,
}

impl QosStatusResponse {
    pub fn active(active: bool) -> Self {
        Self {
            status: Some(if active { QOS_ACTIVE } else { QOS_IDLE }.to_string()),
        }
    }

    /// Text shown on the badge; `IDLE` when the status is absent or empty.
    pub fn badge_text(&self) -> &str {
        match self.status.as_deref() {
            Some(s) if !s.is_empty() => s,
            _ => QOS_IDLE,
        }
    }

    /// The badge is highlighted only for an exact `ACTIVE`.
    pub fn is_active(&self) -> bool {
        self.status.as_deref() == Some(QOS_ACTIVE)
    }
}

/// Response to `GET /api/decision-log`: raw CSV rows, header first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecisionLogResponse {
    #[serde(default)]
    pub rows: Option<Vec<Vec<String>>>,
}

impl DecisionLogResponse {
    pub fn new(rows: Vec<Vec<String>>) -> Self {
        Self { rows: Some(rows) }
    }

    pub fn rows(&self) -> &[Vec<String>] {
        self.rows.as_deref().unwrap_or(&[])
    }
}

/// Response to `GET /api/state-flags`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateFlags {
    pub video_ready: bool,
    pub download_ready: bool,
}

/// JSON truthiness: `false`, `null`, `0`, `NaN` and `""` are falsy.
pub fn is_truthy(value: &serde_json::Value) -> bool {
    match value {
        serde_json::Value::Null => false,
        serde_json::Value::Bool(b) => *b,
        serde_json::Value::Number(n) => n.as_f64().map(|f| f != 0.0 && !f.is_nan()).unwrap_or(true),
        serde_json::Value::String(s) => !s.is_empty(),
        serde_json::Value::Array(_) | serde_json::Value::Object(_) => true,
    }
}
