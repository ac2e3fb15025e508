//! TOML configuration for both the console and the API server.
//!
//! Every field has a default, so an absent file or a partial file is valid.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use qos_protocol::{LogTarget, TrafficKind, LOG_FETCH_LIMIT, POLL_INTERVAL_MS, TRAFFIC_WINDOW};

use crate::DashboardError;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Root URL of the dashboard API server.
    pub base_url: String,
    pub poll_interval_ms: u64,
    /// Per-request timeout. Unset means requests never time out.
    pub request_timeout_ms: Option<u64>,
    /// Log panels shown by the console. Unlisted targets are never fetched.
    pub panels: Vec<LogTarget>,
}

impl ClientConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_ms.map(Duration::from_millis)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000".to_string(),
            poll_interval_ms: POLL_INTERVAL_MS,
            request_timeout_ms: None,
            panels: LogTarget::ALL.to_vec(),
        }
    }
}

/// A synthetic traffic generator: the command to run and where it runs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GeneratorConfig {
    /// Host the generator is attributed to in log messages.
    pub host_label: String,
    pub command: Vec<String>,
}

impl GeneratorConfig {
    pub fn default_for(kind: TrafficKind) -> Self {
        let (host_label, command): (&str, &[&str]) = match kind {
            TrafficKind::Video => (
                "vSvr",
                &["iperf", "-c", "10.0.0.1", "-p", "5001", "-t", "3600", "-i", "1"],
            ),
            TrafficKind::Download => (
                "dSvr",
                &["iperf", "-c", "10.0.0.2", "-p", "5002", "-t", "3600", "-P", "10", "-i", "1"],
            ),
        };
        Self {
            host_label: host_label.to_string(),
            command: command.iter().map(|s| s.to_string()).collect(),
        }
    }
}

fn default_video() -> GeneratorConfig {
    GeneratorConfig::default_for(TrafficKind::Video)
}

fn default_download() -> GeneratorConfig {
    GeneratorConfig::default_for(TrafficKind::Download)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: String,
    /// Directory holding the backend scripts and the CSV files they write.
    pub base_dir: PathBuf,
    /// Program used to launch `<base_dir>/<script>.py`.
    pub interpreter: String,
    pub log_limit: usize,
    pub traffic_window: usize,
    pub traffic_csv: String,
    pub decision_csv: String,
    pub static_dir: String,
    #[serde(default = "default_video")]
    pub video: GeneratorConfig,
    #[serde(default = "default_download")]
    pub download: GeneratorConfig,
}

impl ServerConfig {
    pub fn script_path(&self, target: LogTarget) -> PathBuf {
        self.base_dir.join(format!("{}.py", target.as_str()))
    }

    pub fn traffic_csv_path(&self) -> PathBuf {
        self.base_dir.join(&self.traffic_csv)
    }

    pub fn decision_csv_path(&self) -> PathBuf {
        self.base_dir.join(&self.decision_csv)
    }

    pub fn static_root(&self) -> PathBuf {
        self.base_dir.join(&self.static_dir)
    }

    /// Lines kept per log channel: four fetches' worth. A `log_limit` of
    /// zero (return everything) keeps the default depth.
    pub fn log_retention(&self) -> usize {
        let limit = if self.log_limit == 0 {
            LOG_FETCH_LIMIT
        } else {
            self.log_limit
        };
        limit.saturating_mul(4)
    }

    pub fn generator(&self, kind: TrafficKind) -> &GeneratorConfig {
        match kind {
            TrafficKind::Video => &self.video,
            TrafficKind::Download => &self.download,
        }
    }

    /// Apply the `PORT` environment override to the bind address.
    pub fn apply_port_env(&mut self) {
        if let Some(port) = std::env::var("PORT").ok().and_then(|p| p.parse::<u16>().ok()) {
            let host = self
                .bind_addr
                .rsplit_once(':')
                .map(|(host, _)| host.to_string())
                .unwrap_or_else(|| "0.0.0.0".to_string());
            self.bind_addr = format!("{}:{}", host, port);
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8000".to_string(),
            base_dir: PathBuf::from("."),
            interpreter: "python3".to_string(),
            log_limit: LOG_FETCH_LIMIT,
            traffic_window: TRAFFIC_WINDOW,
            traffic_csv: "network_traffic.csv".to_string(),
            decision_csv: "decision_engine_log.csv".to_string(),
            static_dir: "static".to_string(),
            video: default_video(),
            download: default_download(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `tracing_subscriber::EnvFilter` directive used when `RUST_LOG` is unset.
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "qos_dashboard=info".to_string(),
        }
    }
}

/// Top-level configuration aggregating all sections.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DashboardConfig {
    #[serde(default)]
    pub client: ClientConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// `~/.config/qos-dashboard` on Linux, the platform equivalent elsewhere.
pub fn config_dir() -> PathBuf {
    dirs::config_dir()
        .map(|d| d.join("qos-dashboard"))
        .unwrap_or_else(|| PathBuf::from(".qos-dashboard"))
}

pub fn config_path() -> PathBuf {
    config_dir().join("config.toml")
}

/// Where the console writes its log file.
pub fn log_dir() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("qos-dashboard"))
        .unwrap_or_else(|| PathBuf::from(".qos-dashboard"))
}

pub fn parse_config(text: &str) -> Result<DashboardConfig, DashboardError> {
    toml::from_str(text).map_err(|e| DashboardError::Config(e.to_string()))
}

/// Load a config file that must exist.
pub fn load_config(path: &Path) -> Result<DashboardConfig, DashboardError> {
    let text = std::fs::read_to_string(path).map_err(|e| {
        DashboardError::Config(format!("cannot read {}: {}", path.display(), e))
    })?;
    parse_config(&text)
}

/// Load an explicit config file, or the default one if it exists, or the
/// built-in defaults.
pub fn load_or_default(path: Option<&Path>) -> Result<DashboardConfig, DashboardError> {
    match path {
        Some(p) => load_config(p),
        None => {
            let default_path = config_path();
            if default_path.exists() {
                load_config(&default_path)
            } else {
                Ok(DashboardConfig::default())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_yields_defaults() {
        let cfg = parse_config("").unwrap();
        assert_eq!(cfg.client.poll_interval_ms, 1000);
        assert_eq!(cfg.client.request_timeout(), None);
        assert_eq!(cfg.client.panels.len(), 6);
        assert_eq!(cfg.server.log_limit, 2000);
        assert_eq!(cfg.server.log_retention(), 8000);
        assert_eq!(cfg.server.traffic_window, 60);
        assert_eq!(cfg.server.video.host_label, "vSvr");
        assert_eq!(cfg.server.download.host_label, "dSvr");
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let cfg = parse_config(
            r#"
            [client]
            base_url = "http://10.0.0.254:8000"
            request_timeout_ms = 2500
            panels = ["qos_ryu_app", "traffic_file"]

            [server.video]
            host_label = "h3"
            command = ["sh", "-c", "echo video"]
            "#,
        )
        .unwrap();
        assert_eq!(cfg.client.base_url, "http://10.0.0.254:8000");
        assert_eq!(cfg.client.poll_interval_ms, 1000);
        assert_eq!(cfg.client.request_timeout(), Some(Duration::from_millis(2500)));
        assert_eq!(cfg.client.panels, vec![LogTarget::QosRyuApp, LogTarget::TrafficFile]);
        assert_eq!(cfg.server.video.command, vec!["sh", "-c", "echo video"]);
        assert_eq!(cfg.server.download, GeneratorConfig::default_for(TrafficKind::Download));
    }

    #[test]
    fn unknown_panel_name_is_an_error() {
        let err = parse_config("[client]\npanels = [\"ryu\"]").unwrap_err();
        assert!(matches!(err, DashboardError::Config(_)));
    }

    #[test]
    fn server_paths_resolve_under_base_dir() {
        let cfg = ServerConfig {
            base_dir: PathBuf::from("/opt/testbed"),
            ..Default::default()
        };
        assert_eq!(
            cfg.script_path(LogTarget::MininetTopo),
            PathBuf::from("/opt/testbed/mininet_topo.py")
        );
        assert_eq!(
            cfg.traffic_csv_path(),
            PathBuf::from("/opt/testbed/network_traffic.csv")
        );
        assert_eq!(cfg.static_root(), PathBuf::from("/opt/testbed/static"));
    }
}
