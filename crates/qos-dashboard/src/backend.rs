//! Backend state behind the dashboard API: captured logs, child processes
//! and generator readiness.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::process::Command;
use tokio::sync::{oneshot, RwLock};

use qos_protocol::{
    DecisionLogResponse, LogTarget, LogsResponse, QosStatusResponse, RunScriptResponse,
    StateFlags, Toggle, ToggleResponse, TrafficKind, TrafficSnapshot,
};
use qos_state::{read_decision_log, read_recent_traffic, to_snapshot, LogStore};

use crate::config::ServerConfig;
use crate::process;
use crate::DashboardError;

/// A live child process. Removed by its supervisor when the child exits.
#[derive(Debug)]
pub struct ProcessHandle {
    id: u64,
    /// Taken when a stop is requested.
    stop: Option<oneshot::Sender<()>>,
}

/// Shared state accessible by the HTTP handlers and process supervisors.
#[derive(Debug, Default)]
pub struct BackendState {
    pub log_store: LogStore,
    pub flags: StateFlags,
    processes: HashMap<String, ProcessHandle>,
    next_process_id: u64,
}

pub type SharedBackend = Arc<RwLock<BackendState>>;

impl BackendState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_log_retention(retain: usize) -> Self {
        Self {
            log_store: LogStore::with_retention(retain),
            ..Self::default()
        }
    }

    pub fn push_log(&mut self, channel: &str, line: impl AsRef<str>) {
        self.log_store.append(channel, line.as_ref());
    }

    pub fn is_running(&self, channel: &str) -> bool {
        self.processes.contains_key(channel)
    }

    /// Channels with a live child, sorted.
    pub fn running(&self) -> Vec<String> {
        let mut names: Vec<String> = self.processes.keys().cloned().collect();
        names.sort();
        names
    }

    pub(crate) fn register(&mut self, channel: &str) -> (u64, oneshot::Receiver<()>) {
        let (tx, rx) = oneshot::channel();
        self.next_process_id += 1;
        let id = self.next_process_id;
        self.processes.insert(
            channel.to_string(),
            ProcessHandle {
                id,
                stop: Some(tx),
            },
        );
        (id, rx)
    }

    /// Forget the process `id` if it is still the one registered under
    /// `channel`.
    pub(crate) fn finish(&mut self, channel: &str, id: u64) -> bool {
        match self.processes.get(channel) {
            Some(handle) if handle.id == id => {
                self.processes.remove(channel);
                true
            }
            _ => false,
        }
    }
}

/// What a run request did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// A traffic controller was marked ready.
    Ready,
    Started,
    /// The script already had a live process.
    Running,
}

impl RunOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunOutcome::Ready => "ready",
            RunOutcome::Started => "started",
            RunOutcome::Running => "running",
        }
    }
}

fn kind_label(kind: TrafficKind) -> &'static str {
    match kind {
        TrafficKind::Video => "Video",
        TrafficKind::Download => "Download",
    }
}

#[derive(Debug, Clone)]
pub struct Backend {
    state: SharedBackend,
    config: Arc<ServerConfig>,
}

impl Backend {
    pub fn new(mut config: ServerConfig) -> Self {
        if let Ok(base_dir) = std::fs::canonicalize(&config.base_dir) {
            config.base_dir = base_dir;
        }
        Self {
            state: Arc::new(RwLock::new(BackendState::with_log_retention(
                config.log_retention(),
            ))),
            config: Arc::new(config),
        }
    }

    pub fn state(&self) -> &SharedBackend {
        &self.state
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Handle `POST /api/run/{name}`. Unknown names are answered with an
    /// error body rather than an `Err`.
    pub async fn run_script(&self, name: &str) -> Result<RunScriptResponse, DashboardError> {
        let Ok(target) = name.parse::<LogTarget>() else {
            tracing::debug!(script = name, "Unknown script requested");
            return Ok(RunScriptResponse::error("Unknown script."));
        };
        let outcome = self.run_target(target).await?;
        Ok(RunScriptResponse::status(outcome.as_str()))
    }

    pub async fn run_target(&self, target: LogTarget) -> Result<RunOutcome, DashboardError> {
        match target.traffic_kind() {
            Some(kind) => {
                self.mark_ready(kind).await;
                Ok(RunOutcome::Ready)
            }
            None => self.start_script(target).await,
        }
    }

    /// Traffic generators run on fixed hosts, so "running" one only flags it
    /// ready for the start/stop endpoints.
    async fn mark_ready(&self, kind: TrafficKind) {
        let host = &self.config.generator(kind).host_label;
        let mut state = self.state.write().await;
        match kind {
            TrafficKind::Video => state.flags.video_ready = true,
            TrafficKind::Download => state.flags.download_ready = true,
        }
        state.push_log(
            kind.log_target().as_str(),
            format!("[SYSTEM] {} traffic controller ready on {}.", kind_label(kind), host),
        );
    }

    async fn start_script(&self, target: LogTarget) -> Result<RunOutcome, DashboardError> {
        let name = target.as_str();
        let mut state = self.state.write().await;
        if state.is_running(name) {
            return Ok(RunOutcome::Running);
        }

        let mut command = Command::new(&self.config.interpreter);
        command
            .arg(self.config.script_path(target))
            .current_dir(&self.config.base_dir)
            .env("PYTHONUNBUFFERED", "1");
        let child = process::spawn_piped(command).map_err(|source| DashboardError::Spawn {
            name: name.to_string(),
            source,
        })?;

        let (id, stop_rx) = state.register(name);
        state.push_log(name, format!("[SYSTEM] Started {}.", name));
        drop(state);

        tokio::spawn(process::supervise(
            self.state.clone(),
            name.to_string(),
            id,
            child,
            stop_rx,
        ));
        tracing::info!(script = name, "Started backend script");
        Ok(RunOutcome::Started)
    }

    /// Handle `POST /api/{video|download}/{start|stop}`.
    pub async fn toggle_traffic(
        &self,
        kind: TrafficKind,
        toggle: Toggle,
    ) -> Result<ToggleResponse, DashboardError> {
        match toggle {
            Toggle::Start => {
                self.start_generator(kind).await?;
                Ok(ToggleResponse {
                    status: "started".to_string(),
                })
            }
            Toggle::Stop => {
                self.stop_generator(kind).await;
                Ok(ToggleResponse {
                    status: "stopped".to_string(),
                })
            }
        }
    }

    async fn start_generator(&self, kind: TrafficKind) -> Result<(), DashboardError> {
        let generator = self.config.generator(kind);
        let channel = kind.log_target().as_str();
        let label = kind_label(kind);

        let mut state = self.state.write().await;
        if state.is_running(channel) {
            state.push_log(
                channel,
                format!("[SYSTEM] {} traffic already running on {}.", label, generator.host_label),
            );
            return Ok(());
        }

        let Some(mut command) = process::command_from_argv(&generator.command) else {
            return Err(DashboardError::Config(format!(
                "no command configured for {} traffic",
                kind
            )));
        };
        command.current_dir(&self.config.base_dir);
        let child = process::spawn_piped(command).map_err(|source| DashboardError::Spawn {
            name: channel.to_string(),
            source,
        })?;

        let (id, stop_rx) = state.register(channel);
        state.push_log(
            channel,
            format!(
                "[SYSTEM] Launching {} traffic from {}: {}",
                kind,
                generator.host_label,
                generator.command.join(" ")
            ),
        );
        drop(state);

        tokio::spawn(process::supervise(
            self.state.clone(),
            channel.to_string(),
            id,
            child,
            stop_rx,
        ));
        tracing::info!(kind = %kind, host = %generator.host_label, "Traffic generator started");
        Ok(())
    }

    async fn stop_generator(&self, kind: TrafficKind) {
        let channel = kind.log_target().as_str();
        let mut state = self.state.write().await;
        let message = match state.processes.get_mut(channel) {
            None => format!("[SYSTEM] No active {} traffic to stop.", kind),
            Some(handle) => match handle.stop.take() {
                Some(tx) => {
                    let _ = tx.send(());
                    format!("[SYSTEM] Stop requested for {} traffic.", kind)
                }
                None => format!("[SYSTEM] Stop already requested for {} traffic.", kind),
            },
        };
        state.push_log(channel, message);
    }

    /// Handle `GET /api/logs/{channel}`. Any channel name is accepted.
    pub async fn logs(&self, channel: &str) -> LogsResponse {
        let state = self.state.read().await;
        LogsResponse {
            logs: state.log_store.get_logs(channel, self.config.log_limit),
        }
    }

    /// `ACTIVE` while the QoS controller process is alive.
    pub async fn qos_status(&self) -> QosStatusResponse {
        let state = self.state.read().await;
        QosStatusResponse::active(state.is_running(LogTarget::QosRyuApp.as_str()))
    }

    pub fn traffic(&self) -> Result<TrafficSnapshot, DashboardError> {
        let samples = read_recent_traffic(&self.config.traffic_csv_path(), self.config.traffic_window)?;
        Ok(to_snapshot(&samples))
    }

    pub fn decision_log(&self) -> Result<DecisionLogResponse, DashboardError> {
        let rows = read_decision_log(&self.config.decision_csv_path())?;
        Ok(DecisionLogResponse::new(rows))
    }

    pub async fn flags(&self) -> StateFlags {
        self.state.read().await.flags
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finish_ignores_stale_process_ids() {
        let mut state = BackendState::new();
        let (first, _rx1) = state.register("qos_ryu_app");
        state.finish("qos_ryu_app", first);
        let (second, _rx2) = state.register("qos_ryu_app");

        assert!(!state.finish("qos_ryu_app", first));
        assert!(state.is_running("qos_ryu_app"));
        assert!(state.finish("qos_ryu_app", second));
        assert!(state.running().is_empty());
    }

    #[tokio::test]
    async fn traffic_targets_only_mark_ready() {
        let dir = tempfile::tempdir().unwrap();
        let backend = Backend::new(ServerConfig {
            base_dir: dir.path().to_path_buf(),
            ..Default::default()
        });

        let response = backend.run_script("traffic_file").await.unwrap();
        assert_eq!(response.status_str(), Some("ready"));
        assert_eq!(
            backend.flags().await,
            StateFlags {
                video_ready: false,
                download_ready: true
            }
        );
        assert_eq!(
            backend.logs("traffic_file").await.logs,
            vec!["[SYSTEM] Download traffic controller ready on dSvr."]
        );
        assert!(backend.state().read().await.running().is_empty());
    }

    #[tokio::test]
    async fn configured_log_limit_is_not_capped_by_retention() {
        let backend = Backend::new(ServerConfig {
            log_limit: 9000,
            ..Default::default()
        });
        {
            let mut state = backend.state().write().await;
            for i in 0..10_000 {
                state.push_log("mininet_topo", format!("line {}", i));
            }
        }
        let logs = backend.logs("mininet_topo").await.logs;
        assert_eq!(logs.len(), 9000);
        assert_eq!(logs.first().map(String::as_str), Some("line 1000"));
        assert_eq!(logs.last().map(String::as_str), Some("line 9999"));
    }

    #[tokio::test]
    async fn unknown_script_is_an_error_body() {
        let backend = Backend::new(ServerConfig::default());
        let response = backend.run_script("rm_rf").await.unwrap();
        assert_eq!(response, RunScriptResponse::error("Unknown script."));
    }

    #[tokio::test]
    async fn stopping_idle_generator_is_logged() {
        let backend = Backend::new(ServerConfig::default());
        let response = backend
            .toggle_traffic(TrafficKind::Video, Toggle::Stop)
            .await
            .unwrap();
        assert_eq!(response.status, "stopped");
        assert_eq!(
            backend.logs("traffic_video_abr").await.logs,
            vec!["[SYSTEM] No active video traffic to stop."]
        );
    }
}
