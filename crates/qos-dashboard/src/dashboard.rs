//! The dashboard client: operator actions and view refreshers.
//!
//! Every operation returns a `Result` so callers decide whether to surface a
//! failure. Nothing is retried, and a failed refresh leaves its target as it
//! was.

use futures_util::future::join_all;
use tokio::task::JoinHandle;

use qos_protocol::{LogTarget, RunScriptResponse, Toggle, TrafficKind};

use crate::api_client::ApiClient;
use crate::view::SharedView;
use crate::DashboardError;

#[derive(Debug, Clone)]
pub struct DashboardClient {
    api: ApiClient,
    view: SharedView,
}

/// Handles of the three refreshes started by one poll cycle.
#[derive(Debug)]
pub struct PollCycle {
    pub logs: JoinHandle<()>,
    pub status: JoinHandle<()>,
    pub chart: JoinHandle<()>,
}

impl PollCycle {
    /// Wait for all three refreshes. The poll loop itself never does this.
    pub async fn join(self) {
        let _ = tokio::join!(self.logs, self.status, self.chart);
    }
}

impl DashboardClient {
    pub fn new(api: ApiClient, view: SharedView) -> Self {
        Self { api, view }
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    pub fn view(&self) -> &SharedView {
        &self.view
    }

    /// Start a backend script. Starting the QoS controller refreshes the
    /// status badge right away.
    pub async fn start_script(&self, target: LogTarget) -> Result<RunScriptResponse, DashboardError> {
        let response = self.api.run_script(target).await?;
        tracing::info!(
            script = %target,
            status = ?response.status,
            error = ?response.error,
            "Run script acknowledged"
        );
        if target.is_qos_controller() {
            if let Err(e) = self.update_qos_status().await {
                self.record_failure("qos-status", &e).await;
            }
        }
        Ok(response)
    }

    /// Mark a traffic generator ready. A truthy status enables the kind's
    /// start/stop controls; anything else leaves them as they are.
    pub async fn ready_traffic(&self, kind: TrafficKind) -> Result<RunScriptResponse, DashboardError> {
        let response = self.api.run_script(kind.log_target()).await?;
        if response.is_ready() {
            let enabled = self.view.write().await.enable_controls(kind);
            tracing::debug!(kind = %kind, enabled, "Traffic controls enabled");
        } else {
            tracing::debug!(kind = %kind, status = ?response.status, "Traffic generator not ready");
        }
        Ok(response)
    }

    pub async fn toggle_video(&self, is_on: bool) -> Result<(), DashboardError> {
        self.toggle_traffic(TrafficKind::Video, is_on).await
    }

    pub async fn toggle_download(&self, is_on: bool) -> Result<(), DashboardError> {
        self.toggle_traffic(TrafficKind::Download, is_on).await
    }

    pub async fn toggle_traffic(&self, kind: TrafficKind, is_on: bool) -> Result<(), DashboardError> {
        self.api.toggle(kind, Toggle::from_on(is_on)).await
    }

    /// Refresh one panel. Returns `false` when the panel is not mounted, in
    /// which case nothing is fetched.
    pub async fn refresh_log(&self, target: LogTarget) -> Result<bool, DashboardError> {
        if !self.view.read().await.has_panel(target) {
            tracing::trace!(panel = %target, "Panel not mounted, skipping");
            return Ok(false);
        }
        let logs = self.api.fetch_logs(target).await?;
        Ok(self.view.write().await.apply_logs(target, &logs))
    }

    /// Refresh every panel concurrently. Each panel is applied as soon as its
    /// own response arrives; failures are logged per panel.
    pub async fn refresh_logs(&self) {
        let refreshes = LogTarget::ALL.map(|target| async move {
            if let Err(e) = self.refresh_log(target).await {
                self.record_failure(target.as_str(), &e).await;
            }
        });
        join_all(refreshes).await;
    }

    pub async fn update_qos_status(&self) -> Result<(), DashboardError> {
        let status = self.api.fetch_qos_status().await?;
        self.view.write().await.apply_qos_status(&status);
        Ok(())
    }

    pub async fn update_chart(&self) -> Result<(), DashboardError> {
        let snapshot = self.api.fetch_traffic().await?;
        self.view.write().await.apply_traffic(&snapshot);
        Ok(())
    }

    pub async fn load_decision_log(&self) -> Result<(), DashboardError> {
        let log = self.api.fetch_decision_log().await?;
        self.view.write().await.apply_decision_log(&log);
        Ok(())
    }

    /// Start one poll cycle: logs, status and chart, each in its own task.
    /// Returns without waiting for any of them.
    pub fn poll_cycle(&self) -> PollCycle {
        let logs = {
            let client = self.clone();
            tokio::spawn(async move { client.refresh_logs().await })
        };
        let status = {
            let client = self.clone();
            tokio::spawn(async move {
                if let Err(e) = client.update_qos_status().await {
                    client.record_failure("qos-status", &e).await;
                }
            })
        };
        let chart = {
            let client = self.clone();
            tokio::spawn(async move {
                if let Err(e) = client.update_chart().await {
                    client.record_failure("traffic", &e).await;
                }
            })
        };
        PollCycle { logs, status, chart }
    }

    async fn record_failure(&self, what: &str, error: &DashboardError) {
        tracing::debug!(target_name = what, error = %error, "Refresh failed");
        self.view
            .write()
            .await
            .record_failure(format!("{}: {}", what, error));
    }
}
