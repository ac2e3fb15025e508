//! HTTP client for the dashboard API.

use std::time::Duration;

use serde::de::DeserializeOwned;

use qos_protocol::{
    logs_path, run_path, DecisionLogResponse, LogTarget, LogsResponse, QosStatusResponse,
    RunScriptResponse, StateFlags, Toggle, TrafficKind, TrafficSnapshot, API_DECISION_LOG,
    API_QOS_STATUS, API_STATE_FLAGS, API_TRAFFIC,
};

use crate::DashboardError;

/// Thin typed wrapper over the backend endpoints.
///
/// Cloning is cheap; clones share one connection pool.
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
    client: reqwest::Client,
}

impl ApiClient {
    /// Create a client for `base_url`. With `timeout` unset requests wait
    /// indefinitely.
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self, DashboardError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: builder.build().map_err(DashboardError::Client)?,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Decode a response body regardless of status; a non-JSON body on an
    /// error status is reported as that status.
    async fn decode<T: DeserializeOwned>(
        path: &str,
        response: reqwest::Response,
    ) -> Result<T, DashboardError> {
        let status = response.status();
        let body = response.bytes().await.map_err(|source| DashboardError::Http {
            path: path.to_string(),
            source,
        })?;
        serde_json::from_slice(&body).map_err(|source| {
            if status.is_success() {
                DashboardError::Decode {
                    path: path.to_string(),
                    source,
                }
            } else {
                DashboardError::Status {
                    path: path.to_string(),
                    status: status.as_u16(),
                }
            }
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, DashboardError> {
        let response = self
            .client
            .get(self.url(path))
            .send()
            .await
            .map_err(|source| DashboardError::Http {
                path: path.to_string(),
                source,
            })?;
        Self::decode(path, response).await
    }

    async fn post_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, DashboardError> {
        let response = self
            .client
            .post(self.url(path))
            .send()
            .await
            .map_err(|source| DashboardError::Http {
                path: path.to_string(),
                source,
            })?;
        Self::decode(path, response).await
    }

    /// `POST /api/run/{name}`
    pub async fn run_script(&self, target: LogTarget) -> Result<RunScriptResponse, DashboardError> {
        self.post_json(&run_path(target.as_str())).await
    }

    /// `POST /api/{video|download}/{start|stop}`. The body is not inspected.
    pub async fn toggle(&self, kind: TrafficKind, toggle: Toggle) -> Result<(), DashboardError> {
        let path = kind.toggle_path(toggle);
        self.client
            .post(self.url(&path))
            .send()
            .await
            .map_err(|source| DashboardError::Http { path, source })?;
        Ok(())
    }

    /// `GET /api/logs/{name}`
    pub async fn fetch_logs(&self, target: LogTarget) -> Result<LogsResponse, DashboardError> {
        self.get_json(&logs_path(target.as_str())).await
    }

    /// `GET /api/traffic`
    pub async fn fetch_traffic(&self) -> Result<TrafficSnapshot, DashboardError> {
        self.get_json(API_TRAFFIC).await
    }

    /// `GET /api/qos-status`
    pub async fn fetch_qos_status(&self) -> Result<QosStatusResponse, DashboardError> {
        self.get_json(API_QOS_STATUS).await
    }

    /// `GET /api/decision-log`
    pub async fn fetch_decision_log(&self) -> Result<DecisionLogResponse, DashboardError> {
        self.get_json(API_DECISION_LOG).await
    }

    /// `GET /api/state-flags`
    pub async fn fetch_state_flags(&self) -> Result<StateFlags, DashboardError> {
        self.get_json(API_STATE_FLAGS).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_slash_trimmed() {
        let client = ApiClient::new("http://127.0.0.1:8000/", None).unwrap();
        assert_eq!(client.base_url(), "http://127.0.0.1:8000");
        assert_eq!(client.url("/api/traffic"), "http://127.0.0.1:8000/api/traffic");
    }
}
