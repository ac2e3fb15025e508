//! Sliding window over the traffic monitor's CSV output.
//!
//! The monitor appends one line per second:
//! `hh:mm:ss,total_mbps,video_mbps,download_mbps[,...]`, optionally preceded
//! by a header line starting with `hh:mm:ss`.

use std::io::ErrorKind;
use std::path::Path;

use qos_protocol::TrafficSnapshot;
use serde::{Deserialize, Serialize};

use crate::StateError;

const HEADER_PREFIX: &str = "hh:mm:ss";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrafficSample {
    pub timestamp: String,
    pub total_mbps: f64,
    pub video_mbps: f64,
    pub download_mbps: f64,
}

/// Parse one CSV line. Headers, blank lines and lines with fewer than four
/// fields or non-numeric rates yield `None`.
pub fn parse_traffic_line(line: &str) -> Option<TrafficSample> {
    let line = line.trim();
    if line.is_empty() || line.starts_with(HEADER_PREFIX) {
        return None;
    }
    let mut fields = line.split(',');
    let timestamp = fields.next()?.trim().to_string();
    let total_mbps = fields.next()?.trim().parse().ok()?;
    let video_mbps = fields.next()?.trim().parse().ok()?;
    let download_mbps = fields.next()?.trim().parse().ok()?;
    Some(TrafficSample {
        timestamp,
        total_mbps,
        video_mbps,
        download_mbps,
    })
}

/// Read the samples among the last `limit` lines of `path`.
///
/// The window is taken over raw lines, so a header or malformed line inside
/// it shrinks the result rather than pulling in older samples. A missing
/// file is an empty window.
pub fn read_recent_traffic(path: &Path, limit: usize) -> Result<Vec<TrafficSample>, StateError> {
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
        Err(source) => {
            return Err(StateError::Read {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    let lines: Vec<&str> = content.lines().collect();
    let start = lines.len().saturating_sub(limit);
    let samples: Vec<TrafficSample> = lines[start..]
        .iter()
        .filter_map(|line| parse_traffic_line(line))
        .collect();
    tracing::trace!(path = %path.display(), samples = samples.len(), "read traffic window");
    Ok(samples)
}

/// Split samples into the parallel series served to dashboards.
pub fn to_snapshot(samples: &[TrafficSample]) -> TrafficSnapshot {
    TrafficSnapshot {
        timestamps: samples.iter().map(|s| s.timestamp.clone()).collect(),
        video: samples.iter().map(|s| s.video_mbps).collect(),
        download: samples.iter().map(|s| s.download_mbps).collect(),
        total: samples.iter().map(|s| s.total_mbps).collect(),
    }
}
