//! Traffic chart state.
//!
//! One controller is created at startup and owned by the view. Every update
//! replaces the labels and all three series with the backend snapshot.

use ratatui::style::Color;

use qos_protocol::TrafficSnapshot;

/// One plotted line.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub label: &'static str,
    pub color: Color,
    pub values: Vec<f64>,
}

impl Series {
    fn new(label: &'static str, color: Color) -> Self {
        Self {
            label,
            color,
            values: Vec::new(),
        }
    }

    /// `(index, value)` pairs for the chart widget.
    pub fn points(&self) -> Vec<(f64, f64)> {
        self.values
            .iter()
            .enumerate()
            .map(|(i, v)| (i as f64, *v))
            .collect()
    }
}

pub const VIDEO: usize = 0;
pub const DOWNLOAD: usize = 1;
pub const TOTAL: usize = 2;

#[derive(Debug, Clone, PartialEq)]
pub struct ChartController {
    labels: Vec<String>,
    series: [Series; 3],
    /// Transitions between snapshots are never animated.
    animated: bool,
    begin_at_zero: bool,
}

impl ChartController {
    pub fn new() -> Self {
        Self {
            labels: Vec::new(),
            series: [
                Series::new("Video (Mbps)", Color::Rgb(0x2b, 0x7f, 0xff)),
                Series::new("Download (Mbps)", Color::Rgb(0xff, 0x9f, 0x1c)),
                Series::new("Total (Mbps)", Color::Rgb(0x1f, 0xa2, 0x8a)),
            ],
            animated: false,
            begin_at_zero: true,
        }
    }

    /// Overwrite labels and every series with `snapshot`.
    pub fn replace(&mut self, snapshot: &TrafficSnapshot) {
        self.labels = snapshot.timestamps.clone();
        self.series[VIDEO].values = snapshot.video.clone();
        self.series[DOWNLOAD].values = snapshot.download.clone();
        self.series[TOTAL].values = snapshot.total.clone();
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn series(&self) -> &[Series; 3] {
        &self.series
    }

    pub fn is_animated(&self) -> bool {
        self.animated
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty() && self.series.iter().all(|s| s.values.is_empty())
    }

    /// X spans the longest series; a single sample still gets a unit range.
    pub fn x_bounds(&self) -> [f64; 2] {
        let len = self
            .series
            .iter()
            .map(|s| s.values.len())
            .chain(std::iter::once(self.labels.len()))
            .max()
            .unwrap_or(0);
        [0.0, (len.saturating_sub(1) as f64).max(1.0)]
    }

    /// Y starts at zero and leaves 10% headroom above the largest sample.
    pub fn y_bounds(&self) -> [f64; 2] {
        let values = self.series.iter().flat_map(|s| s.values.iter().copied());
        let max = values.clone().fold(f64::NEG_INFINITY, f64::max);
        let min = values.fold(f64::INFINITY, f64::min);
        let upper = if max.is_finite() { (max * 1.1).max(1.0) } else { 1.0 };
        let lower = match (min.is_finite(), self.begin_at_zero) {
            (false, _) => 0.0,
            (true, true) => min.min(0.0),
            (true, false) => min,
        };
        [lower, upper]
    }

    /// First and last label, for the X axis.
    pub fn axis_labels(&self) -> (Option<&str>, Option<&str>) {
        (
            self.labels.first().map(String::as_str),
            self.labels.last().map(String::as_str),
        )
    }
}

impl Default for ChartController {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(timestamps: &[&str], video: &[f64], download: &[f64], total: &[f64]) -> TrafficSnapshot {
        TrafficSnapshot {
            timestamps: timestamps.iter().map(|s| s.to_string()).collect(),
            video: video.to_vec(),
            download: download.to_vec(),
            total: total.to_vec(),
        }
    }

    #[test]
    fn replace_overwrites_every_series() {
        let mut chart = ChartController::new();
        chart.replace(&snapshot(
            &["t0", "t1", "t2"],
            &[9.0, 9.0, 9.0],
            &[9.0, 9.0, 9.0],
            &[18.0, 18.0, 18.0],
        ));
        chart.replace(&snapshot(&["t1", "t2"], &[1.0, 2.0], &[3.0, 4.0], &[4.0, 6.0]));

        assert_eq!(chart.labels(), &["t1".to_string(), "t2".to_string()]);
        assert_eq!(chart.series()[VIDEO].values, vec![1.0, 2.0]);
        assert_eq!(chart.series()[DOWNLOAD].values, vec![3.0, 4.0]);
        assert_eq!(chart.series()[TOTAL].values, vec![4.0, 6.0]);
    }

    #[test]
    fn empty_snapshot_clears_chart() {
        let mut chart = ChartController::new();
        chart.replace(&snapshot(&["t1"], &[1.0], &[1.0], &[2.0]));
        chart.replace(&TrafficSnapshot::default());
        assert!(chart.is_empty());
    }

    #[test]
    fn fixed_series_and_no_animation() {
        let chart = ChartController::new();
        let labels: Vec<&str> = chart.series().iter().map(|s| s.label).collect();
        assert_eq!(labels, vec!["Video (Mbps)", "Download (Mbps)", "Total (Mbps)"]);
        assert_eq!(chart.series()[VIDEO].color, Color::Rgb(0x2b, 0x7f, 0xff));
        assert!(!chart.is_animated());
    }

    #[test]
    fn bounds_begin_at_zero() {
        let mut chart = ChartController::new();
        assert_eq!(chart.y_bounds(), [0.0, 1.0]);
        chart.replace(&snapshot(&["a", "b", "c"], &[2.0, 3.0, 5.0], &[0.0, 1.0, 5.0], &[2.0, 4.0, 10.0]));
        assert_eq!(chart.x_bounds(), [0.0, 2.0]);
        let [lo, hi] = chart.y_bounds();
        assert_eq!(lo, 0.0);
        assert!((hi - 11.0).abs() < 1e-9);
        assert_eq!(chart.axis_labels(), (Some("a"), Some("c")));
        assert_eq!(chart.series()[TOTAL].points()[2], (2.0, 10.0));
    }
}
