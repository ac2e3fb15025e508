//! View model shared between the refreshers and the console renderer.
//!
//! Each render target is optional. A refresher whose target is not mounted
//! skips its update and reports `false`.

use std::collections::BTreeMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use qos_protocol::{
    ControlId, DecisionLogResponse, LogTarget, LogsResponse, QosStatusResponse, TrafficKind,
    TrafficSnapshot, NO_DECISION_DATA, QOS_IDLE,
};

use crate::chart::ChartController;

pub type SharedView = Arc<RwLock<DashboardView>>;

/// Text of one log target, always scrolled to the newest line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogPanel {
    pub text: String,
    pub line_count: usize,
    /// Index of the first line below the visible window; equal to
    /// `line_count` when scrolled to the bottom.
    pub scroll_top: usize,
    pub updated_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl LogPanel {
    pub fn replace(&mut self, logs: &LogsResponse) {
        self.text = logs.text();
        // Log entries may carry embedded newlines; count rendered lines.
        self.line_count = self.lines().len();
        self.updated_at = Some(chrono::Utc::now());
        self.scroll_to_bottom();
    }

    pub fn scroll_to_bottom(&mut self) {
        self.scroll_top = self.line_count;
    }

    pub fn is_at_bottom(&self) -> bool {
        self.scroll_top == self.line_count
    }

    fn lines(&self) -> Vec<&str> {
        if self.text.is_empty() {
            Vec::new()
        } else {
            self.text.split('\n').collect()
        }
    }

    /// The last `height` lines ending at the scroll position.
    pub fn visible_lines(&self, height: usize) -> Vec<&str> {
        let lines = self.lines();
        let end = self.scroll_top.min(lines.len());
        let start = end.saturating_sub(height);
        lines[start..end].to_vec()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusBadge {
    pub text: String,
    pub active: bool,
}

impl Default for StatusBadge {
    fn default() -> Self {
        Self {
            text: QOS_IDLE.to_string(),
            active: false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TableContent {
    /// Not loaded yet.
    #[default]
    Pending,
    NoData(String),
    Table {
        header: Vec<String>,
        rows: Vec<Vec<String>>,
    },
}

/// The decision-log target. Rebuilt from scratch on every load.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecisionTable {
    pub content: TableContent,
}

impl DecisionTable {
    pub fn render(&mut self, rows: &[Vec<String>]) {
        self.content = match rows.split_first() {
            None => TableContent::NoData(NO_DECISION_DATA.to_string()),
            Some((header, body)) => TableContent::Table {
                header: header.clone(),
                rows: body.to_vec(),
            },
        };
    }
}

/// Which targets exist in a view.
#[derive(Debug, Clone)]
pub struct Mount {
    pub panels: Vec<LogTarget>,
    pub badge: bool,
    pub controls: Vec<ControlId>,
    pub chart: bool,
    pub decision_table: bool,
}

impl Mount {
    /// Every target mounted.
    pub fn all() -> Self {
        Self {
            panels: LogTarget::ALL.to_vec(),
            badge: true,
            controls: ControlId::ALL.to_vec(),
            chart: true,
            decision_table: true,
        }
    }

    /// Nothing mounted; useful as a base for tests.
    pub fn none() -> Self {
        Self {
            panels: Vec::new(),
            badge: false,
            controls: Vec::new(),
            chart: false,
            decision_table: false,
        }
    }

    pub fn with_panels(mut self, panels: &[LogTarget]) -> Self {
        self.panels = panels.to_vec();
        self
    }
}

impl Default for Mount {
    fn default() -> Self {
        Self::all()
    }
}

#[derive(Debug, Clone, Default)]
pub struct DashboardView {
    pub panels: BTreeMap<LogTarget, LogPanel>,
    pub badge: Option<StatusBadge>,
    /// Enabled flag per mounted control.
    pub controls: BTreeMap<ControlId, bool>,
    pub chart: Option<ChartController>,
    pub decision_table: Option<DecisionTable>,
    /// Failed background refreshes since startup.
    pub poll_failures: u64,
    pub last_error: Option<String>,
}

impl DashboardView {
    pub fn new(mount: &Mount) -> Self {
        Self {
            panels: mount
                .panels
                .iter()
                .map(|t| (*t, LogPanel::default()))
                .collect(),
            badge: mount.badge.then(StatusBadge::default),
            controls: mount.controls.iter().map(|c| (*c, false)).collect(),
            chart: mount.chart.then(ChartController::new),
            decision_table: mount.decision_table.then(DecisionTable::default),
            poll_failures: 0,
            last_error: None,
        }
    }

    pub fn shared(mount: &Mount) -> SharedView {
        Arc::new(RwLock::new(Self::new(mount)))
    }

    pub fn has_panel(&self, target: LogTarget) -> bool {
        self.panels.contains_key(&target)
    }

    pub fn panel(&self, target: LogTarget) -> Option<&LogPanel> {
        self.panels.get(&target)
    }

    pub fn apply_logs(&mut self, target: LogTarget, logs: &LogsResponse) -> bool {
        match self.panels.get_mut(&target) {
            Some(panel) => {
                panel.replace(logs);
                true
            }
            None => false,
        }
    }

    pub fn apply_qos_status(&mut self, status: &QosStatusResponse) -> bool {
        match self.badge.as_mut() {
            Some(badge) => {
                badge.text = status.badge_text().to_string();
                badge.active = status.is_active();
                true
            }
            None => false,
        }
    }

    /// Enable both controls of `kind`. Returns how many were mounted.
    pub fn enable_controls(&mut self, kind: TrafficKind) -> usize {
        let mut enabled = 0;
        for id in kind.controls() {
            if let Some(flag) = self.controls.get_mut(&id) {
                *flag = true;
                enabled += 1;
            }
        }
        enabled
    }

    /// Unmounted controls read as disabled.
    pub fn control_enabled(&self, id: ControlId) -> bool {
        self.controls.get(&id).copied().unwrap_or(false)
    }

    pub fn apply_traffic(&mut self, snapshot: &TrafficSnapshot) -> bool {
        match self.chart.as_mut() {
            Some(chart) => {
                chart.replace(snapshot);
                true
            }
            None => false,
        }
    }

    pub fn apply_decision_log(&mut self, log: &DecisionLogResponse) -> bool {
        match self.decision_table.as_mut() {
            Some(table) => {
                table.render(log.rows());
                true
            }
            None => false,
        }
    }

    pub fn record_failure(&mut self, message: String) {
        self.poll_failures += 1;
        self.last_error = Some(message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn logs(lines: &[&str]) -> LogsResponse {
        LogsResponse {
            logs: lines.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn every_panel_shows_joined_lines() {
        let mut view = DashboardView::new(&Mount::all());
        for target in LogTarget::ALL {
            assert!(view.apply_logs(target, &logs(&["a", "b", "c"])));
            let panel = view.panel(target).unwrap();
            assert_eq!(panel.text, "a\nb\nc");
            assert!(panel.is_at_bottom());
        }
    }

    #[test]
    fn visible_lines_follow_bottom() {
        let mut panel = LogPanel::default();
        panel.replace(&logs(&["1", "2", "3", "4"]));
        assert_eq!(panel.visible_lines(2), vec!["3", "4"]);
        assert_eq!(panel.visible_lines(10), vec!["1", "2", "3", "4"]);
        panel.replace(&logs(&[]));
        assert!(panel.visible_lines(3).is_empty());
    }

    #[test]
    fn embedded_newlines_still_show_newest_line() {
        let mut panel = LogPanel::default();
        panel.replace(&logs(&["\n[ABR] Connecting", "a", "newest"]));
        assert_eq!(panel.line_count, 4);
        assert!(panel.is_at_bottom());
        assert_eq!(panel.visible_lines(3), vec!["[ABR] Connecting", "a", "newest"]);
    }

    #[test]
    fn unmounted_panel_is_skipped() {
        let mut view = DashboardView::new(&Mount::none().with_panels(&[LogTarget::MininetTopo]));
        assert!(!view.apply_logs(LogTarget::QosRyuApp, &logs(&["x"])));
        assert!(view.panel(LogTarget::QosRyuApp).is_none());
        assert!(view.apply_logs(LogTarget::MininetTopo, &logs(&["x"])));
    }

    #[test]
    fn badge_tracks_status() {
        let mut view = DashboardView::new(&Mount::all());
        view.apply_qos_status(&QosStatusResponse {
            status: Some("ACTIVE".into()),
        });
        assert_eq!(view.badge, Some(StatusBadge { text: "ACTIVE".into(), active: true }));

        view.apply_qos_status(&QosStatusResponse { status: None });
        assert_eq!(view.badge, Some(StatusBadge { text: "IDLE".into(), active: false }));
    }

    #[test]
    fn controls_start_disabled_and_enable_in_pairs() {
        let mut view = DashboardView::new(&Mount::all());
        assert!(ControlId::ALL.iter().all(|c| !view.control_enabled(*c)));
        assert_eq!(view.enable_controls(TrafficKind::Download), 2);
        assert!(view.control_enabled(ControlId::DownloadOn));
        assert!(view.control_enabled(ControlId::DownloadOff));
        assert!(!view.control_enabled(ControlId::VideoOn));
    }

    #[test]
    fn decision_table_rebuilds() {
        let mut table = DecisionTable::default();
        table.render(&[
            vec!["a".into(), "b".into()],
            vec!["1".into(), "2".into()],
        ]);
        assert_eq!(
            table.content,
            TableContent::Table {
                header: vec!["a".into(), "b".into()],
                rows: vec![vec!["1".into(), "2".into()]],
            }
        );

        table.render(&[]);
        assert_eq!(table.content, TableContent::NoData("No CSV data found.".into()));
    }

    #[test]
    fn header_only_log_has_no_body_rows() {
        let mut table = DecisionTable::default();
        table.render(&[vec!["time".into()]]);
        match table.content {
            TableContent::Table { header, rows } => {
                assert_eq!(header, vec!["time".to_string()]);
                assert!(rows.is_empty());
            }
            other => panic!("unexpected table content: {:?}", other),
        }
    }
}
