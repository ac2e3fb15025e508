//! Operator console for the QoS testbed dashboard.
//!
//! A full-screen TUI showing the six log panels, the QoS badge, the traffic
//! chart and the decision table, with a command line for starting scripts
//! and toggling traffic generators.
//!
//! Launch with `qos-dashboard console`.

use std::io::{self, Stdout};
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols,
    text::{Line, Span},
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, Paragraph, Row, Table},
    Frame, Terminal,
};
use tokio::sync::mpsc;

use qos_protocol::{ControlId, LogTarget, Toggle, TrafficKind};

use crate::dashboard::DashboardClient;
use crate::poll::PollLoop;
use crate::view::{DashboardView, TableContent};

const MAX_MESSAGES: usize = 500;

/// A parsed slash command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Run(LogTarget),
    Ready(TrafficKind),
    Traffic(ControlId),
    Reload,
    Status,
    Help,
    Quit,
}

fn parse_command(input: &str) -> Result<Command, String> {
    let mut parts = input.split_whitespace();
    let command = parts.next().unwrap_or("");
    let arg = parts.next();
    if parts.next().is_some() {
        return Err(format!("Too many arguments for {}", command));
    }

    match (command, arg) {
        ("/run", Some(name)) => name
            .parse::<LogTarget>()
            .map(Command::Run)
            .map_err(|e| e.to_string()),
        ("/run", None) => Err("Usage: /run <script>".to_string()),
        ("/ready", Some(kind)) => kind
            .parse::<TrafficKind>()
            .map(Command::Ready)
            .map_err(|e| e.to_string()),
        ("/ready", None) => Err("Usage: /ready video|download".to_string()),
        ("/video" | "/download", Some(action)) => {
            let kind = if command == "/video" {
                TrafficKind::Video
            } else {
                TrafficKind::Download
            };
            let toggle = action.parse::<Toggle>().map_err(|e| e.to_string())?;
            Ok(Command::Traffic(control_for(kind, toggle == Toggle::Start)))
        }
        ("/video" | "/download", None) => Err(format!("Usage: {} on|off", command)),
        ("/reload", None) => Ok(Command::Reload),
        ("/status", None) => Ok(Command::Status),
        ("/help", None) => Ok(Command::Help),
        ("/quit" | "/exit" | "/q", None) => Ok(Command::Quit),
        _ => Err(format!("Unknown command: {}. Type /help for commands.", command)),
    }
}

fn control_for(kind: TrafficKind, is_on: bool) -> ControlId {
    let [on, off] = kind.controls();
    if is_on {
        on
    } else {
        off
    }
}

/// The operator console TUI state.
struct OperatorConsole {
    client: DashboardClient,
    /// Current text in the input field.
    input: String,
    /// Cursor position within the input field.
    cursor_pos: usize,
    /// Command history for up/down arrow navigation.
    history: Vec<String>,
    history_pos: Option<usize>,
    /// Lines scrolled back from the newest console message.
    output_scroll: usize,
    console_messages: Vec<(chrono::DateTime<chrono::Utc>, String, Color)>,
    /// Results of actions running in the background.
    outcome_tx: mpsc::UnboundedSender<(String, Color)>,
    outcome_rx: mpsc::UnboundedReceiver<(String, Color)>,
}

impl OperatorConsole {
    fn new(client: DashboardClient) -> Self {
        let (outcome_tx, outcome_rx) = mpsc::unbounded_channel();
        let mut console = Self {
            client,
            input: String::new(),
            cursor_pos: 0,
            history: Vec::new(),
            history_pos: None,
            output_scroll: 0,
            console_messages: Vec::new(),
            outcome_tx,
            outcome_rx,
        };
        console.add_message(
            &format!("QoS dashboard console connected to {}.", console.client.api().base_url()),
            Color::Cyan,
        );
        console.add_message(
            "Commands: /run <script>, /ready video|download, /video on|off, /download on|off, /help, /quit",
            Color::DarkGray,
        );
        console
    }

    async fn snapshot(&self) -> DashboardView {
        self.client.view().read().await.clone()
    }

    fn add_message(&mut self, msg: &str, color: Color) {
        self.console_messages
            .push((chrono::Utc::now(), msg.to_string(), color));
        if self.console_messages.len() > MAX_MESSAGES {
            self.console_messages.remove(0);
        }
    }

    /// Move finished background results into the console output.
    fn drain_outcomes(&mut self) {
        while let Ok((msg, color)) = self.outcome_rx.try_recv() {
            self.add_message(&msg, color);
        }
    }

    /// Process the current input line. Returns `true` on `/quit`.
    async fn process_input(&mut self) -> bool {
        let input = self.input.trim().to_string();
        self.input.clear();
        self.cursor_pos = 0;
        if input.is_empty() {
            return false;
        }

        self.history.push(input.clone());
        self.history_pos = None;
        self.output_scroll = 0;

        if !input.starts_with('/') {
            self.add_message("Commands start with '/'. Type /help for the list.", Color::Yellow);
            return false;
        }

        match parse_command(&input) {
            Ok(Command::Quit) => true,
            Ok(command) => {
                self.execute(command).await;
                false
            }
            Err(msg) => {
                self.add_message(&msg, Color::Red);
                false
            }
        }
    }

    /// Run a command. Network actions run in the background and report back
    /// through the outcome channel.
    async fn execute(&mut self, command: Command) {
        match command {
            Command::Run(target) => match target.traffic_kind() {
                Some(kind) => self.spawn_ready(kind),
                None => self.spawn_run(target),
            },
            Command::Ready(kind) => self.spawn_ready(kind),
            Command::Traffic(control) => {
                let kind = control.kind();
                let enabled = self.client.view().read().await.control_enabled(control);
                if !enabled {
                    self.add_message(
                        &format!(
                            "{} controls are disabled. Run /ready {} first.",
                            control,
                            kind
                        ),
                        Color::Yellow,
                    );
                    return;
                }
                self.spawn_toggle(kind, control.toggle() == Toggle::Start);
            }
            Command::Reload => {
                let client = self.client.clone();
                let tx = self.outcome_tx.clone();
                tokio::spawn(async move {
                    let outcome = match client.load_decision_log().await {
                        Ok(()) => ("Decision log reloaded.".to_string(), Color::Green),
                        Err(e) => (format!("Decision log reload failed: {}", e), Color::Red),
                    };
                    let _ = tx.send(outcome);
                });
            }
            Command::Status => self.show_status().await,
            Command::Help => self.show_help(),
            Command::Quit => {}
        }
    }

    fn spawn_run(&self, target: LogTarget) {
        let client = self.client.clone();
        let tx = self.outcome_tx.clone();
        tokio::spawn(async move {
            let outcome = match client.start_script(target).await {
                Ok(response) => match (&response.error, response.status_str()) {
                    (Some(error), _) => (format!("{}: {}", target, error), Color::Red),
                    (None, Some(status)) => (format!("{}: {}", target, status), Color::Green),
                    (None, None) => (format!("{}: request sent", target), Color::Green),
                },
                Err(e) => (format!("Failed to start {}: {}", target, e), Color::Red),
            };
            let _ = tx.send(outcome);
        });
    }

    fn spawn_ready(&self, kind: TrafficKind) {
        let client = self.client.clone();
        let tx = self.outcome_tx.clone();
        tokio::spawn(async move {
            let outcome = match client.ready_traffic(kind).await {
                Ok(response) if response.is_ready() => (
                    format!("{} traffic ready; /{} on|off enabled.", kind, kind),
                    Color::Green,
                ),
                Ok(response) => (
                    format!(
                        "{} traffic not ready: {}",
                        kind,
                        response.error.as_deref().unwrap_or("no status")
                    ),
                    Color::Yellow,
                ),
                Err(e) => (format!("Failed to ready {} traffic: {}", kind, e), Color::Red),
            };
            let _ = tx.send(outcome);
        });
    }

    fn spawn_toggle(&self, kind: TrafficKind, is_on: bool) {
        let client = self.client.clone();
        let tx = self.outcome_tx.clone();
        let action = Toggle::from_on(is_on);
        tokio::spawn(async move {
            let outcome = match client.toggle_traffic(kind, is_on).await {
                Ok(()) => (format!("{} traffic {} requested.", kind, action.as_str()), Color::Green),
                Err(e) => (format!("{} traffic {} failed: {}", kind, action.as_str(), e), Color::Red),
            };
            let _ = tx.send(outcome);
        });
    }

    async fn show_status(&mut self) {
        let view = self.snapshot().await;
        let badge = view
            .badge
            .as_ref()
            .map(|b| b.text.clone())
            .unwrap_or_else(|| "-".to_string());
        let samples = view
            .chart
            .as_ref()
            .map(|c| c.labels().len())
            .unwrap_or(0);
        let generators: Vec<String> = TrafficKind::ALL
            .iter()
            .map(|kind| {
                let ready = kind.controls().iter().all(|c| view.control_enabled(*c));
                format!("{} {}", kind, if ready { "ready" } else { "disabled" })
            })
            .collect();

        self.add_message(
            &format!("Backend: {} | QoS: {}", self.client.api().base_url(), badge),
            Color::Green,
        );
        self.add_message(
            &format!(
                "Panels: {} | Chart samples: {} | Generators: {}",
                view.panels.len(),
                samples,
                generators.join(", ")
            ),
            Color::Green,
        );
        match &view.last_error {
            Some(error) => self.add_message(
                &format!("Poll failures: {} | Last: {}", view.poll_failures, error),
                Color::Yellow,
            ),
            None => self.add_message("Poll failures: 0", Color::Green),
        }
    }

    fn show_help(&mut self) {
        self.add_message("Available commands:", Color::Cyan);
        for line in [
            "  /run <script>          - Start a backend script (qos_ryu_app, mininet_topo, ...)",
            "  /ready video|download  - Mark a traffic generator ready and enable its controls",
            "  /video on|off          - Start or stop video traffic",
            "  /download on|off       - Start or stop download traffic",
            "  /reload                - Reload the decision log",
            "  /status                - Show dashboard status",
            "  /help                  - Show this help message",
            "  /quit                  - Exit the operator console",
        ] {
            self.add_message(line, Color::White);
        }
    }

    /// Render the full operator console layout.
    fn render(&self, frame: &mut Frame, snap: &DashboardView) {
        let outer = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),      // Status bar
                Constraint::Percentage(40), // Log panels
                Constraint::Min(10),        // Chart + decision table
                Constraint::Length(8),      // Console output
                Constraint::Length(5),      // Input area
            ])
            .split(frame.area());

        self.render_status_bar(frame, outer[0], snap);
        self.render_panels(frame, outer[1], snap);

        let middle = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
            .split(outer[2]);
        self.render_chart(frame, middle[0], snap);
        self.render_decision_table(frame, middle[1], snap);

        self.render_console_output(frame, outer[3]);
        self.render_input(frame, outer[4]);
    }

    fn render_status_bar(&self, frame: &mut Frame, area: Rect, snap: &DashboardView) {
        let block = Block::default()
            .title(" QoS Testbed Dashboard ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan));

        let badge = match &snap.badge {
            Some(badge) if badge.active => Span::styled(
                format!(" {} ", badge.text),
                Style::default()
                    .fg(Color::Black)
                    .bg(Color::Green)
                    .add_modifier(Modifier::BOLD),
            ),
            Some(badge) => Span::styled(
                format!(" {} ", badge.text),
                Style::default().fg(Color::White).bg(Color::DarkGray),
            ),
            None => Span::styled("-", Style::default().fg(Color::DarkGray)),
        };

        let control_span = |kind: TrafficKind| {
            let ready = kind.controls().iter().all(|c| snap.control_enabled(*c));
            Span::styled(
                if ready { "ready" } else { "disabled" },
                Style::default().fg(if ready { Color::Green } else { Color::DarkGray }),
            )
        };

        let failures_color = if snap.poll_failures == 0 {
            Color::Green
        } else {
            Color::Yellow
        };

        let status_line = Line::from(vec![
            Span::styled("  QoS: ", Style::default().fg(Color::Gray)),
            badge,
            Span::styled("  |  Video: ", Style::default().fg(Color::Gray)),
            control_span(TrafficKind::Video),
            Span::styled("  |  Download: ", Style::default().fg(Color::Gray)),
            control_span(TrafficKind::Download),
            Span::styled("  |  Backend: ", Style::default().fg(Color::Gray)),
            Span::styled(self.client.api().base_url(), Style::default().fg(Color::White)),
            Span::styled("  |  Poll failures: ", Style::default().fg(Color::Gray)),
            Span::styled(snap.poll_failures.to_string(), Style::default().fg(failures_color)),
        ]);

        frame.render_widget(Paragraph::new(status_line).block(block), area);
    }

    /// Six panels in a 2x3 grid, in `LogTarget::ALL` order.
    fn render_panels(&self, frame: &mut Frame, area: Rect, snap: &DashboardView) {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(area);

        for (row_idx, targets) in LogTarget::ALL.chunks(3).enumerate() {
            let cells = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([
                    Constraint::Ratio(1, 3),
                    Constraint::Ratio(1, 3),
                    Constraint::Ratio(1, 3),
                ])
                .split(rows[row_idx]);
            for (target, cell) in targets.iter().zip(cells.iter()) {
                self.render_panel(frame, *cell, *target, snap);
            }
        }
    }

    fn render_panel(&self, frame: &mut Frame, area: Rect, target: LogTarget, snap: &DashboardView) {
        let Some(panel) = snap.panel(target) else {
            let block = Block::default()
                .title(format!(" {} ", target))
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray));
            let text = Paragraph::new(Span::styled(
                "  (not shown)",
                Style::default().fg(Color::DarkGray),
            ))
            .block(block);
            frame.render_widget(text, area);
            return;
        };

        let title = match panel.updated_at {
            Some(ts) => format!(" {} ({}) ", target, ts.format("%H:%M:%S")),
            None => format!(" {} ", target),
        };
        let block = Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Blue));

        let inner_height = area.height.saturating_sub(2) as usize;
        let lines: Vec<Line> = panel
            .visible_lines(inner_height)
            .into_iter()
            .map(|line| {
                let color = if line.starts_with("[SYSTEM]") {
                    Color::Cyan
                } else {
                    Color::White
                };
                Line::from(Span::styled(line.to_string(), Style::default().fg(color)))
            })
            .collect();

        frame.render_widget(Paragraph::new(lines).block(block), area);
    }

    fn render_chart(&self, frame: &mut Frame, area: Rect, snap: &DashboardView) {
        let block = Block::default()
            .title(" Traffic (Mbps) ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White));

        let Some(chart) = snap.chart.as_ref().filter(|c| !c.is_empty()) else {
            let text = Paragraph::new(Span::styled(
                "  Waiting for traffic samples...",
                Style::default().fg(Color::DarkGray),
            ))
            .block(block);
            frame.render_widget(text, area);
            return;
        };

        let points: Vec<Vec<(f64, f64)>> = chart.series().iter().map(|s| s.points()).collect();
        let datasets: Vec<Dataset> = chart
            .series()
            .iter()
            .zip(points.iter())
            .map(|(series, data)| {
                Dataset::default()
                    .name(series.label)
                    .marker(symbols::Marker::Braille)
                    .graph_type(GraphType::Line)
                    .style(Style::default().fg(series.color))
                    .data(data)
            })
            .collect();

        let (first, last) = chart.axis_labels();
        let x_axis = Axis::default()
            .style(Style::default().fg(Color::Gray))
            .bounds(chart.x_bounds())
            .labels(vec![
                Span::raw(first.unwrap_or("").to_string()),
                Span::raw(last.unwrap_or("").to_string()),
            ]);
        let [y_low, y_high] = chart.y_bounds();
        let y_axis = Axis::default()
            .style(Style::default().fg(Color::Gray))
            .bounds([y_low, y_high])
            .labels(vec![
                Span::raw(format!("{:.0}", y_low)),
                Span::raw(format!("{:.1}", (y_low + y_high) / 2.0)),
                Span::raw(format!("{:.1}", y_high)),
            ]);

        let widget = Chart::new(datasets).block(block).x_axis(x_axis).y_axis(y_axis);
        frame.render_widget(widget, area);
    }

    fn render_decision_table(&self, frame: &mut Frame, area: Rect, snap: &DashboardView) {
        let block = Block::default()
            .title(" Decision Log ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Magenta));

        let Some(table) = snap.decision_table.as_ref() else {
            frame.render_widget(block, area);
            return;
        };

        match &table.content {
            TableContent::Pending => {
                let text = Paragraph::new(Span::styled(
                    "  Loading decision log...",
                    Style::default().fg(Color::DarkGray),
                ))
                .block(block);
                frame.render_widget(text, area);
            }
            TableContent::NoData(message) => {
                let text = Paragraph::new(Span::styled(
                    format!("  {}", message),
                    Style::default().fg(Color::Yellow),
                ))
                .block(block);
                frame.render_widget(text, area);
            }
            TableContent::Table { header, rows } => {
                // Header and borders take three lines; newest rows are last.
                let fit = area.height.saturating_sub(3) as usize;
                let start = rows.len().saturating_sub(fit);
                let body: Vec<Row> = rows[start..]
                    .iter()
                    .map(|row| Row::new(row.iter().map(String::as_str)))
                    .collect();
                let columns = header.len().max(1) as u32;
                let widths = vec![Constraint::Ratio(1, columns); columns as usize];
                let widget = Table::new(body, widths)
                    .block(block)
                    .header(
                        Row::new(header.iter().map(String::as_str))
                            .style(Style::default().fg(Color::Gray).add_modifier(Modifier::BOLD)),
                    );
                frame.render_widget(widget, area);
            }
        }
    }

    fn render_console_output(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .title(" Console Output ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White));

        let inner_height = area.height.saturating_sub(2) as usize;
        let end = self.console_messages.len().saturating_sub(self.output_scroll);
        let start = end.saturating_sub(inner_height);

        let lines: Vec<Line> = self.console_messages[start..end]
            .iter()
            .map(|(ts, msg, color)| {
                Line::from(vec![
                    Span::styled(
                        format!("  [{}] ", ts.format("%H:%M:%S")),
                        Style::default().fg(Color::DarkGray),
                    ),
                    Span::styled(msg.as_str(), Style::default().fg(*color)),
                ])
            })
            .collect();

        frame.render_widget(Paragraph::new(lines).block(block), area);
    }

    fn render_input(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .title(" Command Input (/help = commands, /quit = exit) ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Green));

        let input_display = if self.input.is_empty() {
            Line::from(vec![
                Span::styled("  > ", Style::default().fg(Color::Green)),
                Span::styled("Type a /command...", Style::default().fg(Color::DarkGray)),
            ])
        } else {
            Line::from(vec![
                Span::styled("  > ", Style::default().fg(Color::Green)),
                Span::styled(&self.input, Style::default().fg(Color::White)),
            ])
        };

        let hint_line = Line::from(Span::styled(
            "  Ctrl+C or /quit to exit  |  Up/Down for history  |  PgUp/PgDn scroll output",
            Style::default().fg(Color::DarkGray),
        ));

        let paragraph = Paragraph::new(vec![Line::from(""), input_display, hint_line]).block(block);
        frame.render_widget(paragraph, area);

        let cursor_x = area.x + 4 + self.cursor_column();
        let cursor_y = area.y + 2;
        frame.set_cursor_position((cursor_x, cursor_y));
    }

    /// Cursor offset in terminal cells, counted in chars.
    fn cursor_column(&self) -> u16 {
        self.input[..self.cursor_pos].chars().count() as u16
    }

    /// Handle keyboard input. Returns `true` if the console should exit.
    fn handle_key(&mut self, code: KeyCode, modifiers: KeyModifiers) -> bool {
        match (code, modifiers) {
            (KeyCode::Char('c'), KeyModifiers::CONTROL) => return true,
            (KeyCode::Char(c), _) => {
                self.input.insert(self.cursor_pos, c);
                self.cursor_pos += c.len_utf8();
            }
            (KeyCode::Backspace, _) => {
                if let Some(c) = self.input[..self.cursor_pos].chars().next_back() {
                    self.cursor_pos -= c.len_utf8();
                    self.input.remove(self.cursor_pos);
                }
            }
            (KeyCode::Delete, _) => {
                if self.cursor_pos < self.input.len() {
                    self.input.remove(self.cursor_pos);
                }
            }
            (KeyCode::Left, _) => {
                if let Some(c) = self.input[..self.cursor_pos].chars().next_back() {
                    self.cursor_pos -= c.len_utf8();
                }
            }
            (KeyCode::Right, _) => {
                if let Some(c) = self.input[self.cursor_pos..].chars().next() {
                    self.cursor_pos += c.len_utf8();
                }
            }
            (KeyCode::Home, _) => {
                self.cursor_pos = 0;
            }
            (KeyCode::End, _) => {
                self.cursor_pos = self.input.len();
            }
            (KeyCode::Up, _) => {
                if !self.history.is_empty() {
                    let pos = match self.history_pos {
                        Some(p) if p > 0 => p - 1,
                        Some(p) => p,
                        None => self.history.len() - 1,
                    };
                    self.history_pos = Some(pos);
                    self.input = self.history[pos].clone();
                    self.cursor_pos = self.input.len();
                }
            }
            (KeyCode::Down, _) => {
                if let Some(pos) = self.history_pos {
                    if pos + 1 < self.history.len() {
                        self.history_pos = Some(pos + 1);
                        self.input = self.history[pos + 1].clone();
                        self.cursor_pos = self.input.len();
                    } else {
                        self.history_pos = None;
                        self.input.clear();
                        self.cursor_pos = 0;
                    }
                }
            }
            (KeyCode::PageUp, _) => {
                let max = self.console_messages.len().saturating_sub(1);
                self.output_scroll = (self.output_scroll + 5).min(max);
            }
            (KeyCode::PageDown, _) => {
                self.output_scroll = self.output_scroll.saturating_sub(5);
            }
            _ => {}
        }
        false
    }
}

fn setup_terminal() -> io::Result<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    Terminal::new(backend)
}

/// Restore the terminal to its original state.
fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> io::Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

/// Run the operator console until the operator quits.
///
/// Loads the decision log once, then starts the poll loop that keeps the
/// panels, badge and chart fresh. The poll loop is shut down on exit.
pub async fn run_operator_console(
    client: DashboardClient,
    poll_interval: Duration,
) -> Result<(), anyhow::Error> {
    use std::io::IsTerminal;
    if !io::stdin().is_terminal() || !io::stdout().is_terminal() {
        return Err(anyhow::anyhow!("Operator console requires a terminal (TTY)."));
    }

    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic_info);
    }));

    let mut terminal = setup_terminal()?;
    let mut console = OperatorConsole::new(client.clone());
    console.execute(Command::Reload).await;
    let poll = PollLoop::spawn(client, poll_interval);

    let tick_rate = Duration::from_millis(100);
    let result = async {
        loop {
            console.drain_outcomes();
            let snapshot = console.snapshot().await;
            terminal.draw(|frame| console.render(frame, &snapshot))?;

            if event::poll(tick_rate)? {
                if let Event::Key(key_event) = event::read()? {
                    if key_event.kind != KeyEventKind::Press {
                        continue;
                    }
                    if key_event.code == KeyCode::Enter {
                        if console.process_input().await {
                            break;
                        }
                    } else if console.handle_key(key_event.code, key_event.modifiers) {
                        break;
                    }
                }
            }
        }
        Ok::<(), anyhow::Error>(())
    }
    .await;

    tracing::info!(cycles = poll.cycles(), "Operator console exiting");
    poll.shutdown();
    restore_terminal(&mut terminal)?;
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api_client::ApiClient;
    use crate::view::Mount;

    fn console() -> OperatorConsole {
        let api = ApiClient::new("http://127.0.0.1:9", None).unwrap();
        OperatorConsole::new(DashboardClient::new(api, DashboardView::shared(&Mount::all())))
    }

    fn last_message(console: &OperatorConsole) -> &str {
        console.console_messages.last().map(|(_, m, _)| m.as_str()).unwrap_or("")
    }

    #[test]
    fn parses_commands() {
        assert_eq!(parse_command("/run qos_ryu_app"), Ok(Command::Run(LogTarget::QosRyuApp)));
        assert_eq!(parse_command("/ready video"), Ok(Command::Ready(TrafficKind::Video)));
        assert_eq!(
            parse_command("/download off"),
            Ok(Command::Traffic(ControlId::DownloadOff))
        );
        assert_eq!(parse_command("/video on"), Ok(Command::Traffic(ControlId::VideoOn)));
        assert_eq!(parse_command("/reload"), Ok(Command::Reload));
        assert_eq!(parse_command("/q"), Ok(Command::Quit));
    }

    #[test]
    fn rejects_bad_commands() {
        assert!(parse_command("/run").is_err());
        assert!(parse_command("/run ryu").is_err());
        assert!(parse_command("/video sideways").is_err());
        assert!(parse_command("/status now").is_err());
        assert!(parse_command("/launch").is_err());
    }

    #[tokio::test]
    async fn toggle_rejected_while_controls_disabled() {
        let mut console = console();
        console.execute(Command::Traffic(ControlId::VideoOn)).await;
        assert_eq!(
            last_message(&console),
            "video-on controls are disabled. Run /ready video first."
        );
    }

    #[tokio::test]
    async fn quit_and_plain_text_input() {
        let mut console = console();
        console.input = "hello".to_string();
        assert!(!console.process_input().await);
        assert!(last_message(&console).starts_with("Commands start with"));

        console.input = "/quit".to_string();
        assert!(console.process_input().await);
        assert_eq!(console.history, vec!["hello".to_string(), "/quit".to_string()]);
    }

    #[test]
    fn history_navigation() {
        let mut console = console();
        console.history = vec!["/status".to_string(), "/help".to_string()];
        console.handle_key(KeyCode::Up, KeyModifiers::NONE);
        assert_eq!(console.input, "/help");
        console.handle_key(KeyCode::Up, KeyModifiers::NONE);
        assert_eq!(console.input, "/status");
        console.handle_key(KeyCode::Down, KeyModifiers::NONE);
        console.handle_key(KeyCode::Down, KeyModifiers::NONE);
        assert!(console.input.is_empty());
        assert!(console.handle_key(KeyCode::Char('c'), KeyModifiers::CONTROL));
    }

    #[test]
    fn cursor_counts_chars_not_bytes() {
        let mut console = console();
        for c in "/run é".chars() {
            console.handle_key(KeyCode::Char(c), KeyModifiers::NONE);
        }
        assert_eq!(console.cursor_pos, 7);
        assert_eq!(console.cursor_column(), 6);
        console.handle_key(KeyCode::Left, KeyModifiers::NONE);
        assert_eq!(console.cursor_column(), 5);
    }

    #[test]
    fn renders_into_test_backend() {
        let console = console();
        let mut view = DashboardView::new(&Mount::all());
        view.apply_logs(
            LogTarget::QosRyuApp,
            &qos_protocol::LogsResponse {
                logs: vec!["[SYSTEM] Started qos_ryu_app.".to_string()],
            },
        );
        view.apply_decision_log(&qos_protocol::DecisionLogResponse::new(vec![
            vec!["time".into(), "action".into()],
            vec!["12:00:01".into(), "throttle".into()],
        ]));
        let backend = ratatui::backend::TestBackend::new(160, 60);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|frame| console.render(frame, &view)).unwrap();

        let buffer = terminal.backend().buffer();
        let text: String = buffer.content().iter().map(|c| c.symbol()).collect();
        assert!(text.contains("qos_ryu_app"));
        assert!(text.contains("throttle"));
        assert!(text.contains("IDLE"));
    }
}
