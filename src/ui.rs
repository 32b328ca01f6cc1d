use anyhow::Result;
use chrono::NaiveDate;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use fraud_investigation::graph::{EDGE_COLOR, EDGE_LABEL_COLOR, NODE_RADIUS};
use fraud_investigation::{
    color_for, format_amount, format_inr, format_score, recent_alerts, top_risk, truncate,
    Account, AccountQuery, AccountStatus, DashboardMetrics, EventRisk, EventType, GraphLayoutProjector,
    GraphScene, Hsl, NodeLookup, Point, ReportQuery, ReportStatus, ReportType, RiskLevel, SortKey,
    Snapshot, TimelineController,
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{
        canvas::{Canvas, Circle, Line as CanvasLine},
        Block, Borders, Cell, Gauge, Paragraph, Row, Table, TableState, Wrap,
    },
    Frame, Terminal,
};
use std::io;
use std::time::{Duration, Instant};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Dashboard,
    Accounts,
    Graph,
    Timeline,
    Reports,
}

impl Page {
    pub const ALL: [Page; 5] = [
        Page::Dashboard,
        Page::Accounts,
        Page::Graph,
        Page::Timeline,
        Page::Reports,
    ];

    pub fn next(&self) -> Self {
        match self {
            Page::Dashboard => Page::Accounts,
            Page::Accounts => Page::Graph,
            Page::Graph => Page::Timeline,
            Page::Timeline => Page::Reports,
            Page::Reports => Page::Dashboard,
        }
    }

    pub fn previous(&self) -> Self {
        match self {
            Page::Dashboard => Page::Reports,
            Page::Accounts => Page::Dashboard,
            Page::Graph => Page::Accounts,
            Page::Timeline => Page::Graph,
            Page::Reports => Page::Timeline,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            Page::Dashboard => "Dashboard",
            Page::Accounts => "Accounts",
            Page::Graph => "Graph Explorer",
            Page::Timeline => "Timeline",
            Page::Reports => "Reports",
        }
    }
}

/// Where typed characters go
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Search,
}

pub struct App {
    pub snapshot: Snapshot,
    pub metrics: DashboardMetrics,
    pub current_page: Page,
    pub input_mode: InputMode,

    pub account_query: AccountQuery,
    pub accounts_state: TableState,

    pub graph: GraphLayoutProjector,
    pub graph_search: String,

    pub timeline: TimelineController,

    pub report_query: ReportQuery,
    pub reports_state: TableState,
}

impl App {
    pub fn new(snapshot: Snapshot, reference_date: Option<NaiveDate>) -> Self {
        let metrics = DashboardMetrics::from_snapshot(&snapshot);
        let graph = GraphLayoutProjector::new(snapshot.nodes.clone(), snapshot.edges.clone());
        let timeline = TimelineController::new(snapshot.timeline.clone());
        let report_query = ReportQuery::for_reports(&snapshot.reports, reference_date);

        let mut accounts_state = TableState::default();
        if !snapshot.accounts.is_empty() {
            accounts_state.select(Some(0));
        }

        let mut reports_state = TableState::default();
        if !snapshot.reports.is_empty() {
            reports_state.select(Some(0));
        }

        Self {
            snapshot,
            metrics,
            current_page: Page::Dashboard,
            input_mode: InputMode::Normal,
            account_query: AccountQuery::new(),
            accounts_state,
            graph,
            graph_search: String::new(),
            timeline,
            report_query,
            reports_state,
        }
    }

    pub fn filtered_accounts(&self) -> Vec<&Account> {
        self.account_query.apply(&self.snapshot.accounts)
    }

    pub fn filtered_reports(&self) -> Vec<&fraud_investigation::Report> {
        self.report_query.apply(&self.snapshot.reports)
    }

    /// Snapshot account that sent the transfer at the playback head
    pub fn current_sender(&self) -> Option<&Account> {
        let (from, _) = self.timeline.current_event()?.transfer()?;
        self.snapshot.account(from)
    }

    pub fn next_page(&mut self) {
        self.current_page = self.current_page.next();
    }

    pub fn previous_page(&mut self) {
        self.current_page = self.current_page.previous();
    }

    /// Playback driver: called once per tick period
    pub fn on_tick(&mut self) {
        if self.timeline.tick() {
            debug!(index = self.timeline.current_index(), "playback advanced");
        }
    }

    fn reset_account_selection(&mut self) {
        let len = self.filtered_accounts().len();
        self.accounts_state.select(if len == 0 { None } else { Some(0) });
    }

    fn reset_report_selection(&mut self) {
        let len = self.filtered_reports().len();
        self.reports_state.select(if len == 0 { None } else { Some(0) });
    }

    /// Handle one key press. Returns false when the app should quit.
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        if self.input_mode == InputMode::Search {
            self.handle_search_key(key);
            return true;
        }

        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => return false,
            KeyCode::Tab => {
                if key.modifiers.contains(KeyModifiers::SHIFT) {
                    self.previous_page();
                } else {
                    self.next_page();
                }
            }
            KeyCode::BackTab => self.previous_page(),
            KeyCode::Char(c @ '1'..='5') => {
                let index = c as usize - '1' as usize;
                self.current_page = Page::ALL[index];
            }
            _ => match self.current_page {
                Page::Dashboard => {}
                Page::Accounts => self.handle_accounts_key(key),
                Page::Graph => self.handle_graph_key(key),
                Page::Timeline => self.handle_timeline_key(key),
                Page::Reports => self.handle_reports_key(key),
            },
        }

        true
    }

    fn handle_search_key(&mut self, key: KeyEvent) {
        let buffer = match self.current_page {
            Page::Graph => &mut self.graph_search,
            _ => &mut self.account_query.search,
        };

        match key.code {
            KeyCode::Char(c) => buffer.push(c),
            KeyCode::Backspace => {
                buffer.pop();
            }
            KeyCode::Enter | KeyCode::Esc => {
                self.input_mode = InputMode::Normal;
                if self.current_page == Page::Graph {
                    let first = self.graph.search(&self.graph_search).first().map(|n| n.id.clone());
                    if let Some(id) = first {
                        self.graph.select_node(Some(&id));
                    }
                }
            }
            _ => {}
        }

        if self.current_page == Page::Accounts {
            self.reset_account_selection();
        }
    }

    fn handle_accounts_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('/') => self.input_mode = InputMode::Search,
            KeyCode::Char('r') => {
                self.account_query.risk = self.account_query.risk.next();
                self.reset_account_selection();
            }
            KeyCode::Char('s') => self.account_query.sort_by(SortKey::RiskScore),
            KeyCode::Char('i') => self.account_query.sort_by(SortKey::AccountId),
            KeyCode::Char('c') => {
                self.account_query.clear();
                self.reset_account_selection();
            }
            KeyCode::Down | KeyCode::Char('j') => {
                let len = self.filtered_accounts().len();
                step_selection(&mut self.accounts_state, len, true);
            }
            KeyCode::Up | KeyCode::Char('k') => {
                let len = self.filtered_accounts().len();
                step_selection(&mut self.accounts_state, len, false);
            }
            _ => {}
        }
    }

    fn handle_graph_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('/') => {
                self.graph_search.clear();
                self.input_mode = InputMode::Search;
            }
            KeyCode::Down | KeyCode::Char('j') => self.graph.select_next(),
            KeyCode::Up | KeyCode::Char('k') => self.graph.select_previous(),
            KeyCode::Char('x') => self.graph.select_node(None),
            _ => {}
        }
    }

    fn handle_timeline_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char(' ') | KeyCode::Char('p') => {
                self.timeline.toggle_play();
            }
            KeyCode::Right | KeyCode::Char('l') => {
                self.timeline.step_forward();
            }
            KeyCode::Left | KeyCode::Char('h') => {
                self.timeline.step_back();
            }
            KeyCode::Home => self.timeline.rewind(),
            KeyCode::End => {
                self.timeline.jump_to_end();
            }
            KeyCode::Char('r') => {
                let next = self.timeline.filter().next();
                self.timeline.set_filter(next);
            }
            _ => {}
        }
    }

    fn handle_reports_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('t') => {
                self.report_query.type_filter = self.report_query.type_filter.next();
                self.reset_report_selection();
            }
            KeyCode::Char('d') => {
                self.report_query.range = self.report_query.range.next();
                self.reset_report_selection();
            }
            KeyCode::Down | KeyCode::Char('j') => {
                let len = self.filtered_reports().len();
                step_selection(&mut self.reports_state, len, true);
            }
            KeyCode::Up | KeyCode::Char('k') => {
                let len = self.filtered_reports().len();
                step_selection(&mut self.reports_state, len, false);
            }
            _ => {}
        }
    }
}

/// Wrapping row navigation
fn step_selection(state: &mut TableState, len: usize, forward: bool) {
    if len == 0 {
        state.select(None);
        return;
    }
    let i = match state.selected() {
        Some(i) if forward => {
            if i >= len - 1 {
                0
            } else {
                i + 1
            }
        }
        Some(i) => {
            if i == 0 {
                len - 1
            } else {
                i - 1
            }
        }
        None => 0,
    };
    state.select(Some(i));
}

pub fn run_ui(app: &mut App, tick_rate: Duration) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run the app
    let res = run_app(&mut terminal, app, tick_rate);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        println!("Error: {:?}", err);
    }

    Ok(())
}

fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    tick_rate: Duration,
) -> io::Result<()> {
    let mut last_tick = Instant::now();
    loop {
        terminal.draw(|f| ui(f, app))?;

        let timeout = tick_rate.saturating_sub(last_tick.elapsed());
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press && !app.handle_key(key) {
                    return Ok(());
                }
            }
        }

        if last_tick.elapsed() >= tick_rate {
            app.on_tick();
            last_tick = Instant::now();
        }
    }
}

// ============================================================================
// Colors
// ============================================================================

fn rgb(color: Hsl) -> Color {
    let (r, g, b) = color.to_rgb();
    Color::Rgb(r, g, b)
}

fn risk_color(risk: Option<RiskLevel>) -> Color {
    rgb(color_for(risk))
}

fn event_risk_color(risk: EventRisk) -> Color {
    match risk.level() {
        Some(level) => risk_color(Some(level)),
        None => Color::DarkGray,
    }
}

fn status_color(status: AccountStatus) -> Color {
    match status {
        AccountStatus::Flagged => risk_color(Some(RiskLevel::High)),
        AccountStatus::Investigating => risk_color(Some(RiskLevel::Medium)),
        AccountStatus::Monitoring => Color::Cyan,
        AccountStatus::Cleared => Color::Green,
    }
}

fn report_status_color(status: ReportStatus) -> Color {
    match status {
        ReportStatus::Draft => Color::DarkGray,
        ReportStatus::Pending => risk_color(Some(RiskLevel::Medium)),
        ReportStatus::Submitted => Color::Cyan,
        ReportStatus::Approved => Color::Green,
    }
}

fn report_type_color(kind: ReportType) -> Color {
    match kind {
        ReportType::Investigation => Color::Cyan,
        ReportType::Summary => Color::Gray,
        ReportType::Str => risk_color(Some(RiskLevel::High)),
        ReportType::Audit => risk_color(Some(RiskLevel::Medium)),
    }
}

fn event_glyph(kind: EventType) -> &'static str {
    match kind {
        EventType::Transaction => "→",
        EventType::Pattern => "≈",
        EventType::Alert => "!",
        EventType::System => "◷",
    }
}

fn header_style() -> Style {
    Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
}

fn label_style() -> Style {
    Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
}

fn panel(title: &str) -> Block<'_> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::White))
        .title(format!(" {} ", title))
}

fn key_value(key: &str, value: String, color: Color) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("  {:<20}", key), Style::default().fg(Color::DarkGray)),
        Span::styled(value, Style::default().fg(color)),
    ])
}

// ============================================================================
// Layout
// ============================================================================

fn ui(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header with navigation
            Constraint::Min(0),    // Content area
            Constraint::Length(3), // Status bar
        ])
        .split(f.size());

    render_header(f, chunks[0], app);

    match app.current_page {
        Page::Dashboard => render_dashboard(f, chunks[1], app),
        Page::Accounts => render_accounts(f, chunks[1], app),
        Page::Graph => render_graph(f, chunks[1], app),
        Page::Timeline => render_timeline(f, chunks[1], app),
        Page::Reports => render_reports(f, chunks[1], app),
    }

    render_status_bar(f, chunks[2], app);
}

fn render_header(f: &mut Frame, area: Rect, app: &App) {
    let mut tab_spans = vec![];
    for (i, page) in Page::ALL.iter().enumerate() {
        if i > 0 {
            tab_spans.push(Span::raw(" │ "));
        }

        let style = if *page == app.current_page {
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
        } else {
            Style::default().fg(Color::DarkGray)
        };

        tab_spans.push(Span::styled(format!("{} {}", i + 1, page.title()), style));
    }

    tab_spans.push(Span::raw("  |  "));
    tab_spans.push(Span::styled(
        format!("⚠ {} high risk", app.metrics.high_risk_accounts),
        Style::default().fg(risk_color(Some(RiskLevel::High))),
    ));
    if app.timeline.is_playing() {
        tab_spans.push(Span::raw("  "));
        tab_spans.push(Span::styled("▶ playing", Style::default().fg(Color::Green)));
    }

    let header = Paragraph::new(vec![Line::from(tab_spans)]).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan))
            .title(" Fraud Investigation Dashboard "),
    );

    f.render_widget(header, area);
}

fn render_status_bar(f: &mut Frame, area: Rect, app: &App) {
    let hints: Vec<(&str, &str)> = if app.input_mode == InputMode::Search {
        vec![("type", "Search"), ("Enter/Esc", "Done"), ("Backspace", "Delete")]
    } else {
        let mut hints = match app.current_page {
            Page::Dashboard => vec![],
            Page::Accounts => vec![("/", "Search"), ("r", "Risk"), ("s/i", "Sort"), ("c", "Clear"), ("↑/↓", "Nav")],
            Page::Graph => vec![("↑/↓", "Select node"), ("x", "Deselect"), ("/", "Find")],
            Page::Timeline => vec![("Space", "Play/Pause"), ("←/→", "Step"), ("Home/End", "Jump"), ("r", "Risk")],
            Page::Reports => vec![("t", "Type"), ("d", "Date range"), ("↑/↓", "Nav")],
        };
        hints.push(("Tab", "Page"));
        hints.push(("q", "Quit"));
        hints
    };

    let mut status_spans = vec![Span::styled(
        format!(" {} ", app.current_page.title()),
        Style::default().fg(Color::Cyan),
    )];
    for (key, action) in hints {
        status_spans.push(Span::raw(" | "));
        let color = if key == "q" { Color::Red } else { Color::Yellow };
        status_spans.push(Span::styled(key.to_string(), Style::default().fg(color)));
        status_spans.push(Span::raw(format!(" {}", action)));
    }

    let status_bar = Paragraph::new(vec![Line::from(status_spans)]).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White)),
    );

    f.render_widget(status_bar, area);
}

// ============================================================================
// Dashboard
// ============================================================================

fn render_dashboard(f: &mut Frame, area: Rect, app: &App) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(5), Constraint::Min(0)])
        .split(area);

    let cards = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(25); 4])
        .split(rows[0]);

    let metrics = &app.metrics;
    let card_data = [
        ("Total Transactions", format_amount(metrics.total_transactions as f64), Color::Cyan, "Across monitored accounts".to_string()),
        (
            "High Risk Accounts",
            metrics.high_risk_accounts.to_string(),
            risk_color(Some(RiskLevel::High)),
            "Requires investigation".to_string(),
        ),
        (
            "Active Patterns",
            metrics.active_patterns.len().to_string(),
            risk_color(Some(RiskLevel::Medium)),
            metrics.active_patterns.join(", "),
        ),
        ("Graph Nodes", metrics.graph_nodes.to_string(), Color::White, "Accounts in network".to_string()),
    ];

    for (i, (title, value, color, subtitle)) in card_data.into_iter().enumerate() {
        let content = vec![
            Line::from(Span::styled(value, Style::default().fg(color).add_modifier(Modifier::BOLD))),
            Line::from(Span::styled(
                truncate(&subtitle, cards[i].width.saturating_sub(4) as usize),
                Style::default().fg(Color::DarkGray),
            )),
        ];
        f.render_widget(Paragraph::new(content).block(panel(title)), cards[i]);
    }

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(66), Constraint::Percentage(34)])
        .split(rows[1]);

    let left = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(columns[0]);

    let scene = app.graph.project();
    render_graph_canvas(f, left[0], &scene, app.graph.bounds(), "Transaction Graph");
    render_top_accounts(f, left[1], app);

    let right = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(columns[1]);

    render_alerts(f, right[0], app);
    render_temporal_analysis(f, right[1], app);
}

fn render_top_accounts(f: &mut Frame, area: Rect, app: &App) {
    let top = top_risk(&app.snapshot.accounts, 5);
    let title = format!("Risk-Ranked Accounts (Top {} of {})", top.len(), app.snapshot.accounts.len());

    let header = Row::new(
        ["Account", "Risk", "Sent", "Received", "Patterns", "Last Activity"]
            .iter()
            .map(|h| Cell::from(*h).style(header_style())),
    )
    .style(Style::default().bg(Color::DarkGray));

    let rows = top.iter().map(|account| {
        Row::new(vec![
            Cell::from(format!("{} ({} txns)", account.id, account.transaction_count)),
            Cell::from(format_score(account.risk_score)).style(Style::default().fg(risk_color(Some(account.risk_level)))),
            Cell::from(format_inr(account.total_sent)),
            Cell::from(format_inr(account.total_received)).style(Style::default().fg(Color::DarkGray)),
            Cell::from(patterns_text(account)),
            Cell::from(account.last_activity.clone()).style(Style::default().fg(Color::DarkGray)),
        ])
    });

    let table = Table::new(
        rows,
        [
            Constraint::Length(20),
            Constraint::Length(6),
            Constraint::Length(12),
            Constraint::Length(12),
            Constraint::Min(16),
            Constraint::Length(13),
        ],
    )
    .header(header)
    .block(panel(&title));

    f.render_widget(table, area);
}

fn render_alerts(f: &mut Frame, area: Rect, app: &App) {
    let alerts = recent_alerts(&app.snapshot.timeline, 5);
    let mut lines = Vec::new();

    if alerts.is_empty() {
        lines.push(Line::from(Span::styled("  No high-risk activity", Style::default().fg(Color::DarkGray))));
    }

    for event in alerts {
        lines.push(Line::from(vec![
            Span::styled(
                format!(" {} ", event_glyph(event.event_type)),
                Style::default().fg(event_risk_color(event.risk)),
            ),
            Span::styled(event.time.clone(), Style::default().fg(Color::Cyan)),
            Span::raw(" "),
            Span::styled(event.event_type.as_str(), Style::default().fg(Color::DarkGray)),
        ]));
        lines.push(Line::from(Span::raw(format!("   {}", event.description))));
    }

    let paragraph = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(panel("Recent Alerts"));

    f.render_widget(paragraph, area);
}

fn patterns_text(account: &Account) -> String {
    if account.has_patterns() {
        account.patterns.join(", ")
    } else {
        "—".to_string()
    }
}

// ============================================================================
// Accounts
// ============================================================================

fn render_accounts(f: &mut Frame, area: Rect, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(0)])
        .split(area);

    let accounts = app.filtered_accounts();
    let search_style = if app.input_mode == InputMode::Search {
        Style::default().fg(Color::Yellow).add_modifier(Modifier::UNDERLINED)
    } else {
        Style::default().fg(Color::White)
    };
    let search_text = if app.account_query.search.is_empty() && app.input_mode == InputMode::Normal {
        "Search by account ID...".to_string()
    } else {
        app.account_query.search.clone()
    };

    let filter_bar = Paragraph::new(Line::from(vec![
        Span::styled(" 🔍 ", Style::default().fg(Color::DarkGray)),
        Span::styled(search_text, search_style),
        Span::raw("   |   "),
        Span::styled("Risk: ", label_style()),
        Span::raw(app.account_query.risk.label()),
        Span::raw("   |   "),
        Span::styled(format!("{} accounts", accounts.len()), Style::default().fg(Color::DarkGray)),
    ]))
    .block(panel("Account Analysis"));
    f.render_widget(filter_bar, chunks[0]);

    let sort_marker = |key: SortKey| -> &'static str {
        if app.account_query.sort == key {
            app.account_query.direction.arrow()
        } else {
            "↕"
        }
    };

    let header = Row::new(vec![
        Cell::from(format!("Account ID {}", sort_marker(SortKey::AccountId))).style(header_style()),
        Cell::from(format!("Risk Score {}", sort_marker(SortKey::RiskScore))).style(header_style()),
        Cell::from("Status").style(header_style()),
        Cell::from("Sent").style(header_style()),
        Cell::from("Received").style(header_style()),
        Cell::from("Txns").style(header_style()),
        Cell::from("Links").style(header_style()),
        Cell::from("Patterns").style(header_style()),
        Cell::from("Last Activity").style(header_style()),
    ])
    .style(Style::default().bg(Color::DarkGray))
    .height(1);

    let rows: Vec<Row> = accounts
        .iter()
        .map(|account| {
            let risk = Style::default().fg(risk_color(Some(account.risk_level)));
            Row::new(vec![
                Cell::from(account.id.clone()),
                Cell::from(format!("{} {}", format_score(account.risk_score), account.risk_level)).style(risk),
                Cell::from(account.status.label()).style(Style::default().fg(status_color(account.status))),
                Cell::from(format!("↗ {}", format_inr(account.total_sent))),
                Cell::from(format!("↙ {}", format_inr(account.total_received))).style(Style::default().fg(Color::DarkGray)),
                Cell::from(account.transaction_count.to_string()),
                Cell::from(account.connections.to_string()),
                Cell::from(patterns_text(account)),
                Cell::from(account.last_activity.clone()).style(Style::default().fg(Color::DarkGray)),
            ])
            .height(1)
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Length(13),
            Constraint::Length(14),
            Constraint::Length(14),
            Constraint::Length(13),
            Constraint::Length(13),
            Constraint::Length(6),
            Constraint::Length(6),
            Constraint::Min(18),
            Constraint::Length(13),
        ],
    )
    .header(header)
    .block(panel("Accounts"))
    .highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD))
    .highlight_symbol("→ ");

    f.render_stateful_widget(table, chunks[1], &mut app.accounts_state);
}

// ============================================================================
// Graph
// ============================================================================

fn render_graph_canvas(f: &mut Frame, area: Rect, scene: &GraphScene, bounds: Option<(Point, Point)>, title: &str) {
    let (min, max) = bounds.unwrap_or((Point::new(0.0, 0.0), Point::new(1.0, 1.0)));
    let pad = NODE_RADIUS * 2.0;
    let edge_color = rgb(EDGE_COLOR);
    let label_color = rgb(EDGE_LABEL_COLOR);

    // Layout coordinates grow downward; the canvas y axis grows upward
    let canvas = Canvas::default()
        .block(panel(title))
        .x_bounds([min.x - pad, max.x + pad])
        .y_bounds([-(max.y + pad), -(min.y - pad)])
        .paint(|ctx| {
            for edge in &scene.edges {
                ctx.draw(&CanvasLine {
                    x1: edge.from.x,
                    y1: -edge.from.y,
                    x2: edge.to.x,
                    y2: -edge.to.y,
                    color: edge_color,
                });
            }
            for node in &scene.nodes {
                ctx.draw(&Circle {
                    x: node.position.x,
                    y: -node.position.y,
                    radius: NODE_RADIUS / 2.0,
                    color: rgb(node.color),
                });
            }
            ctx.layer();
            for edge in &scene.edges {
                ctx.print(
                    edge.label_position.x,
                    -edge.label_position.y,
                    Span::styled(format!("₹{}", edge.label), Style::default().fg(label_color)),
                );
            }
            for node in &scene.nodes {
                let mut style = Style::default().fg(rgb(node.color));
                if node.selected {
                    style = style.add_modifier(Modifier::BOLD | Modifier::REVERSED);
                }
                ctx.print(node.position.x, -node.position.y, Span::styled(node.label.clone(), style));
            }
        });

    f.render_widget(canvas, area);
}

fn render_graph(f: &mut Frame, area: Rect, app: &App) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(72), Constraint::Percentage(28)])
        .split(area);

    let scene = app.graph.project();
    let title = if app.input_mode == InputMode::Search {
        format!("Transaction Graph Explorer - find: {}_", app.graph_search)
    } else {
        "Transaction Graph Explorer".to_string()
    };
    render_graph_canvas(f, columns[0], &scene, app.graph.bounds(), &title);

    let side = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(8)])
        .split(columns[1]);

    render_node_detail(f, side[0], app);

    let stats = vec![
        key_value("Total Nodes", scene.nodes.len().to_string(), Color::White),
        key_value("Total Edges", app.graph.edges().len().to_string(), Color::White),
        key_value("Drawn Edges", scene.edges.len().to_string(), Color::White),
        key_value(
            "Skipped Edges",
            scene.skipped_edges.to_string(),
            if scene.skipped_edges > 0 { Color::Yellow } else { Color::White },
        ),
    ];
    f.render_widget(Paragraph::new(stats).block(panel("Graph Statistics")), side[1]);
}

fn render_node_detail(f: &mut Frame, area: Rect, app: &App) {
    let content = match app.graph.selected_detail(&app.snapshot.accounts) {
        NodeLookup::NoSelection => vec![
            Line::from(""),
            Line::from(Span::styled("  Select a node to view details", Style::default().fg(Color::DarkGray))),
        ],
        NodeLookup::NotFound(id) => vec![
            Line::from(""),
            Line::from(Span::styled(format!("  {}", id), label_style())),
            Line::from(""),
            Line::from(Span::styled("  Node not found in current graph", Style::default().fg(Color::DarkGray))),
        ],
        NodeLookup::Found(detail) => {
            let risk = detail.node.risk;
            let mut lines = vec![
                Line::from(""),
                Line::from(vec![
                    Span::styled(format!("  {}  ", detail.node.id), label_style()),
                    Span::styled(
                        risk.map(|r| r.as_str()).unwrap_or("unknown"),
                        Style::default().fg(risk_color(risk)),
                    ),
                ]),
                Line::from(""),
                key_value("In-Degree", detail.degree.in_degree.to_string(), Color::White),
                key_value("Out-Degree", detail.degree.out_degree.to_string(), Color::White),
                key_value("Total Flow Out", format_inr(detail.flow_out), Color::Cyan),
                key_value("Total Flow In", format_inr(detail.flow_in), Color::White),
            ];

            if let Some(account) = detail.account {
                lines.push(key_value(
                    "Risk Score",
                    format_score(account.risk_score),
                    risk_color(Some(account.risk_level)),
                ));
                let net = account.net_flow();
                lines.push(key_value(
                    "Account Net Flow",
                    format_inr(net),
                    if net < 0.0 { risk_color(Some(RiskLevel::High)) } else { Color::Green },
                ));
                lines.push(Line::from(""));
                lines.push(Line::from(Span::styled("  DETECTED PATTERNS", header_style())));
                lines.push(Line::from(Span::raw(format!("  {}", patterns_text(account)))));
            }
            lines
        }
    };

    let paragraph = Paragraph::new(content)
        .wrap(Wrap { trim: false })
        .block(panel("Node Details"));
    f.render_widget(paragraph, area);
}

// ============================================================================
// Timeline
// ============================================================================

fn render_timeline(f: &mut Frame, area: Rect, app: &App) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Length(3), Constraint::Min(0)])
        .split(area);

    render_playback_controls(f, rows[0], app);

    let gauge = Gauge::default()
        .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(Color::White)))
        .gauge_style(Style::default().fg(Color::Cyan).bg(Color::Black))
        .ratio(app.timeline.progress().clamp(0.0, 1.0))
        .label(playback_label(&app.timeline));
    f.render_widget(gauge, rows[1]);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(66), Constraint::Percentage(34)])
        .split(rows[2]);

    render_event_sequence(f, columns[0], app);

    let side = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(9), Constraint::Min(0)])
        .split(columns[1]);

    render_temporal_analysis(f, side[0], app);
    render_current_event(f, side[1], app);
}

/// "3/10" position of the playback head; "0/0" with nothing loaded
fn playback_label(timeline: &TimelineController) -> String {
    if timeline.is_empty() {
        "0/0".to_string()
    } else {
        format!("{}/{}", timeline.current_index() + 1, timeline.len())
    }
}

fn render_playback_controls(f: &mut Frame, area: Rect, app: &App) {
    let summary = app.timeline.summary();
    let play = if app.timeline.is_playing() { "⏸ Pause" } else { "▶ Play" };

    // One cell per event in the unfiltered sequence
    let mut strip = vec![Span::raw(" ")];
    for (i, event) in app.timeline.events().iter().enumerate() {
        let glyph = if i <= app.timeline.current_index() { "█" } else { "░" };
        strip.push(Span::styled(glyph, Style::default().fg(event_risk_color(event.risk))));
    }

    let mut spans = vec![
        Span::styled(format!(" ⏮  {}  ⏭ ", play), Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)),
        Span::raw("  |  "),
        Span::styled(summary.window(), Style::default().fg(Color::White)),
        Span::raw("  |  "),
        Span::styled("Filter: ", label_style()),
        Span::raw(if app.timeline.filter().level().is_none() {
            "All Events"
        } else {
            app.timeline.filter().label()
        }),
        Span::raw("  |"),
    ];
    spans.extend(strip);

    let controls = Paragraph::new(Line::from(spans)).block(panel("Timeline Reconstruction"));
    f.render_widget(controls, area);
}

fn render_event_sequence(f: &mut Frame, area: Rect, app: &App) {
    let visible = app.timeline.visible_events();
    let mut lines: Vec<Line> = Vec::new();
    let mut current_line = 0usize;

    for row in &visible {
        let event = row.event;
        if row.current {
            current_line = lines.len();
        }

        let dim = if row.highlighted { Color::White } else { Color::DarkGray };
        let marker = if row.current { "▶" } else { " " };

        lines.push(Line::from(vec![
            Span::styled(format!(" {} ", marker), Style::default().fg(Color::Yellow)),
            Span::styled(
                format!("{} ", event_glyph(event.event_type)),
                Style::default().fg(event_risk_color(event.risk)),
            ),
            Span::styled(
                event.time.clone(),
                Style::default().fg(if row.highlighted { Color::Cyan } else { Color::DarkGray }),
            ),
            Span::raw("  "),
            Span::styled(
                event.event_type.as_str(),
                Style::default().fg(if row.highlighted { event_risk_color(event.risk) } else { Color::DarkGray }),
            ),
        ]));

        if let Some((from, to)) = event.transfer() {
            let amount = event.amount.map(format_inr).unwrap_or_default();
            lines.push(Line::from(vec![
                Span::raw("      "),
                Span::styled(format!("{} → {}", from, to), Style::default().fg(dim)),
                Span::raw("  "),
                Span::styled(amount, Style::default().fg(if row.highlighted { Color::Cyan } else { Color::DarkGray })),
            ]));
        }

        lines.push(Line::from(Span::styled(
            format!("      {}", event.description),
            Style::default().fg(if row.highlighted { Color::Gray } else { Color::DarkGray }),
        )));
        lines.push(Line::from(""));
    }

    if visible.is_empty() {
        lines.push(Line::from(Span::styled("  No events match this filter", Style::default().fg(Color::DarkGray))));
    }

    // Keep the playback head in view
    let inner_height = area.height.saturating_sub(2) as usize;
    let scroll = current_line.saturating_sub(inner_height / 2) as u16;

    let title = format!("Event Sequence ({} events)", visible.len());
    let paragraph = Paragraph::new(lines).scroll((scroll, 0)).block(panel(&title));
    f.render_widget(paragraph, area);
}

fn render_temporal_analysis(f: &mut Frame, area: Rect, app: &App) {
    let summary = app.timeline.summary();
    let lines = vec![
        key_value("Time Window", summary.window(), Color::White),
        key_value("Events", summary.event_count.to_string(), Color::White),
        key_value("Transactions", summary.transaction_count.to_string(), Color::White),
        key_value(
            "Patterns Triggered",
            summary.pattern_count.to_string(),
            risk_color(Some(RiskLevel::Medium)),
        ),
        key_value("Alerts", summary.alert_count.to_string(), risk_color(Some(RiskLevel::High))),
    ];

    f.render_widget(Paragraph::new(lines).block(panel("Temporal Analysis")), area);
}

fn render_current_event(f: &mut Frame, area: Rect, app: &App) {
    let content = match app.timeline.current_event() {
        None => vec![Line::from(Span::styled("  No events loaded", Style::default().fg(Color::DarkGray)))],
        Some(event) => {
            let mut lines = vec![
                key_value("Event", event.id.clone(), Color::White),
                key_value("Time", event.time.clone(), Color::Cyan),
                key_value("Type", event.event_type.as_str().to_string(), Color::White),
                key_value("Risk", event.risk.as_str().to_string(), event_risk_color(event.risk)),
            ];
            if let Some(amount) = event.amount {
                lines.push(key_value("Amount", format_inr(amount), Color::Cyan));
            }
            if let Some(sender) = app.current_sender() {
                lines.push(key_value(
                    "Sender Risk",
                    format!("{} ({})", format_score(sender.risk_score), sender.status.label()),
                    risk_color(Some(sender.risk_level)),
                ));
            }
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(
                format!("  {}", event.description),
                Style::default().fg(Color::Gray).add_modifier(Modifier::ITALIC),
            )));
            lines
        }
    };

    let paragraph = Paragraph::new(content)
        .wrap(Wrap { trim: false })
        .block(panel("Playback Head"));
    f.render_widget(paragraph, area);
}

// ============================================================================
// Reports
// ============================================================================

fn render_reports(f: &mut Frame, area: Rect, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(0)])
        .split(area);

    let reports = app.filtered_reports();

    let filter_bar = Paragraph::new(Line::from(vec![
        Span::styled(" Type: ", label_style()),
        Span::raw(app.report_query.type_filter.label()),
        Span::raw("   |   "),
        Span::styled("Created: ", label_style()),
        Span::raw(app.report_query.range.label()),
        Span::styled(
            format!(" (to {})", app.report_query.reference.format("%Y-%m-%d")),
            Style::default().fg(Color::DarkGray),
        ),
        Span::raw("   |   "),
        Span::styled(format!("{} reports", reports.len()), Style::default().fg(Color::DarkGray)),
    ]))
    .block(panel("Investigation Reports"));
    f.render_widget(filter_bar, chunks[0]);

    let header = Row::new(
        ["ID", "Type", "Title", "Risk", "Accounts", "Status", "Updated", "Assignee"]
            .iter()
            .map(|h| Cell::from(*h).style(header_style())),
    )
    .style(Style::default().bg(Color::DarkGray))
    .height(1);

    let rows: Vec<Row> = reports
        .iter()
        .map(|report| {
            Row::new(vec![
                Cell::from(report.id.clone()).style(Style::default().fg(Color::DarkGray)),
                Cell::from(report.report_type.label()).style(Style::default().fg(report_type_color(report.report_type))),
                Cell::from(truncate(&report.title, 36)),
                Cell::from(report.risk_level.as_str()).style(Style::default().fg(risk_color(Some(report.risk_level)))),
                Cell::from(truncate(&report.account_scope(), 30)),
                Cell::from(report.status.label()).style(Style::default().fg(report_status_color(report.status))),
                Cell::from(report.updated_at.clone()).style(Style::default().fg(Color::DarkGray)),
                Cell::from(report.assignee.clone()),
            ])
            .height(1)
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Length(8),
            Constraint::Length(14),
            Constraint::Min(24),
            Constraint::Length(7),
            Constraint::Length(30),
            Constraint::Length(15),
            Constraint::Length(12),
            Constraint::Length(18),
        ],
    )
    .header(header)
    .block(panel("Reports"))
    .highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD))
    .highlight_symbol("→ ");

    f.render_stateful_widget(table, chunks[1], &mut app.reports_state);
}

#[cfg(test)]
mod tests {
    use super::*;
    use fraud_investigation::{RiskFilter, SampleData};

    fn app() -> App {
        App::new(SampleData::snapshot().unwrap(), None)
    }

    fn press(app: &mut App, code: KeyCode) -> bool {
        app.handle_key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    #[test]
    fn test_page_cycle() {
        let mut page = Page::Dashboard;
        for _ in 0..Page::ALL.len() {
            page = page.next();
        }
        assert_eq!(page, Page::Dashboard);
        assert_eq!(Page::Dashboard.previous(), Page::Reports);
    }

    #[test]
    fn test_quit_and_navigation_keys() {
        let mut app = app();
        assert!(press(&mut app, KeyCode::Tab));
        assert_eq!(app.current_page, Page::Accounts);
        assert!(press(&mut app, KeyCode::BackTab));
        assert_eq!(app.current_page, Page::Dashboard);
        assert!(press(&mut app, KeyCode::Char('4')));
        assert_eq!(app.current_page, Page::Timeline);
        assert!(!press(&mut app, KeyCode::Char('q')));
    }

    #[test]
    fn test_account_search_mode() {
        let mut app = app();
        app.current_page = Page::Accounts;

        press(&mut app, KeyCode::Char('/'));
        assert_eq!(app.input_mode, InputMode::Search);
        for c in "9012".chars() {
            press(&mut app, KeyCode::Char(c));
        }
        // 'q' while searching is text, not quit
        assert!(press(&mut app, KeyCode::Char('q')));
        press(&mut app, KeyCode::Backspace);
        press(&mut app, KeyCode::Enter);

        assert_eq!(app.input_mode, InputMode::Normal);
        assert_eq!(app.account_query.search, "9012");
        assert_eq!(app.filtered_accounts().len(), 1);
        assert_eq!(app.accounts_state.selected(), Some(0));

        press(&mut app, KeyCode::Char('c'));
        assert_eq!(app.filtered_accounts().len(), 6);
    }

    #[test]
    fn test_account_risk_filter_resets_selection() {
        let mut app = app();
        app.current_page = Page::Accounts;
        press(&mut app, KeyCode::Down);
        press(&mut app, KeyCode::Down);
        assert_eq!(app.accounts_state.selected(), Some(2));

        press(&mut app, KeyCode::Char('r'));
        assert_eq!(app.account_query.risk, RiskFilter::High);
        assert_eq!(app.accounts_state.selected(), Some(0));
    }

    #[test]
    fn test_timeline_keys_and_tick() {
        let mut app = app();
        app.current_page = Page::Timeline;

        press(&mut app, KeyCode::Right);
        press(&mut app, KeyCode::Right);
        assert_eq!(app.timeline.current_index(), 2);
        press(&mut app, KeyCode::Left);
        assert_eq!(app.timeline.current_index(), 1);

        press(&mut app, KeyCode::Char(' '));
        assert!(app.timeline.is_playing());
        app.on_tick();
        assert_eq!(app.timeline.current_index(), 2);

        press(&mut app, KeyCode::End);
        assert_eq!(app.timeline.current_index(), 9);
        app.on_tick();
        assert!(!app.timeline.is_playing());

        press(&mut app, KeyCode::Char('r'));
        assert_eq!(app.timeline.filter(), RiskFilter::High);
    }

    #[test]
    fn test_graph_selection_keys() {
        let mut app = app();
        app.current_page = Page::Graph;

        press(&mut app, KeyCode::Down);
        assert_eq!(app.graph.selected(), Some("A001"));
        press(&mut app, KeyCode::Char('x'));
        assert_eq!(app.graph.selected(), None);

        press(&mut app, KeyCode::Char('/'));
        for c in "a005".chars() {
            press(&mut app, KeyCode::Char(c));
        }
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.graph.selected(), Some("A005"));
    }

    #[test]
    fn test_report_filters() {
        let mut app = app();
        app.current_page = Page::Reports;
        assert_eq!(app.filtered_reports().len(), 4);

        press(&mut app, KeyCode::Char('t'));
        assert_eq!(app.filtered_reports().len(), 2);
        press(&mut app, KeyCode::Char('t'));
        assert_eq!(app.filtered_reports().len(), 1);
        press(&mut app, KeyCode::Char('d'));
        assert_eq!(app.report_query.range.label(), "Last 30 days");
    }

    #[test]
    fn test_playback_label() {
        let app = app();
        assert_eq!(playback_label(&app.timeline), "1/10");
        assert_eq!(playback_label(&TimelineController::new(Vec::new())), "0/0");
    }

    #[test]
    fn test_current_sender_follows_playback_head() {
        let mut app = app();
        // E001 is a system event with no transfer
        assert!(app.current_sender().is_none());

        app.timeline.step_forward();
        assert_eq!(app.current_sender().map(|a| a.id.as_str()), Some("ACC-7821"));

        // ACC-1234 receives but is not in the account list
        app.timeline.set_current_index(8);
        assert_eq!(app.current_sender().map(|a| a.id.as_str()), Some("ACC-9012"));
        app.timeline.set_current_index(4);
        assert!(app.current_sender().is_none());
    }

    #[test]
    fn test_graph_previous_without_selection_picks_last() {
        let mut app = app();
        app.current_page = Page::Graph;
        press(&mut app, KeyCode::Up);
        assert_eq!(app.graph.selected(), Some("A008"));
    }

    #[test]
    fn test_step_selection_wraps() {
        let mut state = TableState::default();
        step_selection(&mut state, 3, true);
        assert_eq!(state.selected(), Some(0));
        step_selection(&mut state, 3, false);
        assert_eq!(state.selected(), Some(2));
        step_selection(&mut state, 3, true);
        assert_eq!(state.selected(), Some(0));
        step_selection(&mut state, 0, true);
        assert_eq!(state.selected(), None);
    }
}
