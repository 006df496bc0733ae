mod app;

use std::io;
use std::time::Duration;

use app::{edge_pct, lineup, odds, pct, truncate, value_badge, AppState, Badge, ConnectionStatus, THRESHOLD_STEP};
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame, Terminal,
};

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> io::Result<()> {
    let base_url = std::env::var("API_URL").unwrap_or_else(|_| "http://localhost:3000".to_string());

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(10))
        .build()
        .map_err(io::Error::other)?;

    let mut app = AppState::new(base_url, chrono::Local::now().date_naive());

    // Initial fetch before rendering
    app.refresh(&client).await;

    // Terminal setup
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut table_state = TableState::default();

    let result = run_loop(&mut terminal, &mut app, &client, &mut table_state).await;

    // Restore terminal regardless of result
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
    terminal.show_cursor()?;

    result
}

// ---------------------------------------------------------------------------
// Main event loop
// ---------------------------------------------------------------------------

async fn run_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut AppState,
    client: &reqwest::Client,
    table_state: &mut TableState,
) -> io::Result<()> {
    let refresh_interval = Duration::from_secs(300);
    let mut last_tick = std::time::Instant::now();

    loop {
        terminal.draw(|f| render(f, app, table_state))?;

        let timeout = refresh_interval
            .checked_sub(last_tick.elapsed())
            .unwrap_or(Duration::ZERO);

        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }

                if app.editing_search {
                    match key.code {
                        KeyCode::Enter | KeyCode::Esc => {
                            app.editing_search = false;
                            requery(app, client, table_state).await;
                            last_tick = std::time::Instant::now();
                        }
                        KeyCode::Backspace => {
                            app.controls.search.pop();
                        }
                        KeyCode::Char(c) => app.controls.search.push(c),
                        _ => {}
                    }
                    continue;
                }

                let changed = match key.code {
                    KeyCode::Char('q') | KeyCode::Char('Q') => return Ok(()),
                    KeyCode::Char('r') | KeyCode::Char('R') => true,
                    KeyCode::Char('m') => {
                        app.controls.cycle_market();
                        true
                    }
                    KeyCode::Char('s') => {
                        app.controls.cycle_sort();
                        true
                    }
                    KeyCode::Char('d') => {
                        app.controls.descending = !app.controls.descending;
                        true
                    }
                    KeyCode::Char('t') => {
                        app.controls.starters_only = !app.controls.starters_only;
                        true
                    }
                    KeyCode::Char('p') => {
                        app.controls.top_picks_only = !app.controls.top_picks_only;
                        true
                    }
                    KeyCode::Char('+') | KeyCode::Char('=') => {
                        app.controls.bump_threshold(THRESHOLD_STEP);
                        app.controls.top_picks_only
                    }
                    KeyCode::Char('-') => {
                        app.controls.bump_threshold(-THRESHOLD_STEP);
                        app.controls.top_picks_only
                    }
                    KeyCode::Char('l') => {
                        app.controls.cycle_limit();
                        true
                    }
                    KeyCode::Char('[') => {
                        app.controls.shift_date(-1);
                        true
                    }
                    KeyCode::Char(']') => {
                        app.controls.shift_date(1);
                        true
                    }
                    KeyCode::Char('/') => {
                        app.editing_search = true;
                        false
                    }
                    KeyCode::Down | KeyCode::Char('j') => {
                        let max = app.picks.rows.len().saturating_sub(1);
                        let next = table_state.selected().map_or(0, |i| (i + 1).min(max));
                        table_state.select(Some(next));
                        false
                    }
                    KeyCode::Up | KeyCode::Char('k') => {
                        let prev = table_state.selected().map_or(0, |i| i.saturating_sub(1));
                        table_state.select(Some(prev));
                        false
                    }
                    _ => false,
                };

                if changed {
                    requery(app, client, table_state).await;
                    last_tick = std::time::Instant::now();
                }
            }
        }

        if last_tick.elapsed() >= refresh_interval {
            app.refresh(client).await;
            last_tick = std::time::Instant::now();
        }
    }
}

async fn requery(app: &mut AppState, client: &reqwest::Client, table_state: &mut TableState) {
    app.status = ConnectionStatus::Connecting;
    app.refresh(client).await;
    table_state.select(None);
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

fn render(f: &mut Frame, app: &AppState, table_state: &mut TableState) {
    let area = f.area();

    // Outer vertical split: header | table | footer
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4), // header
            Constraint::Min(0),    // table
            Constraint::Length(1), // footer
        ])
        .split(area);

    render_header(f, app, chunks[0]);
    render_picks_table(f, app, table_state, chunks[1]);
    render_footer(f, app, chunks[2]);
}

fn render_header(f: &mut Frame, app: &AppState, area: Rect) {
    let (status_text, status_color) = match &app.status {
        ConnectionStatus::Connected => ("● connected".to_string(), Color::Green),
        ConnectionStatus::Connecting => ("◌ loading".to_string(), Color::Yellow),
        ConnectionStatus::Error(e) => (format!("✗ {}", truncate(e, 48)), Color::Red),
    };

    let c = &app.controls;
    let limit = match c.limit_value() {
        -1 => "All".to_string(),
        n => n.to_string(),
    };

    let title = Line::from(vec![
        Span::styled(
            " MLB Picks  ",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ),
        Span::styled(status_text, Style::default().fg(status_color)),
        Span::raw("  │  "),
        Span::styled(c.date.format("%Y-%m-%d").to_string(), Style::default().fg(Color::White)),
        Span::raw("  │  "),
        Span::styled(
            format!("{} of {} players", app.picks.rows.len(), app.picks.total),
            Style::default().fg(Color::White),
        ),
    ]);

    let mut filters = vec![
        Span::styled(" Market: ", Style::default().fg(Color::DarkGray)),
        Span::styled(c.market_label(), Style::default().fg(Color::White)),
        Span::styled("  Sort: ", Style::default().fg(Color::DarkGray)),
        Span::styled(
            format!("{} {}", c.sort_label(), if c.descending { "↓" } else { "↑" }),
            Style::default().fg(Color::White),
        ),
        Span::styled("  Limit: ", Style::default().fg(Color::DarkGray)),
        Span::styled(limit, Style::default().fg(Color::White)),
    ];
    if c.starters_only {
        filters.push(Span::styled("  [starters]", Style::default().fg(Color::Cyan)));
    }
    if c.top_picks_only {
        filters.push(Span::styled(
            format!("  [top picks ≥ {:.1}]", c.threshold),
            Style::default().fg(Color::Cyan),
        ));
    }
    if app.editing_search || !c.search.is_empty() {
        let cursor = if app.editing_search { "▏" } else { "" };
        filters.push(Span::styled("  Search: ", Style::default().fg(Color::DarkGray)));
        filters.push(Span::styled(
            format!("{}{cursor}", c.search),
            Style::default().fg(Color::Yellow),
        ));
    }

    let paragraph = Paragraph::new(vec![title, Line::from(filters)]).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray)),
    );

    f.render_widget(paragraph, area);
}

fn render_picks_table(f: &mut Frame, app: &AppState, state: &mut TableState, area: Rect) {
    let header_cells = ["#", "Player", "Team", "Slot", "Model", "Odds", "Fair", "Edge", "", "Score"]
        .iter()
        .map(|h| Cell::from(*h).style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)));
    let header = Row::new(header_cells).height(1);

    let rows: Vec<Row> = app
        .picks
        .rows
        .iter()
        .map(|p| {
            let m = &p.active;

            let (badge, badge_color) = match value_badge(m.edge) {
                Some((Badge::Value, text)) => (text, Color::Green),
                Some((Badge::Fade, text)) => (text, Color::Red),
                None => (String::new(), Color::DarkGray),
            };

            let score_color = if m.score >= 8.0 {
                Color::Green
            } else if m.score >= 5.0 {
                Color::Yellow
            } else {
                Color::White
            };

            Row::new(vec![
                Cell::from(p.rank.to_string()).style(Style::default().fg(Color::DarkGray)),
                Cell::from(truncate(&p.player_name, 24)),
                Cell::from(truncate(&p.team, 5)).style(Style::default().fg(Color::Cyan)),
                Cell::from(lineup(p.lineup_slot)),
                Cell::from(pct(m.model_prob)),
                Cell::from(odds(m.market_odds)),
                Cell::from(odds(m.fair_odds)).style(Style::default().fg(Color::DarkGray)),
                Cell::from(edge_pct(m.edge)),
                Cell::from(badge).style(Style::default().fg(badge_color)),
                Cell::from(format!("{:.1}", m.score))
                    .style(Style::default().fg(score_color).add_modifier(Modifier::BOLD)),
            ])
        })
        .collect();

    let title = format!(" {} PICKS ", app.controls.market_label().to_uppercase());

    let table = Table::new(
        rows,
        [
            Constraint::Length(4),
            Constraint::Min(12),
            Constraint::Length(5),
            Constraint::Length(4),
            Constraint::Length(7),
            Constraint::Length(6),
            Constraint::Length(6),
            Constraint::Length(7),
            Constraint::Length(13),
            Constraint::Length(5),
        ],
    )
    .header(header)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray))
            .title(Span::styled(
                title,
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            )),
    )
    .row_highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD));

    f.render_stateful_widget(table, area, state);
}

fn render_footer(f: &mut Frame, app: &AppState, area: Rect) {
    let key = |k: &'static str| Span::styled(k, Style::default().fg(Color::Yellow));

    let line = if app.editing_search {
        Line::from(vec![
            key(" [enter/esc] "),
            Span::raw("apply search  "),
            key("[backspace] "),
            Span::raw("delete"),
        ])
    } else {
        Line::from(vec![
            key(" [q] "),
            Span::raw("quit  "),
            key("[r] "),
            Span::raw("refresh  "),
            key("[m] "),
            Span::raw("market  "),
            key("[s/d] "),
            Span::raw("sort/dir  "),
            key("[t] "),
            Span::raw("starters  "),
            key("[p +/-] "),
            Span::raw("top picks  "),
            key("[l] "),
            Span::raw("limit  "),
            key("[/] "),
            Span::raw("search  "),
            key("[[ ]] "),
            Span::raw("date  "),
            key("[j k] "),
            Span::raw("scroll  "),
            Span::styled("auto-refresh: 5m", Style::default().fg(Color::DarkGray)),
        ])
    };
    let paragraph = Paragraph::new(line).style(Style::default().fg(Color::White));
    f.render_widget(paragraph, area);
}
