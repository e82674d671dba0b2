// src/tui/mod.rs
use crate::sync::{AggregateLoader, StatsRefresher, ViewSnapshot};
use crate::types::{Order, Position};
use crate::utils::format::{format_money, format_percent, format_qty};
use crossterm::{
    event::{Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use futures_util::StreamExt;
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
    Frame, Terminal,
};
use std::{io, time::Duration};
use tokio::sync::watch;
use tracing::info;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Refresh,
    SymbolChanged(String),
    Quit,
}

pub struct App {
    pub backend: String,
    pub symbol: String,
    pub snapshot: ViewSnapshot,
}

impl App {
    pub fn new(backend: String, symbol: String) -> Self {
        Self {
            backend,
            symbol,
            snapshot: ViewSnapshot::default(),
        }
    }

    /// Maps a key press to the action it triggers, editing the symbol filter in place.
    pub fn on_key(&mut self, key: KeyEvent) -> Option<Action> {
        if key.kind == KeyEventKind::Release {
            return None;
        }
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Esc => Some(Action::Quit),
            KeyCode::Char('c') if ctrl => Some(Action::Quit),
            KeyCode::Char('r') if ctrl => Some(Action::Refresh),
            KeyCode::F(5) => Some(Action::Refresh),
            KeyCode::Backspace => self.symbol.pop().map(|_| self.symbol_changed()),
            KeyCode::Char(c) if !ctrl && is_symbol_char(c) => {
                self.symbol.push(c.to_ascii_uppercase());
                Some(self.symbol_changed())
            }
            _ => None,
        }
    }

    fn symbol_changed(&self) -> Action {
        Action::SymbolChanged(self.symbol.clone())
    }
}

fn is_symbol_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '/' | ' ')
}

pub async fn run(
    loader: AggregateLoader,
    refresher: StatsRefresher,
    mut snapshots: watch::Receiver<ViewSnapshot>,
    backend: String,
    symbol: String,
    tick_rate: Duration,
) -> anyhow::Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend_impl = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend_impl)?;

    let mut app = App::new(backend, symbol);
    let mut events = EventStream::new();
    let mut ticker = tokio::time::interval(tick_rate);

    let result = async {
        loop {
            app.snapshot = snapshots.borrow_and_update().clone();
            terminal.draw(|f| ui(f, &app))?;

            tokio::select! {
                maybe_event = events.next() => {
                    let Some(event) = maybe_event else { break };
                    if let Event::Key(key) = event? {
                        match app.on_key(key) {
                            Some(Action::Quit) => break,
                            Some(Action::Refresh) => {
                                let loader = loader.clone();
                                let symbol = app.symbol.clone();
                                tokio::spawn(async move { loader.refresh(&symbol).await });
                            }
                            Some(Action::SymbolChanged(symbol)) => {
                                refresher.on_symbol_change(&symbol);
                            }
                            None => {}
                        }
                    }
                }
                changed = snapshots.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
                _ = ticker.tick() => {}
            }
        }
        Ok::<(), anyhow::Error>(())
    }
    .await;

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    info!("dashboard closed");

    result
}

fn ui(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(4),
            Constraint::Min(6),
            Constraint::Min(6),
            Constraint::Length(4),
        ])
        .split(f.size());

    render_header(f, app, chunks[0]);
    render_balance(f, &app.snapshot, chunks[1]);
    render_positions(f, &app.snapshot, chunks[2]);
    render_orders(f, &app.snapshot, chunks[3]);
    render_stats(f, app, chunks[4]);
}

fn render_header(f: &mut Frame, app: &App, area: Rect) {
    let status = match (&app.snapshot.error, app.snapshot.loading) {
        (Some(err), _) => Span::styled(format!("Error: {}", err), Style::default().fg(Color::Red)),
        (None, true) => Span::styled("Loading...", Style::default().fg(Color::Yellow)),
        (None, false) => Span::styled("OK", Style::default().fg(Color::Green)),
    };

    let header = Paragraph::new(Line::from(vec![
        Span::styled(
            format!("Account Dashboard [{}]", app.backend),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::raw(" | Symbol: "),
        Span::styled(
            format!("{}_", app.symbol),
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(" | "),
        status,
    ]))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .title("Status (F5 refresh, Esc quit)"),
    );
    f.render_widget(header, area);
}

fn render_balance(f: &mut Frame, snap: &ViewSnapshot, area: Rect) {
    let text = match &snap.balance {
        Some(b) => Line::from(vec![
            Span::raw("Cash: "),
            Span::styled(format_money(b.cash, &b.currency), Style::default().fg(Color::Yellow)),
            Span::raw("  Equity: "),
            Span::styled(format_money(b.equity, &b.currency), Style::default().fg(Color::Yellow)),
            Span::raw("  Buying power: "),
            Span::styled(
                format_money(b.buying_power, &b.currency),
                Style::default().fg(Color::Yellow),
            ),
            Span::raw(format!("  as of {}", b.timestamp.format("%H:%M:%S"))),
        ]),
        None => Line::from("Waiting for data..."),
    };
    let balance = Paragraph::new(text).block(Block::default().borders(Borders::ALL).title("Balance"));
    f.render_widget(balance, area);
}

fn render_positions(f: &mut Frame, snap: &ViewSnapshot, area: Rect) {
    let currency = account_currency(snap);
    let rows = snap
        .positions
        .iter()
        .map(|p| Row::new(position_cells(p, currency)));
    let table = Table::new(
        rows,
        [
            Constraint::Length(10),
            Constraint::Length(7),
            Constraint::Length(12),
            Constraint::Length(16),
            Constraint::Length(18),
        ],
    )
    .header(header_row(&["Symbol", "Side", "Qty", "Avg price", "Value"]))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!("Open Positions ({})", snap.positions.len())),
    );
    f.render_widget(table, area);
}

fn position_cells(p: &Position, currency: &str) -> Vec<String> {
    vec![
        p.symbol.clone(),
        format!("{:?}", p.side).to_uppercase(),
        format_qty(p.qty),
        format_money(p.avg_price, currency),
        format_money(p.market_value(), currency),
    ]
}

fn render_orders(f: &mut Frame, snap: &ViewSnapshot, area: Rect) {
    let currency = account_currency(snap);
    let rows = snap.orders.iter().map(|o| Row::new(order_cells(o, currency)));
    let table = Table::new(
        rows,
        [
            Constraint::Length(10),
            Constraint::Length(5),
            Constraint::Length(14),
            Constraint::Length(10),
            Constraint::Length(14),
            Constraint::Length(4),
            Constraint::Length(16),
            Constraint::Length(17),
        ],
    )
    .header(header_row(&[
        "Symbol", "Side", "Filled/Qty", "Remaining", "Limit", "TIF", "Status", "Created",
    ]))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!("Open Orders ({})", snap.orders.len())),
    );
    f.render_widget(table, area);
}

fn order_cells(o: &Order, currency: &str) -> Vec<String> {
    let price = o
        .limit_price
        .map(|p| format_money(p, currency))
        .unwrap_or_else(|| "MKT".to_string());
    vec![
        o.symbol.clone(),
        format!("{:?}", o.side).to_uppercase(),
        format!("{}/{}", format_qty(o.filled_qty), format_qty(o.qty)),
        format_qty(o.remaining_qty()),
        price,
        format!("{:?}", o.tif).to_uppercase(),
        format!("{:?}", o.status),
        o.created_at.format("%Y-%m-%d %H:%M").to_string(),
    ]
}

fn render_stats(f: &mut Frame, app: &App, area: Rect) {
    let text = match &app.snapshot.stats {
        Some(s) => Line::from(vec![
            Span::styled(s.symbol.clone(), Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(format!(" [{}]  Trades: {}  Win rate: ", s.window, s.trades)),
            Span::styled(format_percent(s.win_rate), Style::default().fg(Color::Green)),
            Span::raw("  P&L: "),
            Span::styled(
                format_money(s.pnl, account_currency(&app.snapshot)),
                pnl_style(s.pnl.is_sign_negative()),
            ),
            Span::raw(format!("  Avg return: {}", format_percent(s.avg_return))),
            Span::raw(match s.sharpe {
                Some(sharpe) => format!("  Sharpe: {:.2}", sharpe),
                None => "  Sharpe: -".to_string(),
            }),
        ]),
        None => Line::from("No stats for this symbol."),
    };
    let stats = Paragraph::new(text).block(Block::default().borders(Borders::ALL).title("Trade Stats"));
    f.render_widget(stats, area);
}

fn account_currency(snap: &ViewSnapshot) -> &str {
    snap.balance
        .as_ref()
        .map(|b| b.currency.as_str())
        .unwrap_or("USD")
}

fn header_row(titles: &[&'static str]) -> Row<'static> {
    Row::new(titles.iter().map(|t| Cell::from(*t)))
        .style(Style::default().add_modifier(Modifier::BOLD))
}

fn pnl_style(negative: bool) -> Style {
    if negative {
        Style::default().fg(Color::Red)
    } else {
        Style::default().fg(Color::Green)
    }
}
