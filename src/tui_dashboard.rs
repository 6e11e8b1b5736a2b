// File: src/tui_dashboard.rs
// Terminal UI explorer using ratatui

use anyhow::Result;
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
    widgets::{Block, Borders, Cell, List, ListItem, ListState, Paragraph, Row, Table, TableState},
    Frame, Terminal,
};
use std::{io, sync::Arc, time::Duration};
use tokio::sync::mpsc::unbounded_channel;

use crate::data_models::AppConfig;
use crate::ledger_gateway::{spawn_fetch, HttpGateway, LedgerGateway};
use crate::navigator::{Explorer, FetchOutcome, FetchRequest};
use crate::view_model::{explorer_view, truncate_hash, BlockSection, ChainSection, DetailStatus, ExplorerView};

/// Which pane receives navigation keys
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Chain,
    Block,
}

/// Application state for TUI
pub struct TuiApp {
    pub config: AppConfig,
    pub explorer: Explorer,
    pub focus: Focus,
    pub chain_cursor: usize,
    pub tx_cursor: usize,
    pub should_quit: bool,
}

impl TuiApp {
    pub fn new(config: AppConfig) -> Self {
        Self {
            config,
            explorer: Explorer::new(),
            focus: Focus::Chain,
            chain_cursor: 0,
            tx_cursor: 0,
            should_quit: false,
        }
    }

    fn chain_hash_at(&self, index: usize) -> Option<String> {
        self.explorer
            .chain_panel()
            .and_then(|panel| panel.chain().hashes.get(index).cloned())
    }

    fn transaction_hash_at(&self, index: usize) -> Option<String> {
        self.explorer
            .chain_panel()
            .and_then(|panel| panel.block_panel())
            .and_then(|block| block.block().transaction_hashes.get(index).cloned())
    }

    fn row_count(&self) -> usize {
        let panel = self.explorer.chain_panel();
        match self.focus {
            Focus::Chain => panel.map_or(0, |p| p.chain().hashes.len()),
            Focus::Block => panel
                .and_then(|p| p.block_panel())
                .map_or(0, |b| b.block().transaction_hashes.len()),
        }
    }

    fn has_block(&self) -> bool {
        self.explorer
            .chain_panel()
            .is_some_and(|panel| panel.block_panel().is_some())
    }

    fn move_cursor(&mut self, down: bool) {
        let rows = self.row_count();
        if rows == 0 {
            return;
        }
        let cursor = match self.focus {
            Focus::Chain => &mut self.chain_cursor,
            Focus::Block => &mut self.tx_cursor,
        };
        *cursor = if down {
            (*cursor + 1).min(rows - 1)
        } else {
            cursor.saturating_sub(1)
        };
    }

    /// Handle keyboard input. Returns the fetch the key press started, if any.
    pub fn handle_input(&mut self, key: KeyCode) -> Option<FetchRequest> {
        match key {
            KeyCode::Char('q') => {
                self.should_quit = true;
                None
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.move_cursor(false);
                None
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.move_cursor(true);
                None
            }
            KeyCode::Tab => {
                self.focus = match self.focus {
                    Focus::Chain if self.has_block() => Focus::Block,
                    _ => Focus::Chain,
                };
                None
            }
            KeyCode::Enter => match self.focus {
                Focus::Chain => {
                    let hash = self.chain_hash_at(self.chain_cursor)?;
                    let request = self.explorer.select(&hash);
                    if request.is_some() {
                        self.tx_cursor = 0;
                    }
                    request
                }
                Focus::Block => {
                    let hash = self.transaction_hash_at(self.tx_cursor)?;
                    self.explorer.toggle_transaction(&hash)
                }
            },
            KeyCode::Right | KeyCode::Char('l') if self.focus == Focus::Block => {
                let hash = self.transaction_hash_at(self.tx_cursor)?;
                self.explorer.expand_transaction(&hash)
            }
            KeyCode::Left | KeyCode::Char('h') if self.focus == Focus::Block => {
                self.explorer.collapse_transaction();
                None
            }
            KeyCode::Esc | KeyCode::Backspace => {
                if self.focus == Focus::Block {
                    self.explorer.collapse_transaction();
                    self.focus = Focus::Chain;
                }
                None
            }
            _ => None,
        }
    }

    /// Apply a settled fetch
    pub fn apply(&mut self, outcome: FetchOutcome) {
        if self.explorer.apply(outcome) && !self.has_block() {
            self.focus = Focus::Chain;
        }
    }
}

/// Run the TUI explorer
pub async fn run_tui_mode(config: &AppConfig) -> Result<()> {
    let gateway: Arc<dyn LedgerGateway> = Arc::new(HttpGateway::new(config)?);

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let (outcome_tx, mut outcome_rx) = unbounded_channel::<FetchOutcome>();
    let mut app = TuiApp::new(config.clone());

    if let Some(request) = app.explorer.mount() {
        spawn_fetch(gateway.clone(), request, outcome_tx.clone());
    }

    let tick_rate = Duration::from_millis(100);

    let result: Result<()> = loop {
        if let Err(e) = terminal.draw(|f| ui(f, &app)) {
            break Err(e.into());
        }

        match event::poll(tick_rate) {
            Ok(true) => match event::read() {
                Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => {
                    if let Some(request) = app.handle_input(key.code) {
                        spawn_fetch(gateway.clone(), request, outcome_tx.clone());
                    }
                }
                Ok(_) => {}
                Err(e) => break Err(e.into()),
            },
            Ok(false) => {}
            Err(e) => break Err(e.into()),
        }

        while let Ok(outcome) = outcome_rx.try_recv() {
            app.apply(outcome);
        }

        if app.should_quit {
            break Ok(());
        }
    };

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    println!("👋 Ledger Explorer - closed");

    result
}

/// Render the UI
fn ui(f: &mut Frame, app: &TuiApp) {
    let view = explorer_view(&app.explorer);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(4), // Header
            Constraint::Min(10),   // Chain + block
            Constraint::Length(3), // Footer
        ])
        .split(f.area());

    render_header(f, chunks[0], app, &view);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(chunks[1]);

    match &view.chain {
        Some(chain) => {
            render_chain(f, body[0], app, chain);
            render_block_pane(f, body[1], app, chain);
        }
        None => {
            let loading = Paragraph::new("Loading chain...")
                .style(Style::default().fg(Color::Gray))
                .block(Block::default().borders(Borders::ALL).title("⛓ Chain"));
            f.render_widget(loading, chunks[1]);
        }
    }

    render_footer(f, chunks[2]);
}

fn pane_border(focused: bool) -> Style {
    if focused {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    }
}

/// Render header section
fn render_header(f: &mut Frame, area: Rect, app: &TuiApp, view: &ExplorerView) {
    let blocks = view.chain.as_ref().map_or(0, |c| c.rows.len());
    let header = Paragraph::new(vec![
        Line::from(vec![
            Span::styled("🔍 ", Style::default().fg(Color::Yellow)),
            Span::styled("Ledger Explorer", Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)),
            Span::styled(" - Terminal", Style::default().fg(Color::Gray)),
        ]),
        Line::from(vec![
            Span::styled("Node: ", Style::default().fg(Color::Gray)),
            Span::styled(app.config.node_url.clone(), Style::default().fg(Color::White)),
            Span::styled(format!("   Blocks: {}", blocks), Style::default().fg(Color::Gray)),
        ]),
    ])
    .block(Block::default().borders(Borders::ALL).title("Ledger"));

    f.render_widget(header, area);
}

/// Render the chain table
fn render_chain(f: &mut Frame, area: Rect, app: &TuiApp, chain: &ChainSection) {
    let header_cells = ["#", "Block Hash"]
        .iter()
        .map(|h| Cell::from(*h).style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)));
    let header = Row::new(header_cells).height(1).bottom_margin(1);

    let hash_width = area.width.saturating_sub(12).max(8) as usize;
    let rows = chain.rows.iter().enumerate().map(|(i, row)| {
        let style = if row.active {
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };
        Row::new(vec![
            Cell::from(i.to_string()),
            Cell::from(truncate_hash(&row.hash, hash_width)),
        ])
        .style(style)
    });

    let widths = [Constraint::Length(6), Constraint::Min(8)];
    let focused = app.focus == Focus::Chain;

    let table = Table::new(rows, widths)
        .header(header)
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol(if focused { "▶ " } else { "  " })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(pane_border(focused))
                .title("⛓ Chain"),
        );

    let mut state = TableState::default();
    if !chain.rows.is_empty() {
        state.select(Some(app.chain_cursor.min(chain.rows.len() - 1)));
    }
    f.render_stateful_widget(table, area, &mut state);
}

/// Render the selected block, or why there is none
fn render_block_pane(f: &mut Frame, area: Rect, app: &TuiApp, chain: &ChainSection) {
    let focused = app.focus == Focus::Block;
    let frame = Block::default()
        .borders(Borders::ALL)
        .border_style(pane_border(focused))
        .title("📦 Block");

    let block = match (&chain.block, chain.block_status) {
        (Some(block), _) => block,
        (None, status) => {
            let message = match status {
                DetailStatus::Loading => "Loading block...",
                DetailStatus::Unavailable => "Block unavailable",
                _ => "Select a block and press Enter",
            };
            let placeholder = Paragraph::new(message)
                .style(Style::default().fg(Color::Gray))
                .block(frame);
            f.render_widget(placeholder, area);
            return;
        }
    };

    let inner = frame.inner(area);
    f.render_widget(frame, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(4), Constraint::Min(3)])
        .split(inner);

    render_block_header(f, chunks[0], block);
    render_transactions(f, chunks[1], app, block);
}

fn render_block_header(f: &mut Frame, area: Rect, block: &BlockSection) {
    let label = Style::default().fg(Color::Gray);
    let summary = Paragraph::new(vec![
        Line::from(vec![
            Span::styled("Block Hash: ", label),
            Span::raw(block.block_hash.clone()),
        ]),
        Line::from(vec![
            Span::styled("Transaction Count: ", label),
            Span::raw(block.transaction_count.to_string()),
            Span::styled("   Index: ", label),
            Span::raw(block.index.to_string()),
        ]),
        Line::from(vec![
            Span::styled("Previous: ", label),
            Span::raw(block.previous_hash.clone()),
        ]),
        Line::from(vec![
            Span::styled("Time: ", label),
            Span::raw(block.timestamp.clone()),
        ]),
    ]);
    f.render_widget(summary, area);
}

/// Transaction entries; the expanded one carries its detail card
fn render_transactions(f: &mut Frame, area: Rect, app: &TuiApp, block: &BlockSection) {
    let items: Vec<ListItem> = block
        .entries
        .iter()
        .map(|entry| {
            let marker = if entry.expanded { "▾ " } else { "▸ " };
            let mut lines = vec![Line::from(vec![
                Span::styled(marker, Style::default().fg(Color::Cyan)),
                Span::raw(entry.hash.clone()),
            ])];

            if entry.expanded {
                match (&entry.transaction, entry.status) {
                    (Some(card), _) => {
                        for (label, value) in card.fields() {
                            lines.push(Line::from(vec![
                                Span::styled(format!("    {:<10} ", label), Style::default().fg(Color::Gray)),
                                Span::styled(value, Style::default().fg(Color::White)),
                            ]));
                        }
                    }
                    (None, DetailStatus::Loading) => {
                        lines.push(Line::styled("    Loading...", Style::default().fg(Color::Gray)));
                    }
                    (None, _) => {
                        lines.push(Line::styled("    Transaction unavailable", Style::default().fg(Color::Red)));
                    }
                }
            }
            ListItem::new(lines)
        })
        .collect();

    let focused = app.focus == Focus::Block;
    let list = List::new(items)
        .highlight_style(Style::default().add_modifier(Modifier::BOLD))
        .highlight_symbol(if focused { "▶ " } else { "  " })
        .block(Block::default().borders(Borders::TOP).title("Transactions"));

    let mut state = ListState::default();
    if !block.entries.is_empty() {
        state.select(Some(app.tx_cursor.min(block.entries.len() - 1)));
    }
    f.render_stateful_widget(list, area, &mut state);
}

/// Render footer
fn render_footer(f: &mut Frame, area: Rect) {
    let footer = Paragraph::new("↑/↓ move  Enter select/toggle  →/← expand/collapse  Tab switch pane  Esc back  q quit")
        .style(Style::default().fg(Color::Gray))
        .block(Block::default().borders(Borders::ALL));

    f.render_widget(footer, area);
}
