use std::{
    fs::File,
    io::{self, stdout},
    path::{Path, PathBuf},
    sync::Mutex,
    time::{Duration, Instant},
};

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame, Terminal,
};
use tracing_subscriber::EnvFilter;

use tile_blast::game::{
    BoosterMoveCost, Cell, GameConfig, GameEvent, GameSession, Phase, Position, TileColor,
    DEFAULT_BOMB_BOOSTERS, DEFAULT_COLS, DEFAULT_MAX_MOVES, DEFAULT_ROWS, DEFAULT_TARGET_SCORE,
    DEFAULT_TELEPORT_BOOSTERS,
};

// ============================================================================
// Command Line
// ============================================================================

/// Terminal tile-blast: clear groups of matching tiles before you run out of moves.
#[derive(Parser, Debug)]
#[command(name = "tile-blast", version, about, long_about = None)]
struct Cli {
    #[arg(long, default_value_t = DEFAULT_ROWS)]
    rows: usize,

    #[arg(long, default_value_t = DEFAULT_COLS)]
    cols: usize,

    #[arg(long, default_value_t = DEFAULT_TARGET_SCORE)]
    target_score: u32,

    #[arg(long, default_value_t = DEFAULT_MAX_MOVES)]
    max_moves: i32,

    #[arg(long, default_value_t = DEFAULT_BOMB_BOOSTERS)]
    bombs: u32,

    #[arg(long, default_value_t = DEFAULT_TELEPORT_BOOSTERS)]
    teleports: u32,

    /// Boosters do not cost a move
    #[arg(long)]
    free_boosters: bool,

    /// Write tracing output here (the terminal is taken by the game)
    #[arg(long)]
    log_file: Option<PathBuf>,
}

impl Cli {
    fn config(&self) -> GameConfig {
        GameConfig {
            rows: self.rows,
            cols: self.cols,
            target_score: self.target_score,
            max_moves: self.max_moves,
            bomb_booster_count: self.bombs,
            teleport_booster_count: self.teleports,
            booster_move_cost: if self.free_boosters {
                BoosterMoveCost::Free
            } else {
                BoosterMoveCost::ConsumesMove
            },
        }
    }
}

fn init_logging(path: &Path) -> Result<()> {
    let file = File::create(path).with_context(|| format!("creating log file {}", path.display()))?;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,tile_blast=debug")),
        )
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();
    Ok(())
}

// ============================================================================
// Visual Constants
// ============================================================================

const CELL_WIDTH: u16 = 2;
const BLOCK_CHAR: &str = "██";
const FLASH_CHAR: &str = "░░";
const EMPTY_CHAR: &str = "  ";
const FLASH_DURATION: Duration = Duration::from_millis(180);
const POLL_INTERVAL: Duration = Duration::from_millis(30);

fn tile_color(color: TileColor) -> Color {
    match color {
        TileColor::Red => Color::Red,
        TileColor::Blue => Color::Blue,
        TileColor::Green => Color::Green,
        TileColor::Yellow => Color::Yellow,
        TileColor::Purple => Color::Magenta,
    }
}

// ============================================================================
// Presenter State
// ============================================================================

/// Cells being shown as "just changed" while the session waits for us.
struct Flash {
    cells: Vec<Position>,
    until: Instant,
}

struct App {
    session: GameSession,
    cursor: Position,
    flash: Option<Flash>,
    teleport_first: Option<Position>,
    status: String,
}

impl App {
    fn new(session: GameSession) -> Self {
        Self {
            session,
            cursor: Position::new(0, 0),
            flash: None,
            teleport_first: None,
            status: String::from("Select a group of two or more"),
        }
    }

    fn move_cursor(&mut self, dr: i32, dc: i32) {
        let rows = self.session.board().rows() as i32;
        let cols = self.session.board().cols() as i32;
        self.cursor.row = (self.cursor.row + dr).clamp(0, rows - 1);
        self.cursor.col = (self.cursor.col + dc).clamp(0, cols - 1);
    }

    fn apply_events(&mut self) {
        for event in self.session.take_events() {
            match event {
                GameEvent::MatchResolved(r) | GameEvent::BombResolved(r) => {
                    let mut cells = r.removed_positions;
                    cells.extend(r.movements.iter().map(|m| m.to));
                    cells.extend(r.new_tiles.iter().map(|t| t.pos));
                    self.start_flash(cells);
                    self.status = format!("Cleared! score {} / moves {}", r.score, r.moves_left);
                }
                GameEvent::TeleportResolved { first, second, .. } => {
                    self.teleport_first = None;
                    self.start_flash(vec![first, second]);
                    self.status = String::from("Teleported");
                }
                GameEvent::TeleportSelectionChanged { first, second } => {
                    self.teleport_first = if second.is_none() { Some(first) } else { None };
                }
                GameEvent::BoosterCountChanged { bomb, teleport } => {
                    self.status = format!("Boosters: {bomb} bomb / {teleport} teleport");
                }
                GameEvent::GameWon { score } => self.status = format!("You won with {score}"),
                GameEvent::GameLost { score } => self.status = format!("Out of luck at {score}"),
                GameEvent::GameRestarted => {
                    self.flash = None;
                    self.teleport_first = None;
                }
            }
        }
        if self.session.phase() == Phase::Idle {
            self.teleport_first = None;
        }
    }

    fn start_flash(&mut self, cells: Vec<Position>) {
        self.flash = Some(Flash {
            cells,
            until: Instant::now() + FLASH_DURATION,
        });
    }

    /// Acknowledges the resolved action once its flash has run out.
    fn tick(&mut self) {
        if let Some(flash) = &self.flash {
            if Instant::now() >= flash.until {
                self.flash = None;
                self.session.presentation_complete();
                self.apply_events();
            }
        } else if self.session.is_busy() {
            self.session.presentation_complete();
            self.apply_events();
        }
    }

    fn is_flashing(&self, pos: Position) -> bool {
        self.flash.as_ref().is_some_and(|f| f.cells.contains(&pos))
    }
}

// ============================================================================
// Rendering
// ============================================================================

fn render(frame: &mut Frame, app: &App) {
    let area = frame.size();
    render_game(frame, app, area);

    match app.session.phase() {
        Phase::Won => render_popup(frame, area, " You Win ", "TARGET REACHED", Color::Green, app),
        Phase::Lost => render_popup(frame, area, " Game Over ", "GAME OVER", Color::Red, app),
        _ => {}
    }
}

fn render_game(frame: &mut Frame, app: &App, area: Rect) {
    let board = app.session.board();
    let grid_display_width = (board.cols() as u16 * CELL_WIDTH) + 2;
    let grid_display_height = board.rows() as u16 + 2;
    let info_width = 22;
    let total_width = grid_display_width + info_width + 2;
    let total_height = grid_display_height + 3;

    let main_area = centered_rect(total_width, total_height, area);

    let vertical = Layout::vertical([Constraint::Length(grid_display_height), Constraint::Fill(1)]).split(main_area);
    let game_row = vertical[0];

    let horizontal = Layout::horizontal([Constraint::Length(grid_display_width), Constraint::Length(info_width)])
        .split(game_row);

    render_grid(frame, app, horizontal[0]);
    render_info(frame, app, horizontal[1]);

    let controls_area = Rect {
        x: area.x,
        y: game_row.y + game_row.height,
        width: area.width,
        height: 2,
    };

    if controls_area.y + 1 < area.height {
        let controls = Paragraph::new(vec![
            Line::from("Arrows/WASD: Move | Enter/Space: Select | B: Bomb | T: Teleport"),
            Line::from("Esc: Cancel booster | R: Restart | Q: Quit"),
        ])
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(controls, controls_area);
    }
}

fn render_grid(frame: &mut Frame, app: &App, area: Rect) {
    let border_color = match app.session.phase() {
        Phase::BombTargeting => Color::Yellow,
        Phase::TeleportTargeting => Color::Cyan,
        _ => Color::White,
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(" Tile Blast ")
        .title_alignment(Alignment::Center);

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let mut lines: Vec<Line> = Vec::new();
    for (r, row) in app.session.board().grid().iter().enumerate() {
        let mut spans: Vec<Span> = Vec::new();
        for (c, cell) in row.iter().enumerate() {
            let pos = Position::new(r as i32, c as i32);
            let (symbol, mut style) = match cell {
                Cell::Empty => (EMPTY_CHAR, Style::default()),
                Cell::Occupied(tile) if app.is_flashing(pos) => {
                    (FLASH_CHAR, Style::default().fg(tile_color(tile.color)))
                }
                Cell::Occupied(tile) => (BLOCK_CHAR, Style::default().fg(tile_color(tile.color))),
            };
            if pos == app.cursor {
                style = style.bg(Color::White).add_modifier(Modifier::REVERSED);
            } else if app.teleport_first == Some(pos) {
                style = style.add_modifier(Modifier::SLOW_BLINK);
            }
            spans.push(Span::styled(symbol, style));
        }
        lines.push(Line::from(spans));
    }

    frame.render_widget(Paragraph::new(lines), inner);
}

fn render_info(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Info ")
        .title_alignment(Alignment::Center);

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let rules = app.session.rules();
    let mode = match app.session.phase() {
        Phase::BombTargeting => "Bomb: pick a cell",
        Phase::TeleportTargeting if app.teleport_first.is_some() => "Teleport: 2nd cell",
        Phase::TeleportTargeting => "Teleport: 1st cell",
        _ => "",
    };

    let lines = vec![
        Line::from(Span::styled("Score", Style::default().fg(Color::Yellow))),
        Line::from(format!("{} / {}", rules.score(), rules.target_score())),
        Line::from(""),
        Line::from(Span::styled("Moves", Style::default().fg(Color::Cyan))),
        Line::from(format!("{}", rules.moves_left())),
        Line::from(""),
        Line::from(Span::styled("Boosters", Style::default().fg(Color::Green))),
        Line::from(format!("[B] bomb x{}", rules.bomb_boosters())),
        Line::from(format!("[T] teleport x{}", rules.teleport_boosters())),
        Line::from(""),
        Line::from(Span::styled(mode, Style::default().fg(Color::Magenta))),
        Line::from(Span::styled(app.status.as_str(), Style::default().fg(Color::DarkGray))),
    ];

    let paragraph = Paragraph::new(lines).alignment(Alignment::Center);
    frame.render_widget(paragraph, inner);
}

fn render_popup(frame: &mut Frame, area: Rect, title: &str, headline: &str, color: Color, app: &App) {
    let text = vec![
        Line::from(""),
        Line::from(Span::styled(headline, Style::default().fg(color))),
        Line::from(""),
        Line::from(format!("Score: {}", app.session.rules().score())),
        Line::from(""),
        Line::from(Span::styled("Press R to play again", Style::default().fg(Color::DarkGray))),
        Line::from(Span::styled("Press ESC to quit", Style::default().fg(Color::DarkGray))),
    ];

    let paragraph = Paragraph::new(text).alignment(Alignment::Center).block(
        Block::default()
            .borders(Borders::ALL)
            .title(title)
            .title_alignment(Alignment::Center)
            .style(Style::default().bg(Color::Black)),
    );

    let popup_area = centered_rect(26, 10, area);
    frame.render_widget(paragraph, popup_area);
}

fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let horizontal = Layout::horizontal([
        Constraint::Fill(1),
        Constraint::Length(width.min(area.width)),
        Constraint::Fill(1),
    ])
    .split(area);

    let vertical = Layout::vertical([
        Constraint::Fill(1),
        Constraint::Length(height.min(area.height)),
        Constraint::Fill(1),
    ])
    .split(horizontal[1]);

    vertical[1]
}

// ============================================================================
// Main Loop
// ============================================================================

fn run(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> Result<()> {
    loop {
        terminal.draw(|frame| render(frame, app))?;

        if event::poll(POLL_INTERVAL)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    match key.code {
                        KeyCode::Char('q') | KeyCode::Char('Q') => break,
                        KeyCode::Esc if app.session.is_game_over() => break,
                        KeyCode::Esc => app.session.cancel_targeting(),
                        KeyCode::Char('r') | KeyCode::Char('R') => {
                            app.session.restart()?;
                        }
                        KeyCode::Up | KeyCode::Char('w') | KeyCode::Char('W') => app.move_cursor(-1, 0),
                        KeyCode::Down | KeyCode::Char('s') | KeyCode::Char('S') => app.move_cursor(1, 0),
                        KeyCode::Left | KeyCode::Char('a') | KeyCode::Char('A') => app.move_cursor(0, -1),
                        KeyCode::Right | KeyCode::Char('d') | KeyCode::Char('D') => app.move_cursor(0, 1),
                        KeyCode::Enter | KeyCode::Char(' ') => app.session.select_position(app.cursor),
                        KeyCode::Char('b') | KeyCode::Char('B') => app.session.activate_bomb_mode(),
                        KeyCode::Char('t') | KeyCode::Char('T') => app.session.activate_teleport_mode(),
                        _ => {}
                    }
                    app.apply_events();
                }
            }
        }

        app.tick();
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    if let Some(path) = &cli.log_file {
        init_logging(path)?;
    }

    let session = GameSession::new(cli.config()).context("starting game")?;
    let mut app = App::new(session);

    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout());
    let mut terminal = Terminal::new(backend)?;

    let result = run(&mut terminal, &mut app);

    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;

    result
}
