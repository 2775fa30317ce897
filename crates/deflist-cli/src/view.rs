//! Terminal viewer: shows a document with live definition-list styling and
//! lets the user type into it.

use std::io::{Stdout, stdout};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use deflist_config::Settings;
use deflist_engine::editing::{Applied, UpdateReport};
use deflist_engine::parsing::rope::{TextLine, line, line_at, line_count, lines_in};
use deflist_engine::{LiveEngine, Span as ByteSpan, Style as DecorationStyle, TreeSitterOracle};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Position},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

type Term = Terminal<CrosstermBackend<Stdout>>;

struct App {
    path: PathBuf,
    engine: LiveEngine<TreeSitterOracle>,
    settings: Settings,
    /// Byte offset of the cursor.
    cursor: usize,
    /// First line shown, 1-based.
    top: usize,
    /// Text rows available for the document.
    height: usize,
    status: String,
    dirty: bool,
}

impl App {
    fn new(path: &Path, settings: Settings) -> Result<Self> {
        let bytes = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
        let engine = LiveEngine::<TreeSitterOracle>::from_bytes(&bytes)
            .with_context(|| format!("opening {}", path.display()))?;
        Ok(Self {
            path: path.to_path_buf(),
            engine,
            settings,
            cursor: 0,
            top: 1,
            height: 0,
            status: String::from("Ctrl-S: save | Esc: quit"),
            dirty: false,
        })
    }

    fn cursor_line(&self) -> TextLine {
        line_at(self.engine.rope(), self.cursor)
    }

    /// Column of the cursor on its line, in chars. A cursor sitting inside a
    /// line terminator counts as the end of the line.
    fn cursor_column(&self, cursor_line: &TextLine) -> usize {
        let end = (self.cursor - cursor_line.from).min(cursor_line.text.len());
        cursor_line.text[..end].chars().count()
    }

    fn last_visible(&self) -> usize {
        (self.top + self.height.max(1) - 1).min(line_count(self.engine.rope()))
    }

    /// Tells the engine which lines are on screen when that has changed.
    /// Edits keep the engine's viewport in step on their own; scrolling,
    /// resizing and new lines at the bottom do not.
    fn sync_viewport(&mut self, height: usize) {
        self.height = height;
        let last = self.last_visible();
        if self.engine.visible_lines() == vec![self.top..=last] {
            return;
        }
        let rope = self.engine.rope();
        let span = ByteSpan::new(line(rope, self.top).from, line(rope, last).to);
        self.engine.set_viewport([span]);
    }

    /// Scrolls so the cursor line is visible.
    fn follow_cursor(&mut self) {
        let n = self.cursor_line().number;
        let top = if n < self.top {
            n
        } else if self.height > 0 && n >= self.top + self.height {
            n + 1 - self.height
        } else {
            return;
        };
        self.top = top;
    }

    fn scroll(&mut self, rows: isize) {
        let count = line_count(self.engine.rope());
        self.top = self.top.saturating_add_signed(rows).clamp(1, count);
    }

    fn edit(&mut self, range: std::ops::Range<usize>, text: &str) {
        match self.engine.apply_edit(range.clone(), text) {
            Ok(report) => {
                self.cursor = range.start + text.len();
                self.dirty = true;
                self.status = describe(&report);
                self.follow_cursor();
            }
            Err(e) => self.status = format!("edit rejected: {e}"),
        }
    }

    fn move_horizontal(&mut self, forward: bool) {
        let text = self.engine.text();
        self.cursor = if forward {
            step_forward(&text, self.cursor)
        } else {
            step_back(&text, self.cursor)
        };
        self.follow_cursor();
    }

    fn move_vertical(&mut self, down: bool) {
        let rope = self.engine.rope();
        let current = self.cursor_line();
        let target = if down {
            current.number + 1
        } else {
            current.number.saturating_sub(1)
        };
        if target < 1 || target > line_count(rope) {
            return;
        }
        let chars = self.cursor_column(&current);
        let next = line(rope, target);
        let col: usize = next.text.chars().take(chars).map(char::len_utf8).sum();
        self.cursor = next.from + col;
        self.follow_cursor();
    }

    fn backspace(&mut self) {
        let text = self.engine.text();
        let start = step_back(&text, self.cursor);
        if start < self.cursor {
            self.edit(start..self.cursor, "");
        }
    }

    fn save(&mut self) -> Result<()> {
        std::fs::write(&self.path, self.engine.text())
            .with_context(|| format!("writing {}", self.path.display()))?;
        self.dirty = false;
        self.status = format!("saved {}", self.path.display());
        Ok(())
    }

    /// Returns false when the viewer should close.
    fn handle_key(&mut self, key: KeyEvent) -> Result<bool> {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Esc => return Ok(false),
            KeyCode::Char('q') if ctrl => return Ok(false),
            KeyCode::Char('s') if ctrl => self.save()?,
            KeyCode::Char(c) if !ctrl => {
                let mut buf = [0; 4];
                self.edit(self.cursor..self.cursor, c.encode_utf8(&mut buf));
            }
            KeyCode::Enter => self.edit(self.cursor..self.cursor, "\n"),
            KeyCode::Tab => self.edit(self.cursor..self.cursor, "    "),
            KeyCode::Backspace => self.backspace(),
            KeyCode::Left => self.move_horizontal(false),
            KeyCode::Right => self.move_horizontal(true),
            KeyCode::Up => self.move_vertical(false),
            KeyCode::Down => self.move_vertical(true),
            KeyCode::PageUp => self.scroll(-(self.height.max(1) as isize)),
            KeyCode::PageDown => self.scroll(self.height.max(1) as isize),
            _ => {}
        }
        Ok(true)
    }
}

/// Offset one char after `at`, taking `\r\n` as a single step.
fn step_forward(text: &str, at: usize) -> usize {
    if text[at..].starts_with("\r\n") {
        return at + 2;
    }
    text[at..].chars().next().map_or(at, |c| at + c.len_utf8())
}

/// Offset one char before `at`, taking `\r\n` as a single step.
fn step_back(text: &str, at: usize) -> usize {
    if text[..at].ends_with("\r\n") {
        return at - 2;
    }
    text[..at].chars().next_back().map_or(at, |c| at - c.len_utf8())
}

fn describe(report: &UpdateReport) -> String {
    let what = match &report.applied {
        Applied::NoOp => "shifted".to_string(),
        Applied::Patched { lines } => format!("patched lines {lines:?}"),
        Applied::Rescanned(reason) => format!("rescanned ({reason})"),
    };
    format!("v{} {what}", report.version)
}

fn term_style(settings: &Settings) -> Style {
    let color = settings
        .term_color
        .as_deref()
        .and_then(|c| Color::from_str(c).ok())
        .unwrap_or(Color::Cyan);
    let mut style = Style::default().fg(color);
    if settings.term_bold {
        style = style.add_modifier(Modifier::BOLD);
    }
    if settings.term_italic {
        style = style.add_modifier(Modifier::ITALIC);
    }
    style
}

fn decoration_style(settings: &Settings, style: DecorationStyle) -> Style {
    match style {
        DecorationStyle::Term => term_style(settings),
        DecorationStyle::Definition => Style::default(),
        DecorationStyle::DefinitionListItem => Style::default().fg(Color::Green),
        DecorationStyle::Marker => Style::default().fg(Color::DarkGray),
    }
}

/// Splits one document line into styled spans following its decorations.
fn styled_line<'a>(app: &App, text_line: &'a TextLine) -> Line<'a> {
    let decorations = app.engine.decorations().for_line(text_line.number);
    let text = text_line.text.as_str();
    let mut spans = Vec::new();
    // definitions are indented by one column per 10 px of configured indent
    if decorations
        .iter()
        .any(|d| d.style == DecorationStyle::Definition)
    {
        let cols = (app.settings.definition_indent_px / 10) as usize;
        spans.push(Span::raw(" ".repeat(cols)));
    }

    let mut pos = 0;
    for d in decorations {
        let start = d.range.start.saturating_sub(text_line.from).min(text.len());
        let end = d.range.end.saturating_sub(text_line.from).min(text.len());
        if start < pos || !text.is_char_boundary(start) || !text.is_char_boundary(end) {
            continue;
        }
        if start > pos {
            spans.push(Span::raw(&text[pos..start]));
        }
        spans.push(Span::styled(&text[start..end], decoration_style(&app.settings, d.style)));
        pos = end;
    }
    if pos < text.len() {
        spans.push(Span::raw(&text[pos..]));
    }
    Line::from(spans)
}

fn ui(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1)].as_ref())
        .split(f.area());

    // borders take two rows
    app.sync_viewport(chunks[0].height.saturating_sub(2) as usize);

    let visible: Vec<TextLine> =
        lines_in(app.engine.rope(), app.top..=app.last_visible()).collect();
    let lines: Vec<Line> = visible.iter().map(|l| styled_line(app, l)).collect();

    let title = format!(
        "{}{}",
        app.path.display(),
        if app.dirty { " [modified]" } else { "" }
    );
    let content = Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title(title));
    f.render_widget(content, chunks[0]);
    f.render_widget(Paragraph::new(app.status.as_str()), chunks[1]);

    let cursor = app.cursor_line();
    if cursor.number >= app.top {
        let row = (cursor.number - app.top) as u16;
        let col = app.cursor_column(&cursor) as u16;
        f.set_cursor_position(Position::new(chunks[0].x + 1 + col, chunks[0].y + 1 + row));
    }
}

fn run_app(terminal: &mut Term, app: &mut App) -> Result<()> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        if let Event::Key(key) = event::read()? {
            if key.kind == KeyEventKind::Press && !app.handle_key(key)? {
                return Ok(());
            }
        }
    }
}

pub fn run(path: &Path, settings: Settings) -> Result<()> {
    let mut app = App::new(path, settings)?;

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    res
}
