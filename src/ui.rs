use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame, Terminal,
};
use std::sync::OnceLock;
use std::time::Duration;

use crate::status::render_status_bar;

pub type Term = Terminal<ratatui::backend::CrosstermBackend<std::io::Stdout>>;

// ── Themes ────────────────────────────────────────────────────────────────────

pub const THEMES: &[(&str, Color)] = &[
    ("Green (Default)", Color::Green),
    ("White", Color::White),
    ("Amber", Color::Yellow),
    ("Blue", Color::Blue),
    ("Red", Color::Red),
    ("Purple", Color::Magenta),
    ("Light Blue", Color::Cyan),
];

pub fn theme_color(name: &str) -> Color {
    THEMES
        .iter()
        .find(|(n, _)| *n == name)
        .map(|(_, c)| *c)
        .unwrap_or(Color::Green)
}

static THEME: OnceLock<Color> = OnceLock::new();

pub fn set_theme(name: &str) {
    if THEME.set(theme_color(name)).is_err() {
        tracing::debug!(theme = name, "theme already set, ignoring");
    }
}

fn current_theme_color() -> Color {
    THEME.get().copied().unwrap_or(Color::Green)
}

pub const HEADER_LINES: &[&str] = &["HOME DASHBOARD", "services on this network"];

// ── Padding ───────────────────────────────────────────────────────────────────
const H_PAD: u16 = 3;

pub fn pad_horizontal(area: Rect) -> Rect {
    let pad = H_PAD.min(area.width / 2);
    Rect {
        x: area.x + pad,
        y: area.y,
        width: area.width.saturating_sub(pad * 2),
        height: area.height,
    }
}

// ── Color helpers ─────────────────────────────────────────────────────────────

pub fn normal_style() -> Style {
    Style::default().fg(current_theme_color())
}
pub fn sel_style() -> Style {
    Style::default()
        .fg(Color::Black)
        .bg(current_theme_color())
        .add_modifier(Modifier::BOLD)
}
pub fn title_style() -> Style {
    Style::default()
        .fg(current_theme_color())
        .add_modifier(Modifier::BOLD)
}
pub fn dim_style() -> Style {
    Style::default()
        .fg(current_theme_color())
        .add_modifier(Modifier::DIM)
}

// ── Header ────────────────────────────────────────────────────────────────────

pub fn render_header(f: &mut Frame, area: Rect) {
    let inner = pad_horizontal(area);
    let lines: Vec<Line> = HEADER_LINES
        .iter()
        .map(|l| Line::from(Span::styled(*l, title_style())))
        .collect();
    let p = Paragraph::new(lines).alignment(Alignment::Center);
    f.render_widget(p, inner);
}

pub fn render_separator(f: &mut Frame, area: Rect) {
    let inner = pad_horizontal(area);
    let sep = "=".repeat(inner.width as usize);
    let p = Paragraph::new(sep).style(dim_style());
    f.render_widget(p, inner);
}

fn render_title(f: &mut Frame, area: Rect, title: &str) {
    let p = Paragraph::new(title)
        .alignment(Alignment::Center)
        .style(title_style());
    f.render_widget(p, pad_horizontal(area));
}

// ── Menu ──────────────────────────────────────────────────────────────────────

pub const SEPARATOR: &str = "---";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuResult {
    Selected(String),
    Back,
}

/// Index of the `idx`-th selectable entry after moving by `delta`, clamped.
fn step_selection(idx: usize, delta: isize, selectable: usize) -> usize {
    if selectable == 0 {
        return 0;
    }
    idx.saturating_add_signed(delta).min(selectable - 1)
}

pub fn run_menu(
    terminal: &mut Term,
    title: &str,
    choices: &[&str],
    subtitle: Option<&str>,
) -> Result<MenuResult> {
    let selectable: Vec<&str> = choices.iter().copied().filter(|c| *c != SEPARATOR).collect();
    let mut idx = 0usize;

    loop {
        terminal.draw(|f| {
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([
                    Constraint::Length(2),
                    Constraint::Length(1),
                    Constraint::Length(1),
                    Constraint::Length(1),
                    Constraint::Length(if subtitle.is_some() { 2 } else { 0 }),
                    Constraint::Min(1),
                    Constraint::Length(1),
                ])
                .split(f.area());

            render_header(f, chunks[0]);
            render_separator(f, chunks[1]);
            render_title(f, chunks[2], title);
            render_separator(f, chunks[3]);

            if let Some(sub) = subtitle {
                let sp = Paragraph::new(Span::styled(sub, dim_style()));
                f.render_widget(sp, pad_horizontal(chunks[4]));
            }

            let selected = selectable.get(idx).copied();
            let lines: Vec<Line> = choices
                .iter()
                .map(|&choice| {
                    if choice == SEPARATOR {
                        Line::from("")
                    } else if Some(choice) == selected {
                        Line::from(Span::styled(format!("  > {choice}"), sel_style()))
                    } else {
                        Line::from(Span::styled(format!("    {choice}"), normal_style()))
                    }
                })
                .collect();
            f.render_widget(Paragraph::new(lines), pad_horizontal(chunks[5]));

            render_status_bar(f, chunks[6]);
        })?;

        if event::poll(Duration::from_millis(200))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                match key.code {
                    KeyCode::Up | KeyCode::Char('k') => {
                        idx = step_selection(idx, -1, selectable.len());
                    }
                    KeyCode::Down | KeyCode::Char('j') => {
                        idx = step_selection(idx, 1, selectable.len());
                    }
                    KeyCode::Enter | KeyCode::Char(' ') => {
                        if let Some(&sel) = selectable.get(idx) {
                            return Ok(MenuResult::Selected(sel.to_string()));
                        }
                    }
                    KeyCode::Char('q') | KeyCode::Esc | KeyCode::Tab => {
                        return Ok(MenuResult::Back);
                    }
                    _ => {}
                }
            }
        }
    }
}

// ── Text input ────────────────────────────────────────────────────────────────

pub fn input_prompt(terminal: &mut Term, prompt: &str) -> Result<Option<String>> {
    read_line(terminal, prompt, false)
}

/// Like [`input_prompt`] but echoes `*` per character.
pub fn password_prompt(terminal: &mut Term, prompt: &str) -> Result<Option<String>> {
    read_line(terminal, prompt, true)
}

fn read_line(terminal: &mut Term, prompt: &str, masked: bool) -> Result<Option<String>> {
    let mut buf = String::new();

    loop {
        terminal.draw(|f| {
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([
                    Constraint::Length(2),
                    Constraint::Length(1),
                    Constraint::Min(1),
                    Constraint::Length(1),
                ])
                .split(f.area());

            render_header(f, chunks[0]);
            render_separator(f, chunks[1]);

            let shown = if masked {
                "*".repeat(buf.chars().count())
            } else {
                buf.clone()
            };
            let display = format!("{prompt}\n\n  > {shown}█");
            f.render_widget(
                Paragraph::new(display).style(normal_style()),
                pad_horizontal(chunks[2]),
            );
            render_status_bar(f, chunks[3]);
        })?;

        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                match key.code {
                    // Passwords are compared exactly, so only trim visible input.
                    KeyCode::Enter if masked => return Ok(Some(buf)),
                    KeyCode::Enter => return Ok(Some(buf.trim().to_string())),
                    KeyCode::Esc => return Ok(None),
                    KeyCode::Backspace => {
                        buf.pop();
                    }
                    KeyCode::Char(c) if !c.is_control() => buf.push(c),
                    _ => {}
                }
            }
        }
    }
}

// ── Confirmation dialog ───────────────────────────────────────────────────────

pub fn confirm(terminal: &mut Term, message: &str) -> Result<bool> {
    loop {
        terminal.draw(|f| {
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Length(2), Constraint::Min(1), Constraint::Length(1)])
                .split(f.area());
            render_header(f, chunks[0]);

            let msg = format!("{message}\n\n  [y] Yes    [n] No");
            f.render_widget(
                Paragraph::new(msg).style(normal_style()),
                pad_horizontal(chunks[1]),
            );
            render_status_bar(f, chunks[2]);
        })?;

        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                match key.code {
                    KeyCode::Char('y') | KeyCode::Char('Y') => return Ok(true),
                    KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => return Ok(false),
                    _ => {}
                }
            }
        }
    }
}

// ── Message flash ─────────────────────────────────────────────────────────────

pub fn flash_message(terminal: &mut Term, message: &str, ms: u64) -> Result<()> {
    terminal.draw(|f| {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(2), Constraint::Min(1), Constraint::Length(1)])
            .split(f.area());
        render_header(f, chunks[0]);
        let p = Paragraph::new(format!("\n  {message}")).style(normal_style());
        f.render_widget(p, pad_horizontal(chunks[1]));
        render_status_bar(f, chunks[2]);
    })?;
    std::thread::sleep(Duration::from_millis(ms));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selection_is_clamped() {
        assert_eq!(step_selection(0, -1, 3), 0);
        assert_eq!(step_selection(2, 1, 3), 2);
        assert_eq!(step_selection(1, 1, 3), 2);
        assert_eq!(step_selection(0, 1, 0), 0);
    }

    #[test]
    fn first_theme_wins() {
        set_theme("Amber");
        set_theme("Red");
        assert_eq!(current_theme_color(), Color::Yellow);
    }

    #[test]
    fn unknown_theme_falls_back_to_green() {
        assert_eq!(theme_color("Amber"), Color::Yellow);
        assert_eq!(theme_color("Chartreuse"), Color::Green);
    }
}
