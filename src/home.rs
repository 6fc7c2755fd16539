use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};
use std::time::Duration;

use homedash::config::Settings;
use homedash::core::{Dashboard, Shortcut, WallpaperConfig, DEFAULT_WALLPAPER};
use homedash::icons::Icon;

use crate::admin::admin_menu;
use crate::launcher::open_shortcut;
use crate::status::render_status_bar;
use crate::ui::{
    dim_style, normal_style, pad_horizontal, render_header, render_separator, sel_style, Term,
};

const CELL_W: u16 = 18;
const CELL_H: u16 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HomeExit {
    Logout,
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Move {
    Left,
    Right,
    Up,
    Down,
}

fn grid_columns(width: u16) -> usize {
    usize::from((width / CELL_W).max(1))
}

fn move_selection(idx: usize, len: usize, cols: usize, dir: Move) -> usize {
    if len == 0 {
        return 0;
    }
    let cols = cols.max(1);
    let next = match dir {
        Move::Left => idx.saturating_sub(1),
        Move::Right => idx + 1,
        Move::Up => idx.checked_sub(cols).unwrap_or(idx),
        Move::Down if idx + cols < len => idx + cols,
        Move::Down => idx,
    };
    next.min(len - 1)
}

pub fn wallpaper_summary(wallpaper: &WallpaperConfig) -> String {
    match wallpaper.uploaded_at() {
        Some(at) if wallpaper.is_custom() => {
            format!("custom image, uploaded {}", at.format("%Y-%m-%d %H:%M UTC"))
        }
        _ if wallpaper.url() == DEFAULT_WALLPAPER => "default".to_string(),
        _ => wallpaper.url().to_string(),
    }
}

fn draw_grid(f: &mut Frame, area: Rect, shortcuts: &[Shortcut], selected: usize, cols: usize) {
    for (i, shortcut) in shortcuts.iter().enumerate() {
        let row = (i / cols) as u16;
        let col = (i % cols) as u16;
        let y = area.y + row * CELL_H;
        if y + CELL_H > area.y + area.height {
            break;
        }
        let cell = Rect::new(area.x + col * CELL_W, y, CELL_W - 1, CELL_H - 1);
        let style = if i == selected {
            sel_style()
        } else if shortcut.is_actionable() {
            normal_style()
        } else {
            dim_style()
        };
        let icon = Icon::resolve(&shortcut.icon_id);
        let lines = vec![
            Line::from(Span::styled(icon.glyph(), style)),
            Line::from(Span::styled(shortcut.name.as_str(), style)),
        ];
        f.render_widget(
            Paragraph::new(lines).alignment(Alignment::Center).style(style),
            cell,
        );
    }
}

pub fn home_screen(
    terminal: &mut Term,
    dash: &mut Dashboard,
    settings: &Settings,
) -> Result<HomeExit> {
    let mut selected = 0usize;
    let mut notice: Option<String> = None;

    loop {
        let shortcuts = dash.shortcuts.list_shortcuts();
        selected = selected.min(shortcuts.len().saturating_sub(1));
        let wallpaper = wallpaper_summary(&dash.wallpaper.get_wallpaper());
        let is_admin = dash.auth.is_admin();
        let mut cols = 1usize;

        terminal.draw(|f| {
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([
                    Constraint::Length(2),
                    Constraint::Length(1),
                    Constraint::Length(2),
                    Constraint::Min(CELL_H),
                    Constraint::Length(1),
                    Constraint::Length(1),
                ])
                .split(f.area());

            render_header(f, chunks[0]);
            render_separator(f, chunks[1]);

            let wall = Paragraph::new(Span::styled(format!("Wallpaper: {wallpaper}"), dim_style()));
            f.render_widget(wall, pad_horizontal(chunks[2]));

            let grid_area = pad_horizontal(chunks[3]);
            cols = grid_columns(grid_area.width);
            if shortcuts.is_empty() {
                let empty = Paragraph::new("No shortcuts configured.").style(dim_style());
                f.render_widget(empty, grid_area);
            } else {
                draw_grid(f, grid_area, &shortcuts, selected, cols);
            }

            let hint = notice.clone().unwrap_or_else(|| {
                let admin = if is_admin { "  a = admin" } else { "" };
                format!("arrows = move  Enter = open{admin}  l = logout  q = quit")
            });
            f.render_widget(
                Paragraph::new(hint).style(dim_style()),
                pad_horizontal(chunks[4]),
            );
            render_status_bar(f, chunks[5]);
        })?;

        if !event::poll(Duration::from_millis(250))? {
            continue;
        }
        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }
        let len = shortcuts.len();
        let step = move |dir| move_selection(selected, len, cols, dir);
        match key.code {
            KeyCode::Left | KeyCode::Char('h') => selected = step(Move::Left),
            KeyCode::Right => selected = step(Move::Right),
            KeyCode::Up | KeyCode::Char('k') => selected = step(Move::Up),
            KeyCode::Down | KeyCode::Char('j') => selected = step(Move::Down),
            KeyCode::Enter | KeyCode::Char(' ') => {
                notice = shortcuts.get(selected).map(|s| {
                    match open_shortcut(s, settings.browser_command.as_deref()) {
                        Ok(()) => format!("Opened {}.", s.name),
                        Err(err) => {
                            tracing::warn!(error = %err, "shortcut not opened");
                            format!("{err:#}")
                        }
                    }
                });
                continue;
            }
            KeyCode::Char('a') if is_admin => admin_menu(terminal, dash, settings)?,
            KeyCode::Char('l') => return Ok(HomeExit::Logout),
            KeyCode::Char('q') | KeyCode::Esc => return Ok(HomeExit::Quit),
            _ => {}
        }
        notice = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn columns_never_zero() {
        assert_eq!(grid_columns(0), 1);
        assert_eq!(grid_columns(CELL_W * 4 + 5), 4);
    }

    #[test]
    fn selection_moves_within_grid() {
        // 7 items, 3 columns:
        // 0 1 2
        // 3 4 5
        // 6
        assert_eq!(move_selection(0, 7, 3, Move::Left), 0);
        assert_eq!(move_selection(2, 7, 3, Move::Right), 3);
        assert_eq!(move_selection(6, 7, 3, Move::Right), 6);
        assert_eq!(move_selection(4, 7, 3, Move::Up), 1);
        assert_eq!(move_selection(1, 7, 3, Move::Up), 1);
        assert_eq!(move_selection(3, 7, 3, Move::Down), 6);
        assert_eq!(move_selection(4, 7, 3, Move::Down), 4);
        assert_eq!(move_selection(0, 0, 3, Move::Down), 0);
    }

    #[test]
    fn wallpaper_summary_variants() {
        assert_eq!(wallpaper_summary(&WallpaperConfig::default()), "default");
        assert_eq!(
            wallpaper_summary(&WallpaperConfig::stock("https://example.com/a.jpg")),
            "https://example.com/a.jpg"
        );
        let at = Utc.with_ymd_and_hms(2025, 5, 6, 7, 8, 9).unwrap();
        assert_eq!(
            wallpaper_summary(&WallpaperConfig::custom("data:...", at)),
            "custom image, uploaded 2025-05-06 07:08 UTC"
        );
    }
}
