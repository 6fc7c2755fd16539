use chrono::{DateTime, Local};
use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};
use std::fmt::Write;
use std::sync::{Mutex, OnceLock};
use std::time::Duration;

use homedash::config::Settings;
use homedash::stats::{StatsMonitor, SystemStats};

use crate::ui::sel_style;

// ── Shared status state ───────────────────────────────────────────────────────

struct StatusConfig {
    clock_format: String,
    date_format: String,
}

static CONFIG: OnceLock<StatusConfig> = OnceLock::new();
static MONITOR: Mutex<Option<StatsMonitor>> = Mutex::new(None);
static SESSION_LABEL: Mutex<Option<String>> = Mutex::new(None);

pub fn configure(settings: &Settings, show_stats: bool) {
    let config = StatusConfig {
        clock_format: settings.clock_format.clone(),
        date_format: settings.date_format.clone(),
    };
    if CONFIG.set(config).is_err() {
        tracing::debug!("status bar already configured, ignoring");
    }
    if show_stats {
        if let Ok(mut guard) = MONITOR.lock() {
            *guard = Some(StatsMonitor::new(Duration::from_millis(
                settings.stats_refresh_ms,
            )));
        }
    }
}

pub fn set_session_label(label: Option<String>) {
    if let Ok(mut guard) = SESSION_LABEL.lock() {
        *guard = label;
    }
}

fn current_stats() -> Option<SystemStats> {
    let mut guard = MONITOR.lock().ok()?;
    guard.as_mut().map(StatsMonitor::refresh_if_due)
}

// ── Formatting ────────────────────────────────────────────────────────────────

fn stats_text(stats: Option<SystemStats>) -> String {
    stats
        .map(|s| format!(" CPU {:.1}%  RAM {:.1}%", s.cpu_usage, s.ram_usage))
        .unwrap_or_default()
}

const DEFAULT_CLOCK: (&str, &str) = ("%H:%M", "%b %-d, %Y");

/// Renders with the built-in formats when either configured one is
/// rejected by chrono.
fn clock_text(now: DateTime<Local>, clock_format: &str, date_format: &str) -> String {
    let mut out = String::new();
    if write!(out, "{}  {}", now.format(clock_format), now.format(date_format)).is_ok() {
        return out;
    }
    let (clock_format, date_format) = DEFAULT_CLOCK;
    format!("{}  {}", now.format(clock_format), now.format(date_format))
}

/// Lays out `left`, `center` and `right` across `width` columns. The clock
/// stays centred while it fits; otherwise segments are packed left to right.
fn compose(left: &str, center: &str, right: &str, width: usize) -> String {
    let (lw, cw, rw) = (
        left.chars().count(),
        center.chars().count(),
        right.chars().count(),
    );
    let center_start = width.saturating_sub(cw) / 2;
    if lw < center_start && center_start + cw + rw <= width {
        let mid_pad = center_start - lw;
        let right_pad = width - center_start - cw - rw;
        format!(
            "{left}{}{center}{}{right}",
            " ".repeat(mid_pad),
            " ".repeat(right_pad)
        )
    } else {
        let packed = format!("{left} {center} {right}");
        let pad = width.saturating_sub(packed.chars().count());
        format!("{packed}{}", " ".repeat(pad))
    }
}

// ── Status bar ────────────────────────────────────────────────────────────────

pub fn render_status_bar(f: &mut Frame, area: Rect) {
    if area.height == 0 {
        return;
    }

    let (clock_format, date_format) = CONFIG
        .get()
        .map(|c| (c.clock_format.as_str(), c.date_format.as_str()))
        .unwrap_or(DEFAULT_CLOCK);
    let clock = clock_text(Local::now(), clock_format, date_format);
    let stats = stats_text(current_stats());
    let session = SESSION_LABEL
        .lock()
        .ok()
        .and_then(|g| g.clone())
        .map(|l| format!("[{l}] "))
        .unwrap_or_default();

    let text = compose(&stats, &clock, &session, area.width as usize);
    let line = Line::from(Span::styled(text, sel_style()));
    f.render_widget(Paragraph::new(line), area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn clock_uses_configured_formats() {
        let at = Local.with_ymd_and_hms(2024, 7, 4, 9, 5, 0).unwrap();
        assert_eq!(clock_text(at, "%H:%M", "%b %-d, %Y"), "09:05  Jul 4, 2024");
    }

    #[test]
    fn unsupported_specifier_renders_default_clock() {
        let at = Local.with_ymd_and_hms(2024, 7, 4, 9, 5, 0).unwrap();
        assert_eq!(clock_text(at, "%Q", "%b %-d, %Y"), "09:05  Jul 4, 2024");
        assert_eq!(clock_text(at, "%H:%M", "%Y-%"), "09:05  Jul 4, 2024");
    }

    #[test]
    fn compose_centres_clock() {
        let line = compose("ab", "XY", "z", 10);
        assert_eq!(line, "ab  XY   z");
        assert_eq!(line.chars().count(), 10);
    }

    #[test]
    fn compose_packs_when_narrow() {
        assert_eq!(compose("left", "clock", "r", 8), "left clock r");
    }

    #[test]
    fn stats_text_is_blank_when_disabled() {
        assert_eq!(stats_text(None), "");
    }
}
