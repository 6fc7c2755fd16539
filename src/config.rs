use anyhow::{Context, Result};
use chrono::format::{Item, StrftimeItems};
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::upload::DEFAULT_MAX_UPLOAD_BYTES;

// ── Paths ─────────────────────────────────────────────────────────────────────

pub fn default_base_dir() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("homedash"))
        .or_else(|| {
            std::env::current_exe()
                .ok()
                .and_then(|p| p.parent().map(Path::to_path_buf))
        })
        .unwrap_or_else(|| PathBuf::from("."))
}

pub fn settings_file(base: &Path) -> PathBuf {
    base.join("settings.json")
}

/// Directory holding the persisted store records.
pub fn data_dir(base: &Path) -> PathBuf {
    base.join("data")
}

pub fn log_file(base: &Path) -> PathBuf {
    base.join("homedash.log")
}

// ── JSON helpers ──────────────────────────────────────────────────────────────

pub fn load_json<T: for<'de> Deserialize<'de> + Default>(path: &Path) -> T {
    std::fs::read_to_string(path)
        .ok()
        .and_then(|s| serde_json::from_str(&s).ok())
        .unwrap_or_default()
}

pub fn save_json<T: Serialize>(path: &Path, data: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating {}", parent.display()))?;
    }
    let json = serde_json::to_string_pretty(data)?;
    std::fs::write(path, json).with_context(|| format!("writing {}", path.display()))
}

// ── Settings ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Settings {
    #[serde(default = "default_theme")]
    pub theme: String,
    #[serde(default = "default_clock_format")]
    pub clock_format: String,
    #[serde(default = "default_date_format")]
    pub date_format: String,
    #[serde(default = "default_show_stats")]
    pub show_stats: bool,
    #[serde(default = "default_stats_refresh_ms")]
    pub stats_refresh_ms: u64,
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: u64,
    /// Overrides the platform opener, e.g. `["firefox", "--new-tab"]`.
    #[serde(default)]
    pub browser_command: Option<Vec<String>>,
}

fn default_theme() -> String {
    "Green (Default)".to_string()
}

fn default_clock_format() -> String {
    "%H:%M".to_string()
}

fn default_date_format() -> String {
    "%b %-d, %Y".to_string()
}

const fn default_show_stats() -> bool {
    true
}

const fn default_stats_refresh_ms() -> u64 {
    2000
}

const fn default_max_upload_bytes() -> u64 {
    DEFAULT_MAX_UPLOAD_BYTES
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            theme: default_theme(),
            clock_format: default_clock_format(),
            date_format: default_date_format(),
            show_stats: default_show_stats(),
            stats_refresh_ms: default_stats_refresh_ms(),
            max_upload_bytes: default_max_upload_bytes(),
            browser_command: None,
        }
    }
}

impl Settings {
    /// Missing or unreadable settings fall back to defaults, as does any
    /// clock or date format chrono cannot render.
    pub fn load(base: &Path) -> Self {
        load_json::<Self>(&settings_file(base)).validated()
    }

    fn validated(mut self) -> Self {
        if !is_valid_time_format(&self.clock_format) {
            tracing::warn!(format = %self.clock_format, "invalid clock_format, using default");
            self.clock_format = default_clock_format();
        }
        if !is_valid_time_format(&self.date_format) {
            tracing::warn!(format = %self.date_format, "invalid date_format, using default");
            self.date_format = default_date_format();
        }
        self
    }

    pub fn save(&self, base: &Path) -> Result<()> {
        save_json(&settings_file(base), self)
    }
}

/// True when every specifier in `fmt` is one chrono can render.
pub fn is_valid_time_format(fmt: &str) -> bool {
    StrftimeItems::new(fmt).all(|item| !matches!(item, Item::Error))
}

// ── Command line ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Parser)]
#[command(name = "homedash")]
#[command(version, about = "Home dashboard launcher for the terminal")]
pub struct Args {
    /// Directory for settings, records and the log file
    #[arg(long, value_name = "PATH")]
    pub data_dir: Option<PathBuf>,

    /// Hide CPU/RAM readings in the status bar
    #[arg(long)]
    pub no_stats: bool,
}

impl Args {
    pub fn base_dir(&self) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(default_base_dir)
    }
}
