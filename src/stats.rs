use chrono::{DateTime, Local};
use std::time::{Duration, Instant};
use sysinfo::System;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SystemStats {
    pub cpu_usage: f32,
    pub ram_usage: f32,
    pub timestamp: DateTime<Local>,
}

impl Default for SystemStats {
    fn default() -> Self {
        Self {
            cpu_usage: 0.0,
            ram_usage: 0.0,
            timestamp: Local::now(),
        }
    }
}

fn round1(v: f32) -> f32 {
    (v * 10.0).round() / 10.0
}

fn percent(used: u64, total: u64) -> f32 {
    if total == 0 {
        return 0.0;
    }
    (used as f64 / total as f64 * 100.0) as f32
}

/// Polled by the status bar on every redraw; samples at most once per
/// `interval`. CPU usage needs two samples, so the first reading is 0.
pub struct StatsMonitor {
    sys: System,
    interval: Duration,
    last_sample: Option<Instant>,
    current: SystemStats,
}

impl StatsMonitor {
    pub fn new(interval: Duration) -> Self {
        Self {
            sys: System::new(),
            interval,
            last_sample: None,
            current: SystemStats::default(),
        }
    }

    pub fn refresh_if_due(&mut self) -> SystemStats {
        let due = self
            .last_sample
            .map_or(true, |at| at.elapsed() >= self.interval);
        if due {
            self.sample();
        }
        self.current
    }

    fn sample(&mut self) {
        self.sys.refresh_cpu_usage();
        self.sys.refresh_memory();
        self.current = SystemStats {
            cpu_usage: round1(self.sys.global_cpu_usage()),
            ram_usage: round1(percent(self.sys.used_memory(), self.sys.total_memory())),
            timestamp: Local::now(),
        };
        self.last_sample = Some(Instant::now());
    }
}
