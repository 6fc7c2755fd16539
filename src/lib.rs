//! Home dashboard launcher.
//!
//! [`core`] holds the persisted state (accounts, session, shortcuts,
//! wallpaper) behind a pluggable key-value backend. The remaining modules
//! are helpers for a presentation layer: icon lookup, upload checks, system
//! readings, settings and logging.

pub mod config;
pub mod core;
pub mod icons;
pub mod logging;
pub mod stats;
pub mod upload;
