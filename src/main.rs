use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::backend::CrosstermBackend;
use std::io::stdout;
use std::rc::Rc;

use homedash::config::{self, Args, Settings};
use homedash::core::{Dashboard, FileStore};
use homedash::logging;

mod admin;
mod auth;
mod home;
mod launcher;
mod status;
mod ui;

use auth::login_screen;
use home::{home_screen, HomeExit};
use ui::Term;

// ── Terminal setup / teardown ─────────────────────────────────────────────────

fn init_terminal() -> Result<Term> {
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    Ok(ratatui::Terminal::new(backend)?)
}

fn restore_terminal(terminal: &mut Term) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

// ── Main application loop ─────────────────────────────────────────────────────

fn run(terminal: &mut Term, dash: &mut Dashboard, settings: &Settings) -> Result<()> {
    // Outer loop: login → home → logout → login again. A restored session
    // skips the login screen.
    loop {
        if !dash.auth.is_authenticated() && !login_screen(terminal, &mut dash.auth)? {
            break;
        }
        status::set_session_label(dash.auth.role().map(|r| r.to_string()));

        match home_screen(terminal, dash, settings)? {
            HomeExit::Logout => {
                dash.auth.logout();
                status::set_session_label(None);
            }
            HomeExit::Quit => break,
        }
    }
    Ok(())
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let args = Args::parse();

    let base = args.base_dir();
    logging::init(&config::log_file(&base))?;
    let settings = Settings::load(&base);
    if !config::settings_file(&base).exists() {
        // First run: leave an editable settings file behind.
        if let Err(err) = settings.save(&base) {
            tracing::warn!(error = %err, "could not write default settings");
        }
    }

    let store = FileStore::open(config::data_dir(&base))
        .with_context(|| format!("opening data directory under {}", base.display()))?;
    tracing::info!(data = %store.dir().display(), "starting");
    let mut dash = Dashboard::open(Rc::new(store));

    ui::set_theme(&settings.theme);
    status::configure(&settings, settings.show_stats && !args.no_stats);

    let mut terminal = init_terminal()?;

    let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        run(&mut terminal, &mut dash, &settings)
    }));

    // Always restore terminal
    restore_terminal(&mut terminal).ok();

    match result {
        Ok(Ok(())) => Ok(()),
        Ok(Err(e)) => {
            tracing::error!(error = %e, "exited with error");
            Err(e)
        }
        Err(_) => {
            tracing::error!("panicked");
            eprintln!("homedash crashed. See {}", config::log_file(&base).display());
            Ok(())
        }
    }
}
