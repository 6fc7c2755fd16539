use anyhow::Result;

use homedash::core::AuthGate;

use crate::ui::{flash_message, input_prompt, password_prompt, run_menu, MenuResult, Term, SEPARATOR};

// ── Login screen ─────────────────────────────────────────────────────────────

/// Returns `true` once the gate is authenticated, `false` if the user chose Exit.
pub fn login_screen(terminal: &mut Term, gate: &mut AuthGate) -> Result<bool> {
    loop {
        let result = run_menu(
            terminal,
            "Login",
            &["Login", SEPARATOR, "Exit"],
            Some("Sign in to open your dashboard."),
        )?;

        match result {
            MenuResult::Selected(s) if s == "Exit" => return Ok(false),
            MenuResult::Selected(s) if s == "Login" => {
                let username = match input_prompt(terminal, "Username:")? {
                    Some(u) if !u.is_empty() => u,
                    Some(_) => {
                        flash_message(terminal, "Username cannot be empty.", 800)?;
                        continue;
                    }
                    None => continue,
                };
                let Some(password) = password_prompt(terminal, "Password:")? else {
                    continue;
                };

                if gate.login(&username, &password) {
                    return Ok(true);
                }
                flash_message(terminal, "Access denied. Invalid credentials.", 1200)?;
            }
            MenuResult::Back | MenuResult::Selected(_) => continue,
        }
    }
}
