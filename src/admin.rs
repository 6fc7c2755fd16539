use anyhow::Result;
use std::path::Path;

use homedash::config::Settings;
use homedash::core::{
    Dashboard, NewShortcut, Role, Shortcut, ShortcutUpdate, Upsert, UserSummary,
};
use homedash::icons::{self, Icon};
use homedash::upload::load_wallpaper_file;

use crate::home::wallpaper_summary;
use crate::ui::{
    confirm, flash_message, input_prompt, password_prompt, run_menu, MenuResult, Term, SEPARATOR,
};

const BACK: &str = "Back";

// ── Labels ────────────────────────────────────────────────────────────────────

fn shortcut_label(pos: usize, shortcut: &Shortcut) -> String {
    let target = shortcut.target().unwrap_or("(not clickable)");
    let icon = Icon::resolve(&shortcut.icon_id);
    format!("{}. {} {} - {}", pos + 1, icon.glyph(), shortcut.name, target)
}

fn user_label(pos: usize, user: &UserSummary) -> String {
    format!("{}. {} ({})", pos + 1, user.username, user.role)
}

/// Position of `selected` among `labels`; labels are numbered so they are unique.
fn position_of(labels: &[String], selected: &str) -> Option<usize> {
    labels.iter().position(|l| l == selected)
}

fn with_trailer<'a>(labels: &'a [String], trailer: &[&'a str]) -> Vec<&'a str> {
    labels
        .iter()
        .map(String::as_str)
        .chain(trailer.iter().copied())
        .collect()
}

/// Prompt for a field the panel refuses to leave empty. `None` = cancelled.
fn required_input(terminal: &mut Term, prompt: &str, field: &str) -> Result<Option<String>> {
    match input_prompt(terminal, prompt)? {
        Some(v) if !v.is_empty() => Ok(Some(v)),
        Some(_) => {
            flash_message(terminal, &format!("Error: {field} cannot be empty."), 900)?;
            Ok(None)
        }
        None => Ok(None),
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

pub fn admin_menu(terminal: &mut Term, dash: &mut Dashboard, settings: &Settings) -> Result<()> {
    if let Err(denied) = dash.auth.require_admin() {
        return flash_message(terminal, &format!("Access denied: {denied}."), 1000);
    }
    loop {
        let result = run_menu(
            terminal,
            "Admin Settings",
            &["Shortcuts", "Users", "Wallpaper", SEPARATOR, BACK],
            None,
        )?;
        match result {
            MenuResult::Back => break,
            MenuResult::Selected(s) => match s.as_str() {
                "Shortcuts" => shortcuts_tab(terminal, dash)?,
                "Users" => users_tab(terminal, dash)?,
                "Wallpaper" => wallpaper_tab(terminal, dash, settings)?,
                _ => break,
            },
        }
    }
    Ok(())
}

// ── Shortcuts tab ─────────────────────────────────────────────────────────────

fn shortcuts_tab(terminal: &mut Term, dash: &mut Dashboard) -> Result<()> {
    loop {
        let shortcuts = dash.shortcuts.list_shortcuts();
        let labels: Vec<String> = shortcuts
            .iter()
            .enumerate()
            .map(|(i, s)| shortcut_label(i, s))
            .collect();
        let choices = with_trailer(&labels, &[SEPARATOR, "Add Shortcut", BACK]);
        let MenuResult::Selected(sel) = run_menu(terminal, "Shortcuts", &choices, None)? else {
            break;
        };
        match sel.as_str() {
            BACK => break,
            "Add Shortcut" => add_shortcut_dialog(terminal, dash)?,
            other => {
                if let Some(shortcut) = position_of(&labels, other).and_then(|i| shortcuts.get(i)) {
                    edit_shortcut_dialog(terminal, dash, shortcut)?;
                }
            }
        }
    }
    Ok(())
}

fn add_shortcut_dialog(terminal: &mut Term, dash: &mut Dashboard) -> Result<()> {
    let Some(name) = required_input(terminal, "Shortcut name:", "Name")? else {
        return Ok(());
    };
    let Some(url) = required_input(
        terminal,
        &format!("Target URL for '{name}' (# = not clickable):"),
        "URL",
    )?
    else {
        return Ok(());
    };
    let Some(icon_id) = icon_picker(terminal, None)? else {
        return Ok(());
    };
    let created = dash
        .shortcuts
        .add_shortcut(NewShortcut::new(name, url, icon_id));
    flash_message(terminal, &format!("'{}' added.", created.name), 800)
}

fn edit_shortcut_dialog(terminal: &mut Term, dash: &mut Dashboard, shortcut: &Shortcut) -> Result<()> {
    let subtitle = format!("{} - {} [{}]", shortcut.name, shortcut.url, shortcut.icon_id);
    let result = run_menu(
        terminal,
        "Edit Shortcut",
        &["Rename", "Change URL", "Change Icon", "Delete", SEPARATOR, BACK],
        Some(&subtitle),
    )?;
    let MenuResult::Selected(action) = result else {
        return Ok(());
    };
    let update = match action.as_str() {
        "Rename" => required_input(terminal, "New name:", "Name")?
            .map(|v| ShortcutUpdate::default().name(v)),
        "Change URL" => required_input(terminal, "New URL (# = not clickable):", "URL")?
            .map(|v| ShortcutUpdate::default().url(v)),
        "Change Icon" => icon_picker(terminal, Some(&shortcut.icon_id))?
            .map(|v| ShortcutUpdate::default().icon_id(v)),
        "Delete" => {
            if confirm(terminal, &format!("Delete shortcut '{}'?", shortcut.name))? {
                let message = if dash.shortcuts.remove_shortcut(&shortcut.id) {
                    format!("'{}' deleted.", shortcut.name)
                } else {
                    "Error: shortcut no longer exists.".to_string()
                };
                flash_message(terminal, &message, 800)?;
            }
            return Ok(());
        }
        _ => return Ok(()),
    };
    if let Some(update) = update {
        let message = if dash.shortcuts.update_shortcut(&shortcut.id, update) {
            "Shortcut updated."
        } else {
            "Error: shortcut no longer exists."
        };
        flash_message(terminal, message, 800)?;
    }
    Ok(())
}

fn icon_label(icon: icons::IconId, current: Option<&str>) -> String {
    let marker = if Some(icon.name()) == current { " *" } else { "" };
    format!("{} {}{marker}", icon.glyph(), icon.name())
}

/// Search-then-pick. Returns the chosen icon identifier.
fn icon_picker(terminal: &mut Term, current: Option<&str>) -> Result<Option<String>> {
    let Some(query) = input_prompt(terminal, "Search icons (Enter for all):")? else {
        return Ok(None);
    };
    let matches = icons::search(&query);
    if matches.is_empty() {
        flash_message(terminal, &format!("No icon matches '{query}'."), 900)?;
        return Ok(None);
    }
    let labels: Vec<String> = matches.iter().map(|&i| icon_label(i, current)).collect();
    let choices = with_trailer(&labels, &[SEPARATOR, BACK]);
    match run_menu(terminal, "Select Icon", &choices, None)? {
        MenuResult::Selected(sel) => Ok(position_of(&labels, &sel)
            .and_then(|i| matches.get(i))
            .map(|icon| icon.name().to_string())),
        MenuResult::Back => Ok(None),
    }
}

// ── Users tab ─────────────────────────────────────────────────────────────────

fn users_tab(terminal: &mut Term, dash: &mut Dashboard) -> Result<()> {
    loop {
        let users = dash.auth.credentials().list_users();
        let labels: Vec<String> = users
            .iter()
            .enumerate()
            .map(|(i, u)| user_label(i, u))
            .collect();
        let choices = with_trailer(&labels, &[SEPARATOR, "Add / Update User", BACK]);
        let MenuResult::Selected(sel) = run_menu(terminal, "Users", &choices, None)? else {
            break;
        };
        match sel.as_str() {
            BACK => break,
            "Add / Update User" => upsert_user_dialog(terminal, dash, None)?,
            other => {
                if let Some(user) = position_of(&labels, other).and_then(|i| users.get(i)) {
                    edit_user_dialog(terminal, dash, user)?;
                }
            }
        }
    }
    Ok(())
}

fn pick_role(terminal: &mut Term, current: Option<Role>) -> Result<Option<Role>> {
    let labels: Vec<String> = Role::ALL
        .iter()
        .map(|r| {
            if Some(*r) == current {
                format!("{r} *")
            } else {
                r.to_string()
            }
        })
        .collect();
    let choices = with_trailer(&labels, &[SEPARATOR, BACK]);
    match run_menu(terminal, "Select Role", &choices, None)? {
        MenuResult::Selected(sel) => Ok(position_of(&labels, &sel).and_then(|i| Role::ALL.get(i).copied())),
        MenuResult::Back => Ok(None),
    }
}

/// `existing` pins the username and current role when editing from the list.
fn upsert_user_dialog(
    terminal: &mut Term,
    dash: &mut Dashboard,
    existing: Option<&UserSummary>,
) -> Result<()> {
    let username = match existing {
        Some(user) => user.username.clone(),
        None => match required_input(terminal, "Username:", "Username")? {
            Some(u) => u,
            None => return Ok(()),
        },
    };
    let password = match password_prompt(terminal, &format!("Password for '{username}':"))? {
        Some(p) if !p.is_empty() => p,
        Some(_) => {
            return flash_message(terminal, "Error: Password cannot be empty.", 900);
        }
        None => return Ok(()),
    };
    let Some(role) = pick_role(terminal, existing.map(|u| u.role))? else {
        return Ok(());
    };
    let message = match dash
        .auth
        .credentials_mut()
        .upsert_user(&username, &password, role)
    {
        Upsert::Created => format!("User '{username}' created."),
        Upsert::Updated => format!("User '{username}' updated."),
    };
    flash_message(terminal, &message, 800)
}

fn edit_user_dialog(terminal: &mut Term, dash: &mut Dashboard, user: &UserSummary) -> Result<()> {
    let subtitle = format!("{} ({})", user.username, user.role);
    let result = run_menu(
        terminal,
        "Edit User",
        &["Change Password / Role", "Remove", SEPARATOR, BACK],
        Some(&subtitle),
    )?;
    match result {
        MenuResult::Selected(s) if s == "Change Password / Role" => {
            upsert_user_dialog(terminal, dash, Some(user))
        }
        MenuResult::Selected(s) if s == "Remove" => {
            if !confirm(terminal, &format!("Remove user '{}'?", user.username))? {
                return Ok(());
            }
            let message = if dash.auth.credentials_mut().remove_user(&user.username) {
                format!("User '{}' removed.", user.username)
            } else {
                "Error: user no longer exists.".to_string()
            };
            flash_message(terminal, &message, 800)
        }
        _ => Ok(()),
    }
}

// ── Wallpaper tab ─────────────────────────────────────────────────────────────

fn wallpaper_tab(terminal: &mut Term, dash: &mut Dashboard, settings: &Settings) -> Result<()> {
    loop {
        let subtitle = format!(
            "Current wallpaper: {}",
            wallpaper_summary(&dash.wallpaper.get_wallpaper())
        );
        let result = run_menu(
            terminal,
            "Wallpaper",
            &["Upload Image File", "Set Image URL", "Reset to Default", SEPARATOR, BACK],
            Some(&subtitle),
        )?;
        let MenuResult::Selected(sel) = result else {
            break;
        };
        match sel.as_str() {
            "Upload Image File" => {
                let Some(path) = required_input(terminal, "Path to image file:", "Path")? else {
                    continue;
                };
                let message = match load_wallpaper_file(Path::new(&path), settings.max_upload_bytes) {
                    Ok(data_url) => {
                        dash.wallpaper.set_custom_wallpaper(data_url);
                        "Wallpaper updated.".to_string()
                    }
                    Err(err) => format!("Error: {err}."),
                };
                flash_message(terminal, &message, 1000)?;
            }
            "Set Image URL" => {
                if let Some(url) = required_input(terminal, "Image URL:", "URL")? {
                    dash.wallpaper.set_default_wallpaper(url);
                    flash_message(terminal, "Wallpaper updated.", 800)?;
                }
            }
            "Reset to Default" => {
                dash.wallpaper.clear_custom_wallpaper();
                flash_message(terminal, "Wallpaper reset.", 800)?;
            }
            _ => break,
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use homedash::icons::IconId;

    fn shortcut(name: &str, url: &str, icon: &str) -> Shortcut {
        Shortcut {
            id: "1".into(),
            name: name.into(),
            url: url.into(),
            icon_id: icon.into(),
        }
    }

    #[test]
    fn shortcut_labels_are_numbered_and_mark_sentinels() {
        assert_eq!(
            shortcut_label(0, &shortcut("Jellyfin", "http://nas:8089", "Play")),
            "1. ▶ Jellyfin - http://nas:8089"
        );
        assert_eq!(
            shortcut_label(3, &shortcut("SSH", "#", "Unknown")),
            "4. ■ SSH - (not clickable)"
        );
    }

    #[test]
    fn duplicate_names_stay_distinguishable() {
        let a = shortcut("Same", "http://a", "Globe");
        let b = shortcut("Same", "http://a", "Globe");
        let labels = vec![shortcut_label(0, &a), shortcut_label(1, &b)];
        assert_eq!(position_of(&labels, &labels[1]), Some(1));
        assert_eq!(position_of(&labels, "Add Shortcut"), None);
    }

    #[test]
    fn user_label_shows_role() {
        let user = UserSummary {
            username: "admin".into(),
            role: Role::Admin,
        };
        assert_eq!(user_label(0, &user), "1. admin (admin)");
    }

    #[test]
    fn icon_label_marks_current() {
        assert_eq!(icon_label(IconId::Cloud, Some("Cloud")), "☁ Cloud *");
        assert_eq!(icon_label(IconId::Cloud, None), "☁ Cloud");
    }
}
