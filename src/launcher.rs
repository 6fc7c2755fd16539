use anyhow::{bail, Context, Result};
use std::process::{Command, Stdio};

use homedash::core::Shortcut;

/// Command line that opens `url` in a new browser context.
pub fn opener_argv(url: &str, browser_command: Option<&[String]>) -> Vec<String> {
    if let Some(cmd) = browser_command.filter(|c| !c.is_empty()) {
        let mut argv = cmd.to_vec();
        argv.push(url.to_string());
        return argv;
    }
    let base: &[&str] = if cfg!(target_os = "windows") {
        &["cmd", "/C", "start", ""]
    } else if cfg!(target_os = "macos") {
        &["open"]
    } else {
        &["xdg-open"]
    };
    base.iter()
        .map(|s| s.to_string())
        .chain(std::iter::once(url.to_string()))
        .collect()
}

/// Spawns the opener detached from the TUI; the browser outlives us.
pub fn open_shortcut(shortcut: &Shortcut, browser_command: Option<&[String]>) -> Result<()> {
    let Some(url) = shortcut.target() else {
        bail!("'{}' is not clickable", shortcut.name);
    };
    let argv = opener_argv(url, browser_command);
    let (program, args) = argv
        .split_first()
        .context("empty opener command")?;
    Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .with_context(|| format!("launching {program}"))?;
    tracing::info!(name = %shortcut.name, url, "opened shortcut");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn override_command_gets_url_appended() {
        let cmd = vec!["firefox".to_string(), "--new-tab".to_string()];
        assert_eq!(
            opener_argv("http://nas:8089", Some(cmd.as_slice())),
            ["firefox", "--new-tab", "http://nas:8089"]
        );
    }

    #[test]
    fn empty_override_uses_platform_opener() {
        let argv = opener_argv("http://nas", Some(&[] as &[String]));
        assert_eq!(argv.last().map(String::as_str), Some("http://nas"));
        assert!(argv.len() >= 2);
    }

    #[test]
    fn sentinel_shortcut_is_refused() {
        let ssh = Shortcut {
            id: "4".into(),
            name: "SSH".into(),
            url: "#".into(),
            icon_id: "Terminal".into(),
        };
        let err = open_shortcut(&ssh, None).unwrap_err();
        assert!(err.to_string().contains("not clickable"));
    }
}
