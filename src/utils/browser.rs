//! Hand a result link to the operating system's default browser

use crate::error::{SearchError, SearchResult};
use std::process::{Command, Stdio};

/// Open `link` with the platform opener
pub fn open_link(link: &str) -> SearchResult<()> {
    let link = link.trim();
    if link.is_empty() {
        return Err(SearchError::InvalidInput(
            "Result has no link to open".to_string(),
        ));
    }

    let mut command = opener_command(link);
    log::debug!("Opening {link} with {command:?}");

    command
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()?;

    Ok(())
}

#[cfg(target_os = "macos")]
fn opener_command(link: &str) -> Command {
    let mut command = Command::new("open");
    command.arg(link);
    command
}

#[cfg(target_os = "windows")]
fn opener_command(link: &str) -> Command {
    let mut command = Command::new("cmd");
    // The empty string is the window title `start` expects before the target
    command.args(["/C", "start", "", link]);
    command
}

#[cfg(not(any(target_os = "macos", target_os = "windows")))]
fn opener_command(link: &str) -> Command {
    let mut command = Command::new("xdg-open");
    command.arg(link);
    command
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_link_is_rejected() {
        assert!(matches!(open_link("   "), Err(SearchError::InvalidInput(_))));
    }

    #[test]
    fn test_opener_receives_link() {
        let command = opener_command("https://example.com");
        let args: Vec<_> = command.get_args().collect();
        assert!(args.iter().any(|a| *a == "https://example.com"));
    }
}
