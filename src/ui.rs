//! Collaborator seams between the session core and a frontend.
//!
//! The core is display-agnostic: rendering happens by consuming
//! [`crate::event::SessionEvent`], and the only call back into the frontend
//! is the modal password prompt needed mid-submit by the sudo flow.

use std::io::{BufRead, Write};
use std::path::Path;

/// Modal password entry. A GUI shows a masked input dialog; `None` means the
/// user cancelled.
pub trait PasswordPrompt {
    fn prompt_password(&mut self, title: &str) -> Option<String>;
}

/// Prompt that always cancels, for non-interactive frontends.
pub struct NoPrompt;

impl PasswordPrompt for NoPrompt {
    fn prompt_password(&mut self, _title: &str) -> Option<String> {
        None
    }
}

/// Reads the password as a plain line from standard input. Entry is not
/// masked; a real frontend replaces this with a masked dialog.
pub struct StdioPrompt;

impl PasswordPrompt for StdioPrompt {
    fn prompt_password(&mut self, title: &str) -> Option<String> {
        print!("{title} ");
        if std::io::stdout().flush().is_err() {
            return None;
        }
        let mut line = String::new();
        match std::io::stdin().lock().read_line(&mut line) {
            Ok(0) | Err(_) => None,
            Ok(_) => Some(line.trim_end_matches(['\r', '\n']).to_string()),
        }
    }
}

/// Abbreviates the user's home directory as `~` for display.
pub fn display_path(path: &Path) -> String {
    let display = path.display().to_string();
    if let Ok(home) = std::env::var("HOME")
        && let Some(rest) = display.strip_prefix(&home)
    {
        return format!("~{rest}");
    }
    display
}
