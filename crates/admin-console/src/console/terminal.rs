//! Terminal rendering for `adminctl`.

use std::fs;
use std::io::{self, BufRead, IsTerminal, Write};
use std::path::PathBuf;

use super::{Console, MessageKind, Panel};
use crate::view::{UserRow, render_table};

/// Renders onto stdout/stderr and prompts on stdin.
#[derive(Debug, Clone)]
pub struct TerminalConsole {
    /// Answer every confirmation with "yes".
    assume_yes: bool,
    /// Print the user table as JSON instead of text.
    json: bool,
    /// Directory downloads are written to.
    download_dir: PathBuf,
}

impl TerminalConsole {
    pub fn new(download_dir: impl Into<PathBuf>) -> Self {
        Self {
            assume_yes: false,
            json: false,
            download_dir: download_dir.into(),
        }
    }

    pub fn assume_yes(mut self, yes: bool) -> Self {
        self.assume_yes = yes;
        self
    }

    pub fn json(mut self, json: bool) -> Self {
        self.json = json;
        self
    }
}

impl Console for TerminalConsole {
    fn show_message(&mut self, kind: MessageKind, text: &str) {
        match kind {
            MessageKind::Success => println!("{text}"),
            MessageKind::Error => eprintln!("Error: {text}"),
        }
    }

    fn alert(&mut self, text: &str) {
        eprintln!("Error: {text}");
    }

    fn confirm(&mut self, prompt: &str) -> bool {
        if self.assume_yes {
            return true;
        }
        if !io::stdin().is_terminal() {
            eprintln!("{prompt}\nRefusing without confirmation (pass --yes to proceed).");
            return false;
        }

        eprint!("{prompt} [y/N] ");
        let _ = io::stderr().flush();
        let mut answer = String::new();
        if io::stdin().lock().read_line(&mut answer).is_err() {
            return false;
        }
        matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
    }

    fn redirect(&mut self, path: &str) {
        println!("-> {path}");
    }

    fn render_users(&mut self, rows: &[UserRow]) {
        if self.json {
            match serde_json::to_string_pretty(rows) {
                Ok(body) => println!("{body}"),
                Err(e) => eprintln!("Error: {e}"),
            }
        } else if rows.is_empty() {
            println!("No users found.");
        } else {
            print!("{}", render_table(rows));
        }
    }

    fn download(&mut self, file_name: &str, contents: &[u8]) -> io::Result<PathBuf> {
        fs::create_dir_all(&self.download_dir)?;
        let path = self.download_dir.join(file_name);
        fs::write(&path, contents)?;
        println!("Saved {}", path.display());
        Ok(path)
    }

    fn show_panel(&mut self, panel: Panel) {
        if panel == Panel::Login {
            println!("You can now log in.");
        }
    }
}
