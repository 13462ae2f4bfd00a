//! Rendering surface for the admin console.
//!
//! [`AdminClient`](crate::AdminClient) never prints or prompts on its own; it
//! drives a [`Console`]. The terminal implementation lives in [`terminal`];
//! tests provide their own recording implementation.

pub mod terminal;

use std::io;
use std::path::{Path, PathBuf};

use crate::view::{CreateUserForm, EditUserForm, UserRow};

pub use terminal::TerminalConsole;

/// Tone of a transient message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Success,
    Error,
}

/// A transient message (toast) shown to the operator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub kind: MessageKind,
    pub text: String,
}

/// Mutually exclusive auth panels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Panel {
    #[default]
    Login,
    Register,
}

/// Overlay forms for the user table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Modal {
    Create,
    Edit,
}

/// Where a successful login lands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Admin,
    Home,
}

impl Route {
    pub fn path(self) -> &'static str {
        match self {
            Route::Admin => "/admin",
            Route::Home => "/home",
        }
    }
}

/// A surface the console renders onto.
pub trait Console {
    /// Show a transient message, replacing any current one.
    fn show_message(&mut self, kind: MessageKind, text: &str);

    /// Blocking notification that must be acknowledged.
    fn alert(&mut self, text: &str);

    /// Ask the operator a yes/no question.
    fn confirm(&mut self, prompt: &str) -> bool;

    /// Navigate to another page.
    fn redirect(&mut self, path: &str);

    /// Replace the user table.
    fn render_users(&mut self, rows: &[UserRow]);

    /// Save downloaded bytes under `file_name`, returning where they went.
    fn download(&mut self, file_name: &str, contents: &[u8]) -> io::Result<PathBuf>;

    fn clear_message(&mut self) {}

    fn show_panel(&mut self, _panel: Panel) {}

    fn set_modal(&mut self, _modal: Modal, _visible: bool) {}
}

/// View state owned by the client: panels, modals, message and pending import.
#[derive(Debug, Clone, Default)]
pub struct ConsoleState {
    pub panel: Panel,
    pub create_modal: Option<CreateUserForm>,
    pub edit_modal: Option<EditUserForm>,
    pub message: Option<Message>,
    pub pending_import: Option<PathBuf>,
}

impl ConsoleState {
    pub fn is_modal_visible(&self, modal: Modal) -> bool {
        match modal {
            Modal::Create => self.create_modal.is_some(),
            Modal::Edit => self.edit_modal.is_some(),
        }
    }

    pub(crate) fn begin_import(&mut self, path: &Path) {
        self.pending_import = Some(path.to_path_buf());
    }

    pub(crate) fn reset_import(&mut self) {
        self.pending_import = None;
    }
}
