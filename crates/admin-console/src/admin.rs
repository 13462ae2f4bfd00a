//! The console's request/render loop.
//!
//! Every operation is one request followed by rendering onto the
//! [`Console`]. Failures are handled here and shown to the operator; the
//! return values only tell the caller whether the operation went through.

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::Utc;
use tracing::{debug, error, info, warn};

use crate::api::{ADMIN_ROLE, ApiClient, ApiError, ImportRequest, ImportResponse, User};
use crate::console::{Console, ConsoleState, Message, MessageKind, Modal, Panel, Route};
use crate::transfer::{self, backup_file_name, import_prompt};
use crate::view::{CreateUserForm, EditUserForm, LoginForm, RegisterForm, UserRow};

/// Shown whenever the backend cannot be reached.
pub const CONNECTION_FAILED: &str = "Server connection failed";

/// Username that always lands on the admin page.
const ADMIN_USERNAME: &str = "admin";

/// Pauses between a success message and the view change that follows it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timings {
    pub redirect_delay: Duration,
    pub panel_switch_delay: Duration,
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            redirect_delay: Duration::from_millis(1000),
            panel_switch_delay: Duration::from_millis(1500),
        }
    }
}

impl Timings {
    pub fn immediate() -> Self {
        Self {
            redirect_delay: Duration::ZERO,
            panel_switch_delay: Duration::ZERO,
        }
    }
}

/// Admin console bound to one backend and one rendering surface.
pub struct AdminClient<C> {
    api: ApiClient,
    console: C,
    state: ConsoleState,
    users: Vec<User>,
    timings: Timings,
}

impl<C: Console> AdminClient<C> {
    pub fn new(api: ApiClient, console: C) -> Self {
        Self {
            api,
            console,
            state: ConsoleState::default(),
            users: Vec::new(),
            timings: Timings::default(),
        }
    }

    pub fn with_timings(mut self, timings: Timings) -> Self {
        self.timings = timings;
        self
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    pub fn console(&self) -> &C {
        &self.console
    }

    pub fn console_mut(&mut self) -> &mut C {
        &mut self.console
    }

    pub fn state(&self) -> &ConsoleState {
        &self.state
    }

    /// Users from the last successful load.
    pub fn users(&self) -> &[User] {
        &self.users
    }

    pub fn find_user(&self, id: u64) -> Option<&User> {
        self.users.iter().find(|user| user.id == id)
    }

    // PANELS

    pub fn show_login(&mut self) {
        self.switch_panel(Panel::Login);
    }

    pub fn show_register(&mut self) {
        self.switch_panel(Panel::Register);
    }

    fn switch_panel(&mut self, panel: Panel) {
        self.state.panel = panel;
        self.clear_message();
        self.console.show_panel(panel);
    }

    fn show_message(&mut self, kind: MessageKind, text: impl Into<String>) {
        let text = text.into();
        self.console.show_message(kind, &text);
        self.state.message = Some(Message { kind, text });
    }

    fn clear_message(&mut self) {
        self.state.message = None;
        self.console.clear_message();
    }

    // AUTH

    /// Submit the login form. Returns the page the operator was sent to.
    pub async fn login(&mut self, form: &LoginForm) -> Option<Route> {
        let response = match self.api.login(&form.credentials()).await {
            Ok(response) => response,
            Err(err) => {
                warn!("login request failed: {}", err);
                self.show_message(MessageKind::Error, CONNECTION_FAILED);
                return None;
            }
        };

        if !response.success {
            self.show_message(MessageKind::Error, response.message);
            return None;
        }

        self.show_message(MessageKind::Success, response.message.clone());
        tokio::time::sleep(self.timings.redirect_delay).await;

        let route = if response.role.as_deref() == Some(ADMIN_ROLE) || form.username == ADMIN_USERNAME
        {
            Route::Admin
        } else {
            Route::Home
        };
        info!("logged in as {}, redirecting to {}", form.username, route.path());
        self.console.redirect(route.path());
        Some(route)
    }

    /// Submit the registration form. On success the login panel follows.
    pub async fn register(&mut self, form: &RegisterForm) -> bool {
        let response = match self.api.register(&form.credentials()).await {
            Ok(response) => response,
            Err(err) => {
                warn!("register request failed: {}", err);
                self.show_message(MessageKind::Error, CONNECTION_FAILED);
                return false;
            }
        };

        if !response.success {
            self.show_message(MessageKind::Error, response.message);
            return false;
        }

        info!("registered {}", form.username);
        self.show_message(MessageKind::Success, response.message);
        tokio::time::sleep(self.timings.panel_switch_delay).await;
        self.show_login();
        true
    }

    // USER TABLE

    /// Fetch and render the user table. Failures are only logged.
    pub async fn load_users(&mut self) -> bool {
        match self.api.list_users().await {
            Ok(users) => {
                debug!("loaded {} users", users.len());
                let rows: Vec<UserRow> = users.iter().map(UserRow::from).collect();
                self.console.render_users(&rows);
                self.users = users;
                true
            }
            Err(err) => {
                error!("Failed to load users: {}", err);
                false
            }
        }
    }

    /// Show the create modal with a fresh form.
    pub fn open_create_modal(&mut self) -> &mut CreateUserForm {
        self.console.set_modal(Modal::Create, true);
        self.state.create_modal.insert(CreateUserForm::default())
    }

    pub fn close_create_modal(&mut self) {
        self.state.create_modal = None;
        self.console.set_modal(Modal::Create, false);
    }

    /// Create a user. Server rejections are shown in a blocking alert.
    pub async fn create_user(&mut self, form: &CreateUserForm) -> bool {
        match self.api.create_user(&form.to_request()).await {
            Ok(()) => {
                info!("created user {}", form.username);
                self.close_create_modal();
                self.load_users().await;
                self.show_message(MessageKind::Success, "User created successfully");
                true
            }
            Err(err @ ApiError::Server { .. }) => {
                warn!("create user rejected: {}", err);
                let text = err.server_message().unwrap_or("Error creating user");
                self.console.alert(text);
                false
            }
            Err(err) => {
                warn!("create user request failed: {}", err);
                self.console.alert("Failed to create user");
                false
            }
        }
    }

    /// Show the edit modal prefilled from `user`.
    pub fn open_edit(&mut self, user: &User) -> &mut EditUserForm {
        self.console.set_modal(Modal::Edit, true);
        self.state.edit_modal.insert(EditUserForm::for_user(user))
    }

    pub fn close_edit_modal(&mut self) {
        self.state.edit_modal = None;
        self.console.set_modal(Modal::Edit, false);
    }

    /// Save an edit. The modal closes and the table reloads whatever the
    /// outcome; a failure is then reported as an error message.
    pub async fn edit_user(&mut self, form: &EditUserForm) -> bool {
        let result = self.api.update_user(form.id, &form.to_request()).await;

        self.close_edit_modal();
        self.load_users().await;

        match result {
            Ok(()) => {
                info!("updated user {}", form.id);
                true
            }
            Err(err) => {
                warn!("update of user {} failed: {}", form.id, err);
                let text = failure_text(&err, "Failed to update user");
                self.show_message(MessageKind::Error, text);
                false
            }
        }
    }

    /// Delete a user after confirmation. Declining sends nothing.
    pub async fn delete_user(&mut self, id: u64) -> bool {
        if !self
            .console
            .confirm("Are you sure you want to delete this user?")
        {
            debug!("delete of user {} cancelled", id);
            return false;
        }

        let result = self.api.delete_user(id).await;
        if let Err(ref err) = result {
            warn!("delete of user {} failed: {}", id, err);
            let text = failure_text(err, "Failed to delete user");
            self.show_message(MessageKind::Error, text);
        } else {
            info!("deleted user {}", id);
        }

        self.load_users().await;
        result.is_ok()
    }

    // EXPORT / IMPORT

    /// Download the backend's backup as `users_backup_<date>.json`.
    pub async fn export_users(&mut self) -> Option<PathBuf> {
        let contents = match self.api.export_users().await {
            Ok(contents) => contents,
            Err(err) => {
                error!("export failed: {}", err);
                self.show_message(MessageKind::Error, "Failed to export users");
                return None;
            }
        };

        let file_name = backup_file_name(Utc::now().date_naive());
        match self.console.download(&file_name, &contents) {
            Ok(path) => {
                info!("exported {} bytes to {}", contents.len(), path.display());
                self.show_message(MessageKind::Success, "Users exported successfully!");
                Some(path)
            }
            Err(err) => {
                error!("saving {} failed: {}", file_name, err);
                self.show_message(MessageKind::Error, "Failed to export users");
                None
            }
        }
    }

    /// Validate `path`, confirm, and post its users for merging.
    ///
    /// Nothing is sent unless the file is valid and the operator confirms.
    /// The pending import is cleared on every exit path.
    pub async fn import_users(&mut self, path: &Path) -> Option<ImportResponse> {
        self.state.begin_import(path);
        let outcome = self.run_import(path).await;
        self.state.reset_import();
        outcome
    }

    async fn run_import(&mut self, path: &Path) -> Option<ImportResponse> {
        if let Err(err) = transfer::check_file_name(path) {
            self.show_message(MessageKind::Error, err.to_string());
            return None;
        }

        let users = match transfer::read_import_file(path).await {
            Ok(users) => users,
            Err(err) => {
                error!("rejected import file {}: {}", path.display(), err);
                self.show_message(MessageKind::Error, format!("Import failed: {err}"));
                return None;
            }
        };

        if !self.console.confirm(&import_prompt(users.len())) {
            debug!("import of {} cancelled", path.display());
            return None;
        }

        let response = match self.api.import_users(&ImportRequest { users }).await {
            Ok(response) => response,
            Err(err) => {
                error!("import request failed: {}", err);
                let reason = failure_text(&err, &err.to_string());
                self.show_message(MessageKind::Error, format!("Import failed: {reason}"));
                return None;
            }
        };

        if !response.success {
            let text = response
                .message
                .as_deref()
                .filter(|m| !m.is_empty())
                .unwrap_or("Import failed")
                .to_string();
            self.show_message(MessageKind::Error, text);
            return None;
        }

        info!(
            "import added {} and skipped {} users",
            response.added, response.skipped
        );
        self.show_message(
            MessageKind::Success,
            format!(
                "Import successful! Added {} new user(s), skipped {} existing user(s).",
                response.added, response.skipped
            ),
        );
        self.load_users().await;
        Some(response)
    }

    pub fn into_console(self) -> C {
        self.console
    }
}

/// The backend's message when it gave one, otherwise a generic description.
fn failure_text(err: &ApiError, fallback: &str) -> String {
    if let Some(message) = err.server_message() {
        message.to_string()
    } else if err.is_connection() {
        CONNECTION_FAILED.to_string()
    } else {
        fallback.to_string()
    }
}
