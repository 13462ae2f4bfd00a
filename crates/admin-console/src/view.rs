//! Form state and table rows for the console.
//!
//! User-supplied text never reaches a rendering surface unsanitised: control
//! characters are replaced so a username cannot smuggle terminal escape
//! sequences into the table.

use std::fmt;

use serde::Serialize;

use crate::api::{CreateUserRequest, Credentials, DEFAULT_ROLE, UpdateUserRequest, User};

/// Payment indicator shown for each user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Badge {
    Premium,
    Free,
}

impl Badge {
    pub fn for_user(user: &User) -> Self {
        if user.has_paid {
            Badge::Premium
        } else {
            Badge::Free
        }
    }
}

impl fmt::Display for Badge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Badge::Premium => f.write_str("Premium"),
            Badge::Free => f.write_str("Free"),
        }
    }
}

/// One rendered table row. Text fields are already sanitised.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserRow {
    pub id: u64,
    pub username: String,
    pub role: String,
    pub badge: Badge,
}

impl From<&User> for UserRow {
    fn from(user: &User) -> Self {
        let role = if user.role.trim().is_empty() {
            DEFAULT_ROLE.to_string()
        } else {
            sanitize(&user.role)
        };

        Self {
            id: user.id,
            username: sanitize(&user.username),
            role,
            badge: Badge::for_user(user),
        }
    }
}

/// Replace control characters with U+FFFD.
pub fn sanitize(text: &str) -> String {
    text.chars()
        .map(|c| if c.is_control() { '\u{FFFD}' } else { c })
        .collect()
}

/// Render rows as an aligned plain-text table.
pub fn render_table(rows: &[UserRow]) -> String {
    let name_width = rows
        .iter()
        .map(|row| row.username.chars().count())
        .max()
        .unwrap_or(0)
        .clamp(8, 32);

    let mut out = format!(
        "{:<6} {:<name_width$} {:<10} STATUS\n",
        "ID", "USERNAME", "ROLE"
    );
    out.push_str(&"-".repeat(6 + name_width + 10 + 10));
    out.push('\n');
    for row in rows {
        out.push_str(&format!(
            "{:<6} {:<name_width$} {:<10} {}\n",
            row.id, row.username, row.role, row.badge
        ));
    }
    out
}

/// Login panel fields.
#[derive(Debug, Clone, Default)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

impl LoginForm {
    pub fn credentials(&self) -> Credentials {
        Credentials::new(self.username.clone(), self.password.clone())
    }
}

/// Registration panel fields.
#[derive(Debug, Clone, Default)]
pub struct RegisterForm {
    pub username: String,
    pub password: String,
}

impl RegisterForm {
    pub fn credentials(&self) -> Credentials {
        Credentials::new(self.username.clone(), self.password.clone())
    }
}

/// Create-user modal fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateUserForm {
    pub username: String,
    pub password: String,
    pub role: String,
    pub has_paid: bool,
}

impl Default for CreateUserForm {
    fn default() -> Self {
        Self {
            username: String::new(),
            password: String::new(),
            role: DEFAULT_ROLE.to_string(),
            has_paid: false,
        }
    }
}

impl CreateUserForm {
    pub fn to_request(&self) -> CreateUserRequest {
        CreateUserRequest {
            username: self.username.clone(),
            password: self.password.clone(),
            role: self.role.clone(),
            has_paid: self.has_paid,
        }
    }
}

/// Edit-user modal fields. A blank password keeps the stored one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditUserForm {
    pub id: u64,
    pub username: String,
    pub password: String,
    pub role: String,
    pub has_paid: bool,
}

impl EditUserForm {
    /// Prefill from an existing user. The password is never shown.
    pub fn for_user(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            password: String::new(),
            role: user.role.clone(),
            has_paid: user.has_paid,
        }
    }

    pub fn to_request(&self) -> UpdateUserRequest {
        UpdateUserRequest {
            username: self.username.clone(),
            password: (!self.password.is_empty()).then(|| self.password.clone()),
            role: self.role.clone(),
            has_paid: self.has_paid,
        }
    }
}
