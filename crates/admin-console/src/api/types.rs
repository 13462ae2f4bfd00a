//! Wire types for the user-management API.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Role assigned by the backend when none is given.
pub const DEFAULT_ROLE: &str = "user";

/// Role that grants access to the admin page.
pub const ADMIN_ROLE: &str = "admin";

fn default_role() -> String {
    DEFAULT_ROLE.to_string()
}

/// Records imported without a role may come back with `null`.
fn lenient_role<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(role)) if !role.is_empty() => role,
        _ => default_role(),
    })
}

/// Paid flag as stored by the backend: a bool, 0/1, or missing/`null`.
fn lenient_flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Bool(flag)) => flag,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|n| n != 0.0),
        Some(Value::String(s)) => !s.is_empty(),
        _ => false,
    })
}

/// A user as listed by the backend.
///
/// The backend may include the stored password in list responses; it is
/// never deserialized here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: u64,
    pub username: String,
    #[serde(default = "default_role", deserialize_with = "lenient_role")]
    pub role: String,
    #[serde(default, deserialize_with = "lenient_flag")]
    pub has_paid: bool,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role == ADMIN_ROLE
    }
}

/// Body for `/login` and `/register`.
#[derive(Debug, Clone, Serialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

/// Response from `/login` and `/register`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub role: Option<String>,
}

/// Body for `POST /users`.
#[derive(Debug, Clone, Serialize)]
pub struct CreateUserRequest {
    pub username: String,
    pub password: String,
    pub role: String,
    pub has_paid: bool,
}

/// Body for `PUT /users/{id}`. A missing password keeps the stored one.
#[derive(Debug, Clone, Serialize)]
pub struct UpdateUserRequest {
    pub username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    pub role: String,
    pub has_paid: bool,
}

/// Body for `POST /users/import`. Entries are forwarded exactly as read.
#[derive(Debug, Clone, Serialize)]
pub struct ImportRequest {
    pub users: Vec<serde_json::Value>,
}

/// Response from `/users/import`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ImportResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub added: u64,
    #[serde(default)]
    pub skipped: u64,
    #[serde(default)]
    pub message: Option<String>,
}

/// Generic `{success, message}` acknowledgement.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MessageResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
}
