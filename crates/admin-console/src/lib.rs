//! Admin console client for the user-management REST API.
//!
//! The crate drives login/registration and a user-management table (create,
//! edit, delete, JSON export/import) against the backend's `/api` endpoints.
//! Rendering goes through the [`Console`] trait so the same client logic
//! serves the `adminctl` terminal front-end and tests alike.

pub mod admin;
pub mod api;
pub mod config;
pub mod console;
pub mod transfer;
pub mod view;

pub use admin::{AdminClient, CONNECTION_FAILED, Timings};
pub use api::{ApiClient, ApiError, User};
pub use console::{Console, ConsoleState, MessageKind, Modal, Panel, Route, TerminalConsole};
