//! REST API client module.
//!
//! Provides an async client for the user-management endpoints the console
//! drives: authentication, user CRUD, and JSON export/import.

mod client;
mod error;
mod types;

pub use client::ApiClient;
pub use error::{ApiError, ApiResult};
pub use types::*;
