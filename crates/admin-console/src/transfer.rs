//! JSON backup files: naming exports and validating imports.

use std::path::Path;

use chrono::NaiveDate;
use serde_json::Value;
use thiserror::Error;

/// Prefix of downloaded backup files.
pub const BACKUP_FILE_PREFIX: &str = "users_backup_";

/// Errors that reject an import before anything is sent.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("Please select a valid JSON file")]
    NotJsonFile,

    #[error("{0}")]
    Read(#[from] std::io::Error),

    #[error("{0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid JSON format: expected an array of users")]
    NotAnArray,

    #[error("Invalid user data: username and password are required")]
    MissingCredentials { index: usize },
}

/// File name for a backup taken on `date`, e.g. `users_backup_2024-05-01.json`.
pub fn backup_file_name(date: NaiveDate) -> String {
    format!("{BACKUP_FILE_PREFIX}{}.json", date.format("%Y-%m-%d"))
}

/// Only `.json` files are accepted.
pub fn check_file_name(path: &Path) -> Result<(), ImportError> {
    let is_json = path
        .file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.ends_with(".json"));
    if is_json {
        Ok(())
    } else {
        Err(ImportError::NotJsonFile)
    }
}

/// Parse import file content into the entries to send.
///
/// The document must be an array whose every element is an object with a
/// non-empty string `username` and `password`. Entries are returned as read
/// so that extra fields (`role`, `has_paid`) reach the backend untouched.
pub fn parse_import(text: &str) -> Result<Vec<Value>, ImportError> {
    let document: Value = serde_json::from_str(text)?;
    let Value::Array(entries) = document else {
        return Err(ImportError::NotAnArray);
    };

    for (index, entry) in entries.iter().enumerate() {
        if !has_text(entry, "username") || !has_text(entry, "password") {
            return Err(ImportError::MissingCredentials { index });
        }
    }

    Ok(entries)
}

fn has_text(entry: &Value, field: &str) -> bool {
    entry
        .get(field)
        .and_then(Value::as_str)
        .is_some_and(|s| !s.is_empty())
}

/// Read the file and validate its content. The name is checked separately
/// by [`check_file_name`].
pub async fn read_import_file(path: &Path) -> Result<Vec<Value>, ImportError> {
    let text = tokio::fs::read_to_string(path).await?;
    parse_import(&text)
}

/// Confirmation prompt shown before posting an import.
pub fn import_prompt(count: usize) -> String {
    format!(
        "This will import {count} user(s). Do you want to continue?\n\n\
         Note: Existing users with the same username will be skipped."
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::path::PathBuf;

    #[test]
    fn test_backup_file_name() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 7).unwrap();
        assert_eq!(backup_file_name(date), "users_backup_2024-03-07.json");
    }

    #[test]
    fn test_rejects_non_json_names() {
        assert!(check_file_name(&PathBuf::from("users.json")).is_ok());
        assert!(matches!(
            check_file_name(&PathBuf::from("users.csv")),
            Err(ImportError::NotJsonFile)
        ));
        assert!(matches!(
            check_file_name(&PathBuf::from("json")),
            Err(ImportError::NotJsonFile)
        ));
    }

    #[test]
    fn test_object_document_is_not_an_array() {
        let err = parse_import("{}").unwrap_err();
        assert!(matches!(err, ImportError::NotAnArray));
        assert!(err.to_string().contains("expected an array of users"));
    }

    #[test]
    fn test_missing_or_empty_credentials() {
        let err = parse_import(r#"[{"username":"a"}]"#).unwrap_err();
        assert!(matches!(err, ImportError::MissingCredentials { index: 0 }));

        let err = parse_import(r#"[{"username":"a","password":"b"},{"username":"","password":"c"}]"#)
            .unwrap_err();
        assert!(matches!(err, ImportError::MissingCredentials { index: 1 }));

        let err = parse_import(r#"["alice"]"#).unwrap_err();
        assert!(matches!(err, ImportError::MissingCredentials { index: 0 }));
    }

    #[test]
    fn test_entries_are_kept_as_read() {
        let entries =
            parse_import(r#"[{"username":"a","password":"b","role":"admin","has_paid":true}]"#)
                .unwrap();
        assert_eq!(
            entries,
            vec![json!({"username":"a","password":"b","role":"admin","has_paid":true})]
        );
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(parse_import("[{"), Err(ImportError::Parse(_))));
    }

    #[test]
    fn test_import_prompt_mentions_count() {
        let prompt = import_prompt(3);
        assert!(prompt.starts_with("This will import 3 user(s)."));
        assert!(prompt.ends_with("will be skipped."));
    }
}
