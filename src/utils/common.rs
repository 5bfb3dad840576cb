//! Common utility functions used across the application

use crate::error::{ReelError, Result};

/// Directory name for a project titled `title`
///
/// Spaces become underscores; path separators are replaced too so a title
/// can never point outside the content directory. Case is kept.
pub fn project_dir_name(title: &str) -> String {
    let invalid_chars = [' ', '/', '\\'];
    let mut result = title.trim().to_string();
    for c in invalid_chars {
        result = result.replace(c, "_");
    }
    result
}

/// Read a required API key from the environment
pub fn api_key_from_env(var: &str) -> Result<String> {
    match std::env::var(var) {
        Ok(key) if !key.trim().is_empty() => Ok(key),
        _ => Err(ReelError::Configuration(format!("{} is not set", var))),
    }
}
