use std::sync::LazyLock;

use regex::Regex;
use wpmove_common::{Error, Result};

/// Prefix WordPress uses when the installer is left at its default.
pub const DEFAULT_TABLE_PREFIX: &str = "wp_";

/// MySQL identifiers are capped at 64 characters and the longest table
/// built from a prefix is `{prefix}cformsdata`.
pub const MAX_TABLE_PREFIX_LEN: usize = 48;

static TABLE_PREFIX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_]+$").expect("valid regex"));

/// Input validation and sanitization for submitted migration fields.
pub struct InputValidator;

impl InputValidator {
    /// Sanitize user input by removing control characters.
    pub fn sanitize(input: &str) -> String {
        input.chars().filter(|c| !c.is_control()).collect()
    }

    /// Resolve the table prefix: blank means [`DEFAULT_TABLE_PREFIX`],
    /// anything else must be a plain identifier fragment since it ends up
    /// inside table names that cannot be bound as parameters.
    pub fn validate_table_prefix(prefix: &str) -> Result<String> {
        let prefix = prefix.trim();
        if prefix.is_empty() {
            return Ok(DEFAULT_TABLE_PREFIX.to_string());
        }
        if prefix.len() > MAX_TABLE_PREFIX_LEN {
            return Err(Error::Validation(format!(
                "table prefix longer than {MAX_TABLE_PREFIX_LEN} characters"
            )));
        }
        if !TABLE_PREFIX_RE.is_match(prefix) {
            return Err(Error::Validation(format!(
                "table prefix {prefix:?} may only contain letters, digits and underscores"
            )));
        }
        Ok(prefix.to_string())
    }

    /// A required free-text field: control characters stripped, surrounding
    /// whitespace trimmed, must not end up empty.
    pub fn require_text(field: &str, value: &str) -> Result<String> {
        let value = Self::sanitize(value).trim().to_string();
        if value.is_empty() {
            return Err(Error::Validation(format!("{field} cannot be empty")));
        }
        Ok(value)
    }
}
