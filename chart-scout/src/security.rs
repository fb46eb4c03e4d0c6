//! SQL identifier handling for queries built from user-supplied column names.
//!
//! Column names come straight from CSV headers, so they can contain spaces,
//! punctuation, quotes or mixed case. Every identifier interpolated into SQL
//! goes through [`SqlSecurity::escape_identifier`], which always quotes.

use crate::error::{Result, ScoutError};

/// Longest identifier accepted in generated SQL.
pub const MAX_IDENTIFIER_LEN: usize = 1024;

/// Helpers for safely embedding identifiers in SQL text.
pub struct SqlSecurity;

impl SqlSecurity {
    /// Quotes an identifier, doubling any embedded double quotes.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use chart_scout::security::SqlSecurity;
    ///
    /// assert_eq!(SqlSecurity::escape_identifier("Revenue").unwrap(), "\"Revenue\"");
    /// assert_eq!(SqlSecurity::escape_identifier("a\"b").unwrap(), "\"a\"\"b\"");
    /// assert!(SqlSecurity::escape_identifier("").is_err());
    /// ```
    pub fn escape_identifier(identifier: &str) -> Result<String> {
        Self::validate_identifier(identifier)?;

        let escaped = identifier.replace('"', "\"\"");
        Ok(format!("\"{escaped}\""))
    }

    /// Checks that an identifier can be quoted into SQL.
    pub fn validate_identifier(identifier: &str) -> Result<()> {
        if identifier.is_empty() {
            return Err(ScoutError::Configuration(
                "SQL identifier cannot be empty".to_string(),
            ));
        }

        if identifier.len() > MAX_IDENTIFIER_LEN {
            return Err(ScoutError::Configuration(format!(
                "SQL identifier too long (max {MAX_IDENTIFIER_LEN} bytes)"
            )));
        }

        if identifier.contains('\0') {
            return Err(ScoutError::Configuration(
                "SQL identifier contains a NUL byte".to_string(),
            ));
        }

        Ok(())
    }
}
