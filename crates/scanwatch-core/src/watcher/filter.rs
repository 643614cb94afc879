//! Windows-style filename wildcards
//!
//! `*` matches any run of characters, `?` exactly one, everything else is
//! literal and compared case-insensitively. `*` and `*.*` match every name,
//! including names without an extension.

use std::{fmt, path::Path};

use regex::{Regex, RegexBuilder};

use crate::{Error, Result};

#[derive(Clone)]
pub struct FilenameFilter {
    pattern: String,
    /// `None` when the pattern matches everything
    regex: Option<Regex>,
}

impl FilenameFilter {
    /// # Errors
    ///
    /// Returns error if the pattern is empty
    pub fn new(pattern: &str) -> Result<Self> {
        let pattern = pattern.trim();
        if pattern.is_empty() {
            return Err(Error::invalid_config("filename_filter cannot be empty"));
        }

        let regex = if matches!(pattern, "*" | "*.*") {
            None
        } else {
            let translated = pattern.chars().fold(String::from("^"), |mut acc, c| {
                match c {
                    '*' => acc.push_str(".*"),
                    '?' => acc.push('.'),
                    other => acc.push_str(&regex::escape(other.encode_utf8(&mut [0; 4]))),
                }
                acc
            }) + "$";

            let regex = RegexBuilder::new(&translated)
                .case_insensitive(true)
                .build()
                .map_err(|e| {
                    Error::invalid_config(format!("Invalid filename_filter '{pattern}': {e}"))
                })?;
            Some(regex)
        };

        Ok(Self {
            pattern: pattern.to_string(),
            regex,
        })
    }

    /// Filter that accepts every file
    #[must_use]
    pub fn any() -> Self {
        Self {
            pattern: "*.*".to_string(),
            regex: None,
        }
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn matches(&self, name: &str) -> bool {
        self.regex.as_ref().map_or(true, |regex| regex.is_match(name))
    }

    /// Match on the final path component; paths without one never match
    pub fn matches_path(&self, path: &Path) -> bool {
        path.file_name()
            .is_some_and(|name| self.matches(&name.to_string_lossy()))
    }
}

impl fmt::Debug for FilenameFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("FilenameFilter").field(&self.pattern).finish()
    }
}
