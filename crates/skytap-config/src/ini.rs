//! Minimal INI reader for `skytap.ini`.
//!
//! Follows the Python `configparser` dialect the file format comes from:
//! `[section]` headers, `key = value` or `key: value` entries split on the
//! first `=` or `:`, lower-cased keys, full-line `#`/`;` comments, keys
//! without a value, and indented continuation lines. Keys in `[DEFAULT]`
//! are visible from every other section that does not set them itself.
//! Value interpolation (`%(name)s`) is not supported.

use std::collections::HashMap;

use thiserror::Error;

/// Section whose keys every other section inherits.
pub const DEFAULT_SECTION: &str = "DEFAULT";

#[derive(Debug, Error, PartialEq, Eq)]
#[error("line {line}: {reason}")]
pub struct ParseError {
    pub line: usize,
    pub reason: String,
}

/// Parsed INI document. Keys map to `None` when written without a value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Ini {
    sections: HashMap<String, HashMap<String, Option<String>>>,
}

impl Ini {
    pub fn parse(text: &str) -> Result<Self, ParseError> {
        let mut ini = Self::default();
        let mut section: Option<String> = None;
        let mut last_key: Option<String> = None;

        for (idx, raw) in text.lines().enumerate() {
            let line = idx + 1;
            let trimmed = raw.trim();

            if trimmed.is_empty() {
                last_key = None;
                continue;
            }
            if trimmed.starts_with('#') || trimmed.starts_with(';') {
                continue;
            }

            // Indented line continues the previous value.
            if raw.starts_with(char::is_whitespace) {
                if let (Some(sec), Some(key)) = (section.as_ref(), last_key.as_ref()) {
                    if let Some(Some(value)) = ini.entry_mut(sec, key) {
                        value.push('\n');
                        value.push_str(trimmed);
                        continue;
                    }
                }
            }

            if let Some(name) = trimmed.strip_prefix('[').and_then(|s| s.strip_suffix(']')) {
                let name = name.trim().to_owned();
                ini.sections.entry(name.clone()).or_default();
                section = Some(name);
                last_key = None;
                continue;
            }

            let Some(sec) = section.as_ref() else {
                return Err(ParseError {
                    line,
                    reason: "entry outside of a [section]".into(),
                });
            };

            let (key, value) = match trimmed.find(['=', ':']) {
                Some(pos) => (&trimmed[..pos], Some(trimmed[pos + 1..].trim().to_owned())),
                None => (trimmed, None),
            };
            let key = key.trim().to_lowercase();
            if key.is_empty() {
                return Err(ParseError {
                    line,
                    reason: "entry has no key".into(),
                });
            }

            ini.sections
                .entry(sec.clone())
                .or_default()
                .insert(key.clone(), value);
            last_key = Some(key);
        }

        Ok(ini)
    }

    /// Value of `key` in `section`, falling back to `[DEFAULT]`.
    ///
    /// A missing section has no values, not even inherited ones. Keys
    /// without a value or with an empty value count as absent.
    pub fn get(&self, section: &str, key: &str) -> Option<&str> {
        let entries = self.sections.get(section)?;
        let value = match entries.get(key) {
            Some(value) => value,
            None => self.sections.get(DEFAULT_SECTION)?.get(key)?,
        };
        value.as_deref().filter(|v| !v.is_empty())
    }

    fn entry_mut(&mut self, section: &str, key: &str) -> Option<&mut Option<String>> {
        self.sections.get_mut(section)?.get_mut(key)
    }
}
