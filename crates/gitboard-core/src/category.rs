//! Category keys for the trending feed.
//!
//! The set of categories is configuration, not a hardcoded enum: the server
//! config lists the known categories and their upstream queries. This type
//! only enforces that a key is well-formed (lowercase alphanumeric, `-` or
//! `_`), so it can be used safely inside cache keys.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// A validated category key, e.g. `trending`, `agent`, `ai`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Category(String);

impl Category {
    /// Parse a category key, rejecting anything that would be unsafe or
    /// ambiguous as a cache-key component.
    pub fn parse(raw: &str) -> Result<Self, CoreError> {
        if raw.is_empty() || raw.len() > 32 {
            return Err(CoreError::invalid_category(raw));
        }
        let ok = raw
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_');
        if !ok {
            return Err(CoreError::invalid_category(raw));
        }
        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Category {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Category::parse(&value)
    }
}

impl From<Category> for String {
    fn from(value: Category) -> Self {
        value.0
    }
}
