use serde::{Deserialize, Serialize};
use std::fmt;

/// Normalize a display name or team label into a lookup id.
///
/// Keeps ASCII alphanumerics and lowercases them, so `"Red Fury"` and
/// `"redfury"` resolve to the same id.
pub fn to_id(text: &str) -> String {
    text.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// Normalized identity of a participant (a human player or the tower bot).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(String);

impl PlayerId {
    pub fn new(name: &str) -> Self {
        PlayerId(to_id(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

impl From<&str> for PlayerId {
    fn from(name: &str) -> Self {
        PlayerId::new(name)
    }
}
