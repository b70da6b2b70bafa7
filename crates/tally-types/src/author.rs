use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Characters git refuses inside a signature name or email.
const FORBIDDEN_CHARS: &[char] = &['<', '>', '\n', '\r', '\0'];

/// The author identity recorded on every history entry.
///
/// Configured once when a store is opened and fixed for its lifetime.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Author {
    pub name: String,
    pub email: String,
}

impl Author {
    /// Create an author after validating both fields.
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Result<Self, TypeError> {
        let author = Self {
            name: name.into(),
            email: email.into(),
        };
        author.validate()?;
        Ok(author)
    }

    /// Check that both fields are non-empty and neither carries characters
    /// that would corrupt a commit signature.
    pub fn validate(&self) -> Result<(), TypeError> {
        for (field, value) in [("name", &self.name), ("email", &self.email)] {
            if value.trim().is_empty() {
                return Err(TypeError::InvalidAuthor(format!("{field} must not be empty")));
            }
            if let Some(ch) = value.chars().find(|c| FORBIDDEN_CHARS.contains(c)) {
                return Err(TypeError::InvalidAuthor(format!(
                    "{field} contains forbidden character: {ch:?}"
                )));
            }
        }
        Ok(())
    }
}

impl fmt::Display for Author {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} <{}>", self.name, self.email)
    }
}
