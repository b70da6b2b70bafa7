use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tally_types::Author;

use crate::error::{SdkError, SdkResult};

/// Settings for opening a [`Tally`](crate::Tally).
///
/// Every field has a default, so a TOML file only needs the keys it changes:
///
/// ```toml
/// root = "/var/lib/tally"
///
/// [author]
/// name = "bot"
/// email = "bot@example.com"
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TallyConfig {
    pub root: PathBuf,
    pub author: AuthorConfig,
}

impl Default for TallyConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            author: AuthorConfig::default(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthorConfig {
    pub name: String,
    pub email: String,
}

impl Default for AuthorConfig {
    fn default() -> Self {
        Self {
            name: "tally".into(),
            email: "tally@localhost".into(),
        }
    }
}

impl TallyConfig {
    /// Read a TOML config file.
    pub fn load(path: impl AsRef<Path>) -> SdkResult<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        toml::from_str(&text).map_err(|e| SdkError::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// The validated author identity.
    pub fn author(&self) -> SdkResult<Author> {
        Ok(Author::new(&self.author.name, &self.author.email)?)
    }
}
