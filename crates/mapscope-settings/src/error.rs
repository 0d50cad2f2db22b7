//! Settings errors.

use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SettingsError {
    /// A value failed validation. `key` is the dotted path of the value.
    #[error("{key}: {reason}")]
    Invalid { key: String, reason: String },

    #[error("no configuration directory on this platform")]
    NoConfigDir,

    #[error("cannot access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{} is not valid {format}: {reason}", path.display())]
    Parse {
        path: PathBuf,
        format: &'static str,
        reason: String,
    },

    #[error("cannot encode settings as {format}: {reason}")]
    Encode {
        format: &'static str,
        reason: String,
    },

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl SettingsError {
    pub(crate) fn invalid(key: &str, reason: impl Into<String>) -> Self {
        SettingsError::Invalid {
            key: key.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn io(path: &Path, source: io::Error) -> Self {
        SettingsError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Structural problems with a settings file.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("unsupported settings file extension '{0}' (expected json or toml)")]
    UnsupportedFormat(String),

    #[error("layer id '{0}' is used more than once")]
    DuplicateLayer(String),
}

pub type SettingsResult<T> = Result<T, SettingsError>;
