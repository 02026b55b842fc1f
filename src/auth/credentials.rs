//! Credentials storage for Sila.
//!
//! Stores the streaming-service access token in `~/.sila/credentials.json`.
//! Everything else about the session is derived from it.

use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

use super::TokenIdentity;

/// The credentials directory name.
const CREDENTIALS_DIR: &str = ".sila";

/// The credentials file name.
const CREDENTIALS_FILE: &str = "credentials.json";

/// Errors from reading or writing the credentials file.
#[derive(Debug, Error)]
pub enum CredentialsError {
    #[error("failed to read credentials from {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write credentials to {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("credentials file {} is not valid JSON: {source}", .path.display())]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Authentication credentials for the streaming service.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Credentials {
    /// OAuth access token.
    pub access_token: Option<String>,
    /// Token expiration time as Unix timestamp (seconds since epoch).
    pub expires_at: Option<i64>,
    /// The authenticated user's ID.
    pub user_id: Option<String>,
}

impl Credentials {
    /// Create new empty credentials.
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if the credentials have an access token.
    pub fn has_token(&self) -> bool {
        self.access_token.is_some()
    }

    /// Check if the token is expired.
    ///
    /// Returns `true` if the token is expired or if there's no expiration time set.
    pub fn is_expired(&self) -> bool {
        match self.expires_at {
            Some(expires_at) => chrono::Utc::now().timestamp() >= expires_at,
            None => true,
        }
    }

    /// Check if the credentials are valid (has token and not expired).
    pub fn is_valid(&self) -> bool {
        self.has_token() && !self.is_expired()
    }

    /// Identity of the stored token, if any.
    pub fn token_identity(&self) -> Option<TokenIdentity> {
        self.access_token.as_deref().map(TokenIdentity::new)
    }
}

/// Manages credential storage and retrieval.
#[derive(Debug, Clone)]
pub struct CredentialsManager {
    credentials_path: PathBuf,
}

impl CredentialsManager {
    /// Create a manager for the default location under the home directory.
    ///
    /// Returns `None` if the home directory cannot be determined.
    pub fn new() -> Option<Self> {
        let home = dirs::home_dir()?;
        Some(Self {
            credentials_path: home.join(CREDENTIALS_DIR).join(CREDENTIALS_FILE),
        })
    }

    /// Create a manager for an explicit file path.
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            credentials_path: path.into(),
        }
    }

    /// Get the path to the credentials file.
    pub fn credentials_path(&self) -> &Path {
        &self.credentials_path
    }

    /// Load credentials from the credentials file.
    ///
    /// A missing file yields empty credentials.
    pub fn load(&self) -> Result<Credentials, CredentialsError> {
        if !self.credentials_path.exists() {
            return Ok(Credentials::default());
        }

        let file = File::open(&self.credentials_path).map_err(|source| CredentialsError::Read {
            path: self.credentials_path.clone(),
            source,
        })?;

        serde_json::from_reader(BufReader::new(file)).map_err(|source| {
            CredentialsError::Malformed {
                path: self.credentials_path.clone(),
                source,
            }
        })
    }

    /// Save credentials, creating the parent directory if needed.
    pub fn save(&self, credentials: &Credentials) -> Result<(), CredentialsError> {
        let write_err = |source| CredentialsError::Write {
            path: self.credentials_path.clone(),
            source,
        };

        if let Some(parent) = self.credentials_path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent).map_err(write_err)?;
            }
        }

        let file = File::create(&self.credentials_path).map_err(write_err)?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, credentials).map_err(|source| {
            CredentialsError::Malformed {
                path: self.credentials_path.clone(),
                source,
            }
        })?;
        writer.flush().map_err(write_err)
    }

    /// Remove the credentials file if it exists.
    pub fn clear(&self) -> Result<(), CredentialsError> {
        if !self.credentials_path.exists() {
            return Ok(());
        }

        fs::remove_file(&self.credentials_path).map_err(|source| CredentialsError::Write {
            path: self.credentials_path.clone(),
            source,
        })
    }
}
