use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Credentials persisted between CLI invocations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Credentials {
    token: String,
    email: String,
}

/// The admin login context. Every command receives it explicitly; nothing else
/// holds a copy of the token.
#[derive(Debug)]
pub struct Session {
    path: PathBuf,
    credentials: Option<Credentials>,
}

impl Session {
    /// Reads the session file. A missing file yields a logged-out session; an
    /// unparseable one is discarded so `login` can start over.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Ok(Self {
                    path,
                    credentials: None,
                })
            }
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to read {}", path.display()))
            }
        };

        let mut session = Self {
            path,
            credentials: None,
        };
        match serde_json::from_str(&raw) {
            Ok(credentials) => session.credentials = Some(credentials),
            Err(e) => {
                eprintln!(
                    "⚠️  Ignoring corrupt session file {} ({e}); log in again.",
                    session.path.display()
                );
                session.invalidate()?;
            }
        }
        Ok(session)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn token(&self) -> Option<&str> {
        self.credentials.as_ref().map(|c| c.token.as_str())
    }

    pub fn email(&self) -> Option<&str> {
        self.credentials.as_ref().map(|c| c.email.as_str())
    }

    pub fn is_authenticated(&self) -> bool {
        self.credentials.is_some()
    }

    /// Stores a fresh login and writes it to disk.
    pub fn begin(&mut self, token: String, email: String) -> Result<()> {
        let credentials = Credentials { token, email };
        let raw = serde_json::to_string_pretty(&credentials)?;
        fs::write(&self.path, raw)
            .with_context(|| format!("Failed to write {}", self.path.display()))?;
        self.credentials = Some(credentials);
        Ok(())
    }

    /// Forgets the login and erases the session file.
    pub fn invalidate(&mut self) -> Result<()> {
        self.credentials = None;
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).with_context(|| format!("Failed to remove {}", self.path.display())),
        }
    }
}
