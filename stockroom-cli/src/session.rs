//! Login session
//!
//! A [`Session`] is opened by checking credentials against a
//! [`CredentialVerifier`] and then persisted as JSON in the client data
//! folder, so consecutive commands share it. A session idle for longer than
//! [`INACTIVITY_TIMEOUT_SECS`] is discarded on next use.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use stockroom_common::auth::{CredentialVerifier, Role};
use tracing::{debug, info};

use crate::error::{ClientError, Result};

/// Idle time after which a session is forced to log out (one hour)
pub const INACTIVITY_TIMEOUT_SECS: i64 = 60 * 60;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub username: String,
    pub role: Role,
    pub last_activity: DateTime<Utc>,
}

impl Session {
    /// Open a session if the verifier accepts the credentials
    pub fn login(
        verifier: &dyn CredentialVerifier,
        username: &str,
        password: &str,
        now: DateTime<Utc>,
    ) -> Result<Self> {
        let role = verifier
            .verify(username, password)
            .ok_or(ClientError::InvalidCredentials)?;

        info!("Logged in as {} ({})", username, role);
        Ok(Self {
            username: username.to_string(),
            role,
            last_activity: now,
        })
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now - self.last_activity > Duration::seconds(INACTIVITY_TIMEOUT_SECS)
    }

    /// Record activity, restarting the inactivity timer
    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.last_activity = now;
    }

    /// Fails unless the role may create, edit or delete
    pub fn require_elevated(&self) -> Result<()> {
        if self.role.is_elevated() {
            Ok(())
        } else {
            Err(ClientError::Forbidden)
        }
    }
}

/// Session persisted in a JSON file
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Stored session, if any
    ///
    /// An unreadable or corrupt file counts as no session.
    pub fn load(&self) -> Option<Session> {
        let content = std::fs::read_to_string(&self.path).ok()?;
        match serde_json::from_str(&content) {
            Ok(session) => Some(session),
            Err(e) => {
                debug!("Ignoring unreadable session file {}: {}", self.path.display(), e);
                None
            }
        }
    }

    pub fn save(&self, session: &Session) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(session)
            .map_err(|e| ClientError::Validation(format!("Failed to encode session: {}", e)))?;
        std::fs::write(&self.path, content)?;
        Ok(())
    }

    /// Remove the stored session; missing file is fine
    pub fn clear(&self) -> Result<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// The live session, with its activity refreshed and saved
    ///
    /// An expired session is cleared and reported as
    /// [`ClientError::SessionExpired`].
    pub fn resume(&self, now: DateTime<Utc>) -> Result<Session> {
        let mut session = self.load().ok_or(ClientError::NotLoggedIn)?;

        if session.is_expired(now) {
            info!("Session for {} expired", session.username);
            self.clear()?;
            return Err(ClientError::SessionExpired);
        }

        session.touch(now);
        self.save(&session)?;
        Ok(session)
    }
}
