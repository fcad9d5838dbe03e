//! Session credential handling.
//!
//! The shop API authenticates with a token cookie. [`Session`] is the
//! in-memory holder shared by the API client and the views; [`SessionFile`]
//! persists it between CLI invocations.

use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};

use chrono::{DateTime, Utc};
use popacart_core::UserId;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors reading or writing the session file.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Session file I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Session file is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// The logged-in customer as returned by the login call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    pub id: UserId,
    pub name: Option<String>,
    pub email: Option<String>,
}

impl CurrentUser {
    /// Name to greet the user with.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .or(self.email.as_deref())
            .unwrap_or(self.id.as_str())
    }
}

#[derive(Default)]
struct SessionState {
    token: Option<SecretString>,
    user: Option<CurrentUser>,
    logged_in_at: Option<DateTime<Utc>>,
}

/// Shared session handle. Cheap to clone; all clones see the same state.
#[derive(Clone, Default)]
pub struct Session {
    inner: Arc<RwLock<SessionState>>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        f.debug_struct("Session")
            .field("token", &state.token.as_ref().map(|_| "[REDACTED]"))
            .field("user", &state.user)
            .finish()
    }
}

impl Session {
    /// An anonymous session.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store the credential and user after a successful login.
    pub fn establish(&self, token: SecretString, user: Option<CurrentUser>) {
        let mut state = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        *state = SessionState {
            token: Some(token),
            user,
            logged_in_at: Some(Utc::now()),
        };
    }

    /// Forget the credential and user.
    pub fn clear(&self) {
        let mut state = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        *state = SessionState::default();
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .token
            .is_some()
    }

    /// The credential, if logged in.
    #[must_use]
    pub fn token(&self) -> Option<SecretString> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .token
            .clone()
    }

    #[must_use]
    pub fn user(&self) -> Option<CurrentUser> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .user
            .clone()
    }

    #[must_use]
    pub fn logged_in_at(&self) -> Option<DateTime<Utc>> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .logged_in_at
    }
}

/// On-disk form of a session.
#[derive(Serialize, Deserialize)]
struct StoredSession {
    token: String,
    user: Option<CurrentUser>,
    logged_in_at: DateTime<Utc>,
}

/// JSON file holding the session between runs.
#[derive(Debug, Clone)]
pub struct SessionFile {
    path: PathBuf,
}

impl SessionFile {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the stored session into `session`. A missing file leaves the
    /// session anonymous.
    ///
    /// # Errors
    ///
    /// Returns `SessionError` if the file exists but cannot be read or parsed.
    pub async fn restore(&self, session: &Session) -> Result<(), SessionError> {
        let contents = match tokio::fs::read(&self.path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(e.into()),
        };

        let stored: StoredSession = serde_json::from_slice(&contents)?;
        let mut state = session.inner.write().unwrap_or_else(PoisonError::into_inner);
        *state = SessionState {
            token: Some(SecretString::from(stored.token)),
            user: stored.user,
            logged_in_at: Some(stored.logged_in_at),
        };
        Ok(())
    }

    /// Write `session` to disk, or remove the file when it is anonymous.
    ///
    /// # Errors
    ///
    /// Returns `SessionError` if the file cannot be written.
    pub async fn save(&self, session: &Session) -> Result<(), SessionError> {
        let stored = {
            let state = session.inner.read().unwrap_or_else(PoisonError::into_inner);
            state.token.as_ref().map(|token| StoredSession {
                token: token.expose_secret().to_string(),
                user: state.user.clone(),
                logged_in_at: state.logged_in_at.unwrap_or_else(Utc::now),
            })
        };

        let Some(stored) = stored else {
            return self.remove().await;
        };

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&self.path, serde_json::to_vec_pretty(&stored)?).await?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            tokio::fs::set_permissions(&self.path, std::fs::Permissions::from_mode(0o600)).await?;
        }

        Ok(())
    }

    /// Delete the session file if present.
    ///
    /// # Errors
    ///
    /// Returns `SessionError` if the file exists but cannot be removed.
    pub async fn remove(&self) -> Result<(), SessionError> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn user() -> CurrentUser {
        CurrentUser {
            id: UserId::new("u1"),
            name: Some("Asha".to_string()),
            email: Some("asha@example.com".to_string()),
        }
    }

    #[test]
    fn test_debug_redacts_token() {
        let session = Session::new();
        session.establish(SecretString::from("super_secret_token"), Some(user()));

        let debug_output = format!("{session:?}");
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("super_secret_token"));
    }

    #[test]
    fn test_clear_forgets_everything() {
        let session = Session::new();
        session.establish(SecretString::from("t"), Some(user()));
        let clone = session.clone();
        clone.clear();

        assert!(!session.is_authenticated());
        assert!(session.user().is_none());
    }

    #[tokio::test]
    async fn test_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let file = SessionFile::new(dir.path().join("nested/session.json"));

        let session = Session::new();
        session.establish(SecretString::from("abc123"), Some(user()));
        file.save(&session).await.unwrap();

        let restored = Session::new();
        file.restore(&restored).await.unwrap();
        assert_eq!(restored.token().unwrap().expose_secret(), "abc123");
        assert_eq!(restored.user(), Some(user()));
    }

    #[tokio::test]
    async fn test_saving_anonymous_session_removes_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = SessionFile::new(dir.path().join("session.json"));

        let session = Session::new();
        session.establish(SecretString::from("abc123"), None);
        file.save(&session).await.unwrap();
        session.clear();
        file.save(&session).await.unwrap();

        assert!(!file.path().exists());
        let restored = Session::new();
        file.restore(&restored).await.unwrap();
        assert!(!restored.is_authenticated());
    }
}
