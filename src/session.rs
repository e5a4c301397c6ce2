//! Small JSON file holding the logged-in user and the connectivity flag
//! between CLI invocations.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::domain::Session;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalState {
    #[serde(default)]
    pub session: Option<Session>,

    /// `None` until `online`/`offline` is first used.
    #[serde(default)]
    pub online: Option<bool>,
}

#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// A missing file reads as the empty state.
    pub fn load(&self) -> Result<LocalState> {
        if !self.path.exists() {
            return Ok(LocalState::default());
        }

        let raw = std::fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read session file: {}", self.path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse session file: {}", self.path.display()))
    }

    pub fn save(&self, state: &LocalState) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let raw = serde_json::to_string_pretty(state)?;
        std::fs::write(&self.path, raw)
            .with_context(|| format!("Failed to write session file: {}", self.path.display()))
    }

    pub fn current(&self) -> Result<Option<Session>> {
        Ok(self.load()?.session)
    }

    pub fn set_session(&self, session: Option<Session>) -> Result<()> {
        let mut state = self.load()?;
        state.session = session;
        self.save(&state)
    }

    pub fn set_online(&self, online: bool) -> Result<()> {
        let mut state = self.load()?;
        state.online = Some(online);
        self.save(&state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::UserId;

    fn temp_store() -> SessionStore {
        let path = std::env::temp_dir().join(format!("pesaflow-session-{}.json", uuid::Uuid::new_v4()));
        SessionStore::new(path)
    }

    #[test]
    fn missing_file_is_logged_out() {
        let store = temp_store();
        assert_eq!(store.load().unwrap(), LocalState::default());
        assert!(store.current().unwrap().is_none());
    }

    #[test]
    fn session_and_connectivity_are_kept_independently() {
        let store = temp_store();
        let session = Session {
            user_id: UserId::new(3),
            name: "Amina".to_string(),
            email: "amina@example.com".to_string(),
        };

        store.set_session(Some(session.clone())).unwrap();
        store.set_online(false).unwrap();

        let state = store.load().unwrap();
        assert_eq!(state.session, Some(session));
        assert_eq!(state.online, Some(false));

        store.set_session(None).unwrap();
        assert_eq!(store.load().unwrap().online, Some(false));

        std::fs::remove_file(store.path()).ok();
    }
}
