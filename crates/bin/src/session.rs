//! Session management for web interface
//!
//! Provides in-memory session storage mapping session tokens to the signed-in user's projection.

use std::{collections::HashMap, sync::Arc};

use tokio::sync::RwLock;
use uuid::Uuid;
use yspotify::SessionUser;

/// Session token (UUID stored in cookie)
pub type SessionToken = String;

/// What the server remembers about one browser session
#[derive(Clone, Debug)]
pub struct WebSession {
    /// Latest projection of the signed-in user
    pub user: SessionUser,
    /// State token of an OAuth link flow in progress
    pub oauth_state: Option<String>,
}

/// In-memory session store
///
/// Maps session tokens (UUIDs) to web sessions. Sessions are ephemeral and lost on server
/// restart.
#[derive(Clone, Default)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<SessionToken, WebSession>>>,
}

impl SessionStore {
    /// Create a new empty session store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new session for a user
    ///
    /// # Returns
    /// The session token (UUID) to be stored in a cookie
    pub async fn create_session(&self, user: SessionUser) -> SessionToken {
        let token = Uuid::new_v4().to_string();
        let mut sessions = self.sessions.write().await;
        sessions.insert(
            token.clone(),
            WebSession {
                user,
                oauth_state: None,
            },
        );
        token
    }

    /// Get a copy of the session behind `token`
    pub async fn get(&self, token: &str) -> Option<WebSession> {
        let sessions = self.sessions.read().await;
        sessions.get(token).cloned()
    }

    /// Replace the user projection of a session. Unknown tokens are ignored.
    pub async fn update_user(&self, token: &str, user: SessionUser) {
        let mut sessions = self.sessions.write().await;
        if let Some(session) = sessions.get_mut(token) {
            session.user = user;
        }
    }

    /// Generate and remember a fresh OAuth state token for the session
    pub async fn begin_oauth(&self, token: &str) -> Option<String> {
        let mut sessions = self.sessions.write().await;
        let session = sessions.get_mut(token)?;
        let state = Uuid::new_v4().simple().to_string();
        session.oauth_state = Some(state.clone());
        Some(state)
    }

    /// Remove and return the pending OAuth state token
    pub async fn take_oauth_state(&self, token: &str) -> Option<String> {
        let mut sessions = self.sessions.write().await;
        sessions.get_mut(token)?.oauth_state.take()
    }

    /// Destroy a session
    pub async fn destroy_session(&self, token: &str) {
        let mut sessions = self.sessions.write().await;
        sessions.remove(token);
    }

    /// Get the number of active sessions
    pub async fn session_count(&self) -> usize {
        let sessions = self.sessions.read().await;
        sessions.len()
    }
}
