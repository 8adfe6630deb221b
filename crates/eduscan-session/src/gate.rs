//! Session gate implementation

use crate::config::AuthConfig;
use crate::error::SessionResult;
use crate::session::Session;
use eduscan_storage::StateStore;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

/// Authentication state as seen by protected views
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthState {
    /// Startup restoration has not finished yet
    Unknown,
    Authenticated(Session),
    Unauthenticated,
}

impl AuthState {
    pub fn session(&self) -> Option<&Session> {
        match self {
            AuthState::Authenticated(session) => Some(session),
            _ => None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, AuthState::Authenticated(_))
    }

    pub fn is_restoring(&self) -> bool {
        matches!(self, AuthState::Unknown)
    }
}

/// Owns the current session and keeps the persisted copy in step with it.
///
/// All transitions take the state write lock before touching the store, so
/// the in-memory state and the persisted keys change together.
pub struct SessionGate {
    config: AuthConfig,
    store: Arc<dyn StateStore>,
    state: RwLock<AuthState>,
}

impl SessionGate {
    pub fn new(config: AuthConfig, store: Arc<dyn StateStore>) -> Self {
        Self {
            config,
            store,
            state: RwLock::new(AuthState::Unknown),
        }
    }

    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    pub async fn state(&self) -> AuthState {
        self.state.read().await.clone()
    }

    pub async fn current(&self) -> Option<Session> {
        self.state.read().await.session().cloned()
    }

    pub async fn is_authenticated(&self) -> bool {
        self.state.read().await.is_authenticated()
    }

    pub async fn is_restoring(&self) -> bool {
        self.state.read().await.is_restoring()
    }

    /// Non-blocking snapshot. `None` while a transition holds the lock.
    pub fn try_state(&self) -> Option<AuthState> {
        self.state.try_read().ok().map(|state| state.clone())
    }

    /// Adopt the persisted session if both keys are present and the profile
    /// parses; otherwise purge both keys and become unauthenticated.
    ///
    /// Only the first call has an effect. Later calls return the current state.
    pub async fn restore_session(&self) -> AuthState {
        let mut state = self.state.write().await;
        if !state.is_restoring() {
            return state.clone();
        }

        *state = match self.read_persisted().await {
            Some(session) => {
                info!("Restored session for {}", session.email);
                AuthState::Authenticated(session)
            }
            None => {
                if let Err(e) = purge_persisted_session(self.store.as_ref(), &self.config).await {
                    warn!("Failed to purge persisted session: {}", e);
                }
                debug!("No persisted session, starting unauthenticated");
                AuthState::Unauthenticated
            }
        };

        state.clone()
    }

    async fn read_persisted(&self) -> Option<Session> {
        let token = match self.store.get(&self.config.token_key()).await {
            Ok(token) => token,
            Err(e) => {
                warn!("Failed to read session token: {}", e);
                None
            }
        };
        let profile = match self.store.get(&self.config.profile_key()).await {
            Ok(profile) => profile,
            Err(e) => {
                warn!("Failed to read session profile: {}", e);
                None
            }
        };

        match (token, profile) {
            (Some(_), Some(profile)) => match serde_json::from_str::<Session>(&profile) {
                Ok(session) => Some(session),
                Err(e) => {
                    warn!("Persisted session profile is malformed: {}", e);
                    None
                }
            },
            _ => None,
        }
    }

    /// Check the credentials after the configured delay.
    ///
    /// Returns `true` and stores the session when the pair matches the
    /// configured account. A failed attempt leaves the current state alone.
    pub async fn login(&self, identifier: &str, secret: &str) -> bool {
        tokio::time::sleep(self.config.login_delay()).await;

        if !self.config.matches(identifier, secret) {
            info!("Rejected login attempt for {}", identifier);
            return false;
        }

        let session = Session {
            id: self.config.user_id.clone(),
            email: self.config.email.clone(),
            display_name: self.config.display_name.clone(),
            role: self.config.role.clone(),
        };

        let mut state = self.state.write().await;
        if let Err(e) = self.persist(&session).await {
            warn!("Failed to persist session for {}: {}", session.email, e);
        }
        info!("{} signed in", session.email);
        *state = AuthState::Authenticated(session);

        true
    }

    /// Clear the session and both persisted keys. Safe to call repeatedly.
    pub async fn logout(&self) {
        let mut state = self.state.write().await;
        if let Some(session) = state.session() {
            info!("{} signed out", session.email);
        }
        *state = AuthState::Unauthenticated;

        if let Err(e) = purge_persisted_session(self.store.as_ref(), &self.config).await {
            warn!("Failed to remove persisted session: {}", e);
        }
    }

    async fn persist(&self, session: &Session) -> SessionResult<()> {
        let profile = serde_json::to_string(session)?;
        let token = format!("mock_{}", uuid::Uuid::new_v4().simple());

        self.store.set(&self.config.token_key(), token).await?;
        self.store.set(&self.config.profile_key(), profile).await?;
        Ok(())
    }
}

/// Remove the token and profile keys from the store
pub async fn purge_persisted_session(
    store: &dyn StateStore,
    config: &AuthConfig,
) -> SessionResult<()> {
    store.delete(&config.token_key()).await?;
    store.delete(&config.profile_key()).await?;
    Ok(())
}
