//! Session store: the single source of truth for who is logged in.
//!
//! The store owns the [`Session`] and is the only writer. Every write takes
//! the write lock, updates memory, persists the snapshot and publishes the new
//! session to subscribers before releasing the lock, so readers always see a
//! consistent `{identity, authenticated}` pair.

use std::sync::{Arc, RwLock, RwLockWriteGuard};

use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tutorhub_core::AuthError;
use tutorhub_core::identity::{AuthTokens, Identity};
use tutorhub_core::session::{
    ACCESS_TOKEN_KEY, CREDENTIAL_KEYS, KeyValueStore, PersistedSession, REFRESH_TOKEN_KEY,
    SESSION_NAMESPACE, Session,
};

/// What happened to a finished identity refresh.
#[derive(Debug, Clone, PartialEq)]
pub enum RefreshOutcome {
    /// The fetched identity was stored.
    Applied,
    /// The fetch failed and the session was cleared.
    Failed(AuthError),
    /// The session changed while the fetch was running (explicit login or
    /// logout), so the result was dropped.
    Stale,
    /// Every guard waiting for the result unmounted first.
    Cancelled,
}

/// Process-wide session state, persisted to a [`KeyValueStore`].
pub struct SessionStore {
    state: RwLock<Session>,
    storage: Arc<dyn KeyValueStore>,
    changes: watch::Sender<Session>,
}

impl SessionStore {
    /// Rebuilds the store from durable storage.
    ///
    /// An empty, unreadable or corrupt entry yields a logged-out session. A
    /// persisted `authenticated = true` comes back in the transient form:
    /// authenticated, with the identity left for the guard to re-fetch.
    pub fn restore(storage: Arc<dyn KeyValueStore>) -> Self {
        let session = Self::load_session(storage.as_ref());
        tracing::debug!(
            authenticated = session.is_authenticated(),
            "Session restored"
        );
        let (changes, _) = watch::channel(session.clone());
        Self {
            state: RwLock::new(session),
            storage,
            changes,
        }
    }

    fn load_session(storage: &dyn KeyValueStore) -> Session {
        let raw = match storage.get_item(SESSION_NAMESPACE) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Session::logged_out(),
            Err(e) => {
                tracing::warn!("Failed to read persisted session, starting logged out: {}", e);
                return Session::logged_out();
            }
        };

        match serde_json::from_str::<PersistedSession>(&raw) {
            Ok(persisted) => Session::restored(persisted.state.authenticated),
            Err(e) => {
                tracing::warn!("Ignoring corrupt persisted session: {}", e);
                Session::logged_out()
            }
        }
    }

    /// A consistent copy of the current session.
    pub fn snapshot(&self) -> Session {
        self.read().clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.read().is_authenticated()
    }

    /// Whether the loaded identity carries the privileged (teacher) role.
    /// False while no identity is loaded.
    pub fn is_privileged(&self) -> bool {
        self.read().is_privileged()
    }

    pub fn identity(&self) -> Option<Identity> {
        self.read().identity().cloned()
    }

    /// Receives every session written from now on.
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.changes.subscribe()
    }

    /// Stores `identity` and marks the session authenticated.
    pub fn set_identity(&self, identity: Identity) {
        let mut state = self.write();
        self.commit(&mut state, Session::with_identity(identity.without_credentials()));
    }

    /// Logs out: drops the identity and erases stored credentials.
    /// Calling it again is a no-op apart from rewriting the same state.
    pub fn clear(&self) {
        let mut state = self.write();
        self.remove_credentials();
        self.commit(&mut state, Session::logged_out());
    }

    /// Records a successful login performed by the external auth flow.
    pub fn record_login(&self, identity: Identity, tokens: AuthTokens) {
        let mut state = self.write();

        if let Err(e) = self.storage.set_item(ACCESS_TOKEN_KEY, &tokens.access_token) {
            tracing::warn!("Failed to persist access token: {}", e);
        }
        let refresh = match &tokens.refresh_token {
            Some(token) => self.storage.set_item(REFRESH_TOKEN_KEY, token),
            None => self.storage.remove_item(REFRESH_TOKEN_KEY),
        };
        if let Err(e) = refresh {
            tracing::warn!("Failed to persist refresh token: {}", e);
        }

        tracing::info!(user_id = %identity.id, "Login recorded");
        self.commit(&mut state, Session::with_identity(identity.without_credentials()));
    }

    /// The stored bearer token, if any.
    pub fn access_token(&self) -> Option<String> {
        match self.storage.get_item(ACCESS_TOKEN_KEY) {
            Ok(token) => token,
            Err(e) => {
                tracing::warn!("Failed to read access token: {}", e);
                None
            }
        }
    }

    /// Applies a refresh result, unless the session stopped being transient
    /// or the refresh was cancelled while the call was running.
    pub(crate) fn complete_refresh(
        &self,
        result: Result<Identity, AuthError>,
        cancel: &CancellationToken,
    ) -> RefreshOutcome {
        let mut state = self.write();

        if cancel.is_cancelled() {
            return RefreshOutcome::Cancelled;
        }
        if !state.is_transient() {
            return RefreshOutcome::Stale;
        }

        match result {
            Ok(identity) => {
                self.commit(&mut state, Session::with_identity(identity.without_credentials()));
                RefreshOutcome::Applied
            }
            Err(error) => {
                self.remove_credentials();
                self.commit(&mut state, Session::logged_out());
                RefreshOutcome::Failed(error)
            }
        }
    }

    fn commit(&self, state: &mut RwLockWriteGuard<'_, Session>, next: Session) {
        **state = next;
        self.persist(state);
        self.changes.send_replace((**state).clone());
    }

    fn persist(&self, session: &Session) {
        let persisted = PersistedSession::new(session.to_snapshot());
        let result = serde_json::to_string(&persisted)
            .map_err(tutorhub_core::TutorhubError::from)
            .and_then(|json| self.storage.set_item(SESSION_NAMESPACE, &json));

        if let Err(e) = result {
            tracing::warn!("Failed to persist session: {}", e);
        }
    }

    fn remove_credentials(&self) {
        for key in CREDENTIAL_KEYS {
            if let Err(e) = self.storage.remove_item(key) {
                tracing::warn!("Failed to remove {}: {}", key, e);
            }
        }
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Session> {
        self.state
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, Session> {
        self.state
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
