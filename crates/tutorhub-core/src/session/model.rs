//! Session domain model.

use serde::{Deserialize, Serialize};

use crate::identity::Identity;

/// The local record of whether, and as whom, the process believes the user
/// is logged in.
///
/// Fields are private so the invariant "logged out implies no identity"
/// holds by construction. The one state that is allowed to exist without an
/// identity while authenticated is the *transient* state produced by
/// [`Session::restored`] after a cold start.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Session {
    identity: Option<Identity>,
    authenticated: bool,
}

impl Session {
    /// The logged-out session.
    pub fn logged_out() -> Self {
        Self::default()
    }

    /// An authenticated session with a loaded identity.
    pub fn with_identity(identity: Identity) -> Self {
        Self {
            identity: Some(identity),
            authenticated: true,
        }
    }

    /// A session rebuilt from the persisted flag alone.
    ///
    /// `restored(true)` is the transient state: authenticated, identity not
    /// yet re-fetched.
    pub fn restored(authenticated: bool) -> Self {
        Self {
            identity: None,
            authenticated,
        }
    }

    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    /// True only when an identity is loaded and carries the privileged role.
    pub fn is_privileged(&self) -> bool {
        self.identity
            .as_ref()
            .map(Identity::is_privileged)
            .unwrap_or(false)
    }

    /// Authenticated, but the identity has not been fetched yet.
    pub fn is_transient(&self) -> bool {
        self.authenticated && self.identity.is_none()
    }

    /// Builds the persisted form of this session.
    pub fn to_snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            identity: self.identity.clone().map(Identity::without_credentials),
            authenticated: self.authenticated,
        }
    }
}

/// Serializable `{identity, authenticated}` pair.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SessionSnapshot {
    #[serde(default)]
    pub identity: Option<Identity>,
    #[serde(default)]
    pub authenticated: bool,
}

/// Envelope written under the session namespace key.
///
/// `version` lets a future layout change recognise old entries.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PersistedSession {
    pub state: SessionSnapshot,
    #[serde(default)]
    pub version: u32,
}

impl PersistedSession {
    /// Current layout version.
    pub const VERSION: u32 = 0;

    pub fn new(state: SessionSnapshot) -> Self {
        Self {
            state,
            version: Self::VERSION,
        }
    }
}
