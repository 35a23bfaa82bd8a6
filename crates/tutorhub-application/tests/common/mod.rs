#![allow(dead_code)]

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::Semaphore;
use tutorhub_application::{IdentityRefresher, SessionStore};
use tutorhub_core::AuthError;
use tutorhub_core::identity::{AuthTokens, Identity, IdentityClient};
use tutorhub_infrastructure::FileKeyValueStore;

/// Identity client returning a fixed response once the gate lets it through.
pub struct FakeIdentityClient {
    response: Result<Identity, AuthError>,
    gate: Semaphore,
    calls: AtomicUsize,
}

impl FakeIdentityClient {
    /// Answers immediately.
    pub fn answering(response: Result<Identity, AuthError>) -> Arc<Self> {
        Arc::new(Self {
            response,
            gate: Semaphore::new(Semaphore::MAX_PERMITS),
            calls: AtomicUsize::new(0),
        })
    }

    /// Blocks every call until [`FakeIdentityClient::open`].
    pub fn gated(response: Result<Identity, AuthError>) -> Arc<Self> {
        Arc::new(Self {
            response,
            gate: Semaphore::new(0),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn open(&self) {
        self.gate.add_permits(1);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl IdentityClient for FakeIdentityClient {
    async fn get_current_identity(&self) -> Result<Identity, AuthError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let _permit = self
            .gate
            .acquire()
            .await
            .map_err(|e| AuthError::Transport(e.to_string()))?;
        self.response.clone()
    }
}

pub fn open_store(dir: &Path) -> Arc<SessionStore> {
    let storage = FileKeyValueStore::new(Some(dir)).unwrap();
    Arc::new(SessionStore::restore(Arc::new(storage)))
}

/// Logs in, then "restarts the process" so the session comes back transient.
pub fn transient_store(dir: &Path) -> Arc<SessionStore> {
    {
        let store = open_store(dir);
        store.record_login(
            Identity::new("u1", false).with_nickname("Mina"),
            AuthTokens::new("token-abc").with_refresh_token("refresh-abc"),
        );
    }
    open_store(dir)
}

pub fn refresher(
    store: Arc<SessionStore>,
    client: Arc<FakeIdentityClient>,
) -> Arc<IdentityRefresher> {
    Arc::new(IdentityRefresher::new(store, client))
}
