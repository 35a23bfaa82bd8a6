//! Per-mount route guards.
//!
//! A guard is created when a protected view mounts and dropped when it
//! unmounts. Each evaluation reads one session snapshot and returns the
//! decision for it. When that snapshot is authenticated without an identity,
//! the guard also requests the identity, once per mount; the result shows up
//! on the next evaluation.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use tutorhub_core::guard::{GuardDecision, RouteRequirements, decide, decide_guest};

use crate::refresher::{IdentityRefresher, RefreshTicket};
use crate::session_store::SessionStore;

/// Guard for views that need a login, and possibly the privileged role.
pub struct RouteGuard {
    requirements: RouteRequirements,
    refresher: Arc<IdentityRefresher>,
    requested: AtomicBool,
    ticket: Mutex<Option<RefreshTicket>>,
}

impl RouteGuard {
    pub fn mount(requirements: RouteRequirements, refresher: Arc<IdentityRefresher>) -> Self {
        Self {
            requirements,
            refresher,
            requested: AtomicBool::new(false),
            ticket: Mutex::new(None),
        }
    }

    pub fn requirements(&self) -> RouteRequirements {
        self.requirements
    }

    /// Decides whether `location` may render.
    pub fn evaluate(&self, location: &str) -> GuardDecision {
        let session = self.refresher.store().snapshot();
        let decision = decide(self.requirements, &session, location);
        tracing::debug!(location, ?decision, "Route guard evaluated");

        if session.is_transient() && !self.requested.swap(true, Ordering::SeqCst) {
            match self.refresher.acquire() {
                Some(ticket) => {
                    let mut slot = self
                        .ticket
                        .lock()
                        .unwrap_or_else(|poisoned| poisoned.into_inner());
                    *slot = Some(ticket);
                }
                // Nothing was started, so the next evaluation may try again
                None => self.requested.store(false, Ordering::SeqCst),
            }
        }

        decision
    }

    /// Whether this mount has already asked for the identity.
    pub fn refresh_requested(&self) -> bool {
        self.requested.load(Ordering::SeqCst)
    }

    /// Unmounts the guard. A refresh nobody else waits for is cancelled and
    /// its result dropped.
    pub fn unmount(self) {
        drop(self);
    }
}

impl Drop for RouteGuard {
    fn drop(&mut self) {
        let ticket = self
            .ticket
            .get_mut()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take();
        if let Some(ticket) = ticket {
            self.refresher.release(ticket);
        }
    }
}

/// Guard for views only logged-out users should see (login, registration).
pub struct GuestGuard {
    store: Arc<SessionStore>,
}

impl GuestGuard {
    pub fn mount(store: Arc<SessionStore>) -> Self {
        Self { store }
    }

    pub fn evaluate(&self) -> GuardDecision {
        let decision = decide_guest(&self.store.snapshot());
        tracing::debug!(?decision, "Guest guard evaluated");
        decision
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use tutorhub_core::AuthError;
    use tutorhub_core::identity::{Identity, IdentityClient};
    use tutorhub_core::session::KeyValueStore;

    #[derive(Default)]
    struct MapStore(Mutex<HashMap<String, String>>);

    impl KeyValueStore for MapStore {
        fn get_item(&self, key: &str) -> tutorhub_core::Result<Option<String>> {
            Ok(self.0.lock().unwrap().get(key).cloned())
        }

        fn set_item(&self, key: &str, value: &str) -> tutorhub_core::Result<()> {
            self.0.lock().unwrap().insert(key.into(), value.into());
            Ok(())
        }

        fn remove_item(&self, key: &str) -> tutorhub_core::Result<()> {
            self.0.lock().unwrap().remove(key);
            Ok(())
        }
    }

    struct UnreachableClient;

    #[async_trait]
    impl IdentityClient for UnreachableClient {
        async fn get_current_identity(&self) -> Result<Identity, AuthError> {
            Err(AuthError::Transport("unreachable".into()))
        }
    }

    fn refresher() -> Arc<IdentityRefresher> {
        let store = Arc::new(SessionStore::restore(Arc::new(MapStore::default())));
        Arc::new(IdentityRefresher::new(store, Arc::new(UnreachableClient)))
    }

    #[test]
    fn test_logged_out_is_sent_to_login() {
        let guard = RouteGuard::mount(RouteRequirements::AUTHENTICATED, refresher());
        assert_eq!(
            guard.evaluate("/user/profile?tab=1"),
            GuardDecision::RedirectLogin {
                return_to: "/user/profile?tab=1".to_string()
            }
        );
        assert!(!guard.refresh_requested());
    }

    #[test]
    fn test_roles() {
        let refresher = refresher();
        let privileged = RouteGuard::mount(RouteRequirements::PRIVILEGED, refresher.clone());

        refresher.store().set_identity(Identity::new("s1", false));
        assert_eq!(privileged.evaluate("/teacher/dashboard"), GuardDecision::RedirectHome);

        refresher.store().set_identity(Identity::new("t1", true));
        assert_eq!(privileged.evaluate("/teacher/dashboard"), GuardDecision::Allowed);
    }

    #[test]
    fn test_guest_guard() {
        let refresher = refresher();
        let guest = GuestGuard::mount(refresher.store().clone());
        assert_eq!(guest.evaluate(), GuardDecision::Allowed);

        refresher.store().set_identity(Identity::new("s1", false));
        assert_eq!(guest.evaluate(), GuardDecision::RedirectHome);
    }
}
