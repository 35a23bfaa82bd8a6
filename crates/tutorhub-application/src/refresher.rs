//! Shared identity refresh.
//!
//! After a cold start the session is authenticated but has no identity. Every
//! guard that sees this state asks the refresher for the identity; the
//! refresher keeps at most one `get_current_identity` call in flight and lets
//! later guards join it. Each guard holds a [`RefreshTicket`] while it waits.
//! When the last ticket is released the call is cancelled and its result is
//! dropped.

use std::sync::{Arc, Mutex, MutexGuard};

use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tutorhub_core::identity::IdentityClient;

use crate::session_store::{RefreshOutcome, SessionStore};

/// Proof that a guard is waiting on a refresh. Hand it back through
/// [`IdentityRefresher::release`].
#[derive(Debug)]
#[must_use = "a ticket that is never released keeps the refresh alive"]
pub struct RefreshTicket {
    id: u64,
}

#[derive(Debug)]
struct InFlight {
    id: u64,
    interest: usize,
    cancel: CancellationToken,
}

#[derive(Debug, Default)]
struct RefreshState {
    next_id: u64,
    in_flight: Option<InFlight>,
    last_outcome: Option<RefreshOutcome>,
}

/// Single-flight identity refresh shared by all guards of a process.
pub struct IdentityRefresher {
    store: Arc<SessionStore>,
    client: Arc<dyn IdentityClient>,
    state: Mutex<RefreshState>,
    busy: watch::Sender<bool>,
}

impl IdentityRefresher {
    pub fn new(store: Arc<SessionStore>, client: Arc<dyn IdentityClient>) -> Self {
        let (busy, _) = watch::channel(false);
        Self {
            store,
            client,
            state: Mutex::new(RefreshState::default()),
            busy,
        }
    }

    pub fn store(&self) -> &Arc<SessionStore> {
        &self.store
    }

    pub fn is_in_flight(&self) -> bool {
        self.lock().in_flight.is_some()
    }

    /// Outcome of the most recently finished refresh.
    pub fn last_outcome(&self) -> Option<RefreshOutcome> {
        self.lock().last_outcome.clone()
    }

    /// Starts a refresh, or joins the one already running.
    ///
    /// Returns `None` when no tokio runtime is available to run the call.
    pub fn acquire(self: &Arc<Self>) -> Option<RefreshTicket> {
        let mut state = self.lock();

        if let Some(in_flight) = state.in_flight.as_mut() {
            in_flight.interest += 1;
            tracing::debug!(refresh_id = in_flight.id, "Joining identity refresh");
            return Some(RefreshTicket { id: in_flight.id });
        }

        let handle = match Handle::try_current() {
            Ok(handle) => handle,
            Err(_) => {
                tracing::warn!("No async runtime available, identity refresh skipped");
                return None;
            }
        };

        let id = state.next_id;
        state.next_id += 1;
        let cancel = CancellationToken::new();
        state.in_flight = Some(InFlight {
            id,
            interest: 1,
            cancel: cancel.clone(),
        });
        self.busy.send_replace(true);
        drop(state);

        tracing::debug!(refresh_id = id, "Starting identity refresh");
        let this = Arc::clone(self);
        handle.spawn(async move { this.run(id, cancel).await });

        Some(RefreshTicket { id })
    }

    /// Gives up interest in a refresh. The last release cancels it.
    pub fn release(&self, ticket: RefreshTicket) {
        let mut state = self.lock();

        let Some(in_flight) = state.in_flight.as_mut() else {
            return;
        };
        if in_flight.id != ticket.id {
            return;
        }

        in_flight.interest = in_flight.interest.saturating_sub(1);
        if in_flight.interest == 0 {
            tracing::debug!(refresh_id = ticket.id, "Cancelling identity refresh");
            in_flight.cancel.cancel();
            state.in_flight = None;
            self.busy.send_replace(false);
        }
    }

    /// Waits until no refresh is in flight.
    pub async fn settled(&self) {
        let mut busy = self.busy.subscribe();
        // The sender lives in `self`, so the channel cannot close here.
        let _ = busy.wait_for(|busy| !*busy).await;
    }

    async fn run(self: Arc<Self>, id: u64, cancel: CancellationToken) {
        let result = tokio::select! {
            _ = cancel.cancelled() => None,
            result = self.client.get_current_identity() => Some(result),
        };

        let outcome = match result {
            Some(result) => self.store.complete_refresh(result, &cancel),
            None => RefreshOutcome::Cancelled,
        };

        match &outcome {
            RefreshOutcome::Applied => {
                tracing::info!(refresh_id = id, "Identity refreshed");
            }
            RefreshOutcome::Failed(e) if e.is_credential_error() => {
                tracing::info!(refresh_id = id, "Stored credential no longer valid, logged out: {}", e);
            }
            RefreshOutcome::Failed(e) => {
                tracing::warn!(refresh_id = id, "Identity refresh failed, logged out: {}", e);
            }
            RefreshOutcome::Stale => {
                tracing::debug!(refresh_id = id, "Session changed during refresh, result dropped");
            }
            RefreshOutcome::Cancelled => {
                tracing::debug!(refresh_id = id, "Identity refresh cancelled");
            }
        }

        self.finish(id, outcome);
    }

    fn finish(&self, id: u64, outcome: RefreshOutcome) {
        let mut state = self.lock();

        // A cancelled refresh may end after a newer one was started
        if id + 1 == state.next_id {
            state.last_outcome = Some(outcome);
        }

        if state.in_flight.as_ref().is_some_and(|f| f.id == id) {
            state.in_flight = None;
            self.busy.send_replace(false);
        }
    }

    fn lock(&self) -> MutexGuard<'_, RefreshState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
