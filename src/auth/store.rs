//! Session store.
//!
//! Owns the one subscription to the identity provider's change stream for
//! as long as it lives. Readers get cloned snapshots; only the subscription
//! task writes.

use super::{IdentityProvider, Session, User};
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionState {
    /// The initial session fetch is still running.
    #[default]
    Pending,
    SignedOut,
    SignedIn(Session),
}

impl SessionState {
    fn from_session(session: Option<Session>) -> Self {
        match session {
            Some(session) => SessionState::SignedIn(session),
            None => SessionState::SignedOut,
        }
    }

    pub fn session(&self) -> Option<&Session> {
        match self {
            SessionState::SignedIn(session) => Some(session),
            _ => None,
        }
    }

    pub fn user(&self) -> Option<&User> {
        self.session().map(|s| &s.user)
    }
}

pub struct SessionStore {
    state: watch::Receiver<SessionState>,
    task: JoinHandle<()>,
}

impl SessionStore {
    /// Subscribe to `provider` and fetch the initial session on `handle`.
    pub fn spawn<P: IdentityProvider>(provider: Arc<P>, handle: &Handle) -> Self {
        let (tx, state) = watch::channel(SessionState::Pending);
        let task = handle.spawn(async move {
            // Subscribe before the initial fetch so no change is missed.
            let mut changes = provider.subscribe();

            let initial = match provider.get_session().await {
                Ok(session) => session,
                Err(e) => {
                    warn!("Initial session fetch failed: {}", e);
                    None
                }
            };
            let initial = SessionState::from_session(initial);
            info!(
                "Session resolved: {}",
                initial.user().map_or("signed out", User::label)
            );
            tx.send_replace(initial);

            while changes.changed().await.is_ok() {
                let next = SessionState::from_session(changes.borrow_and_update().clone());
                debug!("Session changed (signed in: {})", next.session().is_some());
                tx.send_if_modified(|current| {
                    if *current == next {
                        false
                    } else {
                        *current = next;
                        true
                    }
                });
            }
            debug!("Identity provider closed its change stream");
        });
        Self { state, task }
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> SessionState {
        self.state.borrow().clone()
    }

    pub fn session(&self) -> Option<Session> {
        self.state.borrow().session().cloned()
    }

    pub fn user(&self) -> Option<User> {
        self.state.borrow().user().cloned()
    }

    pub fn is_pending(&self) -> bool {
        matches!(*self.state.borrow(), SessionState::Pending)
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.clone()
    }

    /// Wait until the initial fetch has resolved.
    pub async fn resolved(&self) -> SessionState {
        let mut rx = self.state.clone();
        let result = rx
            .wait_for(|s| !matches!(s, SessionState::Pending))
            .await
            .map(|s| s.clone());
        // The task only ends after resolving, so an error means it was aborted.
        result.unwrap_or(SessionState::SignedOut)
    }
}

impl Drop for SessionStore {
    fn drop(&mut self) {
        self.task.abort();
    }
}
