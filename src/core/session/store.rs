//! Process-wide session state
//!
//! [`SessionStore`] owns the one [`Session`] value of the running client.
//! It can only be changed through `set_authenticated` and `clear_session`,
//! and every change is pushed to subscribers before the call returns.
//!
//! Operations that finish asynchronously (probe, login, protected requests)
//! take a [`Ticket`] when they start. A ticketed transition is dropped if an
//! operation that started later has already changed the session.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use serde::{Deserialize, Serialize};

/// Authenticated principal as returned by the remote API.
///
/// Only `email` is interpreted by the client. Everything else the API sends
/// (expiry, display name, ...) is kept verbatim in `profile`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Identity {
    pub email: String,
    #[serde(flatten)]
    pub profile: serde_json::Map<String, serde_json::Value>,
}

impl Identity {
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            profile: serde_json::Map::new(),
        }
    }
}

/// Authentication status of the client
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Session {
    #[default]
    Unauthenticated,
    Authenticated(Identity),
}

impl Session {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Session::Authenticated(_))
    }

    pub fn identity(&self) -> Option<&Identity> {
        match self {
            Session::Authenticated(identity) => Some(identity),
            Session::Unauthenticated => None,
        }
    }
}

/// Outcome of a ticketed transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// The session changed and subscribers were notified
    Changed,
    /// The session already had that value; nothing was recorded
    Unchanged,
    /// A newer operation already changed the session; nothing was done
    Stale,
}

impl Transition {
    pub fn changed(self) -> bool {
        self == Transition::Changed
    }

    pub fn is_stale(self) -> bool {
        self == Transition::Stale
    }
}

/// Handle returned by [`SessionStore::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener = Arc<dyn Fn(&Session) + Send + Sync>;

struct Inner {
    session: Session,
    /// Sequence number of the newest ticket that changed the session
    applied: u64,
    next_listener: u64,
    listeners: Vec<(SubscriptionId, Listener)>,
}

/// Shared holder of the current [`Session`]
///
/// Cloning is cheap; all clones observe and mutate the same session.
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<RwLock<Inner>>,
    issued: Arc<AtomicU64>,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("session", &self.session())
            .finish()
    }
}

impl SessionStore {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(Inner {
                session: Session::Unauthenticated,
                applied: 0,
                next_listener: 0,
                listeners: Vec::new(),
            })),
            issued: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Snapshot of the current session
    pub fn session(&self) -> Session {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .session
            .clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .session
            .is_authenticated()
    }

    pub fn identity(&self) -> Option<Identity> {
        self.session().identity().cloned()
    }

    /// Mark the client as logged in. Always applies.
    pub fn set_authenticated(&self, identity: Identity) -> Transition {
        self.begin().set_authenticated(identity)
    }

    /// Mark the client as logged out. Always applies.
    pub fn clear_session(&self) -> Transition {
        self.begin().clear_session()
    }

    /// Reserve a place in the operation order before suspending on I/O
    pub fn begin(&self) -> Ticket {
        let seq = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
        Ticket {
            store: self.clone(),
            seq,
        }
    }

    /// Register a listener called synchronously after every change
    pub fn subscribe(&self, listener: impl Fn(&Session) + Send + Sync + 'static) -> SubscriptionId {
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        inner.next_listener += 1;
        let id = SubscriptionId(inner.next_listener);
        inner.listeners.push((id, Arc::new(listener)));
        id
    }

    pub fn unsubscribe(&self, id: SubscriptionId) {
        self.inner
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .listeners
            .retain(|(sid, _)| *sid != id);
    }

    fn apply(&self, seq: u64, next: Session) -> Transition {
        let (snapshot, listeners) = {
            let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
            if seq < inner.applied {
                session_debug!(
                    "Discarding stale session transition (ticket {}, applied {})",
                    seq,
                    inner.applied
                );
                return Transition::Stale;
            }
            // A no-op must not supersede operations still in flight
            if inner.session == next {
                return Transition::Unchanged;
            }
            inner.applied = seq;
            inner.session = next;
            let listeners: Vec<Listener> =
                inner.listeners.iter().map(|(_, l)| Arc::clone(l)).collect();
            (inner.session.clone(), listeners)
        };

        match &snapshot {
            Session::Authenticated(identity) => {
                session_log!("Session authenticated as {}", identity.email)
            }
            Session::Unauthenticated => session_log!("Session cleared"),
        }

        // Listeners run outside the lock so they may read the store again
        for listener in listeners {
            listener(&snapshot);
        }
        Transition::Changed
    }
}

/// Position of an in-flight operation in the store's ordering
#[derive(Debug)]
pub struct Ticket {
    store: SessionStore,
    seq: u64,
}

impl Ticket {
    pub fn seq(&self) -> u64 {
        self.seq
    }

    /// Whether an operation that started later has already changed the store
    pub fn is_superseded(&self) -> bool {
        self.store
            .inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .applied
            > self.seq
    }

    pub fn set_authenticated(self, identity: Identity) -> Transition {
        self.store.apply(self.seq, Session::Authenticated(identity))
    }

    pub fn clear_session(self) -> Transition {
        self.store.apply(self.seq, Session::Unauthenticated)
    }
}
