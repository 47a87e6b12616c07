//! Listener registry for committed enablement changes.
//!
//! Delivery is synchronous and in subscription order. Each listener runs in
//! isolation: a listener that returns an error or panics is logged and
//! recorded, and the remaining listeners still receive the event.

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::enablement::{EnablementDiff, EnablementSet};
use crate::error::ListenerError;

/// A committed change of the enabled-activity set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnablementEvent {
    /// Committed set immediately before the commit.
    pub old: Arc<EnablementSet>,
    /// Committed set after the commit.
    pub new: Arc<EnablementSet>,
    pub at: DateTime<Utc>,
}

impl EnablementEvent {
    pub fn new(old: Arc<EnablementSet>, new: Arc<EnablementSet>) -> Self {
        Self {
            old,
            new,
            at: Utc::now(),
        }
    }

    pub fn have_enabled_activities_changed(&self) -> bool {
        self.old != self.new
    }

    pub fn diff(&self) -> EnablementDiff {
        EnablementDiff::between(&self.old, &self.new)
    }

    pub fn added(&self) -> EnablementSet {
        self.new.difference(&self.old)
    }

    pub fn removed(&self) -> EnablementSet {
        self.old.difference(&self.new)
    }
}

/// Receives committed enablement changes.
pub trait EnablementListener: Send + Sync {
    fn enablement_changed(&self, event: &EnablementEvent) -> Result<(), ListenerError>;
}

impl<F> EnablementListener for F
where
    F: Fn(&EnablementEvent) -> Result<(), ListenerError> + Send + Sync,
{
    fn enablement_changed(&self, event: &EnablementEvent) -> Result<(), ListenerError> {
        self(event)
    }
}

/// Handle returned by [`ChangeNotifier::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

/// A listener that failed during one delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListenerFailure {
    pub listener: ListenerId,
    pub error: ListenerError,
}

/// Outcome of one [`ChangeNotifier::notify`] call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeliveryReport {
    pub delivered: usize,
    pub failures: Vec<ListenerFailure>,
}

impl DeliveryReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

type Registration = (ListenerId, Arc<dyn EnablementListener>);

/// Ordered registry of enablement listeners.
#[derive(Default)]
pub struct ChangeNotifier {
    listeners: RwLock<Vec<Registration>>,
    next_id: AtomicU64,
}

impl std::fmt::Debug for ChangeNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChangeNotifier")
            .field("listeners", &self.len())
            .finish()
    }
}

impl ChangeNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe<L>(&self, listener: L) -> ListenerId
    where
        L: EnablementListener + 'static,
    {
        self.subscribe_arc(Arc::new(listener))
    }

    /// Register a closure.
    pub fn subscribe_fn<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(&EnablementEvent) -> Result<(), ListenerError> + Send + Sync + 'static,
    {
        self.subscribe(listener)
    }

    pub fn subscribe_arc(&self, listener: Arc<dyn EnablementListener>) -> ListenerId {
        let id = ListenerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.listeners.write().push((id, listener));
        id
    }

    /// Remove a listener. Returns `false` if it was not registered.
    pub fn unsubscribe(&self, id: ListenerId) -> bool {
        let mut listeners = self.listeners.write();
        let before = listeners.len();
        listeners.retain(|(registered, _)| *registered != id);
        listeners.len() != before
    }

    pub fn len(&self) -> usize {
        self.listeners.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Deliver `event` to every listener registered at call time.
    ///
    /// The registry is snapshotted first, so listeners may subscribe or
    /// unsubscribe from inside a callback; that takes effect next time.
    pub fn notify(&self, event: &EnablementEvent) -> DeliveryReport {
        let snapshot: Vec<Registration> = self.listeners.read().clone();
        let mut report = DeliveryReport::default();

        for (id, listener) in snapshot {
            let outcome = catch_unwind(AssertUnwindSafe(|| listener.enablement_changed(event)));
            let error = match outcome {
                Ok(Ok(())) => {
                    report.delivered += 1;
                    continue;
                }
                Ok(Err(error)) => error,
                Err(panic) => ListenerError::new(panic_message(panic.as_ref())),
            };
            tracing::warn!(listener = ?id, error = %error, "enablement listener failed");
            report.failures.push(ListenerFailure {
                listener: id,
                error,
            });
        }

        report
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        format!("listener panicked: {message}")
    } else if let Some(message) = payload.downcast_ref::<String>() {
        format!("listener panicked: {message}")
    } else {
        "listener panicked".to_string()
    }
}
