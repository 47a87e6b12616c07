//! Process-wide owner of the committed enablement set.
//!
//! Readers get complete `Arc` snapshots. Writers go through
//! [`ActivityManager::set_enabled_activity_ids`], which serializes commits and
//! notifies listeners after the new snapshot is in place. Concurrent working
//! copies are not merged: the last commit wins.
//!
//! Listeners run while the commit lock is held. A listener may read the
//! manager, open working copies or shut it down, but committing from inside
//! a delivery is refused with `InvalidState`.

use parking_lot::{Mutex, RwLock};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::ThreadId;

use crate::definitions::ActivityDefinitions;
use crate::enablement::EnablementSet;
use crate::error::{CoreError, ListenerError, Result};
use crate::membership::MembershipGraph;
use crate::notifier::{
    ChangeNotifier, DeliveryReport, EnablementEvent, EnablementListener, ListenerId,
};
use crate::working_copy::WorkingCopy;

/// Result of a commit.
///
/// Every commit delivers exactly one event, including commits that leave the
/// committed set as it was (`old == new`).
#[derive(Debug, Clone, PartialEq)]
pub struct CommitOutcome {
    pub event: EnablementEvent,
    pub delivery: DeliveryReport,
}

impl CommitOutcome {
    /// Whether the committed set actually changed.
    pub fn changed(&self) -> bool {
        self.event.have_enabled_activities_changed()
    }
}

/// Marks the current thread as delivering for as long as it lives.
struct DeliveryMark<'a>(&'a Mutex<Option<ThreadId>>);

impl<'a> DeliveryMark<'a> {
    fn enter(slot: &'a Mutex<Option<ThreadId>>) -> Self {
        *slot.lock() = Some(std::thread::current().id());
        Self(slot)
    }
}

impl Drop for DeliveryMark<'_> {
    fn drop(&mut self) {
        *self.0.lock() = None;
    }
}

/// Owner of the single committed enablement set.
pub struct ActivityManager {
    definitions: Arc<dyn ActivityDefinitions>,
    committed: RwLock<Arc<EnablementSet>>,
    commit_lock: Mutex<()>,
    /// Thread currently delivering a commit to listeners.
    delivering: Mutex<Option<ThreadId>>,
    notifier: ChangeNotifier,
    shut_down: AtomicBool,
}

impl std::fmt::Debug for ActivityManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActivityManager")
            .field("committed", &*self.committed.read())
            .field("notifier", &self.notifier)
            .field("shut_down", &self.is_shut_down())
            .finish()
    }
}

impl ActivityManager {
    /// Create a manager whose committed set starts as `initial`, clipped to
    /// the defined universe.
    pub fn new(definitions: Arc<dyn ActivityDefinitions>, initial: EnablementSet) -> Self {
        let initial = initial.clipped_to(definitions.defined_activity_ids());
        Self {
            definitions,
            committed: RwLock::new(Arc::new(initial)),
            commit_lock: Mutex::new(()),
            delivering: Mutex::new(None),
            notifier: ChangeNotifier::new(),
            shut_down: AtomicBool::new(false),
        }
    }

    /// Create a manager whose committed set starts from the default flags.
    pub fn with_defaults(definitions: Arc<dyn ActivityDefinitions>) -> Self {
        let initial = default_enabled_ids(definitions.as_ref());
        Self::new(definitions, initial)
    }

    pub fn definitions(&self) -> &Arc<dyn ActivityDefinitions> {
        &self.definitions
    }

    pub fn graph(&self) -> &MembershipGraph {
        self.definitions.graph()
    }

    pub fn defined_activity_ids(&self) -> &EnablementSet {
        self.definitions.defined_activity_ids()
    }

    pub fn is_forced(&self, activity: &str) -> bool {
        self.definitions.is_forced(activity)
    }

    /// Snapshot of the committed set.
    pub fn enabled_activity_ids(&self) -> Arc<EnablementSet> {
        Arc::clone(&self.committed.read())
    }

    pub fn is_shut_down(&self) -> bool {
        self.shut_down.load(Ordering::Acquire)
    }

    /// Tear the manager down. Later working copies and commits fail.
    ///
    /// May be called from a listener; the commit being delivered has already
    /// been applied.
    pub fn shutdown(&self) {
        if self.delivering_on_current_thread() {
            // The delivering commit holds the commit lock.
            self.shut_down.store(true, Ordering::Release);
        } else {
            let _guard = self.commit_lock.lock();
            self.shut_down.store(true, Ordering::Release);
        }
        tracing::debug!("activity manager shut down");
    }

    fn delivering_on_current_thread(&self) -> bool {
        *self.delivering.lock() == Some(std::thread::current().id())
    }

    pub(crate) fn ensure_live(&self) -> Result<()> {
        if self.is_shut_down() {
            return Err(CoreError::invalid_state("activity manager has been shut down"));
        }
        Ok(())
    }

    /// Open a working copy over the current committed set.
    ///
    /// # Errors
    ///
    /// Returns `InvalidState` if the manager has been shut down.
    pub fn create_working_copy(&self) -> Result<WorkingCopy> {
        WorkingCopy::open(self)
    }

    /// Replace the committed set and notify listeners.
    ///
    /// `ids` is clipped to the defined universe. Listeners are notified once
    /// per call, also when the set did not change. Listener failures are
    /// reported in the outcome, never returned as errors.
    ///
    /// # Errors
    ///
    /// Returns `InvalidState` if the manager has been shut down, or if called
    /// from a listener while a commit is being delivered.
    pub fn set_enabled_activity_ids(&self, ids: EnablementSet) -> Result<CommitOutcome> {
        if self.delivering_on_current_thread() {
            return Err(CoreError::invalid_state(
                "cannot commit from an enablement listener during delivery",
            ));
        }
        let _guard = self.commit_lock.lock();
        self.ensure_live()?;

        let next = ids.clipped_to(self.defined_activity_ids());
        let (old, new) = {
            let mut committed = self.committed.write();
            if **committed == next {
                let current = Arc::clone(&committed);
                (Arc::clone(&current), current)
            } else {
                let new = Arc::new(next);
                (std::mem::replace(&mut *committed, Arc::clone(&new)), new)
            }
        };

        let event = EnablementEvent::new(old, new);
        tracing::debug!(
            changed = event.have_enabled_activities_changed(),
            added = event.added().len(),
            removed = event.removed().len(),
            "committed enabled activities"
        );
        let delivery = {
            let _mark = DeliveryMark::enter(&self.delivering);
            self.notifier.notify(&event)
        };
        Ok(CommitOutcome { event, delivery })
    }

    /// Commit the default-enabled set.
    ///
    /// # Errors
    ///
    /// Same as [`ActivityManager::set_enabled_activity_ids`].
    pub fn reset_to_defaults(&self) -> Result<CommitOutcome> {
        self.set_enabled_activity_ids(default_enabled_ids(self.definitions.as_ref()))
    }

    pub fn notifier(&self) -> &ChangeNotifier {
        &self.notifier
    }

    pub fn subscribe<L>(&self, listener: L) -> ListenerId
    where
        L: EnablementListener + 'static,
    {
        self.notifier.subscribe(listener)
    }

    pub fn subscribe_fn<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(&EnablementEvent) -> std::result::Result<(), ListenerError> + Send + Sync + 'static,
    {
        self.notifier.subscribe_fn(listener)
    }

    pub fn unsubscribe(&self, id: ListenerId) -> bool {
        self.notifier.unsubscribe(id)
    }
}

/// Defined activities whose default flag is set.
///
/// An activity whose flag cannot be read is logged and left out; it never
/// aborts the computation.
pub fn default_enabled_ids(definitions: &dyn ActivityDefinitions) -> EnablementSet {
    let mut enabled = EnablementSet::new();
    for id in definitions.defined_activity_ids() {
        match definitions.is_default_enabled(id) {
            Ok(true) => {
                enabled.insert(id.as_str());
            }
            Ok(false) => {}
            Err(e) => {
                tracing::warn!(activity = %id, error = %e, "skipping activity with unreadable default");
            }
        }
    }
    enabled
}
