//! Transactional overlay over the committed enablement set.
//!
//! A working copy snapshots the committed set when it is opened and is then
//! edited freely. Nothing outside the copy changes until [`WorkingCopy::commit`];
//! dropping the copy is the cancel path.

use std::sync::Arc;

use crate::definitions::ActivityDefinitions;
use crate::enablement::{EnablementDiff, EnablementSet};
use crate::error::Result;
use crate::lock;
use crate::manager::{default_enabled_ids, ActivityManager, CommitOutcome};
use crate::membership::MembershipGraph;
use crate::relations::CategoryPolicy;

/// Result of a category checkbox gesture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToggleOutcome {
    /// The tentative set changed.
    Applied,
    /// The gesture left the tentative set as it was.
    Unchanged,
    /// Unchecking was refused; `locked` holds the forced members.
    Vetoed { locked: EnablementSet },
}

/// Session-scoped, uncommitted copy of the enabled-activity set.
#[derive(Clone)]
pub struct WorkingCopy {
    definitions: Arc<dyn ActivityDefinitions>,
    enabled: EnablementSet,
    policy: CategoryPolicy,
}

impl std::fmt::Debug for WorkingCopy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkingCopy")
            .field("enabled", &self.enabled)
            .field("policy", &self.policy)
            .finish()
    }
}

impl WorkingCopy {
    /// Snapshot the manager's committed set.
    ///
    /// # Errors
    ///
    /// Returns `InvalidState` if the manager has been shut down.
    pub fn open(manager: &ActivityManager) -> Result<Self> {
        manager.ensure_live()?;
        Ok(Self {
            definitions: Arc::clone(manager.definitions()),
            enabled: (*manager.enabled_activity_ids()).clone(),
            policy: CategoryPolicy::default(),
        })
    }

    pub fn with_policy(mut self, policy: CategoryPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn category_policy(&self) -> CategoryPolicy {
        self.policy
    }

    pub fn set_category_policy(&mut self, policy: CategoryPolicy) {
        self.policy = policy;
    }

    pub fn definitions(&self) -> &dyn ActivityDefinitions {
        self.definitions.as_ref()
    }

    pub fn graph(&self) -> &MembershipGraph {
        self.definitions.graph()
    }

    pub fn enabled_activities(&self) -> &EnablementSet {
        &self.enabled
    }

    pub fn defined_activities(&self) -> &EnablementSet {
        self.definitions.defined_activity_ids()
    }

    pub fn is_enabled(&self, activity: &str) -> bool {
        self.enabled.contains(activity)
    }

    pub fn is_forced(&self, activity: &str) -> bool {
        self.definitions.is_forced(activity)
    }

    /// Replace the tentative set. Undefined ids are dropped.
    pub fn set_enabled(&mut self, ids: EnablementSet) {
        self.enabled = ids.clipped_to(self.defined_activities());
    }

    pub fn enable_all(&mut self) {
        self.enabled = self.defined_activities().clone();
        tracing::debug!(count = self.enabled.len(), "working copy: enable all");
    }

    pub fn disable_all(&mut self) {
        self.enabled = EnablementSet::new();
        tracing::debug!("working copy: disable all");
    }

    /// Tentative set := defined activities that are enabled by default.
    ///
    /// Activities whose default flag cannot be read are logged and excluded.
    pub fn reset_to_default(&mut self) {
        self.enabled = default_enabled_ids(self.definitions.as_ref());
        tracing::debug!(count = self.enabled.len(), "working copy: reset to defaults");
    }

    /// Turn a single activity on or off. Undefined ids are ignored.
    ///
    /// Returns `true` if the tentative set changed.
    pub fn set_activity_enabled(&mut self, activity: &str, enabled: bool) -> bool {
        if !self.defined_activities().contains(activity) {
            return false;
        }
        if enabled {
            self.enabled.insert(activity)
        } else {
            self.enabled.remove(activity)
        }
    }

    /// Apply a category checkbox gesture.
    ///
    /// Checking adds every member of the category. Unchecking removes them,
    /// unless the category is locked, in which case the gesture is vetoed and
    /// nothing changes.
    pub fn toggle_category(&mut self, category_id: &str, checked: bool) -> ToggleOutcome {
        let members = self.graph().members_of(category_id);
        if members.is_empty() {
            return ToggleOutcome::Unchanged;
        }

        let next = if checked {
            self.enabled.union(&members)
        } else {
            if let Err(veto) = lock::check_uncheck(self, category_id) {
                tracing::debug!(category = %category_id, "uncheck vetoed by lock");
                return ToggleOutcome::Vetoed {
                    locked: veto.locked,
                };
            }
            self.enabled.difference(&members)
        };

        if next == self.enabled {
            return ToggleOutcome::Unchanged;
        }
        self.enabled = next;
        ToggleOutcome::Applied
    }

    /// Tentative set against the manager's current committed set.
    pub fn diff(&self, manager: &ActivityManager) -> EnablementDiff {
        EnablementDiff::between(&manager.enabled_activity_ids(), &self.enabled)
    }

    pub fn is_dirty(&self, manager: &ActivityManager) -> bool {
        !self.diff(manager).is_empty()
    }

    /// Make the tentative set the committed set and notify listeners.
    ///
    /// Last commit wins: whatever another copy committed in the meantime is
    /// overwritten. The copy stays usable and now mirrors the committed set.
    ///
    /// # Errors
    ///
    /// Returns `InvalidState` if the manager has been shut down, or if called
    /// from an enablement listener during delivery.
    pub fn commit(&mut self, manager: &ActivityManager) -> Result<CommitOutcome> {
        let outcome = manager.set_enabled_activity_ids(self.enabled.clone())?;
        self.enabled = (*manager.enabled_activity_ids()).clone();
        Ok(outcome)
    }
}
