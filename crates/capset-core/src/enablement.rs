//! Enabled-activity sets and the set algebra shared by every component.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Identifier of an activity.
pub type ActivityId = String;

/// A set of activity ids considered "on".
///
/// Ordered so that printing, diffing and test assertions are deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EnablementSet(BTreeSet<ActivityId>);

impl EnablementSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.0.contains(id)
    }

    /// Insert an id. Returns `true` if it was not already present.
    pub fn insert(&mut self, id: impl Into<ActivityId>) -> bool {
        self.0.insert(id.into())
    }

    /// Remove an id. Returns `true` if it was present.
    pub fn remove(&mut self, id: &str) -> bool {
        self.0.remove(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ActivityId> {
        self.0.iter()
    }

    pub fn union(&self, other: &EnablementSet) -> EnablementSet {
        self.0.union(&other.0).cloned().collect()
    }

    pub fn difference(&self, other: &EnablementSet) -> EnablementSet {
        self.0.difference(&other.0).cloned().collect()
    }

    pub fn intersection(&self, other: &EnablementSet) -> EnablementSet {
        self.0.intersection(&other.0).cloned().collect()
    }

    pub fn contains_all(&self, other: &EnablementSet) -> bool {
        other.0.is_subset(&self.0)
    }

    pub fn is_disjoint(&self, other: &EnablementSet) -> bool {
        self.0.is_disjoint(&other.0)
    }

    /// Drop every id that is not part of `universe`.
    pub fn clipped_to(&self, universe: &EnablementSet) -> EnablementSet {
        self.intersection(universe)
    }

    pub fn as_set(&self) -> &BTreeSet<ActivityId> {
        &self.0
    }

    pub fn into_inner(self) -> BTreeSet<ActivityId> {
        self.0
    }
}

impl From<BTreeSet<ActivityId>> for EnablementSet {
    fn from(set: BTreeSet<ActivityId>) -> Self {
        Self(set)
    }
}

impl<S: Into<ActivityId>> FromIterator<S> for EnablementSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

impl<S: Into<ActivityId>> Extend<S> for EnablementSet {
    fn extend<I: IntoIterator<Item = S>>(&mut self, iter: I) {
        self.0.extend(iter.into_iter().map(Into::into));
    }
}

impl IntoIterator for EnablementSet {
    type Item = ActivityId;
    type IntoIter = std::collections::btree_set::IntoIter<ActivityId>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a EnablementSet {
    type Item = &'a ActivityId;
    type IntoIter = std::collections::btree_set::Iter<'a, ActivityId>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Difference between two enablement sets.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnablementDiff {
    /// Ids present in the new set only.
    pub added: EnablementSet,
    /// Ids present in the old set only.
    pub removed: EnablementSet,
}

impl EnablementDiff {
    pub fn between(old: &EnablementSet, new: &EnablementSet) -> Self {
        Self {
            added: new.difference(old),
            removed: old.difference(new),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}
