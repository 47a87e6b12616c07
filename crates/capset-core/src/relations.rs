//! Derived category queries over a working copy.
//!
//! These feed the category checkboxes and the "related categories" detail
//! panel. All of them are pure functions of the copy's tentative set and the
//! static membership graph, and only ever return visible (non-empty)
//! categories.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::enablement::EnablementSet;
use crate::membership::CategoryId;
use crate::working_copy::WorkingCopy;

/// When a category's checkbox counts as checked.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CategoryPolicy {
    /// Every member activity is enabled.
    #[default]
    All,
    /// At least one member activity is enabled.
    Any,
}

impl CategoryPolicy {
    pub fn is_satisfied(self, members: &EnablementSet, enabled: &EnablementSet) -> bool {
        if members.is_empty() {
            return false;
        }
        match self {
            CategoryPolicy::All => enabled.contains_all(members),
            CategoryPolicy::Any => !enabled.is_disjoint(members),
        }
    }
}

impl std::str::FromStr for CategoryPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(CategoryPolicy::All),
            "any" => Ok(CategoryPolicy::Any),
            other => Err(format!("unknown category policy '{other}' (expected 'all' or 'any')")),
        }
    }
}

/// Whether `category_id` counts as enabled under the copy's policy.
pub fn is_category_enabled(copy: &WorkingCopy, category_id: &str) -> bool {
    let members = copy.graph().members_of(category_id);
    copy.category_policy()
        .is_satisfied(&members, copy.enabled_activities())
}

/// Visible categories that count as enabled in the tentative set.
pub fn enabled_categories(copy: &WorkingCopy) -> BTreeSet<CategoryId> {
    copy.graph()
        .visible_categories()
        .filter(|c| {
            copy.category_policy()
                .is_satisfied(&c.activities, copy.enabled_activities())
        })
        .map(|c| c.id.clone())
        .collect()
}

/// Members of a category, or the activity itself when `id` names one.
fn subject_activities(copy: &WorkingCopy, id: &str) -> EnablementSet {
    let graph = copy.graph();
    if graph.category(id).is_some() {
        graph.members_of(id)
    } else if graph.activity(id).is_some() {
        std::iter::once(id).collect()
    } else {
        EnablementSet::new()
    }
}

/// Categories that cannot be disabled together with `id`.
///
/// `id` may name a category or a single activity. The result holds every
/// visible category, `id` itself included, that contains one of the subject's
/// forced activities.
pub fn disabled_categories(copy: &WorkingCopy, id: &str) -> BTreeSet<CategoryId> {
    let graph = copy.graph();
    subject_activities(copy, id)
        .iter()
        .filter(|activity| copy.is_forced(activity))
        .flat_map(|activity| graph.categories_containing(activity))
        .filter(|category| graph.category(category).is_some_and(|c| c.is_visible()))
        .collect()
}

/// Other visible categories whose membership is a subset of `category_id`'s.
pub fn contained_categories(copy: &WorkingCopy, category_id: &str) -> BTreeSet<CategoryId> {
    let members = copy.graph().members_of(category_id);
    if members.is_empty() {
        return BTreeSet::new();
    }
    copy.graph()
        .visible_categories()
        .filter(|other| other.id != category_id)
        .filter(|other| members.contains_all(&other.activities))
        .map(|other| other.id.clone())
        .collect()
}

/// Other categories that are not enabled yet but would be after checking
/// `category_id`, taking activity requirements into account.
pub fn categories_enabled_by(copy: &WorkingCopy, category_id: &str) -> BTreeSet<CategoryId> {
    let graph = copy.graph();
    let members = graph.members_of(category_id);
    if members.is_empty() {
        return BTreeSet::new();
    }
    let expanded = graph.expand_requirements(&members);
    graph
        .visible_categories()
        .filter(|other| other.id != category_id)
        .filter(|other| !is_category_enabled(copy, &other.id))
        .filter(|other| expanded.contains_all(&graph.expand_requirements(&other.activities)))
        .map(|other| other.id.clone())
        .collect()
}

/// Other enabled categories that would lose an activity if `category_id`
/// were unchecked.
pub fn categories_disabled_by(copy: &WorkingCopy, category_id: &str) -> BTreeSet<CategoryId> {
    let graph = copy.graph();
    let members = graph.members_of(category_id);
    if members.is_empty() {
        return BTreeSet::new();
    }
    graph
        .visible_categories()
        .filter(|other| other.id != category_id)
        .filter(|other| !members.is_disjoint(&other.activities))
        .filter(|other| is_category_enabled(copy, &other.id))
        .map(|other| other.id.clone())
        .collect()
}
