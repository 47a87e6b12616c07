//! Static membership graph between categories and activities.
//!
//! Built once from host-supplied definitions and never mutated afterwards.
//! Every query is a pure read.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::enablement::{ActivityId, EnablementSet};
use crate::error::{CoreError, Result};

/// Identifier of a category.
pub type CategoryId = String;

/// Definition of an independently toggleable activity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Activity {
    pub id: ActivityId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Whether the activity is on in a fresh installation.
    /// `None` means the definition does not say.
    #[serde(default)]
    pub default_enabled: Option<bool>,
    /// Enabled by a mechanism other than user toggling.
    #[serde(default)]
    pub forced: bool,
    /// Activities this one depends on.
    #[serde(default)]
    pub requires: BTreeSet<ActivityId>,
}

impl Activity {
    pub fn new(id: &str, name: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            description: None,
            default_enabled: None,
            forced: false,
            requires: BTreeSet::new(),
        }
    }

    pub fn default_enabled(mut self, enabled: bool) -> Self {
        self.default_enabled = Some(enabled);
        self
    }

    pub fn forced(mut self) -> Self {
        self.forced = true;
        self
    }

    pub fn requires(mut self, id: &str) -> Self {
        self.requires.insert(id.to_string());
        self
    }
}

/// A named, user-facing grouping of activities.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub activities: EnablementSet,
}

impl Category {
    pub fn new<I, S>(id: &str, name: &str, activities: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<ActivityId>,
    {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            description: None,
            activities: activities.into_iter().collect(),
        }
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    /// Empty categories are never shown.
    pub fn is_visible(&self) -> bool {
        !self.activities.is_empty()
    }
}

/// Read-only many-to-many mapping between categories and activities.
#[derive(Debug, Clone, Default)]
pub struct MembershipGraph {
    activities: BTreeMap<ActivityId, Activity>,
    categories: BTreeMap<CategoryId, Category>,
    containing: BTreeMap<ActivityId, BTreeSet<CategoryId>>,
    universe: EnablementSet,
}

impl MembershipGraph {
    /// Build the graph.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` for duplicate or empty ids, and for category
    /// members or requirements that are not defined activities.
    pub fn new(activities: Vec<Activity>, categories: Vec<Category>) -> Result<Self> {
        let mut by_id = BTreeMap::new();
        for activity in activities {
            if activity.id.is_empty() {
                return Err(CoreError::invalid_argument("activity with empty id"));
            }
            let id = activity.id.clone();
            if by_id.insert(id.clone(), activity).is_some() {
                return Err(CoreError::invalid_argument(format!(
                    "duplicate activity id '{id}'"
                )));
            }
        }

        for activity in by_id.values() {
            if let Some(missing) = activity.requires.iter().find(|r| !by_id.contains_key(*r)) {
                return Err(CoreError::invalid_argument(format!(
                    "activity '{}' requires undefined activity '{missing}'",
                    activity.id
                )));
            }
        }

        let mut by_category = BTreeMap::new();
        let mut containing: BTreeMap<ActivityId, BTreeSet<CategoryId>> = BTreeMap::new();
        for category in categories {
            if category.id.is_empty() {
                return Err(CoreError::invalid_argument("category with empty id"));
            }
            if by_category.contains_key(&category.id) {
                return Err(CoreError::invalid_argument(format!(
                    "duplicate category id '{}'",
                    category.id
                )));
            }
            for member in &category.activities {
                if !by_id.contains_key(member) {
                    return Err(CoreError::invalid_argument(format!(
                        "category '{}' references undefined activity '{member}'",
                        category.id
                    )));
                }
                containing
                    .entry(member.clone())
                    .or_default()
                    .insert(category.id.clone());
            }
            by_category.insert(category.id.clone(), category);
        }

        let universe = by_id.keys().cloned().collect();
        Ok(Self {
            activities: by_id,
            categories: by_category,
            containing,
            universe,
        })
    }

    /// Every defined activity id.
    pub fn defined_activity_ids(&self) -> &EnablementSet {
        &self.universe
    }

    /// Every defined category id, including empty ones.
    pub fn defined_category_ids(&self) -> BTreeSet<CategoryId> {
        self.categories.keys().cloned().collect()
    }

    pub fn activity(&self, id: &str) -> Option<&Activity> {
        self.activities.get(id)
    }

    pub fn activities(&self) -> impl Iterator<Item = &Activity> {
        self.activities.values()
    }

    pub fn category(&self, id: &str) -> Option<&Category> {
        self.categories.get(id)
    }

    /// Defined membership of a category; empty for unknown ids.
    pub fn members_of(&self, category_id: &str) -> EnablementSet {
        self.categories
            .get(category_id)
            .map(|c| c.activities.clone())
            .unwrap_or_default()
    }

    /// Categories whose membership includes `activity_id`.
    pub fn categories_containing(&self, activity_id: &str) -> BTreeSet<CategoryId> {
        self.containing
            .get(activity_id)
            .cloned()
            .unwrap_or_default()
    }

    /// Map category ids to categories, dropping undefined and empty ones.
    ///
    /// The order is stable but carries no meaning.
    pub fn resolve_categories<'a, I>(&self, ids: I) -> Vec<&Category>
    where
        I: IntoIterator<Item = &'a CategoryId>,
    {
        let wanted: BTreeSet<&CategoryId> = ids.into_iter().collect();
        wanted
            .into_iter()
            .filter_map(|id| self.categories.get(id))
            .filter(|c| c.is_visible())
            .collect()
    }

    /// All categories that have at least one member.
    pub fn visible_categories(&self) -> impl Iterator<Item = &Category> {
        self.categories.values().filter(|c| c.is_visible())
    }

    /// Transitive closure of `ids` over activity requirements.
    pub fn expand_requirements(&self, ids: &EnablementSet) -> EnablementSet {
        let mut expanded = EnablementSet::new();
        let mut pending: Vec<&str> = ids.iter().map(String::as_str).collect();
        while let Some(id) = pending.pop() {
            let Some(activity) = self.activities.get(id) else {
                continue;
            };
            if !expanded.insert(id) {
                continue;
            }
            pending.extend(activity.requires.iter().map(String::as_str));
        }
        expanded
    }
}
