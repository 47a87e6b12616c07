//! Lock resolution for category checkboxes.
//!
//! A category is locked when one of its members is forced on by something
//! other than this session. Locked categories may still be checked; only the
//! uncheck gesture is refused. Nothing here mutates any set.

use thiserror::Error;

use crate::enablement::EnablementSet;
use crate::relations::disabled_categories;
use crate::working_copy::WorkingCopy;

/// Refusal to uncheck a locked category.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("category '{category}' is locked by forced activities: {}", join(.locked))]
pub struct LockVeto {
    pub category: String,
    pub locked: EnablementSet,
}

fn join(set: &EnablementSet) -> String {
    set.iter().map(String::as_str).collect::<Vec<_>>().join(", ")
}

/// Members of `category_id` that are forced.
pub fn locked_activities(copy: &WorkingCopy, category_id: &str) -> EnablementSet {
    copy.graph()
        .members_of(category_id)
        .into_iter()
        .filter(|activity| copy.is_forced(activity))
        .collect()
}

pub fn is_locked(copy: &WorkingCopy, category_id: &str) -> bool {
    !disabled_categories(copy, category_id).is_empty()
}

/// Check an uncheck gesture before honoring it.
///
/// # Errors
///
/// Returns a [`LockVeto`] naming the forced members when the category is
/// locked.
pub fn check_uncheck(copy: &WorkingCopy, category_id: &str) -> Result<(), LockVeto> {
    if !is_locked(copy, category_id) {
        return Ok(());
    }
    Err(LockVeto {
        category: category_id.to_string(),
        locked: locked_activities(copy, category_id),
    })
}
