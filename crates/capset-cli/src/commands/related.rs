//! Related-categories detail panel.

use std::collections::BTreeSet;
use std::path::Path;

use capset_core::relations::{
    categories_disabled_by, categories_enabled_by, contained_categories, disabled_categories,
};
use serde::Serialize;

use super::session::{join_ids, Session, SessionArgs};

#[derive(Debug, Serialize)]
struct Related {
    category: String,
    contained: BTreeSet<String>,
    locked_with: BTreeSet<String>,
    enabled_by: BTreeSet<String>,
    disabled_by: BTreeSet<String>,
}

pub fn run(
    category: &str,
    args: &SessionArgs,
    config: Option<&Path>,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let session = Session::open(args, config)?;
    let copy = session.working_copy()?;

    if copy.graph().category(category).is_none() {
        return Err(format!("unknown category: {category}").into());
    }

    let related = Related {
        category: category.to_string(),
        contained: contained_categories(&copy, category),
        locked_with: disabled_categories(&copy, category),
        enabled_by: categories_enabled_by(&copy, category),
        disabled_by: categories_disabled_by(&copy, category),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&related)?);
        return Ok(());
    }

    println!("Category: {}", related.category);
    println!("  Contains:          {}", join_ids(&related.contained));
    println!("  Locked with:       {}", join_ids(&related.locked_with));
    println!("  Checking enables:  {}", join_ids(&related.enabled_by));
    println!("  Unchecking clears: {}", join_ids(&related.disabled_by));
    Ok(())
}
