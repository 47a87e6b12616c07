//! Category listing.

use std::path::Path;

use capset_core::lock::{is_locked, locked_activities};
use capset_core::relations::is_category_enabled;
use serde::Serialize;

use super::session::{join_ids, Session, SessionArgs};

#[derive(Debug, Serialize)]
struct CategoryRow {
    id: String,
    name: String,
    enabled: bool,
    locked: bool,
    activities: Vec<String>,
    locked_activities: Vec<String>,
}

pub fn run(
    args: &SessionArgs,
    config: Option<&Path>,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let session = Session::open(args, config)?;
    let copy = session.working_copy()?;

    let rows: Vec<CategoryRow> = copy
        .graph()
        .visible_categories()
        .map(|category| CategoryRow {
            id: category.id.clone(),
            name: category.name.clone(),
            enabled: is_category_enabled(&copy, &category.id),
            locked: is_locked(&copy, &category.id),
            activities: category.activities.iter().cloned().collect(),
            locked_activities: locked_activities(&copy, &category.id)
                .into_iter()
                .collect(),
        })
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    println!("{}:", session.config.page.category_name);
    if rows.is_empty() {
        println!("  (none)");
    }
    for row in &rows {
        let check = if row.enabled { "[x]" } else { "[ ]" };
        let lock = if row.locked { " (locked)" } else { "" };
        println!("  {check} {} - {}{lock}", row.id, row.name);
        println!("      activities: {}", join_ids(&row.activities));
    }
    Ok(())
}
