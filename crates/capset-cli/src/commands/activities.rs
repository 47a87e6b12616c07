//! Activity listing (the advanced per-activity view).

use std::path::Path;

use serde::Serialize;

use super::session::{join_ids, Session, SessionArgs};

#[derive(Debug, Serialize)]
struct ActivityRow {
    id: String,
    name: String,
    enabled: bool,
    forced: bool,
    /// `None` when the definition does not carry a default flag.
    default_enabled: Option<bool>,
    categories: Vec<String>,
}

pub fn run(
    args: &SessionArgs,
    config: Option<&Path>,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let session = Session::open(args, config)?;
    let copy = session.working_copy()?;
    let definitions = copy.definitions();

    let rows: Vec<ActivityRow> = copy
        .graph()
        .activities()
        .map(|activity| ActivityRow {
            id: activity.id.clone(),
            name: activity.name.clone(),
            enabled: copy.is_enabled(&activity.id),
            forced: definitions.is_forced(&activity.id),
            default_enabled: definitions.is_default_enabled(&activity.id).ok(),
            categories: copy
                .graph()
                .categories_containing(&activity.id)
                .into_iter()
                .collect(),
        })
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    println!("{}:", session.config.page.activity_name);
    for row in &rows {
        let check = if row.enabled { "[x]" } else { "[ ]" };
        let forced = if row.forced { " (forced)" } else { "" };
        let default = match row.default_enabled {
            Some(true) => "on",
            Some(false) => "off",
            None => "unknown",
        };
        println!("  {check} {} - {}{forced}", row.id, row.name);
        println!(
            "      default: {default}, categories: {}",
            join_ids(&row.categories)
        );
    }
    Ok(())
}
