//! Scripted working-copy edits followed by a commit.

use std::path::Path;
use std::str::FromStr;

use capset_core::{EnablementSet, ToggleOutcome, WorkingCopy};
use serde_json::json;

use super::session::{join_ids, Session, SessionArgs};

/// One edit applied to the working copy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Op {
    EnableAll,
    DisableAll,
    Reset,
    Check(String),
    Uncheck(String),
    On(String),
    Off(String),
}

impl FromStr for Op {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "enable-all" => return Ok(Op::EnableAll),
            "disable-all" => return Ok(Op::DisableAll),
            "reset" => return Ok(Op::Reset),
            _ => {}
        }

        let (kind, id) = s
            .split_once(':')
            .ok_or_else(|| format!("unknown operation: {s}"))?;
        if id.is_empty() {
            return Err(format!("missing id in operation: {s}"));
        }
        let id = id.to_string();
        match kind {
            "check" => Ok(Op::Check(id)),
            "uncheck" => Ok(Op::Uncheck(id)),
            "on" => Ok(Op::On(id)),
            "off" => Ok(Op::Off(id)),
            _ => Err(format!("unknown operation: {s}")),
        }
    }
}

impl Op {
    fn is_advanced(&self) -> bool {
        matches!(self, Op::On(_) | Op::Off(_))
    }
}

/// A category uncheck the lock resolver refused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Veto {
    pub category: String,
    pub locked: EnablementSet,
}

/// Apply `ops` in order, collecting vetoes.
pub fn apply_ops(copy: &mut WorkingCopy, ops: &[Op]) -> Vec<Veto> {
    let mut vetoes = Vec::new();
    for op in ops {
        match op {
            Op::EnableAll => copy.enable_all(),
            Op::DisableAll => copy.disable_all(),
            Op::Reset => copy.reset_to_default(),
            Op::Check(category) => {
                copy.toggle_category(category, true);
            }
            Op::Uncheck(category) => {
                if let ToggleOutcome::Vetoed { locked } = copy.toggle_category(category, false) {
                    vetoes.push(Veto {
                        category: category.clone(),
                        locked,
                    });
                }
            }
            Op::On(activity) => {
                copy.set_activity_enabled(activity, true);
            }
            Op::Off(activity) => {
                copy.set_activity_enabled(activity, false);
            }
        }
    }
    vetoes
}

pub fn run(
    raw_ops: &[String],
    args: &SessionArgs,
    config: Option<&Path>,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let ops = raw_ops
        .iter()
        .map(|s| s.parse::<Op>())
        .collect::<Result<Vec<_>, _>>()?;

    let session = Session::open(args, config)?;
    if !session.config.page.allow_advanced && ops.iter().any(Op::is_advanced) {
        return Err(
            "per-activity edits are disabled (set page.allow_advanced = true to use on:/off:)"
                .into(),
        );
    }

    let mut copy = session.working_copy()?;
    let vetoes = apply_ops(&mut copy, &ops);
    let outcome = copy.commit(&session.manager)?;
    let committed = session.manager.enabled_activity_ids();

    if json {
        let vetoes: Vec<_> = vetoes
            .iter()
            .map(|v| json!({ "category": v.category, "locked": v.locked }))
            .collect();
        let event = &outcome.event;
        let out = json!({
            "vetoes": vetoes,
            "changed": outcome.changed(),
            "event": {
                "old": event.old,
                "new": event.new,
                "added": event.added(),
                "removed": event.removed(),
                "at": event.at,
            },
            "enabled": committed,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    for veto in &vetoes {
        println!(
            "Vetoed: uncheck {} (locked: {})",
            veto.category,
            join_ids(&veto.locked)
        );
    }
    if outcome.changed() {
        println!("Committed:");
        println!("  added:   {}", join_ids(&outcome.event.added()));
        println!("  removed: {}", join_ids(&outcome.event.removed()));
    } else {
        println!("No changes to commit");
    }
    println!("Enabled: {}", join_ids(committed.iter()));
    Ok(())
}
