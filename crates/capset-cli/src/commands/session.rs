//! Shared setup for commands that open the enablement engine.
//!
//! Nothing is persisted: the committed set starts from `--enabled` or, when
//! that flag is absent, from the definition defaults.

use clap::Args;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use capset_core::{
    ActivityDefinitions, ActivityManager, Config, EnablementSet, StaticDefinitions, WorkingCopy,
};

#[derive(Args, Debug, Clone)]
pub struct SessionArgs {
    /// Activity definitions file (TOML)
    #[arg(long)]
    pub defs: PathBuf,

    /// Initial committed activities, comma separated
    #[arg(long, value_delimiter = ',')]
    pub enabled: Option<Vec<String>>,
}

/// A manager plus the host configuration it was opened with.
pub struct Session {
    pub manager: ActivityManager,
    pub config: Config,
}

impl Session {
    pub fn open(
        args: &SessionArgs,
        config_path: Option<&Path>,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let config = load_config(config_path)?;
        let definitions = Arc::new(StaticDefinitions::load(&args.defs)?);
        tracing::debug!(
            path = %args.defs.display(),
            activities = definitions.defined_activity_ids().len(),
            "loaded definitions"
        );

        let manager = match &args.enabled {
            Some(ids) => {
                let initial: EnablementSet = ids
                    .iter()
                    .map(|id| id.trim())
                    .filter(|id| !id.is_empty())
                    .collect();
                ActivityManager::new(definitions, initial)
            }
            None => ActivityManager::with_defaults(definitions),
        };

        Ok(Self { manager, config })
    }

    /// A working copy using the configured category policy.
    pub fn working_copy(&self) -> Result<WorkingCopy, Box<dyn std::error::Error>> {
        Ok(self
            .manager
            .create_working_copy()?
            .with_policy(self.config.enablement.category_policy))
    }
}

pub fn load_config(path: Option<&Path>) -> Result<Config, Box<dyn std::error::Error>> {
    let config = match path {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    Ok(config)
}

/// Comma-joined ids, or `-` for an empty list.
pub fn join_ids<'a>(ids: impl IntoIterator<Item = &'a String>) -> String {
    let joined = ids
        .into_iter()
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(", ");
    if joined.is_empty() {
        "-".to_string()
    } else {
        joined
    }
}
