//! Host-supplied activity definitions.
//!
//! The manager never decides on its own which activities exist, which ones
//! are forced on, or which ones start enabled. It asks an
//! [`ActivityDefinitions`] implementation.
//!
//! [`StaticDefinitions`] is the bundled implementation, loaded from a TOML
//! file of the form:
//!
//! ```toml
//! [[activity]]
//! id = "java.edit"
//! name = "Java editing"
//! default_enabled = true
//!
//! [[category]]
//! id = "java"
//! name = "Java Development"
//! activities = ["java.edit"]
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::enablement::EnablementSet;
use crate::error::{CoreError, Result};
use crate::membership::{Activity, Category, MembershipGraph};

/// Everything the manager needs to know about the defined universe.
pub trait ActivityDefinitions: Send + Sync {
    /// The static membership graph.
    fn graph(&self) -> &MembershipGraph;

    /// Whether `activity` is enabled by something other than user toggling.
    fn is_forced(&self, activity: &str) -> bool;

    /// The default-enabled flag of `activity`.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Metadata` when the flag cannot be determined.
    fn is_default_enabled(&self, activity: &str) -> Result<bool>;

    /// Every defined activity id.
    fn defined_activity_ids(&self) -> &EnablementSet {
        self.graph().defined_activity_ids()
    }
}

/// On-disk shape of a definitions file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DefinitionsFile {
    #[serde(default, rename = "activity")]
    pub activities: Vec<Activity>,
    #[serde(default, rename = "category")]
    pub categories: Vec<Category>,
}

impl DefinitionsFile {
    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}

/// Definitions backed by an in-memory graph.
#[derive(Debug, Clone)]
pub struct StaticDefinitions {
    graph: MembershipGraph,
}

impl StaticDefinitions {
    pub fn new(graph: MembershipGraph) -> Self {
        Self { graph }
    }

    /// Build from activity and category definitions.
    pub fn build(activities: Vec<Activity>, categories: Vec<Category>) -> Result<Self> {
        Ok(Self::new(MembershipGraph::new(activities, categories)?))
    }

    pub fn from_file_contents(file: DefinitionsFile) -> Result<Self> {
        Self::build(file.activities, file.categories)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Self::from_file_contents(DefinitionsFile::from_toml(content)?)
    }

    /// Load definitions from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or if the
    /// definitions are malformed.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }
}

impl ActivityDefinitions for StaticDefinitions {
    fn graph(&self) -> &MembershipGraph {
        &self.graph
    }

    fn is_forced(&self, activity: &str) -> bool {
        self.graph.activity(activity).is_some_and(|a| a.forced)
    }

    fn is_default_enabled(&self, activity: &str) -> Result<bool> {
        let definition = self
            .graph
            .activity(activity)
            .ok_or_else(|| CoreError::metadata(activity, "activity is not defined"))?;
        definition
            .default_enabled
            .ok_or_else(|| CoreError::metadata(activity, "no default_enabled flag"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;

    const SAMPLE: &str = indoc! {r#"
        [[activity]]
        id = "java.edit"
        name = "Java editing"
        default_enabled = true

        [[activity]]
        id = "java.debug"
        name = "Java debugging"
        requires = ["java.edit"]

        [[activity]]
        id = "core.help"
        name = "Help"
        forced = true
        default_enabled = true

        [[category]]
        id = "java"
        name = "Java Development"
        description = "Edit and debug Java code"
        activities = ["java.edit", "java.debug"]
    "#};

    #[test]
    fn loads_from_toml() {
        let defs = StaticDefinitions::from_toml(SAMPLE).unwrap();
        assert_eq!(defs.defined_activity_ids().len(), 3);
        assert!(defs.is_forced("core.help"));
        assert!(!defs.is_forced("java.edit"));
        assert!(!defs.is_forced("undefined"));
        assert_eq!(
            defs.graph().category("java").unwrap().description.as_deref(),
            Some("Edit and debug Java code")
        );
    }

    #[test]
    fn default_flag_may_be_undeterminable() {
        let defs = StaticDefinitions::from_toml(SAMPLE).unwrap();
        assert!(defs.is_default_enabled("java.edit").unwrap());
        assert!(matches!(
            defs.is_default_enabled("java.debug"),
            Err(CoreError::Metadata { .. })
        ));
        assert!(matches!(
            defs.is_default_enabled("ghost"),
            Err(CoreError::Metadata { .. })
        ));
    }

    #[test]
    fn rejects_unparseable_toml() {
        let err = StaticDefinitions::from_toml("[[activity]]\nid = 3").unwrap_err();
        assert!(matches!(err, CoreError::TomlDe(_)));
    }

    #[test]
    fn load_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("capabilities.toml");
        std::fs::write(&path, SAMPLE).unwrap();
        let defs = StaticDefinitions::load(&path).unwrap();
        assert!(defs.graph().category("java").is_some());

        assert!(matches!(
            StaticDefinitions::load(&dir.path().join("missing.toml")),
            Err(CoreError::Io(_))
        ));
    }

    #[test]
    fn file_serializes_back_to_toml() {
        let file = DefinitionsFile::from_toml(SAMPLE).unwrap();
        let again = DefinitionsFile::from_toml(&file.to_toml().unwrap()).unwrap();
        assert_eq!(again.activities, file.activities);
        assert_eq!(again.categories, file.categories);
    }

    #[test]
    fn built_and_loaded_activities_agree_on_missing_default_flag() {
        let built = StaticDefinitions::build(
            vec![
                Activity::new("java.debug", "Java debugging"),
                Activity::new("java.edit", "Java editing").default_enabled(false),
            ],
            vec![],
        )
        .unwrap();
        let loaded = StaticDefinitions::from_toml(SAMPLE).unwrap();

        for defs in [&built, &loaded] {
            assert!(matches!(
                defs.is_default_enabled("java.debug"),
                Err(CoreError::Metadata { .. })
            ));
        }
        assert!(!built.is_default_enabled("java.edit").unwrap());
    }
}
