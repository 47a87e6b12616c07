//! # Capset Core Library
//!
//! This library provides the enablement engine behind a capabilities
//! preference page: which optional activities are turned on, how they group
//! into categories, and how a page session edits that state without touching
//! anything until it commits. The `capset-cli` binary is a thin layer over the
//! same library.
//!
//! ## Architecture
//!
//! - **Membership**: Static activity/category definitions and the derived
//!   activity-to-category index
//! - **Working Copy**: Transactional overlay over the committed set with
//!   category toggle algebra and bulk operations
//! - **Lock Resolution**: Forced activities veto unchecking their categories
//! - **Change Notification**: Listeners observe every committed change as an
//!   `(old, new)` pair
//! - **Tree Adapter**: Parent lookup for hierarchical preference pages
//!
//! ## Key Components
//!
//! - [`ActivityManager`]: Owner of the committed enablement set
//! - [`WorkingCopy`]: Per-session tentative set
//! - [`MembershipGraph`]: Activity/category membership
//! - [`Config`]: Application configuration management

pub mod config;
pub mod definitions;
pub mod enablement;
pub mod error;
pub mod lock;
pub mod manager;
pub mod membership;
pub mod notifier;
pub mod relations;
pub mod tree;
pub mod working_copy;

pub use config::{data_dir, Config, EnablementConfig, PageConfig};
pub use definitions::{ActivityDefinitions, DefinitionsFile, StaticDefinitions};
pub use enablement::{ActivityId, EnablementDiff, EnablementSet};
pub use error::{ConfigError, CoreError, ListenerError, Result};
pub use lock::LockVeto;
pub use manager::{ActivityManager, CommitOutcome};
pub use membership::{Activity, Category, CategoryId, MembershipGraph};
pub use notifier::{
    ChangeNotifier, DeliveryReport, EnablementEvent, EnablementListener, ListenerFailure,
    ListenerId,
};
pub use relations::CategoryPolicy;
pub use tree::{find_parent, TreeContentProvider, TreeNode};
pub use working_copy::{ToggleOutcome, WorkingCopy};
