//! Library configuration.
//!
//! Configuration is plain data: every struct derives serde and falls back to
//! its [`Default`] for missing fields, so a partial JSON document is enough.
//!
//! ```
//! use heracles::{Config, InsertPolicy};
//!
//! let config = Config::from_json(r#"{ "tree": { "insert_policy": "clamp" } }"#)?;
//! assert_eq!(config.tree.insert_policy, InsertPolicy::Clamp);
//! assert!(config.tree.classify_lists);
//! # Ok::<(), heracles::Error>(())
//! ```

use serde::{Deserialize, Serialize};

/// What positional inserts do with a position past either end of a view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsertPolicy {
    /// Fail with an out-of-range error
    #[default]
    Strict,
    /// Append past the end, prepend before the start
    Clamp,
}

/// Behaviour of sibling views derived from a [`Forest`](crate::Forest).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TreeConfig {
    /// Handling of out-of-range insert positions
    pub insert_policy: InsertPolicy,
    /// When false every derived view is plain, even if its labels run 1..N
    pub classify_lists: bool,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            insert_policy: InsertPolicy::Strict,
            classify_lists: true,
        }
    }
}

/// Top-level configuration for a [`Heracles`](crate::Heracles) handle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Settings applied to every forest the handle creates
    pub tree: TreeConfig,
}

impl Config {
    /// Parses a configuration from JSON.
    pub fn from_json(json: &str) -> crate::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serializes this configuration to pretty-printed JSON.
    pub fn to_json(&self) -> crate::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
