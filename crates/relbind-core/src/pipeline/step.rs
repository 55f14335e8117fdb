//! Named pipeline steps.
//!
//! Steps are opaque to the composer; only their name and position matter.
//! The executor that runs a chain maps each name to its implementation.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;

pub const SIMPLE_PRELOAD: &str = "simple-preload";
pub const CREATE_TABLE: &str = "create-table";
pub const EXIST_TABLE_ABORT: &str = "exist-table-abort";
pub const DROP_TABLE_PRELOAD: &str = "drop-table-preload";
pub const NOT_EXIST_TABLE_ABORT: &str = "not-exist-table-abort";
pub const DROP_TABLE: &str = "drop-table";
pub const PRELOAD_CONTAINER_CHECK: &str = "preload-container-check";
pub const PRELOAD_INSERT_OR_SAVE: &str = "preload-insert-or-save";
pub const INSERT_TIME_GENERATE: &str = "insert-time-generate";
pub const INSERT: &str = "insert";
pub const SOFT_DELETE_CHECK: &str = "soft-delete-check";
pub const FIND: &str = "find";
pub const PRELOAD_FIND: &str = "preload-find";
pub const UPDATE_TIME_GENERATE: &str = "update-time-generate";
pub const UPDATE: &str = "update";
pub const SAVE_TIME_GENERATE: &str = "save-time-generate";
pub const SAVE: &str = "save";
pub const PRELOAD_DELETE: &str = "preload-delete";
pub const HARD_DELETE: &str = "hard-delete";
pub const SOFT_DELETE: &str = "soft-delete";
pub const SEARCH_WITH_PRIMARY_KEY: &str = "search-with-primary-key";

/// One named step of a handler chain, optionally parameterized.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Step {
    name: Cow<'static, str>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    argument: Option<Cow<'static, str>>,
}

impl Step {
    /// Create a step.
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self {
            name: name.into(),
            argument: None,
        }
    }

    /// Create a step parameterized with `argument`.
    pub fn with_argument(
        name: impl Into<Cow<'static, str>>,
        argument: impl Into<Cow<'static, str>>,
    ) -> Self {
        Self {
            name: name.into(),
            argument: Some(argument.into()),
        }
    }

    /// Step name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Step argument, if any.
    pub fn argument(&self) -> Option<&str> {
        self.argument.as_deref()
    }
}

impl From<&'static str> for Step {
    fn from(name: &'static str) -> Self {
        Self::new(name)
    }
}

impl From<String> for Step {
    fn from(name: String) -> Self {
        Self::new(name)
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.argument {
            Some(argument) => write!(f, "{}({})", self.name, argument),
            None => f.write_str(&self.name),
        }
    }
}
