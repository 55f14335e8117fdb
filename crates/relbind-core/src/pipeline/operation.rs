//! Built-in operations and their default handler chains.

use super::chain::HandlerChain;
use super::step::{self, Step};
use std::fmt;
use std::str::FromStr;

/// Operations with a built-in default chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    CreateTable,
    CreateTableIfNotExist,
    DropTable,
    DropTableIfExist,
    Insert,
    Find,
    Update,
    Save,
    HardDelete,
    SoftDelete,
    HardDeleteWithPrimaryKey,
    SoftDeleteWithPrimaryKey,
}

impl Operation {
    /// Every built-in operation.
    pub const ALL: [Operation; 12] = [
        Operation::CreateTable,
        Operation::CreateTableIfNotExist,
        Operation::DropTable,
        Operation::DropTableIfExist,
        Operation::Insert,
        Operation::Find,
        Operation::Update,
        Operation::Save,
        Operation::HardDelete,
        Operation::SoftDelete,
        Operation::HardDeleteWithPrimaryKey,
        Operation::SoftDeleteWithPrimaryKey,
    ];

    /// Operation name used as chain table key.
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::CreateTable => "CreateTable",
            Operation::CreateTableIfNotExist => "CreateTableIfNotExist",
            Operation::DropTable => "DropTable",
            Operation::DropTableIfExist => "DropTableIfExist",
            Operation::Insert => "Insert",
            Operation::Find => "Find",
            Operation::Update => "Update",
            Operation::Save => "Save",
            Operation::HardDelete => "HardDelete",
            Operation::SoftDelete => "SoftDelete",
            Operation::HardDeleteWithPrimaryKey => "HardDeleteWithPrimaryKey",
            Operation::SoftDeleteWithPrimaryKey => "SoftDeleteWithPrimaryKey",
        }
    }

    /// The canonical step sequence for this operation.
    pub fn default_chain(&self) -> HandlerChain<Step> {
        let op = self.as_str();
        let steps = match self {
            Operation::CreateTable => vec![
                Step::with_argument(step::SIMPLE_PRELOAD, op),
                Step::new(step::CREATE_TABLE),
            ],
            Operation::CreateTableIfNotExist => vec![
                Step::with_argument(step::SIMPLE_PRELOAD, op),
                Step::new(step::EXIST_TABLE_ABORT),
                Step::new(step::CREATE_TABLE),
            ],
            Operation::DropTable => vec![
                Step::with_argument(step::DROP_TABLE_PRELOAD, op),
                Step::new(step::DROP_TABLE),
            ],
            Operation::DropTableIfExist => vec![
                Step::with_argument(step::DROP_TABLE_PRELOAD, op),
                Step::new(step::NOT_EXIST_TABLE_ABORT),
                Step::new(step::DROP_TABLE),
            ],
            Operation::Insert => vec![
                Step::new(step::PRELOAD_CONTAINER_CHECK),
                Step::with_argument(step::PRELOAD_INSERT_OR_SAVE, op),
                Step::new(step::INSERT_TIME_GENERATE),
                Step::new(step::INSERT),
            ],
            Operation::Find => vec![
                Step::new(step::PRELOAD_CONTAINER_CHECK),
                Step::new(step::SOFT_DELETE_CHECK),
                Step::new(step::FIND),
                Step::new(step::PRELOAD_FIND),
            ],
            Operation::Update => vec![
                Step::new(step::SOFT_DELETE_CHECK),
                Step::new(step::UPDATE_TIME_GENERATE),
                Step::new(step::UPDATE),
            ],
            Operation::Save => vec![
                Step::new(step::PRELOAD_CONTAINER_CHECK),
                Step::with_argument(step::PRELOAD_INSERT_OR_SAVE, op),
                Step::new(step::SAVE_TIME_GENERATE),
                Step::new(step::SAVE),
            ],
            Operation::HardDelete => vec![
                Step::new(step::PRELOAD_DELETE),
                Step::new(step::HARD_DELETE),
            ],
            Operation::SoftDelete => vec![
                Step::new(step::PRELOAD_DELETE),
                Step::new(step::SOFT_DELETE),
            ],
            Operation::HardDeleteWithPrimaryKey => vec![
                Step::new(step::PRELOAD_DELETE),
                Step::new(step::SEARCH_WITH_PRIMARY_KEY),
                Step::new(step::HARD_DELETE),
            ],
            Operation::SoftDeleteWithPrimaryKey => vec![
                Step::new(step::PRELOAD_DELETE),
                Step::new(step::SEARCH_WITH_PRIMARY_KEY),
                Step::new(step::SOFT_DELETE),
            ],
        };
        steps.into()
    }
}

impl AsRef<str> for Operation {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Operation::ALL
            .iter()
            .copied()
            .find(|op| op.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown operation: {}", s))
    }
}
