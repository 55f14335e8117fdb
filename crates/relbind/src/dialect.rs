//! Backing-store dialects.
//!
//! The dialect is an opaque handle carried by the mapper; statement
//! generation lives elsewhere.

use crate::error::Error;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Supported backing-store dialects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Dialect {
    /// MySQL.
    #[serde(rename = "mysql")]
    MySql,
    /// SQLite 3.
    #[serde(rename = "sqlite3")]
    Sqlite3,
}

impl Dialect {
    /// Driver identifier selecting this dialect.
    pub fn driver_name(&self) -> &'static str {
        match self {
            Dialect::MySql => "mysql",
            Dialect::Sqlite3 => "sqlite3",
        }
    }
}

impl FromStr for Dialect {
    type Err = Error;

    fn from_str(driver: &str) -> Result<Self, Self::Err> {
        match driver {
            "mysql" => Ok(Dialect::MySql),
            "sqlite3" => Ok(Dialect::Sqlite3),
            other => Err(Error::UnknownDialect(other.to_string())),
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.driver_name())
    }
}
