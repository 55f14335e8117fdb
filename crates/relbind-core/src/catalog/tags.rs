//! Field tag parsing.
//!
//! Tags are `;`-separated attributes such as `primary key;foreign key;default=0`.
//! Only the primary-key and foreign-key markers carry meaning here; every
//! other attribute is kept verbatim for downstream collaborators.

use crate::error::Error;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

const PRIMARY_KEY: &str = "primary key";
const FOREIGN_KEY: &str = "foreign key";

/// Parsed attributes attached to a field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FieldTags {
    /// Field is (part of) the primary key.
    pub primary_key: bool,
    /// Field holds a foreign key.
    pub foreign_key: bool,
    /// Remaining attributes; flag attributes map to an empty value.
    pub attributes: BTreeMap<String, String>,
}

impl FieldTags {
    /// Create an empty tag set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a tag string.
    pub fn parse(input: &str) -> Result<Self, Error> {
        let mut tags = Self::new();
        for segment in input.split(';') {
            let segment = segment.trim();
            if segment.is_empty() {
                continue;
            }
            match segment.split_once('=') {
                Some((key, value)) => {
                    let key = key.trim();
                    if key.is_empty() {
                        return Err(Error::InvalidTag(segment.to_string()));
                    }
                    tags.attributes
                        .insert(key.to_lowercase(), value.trim().to_string());
                }
                None => {
                    let flag = segment.to_lowercase();
                    match flag.as_str() {
                        PRIMARY_KEY => tags.primary_key = true,
                        FOREIGN_KEY => tags.foreign_key = true,
                        _ => {
                            tags.attributes.insert(flag, String::new());
                        }
                    }
                }
            }
        }
        Ok(tags)
    }

    /// Mark as primary key.
    pub fn with_primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }

    /// Mark as foreign key.
    pub fn with_foreign_key(mut self) -> Self {
        self.foreign_key = true;
        self
    }

    /// Add a free-form attribute.
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Look up a free-form attribute.
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }
}

impl fmt::Display for FieldTags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts: Vec<String> = Vec::new();
        if self.primary_key {
            parts.push(PRIMARY_KEY.to_string());
        }
        if self.foreign_key {
            parts.push(FOREIGN_KEY.to_string());
        }
        for (key, value) in &self.attributes {
            if value.is_empty() {
                parts.push(key.clone());
            } else {
                parts.push(format!("{}={}", key, value));
            }
        }
        f.write_str(&parts.join(";"))
    }
}

impl TryFrom<String> for FieldTags {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<FieldTags> for String {
    fn from(tags: FieldTags) -> Self {
        tags.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_markers() {
        let tags = FieldTags::parse("primary key; Foreign Key").unwrap();
        assert!(tags.primary_key);
        assert!(tags.foreign_key);
        assert!(tags.attributes.is_empty());
    }

    #[test]
    fn test_parse_attributes() {
        let tags = FieldTags::parse("index;default=0;;").unwrap();
        assert!(!tags.primary_key);
        assert_eq!(tags.attribute("index"), Some(""));
        assert_eq!(tags.attribute("default"), Some("0"));
    }

    #[test]
    fn test_parse_rejects_empty_key() {
        let err = FieldTags::parse("=1").unwrap_err();
        assert!(matches!(err, Error::InvalidTag(_)));
    }

    #[test]
    fn test_display_reparses() {
        let tags = FieldTags::new()
            .with_primary_key()
            .with_attribute("size", "64");
        assert_eq!(tags.to_string(), "primary key;size=64");
        assert_eq!(FieldTags::parse(&tags.to_string()).unwrap(), tags);
    }
}
