//! Field definitions for entities.

use super::tags::FieldTags;
use super::types::{FieldShape, ScalarType};
use serde::{Deserialize, Serialize};

/// A field definition within an entity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FieldDef {
    /// Field name.
    pub name: String,
    /// Declared value shape.
    pub shape: FieldShape,
    /// Whether the value is pointer-wrapped (may be absent).
    #[serde(default)]
    pub nullable: bool,
    /// Field attributes.
    #[serde(default)]
    pub tags: FieldTags,
}

impl FieldDef {
    /// Create a new non-nullable field.
    pub fn new(name: impl Into<String>, shape: FieldShape) -> Self {
        Self {
            name: name.into(),
            shape,
            nullable: false,
            tags: FieldTags::default(),
        }
    }

    /// Create a primitive field.
    pub fn primitive(name: impl Into<String>, scalar: ScalarType) -> Self {
        Self::new(name, FieldShape::Primitive(scalar))
    }

    /// Create a nullable field.
    pub fn optional(name: impl Into<String>, shape: FieldShape) -> Self {
        Self {
            nullable: true,
            ..Self::new(name, shape)
        }
    }

    /// Replace the tag set.
    pub fn with_tags(mut self, tags: FieldTags) -> Self {
        self.tags = tags;
        self
    }

    /// Mark as primary key.
    pub fn primary_key(mut self) -> Self {
        self.tags.primary_key = true;
        self
    }

    /// Mark as foreign key.
    pub fn foreign_key(mut self) -> Self {
        self.tags.foreign_key = true;
        self
    }

    /// Check if this field is part of the primary key.
    pub fn is_primary_key(&self) -> bool {
        self.tags.primary_key
    }

    /// Check if this field is tagged as a foreign key.
    pub fn is_foreign_key(&self) -> bool {
        self.tags.foreign_key
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_def_builder() {
        let field = FieldDef::primitive("ID", ScalarType::Int64).primary_key();

        assert_eq!(field.name, "ID");
        assert!(!field.nullable);
        assert!(field.is_primary_key());
        assert!(!field.is_foreign_key());
    }

    #[test]
    fn test_optional_field() {
        let field = FieldDef::optional("UserID", FieldShape::primitive(ScalarType::Int64))
            .foreign_key();

        assert!(field.nullable);
        assert!(field.is_foreign_key());
        assert_eq!(field.shape.scalar(), Some(ScalarType::Int64));
    }

    #[test]
    fn test_field_from_json() {
        let field: FieldDef = serde_json::from_str(
            r#"{"name":"ID","shape":{"primitive":"int64"},"tags":"primary key;auto_increment"}"#,
        )
        .unwrap();

        assert!(field.is_primary_key());
        assert_eq!(field.tags.attribute("auto_increment"), Some(""));
        assert!(!field.nullable);
    }
}
