//! Core type definitions for the catalog.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Scalar data types a field can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScalarType {
    /// Boolean value.
    Bool,
    /// 32-bit signed integer.
    Int32,
    /// 64-bit signed integer.
    Int64,
    /// 32-bit unsigned integer.
    #[serde(rename = "uint32")]
    UInt32,
    /// 64-bit unsigned integer.
    #[serde(rename = "uint64")]
    UInt64,
    /// 32-bit floating point.
    Float32,
    /// 64-bit floating point.
    Float64,
    /// UTF-8 string.
    String,
    /// Binary data.
    Bytes,
    /// Timestamp (microseconds since Unix epoch).
    Timestamp,
    /// UUID (128-bit identifier).
    Uuid,
}

/// Declared value shape of a field.
///
/// Struct and slice shapes name the entity they contain. Pointer wrapping is
/// not part of the shape; see [`FieldDef::nullable`](super::FieldDef).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldShape {
    /// A scalar value.
    Primitive(ScalarType),
    /// A single embedded entity.
    Struct(String),
    /// A collection of embedded entities.
    SliceOfStruct(String),
}

impl ScalarType {
    /// Check if this type is numeric.
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            ScalarType::Int32
                | ScalarType::Int64
                | ScalarType::UInt32
                | ScalarType::UInt64
                | ScalarType::Float32
                | ScalarType::Float64
        )
    }

    /// Check if this type is a string-like type.
    pub fn is_string_like(&self) -> bool {
        matches!(self, ScalarType::String | ScalarType::Bytes)
    }

    /// Lowercase name used in schema documents.
    pub fn as_str(&self) -> &'static str {
        match self {
            ScalarType::Bool => "bool",
            ScalarType::Int32 => "int32",
            ScalarType::Int64 => "int64",
            ScalarType::UInt32 => "uint32",
            ScalarType::UInt64 => "uint64",
            ScalarType::Float32 => "float32",
            ScalarType::Float64 => "float64",
            ScalarType::String => "string",
            ScalarType::Bytes => "bytes",
            ScalarType::Timestamp => "timestamp",
            ScalarType::Uuid => "uuid",
        }
    }
}

impl fmt::Display for ScalarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FieldShape {
    /// Create a primitive shape.
    pub fn primitive(scalar: ScalarType) -> Self {
        FieldShape::Primitive(scalar)
    }

    /// Create a struct shape referencing `entity`.
    pub fn struct_of(entity: impl Into<String>) -> Self {
        FieldShape::Struct(entity.into())
    }

    /// Create a slice-of-struct shape referencing `entity`.
    pub fn slice_of(entity: impl Into<String>) -> Self {
        FieldShape::SliceOfStruct(entity.into())
    }

    /// The scalar type if this is a primitive shape.
    pub fn scalar(&self) -> Option<ScalarType> {
        match self {
            FieldShape::Primitive(s) => Some(*s),
            _ => None,
        }
    }

    /// The referenced entity if this is a struct or slice shape.
    pub fn entity(&self) -> Option<&str> {
        match self {
            FieldShape::Struct(e) | FieldShape::SliceOfStruct(e) => Some(e),
            FieldShape::Primitive(_) => None,
        }
    }

    /// Check if this shape is a collection.
    pub fn is_collection(&self) -> bool {
        matches!(self, FieldShape::SliceOfStruct(_))
    }
}

impl fmt::Display for FieldShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldShape::Primitive(s) => write!(f, "{}", s),
            FieldShape::Struct(e) => write!(f, "{}", e),
            FieldShape::SliceOfStruct(e) => write!(f, "[]{}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_type_checks() {
        assert!(ScalarType::Int32.is_numeric());
        assert!(ScalarType::UInt64.is_numeric());
        assert!(!ScalarType::String.is_numeric());
        assert!(!ScalarType::Bool.is_numeric());

        assert!(ScalarType::String.is_string_like());
        assert!(ScalarType::Bytes.is_string_like());
        assert!(!ScalarType::Int32.is_string_like());
    }

    #[test]
    fn test_shape_accessors() {
        let id = FieldShape::primitive(ScalarType::Int64);
        assert_eq!(id.scalar(), Some(ScalarType::Int64));
        assert!(id.entity().is_none());

        let detail = FieldShape::struct_of("UserDetail");
        assert_eq!(detail.entity(), Some("UserDetail"));
        assert!(!detail.is_collection());

        let blogs = FieldShape::slice_of("Blog");
        assert_eq!(blogs.entity(), Some("Blog"));
        assert!(blogs.is_collection());
    }

    #[test]
    fn test_shape_display() {
        assert_eq!(FieldShape::primitive(ScalarType::Uuid).to_string(), "uuid");
        assert_eq!(FieldShape::struct_of("User").to_string(), "User");
        assert_eq!(FieldShape::slice_of("Tag").to_string(), "[]Tag");
    }

    #[test]
    fn test_shape_json_form() {
        let shape: FieldShape = serde_json::from_str(r#"{"slice_of_struct":"Blog"}"#).unwrap();
        assert_eq!(shape, FieldShape::slice_of("Blog"));

        let shape: FieldShape = serde_json::from_str(r#"{"primitive":"uint32"}"#).unwrap();
        assert_eq!(shape, FieldShape::primitive(ScalarType::UInt32));
    }

    #[test]
    fn test_scalar_json_matches_display() {
        let all = [
            ScalarType::Bool,
            ScalarType::Int32,
            ScalarType::Int64,
            ScalarType::UInt32,
            ScalarType::UInt64,
            ScalarType::Float32,
            ScalarType::Float64,
            ScalarType::String,
            ScalarType::Bytes,
            ScalarType::Timestamp,
            ScalarType::Uuid,
        ];
        for scalar in all {
            let json = serde_json::to_string(&scalar).unwrap();
            assert_eq!(json, format!("\"{}\"", scalar.as_str()));
        }

        let shape: FieldShape = serde_json::from_str(r#"{"primitive":"uint64"}"#).unwrap();
        assert_eq!(shape.to_string(), "uint64");
    }
}
