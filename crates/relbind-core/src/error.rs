//! Core error types.

use crate::catalog::FieldShape;
use thiserror::Error;

/// Errors raised while building entity metadata or binding relations.
///
/// Every variant except [`Error::Io`] describes an invalid static schema. A
/// field that simply has no relation is not an error; lookups report it as
/// `Ok(None)`.
#[derive(Debug, Error)]
pub enum Error {
    /// The schema provider has no definition for the entity.
    #[error("unknown entity: {0}")]
    UnknownEntity(String),

    /// The provider answered with a definition for a different entity.
    #[error("entity {requested} resolved to a definition named {declared}")]
    EntityNameMismatch {
        /// Name that was looked up.
        requested: String,
        /// Name carried by the returned definition.
        declared: String,
    },

    /// The entity has no field with this name.
    #[error("entity {entity} has no field named {field}")]
    UnknownField {
        /// Entity name.
        entity: String,
        /// Missing field name.
        field: String,
    },

    /// Two fields of one entity share a name.
    #[error("entity {entity} declares field {field} more than once")]
    DuplicateField {
        /// Entity name.
        entity: String,
        /// Duplicated field name.
        field: String,
    },

    /// A relation references an entity without a primary key.
    #[error("entity {0} has no primary key")]
    MissingPrimaryKey(String),

    /// A relation references an entity whose primary key spans several fields.
    #[error("entity {entity} has a composite primary key of {count} fields")]
    CompositePrimaryKey {
        /// Entity name.
        entity: String,
        /// Number of primary-key fields.
        count: usize,
    },

    /// A relation field does not have the shape of the key it references.
    #[error(
        "relation key {entity}.{field} is {found} but the primary key of {referenced} is {expected}"
    )]
    KeyShapeMismatch {
        /// Entity holding the relation field.
        entity: String,
        /// Relation field name.
        field: String,
        /// Entity whose primary key is referenced.
        referenced: String,
        /// Shape of the referenced primary key.
        expected: FieldShape,
        /// Shape of the relation field.
        found: FieldShape,
    },

    /// A synthesized join entity lacks the field a binding expects.
    #[error("join entity {join} has no field named {field}")]
    JoinFieldNotFound {
        /// Join entity name.
        join: String,
        /// Expected field name.
        field: String,
    },

    /// A synthesized join entity name is already taken.
    #[error("join entity {name} for {left} and {right} collides with an existing entity")]
    JoinNameConflict {
        /// Join entity name.
        name: String,
        /// Left participant of the rejected pair.
        left: String,
        /// Right participant of the rejected pair.
        right: String,
    },

    /// A field tag string could not be parsed.
    #[error("invalid field tag: {0}")]
    InvalidTag(String),

    /// A schema document could not be parsed.
    #[error("schema parse error: {0}")]
    SchemaParse(#[from] serde_json::Error),

    /// A schema document could not be read.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Whether this error reflects an invalid schema rather than an
    /// environmental failure.
    pub fn is_configuration(&self) -> bool {
        !matches!(self, Error::Io(_))
    }
}

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, Error>;
