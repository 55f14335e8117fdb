//! relbind core - entity catalog, relation binding, and handler chains.
//!
//! This crate turns declared entity schemas into shared, cached metadata and
//! resolves the relations between entities.

pub mod catalog;
pub mod error;
pub mod pipeline;
pub mod registry;
pub mod relation;

pub use catalog::{
    Entity, EntityDef, EntityDescriptor, FieldDef, FieldShape, FieldTags, ScalarType,
    SchemaProvider, SchemaSet,
};
pub use error::{Error, Result};
pub use pipeline::{HandlerChain, Operation, PipelineComposer, Step};
pub use registry::EntityRegistry;
pub use relation::{
    CacheStats, JoinOptions, RelationBinder, RelationCache, RelationDescriptor, RelationKind,
    Side,
};
