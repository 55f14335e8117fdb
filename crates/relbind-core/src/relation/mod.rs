//! Relation resolution.
//!
//! Relations are classified from field shapes, bound into immutable
//! descriptors, and memoized per (entity, field[, side]).

mod binder;
mod cache;
mod descriptor;
pub(crate) mod join;

pub use binder::{relation_field_name, RelationBinder};
pub use cache::{CacheStats, RelationCache, RelationKey};
pub use descriptor::{ForeignKeyRelation, JoinRelation, RelationDescriptor, RelationKind, Side};
pub use join::{counterpart_field_names, join_entity_name, JoinOptions};
