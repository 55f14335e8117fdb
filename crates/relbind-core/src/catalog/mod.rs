//! Entity catalog.
//!
//! The catalog describes entities, their fields, and the shapes those fields hold.

mod entity;
mod field;
mod provider;
mod tags;
mod types;

pub use entity::{EntityDef, EntityDescriptor, JoinParticipants};
pub use field::FieldDef;
pub use provider::{Entity, SchemaProvider, SchemaSet};
pub use tags::FieldTags;
pub use types::{FieldShape, ScalarType};
