//! relbind - relation-aware entity mapping.
//!
//! The [`Mapper`] is the entry point: open one for a backing store, resolve
//! entities through it, and ask for the relations and handler chains those
//! entities expose. Metadata is built lazily and shared across threads.
//!
//! ```no_run
//! use relbind::{Mapper, MapperConfig};
//!
//! let config = MapperConfig::from_json_file("relbind.json")?;
//! let mapper = Mapper::from_config(&config)?;
//! let blogs = mapper.preload("User", "Blogs")?;
//! # Ok::<(), relbind::Error>(())
//! ```

pub mod config;
pub mod dialect;
pub mod error;
pub mod mapper;

pub use config::MapperConfig;
pub use dialect::Dialect;
pub use error::{Error, Result};
pub use mapper::{EntityHandle, Mapper};

/// Re-export the core engine.
pub use relbind_core as engine;

pub use relbind_core::{
    Entity, EntityDef, EntityDescriptor, FieldDef, FieldShape, FieldTags, HandlerChain,
    JoinOptions, Operation, RelationDescriptor, RelationKind, ScalarType, SchemaProvider,
    SchemaSet, Side, Step,
};
