//! Schema providers.
//!
//! A provider answers "what does entity X look like" with an [`EntityDef`].
//! The registry asks it at most once per entity.

use super::entity::EntityDef;
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Source of declared entity schemas.
pub trait SchemaProvider: Send + Sync {
    /// Return the definition of `entity`, if known.
    fn entity_def(&self, entity: &str) -> Option<EntityDef>;
}

/// A statically described application entity.
pub trait Entity {
    /// Entity name, used as its identity.
    const NAME: &'static str;

    /// Declared fields of the entity.
    fn entity_def() -> EntityDef;

    /// Definitions of the entities reachable through struct and slice fields.
    ///
    /// The registry falls back to these when its provider does not know a
    /// related entity.
    fn related() -> Vec<EntityDef> {
        Vec::new()
    }
}

/// In-memory set of entity definitions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaSet {
    #[serde(with = "entity_list")]
    entities: BTreeMap<String, EntityDef>,
}

impl SchemaSet {
    /// Create an empty schema set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entity definition, replacing any previous one with the same name.
    pub fn with_entity(mut self, entity: EntityDef) -> Self {
        self.insert(entity);
        self
    }

    /// Add a typed entity.
    pub fn with<E: Entity>(self) -> Self {
        self.with_entity(E::entity_def())
    }

    /// Insert an entity definition.
    pub fn insert(&mut self, entity: EntityDef) {
        self.entities.insert(entity.name.clone(), entity);
    }

    /// Get an entity by name.
    pub fn get(&self, name: &str) -> Option<&EntityDef> {
        self.entities.get(name)
    }

    /// Entity names in sorted order.
    pub fn entity_names(&self) -> impl Iterator<Item = &str> {
        self.entities.keys().map(String::as_str)
    }

    /// Number of entities.
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Check if the set is empty.
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Parse a schema document.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read and parse a schema document.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }
}

impl SchemaProvider for SchemaSet {
    fn entity_def(&self, entity: &str) -> Option<EntityDef> {
        self.entities.get(entity).cloned()
    }
}

/// Schema documents list entities as an array.
mod entity_list {
    use super::EntityDef;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::collections::BTreeMap;

    pub fn serialize<S: Serializer>(
        entities: &BTreeMap<String, EntityDef>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        let list: Vec<&EntityDef> = entities.values().collect();
        list.serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<BTreeMap<String, EntityDef>, D::Error> {
        let list = Vec::<EntityDef>::deserialize(deserializer)?;
        Ok(list.into_iter().map(|e| (e.name.clone(), e)).collect())
    }
}
