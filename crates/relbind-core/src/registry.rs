//! Entity registry.
//!
//! Lazily builds one [`EntityDescriptor`] per entity and one per synthesized
//! join entity, and keeps the side table of foreign-key back-references. All
//! tables only grow.
//!
//! Entity and join entity names share one namespace. A join entity whose name
//! is already taken by a declared entity or by another pair is rejected.

use crate::catalog::{Entity, EntityDef, EntityDescriptor, SchemaProvider};
use crate::error::{Error, Result};
use crate::relation::join::{self, JoinKey, JoinOptions};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, trace, warn};

/// Process-lifetime cache of entity metadata.
pub struct EntityRegistry {
    provider: Arc<dyn SchemaProvider>,
    entities: DashMap<String, Arc<EntityDescriptor>>,
    joins: DashMap<JoinKey, Arc<EntityDescriptor>>,
    /// Join entity name -> canonical participant pair.
    join_names: DashMap<String, (String, String)>,
    /// Definitions contributed by typed entities for their related entities.
    seeded: DashMap<String, EntityDef>,
    /// (entity, field) -> entity whose primary key the field references.
    foreign: DashMap<(String, String), String>,
    constructions: AtomicU64,
}

impl EntityRegistry {
    /// Create a registry backed by `provider`.
    pub fn new(provider: Arc<dyn SchemaProvider>) -> Self {
        Self {
            provider,
            entities: DashMap::new(),
            joins: DashMap::new(),
            join_names: DashMap::new(),
            seeded: DashMap::new(),
            foreign: DashMap::new(),
            constructions: AtomicU64::new(0),
        }
    }

    /// Resolve an entity through the schema provider.
    pub fn resolve(&self, name: &str) -> Result<Arc<EntityDescriptor>> {
        if let Some(descriptor) = self.entities.get(name) {
            trace!(entity = name, "entity cache hit");
            return Ok(descriptor.clone());
        }
        self.resolve_with(name, || {
            self.provider
                .entity_def(name)
                .or_else(|| self.seeded.get(name).map(|def| def.clone()))
        })
    }

    /// Resolve a typed entity from its own definition.
    ///
    /// The entity's related definitions become resolvable by name, so its
    /// struct and slice fields bind without resolving those entities first.
    pub fn resolve_entity<E: Entity>(&self) -> Result<Arc<EntityDescriptor>> {
        if let Some(descriptor) = self.entities.get(E::NAME) {
            return Ok(descriptor.clone());
        }
        for def in E::related() {
            self.seeded.entry(def.name.clone()).or_insert(def);
        }
        self.resolve_with(E::NAME, || Some(E::entity_def()))
    }

    /// Resolve an entity, building it from `source` on first reference.
    ///
    /// The descriptor is built while the map shard for `name` is locked, so
    /// concurrent first references construct it exactly once. `source` must
    /// not call back into the registry.
    pub fn resolve_with<F>(&self, name: &str, source: F) -> Result<Arc<EntityDescriptor>>
    where
        F: FnOnce() -> Option<EntityDef>,
    {
        if let Some(pair) = self.join_names.get(name) {
            return Err(Error::JoinNameConflict {
                name: name.to_string(),
                left: pair.0.clone(),
                right: pair.1.clone(),
            });
        }
        match self.entities.entry(name.to_string()) {
            Entry::Occupied(entry) => Ok(entry.get().clone()),
            Entry::Vacant(entry) => {
                let def = source().ok_or_else(|| Error::UnknownEntity(name.to_string()))?;
                if def.name != name {
                    return Err(Error::EntityNameMismatch {
                        requested: name.to_string(),
                        declared: def.name,
                    });
                }
                let descriptor = Arc::new(EntityDescriptor::build(def)?);
                self.constructions.fetch_add(1, Ordering::Relaxed);
                debug!(
                    entity = name,
                    fields = descriptor.fields().len(),
                    "built entity descriptor"
                );
                Ok(entry.insert(descriptor).clone())
            }
        }
    }

    /// Resolve the join entity linking `left` and `right`.
    ///
    /// The pair is unordered: `(A, B)` and `(B, A)` share one descriptor.
    pub fn resolve_join(
        &self,
        left: &EntityDescriptor,
        right: &EntityDescriptor,
        options: &JoinOptions,
    ) -> Result<Arc<EntityDescriptor>> {
        let key = JoinKey::new(left.name(), right.name(), options);
        if let Some(descriptor) = self.joins.get(&key) {
            trace!(join = descriptor.name(), "join entity cache hit");
            return Ok(descriptor.clone());
        }

        let name = join::join_entity_name(left.name(), right.name());
        if self.entities.contains_key(&name)
            || self.seeded.contains_key(&name)
            || self.provider.entity_def(&name).is_some()
        {
            return Err(Error::JoinNameConflict {
                name,
                left: key.left().to_string(),
                right: key.right().to_string(),
            });
        }

        match self.joins.entry(key) {
            Entry::Occupied(entry) => Ok(entry.get().clone()),
            Entry::Vacant(entry) => {
                let pair = (entry.key().left().to_string(), entry.key().right().to_string());
                let claimed = self
                    .join_names
                    .entry(name.clone())
                    .or_insert_with(|| pair.clone())
                    .clone();
                if claimed != pair {
                    return Err(Error::JoinNameConflict {
                        name,
                        left: pair.0,
                        right: pair.1,
                    });
                }
                let descriptor = Arc::new(join::synthesize(left, right, options)?);
                self.constructions.fetch_add(1, Ordering::Relaxed);
                debug!(join = descriptor.name(), "synthesized join entity");
                Ok(entry.insert(descriptor).clone())
            }
        }
    }

    /// Record that `entity.field` references the primary key of `target`.
    ///
    /// The first recorded target wins; the effective target is returned.
    pub fn mark_foreign(&self, entity: &str, field: &str, target: &str) -> String {
        let recorded = self
            .foreign
            .entry((entity.to_string(), field.to_string()))
            .or_insert_with(|| target.to_string())
            .clone();
        if recorded != target {
            warn!(
                entity,
                field,
                recorded = %recorded,
                rejected = target,
                "foreign key already bound to another entity"
            );
        }
        recorded
    }

    /// Entity referenced by `entity.field`, if a relation has bound it.
    pub fn foreign_target(&self, entity: &str, field: &str) -> Option<String> {
        self.foreign
            .get(&(entity.to_string(), field.to_string()))
            .map(|target| target.clone())
    }

    /// Cached entity descriptor, without consulting the provider.
    pub fn cached(&self, name: &str) -> Option<Arc<EntityDescriptor>> {
        self.entities.get(name).map(|entry| entry.clone())
    }

    /// All synthesized join entities.
    pub fn join_entities(&self) -> Vec<Arc<EntityDescriptor>> {
        self.joins.iter().map(|entry| entry.value().clone()).collect()
    }

    /// Number of cached declared entities.
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Number of descriptors built so far, join entities included.
    pub fn constructions(&self) -> u64 {
        self.constructions.load(Ordering::Relaxed)
    }
}

impl std::fmt::Debug for EntityRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntityRegistry")
            .field("entities", &self.entities.len())
            .field("joins", &self.joins.len())
            .field("seeded", &self.seeded.len())
            .field("foreign", &self.foreign.len())
            .finish()
    }
}
