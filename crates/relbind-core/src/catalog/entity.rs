//! Entity definitions and validated entity descriptors.

use super::field::FieldDef;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A declared entity (table schema) as produced by a schema provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityDef {
    /// Entity name (unique within a schema).
    pub name: String,
    /// Field definitions, in declaration order.
    #[serde(default)]
    pub fields: Vec<FieldDef>,
}

impl EntityDef {
    /// Create a new entity definition.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    /// Add a field to the entity.
    pub fn with_field(mut self, field: FieldDef) -> Self {
        self.fields.push(field);
        self
    }

    /// Add multiple fields.
    pub fn with_fields(mut self, fields: impl IntoIterator<Item = FieldDef>) -> Self {
        self.fields.extend(fields);
        self
    }

    /// Get a field by name.
    pub fn get_field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// Participants of a synthesized join entity, in canonical order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinParticipants {
    /// Entity referenced by the first join field.
    pub left: String,
    /// Entity referenced by the second join field.
    pub right: String,
}

/// Validated, immutable metadata for one entity.
///
/// Descriptors are built once by the [`EntityRegistry`](crate::EntityRegistry)
/// and shared behind an `Arc` afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityDescriptor {
    name: String,
    fields: Vec<FieldDef>,
    by_name: HashMap<String, usize>,
    primary_keys: Vec<usize>,
    join: Option<JoinParticipants>,
}

impl EntityDescriptor {
    /// Validate a declared entity.
    pub fn build(def: EntityDef) -> Result<Self> {
        let mut by_name = HashMap::with_capacity(def.fields.len());
        let mut primary_keys = Vec::new();

        for (index, field) in def.fields.iter().enumerate() {
            if by_name.insert(field.name.clone(), index).is_some() {
                return Err(Error::DuplicateField {
                    entity: def.name,
                    field: field.name.clone(),
                });
            }
            if field.is_primary_key() {
                primary_keys.push(index);
            }
        }

        Ok(Self {
            name: def.name,
            fields: def.fields,
            by_name,
            primary_keys,
            join: None,
        })
    }

    /// Validate a synthesized join entity.
    pub(crate) fn build_join(def: EntityDef, participants: JoinParticipants) -> Result<Self> {
        let mut descriptor = Self::build(def)?;
        descriptor.join = Some(participants);
        Ok(descriptor)
    }

    /// Entity name, which is also its identity.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Fields in declaration order.
    pub fn fields(&self) -> &[FieldDef] {
        &self.fields
    }

    /// Get a field by name.
    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.by_name.get(name).map(|&index| &self.fields[index])
    }

    /// Check whether a field exists.
    pub fn has_field(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    /// All primary-key fields.
    pub fn primary_keys(&self) -> impl Iterator<Item = &FieldDef> {
        self.primary_keys.iter().map(|&index| &self.fields[index])
    }

    /// The single primary-key field.
    ///
    /// Relations can only reference entities keyed by exactly one field.
    pub fn primary_key(&self) -> Result<&FieldDef> {
        match self.primary_keys.as_slice() {
            [index] => Ok(&self.fields[*index]),
            [] => Err(Error::MissingPrimaryKey(self.name.clone())),
            keys => Err(Error::CompositePrimaryKey {
                entity: self.name.clone(),
                count: keys.len(),
            }),
        }
    }

    /// Fields that can carry a relation (struct or slice shaped).
    pub fn relation_candidates(&self) -> impl Iterator<Item = &FieldDef> {
        self.fields.iter().filter(|f| f.shape.entity().is_some())
    }

    /// Join participants if this entity was synthesized for a many-to-many relation.
    pub fn join_participants(&self) -> Option<&JoinParticipants> {
        self.join.as_ref()
    }

    /// Check if this is a synthesized join entity.
    pub fn is_join(&self) -> bool {
        self.join.is_some()
    }
}
