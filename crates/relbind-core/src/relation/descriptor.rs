//! Resolved relation descriptors.

use crate::catalog::{EntityDescriptor, FieldDef};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Kind of a resolved relation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RelationKind {
    /// The owner holds a key referencing the sub-entity.
    BelongsTo,
    /// The sub-entity holds a key referencing the owner; single-valued.
    OwnsOne,
    /// The sub-entity holds a key referencing the owner; collection.
    OwnsMany,
    /// A join entity holds keys referencing both sides.
    ManyToMany,
}

impl RelationKind {
    /// Stable name for output.
    pub fn as_str(&self) -> &'static str {
        match self {
            RelationKind::BelongsTo => "belongs_to",
            RelationKind::OwnsOne => "owns_one",
            RelationKind::OwnsMany => "owns_many",
            RelationKind::ManyToMany => "many_to_many",
        }
    }
}

impl fmt::Display for RelationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Perspective of a many-to-many binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    /// The owner takes the left join field.
    #[default]
    Left,
    /// The owner takes the right join field.
    Right,
}

impl Side {
    /// The other side.
    pub fn flip(self) -> Self {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }
}

impl From<bool> for Side {
    /// `true` selects the right side.
    fn from(is_right: bool) -> Self {
        if is_right {
            Side::Right
        } else {
            Side::Left
        }
    }
}

/// A relation carried by a single foreign-key field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeignKeyRelation {
    /// Entity declaring the container field.
    pub owner: Arc<EntityDescriptor>,
    /// Related entity.
    pub sub: Arc<EntityDescriptor>,
    /// Field on the owner exposing the related data.
    pub container_field: FieldDef,
    /// Foreign-key field.
    pub relation_field: FieldDef,
}

/// A relation carried by a synthesized join entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinRelation {
    /// Entity declaring the container field.
    pub owner: Arc<EntityDescriptor>,
    /// Related entity.
    pub sub: Arc<EntityDescriptor>,
    /// Join entity linking both.
    pub join: Arc<EntityDescriptor>,
    /// Field on the owner exposing the related data.
    pub container_field: FieldDef,
    /// Join field referencing the owner.
    pub relation_field: FieldDef,
    /// Join field referencing the sub-entity.
    pub sub_relation_field: FieldDef,
    /// Binding perspective.
    pub side: Side,
}

/// A resolved, immutable relation between two entities.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelationDescriptor {
    /// Owner holds the key; see [`RelationKind::BelongsTo`].
    BelongsTo(ForeignKeyRelation),
    /// Sub-entity holds the key; see [`RelationKind::OwnsOne`].
    OwnsOne(ForeignKeyRelation),
    /// Sub-entity holds the key; see [`RelationKind::OwnsMany`].
    OwnsMany(ForeignKeyRelation),
    /// Join entity holds both keys.
    ManyToMany(JoinRelation),
}

impl RelationDescriptor {
    /// Relation kind.
    pub fn kind(&self) -> RelationKind {
        match self {
            RelationDescriptor::BelongsTo(_) => RelationKind::BelongsTo,
            RelationDescriptor::OwnsOne(_) => RelationKind::OwnsOne,
            RelationDescriptor::OwnsMany(_) => RelationKind::OwnsMany,
            RelationDescriptor::ManyToMany(_) => RelationKind::ManyToMany,
        }
    }

    /// Entity declaring the container field.
    pub fn owner(&self) -> &Arc<EntityDescriptor> {
        match self {
            RelationDescriptor::BelongsTo(r)
            | RelationDescriptor::OwnsOne(r)
            | RelationDescriptor::OwnsMany(r) => &r.owner,
            RelationDescriptor::ManyToMany(r) => &r.owner,
        }
    }

    /// Related entity.
    pub fn sub(&self) -> &Arc<EntityDescriptor> {
        match self {
            RelationDescriptor::BelongsTo(r)
            | RelationDescriptor::OwnsOne(r)
            | RelationDescriptor::OwnsMany(r) => &r.sub,
            RelationDescriptor::ManyToMany(r) => &r.sub,
        }
    }

    /// Field on the owner exposing the related data.
    pub fn container_field(&self) -> &FieldDef {
        match self {
            RelationDescriptor::BelongsTo(r)
            | RelationDescriptor::OwnsOne(r)
            | RelationDescriptor::OwnsMany(r) => &r.container_field,
            RelationDescriptor::ManyToMany(r) => &r.container_field,
        }
    }

    /// Foreign-key field. For many-to-many, the join field referencing the owner.
    pub fn relation_field(&self) -> &FieldDef {
        match self {
            RelationDescriptor::BelongsTo(r)
            | RelationDescriptor::OwnsOne(r)
            | RelationDescriptor::OwnsMany(r) => &r.relation_field,
            RelationDescriptor::ManyToMany(r) => &r.relation_field,
        }
    }

    /// Entity that physically holds [`relation_field`](Self::relation_field).
    pub fn key_holder(&self) -> &Arc<EntityDescriptor> {
        match self {
            RelationDescriptor::BelongsTo(r) => &r.owner,
            RelationDescriptor::OwnsOne(r) | RelationDescriptor::OwnsMany(r) => &r.sub,
            RelationDescriptor::ManyToMany(r) => &r.join,
        }
    }

    /// Join entity, for many-to-many relations.
    pub fn join_entity(&self) -> Option<&Arc<EntityDescriptor>> {
        match self {
            RelationDescriptor::ManyToMany(r) => Some(&r.join),
            _ => None,
        }
    }

    /// Join field referencing the sub-entity, for many-to-many relations.
    pub fn sub_relation_field(&self) -> Option<&FieldDef> {
        match self {
            RelationDescriptor::ManyToMany(r) => Some(&r.sub_relation_field),
            _ => None,
        }
    }

    /// Binding perspective, for many-to-many relations.
    pub fn side(&self) -> Option<Side> {
        match self {
            RelationDescriptor::ManyToMany(r) => Some(r.side),
            _ => None,
        }
    }
}
