//! Relation binding and classification.
//!
//! Classification looks only at the container field's declared shape and at
//! the `<Name>ID` field naming convention:
//!
//! | Container shape | Condition | Relation |
//! |---|---|---|
//! | struct | owner has `<Container>ID` or `<Sub>ID` | belongs-to |
//! | struct | sub has `<Owner>ID` | owns-one |
//! | slice of struct | element has `<Owner>ID` | owns-many |
//!
//! Conditions are tried top to bottom and the first match wins. No match is a
//! legitimate outcome, not an error. Many-to-many is never inferred since a
//! slice shape alone cannot tell it apart from owns-many.

use super::descriptor::{ForeignKeyRelation, JoinRelation, RelationDescriptor, Side};
use super::join::{counterpart_field_names, JoinOptions};
use crate::catalog::{EntityDescriptor, FieldDef, FieldShape};
use crate::error::{Error, Result};
use crate::registry::EntityRegistry;
use std::sync::Arc;
use tracing::debug;

/// Conventional name of a field referencing `entity`.
pub fn relation_field_name(entity: &str) -> String {
    format!("{}ID", entity)
}

/// Binds relations between entities held by a registry.
#[derive(Debug, Clone)]
pub struct RelationBinder {
    registry: Arc<EntityRegistry>,
}

impl RelationBinder {
    /// Create a binder over `registry`.
    pub fn new(registry: Arc<EntityRegistry>) -> Self {
        Self { registry }
    }

    /// The registry entities are resolved from.
    pub fn registry(&self) -> &Arc<EntityRegistry> {
        &self.registry
    }

    /// Classify and bind the relation exposed by `owner.field_name`.
    pub fn classify(
        &self,
        owner: &Arc<EntityDescriptor>,
        field_name: &str,
    ) -> Result<Option<RelationDescriptor>> {
        let container = container_field(owner, field_name)?;

        match &container.shape {
            FieldShape::Primitive(_) => Ok(None),
            FieldShape::Struct(entity) => {
                let sub = self.registry.resolve(entity)?;
                let belongs = [
                    relation_field_name(&container.name),
                    relation_field_name(sub.name()),
                ];
                if let Some(relation_field) = belongs.iter().find_map(|name| owner.field(name)) {
                    return self
                        .bind_belongs_to(owner, &sub, container, relation_field)
                        .map(Some);
                }
                if let Some(relation_field) = sub.field(&relation_field_name(owner.name())) {
                    return self
                        .bind_owns_one(owner, &sub, container, relation_field)
                        .map(Some);
                }
                debug!(
                    owner = owner.name(),
                    field = field_name,
                    sub = sub.name(),
                    "no relation convention matched"
                );
                Ok(None)
            }
            FieldShape::SliceOfStruct(entity) => {
                let sub = self.registry.resolve(entity)?;
                match sub.field(&relation_field_name(owner.name())) {
                    Some(relation_field) => self
                        .bind_owns_many(owner, &sub, container, relation_field)
                        .map(Some),
                    None => {
                        debug!(
                            owner = owner.name(),
                            field = field_name,
                            sub = sub.name(),
                            "no relation convention matched"
                        );
                        Ok(None)
                    }
                }
            }
        }
    }

    /// Bind `owner.field_name` as a many-to-many relation.
    ///
    /// Returns `Ok(None)` when the field is not a slice of entities.
    pub fn classify_many_to_many(
        &self,
        owner: &Arc<EntityDescriptor>,
        field_name: &str,
        options: &JoinOptions,
        side: Side,
    ) -> Result<Option<RelationDescriptor>> {
        let container = container_field(owner, field_name)?;
        match &container.shape {
            FieldShape::SliceOfStruct(entity) => {
                let sub = self.registry.resolve(entity)?;
                self.bind_many_to_many(owner, &sub, container, options, side)
                    .map(Some)
            }
            _ => Ok(None),
        }
    }

    /// Bind a belongs-to relation: `relation_field` on `owner` references `sub`.
    pub fn bind_belongs_to(
        &self,
        owner: &Arc<EntityDescriptor>,
        sub: &Arc<EntityDescriptor>,
        container_field: &FieldDef,
        relation_field: &FieldDef,
    ) -> Result<RelationDescriptor> {
        check_key_shape(owner, relation_field, sub)?;
        self.registry
            .mark_foreign(owner.name(), &relation_field.name, sub.name());
        Ok(RelationDescriptor::BelongsTo(ForeignKeyRelation {
            owner: owner.clone(),
            sub: sub.clone(),
            container_field: container_field.clone(),
            relation_field: relation_field.clone(),
        }))
    }

    /// Bind an owns-one relation: `relation_field` on `sub` references `owner`.
    pub fn bind_owns_one(
        &self,
        owner: &Arc<EntityDescriptor>,
        sub: &Arc<EntityDescriptor>,
        container_field: &FieldDef,
        relation_field: &FieldDef,
    ) -> Result<RelationDescriptor> {
        self.bind_owned(owner, sub, container_field, relation_field)
            .map(RelationDescriptor::OwnsOne)
    }

    /// Bind an owns-many relation: `relation_field` on `sub` references `owner`.
    pub fn bind_owns_many(
        &self,
        owner: &Arc<EntityDescriptor>,
        sub: &Arc<EntityDescriptor>,
        container_field: &FieldDef,
        relation_field: &FieldDef,
    ) -> Result<RelationDescriptor> {
        self.bind_owned(owner, sub, container_field, relation_field)
            .map(RelationDescriptor::OwnsMany)
    }

    fn bind_owned(
        &self,
        owner: &Arc<EntityDescriptor>,
        sub: &Arc<EntityDescriptor>,
        container_field: &FieldDef,
        relation_field: &FieldDef,
    ) -> Result<ForeignKeyRelation> {
        check_key_shape(sub, relation_field, owner)?;
        self.registry
            .mark_foreign(sub.name(), &relation_field.name, owner.name());
        Ok(ForeignKeyRelation {
            owner: owner.clone(),
            sub: sub.clone(),
            container_field: container_field.clone(),
            relation_field: relation_field.clone(),
        })
    }

    /// Bind a many-to-many relation through a synthesized join entity.
    pub fn bind_many_to_many(
        &self,
        owner: &Arc<EntityDescriptor>,
        sub: &Arc<EntityDescriptor>,
        container_field: &FieldDef,
        options: &JoinOptions,
        side: Side,
    ) -> Result<RelationDescriptor> {
        let join = self.registry.resolve_join(owner, sub, options)?;
        let (owner_field, sub_field) = counterpart_field_names(owner.name(), sub.name(), side);
        let relation_field = join_field(&join, &owner_field)?;
        let sub_relation_field = join_field(&join, &sub_field)?;

        check_key_shape(&join, relation_field, owner)?;
        check_key_shape(&join, sub_relation_field, sub)?;
        self.registry
            .mark_foreign(join.name(), &relation_field.name, owner.name());
        self.registry
            .mark_foreign(join.name(), &sub_relation_field.name, sub.name());

        Ok(RelationDescriptor::ManyToMany(JoinRelation {
            owner: owner.clone(),
            sub: sub.clone(),
            container_field: container_field.clone(),
            relation_field: relation_field.clone(),
            sub_relation_field: sub_relation_field.clone(),
            join: join.clone(),
            side,
        }))
    }
}

fn container_field<'a>(owner: &'a EntityDescriptor, field_name: &str) -> Result<&'a FieldDef> {
    owner.field(field_name).ok_or_else(|| Error::UnknownField {
        entity: owner.name().to_string(),
        field: field_name.to_string(),
    })
}

fn join_field<'a>(join: &'a EntityDescriptor, name: &str) -> Result<&'a FieldDef> {
    join.field(name).ok_or_else(|| Error::JoinFieldNotFound {
        join: join.name().to_string(),
        field: name.to_string(),
    })
}

/// The relation field must have exactly the shape of the referenced primary key.
fn check_key_shape(
    holder: &EntityDescriptor,
    relation_field: &FieldDef,
    referenced: &EntityDescriptor,
) -> Result<()> {
    let key = referenced.primary_key()?;
    if relation_field.shape != key.shape {
        return Err(Error::KeyShapeMismatch {
            entity: holder.name().to_string(),
            field: relation_field.name.clone(),
            referenced: referenced.name().to_string(),
            expected: key.shape.clone(),
            found: relation_field.shape.clone(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{EntityDef, ScalarType, SchemaSet};
    use crate::relation::RelationKind;

    fn schema() -> SchemaSet {
        SchemaSet::new()
            .with_entity(
                EntityDef::new("User")
                    .with_field(FieldDef::primitive("ID", ScalarType::Int64).primary_key())
                    .with_field(FieldDef::primitive("Name", ScalarType::String))
                    .with_field(FieldDef::new("Detail", FieldShape::struct_of("UserDetail")))
                    .with_field(FieldDef::new("Blogs", FieldShape::slice_of("Blog")))
                    .with_field(FieldDef::new("Tags", FieldShape::slice_of("Tag")))
                    .with_field(FieldDef::new("Friends", FieldShape::slice_of("User"))),
            )
            .with_entity(
                EntityDef::new("UserDetail")
                    .with_field(FieldDef::primitive("ID", ScalarType::Int64).primary_key())
                    .with_field(FieldDef::primitive("UserID", ScalarType::Int64).foreign_key()),
            )
            .with_entity(
                EntityDef::new("Blog")
                    .with_field(FieldDef::primitive("ID", ScalarType::Int64).primary_key())
                    .with_field(FieldDef::optional(
                        "UserID",
                        FieldShape::primitive(ScalarType::Int64),
                    ))
                    .with_field(FieldDef::new("User", FieldShape::struct_of("User"))),
            )
            .with_entity(
                EntityDef::new("Tag")
                    .with_field(FieldDef::primitive("ID", ScalarType::String).primary_key()),
            )
    }

    fn binder() -> RelationBinder {
        RelationBinder::new(Arc::new(EntityRegistry::new(Arc::new(schema()))))
    }

    fn entity(binder: &RelationBinder, name: &str) -> Arc<EntityDescriptor> {
        binder.registry().resolve(name).unwrap()
    }

    #[test]
    fn test_classify_belongs_to() {
        let binder = binder();
        let blog = entity(&binder, "Blog");

        let relation = binder.classify(&blog, "User").unwrap().unwrap();

        assert_eq!(relation.kind(), RelationKind::BelongsTo);
        assert_eq!(relation.relation_field().name, "UserID");
        assert_eq!(relation.key_holder().name(), "Blog");
        assert_eq!(
            binder.registry().foreign_target("Blog", "UserID").as_deref(),
            Some("User")
        );
    }

    #[test]
    fn test_classify_owns_one() {
        let binder = binder();
        let user = entity(&binder, "User");

        let relation = binder.classify(&user, "Detail").unwrap().unwrap();

        assert_eq!(relation.kind(), RelationKind::OwnsOne);
        assert_eq!(relation.sub().name(), "UserDetail");
        assert_eq!(relation.key_holder().name(), "UserDetail");
    }

    #[test]
    fn test_classify_owns_many() {
        let binder = binder();
        let user = entity(&binder, "User");

        let relation = binder.classify(&user, "Blogs").unwrap().unwrap();

        assert_eq!(relation.kind(), RelationKind::OwnsMany);
        assert_eq!(relation.container_field().name, "Blogs");
        assert!(relation.join_entity().is_none());
    }

    #[test]
    fn test_classify_no_match() {
        let binder = binder();
        let user = entity(&binder, "User");

        assert!(binder.classify(&user, "Name").unwrap().is_none());
        assert!(binder.classify(&user, "Tags").unwrap().is_none());
        assert!(binder.classify(&user, "Friends").unwrap().is_none());
    }

    #[test]
    fn test_classify_unknown_field() {
        let binder = binder();
        let user = entity(&binder, "User");

        let err = binder.classify(&user, "Nope").unwrap_err();
        assert!(matches!(err, Error::UnknownField { field, .. } if field == "Nope"));
    }

    #[test]
    fn test_bind_many_to_many() {
        let binder = binder();
        let user = entity(&binder, "User");

        let relation = binder
            .classify_many_to_many(&user, "Tags", &JoinOptions::default(), Side::Left)
            .unwrap()
            .unwrap();

        assert_eq!(relation.kind(), RelationKind::ManyToMany);
        assert_eq!(relation.join_entity().unwrap().name(), "Tag_User");
        assert_eq!(relation.relation_field().name, "UserID");
        assert_eq!(relation.sub_relation_field().unwrap().name, "TagID");
        assert_eq!(
            binder.registry().foreign_target("Tag_User", "TagID").as_deref(),
            Some("Tag")
        );
    }

    #[test]
    fn test_many_to_many_requires_slice() {
        let binder = binder();
        let user = entity(&binder, "User");

        let relation = binder
            .classify_many_to_many(&user, "Detail", &JoinOptions::default(), Side::Left)
            .unwrap();
        assert!(relation.is_none());
    }

    #[test]
    fn test_key_shape_mismatch() {
        let binder = binder();
        let user = entity(&binder, "User");
        let tag = entity(&binder, "Tag");
        let container = FieldDef::new("Tag", FieldShape::struct_of("Tag"));
        let relation_field = user.field("ID").unwrap().clone();

        let err = binder
            .bind_belongs_to(&user, &tag, &container, &relation_field)
            .unwrap_err();

        match err {
            Error::KeyShapeMismatch {
                expected, found, ..
            } => {
                assert_eq!(expected, FieldShape::primitive(ScalarType::String));
                assert_eq!(found, FieldShape::primitive(ScalarType::Int64));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(binder.registry().foreign_target("User", "ID").is_none());
    }
}
