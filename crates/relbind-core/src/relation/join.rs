//! Join entity synthesis for many-to-many relations.
//!
//! A join entity is never declared by the application. It holds one key field
//! per participant, named after the participant (`<Entity>ID`). Participants
//! are sorted by name so both directions of a relation share one join entity.
//! A self-referential pair would produce two fields with the same name, so
//! those get `L_` and `R_` prefixes instead.
//!
//! The `<Lo>_<Hi>` name is not unique for names containing `_`. The registry
//! rejects a join whose name is already taken.

use super::descriptor::Side;
use crate::catalog::{EntityDef, EntityDescriptor, FieldDef, FieldTags, JoinParticipants};
use crate::error::Result;
use serde::{Deserialize, Serialize};

const LEFT_PREFIX: &str = "L_";
const RIGHT_PREFIX: &str = "R_";

/// Attributes applied to both fields of a synthesized join entity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JoinOptions {
    /// Tags copied onto each join field. The foreign-key marker is always added.
    pub tags: FieldTags,
}

impl JoinOptions {
    /// Create options with the given field tags.
    pub fn new(tags: FieldTags) -> Self {
        Self { tags }
    }

    /// Create options from a tag string such as `primary key;index`.
    pub fn from_tags(tags: &str) -> Result<Self> {
        Ok(Self::new(FieldTags::parse(tags)?))
    }
}

impl Default for JoinOptions {
    /// Both join fields form a composite primary key.
    fn default() -> Self {
        Self::new(FieldTags::new().with_primary_key())
    }
}

/// Identity of a join entity: the canonical participant pair plus options.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) struct JoinKey {
    left: String,
    right: String,
    options: JoinOptions,
}

impl JoinKey {
    pub(crate) fn new(a: &str, b: &str, options: &JoinOptions) -> Self {
        let (left, right) = canonical(a, b);
        Self {
            left: left.to_string(),
            right: right.to_string(),
            options: options.clone(),
        }
    }

    pub(crate) fn left(&self) -> &str {
        &self.left
    }

    pub(crate) fn right(&self) -> &str {
        &self.right
    }
}

fn canonical<'a>(a: &'a str, b: &'a str) -> (&'a str, &'a str) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

/// Name of the join entity for a pair of entities.
pub fn join_entity_name(a: &str, b: &str) -> String {
    let (left, right) = canonical(a, b);
    format!("{}_{}", left, right)
}

/// Key field names on the join entity as seen from `owner`.
///
/// Returns `(owner field, sub field)`. For distinct entities the side does not
/// change the result; for a self-referential pair it picks which prefixed
/// field belongs to the owner.
pub fn counterpart_field_names(owner: &str, sub: &str, side: Side) -> (String, String) {
    if owner != sub {
        return (format!("{}ID", owner), format!("{}ID", sub));
    }
    let left = format!("{}{}ID", LEFT_PREFIX, owner);
    let right = format!("{}{}ID", RIGHT_PREFIX, sub);
    match side {
        Side::Left => (left, right),
        Side::Right => (right, left),
    }
}

/// Build the join entity descriptor for `a` and `b`.
///
/// Each join field takes the shape of the primary key it references.
pub(crate) fn synthesize(
    a: &EntityDescriptor,
    b: &EntityDescriptor,
    options: &JoinOptions,
) -> Result<EntityDescriptor> {
    let (left, right) = if a.name() <= b.name() { (a, b) } else { (b, a) };
    let left_key = left.primary_key()?;
    let right_key = right.primary_key()?;

    let (left_field, right_field) =
        counterpart_field_names(left.name(), right.name(), Side::Left);
    let tags = options.tags.clone().with_foreign_key();

    let def = EntityDef::new(join_entity_name(left.name(), right.name()))
        .with_field(FieldDef::new(left_field, left_key.shape.clone()).with_tags(tags.clone()))
        .with_field(FieldDef::new(right_field, right_key.shape.clone()).with_tags(tags));

    EntityDescriptor::build_join(
        def,
        JoinParticipants {
            left: left.name().to_string(),
            right: right.name().to_string(),
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{FieldShape, ScalarType};
    use crate::error::Error;

    fn keyed(name: &str, scalar: ScalarType) -> EntityDescriptor {
        EntityDescriptor::build(
            EntityDef::new(name).with_field(FieldDef::primitive("ID", scalar).primary_key()),
        )
        .unwrap()
    }

    #[test]
    fn test_synthesize_distinct_pair() {
        let user = keyed("User", ScalarType::Int64);
        let tag = keyed("Tag", ScalarType::String);

        let join = synthesize(&user, &tag, &JoinOptions::default()).unwrap();

        assert_eq!(join.name(), "Tag_User");
        assert!(join.is_join());
        let names: Vec<_> = join.fields().iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["TagID", "UserID"]);
        assert_eq!(
            join.field("TagID").unwrap().shape,
            FieldShape::primitive(ScalarType::String)
        );
        assert!(join.fields().iter().all(|f| f.is_foreign_key()));
        assert_eq!(join.primary_keys().count(), 2);
    }

    #[test]
    fn test_synthesize_self_pair() {
        let user = keyed("User", ScalarType::Int64);

        let join = synthesize(&user, &user, &JoinOptions::default()).unwrap();

        assert_eq!(join.name(), "User_User");
        assert!(join.has_field("L_UserID"));
        assert!(join.has_field("R_UserID"));
    }

    #[test]
    fn test_synthesize_custom_tags() {
        let user = keyed("User", ScalarType::Int64);
        let tag = keyed("Tag", ScalarType::String);
        let options = JoinOptions::from_tags("index").unwrap();

        let join = synthesize(&user, &tag, &options).unwrap();

        assert_eq!(join.primary_keys().count(), 0);
        assert!(join.fields().iter().all(|f| f.tags.attribute("index").is_some()));
    }

    #[test]
    fn test_synthesize_requires_primary_key() {
        let user = keyed("User", ScalarType::Int64);
        let log = EntityDescriptor::build(
            EntityDef::new("Log").with_field(FieldDef::primitive("Line", ScalarType::String)),
        )
        .unwrap();

        let err = synthesize(&user, &log, &JoinOptions::default()).unwrap_err();
        assert!(matches!(err, Error::MissingPrimaryKey(name) if name == "Log"));
    }

    #[test]
    fn test_counterpart_field_names() {
        assert_eq!(
            counterpart_field_names("User", "Tag", Side::Right),
            ("UserID".to_string(), "TagID".to_string())
        );
        assert_eq!(
            counterpart_field_names("User", "User", Side::Left),
            ("L_UserID".to_string(), "R_UserID".to_string())
        );
        assert_eq!(
            counterpart_field_names("User", "User", Side::Right),
            ("R_UserID".to_string(), "L_UserID".to_string())
        );
    }

    #[test]
    fn test_join_key_canonical() {
        let options = JoinOptions::default();
        assert_eq!(
            JoinKey::new("User", "Tag", &options),
            JoinKey::new("Tag", "User", &options)
        );
        assert_ne!(
            JoinKey::new("User", "Tag", &options),
            JoinKey::new("User", "Tag", &JoinOptions::from_tags("index").unwrap())
        );
    }
}
