//! The mapper facade.
//!
//! A [`Mapper`] owns the entity registry, the relation cache and the handler
//! chains for one backing store. Clones share all of them.

use crate::config::MapperConfig;
use crate::dialect::Dialect;
use crate::error::Result;
use relbind_core::catalog::{Entity, EntityDescriptor, SchemaProvider, SchemaSet};
use relbind_core::pipeline::{HandlerChain, PipelineComposer};
use relbind_core::registry::EntityRegistry;
use relbind_core::relation::{JoinOptions, RelationCache, RelationDescriptor, RelationKind, Side};
use std::sync::Arc;
use tracing::info;

/// Relation-aware entity mapper.
#[derive(Clone)]
pub struct Mapper {
    inner: Arc<MapperInner>,
}

struct MapperInner {
    dialect: Dialect,
    data_source: String,
    registry: Arc<EntityRegistry>,
    relations: RelationCache,
    pipeline: PipelineComposer,
}

impl Mapper {
    /// Open a mapper for `driver` with no declared schema.
    ///
    /// Entities are then introduced through [`Mapper::model`].
    pub fn open(driver: &str, data_source: impl Into<String>) -> Result<Self> {
        let dialect: Dialect = driver.parse()?;
        Ok(Self::with_provider(
            dialect,
            data_source,
            Arc::new(SchemaSet::new()),
            JoinOptions::default(),
        ))
    }

    /// Open a mapper from a configuration, loading its schema document if set.
    pub fn from_config(config: &MapperConfig) -> Result<Self> {
        let dialect: Dialect = config.driver.parse()?;
        let join_options = config.join_options()?;
        let schema = match &config.schema_path {
            Some(path) => SchemaSet::from_json_file(path)?,
            None => SchemaSet::new(),
        };
        Ok(Self::with_provider(
            dialect,
            config.data_source.clone(),
            Arc::new(schema),
            join_options,
        ))
    }

    /// Open a mapper over an explicit schema provider.
    pub fn with_provider(
        dialect: Dialect,
        data_source: impl Into<String>,
        provider: Arc<dyn SchemaProvider>,
        join_options: JoinOptions,
    ) -> Self {
        let registry = Arc::new(EntityRegistry::new(provider));
        let relations = RelationCache::with_join_options(registry.clone(), join_options);
        let pipeline = PipelineComposer::with_default_chains();

        info!(dialect = %dialect, "opened mapper");

        Self {
            inner: Arc::new(MapperInner {
                dialect,
                data_source: data_source.into(),
                registry,
                relations,
                pipeline,
            }),
        }
    }

    /// Backing-store dialect.
    pub fn dialect(&self) -> Dialect {
        self.inner.dialect
    }

    /// Connection parameters.
    pub fn data_source(&self) -> &str {
        &self.inner.data_source
    }

    /// Shared entity registry.
    pub fn registry(&self) -> &Arc<EntityRegistry> {
        &self.inner.registry
    }

    /// Shared relation cache.
    pub fn relations(&self) -> &RelationCache {
        &self.inner.relations
    }

    /// Handler chain composer.
    pub fn pipeline(&self) -> &PipelineComposer {
        &self.inner.pipeline
    }

    /// Handle for a typed entity.
    pub fn model<T: Entity>(&self) -> Result<EntityHandle> {
        let entity = self.inner.registry.resolve_entity::<T>()?;
        Ok(self.handle(entity))
    }

    /// Handle for the entity type of `value`.
    pub fn model_of<T: Entity>(&self, _value: &T) -> Result<EntityHandle> {
        self.model::<T>()
    }

    /// Handle for an entity declared by the schema provider.
    pub fn model_named(&self, name: &str) -> Result<EntityHandle> {
        let entity = self.inner.registry.resolve(name)?;
        Ok(self.handle(entity))
    }

    /// Handle for the join entity linking `left` and `right`.
    pub fn join_model(&self, left: &str, right: &str) -> Result<EntityHandle> {
        let registry = &self.inner.registry;
        let left = registry.resolve(left)?;
        let right = registry.resolve(right)?;
        let join = registry.resolve_join(&left, &right, self.inner.relations.join_options())?;
        Ok(self.handle(join))
    }

    /// Handle for the join entity linking two typed entities.
    pub fn join_model_of<L: Entity, R: Entity>(&self) -> Result<EntityHandle> {
        let registry = &self.inner.registry;
        let left = registry.resolve_entity::<L>()?;
        let right = registry.resolve_entity::<R>()?;
        let join = registry.resolve_join(&left, &right, self.inner.relations.join_options())?;
        Ok(self.handle(join))
    }

    /// Effective handler chain of `entity` for `operation`.
    pub fn model_handlers(&self, operation: impl AsRef<str>, entity: &str) -> HandlerChain {
        self.inner.pipeline.effective_chain(entity, operation)
    }

    /// Install steps that run before the default chain of `operation` on `entity`.
    pub fn register_handlers(&self, entity: &str, operation: impl AsRef<str>, chain: HandlerChain) {
        self.inner.pipeline.register_override(entity, operation, chain);
    }

    /// Relation exposed by `entity.field`, if any.
    pub fn preload(&self, entity: &str, field: &str) -> Result<Option<Arc<RelationDescriptor>>> {
        let owner = self.inner.registry.resolve(entity)?;
        Ok(self.inner.relations.get_or_bind(&owner, field)?)
    }

    /// Many-to-many relation exposed by `entity.field` from `side`.
    pub fn preload_many_to_many(
        &self,
        entity: &str,
        field: &str,
        side: Side,
    ) -> Result<Option<Arc<RelationDescriptor>>> {
        let owner = self.inner.registry.resolve(entity)?;
        Ok(self
            .inner
            .relations
            .get_or_bind_many_to_many(&owner, field, side)?)
    }

    /// Relation exposed by `entity.field` if it is a belongs-to relation.
    pub fn belongs_to_preload(
        &self,
        entity: &str,
        field: &str,
    ) -> Result<Option<Arc<RelationDescriptor>>> {
        self.preload_kind(entity, field, RelationKind::BelongsTo)
    }

    /// Relation exposed by `entity.field` if it is an owns-one relation.
    pub fn owns_one_preload(
        &self,
        entity: &str,
        field: &str,
    ) -> Result<Option<Arc<RelationDescriptor>>> {
        self.preload_kind(entity, field, RelationKind::OwnsOne)
    }

    /// Relation exposed by `entity.field` if it is an owns-many relation.
    pub fn owns_many_preload(
        &self,
        entity: &str,
        field: &str,
    ) -> Result<Option<Arc<RelationDescriptor>>> {
        self.preload_kind(entity, field, RelationKind::OwnsMany)
    }

    fn preload_kind(
        &self,
        entity: &str,
        field: &str,
        kind: RelationKind,
    ) -> Result<Option<Arc<RelationDescriptor>>> {
        Ok(self
            .preload(entity, field)?
            .filter(|relation| relation.kind() == kind))
    }

    fn handle(&self, entity: Arc<EntityDescriptor>) -> EntityHandle {
        EntityHandle {
            mapper: self.clone(),
            entity,
        }
    }
}

impl std::fmt::Debug for Mapper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Mapper")
            .field("dialect", &self.inner.dialect)
            .field("registry", &self.inner.registry)
            .field("relations", &self.inner.relations)
            .field("pipeline", &self.inner.pipeline)
            .finish()
    }
}

/// A resolved entity bound to its mapper.
#[derive(Debug, Clone)]
pub struct EntityHandle {
    mapper: Mapper,
    entity: Arc<EntityDescriptor>,
}

impl EntityHandle {
    /// Entity metadata.
    pub fn descriptor(&self) -> &Arc<EntityDescriptor> {
        &self.entity
    }

    /// Entity name.
    pub fn name(&self) -> &str {
        self.entity.name()
    }

    /// The owning mapper.
    pub fn mapper(&self) -> &Mapper {
        &self.mapper
    }

    /// Relation exposed by `field`, if any.
    pub fn preload(&self, field: &str) -> Result<Option<Arc<RelationDescriptor>>> {
        Ok(self.mapper.relations().get_or_bind(&self.entity, field)?)
    }

    /// Many-to-many relation exposed by `field` from `side`.
    pub fn preload_many_to_many(
        &self,
        field: &str,
        side: Side,
    ) -> Result<Option<Arc<RelationDescriptor>>> {
        Ok(self
            .mapper
            .relations()
            .get_or_bind_many_to_many(&self.entity, field, side)?)
    }

    /// Effective handler chain for `operation`.
    pub fn handlers(&self, operation: impl AsRef<str>) -> HandlerChain {
        self.mapper.model_handlers(operation, self.entity.name())
    }

    /// Every inferred relation of this entity, in field order.
    ///
    /// Struct and slice fields that match no convention are skipped.
    pub fn relations(&self) -> Result<Vec<Arc<RelationDescriptor>>> {
        let mut relations = Vec::new();
        for field in self.entity.relation_candidates() {
            if let Some(relation) = self.preload(&field.name)? {
                relations.push(relation);
            }
        }
        Ok(relations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use relbind_core::catalog::{EntityDef, FieldDef, FieldShape, ScalarType};
    use relbind_core::pipeline::{Operation, Step};

    struct Author;

    impl Entity for Author {
        const NAME: &'static str = "Author";

        fn entity_def() -> EntityDef {
            EntityDef::new(Self::NAME)
                .with_field(FieldDef::primitive("ID", ScalarType::Int64).primary_key())
                .with_field(FieldDef::new("Books", FieldShape::slice_of("Book")))
        }

        fn related() -> Vec<EntityDef> {
            vec![Book::entity_def()]
        }
    }

    struct Book;

    impl Entity for Book {
        const NAME: &'static str = "Book";

        fn entity_def() -> EntityDef {
            EntityDef::new(Self::NAME)
                .with_field(FieldDef::primitive("ID", ScalarType::Int64).primary_key())
                .with_field(FieldDef::primitive("AuthorID", ScalarType::Int64))
        }
    }

    #[test]
    fn test_open_unknown_driver() {
        let err = Mapper::open("oracle", "").unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_typed_models() {
        let mapper = Mapper::open("sqlite3", ":memory:").unwrap();
        mapper.model::<Book>().unwrap();
        let author = mapper.model_of(&Author).unwrap();

        let books = author.preload("Books").unwrap().unwrap();

        assert_eq!(books.kind(), RelationKind::OwnsMany);
        assert_eq!(mapper.dialect(), Dialect::Sqlite3);
        assert_eq!(mapper.data_source(), ":memory:");
    }

    struct Shelf;

    impl Entity for Shelf {
        const NAME: &'static str = "Shelf";

        fn entity_def() -> EntityDef {
            EntityDef::new(Self::NAME)
                .with_field(FieldDef::primitive("ID", ScalarType::Int64).primary_key())
                .with_field(FieldDef::new("Volumes", FieldShape::slice_of("Volume")))
        }
    }

    #[test]
    fn test_typed_preload_before_sub_entity() {
        let mapper = Mapper::open("mysql", "").unwrap();
        let author = mapper.model::<Author>().unwrap();

        let books = author.preload("Books").unwrap().unwrap();

        assert_eq!(books.kind(), RelationKind::OwnsMany);
        let book = mapper.model::<Book>().unwrap();
        assert!(Arc::ptr_eq(book.descriptor(), books.sub()));
    }

    #[test]
    fn test_typed_sub_entity_must_be_known() {
        let mapper = Mapper::open("mysql", "").unwrap();
        let shelf = mapper.model::<Shelf>().unwrap();

        assert!(shelf.preload("Volumes").is_err());
    }

    #[test]
    fn test_typed_join_model() {
        let mapper = Mapper::open("sqlite3", "").unwrap();

        let join = mapper.join_model_of::<Author, Book>().unwrap();
        let reverse = mapper.join_model_of::<Book, Author>().unwrap();

        assert_eq!(join.name(), "Author_Book");
        assert!(Arc::ptr_eq(join.descriptor(), reverse.descriptor()));
        assert!(join.descriptor().field("AuthorID").is_some());
        assert!(join.descriptor().field("BookID").is_some());
    }

    #[test]
    fn test_clones_share_state() {
        let mapper = Mapper::open("sqlite3", "").unwrap();
        let clone = mapper.clone();
        clone.register_handlers(
            "Author",
            Operation::Find,
            HandlerChain::from(vec![Step::new("audit")]),
        );

        let chain = mapper.model_handlers(Operation::Find, "Author");
        assert_eq!(chain.names()[0], "audit");
        assert_eq!(chain.len(), 5);
    }
}
