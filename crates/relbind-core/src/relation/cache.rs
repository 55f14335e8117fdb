//! Relation cache.
//!
//! Memoizes bound relations per (entity, field) and, for many-to-many, per
//! side. Negative results are cached too, so a field without a relation is
//! classified once. Errors are never cached.

use super::binder::RelationBinder;
use super::descriptor::{RelationDescriptor, Side};
use super::join::JoinOptions;
use crate::catalog::EntityDescriptor;
use crate::error::Result;
use crate::registry::EntityRegistry;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::sync::Arc;
use tracing::{debug, trace};

/// Cache key for a relation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RelationKey {
    /// Owner entity name.
    pub owner: String,
    /// Container field name.
    pub field: String,
    /// Binding side; `Some` only for many-to-many lookups.
    pub side: Option<Side>,
}

impl RelationKey {
    /// Key for an inferred relation.
    pub fn new(owner: impl Into<String>, field: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            field: field.into(),
            side: None,
        }
    }

    /// Key for a many-to-many relation bound from `side`.
    pub fn many_to_many(owner: impl Into<String>, field: impl Into<String>, side: Side) -> Self {
        Self {
            owner: owner.into(),
            field: field.into(),
            side: Some(side),
        }
    }
}

/// Cache statistics.
#[derive(Debug, Default)]
pub struct CacheStats {
    hits: AtomicU64,
    misses: AtomicU64,
    classifications: AtomicU64,
    discarded: AtomicU64,
}

impl CacheStats {
    /// Get hit count.
    pub fn hits(&self) -> u64 {
        self.hits.load(AtomicOrdering::Relaxed)
    }

    /// Get miss count.
    pub fn misses(&self) -> u64 {
        self.misses.load(AtomicOrdering::Relaxed)
    }

    /// Number of completed classifications, failed ones included.
    pub fn classifications(&self) -> u64 {
        self.classifications.load(AtomicOrdering::Relaxed)
    }

    /// Number of results dropped because another caller published first.
    pub fn discarded(&self) -> u64 {
        self.discarded.load(AtomicOrdering::Relaxed)
    }

    /// Calculate hit rate (0.0 to 1.0).
    pub fn hit_rate(&self) -> f64 {
        let hits = self.hits() as f64;
        let total = hits + self.misses() as f64;
        if total > 0.0 {
            hits / total
        } else {
            0.0
        }
    }
}

/// Memoizing front of the [`RelationBinder`].
pub struct RelationCache {
    binder: RelationBinder,
    join_options: JoinOptions,
    entries: DashMap<RelationKey, Option<Arc<RelationDescriptor>>>,
    stats: CacheStats,
}

impl RelationCache {
    /// Create a cache over `registry` using default join options.
    pub fn new(registry: Arc<EntityRegistry>) -> Self {
        Self::with_join_options(registry, JoinOptions::default())
    }

    /// Create a cache over `registry` with explicit join options.
    pub fn with_join_options(registry: Arc<EntityRegistry>, join_options: JoinOptions) -> Self {
        Self {
            binder: RelationBinder::new(registry),
            join_options,
            entries: DashMap::new(),
            stats: CacheStats::default(),
        }
    }

    /// Get the relation exposed by `owner.field`, classifying it on first use.
    pub fn get_or_bind(
        &self,
        owner: &Arc<EntityDescriptor>,
        field: &str,
    ) -> Result<Option<Arc<RelationDescriptor>>> {
        let key = RelationKey::new(owner.name(), field);
        self.lookup(key, || self.binder.classify(owner, field))
    }

    /// Get the many-to-many relation exposed by `owner.field` from `side`.
    pub fn get_or_bind_many_to_many(
        &self,
        owner: &Arc<EntityDescriptor>,
        field: &str,
        side: Side,
    ) -> Result<Option<Arc<RelationDescriptor>>> {
        let key = RelationKey::many_to_many(owner.name(), field, side);
        self.lookup(key, || {
            self.binder
                .classify_many_to_many(owner, field, &self.join_options, side)
        })
    }

    /// Cached entry for `key`, without binding.
    ///
    /// The outer `Option` is whether the key was ever resolved.
    pub fn peek(&self, key: &RelationKey) -> Option<Option<Arc<RelationDescriptor>>> {
        self.entries.get(key).map(|entry| entry.value().clone())
    }

    fn lookup<F>(&self, key: RelationKey, bind: F) -> Result<Option<Arc<RelationDescriptor>>>
    where
        F: FnOnce() -> Result<Option<RelationDescriptor>>,
    {
        if let Some(entry) = self.entries.get(&key) {
            self.stats.hits.fetch_add(1, AtomicOrdering::Relaxed);
            trace!(owner = %key.owner, field = %key.field, "relation cache hit");
            return Ok(entry.value().clone());
        }
        self.stats.misses.fetch_add(1, AtomicOrdering::Relaxed);

        // Bind outside any shard lock; binding resolves entities through the registry.
        let outcome = bind();
        self.stats.classifications.fetch_add(1, AtomicOrdering::Relaxed);
        let bound = outcome?.map(Arc::new);

        match self.entries.entry(key) {
            Entry::Occupied(entry) => {
                self.stats.discarded.fetch_add(1, AtomicOrdering::Relaxed);
                debug!(
                    owner = %entry.key().owner,
                    field = %entry.key().field,
                    "relation bound concurrently, keeping published descriptor"
                );
                Ok(entry.get().clone())
            }
            Entry::Vacant(entry) => {
                debug!(
                    owner = %entry.key().owner,
                    field = %entry.key().field,
                    kind = bound.as_ref().map(|r| r.kind().as_str()).unwrap_or("none"),
                    "relation cached"
                );
                Ok(entry.insert(bound).clone())
            }
        }
    }

    /// The binder used on cache misses.
    pub fn binder(&self) -> &RelationBinder {
        &self.binder
    }

    /// Join options applied to many-to-many bindings.
    pub fn join_options(&self) -> &JoinOptions {
        &self.join_options
    }

    /// Get cache statistics.
    pub fn stats(&self) -> &CacheStats {
        &self.stats
    }

    /// Get the current number of cached entries, negative ones included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl std::fmt::Debug for RelationCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RelationCache")
            .field("entries", &self.entries.len())
            .field("join_options", &self.join_options)
            .field("stats", &self.stats)
            .finish()
    }
}
