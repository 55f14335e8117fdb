//! Handler chain composition.
//!
//! The effective chain for an operation on an entity is the entity's override
//! chain followed by the global default chain.

use super::chain::HandlerChain;
use super::operation::Operation;
use super::step::Step;
use dashmap::DashMap;
use parking_lot::RwLock;
use std::collections::HashMap;
use tracing::debug;

/// Global default chains plus per-entity overrides.
///
/// Defaults are meant to be registered once at startup and read afterwards.
pub struct PipelineComposer<S = Step> {
    defaults: RwLock<HashMap<String, HandlerChain<S>>>,
    overrides: DashMap<(String, String), HandlerChain<S>>,
}

impl<S: Clone> PipelineComposer<S> {
    /// Create a composer with no chains.
    pub fn new() -> Self {
        Self {
            defaults: RwLock::new(HashMap::new()),
            overrides: DashMap::new(),
        }
    }

    /// Install or replace the global chain for `operation`.
    pub fn register_default(&self, operation: impl AsRef<str>, chain: HandlerChain<S>) {
        let operation = operation.as_ref();
        debug!(operation, steps = chain.len(), "registered default chain");
        self.defaults.write().insert(operation.to_string(), chain);
    }

    /// Install or replace the override chain of `entity` for `operation`.
    pub fn register_override(
        &self,
        entity: &str,
        operation: impl AsRef<str>,
        chain: HandlerChain<S>,
    ) {
        let operation = operation.as_ref();
        debug!(entity, operation, steps = chain.len(), "registered override chain");
        self.overrides
            .insert((entity.to_string(), operation.to_string()), chain);
    }

    /// The global chain for `operation`.
    pub fn default_chain(&self, operation: impl AsRef<str>) -> Option<HandlerChain<S>> {
        self.defaults.read().get(operation.as_ref()).cloned()
    }

    /// The override chain of `entity` for `operation`.
    pub fn override_chain(
        &self,
        entity: &str,
        operation: impl AsRef<str>,
    ) -> Option<HandlerChain<S>> {
        self.overrides
            .get(&(entity.to_string(), operation.as_ref().to_string()))
            .map(|chain| chain.clone())
    }

    /// Override steps followed by default steps.
    ///
    /// A missing part contributes nothing; both missing yields an empty chain.
    pub fn effective_chain(&self, entity: &str, operation: impl AsRef<str>) -> HandlerChain<S> {
        let operation = operation.as_ref();
        let overrides = self.override_chain(entity, operation);
        let defaults = self.defaults.read();
        let global = defaults.get(operation);

        let capacity = overrides.as_ref().map_or(0, HandlerChain::len)
            + global.map_or(0, HandlerChain::len);
        let mut chain = HandlerChain::with_capacity(capacity);
        if let Some(overrides) = &overrides {
            chain.extend_from(overrides);
        }
        if let Some(global) = global {
            chain.extend_from(global);
        }
        chain
    }

    /// Operations with a registered default chain, sorted.
    pub fn operations(&self) -> Vec<String> {
        let mut names: Vec<String> = self.defaults.read().keys().cloned().collect();
        names.sort();
        names
    }
}

impl PipelineComposer<Step> {
    /// Create a composer preloaded with every built-in operation chain.
    pub fn with_default_chains() -> Self {
        let composer = Self::new();
        for operation in Operation::ALL {
            composer.register_default(operation, operation.default_chain());
        }
        composer
    }
}

impl<S: Clone> Default for PipelineComposer<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> std::fmt::Debug for PipelineComposer<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipelineComposer")
            .field("defaults", &self.defaults.read().len())
            .field("overrides", &self.overrides.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain(names: &[&'static str]) -> HandlerChain {
        names.iter().map(|&n| Step::new(n)).collect()
    }

    #[test]
    fn test_override_precedes_default() {
        let composer = PipelineComposer::new();
        composer.register_default("Insert", chain(&["x", "y"]));
        composer.register_override("E", "Insert", chain(&["z"]));

        assert_eq!(composer.effective_chain("E", "Insert").names(), vec!["z", "x", "y"]);
        assert_eq!(composer.effective_chain("F", "Insert").names(), vec!["x", "y"]);
    }

    #[test]
    fn test_missing_parts() {
        let composer = PipelineComposer::new();
        composer.register_override("E", "Audit", chain(&["log"]));

        assert_eq!(composer.effective_chain("E", "Audit").names(), vec!["log"]);
        assert!(composer.effective_chain("F", "Audit").is_empty());
        assert!(composer.effective_chain("E", "Nothing").is_empty());
    }

    #[test]
    fn test_register_replaces() {
        let composer = PipelineComposer::new();
        composer.register_default("Find", chain(&["a"]));
        composer.register_default("Find", chain(&["b"]));

        assert_eq!(composer.default_chain("Find").unwrap().names(), vec!["b"]);
    }

    #[test]
    fn test_with_default_chains() {
        let composer = PipelineComposer::with_default_chains();

        assert_eq!(composer.operations().len(), Operation::ALL.len());
        assert_eq!(
            composer.effective_chain("User", Operation::HardDelete).names(),
            vec!["preload-delete", "hard-delete"]
        );
    }

    #[test]
    fn test_generic_steps() {
        let composer: PipelineComposer<u32> = PipelineComposer::new();
        composer.register_default("Find", vec![1, 2].into());
        composer.register_override("E", "Find", vec![0].into());

        assert_eq!(composer.effective_chain("E", "Find").steps(), &[0, 1, 2]);
    }
}
