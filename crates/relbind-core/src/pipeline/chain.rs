//! Handler chains.

use super::step::Step;
use serde::{Deserialize, Serialize};

/// An ordered sequence of steps implementing one operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HandlerChain<S = Step> {
    steps: Vec<S>,
}

impl<S> HandlerChain<S> {
    /// Create an empty chain.
    pub fn new() -> Self {
        Self { steps: Vec::new() }
    }

    /// Create an empty chain with room for `capacity` steps.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            steps: Vec::with_capacity(capacity),
        }
    }

    /// Append a step.
    pub fn push(&mut self, step: S) {
        self.steps.push(step);
    }

    /// Append a step, builder style.
    pub fn then(mut self, step: impl Into<S>) -> Self {
        self.steps.push(step.into());
        self
    }

    /// Steps in execution order.
    pub fn steps(&self) -> &[S] {
        &self.steps
    }

    /// Iterate steps in execution order.
    pub fn iter(&self) -> std::slice::Iter<'_, S> {
        self.steps.iter()
    }

    /// Number of steps.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Check if the chain has no steps.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

impl<S: Clone> HandlerChain<S> {
    /// Append clones of every step in `other`.
    pub fn extend_from(&mut self, other: &HandlerChain<S>) {
        self.steps.extend_from_slice(&other.steps);
    }
}

impl HandlerChain<Step> {
    /// Step names in execution order.
    pub fn names(&self) -> Vec<&str> {
        self.steps.iter().map(Step::name).collect()
    }
}

impl<S> Default for HandlerChain<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> From<Vec<S>> for HandlerChain<S> {
    fn from(steps: Vec<S>) -> Self {
        Self { steps }
    }
}

impl<S> FromIterator<S> for HandlerChain<S> {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            steps: iter.into_iter().collect(),
        }
    }
}

impl<S> IntoIterator for HandlerChain<S> {
    type Item = S;
    type IntoIter = std::vec::IntoIter<S>;

    fn into_iter(self) -> Self::IntoIter {
        self.steps.into_iter()
    }
}

impl<'a, S> IntoIterator for &'a HandlerChain<S> {
    type Item = &'a S;
    type IntoIter = std::slice::Iter<'a, S>;

    fn into_iter(self) -> Self::IntoIter {
        self.steps.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chain_builder() {
        let chain: HandlerChain = HandlerChain::new().then("x").then("y");

        assert_eq!(chain.len(), 2);
        assert_eq!(chain.names(), vec!["x", "y"]);
    }

    #[test]
    fn test_chain_of_closures() {
        type Handler = fn(&mut Vec<&'static str>);
        let chain: HandlerChain<Handler> = vec![
            (|log: &mut Vec<&'static str>| log.push("a")) as Handler,
            |log: &mut Vec<&'static str>| log.push("b"),
        ]
        .into();

        let mut log = Vec::new();
        for handler in &chain {
            handler(&mut log);
        }
        assert_eq!(log, vec!["a", "b"]);
    }

    #[test]
    fn test_chain_json() {
        let chain: HandlerChain = HandlerChain::new().then("find");
        assert_eq!(
            serde_json::to_string(&chain).unwrap(),
            r#"[{"name":"find"}]"#
        );
    }
}
