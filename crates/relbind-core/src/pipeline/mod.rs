//! Operation pipelines.
//!
//! Each operation runs an ordered chain of named steps. The composer merges a
//! global default chain with per-entity overrides.

mod chain;
mod composer;
mod operation;
pub mod step;

pub use chain::HandlerChain;
pub use composer::PipelineComposer;
pub use operation::Operation;
pub use step::Step;
