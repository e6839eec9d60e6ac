//! Pipeline orchestration: operator dispatch and the engine itself

pub mod engine;
pub mod operators;

pub use engine::{Anonymized, AnalyzedText, PipelineServices, PseudonymizationPipeline, Replacement};
pub use operators::{OperatorKind, OperatorRegistry};
