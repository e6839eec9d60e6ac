//! Bundled collaborator implementations
//!
//! Default implementations for the injectable service traits: a
//! pattern-driven regex analyzer for rigidly formatted categories, a
//! rule-based sentence splitter, and a fabricated-value factory.
//! Model-backed analyzers, morphology engines, and address parsers live
//! outside this crate and plug in through the same traits.

pub mod faker;
pub mod patterns;
pub mod regex_analyzer;
pub mod sentence;

pub use faker::StockFaker;
pub use patterns::{CompiledPattern, PatternDefinition, PatternRegistry};
pub use regex_analyzer::RegexAnalyzer;
pub use sentence::RuleSentenceSplitter;
