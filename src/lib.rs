// Textveil - Reversible Text Pseudonymization Engine
// Copyright (c) 2026 Textveil Contributors
// Licensed under the MIT License

//! # Textveil - Reversible Text Pseudonymization
//!
//! Textveil replaces personally identifying values in free text with
//! consistent fabricated stand-ins, and maps externally processed text back
//! to the original values afterwards, even when a third party has
//! paraphrased or reordered the stand-ins.
//!
//! ## Overview
//!
//! This library provides the core functionality for:
//! - **Analyzing** text for entities, chunked to fit bounded-input analyzers
//! - **Anonymizing** detected entities per category: keep, encrypt, or
//!   pseudonymize with a cached fabricated look-alike
//! - **Deanonymizing** returned text through exact and fuzzy reverse lookup
//! - **Normalizing** values into canonical keys so inflected, reformatted,
//!   or reordered forms of one value share one identity
//!
//! ## Architecture
//!
//! Textveil follows a layered architecture:
//!
//! - [`pipeline`] - The pseudonymization engine and operator dispatch
//! - [`store`] - Session-scoped bidirectional identity map
//! - [`normalize`] - Canonical key derivation per category class
//! - [`chunker`] - Length-bounded, reconstructible text chunking
//! - [`services`] - Traits for injectable external capabilities
//! - [`adapters`] - Bundled default implementations of those traits
//! - [`domain`] - Core domain types and errors
//! - [`config`] - Configuration management
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use textveil::adapters::{RegexAnalyzer, StockFaker};
//! use textveil::config::PipelineConfig;
//! use textveil::pipeline::{PipelineServices, PseudonymizationPipeline};
//! # use textveil::services::{AddressComponent, AddressParser, GrammaticalFeatures,
//! #     MorphologyService};
//! # struct NoMorphology;
//! # impl MorphologyService for NoMorphology {
//! #     fn lemmatize(&self, word: &str) -> anyhow::Result<String> {
//! #         Ok(word.to_string())
//! #     }
//! #     fn inflect(
//! #         &self,
//! #         _word: &str,
//! #         _features: &GrammaticalFeatures,
//! #     ) -> anyhow::Result<Option<String>> {
//! #         Ok(None)
//! #     }
//! # }
//! # struct NoAddressParser;
//! # impl AddressParser for NoAddressParser {
//! #     fn parse(&self, _address: &str) -> anyhow::Result<Vec<AddressComponent>> {
//! #         Ok(Vec::new())
//! #     }
//! #     fn expand(&self, _address: &str) -> anyhow::Result<Vec<String>> {
//! #         Ok(Vec::new())
//! #     }
//! # }
//!
//! fn main() -> anyhow::Result<()> {
//!     let config = PipelineConfig::default();
//!     let services = PipelineServices::new(
//!         Box::new(RegexAnalyzer::new()?),
//!         Box::new(StockFaker::new()),
//!         Box::new(NoMorphology),
//!         Box::new(NoAddressParser),
//!     );
//!     let mut pipeline = PseudonymizationPipeline::new(config, services)?;
//!
//!     let anonymized = pipeline.anonymize("Call +7 (985) 777-72-37 tomorrow")?;
//!     // ... send anonymized.text to an external processor ...
//!     let restored = pipeline.deanonymize(&anonymized.text)?;
//!
//!     println!("{restored}");
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! Invalid inputs and configuration are reported through
//! [`domain::VeilError`]; collaborator failures propagate as
//! [`anyhow::Error`] with context. Reverse-lookup misses are `None` values,
//! never errors.
//!
//! ## Logging
//!
//! Textveil uses structured logging with the `tracing` crate. True values
//! never appear in log output; records reference categories, fabricated
//! values, and canonical key hashes instead.

pub mod adapters;
pub mod chunker;
pub mod config;
pub mod domain;
pub mod normalize;
pub mod pipeline;
pub mod services;
pub mod store;
