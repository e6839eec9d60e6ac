//! Regex-based entity analyzer
//!
//! Covers categories with a rigid surface shape (phones, emails, card and
//! account numbers, document ids). Free-form categories such as PERSON or
//! ADDRESS need a model-backed [`EntityAnalyzer`] implementation; this one
//! simply never reports them.

use std::sync::Arc;

use anyhow::Result;

use super::patterns::PatternRegistry;
use crate::domain::{EntityCategory, EntitySpan};
use crate::services::EntityAnalyzer;

/// Regex-based entity analyzer
pub struct RegexAnalyzer {
    pattern_registry: Arc<PatternRegistry>,
    confidence_threshold: f32,
}

impl RegexAnalyzer {
    /// Create a new analyzer with the built-in patterns
    pub fn new() -> Result<Self> {
        let registry = PatternRegistry::default_patterns()?;
        Ok(Self {
            pattern_registry: Arc::new(registry),
            confidence_threshold: 0.5,
        })
    }

    /// Create a new analyzer with a custom pattern registry
    pub fn with_registry(registry: PatternRegistry) -> Self {
        Self {
            pattern_registry: Arc::new(registry),
            confidence_threshold: 0.5,
        }
    }

    /// Set the confidence threshold
    pub fn with_confidence_threshold(mut self, threshold: f32) -> Self {
        self.confidence_threshold = threshold.clamp(0.0, 1.0);
        self
    }
}

impl EntityAnalyzer for RegexAnalyzer {
    fn analyze(&self, text: &str, categories: &[EntityCategory]) -> Result<Vec<EntitySpan>> {
        let mut spans = Vec::new();

        for pattern in self.pattern_registry.all_patterns() {
            if pattern.confidence < self.confidence_threshold {
                continue;
            }
            if !categories.contains(&pattern.category) {
                continue;
            }

            for matched in pattern.regex.find_iter(text) {
                spans.push(EntitySpan::new(
                    pattern.category,
                    matched.start(),
                    matched.end(),
                    pattern.confidence,
                    pattern.name.clone(),
                ));
            }
        }

        Ok(spans)
    }
}

impl Default for RegexAnalyzer {
    fn default() -> Self {
        Self::new().expect("Failed to create default RegexAnalyzer")
    }
}
