//! Pipeline configuration
//!
//! Caller-facing configuration: the category-to-operator table, an optional
//! allow-list of categories to analyze, chunking budgets, the fuzzy lookup
//! cutoff, and the static encryption key handed to the injected cipher.
//! Loadable from TOML; validated before the pipeline is built.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::chunker::ChunkerConfig;
use crate::domain::errors::VeilError;
use crate::domain::EntityCategory;
use crate::pipeline::operators::OperatorKind;

/// Pipeline configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Category label to operator table
    #[serde(default = "default_operator_table")]
    pub operators: HashMap<String, OperatorKind>,

    /// Operator applied to categories missing from the table.
    /// Unrecognized categories are kept, not treated as errors.
    #[serde(default)]
    pub default_operator: OperatorKind,

    /// Explicit allow-list of category labels to analyze. When unset, every
    /// category in the operator table is analyzed; unlisted categories are
    /// left untouched either way.
    #[serde(default)]
    pub allowed_categories: Option<Vec<String>>,

    /// Static key handed to the injected cipher for encrypt/decrypt
    #[serde(default)]
    pub encryption_key: String,

    /// Chunking budgets
    #[serde(default)]
    pub chunking: ChunkerConfig,

    /// Minimum similarity score for accepting a fuzzy reverse match
    #[serde(default = "default_fuzzy_cutoff")]
    pub fuzzy_cutoff: f64,
}

fn default_fuzzy_cutoff() -> f64 {
    0.6
}

/// Operator table matching the stock deployment: fabricate look-alikes for
/// everything identifying, keep city names readable
fn default_operator_table() -> HashMap<String, OperatorKind> {
    let mut operators = HashMap::new();
    for category in EntityCategory::ALL {
        let operator = match category {
            EntityCategory::City => OperatorKind::Keep,
            _ => OperatorKind::Pseudonymize,
        };
        operators.insert(category.label().to_string(), operator);
    }
    operators
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            operators: default_operator_table(),
            default_operator: OperatorKind::Keep,
            allowed_categories: None,
            encryption_key: String::new(),
            chunking: ChunkerConfig::default(),
            fuzzy_cutoff: default_fuzzy_cutoff(),
        }
    }
}

impl PipelineConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, VeilError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml(&content)
    }

    /// Parse configuration from TOML content
    pub fn from_toml(content: &str) -> Result<Self, VeilError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), VeilError> {
        self.chunking.validate()?;

        if !(0.0..=1.0).contains(&self.fuzzy_cutoff) {
            return Err(VeilError::Configuration(format!(
                "fuzzy_cutoff must be within [0, 1], got {}",
                self.fuzzy_cutoff
            )));
        }

        for label in self.operators.keys() {
            EntityCategory::from_label(label)?;
        }
        if let Some(allowed) = &self.allowed_categories {
            for label in allowed {
                EntityCategory::from_label(label)?;
            }
        }

        let encrypts = self.default_operator == OperatorKind::Encrypt
            || self.operators.values().any(|op| *op == OperatorKind::Encrypt);
        if encrypts && self.encryption_key.is_empty() {
            return Err(VeilError::Configuration(
                "encryption_key is required when any category encrypts".to_string(),
            ));
        }

        Ok(())
    }
}
