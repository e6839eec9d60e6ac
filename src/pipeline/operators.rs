//! Per-category operator dispatch
//!
//! A small closed set of operator kinds is dispatched through a registry
//! built once at pipeline construction. Categories missing from the
//! registry fall back to its default operator; at the library level that
//! default is `keep`, so unrecognized categories pass through silently.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::config::PipelineConfig;
use crate::domain::errors::VeilError;
use crate::domain::EntityCategory;

/// What to do with a detected entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperatorKind {
    /// Leave the substring unchanged
    Keep,
    /// Replace with ciphertext from the injected cipher
    Encrypt,
    /// Replace with a cached fabricated look-alike
    Pseudonymize,
}

impl Default for OperatorKind {
    fn default() -> Self {
        Self::Keep
    }
}

/// Statically built category-to-operator table
#[derive(Debug, Clone)]
pub struct OperatorRegistry {
    operators: HashMap<EntityCategory, OperatorKind>,
    default_operator: OperatorKind,
}

impl OperatorRegistry {
    /// Build the registry from configuration, rejecting unknown category
    /// labels up front
    pub fn from_config(config: &PipelineConfig) -> Result<Self, VeilError> {
        let mut operators = HashMap::new();
        for (label, operator) in &config.operators {
            let category = EntityCategory::from_label(label)?;
            operators.insert(category, *operator);
        }
        Ok(Self {
            operators,
            default_operator: config.default_operator,
        })
    }

    /// Operator for a category; categories outside the table get the
    /// default operator
    pub fn operator_for(&self, category: EntityCategory) -> OperatorKind {
        self.operators
            .get(&category)
            .copied()
            .unwrap_or(self.default_operator)
    }

    /// Categories the registry explicitly covers, in stable order
    pub fn categories(&self) -> Vec<EntityCategory> {
        let mut categories: Vec<_> = self.operators.keys().copied().collect();
        categories.sort();
        categories
    }

    /// Whether any configured category encrypts
    pub fn uses_encryption(&self) -> bool {
        self.default_operator == OperatorKind::Encrypt
            || self.operators.values().any(|op| *op == OperatorKind::Encrypt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_registry_covers_all_categories() {
        let config = PipelineConfig::default();
        let registry = OperatorRegistry::from_config(&config).unwrap();
        assert_eq!(registry.categories().len(), EntityCategory::ALL.len());
    }

    #[test]
    fn test_default_table_operators() {
        let config = PipelineConfig::default();
        let registry = OperatorRegistry::from_config(&config).unwrap();
        assert_eq!(
            registry.operator_for(EntityCategory::Person),
            OperatorKind::Pseudonymize
        );
        assert_eq!(registry.operator_for(EntityCategory::City), OperatorKind::Keep);
    }

    #[test]
    fn test_unknown_label_is_configuration_error() {
        let mut config = PipelineConfig::default();
        config
            .operators
            .insert("SPACESHIP".to_string(), OperatorKind::Keep);
        let err = OperatorRegistry::from_config(&config).unwrap_err();
        assert!(matches!(err, VeilError::UnknownCategory(_)));
    }

    #[test]
    fn test_uncovered_category_gets_default() {
        let mut config = PipelineConfig::default();
        config.operators.clear();
        config.default_operator = OperatorKind::Keep;
        let registry = OperatorRegistry::from_config(&config).unwrap();
        assert_eq!(
            registry.operator_for(EntityCategory::Passport),
            OperatorKind::Keep
        );
    }

    #[test]
    fn test_uses_encryption() {
        let mut config = PipelineConfig::default();
        let registry = OperatorRegistry::from_config(&config).unwrap();
        assert!(!registry.uses_encryption());

        config
            .operators
            .insert("EMAIL".to_string(), OperatorKind::Encrypt);
        let registry = OperatorRegistry::from_config(&config).unwrap();
        assert!(registry.uses_encryption());
    }
}
