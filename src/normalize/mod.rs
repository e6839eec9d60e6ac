//! Canonical key computation
//!
//! Different surface forms of the same real-world value must collide onto
//! one canonical lookup key, per category: names are lemmatized and folded
//! to a canonical grammatical form, phone numbers are collapsed to a fixed
//! 12-digit key, addresses are parsed into labeled components and hashed in
//! a fixed layout, and everything else is keyed by a direct hash of the raw
//! value.

pub mod address;
pub mod name;
pub mod phone;

use anyhow::Result;
use sha2::{Digest, Sha256};

use crate::domain::{EntityCategory, KeyClass};
use crate::services::{AddressParser, MorphologyService};

/// Canonical lookup key for one value.
///
/// `fuzzy` is only populated for addresses (the hash of the expansion
/// variant set); `cacheable` is only ever false for names that fail the
/// inflection round-trip validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedKey {
    /// Primary key for exact forward/backward lookup
    pub canonical: String,
    /// Approximate-matching key, when the category supports one
    pub fuzzy: Option<String>,
    /// Whether every inflected form of the value reproduces the same key
    pub cacheable: bool,
}

impl NormalizedKey {
    /// An exact-match-only key
    pub fn exact(canonical: String) -> Self {
        Self {
            canonical,
            fuzzy: None,
            cacheable: true,
        }
    }
}

/// SHA-256 hex digest of a raw value
pub fn hash_value(value: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(value.as_bytes());
    let result = hasher.finalize();
    format!("{result:x}")
}

/// Computes canonical lookup keys per category.
///
/// Owns the morphology and address-parsing service handles; both are
/// injected at construction and never shared globally.
pub struct Normalizer {
    morphology: Box<dyn MorphologyService>,
    address_parser: Box<dyn AddressParser>,
}

impl Normalizer {
    /// Create a normalizer over the given collaborator handles
    pub fn new(
        morphology: Box<dyn MorphologyService>,
        address_parser: Box<dyn AddressParser>,
    ) -> Self {
        Self {
            morphology,
            address_parser,
        }
    }

    /// Compute the canonical key for a value of the given category
    pub fn key(&self, category: EntityCategory, value: &str) -> Result<NormalizedKey> {
        match category.key_class() {
            KeyClass::Name => name::canonical_key(self.morphology.as_ref(), value),
            KeyClass::Phone => Ok(NormalizedKey::exact(phone::canonical_key(value))),
            KeyClass::Address => address::canonical_key(self.address_parser.as_ref(), value),
            KeyClass::Generic => Ok(NormalizedKey::exact(hash_value(value))),
        }
    }

    /// Compute the lookup-only key for a value: identical canonical
    /// material to [`key`](Self::key), but names skip the 12-form
    /// round-trip validation, which only matters when a value is stored
    pub fn lookup_key(&self, category: EntityCategory, value: &str) -> Result<NormalizedKey> {
        match category.key_class() {
            KeyClass::Name => name::lookup_key(self.morphology.as_ref(), value),
            _ => self.key(category, value),
        }
    }
}
