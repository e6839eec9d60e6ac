//! Entity category and span data models

use serde::{Deserialize, Serialize};

use crate::domain::errors::VeilError;

/// Closed set of entity categories the pipeline knows how to transform.
///
/// Categories map onto one of four normalization classes (see
/// [`KeyClass`]): person names get morphological canonicalization, phone
/// numbers get digit-level segmentation, addresses get component-level
/// parsing, and everything else is keyed by a direct hash of the raw value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntityCategory {
    /// Person names (first, middle, last, full)
    Person,
    /// Organization and company names
    Organization,
    /// Street-level addresses
    Address,
    /// City names
    City,
    /// Telephone numbers
    Phone,
    /// Email addresses
    Email,
    /// Web URLs
    Url,
    /// IP addresses
    IpAddress,
    /// Payment card numbers
    CreditCard,
    /// Bank account numbers
    #[serde(rename = "ACCOUNT")]
    AccountNumber,
    /// Passport numbers
    Passport,
    /// Taxpayer identification numbers
    TaxId,
    /// Social insurance numbers
    InsuranceId,
}

/// Normalization class driving canonical key computation for a category
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyClass {
    /// Lemmatize and inflect to a canonical grammatical form
    Name,
    /// Collapse to a fixed 12-digit country/area/local key
    Phone,
    /// Parse into labeled components, hash the canonical layout
    Address,
    /// Hash the raw value, exact-match only
    Generic,
}

impl EntityCategory {
    /// All categories, in a stable order
    pub const ALL: [EntityCategory; 13] = [
        Self::Person,
        Self::Organization,
        Self::Address,
        Self::City,
        Self::Phone,
        Self::Email,
        Self::Url,
        Self::IpAddress,
        Self::CreditCard,
        Self::AccountNumber,
        Self::Passport,
        Self::TaxId,
        Self::InsuranceId,
    ];

    /// Get human-readable label for the category
    pub fn label(&self) -> &'static str {
        match self {
            Self::Person => "PERSON",
            Self::Organization => "ORGANIZATION",
            Self::Address => "ADDRESS",
            Self::City => "CITY",
            Self::Phone => "PHONE",
            Self::Email => "EMAIL",
            Self::Url => "URL",
            Self::IpAddress => "IP_ADDRESS",
            Self::CreditCard => "CREDIT_CARD",
            Self::AccountNumber => "ACCOUNT",
            Self::Passport => "PASSPORT",
            Self::TaxId => "TAX_ID",
            Self::InsuranceId => "INSURANCE_ID",
        }
    }

    /// Parse a category label as used in configuration files
    pub fn from_label(s: &str) -> Result<Self, VeilError> {
        let upper = s.to_uppercase();
        Self::ALL
            .iter()
            .find(|c| c.label() == upper)
            .copied()
            .ok_or_else(|| VeilError::UnknownCategory(s.to_string()))
    }

    /// Normalization class used for canonical key computation
    pub fn key_class(&self) -> KeyClass {
        match self {
            Self::Person => KeyClass::Name,
            Self::Phone => KeyClass::Phone,
            Self::Address => KeyClass::Address,
            _ => KeyClass::Generic,
        }
    }

    /// Whether reverse lookup should tolerate paraphrasing.
    ///
    /// A rewriting service is likely to re-order or re-spell names,
    /// organizations, addresses, phone formattings and URLs; fixed
    /// identifiers come back verbatim or not at all.
    pub fn prefers_fuzzy_reverse(&self) -> bool {
        matches!(
            self,
            Self::Person | Self::Organization | Self::Address | Self::Phone | Self::Url
        )
    }
}

/// A detected entity occurrence.
///
/// Offsets are byte positions into the reassembled text returned by the
/// pipeline's analyze step, not into any individual chunk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntitySpan {
    /// Entity category
    pub category: EntityCategory,
    /// Start byte offset (inclusive)
    pub start: usize,
    /// End byte offset (exclusive)
    pub end: usize,
    /// Confidence score (0.0 - 1.0)
    pub score: f32,
    /// Name of the recognizer that produced this span
    pub recognizer: String,
}

impl EntitySpan {
    /// Create a new span, clamping the score into [0, 1]
    pub fn new(
        category: EntityCategory,
        start: usize,
        end: usize,
        score: f32,
        recognizer: impl Into<String>,
    ) -> Self {
        Self {
            category,
            start,
            end,
            score: score.clamp(0.0, 1.0),
            recognizer: recognizer.into(),
        }
    }

    /// Return a copy shifted right by `offset` bytes
    pub fn shifted(mut self, offset: usize) -> Self {
        self.start += offset;
        self.end += offset;
        self
    }
}
