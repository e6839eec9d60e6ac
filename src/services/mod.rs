//! Collaborator capability contracts
//!
//! The engine consumes five external capabilities plus sentence boundary
//! detection. All of them are synchronous, opaque calls: the engine never
//! retries or times them out, and their failures propagate to the caller
//! unchanged. Implementations are injected at pipeline construction; there
//! are no ambient or process-wide service handles.
//!
//! Bundled implementations for the seams that can be served locally live in
//! [`crate::adapters`].

use anyhow::Result;

use crate::domain::{EntityCategory, EntitySpan};

/// Detects entity occurrences in a single chunk of text.
///
/// Spans must be ordered, with byte offsets relative to the chunk text and
/// scores in [0, 1]. Re-offsetting against the reassembled text is the
/// pipeline's job, not the analyzer's.
pub trait EntityAnalyzer {
    /// Analyze one chunk, restricted to the given categories
    fn analyze(&self, text: &str, categories: &[EntityCategory]) -> Result<Vec<EntitySpan>>;
}

/// Produces a shape-plausible fabricated value for a category.
///
/// Determinism is not required; caching identical inputs onto identical
/// fakes is the identity store's job.
pub trait FakeValueFactory {
    /// Generate a fake value standing in for `true_value`
    fn generate(&self, category: EntityCategory, true_value: &str) -> Result<String>;
}

/// Exact-inverse encryption pair over text
pub trait ReversibleCipher {
    /// Encrypt `text` under `key`
    fn encrypt(&self, text: &str, key: &str) -> Result<String>;

    /// Decrypt a ciphertext previously produced by [`encrypt`](Self::encrypt)
    fn decrypt(&self, ciphertext: &str, key: &str) -> Result<String>;
}

/// Grammatical case for inflection requests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GrammaticalCase {
    Nominative,
    Genitive,
    Dative,
    Accusative,
    Instrumental,
    Prepositional,
}

/// All six grammatical cases, in declension-table order
pub const ALL_CASES: [GrammaticalCase; 6] = [
    GrammaticalCase::Nominative,
    GrammaticalCase::Genitive,
    GrammaticalCase::Dative,
    GrammaticalCase::Accusative,
    GrammaticalCase::Instrumental,
    GrammaticalCase::Prepositional,
];

/// Grammatical number for inflection requests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GrammaticalNumber {
    Singular,
    Plural,
}

/// Grammatical gender for inflection requests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GrammaticalGender {
    Masculine,
    Feminine,
    Neuter,
}

/// Feature bundle passed to [`MorphologyService::inflect`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GrammaticalFeatures {
    pub case: GrammaticalCase,
    pub number: GrammaticalNumber,
    pub gender: Option<GrammaticalGender>,
}

impl GrammaticalFeatures {
    /// Features without a gender constraint
    pub fn new(case: GrammaticalCase, number: GrammaticalNumber) -> Self {
        Self {
            case,
            number,
            gender: None,
        }
    }

    /// The canonical dictionary form used for name keys:
    /// nominative, singular, masculine
    pub fn canonical() -> Self {
        Self {
            case: GrammaticalCase::Nominative,
            number: GrammaticalNumber::Singular,
            gender: Some(GrammaticalGender::Masculine),
        }
    }
}

/// Lemmatization and inflection, used only by name normalization
pub trait MorphologyService {
    /// Reduce a token to its lemma
    fn lemmatize(&self, token: &str) -> Result<String>;

    /// Inflect a token into the requested grammatical form.
    ///
    /// `Ok(None)` means the form does not exist for this token; the caller
    /// falls back to the token itself.
    fn inflect(&self, token: &str, features: &GrammaticalFeatures) -> Result<Option<String>>;
}

/// One labeled component of a parsed address
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressComponent {
    /// Component label (`house`, `road`, `city`, `postcode`, ...)
    pub label: String,
    /// Component value as found in the raw string
    pub value: String,
}

impl AddressComponent {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }
}

/// Address parsing and expansion, used only by address normalization
pub trait AddressParser {
    /// Parse a raw address string into labeled components
    fn parse(&self, raw: &str) -> Result<Vec<AddressComponent>>;

    /// Produce textual expansion variants (abbreviation and spelling
    /// normalizations) of the raw address
    fn expand(&self, raw: &str) -> Result<Vec<String>>;
}

/// Sentence boundary detection, used by the chunker for lines that exceed
/// the chunk budget
pub trait SentenceSplitter {
    /// Split text into sentences, in order, covering all non-whitespace
    /// content of the input
    fn split(&self, text: &str) -> Result<Vec<String>>;
}
