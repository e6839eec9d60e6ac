//! Pseudonymization pipeline
//!
//! Orchestrates chunked analysis, category-based replacement, and reversal.
//! A pipeline owns one context: its identity store starts empty, is
//! populated by every anonymize call, and is emptied only by an explicit
//! [`reset`](PseudonymizationPipeline::reset).
//!
//! The deanonymize path re-analyzes its input instead of trusting recorded
//! offsets, because a third party may have rewritten the text arbitrarily.
//! Recorded ciphertexts are the one exception: re-analysis cannot re-detect
//! them, so they are restored by literal occurrence search against the
//! replacement record.

use std::collections::HashMap;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::chunker::Chunker;
use crate::config::PipelineConfig;
use crate::domain::errors::VeilError;
use crate::domain::{EntityCategory, EntitySpan, CHUNK_SEPARATOR};
use crate::normalize::Normalizer;
use crate::pipeline::operators::{OperatorKind, OperatorRegistry};
use crate::services::{
    AddressParser, EntityAnalyzer, FakeValueFactory, MorphologyService, ReversibleCipher,
    SentenceSplitter,
};
use crate::store::{token_sort_score, IdentityStore, PASSTHROUGH_SENTINEL};

/// Text with its merged, globally-offset span list
#[derive(Debug, Clone)]
pub struct AnalyzedText {
    /// Reassembled text the span offsets refer to
    pub text: String,
    /// Detected spans, re-offset against the reassembled text
    pub spans: Vec<EntitySpan>,
}

/// Record of one applied replacement, with offsets into the transformed
/// output text
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Replacement {
    /// Entity category the span was detected as
    pub category: EntityCategory,
    /// Operator that was applied
    pub operator: OperatorKind,
    /// Replacement text written into the output
    pub output: String,
    /// Start byte offset in the output text
    pub start: usize,
    /// End byte offset in the output text
    pub end: usize,
}

/// Result of one anonymize call
#[derive(Debug, Clone, Serialize)]
pub struct Anonymized {
    /// Transformed text
    pub text: String,
    /// Span/operator record needed for later reversal
    pub replacements: Vec<Replacement>,
    /// Replacement counts by category
    pub stats_by_category: HashMap<EntityCategory, usize>,
}

impl Anonymized {
    /// Whether any entity was transformed
    pub fn has_replacements(&self) -> bool {
        !self.replacements.is_empty()
    }
}

/// Injected collaborator handles for a pipeline.
///
/// All collaborators are explicitly owned; nothing is resolved from
/// process-wide state. The sentence splitter and length function have
/// local defaults (rule-based splitting, character count); everything else
/// must be supplied.
pub struct PipelineServices {
    analyzer: Box<dyn EntityAnalyzer>,
    factory: Box<dyn FakeValueFactory>,
    morphology: Box<dyn MorphologyService>,
    address_parser: Box<dyn AddressParser>,
    cipher: Option<Box<dyn ReversibleCipher>>,
    splitter: Box<dyn SentenceSplitter>,
    measure: Box<dyn Fn(&str) -> usize>,
}

impl PipelineServices {
    /// Bundle the required collaborators, with default sentence splitting
    /// and a character-count length function
    pub fn new(
        analyzer: Box<dyn EntityAnalyzer>,
        factory: Box<dyn FakeValueFactory>,
        morphology: Box<dyn MorphologyService>,
        address_parser: Box<dyn AddressParser>,
    ) -> Self {
        Self {
            analyzer,
            factory,
            morphology,
            address_parser,
            cipher: None,
            splitter: Box::new(crate::adapters::RuleSentenceSplitter::default()),
            measure: Box::new(|s: &str| s.chars().count()),
        }
    }

    /// Supply a cipher for categories configured to encrypt
    pub fn with_cipher(mut self, cipher: Box<dyn ReversibleCipher>) -> Self {
        self.cipher = Some(cipher);
        self
    }

    /// Replace the default sentence splitter
    pub fn with_splitter(mut self, splitter: Box<dyn SentenceSplitter>) -> Self {
        self.splitter = splitter;
        self
    }

    /// Replace the default character-count length function, e.g. with a
    /// token-aware measurement
    pub fn with_length_fn(mut self, measure: Box<dyn Fn(&str) -> usize>) -> Self {
        self.measure = measure;
        self
    }
}

/// Reversible pseudonymization pipeline over one context
pub struct PseudonymizationPipeline {
    config: PipelineConfig,
    registry: OperatorRegistry,
    allowed: Vec<EntityCategory>,
    normalizer: Normalizer,
    analyzer: Box<dyn EntityAnalyzer>,
    factory: Box<dyn FakeValueFactory>,
    cipher: Option<Box<dyn ReversibleCipher>>,
    splitter: Box<dyn SentenceSplitter>,
    measure: Box<dyn Fn(&str) -> usize>,
    store: IdentityStore,
    last_replacements: Option<Vec<Replacement>>,
}

impl PseudonymizationPipeline {
    /// Build a pipeline from configuration and injected collaborators
    pub fn new(config: PipelineConfig, services: PipelineServices) -> Result<Self> {
        config.validate().context("Invalid pipeline configuration")?;
        let registry = OperatorRegistry::from_config(&config)?;

        if registry.uses_encryption() && services.cipher.is_none() {
            return Err(VeilError::Configuration(
                "a cipher must be supplied when any category encrypts".to_string(),
            )
            .into());
        }

        let allowed = match &config.allowed_categories {
            Some(labels) => labels
                .iter()
                .map(|l| EntityCategory::from_label(l))
                .collect::<Result<Vec<_>, _>>()?,
            None => registry.categories(),
        };

        Ok(Self {
            config,
            registry,
            allowed,
            normalizer: Normalizer::new(services.morphology, services.address_parser),
            analyzer: services.analyzer,
            factory: services.factory,
            cipher: services.cipher,
            splitter: services.splitter,
            measure: services.measure,
            store: IdentityStore::new(),
            last_replacements: None,
        })
    }

    /// Whether this context has seen any anonymize call since creation or
    /// the last reset
    pub fn is_populated(&self) -> bool {
        !self.store.is_empty() || self.last_replacements.is_some()
    }

    /// The identity store backing this context
    pub fn store(&self) -> &IdentityStore {
        &self.store
    }

    /// Clear the identity store and the replacement record. All-or-nothing;
    /// the context returns to its initial empty state.
    pub fn reset(&mut self) {
        self.store.reset();
        self.last_replacements = None;
        info!("context reset");
    }

    /// Chunk the text, analyze each chunk, and merge spans re-offset
    /// against the reassembled text.
    ///
    /// Chunks are rejoined with [`CHUNK_SEPARATOR`]; each chunk's shift is
    /// the cumulative length of previously reassembled chunks including
    /// their separators.
    pub fn analyze(&self, text: &str) -> Result<AnalyzedText> {
        let chunker = Chunker::new(self.config.chunking.clone(), &*self.measure, &*self.splitter)?;
        let chunks = chunker.chunk(text)?;

        let mut reassembled = String::with_capacity(text.len() + chunks.len());
        let mut spans = Vec::new();
        for chunk in &chunks {
            let mut found = self
                .analyzer
                .analyze(&chunk.text, &self.allowed)
                .context("entity analysis failed")?;
            found.sort_by_key(|s| s.start);
            spans.extend(found.into_iter().map(|s| s.shifted(chunk.start)));

            reassembled.push_str(&chunk.text);
            reassembled.push_str(CHUNK_SEPARATOR);
        }

        debug!(
            chunks = chunks.len(),
            spans = spans.len(),
            "analysis complete"
        );
        Ok(AnalyzedText {
            text: reassembled,
            spans,
        })
    }

    /// Transform the text, replacing each detected entity according to its
    /// category's operator.
    ///
    /// Populates the context: repeated calls with identical text reuse the
    /// cached identity records and leave the store unchanged.
    pub fn anonymize(&mut self, text: &str) -> Result<Anonymized> {
        let analyzed = self.analyze(text)?;
        let mut spans = analyzed.spans;
        // left-to-right, longest span wins on shared start
        spans.sort_by(|a, b| a.start.cmp(&b.start).then(b.end.cmp(&a.end)));

        let mut out = String::with_capacity(analyzed.text.len());
        let mut replacements = Vec::new();
        let mut cursor = 0usize;

        for span in &spans {
            if span.start < cursor || span.end > analyzed.text.len() {
                continue;
            }
            let source = &analyzed.text[span.start..span.end];

            let operator = if source == PASSTHROUGH_SENTINEL {
                OperatorKind::Keep
            } else {
                self.registry.operator_for(span.category)
            };
            let output = match operator {
                OperatorKind::Keep => source.to_string(),
                OperatorKind::Encrypt => self
                    .cipher()?
                    .encrypt(source, &self.config.encryption_key)
                    .context("encryption failed")?,
                OperatorKind::Pseudonymize => self.store.get_or_create_fake(
                    span.category,
                    source,
                    &self.normalizer,
                    self.factory.as_ref(),
                )?,
            };

            out.push_str(&analyzed.text[cursor..span.start]);
            let out_start = out.len();
            out.push_str(&output);
            replacements.push(Replacement {
                category: span.category,
                operator,
                output,
                start: out_start,
                end: out.len(),
            });
            cursor = span.end;
        }
        out.push_str(&analyzed.text[cursor..]);

        let mut stats_by_category = HashMap::new();
        for replacement in &replacements {
            *stats_by_category.entry(replacement.category).or_insert(0) += 1;
        }
        info!(
            replacements = replacements.len(),
            identities = self.store.len(),
            "anonymization complete"
        );

        self.last_replacements = Some(replacements.clone());
        Ok(Anonymized {
            text: out,
            replacements,
            stats_by_category,
        })
    }

    /// Reverse a previously anonymized (and possibly externally rewritten)
    /// text using the record of the last anonymize call on this context.
    ///
    /// On an empty context the input is returned unchanged.
    pub fn deanonymize(&self, text: &str) -> Result<String> {
        match self.last_replacements.as_deref() {
            Some(record) => self.deanonymize_with_record(text, record),
            None => {
                warn!("deanonymize called on an empty context; returning input unchanged");
                Ok(text.to_string())
            }
        }
    }

    /// Reverse using an explicit replacement record.
    ///
    /// The text is re-analyzed (never trusting stale offsets), pseudonymized
    /// categories are reverse-looked-up exactly or fuzzily, and recorded
    /// ciphertexts are restored by first-unconsumed literal occurrence. All
    /// replacements are applied in a single left-to-right pass so earlier
    /// length changes cannot corrupt later positions.
    pub fn deanonymize_with_record(&self, text: &str, record: &[Replacement]) -> Result<String> {
        let analyzed = self.analyze(text)?;

        let mut edits: Vec<(usize, usize, String)> = Vec::new();
        for span in &analyzed.spans {
            if span.end > analyzed.text.len() {
                continue;
            }
            let source = &analyzed.text[span.start..span.end];
            if source == PASSTHROUGH_SENTINEL {
                continue;
            }
            if self.registry.operator_for(span.category) != OperatorKind::Pseudonymize {
                continue;
            }

            let restored = if span.category.prefers_fuzzy_reverse() {
                self.store.fuzzy_reverse(
                    span.category,
                    source,
                    &self.normalizer,
                    token_sort_score,
                    self.config.fuzzy_cutoff,
                )?
            } else {
                self.store
                    .exact_reverse(span.category, source, &self.normalizer)?
            };

            // a miss degrades to keeping the input, never an error
            if let Some(true_value) = restored {
                if true_value != source {
                    edits.push((span.start, span.end, true_value.to_string()));
                }
            }
        }

        for replacement in record
            .iter()
            .filter(|r| r.operator == OperatorKind::Encrypt)
        {
            if let Some(start) =
                next_unclaimed_occurrence(&analyzed.text, &replacement.output, &edits)
            {
                let plaintext = self
                    .cipher()?
                    .decrypt(&replacement.output, &self.config.encryption_key)
                    .context("decryption failed")?;
                edits.push((start, start + replacement.output.len(), plaintext));
            }
        }

        edits.sort_by(|a, b| a.0.cmp(&b.0).then(a.1.cmp(&b.1)));

        let mut out = String::with_capacity(analyzed.text.len());
        let mut cursor = 0usize;
        for (start, end, restored) in edits {
            if start < cursor {
                continue;
            }
            out.push_str(&analyzed.text[cursor..start]);
            out.push_str(&restored);
            cursor = end;
        }
        out.push_str(&analyzed.text[cursor..]);
        Ok(out)
    }

    /// Serialize the replacement record of the last anonymize call, for
    /// deanonymizing in another process via
    /// [`deanonymize_with_record`](Self::deanonymize_with_record)
    pub fn export_record(&self) -> Result<Option<String>> {
        match &self.last_replacements {
            Some(record) => Ok(Some(serde_json::to_string(record)?)),
            None => Ok(None),
        }
    }

    /// Parse a replacement record previously produced by
    /// [`export_record`](Self::export_record)
    pub fn parse_record(json: &str) -> Result<Vec<Replacement>> {
        serde_json::from_str(json).context("Invalid replacement record")
    }

    fn cipher(&self) -> Result<&dyn ReversibleCipher> {
        self.cipher
            .as_deref()
            .ok_or_else(|| anyhow::anyhow!("no cipher configured"))
    }
}

/// First occurrence of `needle` in `text` that does not overlap an already
/// claimed edit. Two different entities may share literal substrings, so a
/// global replace is never safe; each recorded ciphertext claims exactly
/// one occurrence, scanning left to right.
fn next_unclaimed_occurrence(
    text: &str,
    needle: &str,
    edits: &[(usize, usize, String)],
) -> Option<usize> {
    if needle.is_empty() {
        return None;
    }
    'candidates: for (start, _) in text.match_indices(needle) {
        let end = start + needle.len();
        for (claimed_start, claimed_end, _) in edits {
            if start < *claimed_end && *claimed_start < end {
                continue 'candidates;
            }
        }
        return Some(start);
    }
    None
}
