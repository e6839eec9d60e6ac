//! Shared test doubles for the injectable collaborator traits
#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::{anyhow, bail, Result};
use textveil::domain::{EntityCategory, EntitySpan};
use textveil::services::{
    AddressComponent, AddressParser, EntityAnalyzer, FakeValueFactory, GrammaticalCase,
    GrammaticalFeatures, MorphologyService, ReversibleCipher,
};

/// Analyzer that reports every occurrence of values it was taught
pub struct DictionaryAnalyzer {
    entries: Vec<(String, EntityCategory)>,
}

impl DictionaryAnalyzer {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    pub fn with_entry(mut self, value: &str, category: EntityCategory) -> Self {
        self.entries.push((value.to_string(), category));
        self
    }
}

impl EntityAnalyzer for DictionaryAnalyzer {
    fn analyze(&self, text: &str, categories: &[EntityCategory]) -> Result<Vec<EntitySpan>> {
        let mut spans = Vec::new();
        for (value, category) in &self.entries {
            if !categories.contains(category) {
                continue;
            }
            for (start, _) in text.match_indices(value.as_str()) {
                spans.push(EntitySpan::new(
                    *category,
                    start,
                    start + value.len(),
                    0.9,
                    "dictionary",
                ));
            }
        }
        spans.sort_by_key(|s| s.start);
        Ok(spans)
    }
}

/// Morphology where every token is its own stable lemma in every form
pub struct EchoMorphology;

impl MorphologyService for EchoMorphology {
    fn lemmatize(&self, token: &str) -> Result<String> {
        Ok(token.to_string())
    }

    fn inflect(&self, token: &str, _features: &GrammaticalFeatures) -> Result<Option<String>> {
        Ok(Some(token.to_string()))
    }
}

/// Morphology with an explicit inflected-form-to-lemma table
pub struct MappedMorphology {
    lemmas: HashMap<String, String>,
}

impl MappedMorphology {
    pub fn new(pairs: &[(&str, &str)]) -> Self {
        Self {
            lemmas: pairs
                .iter()
                .map(|(form, lemma)| (form.to_string(), lemma.to_string()))
                .collect(),
        }
    }

    fn lemma_of(&self, token: &str) -> String {
        self.lemmas
            .get(token)
            .cloned()
            .unwrap_or_else(|| token.to_string())
    }
}

impl MorphologyService for MappedMorphology {
    fn lemmatize(&self, token: &str) -> Result<String> {
        Ok(self.lemma_of(token))
    }

    fn inflect(&self, token: &str, _features: &GrammaticalFeatures) -> Result<Option<String>> {
        Ok(Some(self.lemma_of(token)))
    }
}

/// Morphology where tokens ending in `x` decline into forms that do not
/// canonicalize back, so names containing them fail the round-trip check
pub struct IrregularMorphology;

impl MorphologyService for IrregularMorphology {
    fn lemmatize(&self, token: &str) -> Result<String> {
        Ok(token.to_string())
    }

    fn inflect(&self, token: &str, features: &GrammaticalFeatures) -> Result<Option<String>> {
        if token.ends_with('x') && features.case != GrammaticalCase::Nominative {
            Ok(Some(format!("{token}ом")))
        } else {
            Ok(Some(token.to_string()))
        }
    }
}

/// Echo morphology that counts inflection requests
pub struct CountingMorphology {
    inflections: Arc<AtomicUsize>,
}

impl CountingMorphology {
    pub fn new() -> (Self, Arc<AtomicUsize>) {
        let inflections = Arc::new(AtomicUsize::new(0));
        (
            Self {
                inflections: Arc::clone(&inflections),
            },
            inflections,
        )
    }
}

impl MorphologyService for CountingMorphology {
    fn lemmatize(&self, token: &str) -> Result<String> {
        Ok(token.to_string())
    }

    fn inflect(&self, token: &str, _features: &GrammaticalFeatures) -> Result<Option<String>> {
        self.inflections.fetch_add(1, Ordering::Relaxed);
        Ok(Some(token.to_string()))
    }
}

/// Factory that hands out preloaded values per category, in order
pub struct ScriptedFaker {
    values: Mutex<HashMap<EntityCategory, VecDeque<String>>>,
}

impl ScriptedFaker {
    pub fn new() -> Self {
        Self {
            values: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_values(self, category: EntityCategory, values: &[&str]) -> Self {
        {
            let mut table = self.values.lock().unwrap();
            table
                .entry(category)
                .or_default()
                .extend(values.iter().map(|v| v.to_string()));
        }
        self
    }
}

impl FakeValueFactory for ScriptedFaker {
    fn generate(&self, category: EntityCategory, _true_value: &str) -> Result<String> {
        let mut table = self
            .values
            .lock()
            .map_err(|_| anyhow!("scripted faker mutex poisoned"))?;
        match table.entry(category).or_default().pop_front() {
            Some(value) => Ok(value),
            None => bail!("scripted faker exhausted for {}", category.label()),
        }
    }
}

/// Toy exact-inverse cipher: XOR with the cycled key, hex-encoded
pub struct XorCipher;

impl ReversibleCipher for XorCipher {
    fn encrypt(&self, text: &str, key: &str) -> Result<String> {
        if key.is_empty() {
            bail!("empty cipher key");
        }
        Ok(text
            .as_bytes()
            .iter()
            .zip(key.as_bytes().iter().cycle())
            .map(|(b, k)| format!("{:02x}", b ^ k))
            .collect())
    }

    fn decrypt(&self, ciphertext: &str, key: &str) -> Result<String> {
        if key.is_empty() {
            bail!("empty cipher key");
        }
        if ciphertext.len() % 2 != 0 {
            bail!("odd-length ciphertext");
        }
        let bytes = (0..ciphertext.len())
            .step_by(2)
            .map(|i| u8::from_str_radix(&ciphertext[i..i + 2], 16))
            .collect::<Result<Vec<u8>, _>>()?;
        let plain: Vec<u8> = bytes
            .iter()
            .zip(key.as_bytes().iter().cycle())
            .map(|(b, k)| b ^ k)
            .collect();
        Ok(String::from_utf8(plain)?)
    }
}

/// Parser that labels comma-separated segments positionally and expands an
/// address into its trimmed segments
pub struct SegmentAddressParser;

const SEGMENT_LABELS: [&str; 5] = ["road", "house", "city", "postcode", "country"];

impl AddressParser for SegmentAddressParser {
    fn parse(&self, raw: &str) -> Result<Vec<AddressComponent>> {
        Ok(raw
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .enumerate()
            .map(|(i, segment)| {
                let label = SEGMENT_LABELS.get(i).copied().unwrap_or("extra");
                AddressComponent::new(label, segment)
            })
            .collect())
    }

    fn expand(&self, raw: &str) -> Result<Vec<String>> {
        Ok(raw
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect())
    }
}
