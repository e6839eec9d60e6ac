//! Session-scoped identity store
//!
//! Bidirectional map from canonical keys to (true, fake) value pairs. One
//! store belongs to exactly one context: contexts never share records, so
//! a fake value minted in one context is meaningless (a lookup miss, not an
//! error) in every other.
//!
//! Forward mapping is idempotent: a true value always canonicalizes to the
//! same key and therefore always yields the same fake within the store's
//! lifetime. Reverse mapping is exact by default, with an opt-in fuzzy path
//! for values a third party may have paraphrased.

use std::collections::HashMap;

use anyhow::Result;
use serde::Serialize;
use tracing::{debug, warn};

use crate::domain::{EntityCategory, KeyClass};
use crate::normalize::Normalizer;
use crate::services::FakeValueFactory;

/// Reserved literal meaning "do not transform". Callers inject it for
/// deliberately redacted markers; every store operation passes it through.
pub const PASSTHROUGH_SENTINEL: &str = "PII";

/// How many fabricated candidates to try before accepting one whose
/// inflected forms do not round-trip
const FAKE_GENERATION_ATTEMPTS: usize = 10;

/// One (true, fake) identity pair and its lookup keys
#[derive(Debug, Clone, Serialize)]
pub struct IdentityRecord {
    /// The real value, never exposed externally
    pub true_value: String,
    /// The fabricated stand-in
    pub fake_value: String,
    /// Canonical key of the true value
    pub canonical_key: String,
    /// Approximate-matching key of the fake value, when the category has one
    pub fuzzy_key: Option<String>,
    /// False when either side failed the inflection round-trip validation
    pub cacheable: bool,
}

/// Bidirectional identity map scoped to one context
#[derive(Debug, Default)]
pub struct IdentityStore {
    records: Vec<IdentityRecord>,
    by_true_key: HashMap<String, usize>,
    by_fake_key: HashMap<String, usize>,
    by_fuzzy_key: HashMap<String, usize>,
}

impl IdentityStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of identity records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the store holds no records
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// All records, in insertion order
    pub fn records(&self) -> &[IdentityRecord] {
        &self.records
    }

    /// Return the cached fake for `true_value`, minting one through
    /// `factory` on first sight.
    ///
    /// Idempotent: identical `(category, true_value)` inputs never create a
    /// second record and always return the same fake. For names, a fake
    /// whose inflected forms do not round-trip is regenerated up to
    /// [`FAKE_GENERATION_ATTEMPTS`] times before being accepted with a
    /// warning.
    pub fn get_or_create_fake(
        &mut self,
        category: EntityCategory,
        true_value: &str,
        normalizer: &Normalizer,
        factory: &dyn FakeValueFactory,
    ) -> Result<String> {
        if true_value == PASSTHROUGH_SENTINEL {
            return Ok(true_value.to_string());
        }

        let true_key = normalizer.key(category, true_value)?;
        if let Some(&idx) = self.by_true_key.get(&true_key.canonical) {
            return Ok(self.records[idx].fake_value.clone());
        }

        let mut fake_value = factory.generate(category, true_value)?;
        let mut fake_key = normalizer.key(category, &fake_value)?;
        let mut attempts = 1;
        while !fake_key.cacheable && attempts < FAKE_GENERATION_ATTEMPTS {
            fake_value = factory.generate(category, true_value)?;
            fake_key = normalizer.key(category, &fake_value)?;
            attempts += 1;
        }
        if !fake_key.cacheable {
            warn!(
                category = category.label(),
                "accepted a fabricated value that does not round-trip; \
                 exact reverse lookup of its inflected forms will miss"
            );
        }

        let idx = self.records.len();
        self.records.push(IdentityRecord {
            true_value: true_value.to_string(),
            fake_value: fake_value.clone(),
            canonical_key: true_key.canonical.clone(),
            fuzzy_key: fake_key.fuzzy.clone(),
            cacheable: true_key.cacheable && fake_key.cacheable,
        });
        self.by_true_key.insert(true_key.canonical, idx);
        self.by_fake_key.insert(fake_key.canonical, idx);
        if let Some(fuzzy) = fake_key.fuzzy {
            self.by_fuzzy_key.insert(fuzzy, idx);
        }

        Ok(fake_value)
    }

    /// Resolve a fake value back to its true value by exact canonical-key
    /// lookup. `None` is a miss, not an error.
    ///
    /// Uses the lookup-only key: reverse inputs are arbitrary strings, so
    /// re-running the generation-time validation sweep on them would cost
    /// a full declension per token and warn about values that were never
    /// stored.
    pub fn exact_reverse(
        &self,
        category: EntityCategory,
        fake_value: &str,
        normalizer: &Normalizer,
    ) -> Result<Option<&str>> {
        if fake_value == PASSTHROUGH_SENTINEL {
            return Ok(None);
        }
        let key = normalizer.lookup_key(category, fake_value)?;
        match self.by_fake_key.get(&key.canonical) {
            Some(&idx) => {
                let record = &self.records[idx];
                debug!(
                    category = category.label(),
                    key = %key.canonical,
                    "exact reverse hit"
                );
                Ok(Some(record.true_value.as_str()))
            }
            None => {
                debug!(
                    category = category.label(),
                    key = %key.canonical,
                    "exact reverse miss"
                );
                Ok(None)
            }
        }
    }

    /// Resolve a possibly-paraphrased fake value back to its true value.
    ///
    /// For addresses, an exact hit on the stored fuzzy keys (identical
    /// expansion sets) wins first. Otherwise the input is scored against
    /// every stored fake value with `score`; the best match is accepted
    /// only at or above `cutoff`. Falls back to
    /// [`exact_reverse`](Self::exact_reverse) below the cutoff.
    pub fn fuzzy_reverse<F>(
        &self,
        category: EntityCategory,
        fake_value: &str,
        normalizer: &Normalizer,
        score: F,
        cutoff: f64,
    ) -> Result<Option<&str>>
    where
        F: Fn(&str, &str) -> f64,
    {
        if fake_value == PASSTHROUGH_SENTINEL {
            return Ok(None);
        }

        if category.key_class() == KeyClass::Address {
            let key = normalizer.lookup_key(category, fake_value)?;
            if let Some(fuzzy) = key.fuzzy {
                if let Some(&idx) = self.by_fuzzy_key.get(&fuzzy) {
                    debug!(category = category.label(), "fuzzy key hit");
                    return Ok(Some(self.records[idx].true_value.as_str()));
                }
            }
        }

        let mut best: Option<(f64, usize)> = None;
        for (idx, record) in self.records.iter().enumerate() {
            let s = score(fake_value, &record.fake_value);
            if best.map_or(true, |(b, _)| s > b) {
                best = Some((s, idx));
            }
        }
        if let Some((s, idx)) = best {
            if s >= cutoff {
                debug!(
                    category = category.label(),
                    score = s,
                    matched = %self.records[idx].fake_value,
                    "fuzzy reverse hit"
                );
                return Ok(Some(self.records[idx].true_value.as_str()));
            }
            debug!(
                category = category.label(),
                score = s,
                "best fuzzy candidate below cutoff; trying exact lookup"
            );
        }

        self.exact_reverse(category, fake_value, normalizer)
    }

    /// Drop every record and index. All-or-nothing: the store is fully
    /// empty afterwards, never half-cleared.
    pub fn reset(&mut self) {
        self.records.clear();
        self.by_true_key.clear();
        self.by_fake_key.clear();
        self.by_fuzzy_key.clear();
    }
}

/// Default similarity scorer for fuzzy reverse lookup: Jaro-Winkler over
/// lowercased, token-sorted strings, so word reordering costs nothing.
pub fn token_sort_score(a: &str, b: &str) -> f64 {
    strsim::jaro_winkler(&token_sort(a), &token_sort(b))
}

fn token_sort(s: &str) -> String {
    let mut tokens: Vec<String> = s.split_whitespace().map(|t| t.to_lowercase()).collect();
    tokens.sort();
    tokens.join(" ")
}
