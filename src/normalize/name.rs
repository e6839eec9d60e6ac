//! Person name canonicalization
//!
//! A name key is built by lemmatizing each token, inflecting the lemma to
//! the canonical nominative-singular-masculine form, scrubbing everything
//! that is not alphanumeric or a space, and joining with single spaces.
//!
//! Validation then declines the name through all six grammatical cases in
//! both numbers (12 forms) and checks that every form canonicalizes back to
//! the same key. Irregular names that fail this round-trip are still faked,
//! but flagged non-cacheable so reverse lookups know to expect drift.

use anyhow::Result;
use tracing::{debug, warn};

use super::NormalizedKey;
use crate::services::{
    GrammaticalFeatures, GrammaticalNumber, MorphologyService, ALL_CASES,
};

/// Compute the canonical key for a person name, including the 12-form
/// round-trip validation
pub fn canonical_key(morphology: &dyn MorphologyService, raw: &str) -> Result<NormalizedKey> {
    let canonical = base_key(morphology, raw)?;

    let cacheable = match round_trips(morphology, raw, &canonical) {
        Ok(stable) => stable,
        Err(e) => {
            debug!(error = ?e, name_key = %canonical, "inflection round-trip check failed");
            false
        }
    };
    if !cacheable {
        warn!(
            name_key = %canonical,
            "name does not canonicalize consistently across inflected forms; marking non-cacheable"
        );
    }

    Ok(NormalizedKey {
        canonical,
        fuzzy: None,
        cacheable,
    })
}

/// Compute the lookup key for a person name without the round-trip
/// validation. Reverse lookups take arbitrary strings; only generation
/// needs the cacheability verdict, and the validation sweep costs 12
/// declensions per token.
pub fn lookup_key(morphology: &dyn MorphologyService, raw: &str) -> Result<NormalizedKey> {
    Ok(NormalizedKey::exact(base_key(morphology, raw)?))
}

/// Lemmatize, fold to the canonical form, scrub, and join
fn base_key(morphology: &dyn MorphologyService, raw: &str) -> Result<String> {
    let features = GrammaticalFeatures::canonical();
    let mut parts = Vec::new();
    for token in raw.split_whitespace() {
        let lemma = morphology.lemmatize(token)?;
        let form = morphology.inflect(&lemma, &features)?.unwrap_or(lemma);
        parts.push(form);
    }
    Ok(scrub(&parts.join(" ")))
}

/// Keep alphanumerics and spaces, lowercase, collapse runs of whitespace
fn scrub(s: &str) -> String {
    let filtered: String = s
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c.is_whitespace() {
                c
            } else {
                ' '
            }
        })
        .collect();
    filtered
        .split_whitespace()
        .map(|w| w.to_lowercase())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Decline the name through all 12 case/number forms and verify each form
/// reproduces the expected key
fn round_trips(
    morphology: &dyn MorphologyService,
    raw: &str,
    expected_key: &str,
) -> Result<bool> {
    for number in [GrammaticalNumber::Singular, GrammaticalNumber::Plural] {
        for case in ALL_CASES {
            let features = GrammaticalFeatures::new(case, number);
            let mut tokens = Vec::new();
            for token in raw.split_whitespace() {
                let inflected = morphology
                    .inflect(token, &features)?
                    .unwrap_or_else(|| token.to_string());
                tokens.push(inflected);
            }
            let form = tokens.join(" ");
            if base_key(morphology, &form)? != expected_key {
                return Ok(false);
            }
        }
    }
    Ok(true)
}
