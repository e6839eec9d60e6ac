//! Address canonicalization
//!
//! The raw string is parsed into labeled components, which are emitted as
//! `label=value` pairs in a fixed total order and hashed for the primary
//! key. Separately, the unordered set of textual expansion variants is
//! sorted, newline-joined and hashed into a fuzzy key: two spellings of the
//! same address that expand to the same variant set share the fuzzy key
//! even when their component parses differ.

use std::collections::{BTreeSet, HashMap};

use anyhow::{Context, Result};

use super::{hash_value, NormalizedKey};
use crate::services::AddressParser;

/// Canonical component layout. Order matters: it defines the byte layout
/// the primary key is hashed over.
pub const CANONICAL_COMPONENT_ORDER: [&str; 14] = [
    "house",
    "house_number",
    "road",
    "unit",
    "level",
    "entrance",
    "staircase",
    "suburb",
    "city_district",
    "city",
    "state_district",
    "state",
    "postcode",
    "country",
];

/// Compute the canonical and fuzzy keys for an address
pub fn canonical_key(parser: &dyn AddressParser, raw: &str) -> Result<NormalizedKey> {
    let cleaned = raw.split_whitespace().collect::<Vec<_>>().join(" ");

    let components = parser
        .parse(&cleaned)
        .context("address parsing failed")?;
    let mut by_label: HashMap<String, String> = HashMap::new();
    for component in components {
        if component.value.is_empty() {
            continue;
        }
        by_label.insert(component.label, component.value);
    }

    let canonical_string = CANONICAL_COMPONENT_ORDER
        .iter()
        .filter_map(|label| by_label.get(*label).map(|value| format!("{label}={value}")))
        .collect::<Vec<_>>()
        .join("|");

    let variants: BTreeSet<String> = parser
        .expand(&cleaned)
        .context("address expansion failed")?
        .into_iter()
        .collect();
    let fuzzy = if variants.is_empty() {
        None
    } else {
        let joined = variants.into_iter().collect::<Vec<_>>().join("\n");
        Some(hash_value(&joined))
    };

    Ok(NormalizedKey {
        canonical: hash_value(&canonical_string),
        fuzzy,
        cacheable: true,
    })
}
