//! Identity store behavior against the real normalizer

mod common;

use std::sync::atomic::Ordering;

use common::{
    CountingMorphology, IrregularMorphology, MappedMorphology, ScriptedFaker,
    SegmentAddressParser,
};
use textveil::domain::EntityCategory;
use textveil::normalize::Normalizer;
use textveil::store::{token_sort_score, IdentityStore, PASSTHROUGH_SENTINEL};

fn normalizer() -> Normalizer {
    let morphology = MappedMorphology::new(&[
        ("Ивану", "Иван"),
        ("Ивана", "Иван"),
        ("Петрову", "Петров"),
        ("Петрова", "Петров"),
    ]);
    Normalizer::new(Box::new(morphology), Box::new(SegmentAddressParser))
}

fn person_faker(values: &[&str]) -> ScriptedFaker {
    ScriptedFaker::new().with_values(EntityCategory::Person, values)
}

#[test]
fn test_same_value_yields_same_fake() {
    let normalizer = normalizer();
    let faker = person_faker(&["Марк Шагал", "Лев Бакст"]);
    let mut store = IdentityStore::new();

    let first = store
        .get_or_create_fake(EntityCategory::Person, "Иван Петров", &normalizer, &faker)
        .unwrap();
    let second = store
        .get_or_create_fake(EntityCategory::Person, "Иван Петров", &normalizer, &faker)
        .unwrap();

    assert_eq!(first, second);
    assert_eq!(store.len(), 1);
}

#[test]
fn test_inflected_forms_share_identity() {
    let normalizer = normalizer();
    let faker = person_faker(&["Марк Шагал", "Лев Бакст"]);
    let mut store = IdentityStore::new();

    let nominative = store
        .get_or_create_fake(EntityCategory::Person, "Иван Петров", &normalizer, &faker)
        .unwrap();
    let dative = store
        .get_or_create_fake(EntityCategory::Person, "Ивану Петрову", &normalizer, &faker)
        .unwrap();

    assert_eq!(nominative, dative);
    assert_eq!(store.len(), 1);
}

#[test]
fn test_phone_formats_share_identity() {
    let normalizer = normalizer();
    let faker = ScriptedFaker::new()
        .with_values(EntityCategory::Phone, &["+7 (912) 345-67-89", "spare"]);
    let mut store = IdentityStore::new();

    let mut fakes = Vec::new();
    for format in ["+7 (985) 777-72-37", "8 (985) 777-72-37", "+79857777237", "89857777237"] {
        fakes.push(
            store
                .get_or_create_fake(EntityCategory::Phone, format, &normalizer, &faker)
                .unwrap(),
        );
    }

    assert!(fakes.windows(2).all(|w| w[0] == w[1]));
    assert_eq!(store.len(), 1);
}

#[test]
fn test_non_cacheable_fake_candidate_regenerated() {
    let normalizer = Normalizer::new(
        Box::new(IrregularMorphology),
        Box::new(SegmentAddressParser),
    );
    let faker = person_faker(&["Badx Fake", "Good Fake"]);
    let mut store = IdentityStore::new();

    let fake = store
        .get_or_create_fake(EntityCategory::Person, "Иван Петров", &normalizer, &faker)
        .unwrap();

    // the first candidate fails the declension round-trip and is discarded
    assert_eq!(fake, "Good Fake");
    assert_eq!(store.len(), 1);
    assert!(store.records()[0].cacheable);
    let restored = store
        .exact_reverse(EntityCategory::Person, "Good Fake", &normalizer)
        .unwrap();
    assert_eq!(restored, Some("Иван Петров"));
}

#[test]
fn test_exhausted_regeneration_accepts_last_candidate() {
    let normalizer = Normalizer::new(
        Box::new(IrregularMorphology),
        Box::new(SegmentAddressParser),
    );
    let candidates: Vec<String> = (0..10).map(|i| format!("Badx F{i}")).collect();
    let refs: Vec<&str> = candidates.iter().map(String::as_str).collect();
    let faker = person_faker(&refs);
    let mut store = IdentityStore::new();

    let fake = store
        .get_or_create_fake(EntityCategory::Person, "Иван Петров", &normalizer, &faker)
        .unwrap();

    // ten candidates tried, the tenth kept despite failing validation
    assert_eq!(fake, "Badx F9");
    assert_eq!(store.len(), 1);
    assert!(!store.records()[0].cacheable);
}

#[test]
fn test_contexts_are_isolated() {
    let normalizer = normalizer();
    let faker_a = person_faker(&["Марк Шагал"]);
    let faker_b = person_faker(&["Лев Бакст"]);
    let mut store_a = IdentityStore::new();
    let mut store_b = IdentityStore::new();

    let fake_a = store_a
        .get_or_create_fake(EntityCategory::Person, "Иван Петров", &normalizer, &faker_a)
        .unwrap();
    let fake_b = store_b
        .get_or_create_fake(EntityCategory::Person, "Иван Петров", &normalizer, &faker_b)
        .unwrap();

    assert_ne!(fake_a, fake_b);
    // a fake from another context is a miss, not an error
    let crossed = store_b
        .exact_reverse(EntityCategory::Person, &fake_a, &normalizer)
        .unwrap();
    assert_eq!(crossed, None);
}

#[test]
fn test_exact_reverse_round_trip() {
    let normalizer = normalizer();
    let faker = person_faker(&["Марк Шагал"]);
    let mut store = IdentityStore::new();

    let fake = store
        .get_or_create_fake(EntityCategory::Person, "Иван Петров", &normalizer, &faker)
        .unwrap();
    let restored = store
        .exact_reverse(EntityCategory::Person, &fake, &normalizer)
        .unwrap();

    assert_eq!(restored, Some("Иван Петров"));
}

#[test]
fn test_fuzzy_reverse_tolerates_word_reorder() {
    let normalizer = normalizer();
    let faker = person_faker(&["Марк Шагал"]);
    let mut store = IdentityStore::new();

    store
        .get_or_create_fake(EntityCategory::Person, "Иван Петров", &normalizer, &faker)
        .unwrap();
    let restored = store
        .fuzzy_reverse(
            EntityCategory::Person,
            "Шагал Марк",
            &normalizer,
            token_sort_score,
            0.6,
        )
        .unwrap();

    assert_eq!(restored, Some("Иван Петров"));
}

#[test]
fn test_fuzzy_reverse_below_cutoff_misses() {
    let normalizer = normalizer();
    let faker = person_faker(&["Марк Шагал"]);
    let mut store = IdentityStore::new();

    store
        .get_or_create_fake(EntityCategory::Person, "Иван Петров", &normalizer, &faker)
        .unwrap();
    let restored = store
        .fuzzy_reverse(
            EntityCategory::Person,
            "4694 7918 6961 9038",
            &normalizer,
            token_sort_score,
            0.6,
        )
        .unwrap();

    assert_eq!(restored, None);
}

#[test]
fn test_address_fuzzy_key_matches_reordered_components() {
    let normalizer = normalizer();
    let faker = ScriptedFaker::new()
        .with_values(EntityCategory::Address, &["улица Ленина 5, квартира 3"]);
    let mut store = IdentityStore::new();

    store
        .get_or_create_fake(
            EntityCategory::Address,
            "Тверская 1, Москва",
            &normalizer,
            &faker,
        )
        .unwrap();
    // component order changed, expansion set identical
    let restored = store
        .fuzzy_reverse(
            EntityCategory::Address,
            "квартира 3, улица Ленина 5",
            &normalizer,
            token_sort_score,
            0.6,
        )
        .unwrap();

    assert_eq!(restored, Some("Тверская 1, Москва"));
}

#[test]
fn test_overlapping_expansion_set_recovered_by_scorer() {
    let normalizer = normalizer();
    let faker = ScriptedFaker::new()
        .with_values(EntityCategory::Address, &["улица Ленина 5, квартира 3"]);
    let mut store = IdentityStore::new();

    store
        .get_or_create_fake(
            EntityCategory::Address,
            "Тверская 1, Москва",
            &normalizer,
            &faker,
        )
        .unwrap();
    // one component rewritten: the expansion sets overlap but differ, so
    // the fuzzy-key index misses and the scorer has to recover the match
    let restored = store
        .fuzzy_reverse(
            EntityCategory::Address,
            "улица Ленина 5, кв 3",
            &normalizer,
            token_sort_score,
            0.6,
        )
        .unwrap();

    assert_eq!(restored, Some("Тверская 1, Москва"));
}

#[test]
fn test_reverse_lookup_skips_declension_sweep() {
    let (morphology, inflections) = CountingMorphology::new();
    let normalizer = Normalizer::new(Box::new(morphology), Box::new(SegmentAddressParser));
    let faker = person_faker(&["Марк Шагал"]);
    let mut store = IdentityStore::new();

    let fake = store
        .get_or_create_fake(EntityCategory::Person, "Иван Петров", &normalizer, &faker)
        .unwrap();
    inflections.store(0, Ordering::Relaxed);

    let restored = store
        .exact_reverse(EntityCategory::Person, &fake, &normalizer)
        .unwrap();

    assert_eq!(restored, Some("Иван Петров"));
    // one canonical-form request per token, no 12-form sweep
    assert_eq!(inflections.load(Ordering::Relaxed), 2);
}

#[test]
fn test_sentinel_never_stored() {
    let normalizer = normalizer();
    let faker = person_faker(&["Марк Шагал"]);
    let mut store = IdentityStore::new();

    let fake = store
        .get_or_create_fake(
            EntityCategory::Person,
            PASSTHROUGH_SENTINEL,
            &normalizer,
            &faker,
        )
        .unwrap();

    assert_eq!(fake, PASSTHROUGH_SENTINEL);
    assert!(store.is_empty());
}

#[test]
fn test_reset_is_total() {
    let normalizer = normalizer();
    let faker = person_faker(&["Марк Шагал"]);
    let mut store = IdentityStore::new();

    let fake = store
        .get_or_create_fake(EntityCategory::Person, "Иван Петров", &normalizer, &faker)
        .unwrap();
    store.reset();

    assert!(store.is_empty());
    let restored = store
        .exact_reverse(EntityCategory::Person, &fake, &normalizer)
        .unwrap();
    assert_eq!(restored, None);
}
