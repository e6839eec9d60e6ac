//! Stock fabricated-value factory
//!
//! A [`FakeValueFactory`] backed by the `fake` crate for textual categories
//! and plain digit formatting for numeric documents. Interior mutability
//! over the RNG keeps the trait object shareable by reference; seeding is
//! exposed for deterministic fixtures.

use std::sync::Mutex;

use anyhow::{anyhow, Result};
use fake::faker::address::en::{CityName, StreetName};
use fake::faker::company::en::CompanyName;
use fake::faker::creditcard::en::CreditCardNumber;
use fake::faker::internet::en::SafeEmail;
use fake::faker::lorem::en::Word;
use fake::faker::name::en::Name;
use fake::Fake;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::domain::EntityCategory;
use crate::services::FakeValueFactory;

/// Fabricated-value factory with a category-shaped output for every
/// supported category
pub struct StockFaker {
    rng: Mutex<StdRng>,
}

impl StockFaker {
    /// Create a factory seeded from entropy
    pub fn new() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Create a deterministically seeded factory
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    fn digits(rng: &mut StdRng, count: usize) -> String {
        (0..count)
            .map(|_| char::from(b'0' + rng.gen_range(0..10u8)))
            .collect()
    }
}

impl Default for StockFaker {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeValueFactory for StockFaker {
    fn generate(&self, category: EntityCategory, _true_value: &str) -> Result<String> {
        let mut rng = self
            .rng
            .lock()
            .map_err(|_| anyhow!("fabrication RNG mutex poisoned"))?;
        let rng = &mut *rng;

        let value = match category {
            EntityCategory::Person => Name().fake_with_rng::<String, _>(rng),
            EntityCategory::Organization => CompanyName().fake_with_rng::<String, _>(rng),
            EntityCategory::City => CityName().fake_with_rng::<String, _>(rng),
            EntityCategory::Address => format!(
                "{} {}",
                StreetName().fake_with_rng::<String, _>(rng),
                rng.gen_range(1..200)
            ),
            EntityCategory::Email => SafeEmail().fake_with_rng::<String, _>(rng),
            EntityCategory::Url => format!(
                "https://{}.example.com/{}",
                Word().fake_with_rng::<String, _>(rng),
                Word().fake_with_rng::<String, _>(rng)
            ),
            EntityCategory::Phone => format!(
                "+7 (9{}) {}-{}-{}",
                Self::digits(rng, 2),
                Self::digits(rng, 3),
                Self::digits(rng, 2),
                Self::digits(rng, 2)
            ),
            EntityCategory::IpAddress => format!(
                "{}.{}.{}.{}",
                rng.gen_range(1..255),
                rng.gen_range(0..255),
                rng.gen_range(0..255),
                rng.gen_range(1..255)
            ),
            EntityCategory::CreditCard => CreditCardNumber().fake_with_rng::<String, _>(rng),
            EntityCategory::AccountNumber => Self::digits(rng, 20),
            EntityCategory::Passport => {
                format!("{} {}", Self::digits(rng, 4), Self::digits(rng, 6))
            }
            EntityCategory::TaxId => Self::digits(rng, 12),
            EntityCategory::InsuranceId => format!(
                "{}-{}-{} {}",
                Self::digits(rng, 3),
                Self::digits(rng, 3),
                Self::digits(rng, 3),
                Self::digits(rng, 2)
            ),
        };
        Ok(value)
    }
}
