//! Shared test utilities for the domain crates
//!
//! - `TestDataBuilder`: deterministic synthetic users, names and documents
//! - `TestDatabase`: throwaway PostgreSQL container with migrations applied
//!   (feature `postgres`, needs Docker)
//!
//! ```rust,no_run
//! use test_utils::TestDataBuilder;
//!
//! let builder = TestDataBuilder::from_test_name("test_list_rules");
//! let alice = builder.user(0);
//! let bob = builder.user(1);
//! assert_ne!(alice, bob);
//! ```

use uuid::Uuid;

#[cfg(feature = "postgres")]
mod postgres;

#[cfg(feature = "postgres")]
pub use postgres::TestDatabase;

/// Builder for test data with deterministic randomization
pub struct TestDataBuilder {
    seed: u64,
}

impl TestDataBuilder {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    /// Seed from the test name so each test gets its own stable fixtures
    pub fn from_test_name(name: &str) -> Self {
        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};

        let mut hasher = DefaultHasher::new();
        name.hash(&mut hasher);
        Self::new(hasher.finish())
    }

    /// The primary synthetic user, same as `user(0)`
    pub fn user_id(&self) -> Uuid {
        self.user(0)
    }

    /// The `n`th synthetic user; distinct `n` give distinct ids
    pub fn user(&self, n: u64) -> Uuid {
        self.derived_id("user", n)
    }

    /// The `n`th synthetic repository (project) id
    pub fn repository_id(&self, n: u64) -> Uuid {
        self.derived_id("repository", n)
    }

    fn derived_id(&self, kind: &str, n: u64) -> Uuid {
        let mut bytes = [0u8; 16];
        bytes[..8].copy_from_slice(&self.seed.to_le_bytes());
        bytes[8..].copy_from_slice(&n.to_le_bytes());
        Uuid::new_v5(&Uuid::from_bytes(bytes), kind.as_bytes())
    }

    /// e.g. `test-rule-12345-main`
    pub fn name(&self, prefix: &str, suffix: &str) -> String {
        format!("test-{}-{}-{}", prefix, self.seed, suffix)
    }

    /// Deterministic text of exactly `len` chars, useful for chunking fixtures.
    ///
    /// Each position carries a distinct-looking character so overlaps can be
    /// checked by content, not just by length.
    pub fn text(&self, len: usize) -> String {
        const ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789 ";
        let offset = (self.seed % ALPHABET.len() as u64) as usize;
        (0..len)
            .map(|i| ALPHABET[(i * 7 + offset) % ALPHABET.len()] as char)
            .collect()
    }
}
