//! Test payload generation.
//!
//! A payload is the concatenation of the decimal renderings of
//! `seed, seed + 1, seed + 2, ...` truncated to the requested length, so it
//! only ever contains ASCII digits.

use rand::Rng;
use std::fmt::Write;

/// Seeds are drawn from `[0, SEED_RANGE)`.
pub const SEED_RANGE: u32 = 1000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestPayload {
    seed: u32,
    text: String,
}

impl TestPayload {
    /// Build the payload of exactly `len` characters for `seed`.
    pub fn generate(len: usize, seed: u32) -> Self {
        let mut text = String::with_capacity(len + 8);
        let mut offset: u64 = 0;
        while text.len() < len {
            // Writing into a String cannot fail.
            let _ = write!(text, "{}", u64::from(seed) + offset);
            offset += 1;
        }
        text.truncate(len);
        Self { seed, text }
    }

    /// Draw a fresh seed from `rng` and generate.
    pub fn random<R: Rng + ?Sized>(len: usize, rng: &mut R) -> Self {
        let seed = rng.random_range(0..SEED_RANGE);
        Self::generate(len, seed)
    }

    pub fn seed(&self) -> u32 {
        self.seed
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn into_string(self) -> String {
        self.text
    }
}

/// True when every character is an ASCII decimal digit.
///
/// The empty string passes, mirroring subset semantics.
pub fn is_decimal_digits(text: &str) -> bool {
    text.chars().all(|c| c.is_ascii_digit())
}
