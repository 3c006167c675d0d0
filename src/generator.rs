//! Short code generation
//!
//! Generators are pure candidate producers. Membership against the store is
//! checked by [`draw`], and the final guarantee comes from the store's atomic
//! check-and-insert, so a racing writer only costs the service a retry.

use rand::{distr::Alphanumeric, Rng};
use std::sync::atomic::{AtomicU64, Ordering};

use crate::model::ShortCode;
use crate::store::{MappingStore, Result};

/// Default number of characters in a generated code
pub const DEFAULT_CODE_LENGTH: usize = 6;

/// Allowed range for the configured code length
pub const CODE_LENGTH_RANGE: std::ops::RangeInclusive<usize> = 4..=16;

const BASE62: &[u8; 62] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";

/// Trait for producing short code candidates
///
/// Implementations must only emit non-empty codes from the URL-safe
/// alphabet. They are not required to guarantee uniqueness.
pub trait CodeGenerator: Send + Sync + 'static {
    fn candidate(&self) -> ShortCode;
}

/// Draws one candidate and returns it if the store does not hold it yet.
///
/// `Ok(None)` means the candidate was already taken and the caller should
/// spend another attempt.
pub fn draw<G, S>(generator: &G, store: &S) -> Result<Option<ShortCode>>
where
    G: CodeGenerator + ?Sized,
    S: MappingStore + ?Sized,
{
    let code = generator.candidate();
    if store.contains(&code)? {
        return Ok(None);
    }
    Ok(Some(code))
}

/// Uniform random base62 codes of a fixed length
///
/// With 6 characters the space holds about 5.7e10 codes, so collisions stay
/// rare until the store is very full.
#[derive(Debug, Clone)]
pub struct RandomGenerator {
    length: usize,
}

impl RandomGenerator {
    /// Length is clamped into [`CODE_LENGTH_RANGE`].
    pub fn new(length: usize) -> Self {
        Self {
            length: length.clamp(*CODE_LENGTH_RANGE.start(), *CODE_LENGTH_RANGE.end()),
        }
    }

    pub fn length(&self) -> usize {
        self.length
    }
}

impl Default for RandomGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_CODE_LENGTH)
    }
}

impl CodeGenerator for RandomGenerator {
    fn candidate(&self) -> ShortCode {
        let code: String = rand::rng()
            .sample_iter(&Alphanumeric)
            .take(self.length)
            .map(char::from)
            .collect();
        ShortCode::new_unchecked(code)
    }
}

/// Sequential codes from an atomic counter, base62 encoded
///
/// Codes are left-padded with `0` to the minimum length, e.g. `000000`,
/// `000001`, ... `00000z`, `000010`. Within one process no two calls return
/// the same code. Across restarts the counter should be seeded with
/// [`SequenceGenerator::with_offset`] (for instance from the store size); any
/// overlap is still caught by the store and retried.
#[derive(Debug)]
pub struct SequenceGenerator {
    counter: AtomicU64,
    min_length: usize,
}

impl SequenceGenerator {
    pub fn new(min_length: usize) -> Self {
        Self::with_offset(min_length, 0)
    }

    /// Starts the counter at `offset`.
    pub fn with_offset(min_length: usize, offset: u64) -> Self {
        Self {
            counter: AtomicU64::new(offset),
            min_length: min_length.clamp(*CODE_LENGTH_RANGE.start(), *CODE_LENGTH_RANGE.end()),
        }
    }
}

impl CodeGenerator for SequenceGenerator {
    fn candidate(&self) -> ShortCode {
        let n = self.counter.fetch_add(1, Ordering::SeqCst);
        let code = format!("{:0>width$}", encode_base62(n), width = self.min_length);
        ShortCode::new_unchecked(code)
    }
}

/// Encodes a number in base62 (`0-9A-Za-z`), most significant digit first.
pub fn encode_base62(mut n: u64) -> String {
    if n == 0 {
        return "0".to_string();
    }
    let mut digits = Vec::with_capacity(11);
    while n > 0 {
        digits.push(BASE62[(n % 62) as usize] as char);
        n /= 62;
    }
    digits.iter().rev().collect()
}
