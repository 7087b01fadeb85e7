//! Short code generation and validation.
//!
//! Codes are six characters drawn uniformly from `A-Z`, `a-z` and `0-9`.
//! Randomness is injected through the [`CodeGenerator`] trait so the uniqueness
//! loop can be tested deterministically. Codes are not meant to be unguessable.

use std::sync::{LazyLock, Mutex};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use regex::Regex;

/// Number of characters in a generated short code.
pub const CODE_LENGTH: usize = 6;

const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

/// Codes shadowed by fixed routes; never handed out.
const RESERVED_CODES: &[&str] = &["health"];

static CODE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[A-Za-z0-9]{6}$").unwrap());

/// Draws a short code from the given random source.
///
/// # Examples
///
/// ```ignore
/// let mut rng = StdRng::seed_from_u64(1);
/// let code = generate_code(&mut rng);
/// assert_eq!(code.len(), 6);
/// ```
pub fn generate_code<R: Rng + ?Sized>(rng: &mut R) -> String {
    (0..CODE_LENGTH)
        .map(|_| CHARSET[rng.random_range(0..CHARSET.len())] as char)
        .collect()
}

/// Checks that `code` has the exact shape of a generated short code.
///
/// Used by the redirect handler to answer 404 without touching storage.
pub fn is_valid_code(code: &str) -> bool {
    CODE_RE.is_match(code)
}

/// Returns true for codes that collide with a fixed route.
pub fn is_reserved_code(code: &str) -> bool {
    RESERVED_CODES.contains(&code)
}

/// Source of candidate short codes.
#[cfg_attr(test, mockall::automock)]
pub trait CodeGenerator: Send + Sync {
    fn generate(&self) -> String;
}

/// [`CodeGenerator`] backed by a standard PRNG.
pub struct RandomCodeGenerator {
    rng: Mutex<StdRng>,
}

impl RandomCodeGenerator {
    /// Seeds the generator from the operating system.
    pub fn from_os_rng() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_os_rng()),
        }
    }

    /// Creates a reproducible generator.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl CodeGenerator for RandomCodeGenerator {
    fn generate(&self) -> String {
        // A poisoned lock still holds a usable RNG state.
        let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());
        generate_code(&mut *rng)
    }
}
