//! Short code generation.
//!
//! Codes are drawn from the operating system CSPRNG so they cannot be
//! predicted or enumerated from previously issued codes.

use rand::TryRngCore;
use rand::rngs::OsRng;

/// Characters a short code is made of.
pub const ALPHABET: &[u8; 62] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Default short code length.
pub const DEFAULT_CODE_LENGTH: usize = 6;

/// Bytes at or above this value are discarded: 248 is the largest multiple of
/// 62 that fits in a byte, so the accepted range maps evenly onto the alphabet.
const REJECTION_BOUND: u8 = 248;

/// The system random source failed.
#[derive(Debug, thiserror::Error)]
#[error("system random number generator failed: {0}")]
pub struct CodeGenerationError(String);

/// Generates a random code of exactly `length` characters from [`ALPHABET`].
///
/// Every character is uniformly distributed: random bytes are rejection
/// sampled instead of reduced with a biased modulo.
///
/// # Errors
///
/// Returns [`CodeGenerationError`] if the OS random source is unavailable.
///
/// # Examples
///
/// ```ignore
/// let code = generate_code(6)?;
/// assert_eq!(code.len(), 6);
/// assert!(code.chars().all(|c| c.is_ascii_alphanumeric()));
/// ```
pub fn generate_code(length: usize) -> Result<String, CodeGenerationError> {
    let mut code = String::with_capacity(length);
    let mut buffer = [0u8; 32];

    while code.len() < length {
        OsRng
            .try_fill_bytes(&mut buffer)
            .map_err(|e| CodeGenerationError(e.to_string()))?;

        for byte in buffer.iter().copied().filter(|b| *b < REJECTION_BOUND) {
            if code.len() == length {
                break;
            }
            code.push(char::from(ALPHABET[usize::from(byte) % ALPHABET.len()]));
        }
    }

    Ok(code)
}

/// Returns true if `code` could have been produced by [`generate_code`] with
/// the given length.
pub fn is_well_formed(code: &str, length: usize) -> bool {
    code.len() == length && code.bytes().all(|b| ALPHABET.contains(&b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::{HashMap, HashSet};

    #[test]
    fn test_generate_code_has_requested_length() {
        for length in [1, 6, 12, 32, 100] {
            let code = generate_code(length).unwrap();
            assert_eq!(code.len(), length);
        }
    }

    #[test]
    fn test_generate_code_zero_length_is_empty() {
        assert_eq!(generate_code(0).unwrap(), "");
    }

    #[test]
    fn test_generate_code_uses_only_alphabet() {
        for _ in 0..200 {
            let code = generate_code(DEFAULT_CODE_LENGTH).unwrap();
            assert!(is_well_formed(&code, DEFAULT_CODE_LENGTH), "bad code {code}");
        }
    }

    #[test]
    fn test_generate_code_produces_unique_codes() {
        let codes: HashSet<String> = (0..1000).map(|_| generate_code(12).unwrap()).collect();
        assert_eq!(codes.len(), 1000);
    }

    #[test]
    fn test_generate_code_covers_alphabet_evenly() {
        let sample = generate_code(62 * 500).unwrap();
        let mut counts: HashMap<char, usize> = HashMap::new();
        for c in sample.chars() {
            *counts.entry(c).or_default() += 1;
        }

        assert_eq!(counts.len(), ALPHABET.len());
        // Expected 500 each; a biased generator skews the first characters well past this.
        assert!(counts.values().all(|&n| (300..=700).contains(&n)));
    }

    #[test]
    fn test_is_well_formed() {
        assert!(is_well_formed("aZ09xY", 6));
        assert!(!is_well_formed("aZ09x", 6));
        assert!(!is_well_formed("aZ-9xY", 6));
    }
}
