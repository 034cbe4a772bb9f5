//! SHA-256 verification of downloaded release archives.
//!
//! The expected digest is always supplied by the caller; there is no
//! trust-on-first-use and no warning-only mode.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

/// A full 64-character SHA-256 hash.
///
/// # Format
///
/// The hash is a lowercase hexadecimal string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentHash(pub String);

impl std::fmt::Display for ContentHash {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self.0)
  }
}

#[derive(Debug, Error)]
pub enum IntegrityError {
  #[error("invalid SHA-256 checksum:\n  actual:   {actual}\n  expected: {expected}")]
  Mismatch { expected: String, actual: ContentHash },
}

/// Hash arbitrary bytes.
pub fn hash_bytes(data: &[u8]) -> ContentHash {
  let mut hasher = Sha256::new();
  hasher.update(data);
  ContentHash(hex::encode(hasher.finalize()))
}

/// Check `buffer` against `expected_hex`, ignoring case.
///
/// Returns the computed digest on success so callers can keep it alongside
/// the buffer.
pub fn verify(buffer: &[u8], expected_hex: &str) -> Result<ContentHash, IntegrityError> {
  let actual = hash_bytes(buffer);
  if !actual.0.eq_ignore_ascii_case(expected_hex.trim()) {
    return Err(IntegrityError::Mismatch {
      expected: expected_hex.to_string(),
      actual,
    });
  }
  Ok(actual)
}
