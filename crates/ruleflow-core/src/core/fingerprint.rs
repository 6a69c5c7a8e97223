// crates/ruleflow-core/src/core/fingerprint.rs
// ============================================================================
// Module: Ruleflow Input Fingerprinting
// Description: RFC 8785 JSON canonicalization and cache key derivation.
// Purpose: Provide deterministic fingerprints for result memoization.
// Dependencies: serde, serde_jcs, sha2
// ============================================================================

//! ## Overview
//! Result-cache keys embed a fingerprint of the effective input: RFC 8785
//! (JCS) canonical JSON hashed with SHA-256 and truncated to a 128-bit hex
//! prefix. Equal inputs always fingerprint equally regardless of object key
//! order at the call site.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Serialize;
use sha2::Digest;
use sha2::Sha256;
use thiserror::Error;

use crate::core::identifiers::RuleSetId;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Hex length of the truncated fingerprint digest (128 bits).
pub const FINGERPRINT_HEX_LEN: usize = 32;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised when computing canonical fingerprints.
#[derive(Debug, Error)]
pub enum FingerprintError {
    /// JSON canonicalization failed.
    #[error("failed to canonicalize json: {0}")]
    Canonicalization(String),
}

// ============================================================================
// SECTION: Fingerprinting
// ============================================================================

/// Returns canonical JSON bytes for a serializable value using RFC 8785.
///
/// # Errors
///
/// Returns [`FingerprintError::Canonicalization`] when serialization fails.
pub fn canonical_json_bytes<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>, FingerprintError> {
    serde_jcs::to_vec(value).map_err(|err| FingerprintError::Canonicalization(err.to_string()))
}

/// Computes the input fingerprint: SHA-256 over canonical JSON, hex-encoded
/// and truncated to [`FINGERPRINT_HEX_LEN`] characters.
///
/// # Errors
///
/// Returns [`FingerprintError::Canonicalization`] when serialization fails.
pub fn input_fingerprint<T: Serialize + ?Sized>(value: &T) -> Result<String, FingerprintError> {
    let bytes = canonical_json_bytes(value)?;
    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    let digest = hasher.finalize();
    let mut hex = hex_encode(&digest);
    hex.truncate(FINGERPRINT_HEX_LEN);
    Ok(hex)
}

// ============================================================================
// SECTION: Cache Keys
// ============================================================================

/// Returns the stable cache key for a hydrated rule set.
#[must_use]
pub fn rule_set_cache_key(rule_set_id: &RuleSetId) -> String {
    format!("ruleset:{rule_set_id}")
}

/// Returns the stable cache key for a memoized execution result.
#[must_use]
pub fn result_cache_key(rule_set_id: &RuleSetId, fingerprint: &str) -> String {
    format!("result:{rule_set_id}:{fingerprint}")
}

// ============================================================================
// SECTION: Hex Encoding
// ============================================================================

/// Encodes bytes as a lowercase hex string.
fn hex_encode(bytes: &[u8]) -> String {
    const HEX: &[u8; 16] = b"0123456789abcdef";
    let mut out = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        out.push(HEX[(byte >> 4) as usize] as char);
        out.push(HEX[(byte & 0x0f) as usize] as char);
    }
    out
}
