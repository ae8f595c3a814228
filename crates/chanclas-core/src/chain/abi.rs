//! Minimal ABI encoding for the two read-only contract calls the service
//! makes: `ownerOf(uint256)` and `getTokenData(uint256)`.
//!
//! Both calls take a single `uint256` argument, so encoding is a 4-byte
//! Keccak-256 selector followed by one left-padded 32-byte word. Decoding
//! handles the fixed 5-word `getTokenData` return shape.

use sha3::{Digest, Keccak256};

use crate::chain::errors::ChainError;

/// Solidity function signature for the ownership check.
pub const OWNER_OF_SIG: &str = "ownerOf(uint256)";

/// Solidity function signature for the token data query. Returns
/// `(seed, periodId, extraMints, curveSteepness, maxRebate)`.
pub const GET_TOKEN_DATA_SIG: &str = "getTokenData(uint256)";

/// Number of 32-byte words in a `getTokenData` return value.
pub const TOKEN_DATA_WORDS: usize = 5;

/// Computes the 4-byte function selector for a Solidity signature.
#[must_use]
pub fn selector(signature: &str) -> [u8; 4] {
    let digest = Keccak256::digest(signature.as_bytes());
    [digest[0], digest[1], digest[2], digest[3]]
}

/// Encodes a single-`uint256` call as `0x`-prefixed hex calldata.
#[must_use]
pub fn encode_call(signature: &str, token_id: u64) -> String {
    let mut calldata = Vec::with_capacity(4 + 32);
    calldata.extend_from_slice(&selector(signature));
    calldata.extend_from_slice(&[0u8; 24]);
    calldata.extend_from_slice(&token_id.to_be_bytes());
    format!("0x{}", hex::encode(calldata))
}

/// Splits `0x`-prefixed hex return data into exactly `expected` 32-byte
/// words.
///
/// # Errors
///
/// Returns [`ChainError::InvalidResponse`] if the data is not valid hex or
/// has the wrong length.
pub fn decode_words(data: &str, expected: usize) -> Result<Vec<[u8; 32]>, ChainError> {
    let stripped = data.strip_prefix("0x").unwrap_or(data);
    let raw = hex::decode(stripped)
        .map_err(|e| ChainError::InvalidResponse(format!("non-hex return data: {e}")))?;

    if raw.len() != expected * 32 {
        return Err(ChainError::InvalidResponse(format!(
            "expected {} return words ({} bytes), got {} bytes",
            expected,
            expected * 32,
            raw.len()
        )));
    }

    let mut words = Vec::with_capacity(expected);
    for chunk in raw.chunks_exact(32) {
        let mut word = [0u8; 32];
        word.copy_from_slice(chunk);
        words.push(word);
    }
    Ok(words)
}

/// Interprets a 32-byte word as a `u64`, rejecting values that overflow.
///
/// # Errors
///
/// Returns [`ChainError::InvalidResponse`] if any of the upper 24 bytes is
/// nonzero.
pub fn word_to_u64(word: &[u8; 32]) -> Result<u64, ChainError> {
    if word[..24].iter().any(|b| *b != 0) {
        return Err(ChainError::InvalidResponse(
            "integer return value exceeds u64 range".to_string(),
        ));
    }
    let mut tail = [0u8; 8];
    tail.copy_from_slice(&word[24..]);
    Ok(u64::from_be_bytes(tail))
}

/// Canonicalizes a 32-byte seed word as a lowercase `0x`-prefixed hex
/// string with leading zeros stripped (`0x0` for the all-zero word).
///
/// This exact string feeds the selection seed hash, so the canonical form
/// is part of the determinism contract: any change here changes every
/// artwork generated afterwards.
#[must_use]
pub fn canonical_seed(word: &[u8; 32]) -> String {
    let full = hex::encode(word);
    let trimmed = full.trim_start_matches('0');
    if trimmed.is_empty() {
        "0x0".to_string()
    } else {
        format!("0x{trimmed}")
    }
}
