//! Local shortcode to media-id decoding.
//!
//! A shortcode is the media pk written in base 64 with the URL-safe
//! alphabet. Private-share codes carry a 28-character suffix that is not part
//! of the id.

use crate::error::ApiError;

const ALPHABET: &[u8; 64] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789-_";
const PRIVATE_SUFFIX_LEN: usize = 28;

/// Decodes `code` into the numeric media id.
///
/// # Errors
///
/// Returns [`ApiError::InvalidShortcode`] for empty input, characters outside
/// the alphabet, or values that overflow `u64`.
pub fn media_pk_from_code(code: &str) -> Result<u64, ApiError> {
    let bytes = code.as_bytes();
    let digits = if bytes.len() > PRIVATE_SUFFIX_LEN {
        &bytes[..bytes.len() - PRIVATE_SUFFIX_LEN]
    } else {
        bytes
    };
    if digits.is_empty() {
        return Err(ApiError::InvalidShortcode(code.to_string()));
    }

    digits.iter().try_fold(0u64, |acc, &byte| {
        let digit = ALPHABET
            .iter()
            .position(|&c| c == byte)
            .ok_or_else(|| ApiError::InvalidShortcode(code.to_string()))?;
        acc.checked_mul(64)
            .and_then(|v| v.checked_add(digit as u64))
            .ok_or_else(|| ApiError::InvalidShortcode(code.to_string()))
    })
}
