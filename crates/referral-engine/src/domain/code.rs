//! # Referral Code Format
//!
//! The one bit-exact external surface of the engine: a fixed 3-character
//! tag followed by 6-8 characters from a 32-symbol unambiguous alphabet.
//! Input is case-insensitive and normalized to uppercase before storage or
//! comparison. Generated codes always use the minimum suffix length; the
//! wider range only applies on validation so older hand-issued codes keep
//! working.

use crate::domain::errors::ReferralError;

/// Constant tag prefixing every referral code.
pub const CODE_TAG: &str = "TAL";

/// The 32-symbol alphabet. Visually confusable characters (0/O, 1/I) are
/// excluded to minimize transcription errors when codes are read aloud.
pub const CODE_ALPHABET: &[u8; 32] = b"23456789ABCDEFGHJKLMNPQRSTUVWXYZ";

/// Minimum accepted suffix length.
pub const MIN_SUFFIX_LEN: usize = 6;

/// Maximum accepted suffix length.
pub const MAX_SUFFIX_LEN: usize = 8;

/// Suffix length of generated codes.
pub const GENERATED_SUFFIX_LEN: usize = 6;

/// Normalize raw user input: trim surrounding whitespace, uppercase.
pub fn normalize(raw: &str) -> String {
    raw.trim().to_ascii_uppercase()
}

/// Whether a byte is a member of the code alphabet.
pub fn is_alphabet_char(byte: u8) -> bool {
    CODE_ALPHABET.contains(&byte)
}

/// Validate a normalized code against the format contract.
///
/// The designated root code is exempt from this check and is compared
/// against the configured constant before validation is reached.
pub fn validate(code: &str) -> Result<(), ReferralError> {
    let invalid = || ReferralError::InvalidFormat {
        code: code.to_string(),
    };

    let suffix = code.strip_prefix(CODE_TAG).ok_or_else(invalid)?;

    if suffix.len() < MIN_SUFFIX_LEN || suffix.len() > MAX_SUFFIX_LEN {
        return Err(invalid());
    }
    if !suffix.bytes().all(is_alphabet_char) {
        return Err(invalid());
    }
    Ok(())
}

/// Assemble a full code from a generated suffix.
pub fn assemble(suffix: &str) -> String {
    debug_assert_eq!(suffix.len(), GENERATED_SUFFIX_LEN);
    format!("{}{}", CODE_TAG, suffix)
}
