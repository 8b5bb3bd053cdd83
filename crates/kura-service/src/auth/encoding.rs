//! Base64url and digest helpers for JOSE structures.

use base64::Engine;
use base64::alphabet;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use sha2::{Digest, Sha256};

/// Decoder that accepts base64url with or without trailing `=` padding.
const URL_SAFE_LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Encodes bytes as unpadded base64url.
#[must_use]
pub fn base64url_encode(bytes: impl AsRef<[u8]>) -> String {
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Decodes base64url, tolerating padding.
///
/// ## Errors
/// Returns an error if the input is not valid base64url.
pub fn base64url_decode(input: &str) -> Result<Vec<u8>, base64::DecodeError> {
    URL_SAFE_LENIENT.decode(input)
}

/// SHA-256 of `input`, base64url encoded. Used for JWK thumbprints and `ath`.
#[must_use]
pub fn sha256_base64url(input: impl AsRef<[u8]>) -> String {
    base64url_encode(Sha256::digest(input.as_ref()))
}
