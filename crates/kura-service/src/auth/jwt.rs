//! Compact JWS parsing.
//!
//! Only the structure is checked here. Signature verification needs the key
//! and lives in [`super::jwk`].

use serde_json::{Map, Value};

use super::encoding::base64url_decode;
use crate::error::TokenError;

/// A compact-serialized JWT split into its parts.
#[derive(Debug, Clone, PartialEq)]
pub struct CompactJwt {
    header: Map<String, Value>,
    claims: Map<String, Value>,
    signing_input: String,
    signature: Vec<u8>,
}

fn decode_object(segment: &str, part: &str) -> Result<Map<String, Value>, TokenError> {
    let bytes = base64url_decode(segment)
        .map_err(|error| TokenError::Malformed(format!("{part} is not base64url: {error}")))?;
    match serde_json::from_slice::<Value>(&bytes) {
        Ok(Value::Object(object)) => Ok(object),
        Ok(_) => Err(TokenError::Malformed(format!("{part} is not a JSON object"))),
        Err(error) => Err(TokenError::Malformed(format!("{part} is not JSON: {error}"))),
    }
}

impl CompactJwt {
    /// ## Summary
    /// Splits `token` into header, claims and signature.
    ///
    /// An empty signature segment is accepted so unsecured tokens can be read.
    ///
    /// ## Errors
    /// Returns [`TokenError::Malformed`] unless the token has exactly three
    /// base64url segments whose first two decode to JSON objects.
    pub fn parse(token: &str) -> Result<Self, TokenError> {
        let mut parts = token.trim().split('.');
        let (Some(header), Some(claims), Some(signature), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(TokenError::Malformed(
                "expected three dot-separated segments".to_string(),
            ));
        };

        let signature_bytes = base64url_decode(signature).map_err(|error| {
            TokenError::Malformed(format!("signature is not base64url: {error}"))
        })?;

        Ok(Self {
            header: decode_object(header, "header")?,
            claims: decode_object(claims, "claims")?,
            signing_input: format!("{header}.{claims}"),
            signature: signature_bytes,
        })
    }

    #[must_use]
    pub const fn header(&self) -> &Map<String, Value> {
        &self.header
    }

    #[must_use]
    pub const fn claims(&self) -> &Map<String, Value> {
        &self.claims
    }

    /// The `header.claims` text the signature covers.
    #[must_use]
    pub fn signing_input(&self) -> &str {
        &self.signing_input
    }

    #[must_use]
    pub fn signature(&self) -> &[u8] {
        &self.signature
    }

    /// A string-valued header parameter.
    #[must_use]
    pub fn header_str(&self, name: &str) -> Option<&str> {
        self.header.get(name).and_then(Value::as_str)
    }

    #[must_use]
    pub fn claim(&self, name: &str) -> Option<&Value> {
        self.claims.get(name)
    }

    /// A string-valued claim.
    #[must_use]
    pub fn claim_str(&self, name: &str) -> Option<&str> {
        self.claims.get(name).and_then(Value::as_str)
    }

    /// A NumericDate claim in whole seconds.
    ///
    /// ## Errors
    /// Returns [`TokenError::Malformed`] if the claim is present but not a number.
    #[expect(clippy::cast_possible_truncation)]
    pub fn numeric_date(&self, name: &str) -> Result<Option<i64>, TokenError> {
        match self.claims.get(name) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::Number(number)) => number
                .as_i64()
                .or_else(|| number.as_f64().map(|seconds| seconds.floor() as i64))
                .map(Some)
                .ok_or_else(|| TokenError::Malformed(format!("`{name}` is out of range"))),
            Some(_) => Err(TokenError::Malformed(format!("`{name}` is not a number"))),
        }
    }

    /// The `cnf.jkt` confirmation thumbprint, if present.
    #[must_use]
    pub fn confirmation_thumbprint(&self) -> Option<&str> {
        self.claims
            .get("cnf")
            .and_then(|cnf| cnf.get("jkt"))
            .and_then(Value::as_str)
    }
}
