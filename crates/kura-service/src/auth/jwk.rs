//! Public JSON Web Keys: thumbprints and signature verification.

use std::collections::BTreeMap;

use p256::ecdsa::signature::Verifier as _;
use rsa::{BigUint, RsaPublicKey, pkcs1v15};
use serde::Deserialize;
use serde_json::Value;
use sha2::Sha256;

use super::encoding::{base64url_decode, sha256_base64url};
use crate::error::TokenError;

/// The members of a public JWK this crate understands.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Jwk {
    pub kty: Option<String>,
    pub n: Option<String>,
    pub e: Option<String>,
    pub crv: Option<String>,
    pub x: Option<String>,
    pub y: Option<String>,
    #[serde(default)]
    pub d: Option<String>,
}

fn member<'a>(value: Option<&'a String>, name: &str) -> Result<&'a str, TokenError> {
    value
        .map(String::as_str)
        .ok_or_else(|| TokenError::InvalidJwk(format!("missing `{name}`")))
}

fn decode_member(value: Option<&String>, name: &str) -> Result<Vec<u8>, TokenError> {
    base64url_decode(member(value, name)?)
        .map_err(|error| TokenError::InvalidJwk(format!("`{name}` is not base64url: {error}")))
}

impl Jwk {
    /// ## Summary
    /// Reads a JWK from a JSON value, such as a JWS `jwk` header.
    ///
    /// ## Errors
    /// Returns [`TokenError::InvalidJwk`] if the value is not a JSON object
    /// with string members, or carries private key material.
    pub fn from_value(value: &Value) -> Result<Self, TokenError> {
        if !value.is_object() {
            return Err(TokenError::InvalidJwk("not a JSON object".to_string()));
        }
        let jwk = Self::deserialize(value)
            .map_err(|error| TokenError::InvalidJwk(error.to_string()))?;
        if jwk.d.is_some() {
            return Err(TokenError::InvalidJwk(
                "contains private key material".to_string(),
            ));
        }
        Ok(jwk)
    }

    fn key_type(&self) -> Result<&str, TokenError> {
        member(self.kty.as_ref(), "kty")
    }

    /// ## Summary
    /// RFC 7638 thumbprint: SHA-256 over the canonical JSON of the required
    /// members, base64url encoded without padding.
    ///
    /// ## Errors
    /// Returns an error if `kty` is missing or unsupported, or a required
    /// member is missing.
    pub fn thumbprint(&self) -> Result<String, TokenError> {
        let members: BTreeMap<&str, &str> = match self.key_type()? {
            "RSA" => BTreeMap::from([
                ("e", member(self.e.as_ref(), "e")?),
                ("kty", "RSA"),
                ("n", member(self.n.as_ref(), "n")?),
            ]),
            "EC" => BTreeMap::from([
                ("crv", member(self.crv.as_ref(), "crv")?),
                ("kty", "EC"),
                ("x", member(self.x.as_ref(), "x")?),
                ("y", member(self.y.as_ref(), "y")?),
            ]),
            other => return Err(TokenError::UnsupportedKeyType(other.to_string())),
        };
        let canonical = serde_json::to_string(&members)
            .map_err(|error| TokenError::InvalidJwk(error.to_string()))?;

        Ok(sha256_base64url(canonical))
    }

    /// ## Summary
    /// Verifies a JWS signature made with this key.
    ///
    /// Supports `RS256` (RSASSA-PKCS1-v1_5 with SHA-256) and `ES256` (ECDSA
    /// P-256 with SHA-256, raw `r || s` signature).
    ///
    /// ## Errors
    /// Returns [`TokenError::UnsupportedAlgorithm`] for other algorithms,
    /// [`TokenError::InvalidJwk`] if the key does not fit the algorithm and
    /// [`TokenError::InvalidSignature`] if verification fails.
    pub fn verify(&self, alg: &str, signing_input: &[u8], signature: &[u8]) -> Result<(), TokenError> {
        match alg {
            "RS256" => self.verify_rs256(signing_input, signature),
            "ES256" => self.verify_es256(signing_input, signature),
            other => Err(TokenError::UnsupportedAlgorithm(other.to_string())),
        }
    }

    fn verify_rs256(&self, signing_input: &[u8], signature: &[u8]) -> Result<(), TokenError> {
        if self.key_type()? != "RSA" {
            return Err(TokenError::InvalidJwk("RS256 needs an RSA key".to_string()));
        }
        let n = decode_member(self.n.as_ref(), "n")?;
        let e = decode_member(self.e.as_ref(), "e")?;
        let key = RsaPublicKey::new(BigUint::from_bytes_be(&n), BigUint::from_bytes_be(&e))
            .map_err(|error| TokenError::InvalidJwk(error.to_string()))?;

        let verifying_key = pkcs1v15::VerifyingKey::<Sha256>::new(key);
        let signature =
            pkcs1v15::Signature::try_from(signature).map_err(|_| TokenError::InvalidSignature)?;
        rsa::signature::Verifier::verify(&verifying_key, signing_input, &signature)
            .map_err(|_| TokenError::InvalidSignature)
    }

    fn verify_es256(&self, signing_input: &[u8], signature: &[u8]) -> Result<(), TokenError> {
        if self.key_type()? != "EC" || self.crv.as_deref() != Some("P-256") {
            return Err(TokenError::InvalidJwk("ES256 needs a P-256 EC key".to_string()));
        }
        let x = decode_member(self.x.as_ref(), "x")?;
        let y = decode_member(self.y.as_ref(), "y")?;
        if x.len() != 32 || y.len() != 32 {
            return Err(TokenError::InvalidJwk(
                "P-256 coordinates must be 32 bytes".to_string(),
            ));
        }

        let mut encoded = Vec::with_capacity(65);
        encoded.push(0x04);
        encoded.extend_from_slice(&x);
        encoded.extend_from_slice(&y);
        let verifying_key = p256::ecdsa::VerifyingKey::from_sec1_bytes(&encoded)
            .map_err(|error| TokenError::InvalidJwk(error.to_string()))?;

        let signature = p256::ecdsa::Signature::from_slice(signature)
            .map_err(|_| TokenError::InvalidSignature)?;
        verifying_key
            .verify(signing_input, &signature)
            .map_err(|_| TokenError::InvalidSignature)
    }
}

/// ## Summary
/// Thumbprint of a JWK given as JSON.
///
/// ## Errors
/// See [`Jwk::from_value`] and [`Jwk::thumbprint`].
pub fn make_jwk_thumbprint(jwk: &Value) -> Result<String, TokenError> {
    Jwk::from_value(jwk)?.thumbprint()
}
