//! DPoP proof validation and WebID extraction.
//!
//! ## Proof checks
//!
//! A proof passes when, in this order:
//!
//! 1. it is a compact JWT with JSON header and claims,
//! 2. it carries `htm` and `htu`,
//! 3. its header carries `typ` and `alg`,
//! 4. `typ` is `dpop+jwt`,
//! 5. `alg` is not `none`,
//! 6. the signature verifies with the embedded `jwk`,
//! 7. `htm` names the request method,
//! 8. `htu` is the request URI without query and fragment,
//! 9. `iat`, `nbf` and `exp` hold within the configured leeway,
//! 10. `jti` has not been seen for this request URI.
//!
//! Binding to the access token through `ath` is an extra step controlled by
//! [`DpopConfig::verify_access_token_hash`].

use chrono::Utc;
use kura_core::config::DpopConfig;
use kura_core::constants::{DPOP_AUTH_SCHEME, DPOP_HEADER, DPOP_PROOF_TYPE};
use salvo::http::header::AUTHORIZATION;

use super::encoding::sha256_base64url;
use super::identity::Identity;
use super::jti::JtiValidator;
use super::jwk::{Jwk, make_jwk_thumbprint};
use super::jwt::CompactJwt;
use super::request::PodRequest;
use crate::error::{ServiceError, ServiceResult, TokenError};

/// What a successfully validated proof tells about its sender.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedProof {
    /// RFC 7638 thumbprint of the proof key.
    pub jwk_thumbprint: String,
    pub jti: String,
}

/// Validates DPoP-bound requests.
#[derive(Debug, Clone)]
pub struct DpopValidator {
    jti_validator: JtiValidator,
    settings: DpopConfig,
}

impl DpopValidator {
    #[must_use]
    pub const fn new(jti_validator: JtiValidator, settings: DpopConfig) -> Self {
        Self {
            jti_validator,
            settings,
        }
    }

    #[must_use]
    pub const fn settings(&self) -> &DpopConfig {
        &self.settings
    }

    /// ## Summary
    /// Resolves the caller of `request`.
    ///
    /// Requests without `Authorization` are public. Otherwise the header must
    /// use the `DPoP` scheme, exactly one `DPoP` proof header must be present
    /// and valid, and the access token must be bound to the proof key through
    /// `cnf.jkt`. The token's `sub` is the caller's WebID.
    ///
    /// The access token's own signature is not checked here; it is trusted
    /// through the key binding.
    ///
    /// ## Errors
    /// Returns [`ServiceError::AuthorizationHeader`] for malformed headers and
    /// [`ServiceError::InvalidToken`] for rejected proofs or tokens.
    #[tracing::instrument(skip(self, request), fields(method = %request.method(), url = %request.url()))]
    pub async fn get_web_id(&self, request: &PodRequest) -> ServiceResult<Identity> {
        let Some(authorization) = request.headers().get(AUTHORIZATION) else {
            tracing::trace!("No Authorization header, treating request as public");
            return Ok(Identity::Public);
        };

        let authorization = authorization.to_str().map_err(|_| {
            ServiceError::AuthorizationHeader("Authorization is not visible ASCII".to_string())
        })?;
        let Some((scheme, access_token)) = authorization.trim().split_once(' ') else {
            return Err(ServiceError::AuthorizationHeader(
                "expected `<scheme> <token>`".to_string(),
            ));
        };
        if !scheme.eq_ignore_ascii_case(DPOP_AUTH_SCHEME) {
            return Err(ServiceError::AuthorizationHeader(format!(
                "unsupported authorization scheme `{scheme}`"
            )));
        }
        let access_token = access_token.trim();

        let mut proofs = request.headers().get_all(DPOP_HEADER).iter();
        let proof = match (proofs.next(), proofs.next()) {
            (Some(proof), None) => proof.to_str().map_err(|_| {
                ServiceError::AuthorizationHeader("DPoP is not visible ASCII".to_string())
            })?,
            (None, _) => {
                return Err(ServiceError::AuthorizationHeader(
                    "missing DPoP header".to_string(),
                ));
            }
            (Some(_), Some(_)) => {
                return Err(ServiceError::AuthorizationHeader(
                    "more than one DPoP header".to_string(),
                ));
            }
        };

        let validated = self
            .validate_dpop(proof, request, Some(access_token))
            .await?;

        let token = CompactJwt::parse(access_token)?;
        let bound = token
            .confirmation_thumbprint()
            .ok_or(TokenError::MissingClaim("cnf.jkt"))?;
        if bound != validated.jwk_thumbprint {
            tracing::warn!("Access token is bound to a different key");
            return Err(TokenError::ThumbprintMismatch.into());
        }

        let web_id = token
            .claim_str("sub")
            .filter(|sub| !sub.trim().is_empty())
            .ok_or(TokenError::MissingClaim("sub"))?;
        tracing::debug!(web_id, "Authenticated DPoP request");
        Ok(Identity::agent(web_id))
    }

    /// ## Summary
    /// Runs the proof checks against `request`.
    ///
    /// `access_token` is only consulted when access token hash binding is
    /// enabled.
    ///
    /// ## Errors
    /// Returns [`ServiceError::InvalidToken`] naming the first failed check,
    /// or a store error if replay detection fails.
    #[tracing::instrument(skip_all, fields(url = %request.url()))]
    pub async fn validate_dpop(
        &self,
        proof: &str,
        request: &PodRequest,
        access_token: Option<&str>,
    ) -> ServiceResult<ValidatedProof> {
        let result = self
            .check_proof(proof, request, access_token, Utc::now().timestamp())
            .await;
        if let Err(error) = &result {
            tracing::warn!(%error, "Rejected DPoP proof");
        }
        result
    }

    async fn check_proof(
        &self,
        proof: &str,
        request: &PodRequest,
        access_token: Option<&str>,
        now: i64,
    ) -> ServiceResult<ValidatedProof> {
        let jwt = CompactJwt::parse(proof)?;

        let htm = jwt.claim_str("htm").ok_or(TokenError::MissingClaim("htm"))?;
        let htu = jwt.claim_str("htu").ok_or(TokenError::MissingClaim("htu"))?;

        let typ = jwt.header_str("typ").ok_or(TokenError::MissingHeader("typ"))?;
        let alg = jwt.header_str("alg").ok_or(TokenError::MissingHeader("alg"))?;

        if typ != DPOP_PROOF_TYPE {
            return Err(TokenError::InvalidType(typ.to_string()).into());
        }
        if alg.eq_ignore_ascii_case("none") {
            return Err(TokenError::AlgorithmNone.into());
        }

        let jwk = jwt
            .header()
            .get("jwk")
            .ok_or(TokenError::MissingHeader("jwk"))?;
        let jwk = Jwk::from_value(jwk)?;
        jwk.verify(alg, jwt.signing_input().as_bytes(), jwt.signature())?;

        let method = request.method().as_str();
        if !htm.eq_ignore_ascii_case(method) {
            return Err(TokenError::MethodMismatch {
                claimed: htm.to_string(),
                actual: method.to_string(),
            }
            .into());
        }

        let target_uri = request.target_uri();
        if htu != target_uri {
            return Err(TokenError::UriMismatch {
                claimed: htu.to_string(),
                actual: target_uri,
            }
            .into());
        }

        check_times(&jwt, now, self.settings.clock_skew_seconds)?;

        if self.settings.verify_access_token_hash
            && let Some(access_token) = access_token
        {
            let ath = jwt.claim_str("ath").ok_or(TokenError::MissingClaim("ath"))?;
            if ath != sha256_base64url(access_token) {
                return Err(TokenError::AccessTokenHashMismatch.into());
            }
        }

        let jti = jwt.claim_str("jti").ok_or(TokenError::MissingClaim("jti"))?;
        if !self
            .jti_validator
            .validate(jti, request.url().as_str())
            .await?
        {
            return Err(TokenError::InvalidJti.into());
        }

        Ok(ValidatedProof {
            jwk_thumbprint: jwk.thumbprint()?,
            jti: jti.to_string(),
        })
    }

    /// ## Summary
    /// Checks that an ID token is bound to the key of a DPoP proof.
    ///
    /// The proof itself is not validated again.
    ///
    /// ## Errors
    /// Returns [`ServiceError::InvalidToken`] if either token is malformed or
    /// the ID token's `cnf.jkt` does not match the proof key.
    #[tracing::instrument(skip_all, fields(url = %request.url()))]
    pub fn validate_id_token_dpop(
        &self,
        id_token: &str,
        proof: &str,
        request: &PodRequest,
    ) -> ServiceResult<()> {
        let id_token = CompactJwt::parse(id_token)?;
        let proof = CompactJwt::parse(proof)?;

        let jwk = proof
            .header()
            .get("jwk")
            .ok_or(TokenError::MissingHeader("jwk"))?;
        let thumbprint = make_jwk_thumbprint(jwk)?;

        let bound = id_token
            .confirmation_thumbprint()
            .ok_or(TokenError::MissingClaim("cnf.jkt"))?;
        if bound != thumbprint {
            tracing::warn!("ID token is bound to a different key");
            return Err(TokenError::ThumbprintMismatch.into());
        }
        Ok(())
    }
}

/// Checks `iat`, `nbf` and `exp` against `now` with `leeway` seconds of slack.
/// Absent claims are not checked.
fn check_times(jwt: &CompactJwt, now: i64, leeway: i64) -> Result<(), TokenError> {
    if let Some(iat) = jwt.numeric_date("iat")?
        && iat > now + leeway
    {
        return Err(TokenError::NotYetValid("iat"));
    }
    if let Some(nbf) = jwt.numeric_date("nbf")?
        && nbf > now + leeway
    {
        return Err(TokenError::NotYetValid("nbf"));
    }
    if let Some(exp) = jwt.numeric_date("exp")?
        && exp <= now - leeway
    {
        return Err(TokenError::Expired);
    }
    Ok(())
}
