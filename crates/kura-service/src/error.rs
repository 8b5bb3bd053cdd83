use thiserror::Error;

use crate::storage::StoreError;

/// Service layer errors - combines all error types
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error(transparent)]
    DatabaseError(#[from] kura_db::error::DbError),

    #[error(transparent)]
    StoreError(#[from] StoreError),

    #[error("Malformed authorization header: {0}")]
    AuthorizationHeader(String),

    #[error("Invalid token: {0}")]
    InvalidToken(#[from] TokenError),

    #[error("Malformed ACL document {path}: {message}")]
    AclParse { path: String, message: String },

    #[error("Unsupported method: {0}")]
    UnsupportedMethod(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid header value: {0}")]
    InvalidHeader(#[from] salvo::http::header::InvalidHeaderValue),

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Invariant violation: {0}")]
    InvariantViolation(&'static str),
}

pub type ServiceResult<T> = std::result::Result<T, ServiceError>;

/// Reasons a DPoP proof, access token or ID token is rejected.
///
/// Every validation step has its own variant so operators can tell interop
/// failures apart from the message alone.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("token is not a well-formed JWT: {0}")]
    Malformed(String),

    #[error("required claim `{0}` is missing")]
    MissingClaim(&'static str),

    #[error("required header `{0}` is missing")]
    MissingHeader(&'static str),

    #[error("typ must be dpop+jwt, got `{0}`")]
    InvalidType(String),

    #[error("alg must not be none")]
    AlgorithmNone,

    #[error("unsupported signing algorithm `{0}`")]
    UnsupportedAlgorithm(String),

    #[error("JWK is invalid: {0}")]
    InvalidJwk(String),

    #[error("JWK has unsupported key type `{0}`")]
    UnsupportedKeyType(String),

    #[error("signature does not verify against the embedded JWK")]
    InvalidSignature,

    #[error("htm `{claimed}` does not match request method `{actual}`")]
    MethodMismatch { claimed: String, actual: String },

    #[error("htu `{claimed}` does not match request URI `{actual}`")]
    UriMismatch { claimed: String, actual: String },

    #[error("`{0}` lies in the future")]
    NotYetValid(&'static str),

    #[error("token has expired")]
    Expired,

    #[error("jti is malformed or has already been used")]
    InvalidJti,

    #[error("ath does not match the presented access token")]
    AccessTokenHashMismatch,

    #[error("confirmation thumbprint does not match the DPoP proof key")]
    ThumbprintMismatch,
}
