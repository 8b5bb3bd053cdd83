//! Authentication and authorization for Pod requests.
//!
//! ## Module Organization
//!
//! - `acl`: `.acl` Turtle documents parsed into authorizations
//! - `dpop`: DPoP proof validation and WebID extraction
//! - `encoding`: base64url and SHA-256 helpers
//! - `grant`: per-identity grant tables and requested grants
//! - `identity`: public or authenticated caller
//! - `jti`: proof identifier length and once-only checks
//! - `jwk`: JWK thumbprints and signature verification
//! - `jwt`: compact JWS parsing
//! - `mode`: WAC access modes
//! - `path`: normalized Pod paths
//! - `replay`: replay detectors (in-memory and PostgreSQL)
//! - `request`: the request view shared by both halves
//! - `requested`: HTTP method to required grants
//! - `wac`: the Web Access Control engine

pub mod acl;
pub mod dpop;
pub mod encoding;
pub mod grant;
pub mod identity;
pub mod jti;
pub mod jwk;
pub mod jwt;
pub mod mode;
pub mod path;
pub mod replay;
pub mod request;
pub mod requested;
pub mod wac;

pub use acl::{AclDocument, Authorization};
pub use dpop::{DpopValidator, ValidatedProof};
pub use grant::{GrantScope, GrantTable, RequestedGrant};
pub use identity::Identity;
pub use jti::JtiValidator;
pub use jwk::{Jwk, make_jwk_thumbprint};
pub use mode::{AccessMode, ModeSet};
pub use path::ResourcePath;
pub use replay::{MemoryReplayDetector, PgReplayDetector, ReplayDetector};
pub use request::{PatchOperations, PodRequest};
pub use requested::requested_grants;
pub use wac::WacEngine;
