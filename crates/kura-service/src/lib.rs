//! Authorization and authentication core of the Kura Pod server.
//!
//! - [`auth`]: DPoP proof validation, replay detection and Web Access Control
//! - [`storage`]: the resource store interface the access checks read `.acl` documents through

pub mod auth;
pub mod error;
pub mod storage;
