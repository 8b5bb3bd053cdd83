//! Persistence for the Kura Pod server.
//!
//! Only DPoP replay-detection state lives in the database; Pod resources
//! themselves are owned by the storage adapters.

pub mod db;
pub mod error;
pub mod model;
