//! Shared configuration, constants and errors for the Kura Pod server.

pub mod config;
pub mod constants;
pub mod error;
