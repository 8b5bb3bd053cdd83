//! HTTP layer of the Kura Pod server: salvo middlewares around the
//! authorization core, and the routes the `kura` binary serves.

pub mod app;
pub mod config;
pub mod depot;
pub mod error;
pub mod middleware;
