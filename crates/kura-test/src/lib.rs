//! Kura Solid Pod server - integration test support.
//!
//! This crate re-exports the workspace crates so integration tests can use
//! `kura_test::` paths.

#![allow(ambiguous_glob_reexports)]

pub mod component {
    pub use kura_core::*;
    pub use kura_service::*;

    pub mod db {
        pub use kura_db::db::*;
        pub use kura_db::error::*;
    }

    pub mod middleware {
        pub use kura_app::middleware::*;
    }

    pub mod config {
        pub use kura_app::config::{ConfigHandler, get_config_from_depot};
        pub use kura_core::config::*;
    }
}

pub mod app {
    pub use kura_app::app::*;
    pub use kura_app::depot;
    pub use kura_app::error::*;
}
