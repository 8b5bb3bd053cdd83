//! Salvo middlewares that put the authorization core in front of a Pod.
//!
//! Hoop them in this order: [`request::PodRequestMiddleware`],
//! [`dpop::DpopAuthMiddleware`], [`wac::WacMiddleware`].

pub mod dpop;
pub mod request;
pub mod wac;
