mod resource;

use std::sync::Arc;

use salvo::Router;

use kura_service::auth::{DpopValidator, WacEngine};
use kura_service::storage::ResourceStore;

use crate::middleware::{
    dpop::DpopAuthMiddleware, request::PodRequestMiddleware, wac::WacMiddleware,
};

pub use resource::ResourceHandler;

/// ## Summary
/// Builds the Pod router: every path is adapted, authenticated and checked
/// against WAC before the read-only resource handler runs.
///
/// Expects [`crate::config::ConfigHandler`] to be hooped above it.
#[must_use]
pub fn routes<S: ResourceStore + 'static>(
    engine: Arc<WacEngine<S>>,
    validator: Arc<DpopValidator>,
) -> Router {
    Router::new()
        .hoop(PodRequestMiddleware)
        .hoop(DpopAuthMiddleware { validator })
        .hoop(WacMiddleware {
            engine: Arc::clone(&engine),
        })
        .push(Router::with_path("{**rest}").goal(ResourceHandler { engine }))
}
