//! Depot keys and accessors for the request context the middlewares share.

use kura_service::auth::{Identity, PodRequest};

use crate::error::{AppError, AppResult};

pub mod depot_keys {
    pub const IDENTITY: &str = "__identity";
    pub const POD_REQUEST: &str = "__pod_request";
}

/// Get the caller's identity from the depot.
///
/// Requests that never passed the DPoP middleware are treated as public.
#[must_use]
pub fn get_identity_from_depot(depot: &salvo::Depot) -> Identity {
    depot
        .get::<Identity>(depot_keys::IDENTITY)
        .cloned()
        .unwrap_or_else(|_missing| {
            tracing::warn!("Depot missing identity; defaulting to public");
            Identity::Public
        })
}

/// Get the adapted request from the depot.
///
/// ## Errors
/// Returns an error if no middleware stored the request.
pub fn get_pod_request_from_depot(depot: &salvo::Depot) -> AppResult<&PodRequest> {
    depot
        .get::<PodRequest>(depot_keys::POD_REQUEST)
        .map_err(|_missing| {
            AppError::CoreError(kura_core::error::CoreError::InvariantViolation(
                "Pod request not found in depot",
            ))
        })
}
