//! Web Access Control in front of Pod resources.

use std::sync::Arc;

use salvo::Depot;
use salvo::http::{HeaderMap, StatusCode};
use tracing::error;

use kura_service::auth::{Identity, PodRequest, WacEngine};
use kura_service::error::ServiceResult;
use kura_service::storage::ResourceStore;

use crate::config::get_config_from_depot;
use crate::depot::{get_identity_from_depot, get_pod_request_from_depot};
use crate::error::AppError;

/// Outcome of one WAC check, computed off the async runtime.
#[derive(Debug)]
struct Decision {
    allowed: bool,
    headers: HeaderMap,
}

fn decide<S: ResourceStore>(
    engine: &WacEngine<S>,
    request: &PodRequest,
    identity: &Identity,
    allowed_origins: &[String],
) -> ServiceResult<Decision> {
    let allowed = engine.is_allowed(request, identity, request.origin(), allowed_origins)?;
    let mut headers = HeaderMap::new();
    engine.add_wac_headers(request, &mut headers, identity)?;
    Ok(Decision { allowed, headers })
}

/// Status for a denied request: anonymous callers may retry with
/// credentials, authenticated ones may not.
#[must_use]
pub const fn deny_status(identity: &Identity) -> StatusCode {
    match identity {
        Identity::Public => StatusCode::UNAUTHORIZED,
        Identity::Agent(_) => StatusCode::FORBIDDEN,
    }
}

/// ## Summary
/// Checks the request against the governing `.acl` documents and adds the
/// `Link` and `WAC-Allow` headers to the response.
///
/// The engine reads the store synchronously, so the check runs on the
/// blocking pool.
///
/// ## Errors
/// Denied requests answer 401 (public) or 403 (agent) and stop the chain.
/// Engine failures answer with [`AppError::status_code`].
pub struct WacMiddleware<S> {
    pub engine: Arc<WacEngine<S>>,
}

#[salvo::async_trait]
impl<S: ResourceStore + 'static> salvo::Handler for WacMiddleware<S> {
    #[tracing::instrument(skip(self, req, depot, res, ctrl), fields(
        method = %req.method(),
        path = %req.uri().path()
    ))]
    async fn handle(
        &self,
        req: &mut salvo::Request,
        depot: &mut Depot,
        res: &mut salvo::Response,
        ctrl: &mut salvo::FlowCtrl,
    ) {
        let config = match get_config_from_depot(depot) {
            Ok(cfg) => cfg,
            Err(e) => {
                error!(error = ?e, "Failed to get config from depot");
                res.status_code(StatusCode::INTERNAL_SERVER_ERROR);
                ctrl.skip_rest();
                return;
            }
        };

        let pod_request = match get_pod_request_from_depot(depot) {
            Ok(pod_request) => pod_request.clone(),
            Err(e) => {
                error!(error = ?e, "Failed to get pod request from depot");
                res.status_code(StatusCode::INTERNAL_SERVER_ERROR);
                ctrl.skip_rest();
                return;
            }
        };
        let identity = get_identity_from_depot(depot);

        let engine = Arc::clone(&self.engine);
        let caller = identity.clone();
        let outcome = tokio::task::spawn_blocking(move || {
            decide(&engine, &pod_request, &caller, &config.wac.allowed_origins)
        })
        .await;

        let decision = match outcome {
            Ok(Ok(decision)) => decision,
            Ok(Err(service_err)) => {
                let e = AppError::from(service_err);
                let status = e.status_code();
                if status.is_client_error() {
                    tracing::debug!(error = %e, "Request cannot be authorized");
                } else {
                    error!(error = ?e, "Access control check failed");
                }
                res.status_code(status);
                ctrl.skip_rest();
                return;
            }
            Err(e) => {
                error!(error = %e, "Access control task failed");
                res.status_code(StatusCode::INTERNAL_SERVER_ERROR);
                ctrl.skip_rest();
                return;
            }
        };

        for (name, value) in &decision.headers {
            res.headers_mut().append(name.clone(), value.clone());
        }

        if !decision.allowed {
            let status = deny_status(&identity);
            tracing::debug!(identity = %identity, status = %status, "Access denied");
            res.status_code(status);
            ctrl.skip_rest();
        }
    }
}
