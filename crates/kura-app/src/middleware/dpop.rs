use std::sync::Arc;

use salvo::Depot;
use salvo::http::{Method, StatusCode};
use tracing::error;

use kura_service::auth::{DpopValidator, Identity};

use crate::depot::{depot_keys, get_pod_request_from_depot};
use crate::error::AppError;

/// ## Summary
/// Resolves the caller's identity from `Authorization: DPoP` and the `DPoP`
/// proof, and stores it in the depot under `IDENTITY`.
///
/// Requests without an `Authorization` header are public. OPTIONS requests
/// are always public so pre-flight checks never need credentials.
///
/// ## Errors
/// Answers 401 when credentials are present but invalid, and 503 when the
/// replay store is unavailable.
pub struct DpopAuthMiddleware {
    pub validator: Arc<DpopValidator>,
}

#[salvo::async_trait]
impl salvo::Handler for DpopAuthMiddleware {
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
        tracing::trace!("Authenticating request");

        if req.method() == Method::OPTIONS {
            depot.insert(depot_keys::IDENTITY, Identity::Public);
            return;
        }

        let pod_request = match get_pod_request_from_depot(depot) {
            Ok(pod_request) => pod_request,
            Err(e) => {
                error!(error = ?e, "Failed to get pod request from depot");
                res.status_code(StatusCode::INTERNAL_SERVER_ERROR);
                ctrl.skip_rest();
                return;
            }
        };

        let result = self.validator.get_web_id(pod_request).await;
        match result {
            Ok(identity) => {
                tracing::debug!(identity = %identity, "Request authenticated");
                depot.insert(depot_keys::IDENTITY, identity);
            }
            Err(service_err) => {
                let e = AppError::from(service_err);
                let status = e.status_code();
                if status == StatusCode::UNAUTHORIZED {
                    tracing::debug!(error = %e, "Rejected credentials");
                } else {
                    error!(error = ?e, "Authentication failed with error");
                }
                res.status_code(status);
                ctrl.skip_rest();
            }
        }
    }
}
