//! Adapts salvo requests to the [`PodRequest`] view the authorization core reads.

use salvo::Depot;
use salvo::http::{Method, StatusCode};
use tracing::error;
use url::Url;

use kura_service::auth::PodRequest;

use crate::config::get_config_from_depot;
use crate::depot::depot_keys;
use crate::error::{AppError, AppResult};

/// ## Summary
/// Builds a [`PodRequest`] from `req`, resolving its path against `origin`.
///
/// Only PATCH bodies are buffered; the mapper needs them to tell inserts from
/// deletes. Everything else is authorized on method, URL and headers alone.
///
/// ## Errors
/// Returns an error if the absolute URL is invalid or the body cannot be read.
pub async fn pod_request_from(req: &mut salvo::Request, origin: &str) -> AppResult<PodRequest> {
    let path_and_query = req
        .uri()
        .path_and_query()
        .map_or("/", |path_and_query| path_and_query.as_str());
    let url = Url::parse(&format!("{origin}{path_and_query}"))
        .map_err(|e| AppError::RequestError(format!("invalid request URL: {e}")))?;

    let mut pod_request =
        PodRequest::new(req.method().clone(), url).with_headers(req.headers().clone());

    if req.method() == Method::PATCH {
        let body = req
            .payload()
            .await
            .map_err(|e| AppError::RequestError(e.to_string()))?;
        pod_request = pod_request.with_body(body.to_vec());
    }

    Ok(pod_request)
}

/// Stores the adapted request in the depot under `POD_REQUEST`.
///
/// The public origin comes from `server.serve_origin`, so the URL matches
/// what clients put in a DPoP proof's `htu` even behind a proxy.
pub struct PodRequestMiddleware;

#[salvo::async_trait]
impl salvo::Handler for PodRequestMiddleware {
    #[tracing::instrument(skip_all, fields(method = %req.method(), path = %req.uri().path()))]
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

        match pod_request_from(req, &config.server.origin()).await {
            Ok(pod_request) => {
                tracing::trace!(url = %pod_request.url(), "Adapted request");
                depot.insert(depot_keys::POD_REQUEST, pod_request);
            }
            Err(e) => {
                tracing::debug!(error = %e, "Rejecting unreadable request");
                res.status_code(e.status_code());
                ctrl.skip_rest();
            }
        }
    }
}
