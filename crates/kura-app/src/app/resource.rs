//! Read-only access to Pod documents.

use std::sync::Arc;

use salvo::Depot;
use salvo::http::header::{ALLOW, CONTENT_TYPE};
use salvo::http::{Method, StatusCode};
use tracing::error;
use tracing_unwrap::ResultExt;

use kura_service::auth::{PodRequest, WacEngine};
use kura_service::error::ServiceResult;
use kura_service::storage::ResourceStore;

use crate::depot::get_pod_request_from_depot;
use crate::error::AppError;

const ALLOWED_METHODS: &str = "GET, HEAD, OPTIONS";
const DEFAULT_MIMETYPE: &str = "application/octet-stream";

struct Document {
    bytes: Vec<u8>,
    mimetype: Option<String>,
}

fn load<S: ResourceStore>(
    engine: &WacEngine<S>,
    request: &PodRequest,
) -> ServiceResult<Option<Document>> {
    let resource = engine.resource_path(request)?;
    if resource.is_container() {
        return Ok(None);
    }

    let path = resource.to_string();
    let Some(bytes) = engine.store().read_raw(&path)? else {
        return Ok(None);
    };
    let mimetype = engine.store().mimetype(&path)?;
    Ok(Some(Document { bytes, mimetype }))
}

/// Serves `GET` and `HEAD` for documents in the store.
///
/// Containers and missing documents answer 404; writes answer 405.
pub struct ResourceHandler<S> {
    pub engine: Arc<WacEngine<S>>,
}

#[salvo::async_trait]
impl<S: ResourceStore + 'static> salvo::Handler for ResourceHandler<S> {
    #[tracing::instrument(skip_all, fields(method = %req.method(), path = %req.uri().path()))]
    async fn handle(
        &self,
        req: &mut salvo::Request,
        depot: &mut Depot,
        res: &mut salvo::Response,
        _ctrl: &mut salvo::FlowCtrl,
    ) {
        let method = req.method().clone();
        if method == Method::OPTIONS {
            res.add_header(ALLOW, ALLOWED_METHODS, true).ok_or_log();
            res.status_code(StatusCode::NO_CONTENT);
            return;
        }
        if method != Method::GET && method != Method::HEAD {
            res.add_header(ALLOW, ALLOWED_METHODS, true).ok_or_log();
            res.status_code(StatusCode::METHOD_NOT_ALLOWED);
            return;
        }

        let pod_request = match get_pod_request_from_depot(depot) {
            Ok(pod_request) => pod_request.clone(),
            Err(e) => {
                error!(error = ?e, "Failed to get pod request from depot");
                res.status_code(StatusCode::INTERNAL_SERVER_ERROR);
                return;
            }
        };

        let engine = Arc::clone(&self.engine);
        let loaded = tokio::task::spawn_blocking(move || load(&engine, &pod_request)).await;

        let document = match loaded {
            Ok(Ok(Some(document))) => document,
            Ok(Ok(None)) => {
                res.status_code(StatusCode::NOT_FOUND);
                return;
            }
            Ok(Err(service_err)) => {
                let e = AppError::from(service_err);
                error!(error = ?e, "Failed to read resource");
                res.status_code(e.status_code());
                return;
            }
            Err(e) => {
                error!(error = %e, "Resource read task failed");
                res.status_code(StatusCode::INTERNAL_SERVER_ERROR);
                return;
            }
        };

        tracing::debug!(bytes = document.bytes.len(), "Serving resource");
        let mimetype = document
            .mimetype
            .unwrap_or_else(|| DEFAULT_MIMETYPE.to_string());
        res.add_header(CONTENT_TYPE, mimetype, true).ok_or_log();
        res.status_code(StatusCode::OK);
        if method == Method::GET {
            res.write_body(document.bytes).ok_or_log();
        }
    }
}
