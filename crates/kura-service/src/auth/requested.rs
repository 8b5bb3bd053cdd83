//! Maps an HTTP method to the grants it requires.

use salvo::http::Method;

use super::grant::RequestedGrant;
use super::mode::AccessMode;
use super::path::ResourcePath;
use super::request::PatchOperations;
use crate::error::{ServiceError, ServiceResult};

/// ## Summary
/// Returns the grants a request needs. Every entry must be satisfied; within
/// an entry any one mode is enough.
///
/// `target_exists` only matters for `PUT` and `PATCH`. Access control
/// documents always need `Control` on themselves and nothing else.
///
/// ## Errors
/// Returns [`ServiceError::UnsupportedMethod`] for methods without a mapping.
pub fn requested_grants(
    method: &Method,
    resource: &ResourcePath,
    target_exists: bool,
    patch: PatchOperations,
) -> ServiceResult<Vec<RequestedGrant>> {
    use AccessMode::{Append, Control, Read, Write};

    if resource.is_acl() {
        return Ok(vec![RequestedGrant::resource([Control])]);
    }

    let grants = match *method {
        Method::GET | Method::HEAD => vec![RequestedGrant::resource([Read])],
        Method::DELETE => vec![
            RequestedGrant::resource([Write]),
            RequestedGrant::parent([Write]),
        ],
        Method::PUT if target_exists => vec![RequestedGrant::resource([Write])],
        Method::PUT => vec![
            RequestedGrant::resource([Write]),
            RequestedGrant::parent([Append, Write]),
        ],
        Method::POST => vec![RequestedGrant::resource([Write, Append])],
        Method::PATCH => {
            let mut grants = Vec::new();
            if patch.deletes {
                grants.push(RequestedGrant::resource([Write]));
                grants.push(RequestedGrant::resource([Read]));
            }
            if patch.inserts {
                if target_exists {
                    grants.push(RequestedGrant::resource([Append, Write]));
                } else {
                    grants.push(RequestedGrant::resource([Write]));
                }
            }
            if !target_exists {
                grants.push(RequestedGrant::parent([Append, Write]));
            }
            grants
        }
        Method::OPTIONS => Vec::new(),
        _ => return Err(ServiceError::UnsupportedMethod(method.to_string())),
    };

    Ok(grants)
}
