//! Web Access Control evaluation.
//!
//! ## Flow
//!
//! 1. The request is mapped to its required grants ([`requested_grants`]).
//! 2. Each grant is resolved against the resource or its parent container.
//! 3. The governing `.acl` is found by walking up the container tree
//!    ([`WacEngine::acl_path`]) and parsed into per-identity grant tables.
//! 4. Public grants are tried first, then the caller's, then the request
//!    origin's when the origin is not trusted.

use kura_core::constants::{ACL_FILE_NAME, ACL_SUFFIX, WAC_ALLOW_HEADER};
use salvo::http::HeaderMap;
use salvo::http::header::{HeaderName, HeaderValue, LINK};
use url::Url;

use super::acl::{AclDocument, Authorization};
use super::grant::{GrantScope, GrantTable, RequestedGrant};
use super::identity::Identity;
use super::mode::render_modes;
use super::path::ResourcePath;
use super::request::PodRequest;
use super::requested::requested_grants;
use crate::error::{ServiceError, ServiceResult};
use crate::storage::ResourceStore;

/// Decides whether identities may perform requests against one Pod.
///
/// The engine holds no per-request state; every check reads the current
/// `.acl` documents from the store.
#[derive(Debug)]
pub struct WacEngine<S> {
    store: S,
    base_url: Url,
    base_path: String,
}

impl<S: ResourceStore> WacEngine<S> {
    /// ## Summary
    /// Creates an engine for the Pod mounted at `base_url`.
    ///
    /// ## Errors
    /// Returns [`ServiceError::InvalidConfiguration`] if `base_url` is not an
    /// absolute URL.
    pub fn new(store: S, base_url: &str) -> ServiceResult<Self> {
        let base_url = Url::parse(base_url).map_err(|error| {
            ServiceError::InvalidConfiguration(format!("wac.base_url `{base_url}`: {error}"))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(ServiceError::InvalidConfiguration(format!(
                "wac.base_url `{base_url}` cannot be a base URL"
            )));
        }
        let base_path = base_url.path().trim_end_matches('/').to_string();

        Ok(Self {
            store,
            base_url,
            base_path,
        })
    }

    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Path component of the base URL, without trailing slash.
    #[must_use]
    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    /// ## Summary
    /// Resolves the request URL to a path inside the Pod.
    ///
    /// ## Errors
    /// Returns [`ServiceError::NotFound`] if the URL is not below the base URL.
    pub fn resource_path(&self, request: &PodRequest) -> ServiceResult<ResourcePath> {
        let url = request.url();
        let same_origin = url.scheme() == self.base_url.scheme()
            && url.host_str() == self.base_url.host_str()
            && url.port_or_known_default() == self.base_url.port_or_known_default();
        if !same_origin {
            return Err(ServiceError::NotFound(url.to_string()));
        }

        let path = url.path();
        let relative = match path.strip_prefix(self.base_path.as_str()) {
            Some(rest) if rest.is_empty() || rest.starts_with('/') => rest,
            _ => return Err(ServiceError::NotFound(path.to_string())),
        };
        Ok(ResourcePath::parse(relative))
    }

    /// URL path of a Pod resource, as compared against ACL targets.
    fn uri_path(&self, resource: &ResourcePath) -> String {
        format!("{}{resource}", self.base_path)
    }

    /// ## Summary
    /// Computes the grants `request` needs.
    ///
    /// ## Errors
    /// Returns an error for unsupported methods or if the store fails while
    /// checking whether the target exists.
    pub fn requested_grants(&self, request: &PodRequest) -> ServiceResult<Vec<RequestedGrant>> {
        let resource = self.resource_path(request)?;
        let method = request.method();

        let needs_existence = *method == salvo::http::Method::PUT
            || *method == salvo::http::Method::PATCH;
        let exists = needs_existence && self.store.has(&resource.to_string())?;

        requested_grants(method, &resource, exists, request.patch_operations())
    }

    /// ## Summary
    /// Finds the `.acl` document governing `resource`.
    ///
    /// Tries `<dir>/<name>.acl`, `<dir>/<name>/.acl` and `<dir>/.acl`, then
    /// `.acl` in each container above up to the root. A candidate counts
    /// only if it exists and can be read.
    ///
    /// ## Errors
    /// Returns an error if the store fails while probing a candidate.
    #[tracing::instrument(skip(self, resource), fields(resource = %resource))]
    pub fn acl_path(&self, resource: &ResourcePath) -> ServiceResult<Option<ResourcePath>> {
        Ok(self.find_acl(resource)?.map(|(path, _)| path))
    }

    fn find_acl(&self, resource: &ResourcePath) -> ServiceResult<Option<(ResourcePath, Vec<u8>)>> {
        let dir = resource.parent();
        let mut candidates = Vec::new();
        if let Some(name) = resource.name() {
            candidates.push(dir.child(&format!("{name}{ACL_SUFFIX}")));
            candidates.push(dir.child_container(name).container_acl());
        }
        candidates.push(dir.container_acl());
        candidates.extend(dir.ancestors().map(|ancestor| ancestor.container_acl()));

        for candidate in candidates {
            let path = candidate.to_string();
            if !self.store.has(&path)? {
                continue;
            }
            if let Some(bytes) = self.store.read_raw(&path)? {
                tracing::trace!(acl = %path, "Found governing ACL");
                return Ok(Some((candidate, bytes)));
            }
            tracing::trace!(acl = %path, "ACL exists but is not readable");
        }

        tracing::debug!("No ACL governs resource");
        Ok(None)
    }

    /// Parses the governing ACL of `resource`, if any.
    fn load_acl(&self, resource: &ResourcePath) -> ServiceResult<Option<AclDocument>> {
        let Some((acl, bytes)) = self.find_acl(resource)? else {
            return Ok(None);
        };

        let base_iri = format!("{}{}", self.base_url.as_str().trim_end_matches('/'), acl.parent());
        AclDocument::parse(&bytes, &base_iri, &acl.to_string()).map(Some)
    }

    /// ## Summary
    /// Grants given to everyone on `resource`.
    ///
    /// ## Errors
    /// Returns an error if the governing ACL cannot be read or parsed.
    pub fn public_grants(&self, resource: &ResourcePath) -> ServiceResult<GrantTable> {
        Ok(self
            .load_acl(resource)?
            .map(|acl| acl.grants_where(Authorization::is_public))
            .unwrap_or_default())
    }

    /// ## Summary
    /// Grants the caller holds on `resource`: public grants, plus grants to
    /// authenticated agents and to the caller's WebID when authenticated.
    ///
    /// ## Errors
    /// Returns an error if the governing ACL cannot be read or parsed.
    pub fn user_grants(
        &self,
        resource: &ResourcePath,
        identity: &Identity,
    ) -> ServiceResult<GrantTable> {
        Ok(self
            .load_acl(resource)?
            .map(|acl| user_grants_in(&acl, identity))
            .unwrap_or_default())
    }

    /// ## Summary
    /// Grants given to requests from `origin` on `resource`.
    ///
    /// ## Errors
    /// Returns an error if the governing ACL cannot be read or parsed.
    pub fn origin_grants(&self, resource: &ResourcePath, origin: &str) -> ServiceResult<GrantTable> {
        Ok(self
            .load_acl(resource)?
            .map(|acl| acl.grants_where(|a| a.is_for_origin(origin)))
            .unwrap_or_default())
    }

    /// The nearest existing container above `resource`.
    fn parent_scope(&self, resource: &ResourcePath) -> ServiceResult<ResourcePath> {
        let mut parent = resource.parent();
        while !parent.is_root() && !self.store.has(&parent.to_string())? {
            parent = parent.parent();
        }
        Ok(parent)
    }

    /// ## Summary
    /// Returns `true` if `identity` may perform `request`.
    ///
    /// `origin` is the request's `Origin` header; origins listed in
    /// `allowed_origins` skip the `acl:origin` check.
    ///
    /// ## Errors
    /// Returns an error if the method is unsupported, the request is outside
    /// the Pod, or an ACL cannot be read or parsed. Callers must deny on error.
    #[tracing::instrument(
        skip(self, request, allowed_origins),
        fields(method = %request.method(), url = %request.url(), identity = %identity)
    )]
    pub fn is_allowed(
        &self,
        request: &PodRequest,
        identity: &Identity,
        origin: Option<&str>,
        allowed_origins: &[String],
    ) -> ServiceResult<bool> {
        let resource = self.resource_path(request)?;
        let requested = self.requested_grants(request)?;
        let untrusted_origin =
            origin.filter(|origin| !allowed_origins.iter().any(|allowed| allowed == origin));

        for grant in &requested {
            let target = match grant.scope {
                GrantScope::Resource => resource.clone(),
                GrantScope::Parent => self.parent_scope(&resource)?,
            };
            let uri_path = self.uri_path(&target);
            let Some(acl) = self.load_acl(&target)? else {
                tracing::debug!(scope = %target, "Denied: no ACL");
                return Ok(false);
            };

            if acl
                .grants_where(Authorization::is_public)
                .satisfies(&grant.modes, &uri_path)
            {
                continue;
            }

            if !user_grants_in(&acl, identity).satisfies(&grant.modes, &uri_path) {
                tracing::debug!(scope = %target, modes = %render_modes(&grant.modes), "Denied: no user grant");
                return Ok(false);
            }

            if let Some(origin) = untrusted_origin {
                let origin_grants = acl.grants_where(|a| a.is_for_origin(origin));
                if !origin_grants.satisfies(&grant.modes, &uri_path) {
                    tracing::debug!(scope = %target, origin, "Denied: origin not granted");
                    return Ok(false);
                }
            }
        }

        tracing::debug!(grants = requested.len(), "Allowed");
        Ok(true)
    }

    /// ## Summary
    /// Adds `Link: <…>; rel="acl"` and `WAC-Allow` headers describing what
    /// `identity` and the public may do with the requested resource.
    ///
    /// Access control documents get no `Link` header.
    ///
    /// ## Errors
    /// Returns an error if the governing ACL cannot be read or parsed.
    #[tracing::instrument(skip(self, request, headers), fields(url = %request.url()))]
    pub fn add_wac_headers(
        &self,
        request: &PodRequest,
        headers: &mut HeaderMap,
        identity: &Identity,
    ) -> ServiceResult<()> {
        let resource = self.resource_path(request)?;
        let uri_path = self.uri_path(&resource);

        if !resource.is_acl() {
            let target = match resource.name() {
                Some(name) if !resource.is_container() => format!("{name}{ACL_SUFFIX}"),
                _ => ACL_FILE_NAME.to_string(),
            };
            headers.append(
                LINK,
                HeaderValue::from_str(&format!("<{target}>; rel=\"acl\""))?,
            );
        }

        let (user, public) = match self.load_acl(&resource)? {
            Some(acl) => (
                user_grants_in(&acl, identity).effective_modes(&uri_path),
                acl.grants_where(Authorization::is_public)
                    .effective_modes(&uri_path),
            ),
            None => Default::default(),
        };

        let wac_allow = format!(
            "user=\"{}\", public=\"{}\"",
            render_modes(&user),
            render_modes(&public)
        );
        headers.insert(
            HeaderName::from_static(WAC_ALLOW_HEADER),
            HeaderValue::from_str(&wac_allow)?,
        );
        Ok(())
    }
}

fn user_grants_in(acl: &AclDocument, identity: &Identity) -> GrantTable {
    match identity {
        Identity::Agent(web_id) if web_id.trim().is_empty() => {
            tracing::warn!("Empty WebID only receives public grants");
            acl.grants_where(Authorization::is_public)
        }
        Identity::Public => acl.grants_where(Authorization::is_public),
        Identity::Agent(web_id) => acl.grants_where(|a| {
            a.is_public() || a.is_for_authenticated() || a.is_for_agent(web_id)
        }),
    }
}
