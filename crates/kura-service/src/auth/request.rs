//! Incoming request as seen by the authorization core.

use salvo::http::header::{HeaderName, HeaderValue, ORIGIN};
use salvo::http::{HeaderMap, Method};
use url::Url;

use crate::error::ServiceResult;

/// What a PATCH body does to its target.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PatchOperations {
    pub inserts: bool,
    pub deletes: bool,
}

impl PatchOperations {
    /// Guesses the operations of a patch document from its raw text.
    ///
    /// This is a substring check for the `inserts` and `deletes` keywords of
    /// N3 and SPARQL-style patches. It can be fooled by literals containing
    /// those words, so servers that parse the patch should attach the parsed
    /// result with [`PodRequest::with_patch_operations`] instead.
    #[must_use]
    pub fn sniff(body: &[u8]) -> Self {
        Self {
            inserts: contains(body, b"inserts"),
            deletes: contains(body, b"deletes"),
        }
    }
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    haystack
        .windows(needle.len())
        .any(|window| window == needle)
}

/// Method, absolute URL, headers and body of a request to the Pod.
#[derive(Debug, Clone)]
pub struct PodRequest {
    method: Method,
    url: Url,
    headers: HeaderMap,
    body: Vec<u8>,
    patch: Option<PatchOperations>,
}

impl PodRequest {
    #[must_use]
    pub fn new(method: Method, url: Url) -> Self {
        Self {
            method,
            url,
            headers: HeaderMap::new(),
            body: Vec::new(),
            patch: None,
        }
    }

    /// Replaces the request headers.
    #[must_use]
    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    /// Appends a header value, keeping any earlier values of the same name.
    ///
    /// ## Errors
    /// Returns an error if `value` is not a valid header value.
    pub fn with_header(mut self, name: &'static str, value: &str) -> ServiceResult<Self> {
        self.headers
            .append(HeaderName::from_static(name), HeaderValue::from_str(value)?);
        Ok(self)
    }

    #[must_use]
    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    #[must_use]
    pub const fn with_patch_operations(mut self, operations: PatchOperations) -> Self {
        self.patch = Some(operations);
        self
    }

    #[must_use]
    pub const fn method(&self) -> &Method {
        &self.method
    }

    #[must_use]
    pub const fn url(&self) -> &Url {
        &self.url
    }

    #[must_use]
    pub const fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    #[must_use]
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// The absolute request URI without query and fragment, as compared
    /// against a DPoP proof's `htu`.
    #[must_use]
    pub fn target_uri(&self) -> String {
        let mut url = self.url.clone();
        url.set_query(None);
        url.set_fragment(None);
        url.to_string()
    }

    /// The `Origin` header, if present and readable.
    #[must_use]
    pub fn origin(&self) -> Option<&str> {
        self.headers
            .get(ORIGIN)
            .and_then(|value| value.to_str().ok())
    }

    /// Attached patch operations, or the ones sniffed from the body.
    #[must_use]
    pub fn patch_operations(&self) -> PatchOperations {
        self.patch
            .unwrap_or_else(|| PatchOperations::sniff(&self.body))
    }
}
