//! DPoP `jti` validation.

use std::sync::Arc;

use super::replay::ReplayDetector;
use crate::error::ServiceResult;

/// Identifiers must be longer than this many characters.
const MIN_JTI_EXCLUSIVE: usize = 12;
/// Identifiers must be shorter than this many characters.
const MAX_JTI_EXCLUSIVE: usize = 256;

/// Accepts each well-sized `jti` once per request URI.
#[derive(Clone)]
pub struct JtiValidator {
    detector: Arc<dyn ReplayDetector>,
}

impl std::fmt::Debug for JtiValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JtiValidator").finish_non_exhaustive()
    }
}

impl JtiValidator {
    #[must_use]
    pub fn new(detector: Arc<dyn ReplayDetector>) -> Self {
        Self { detector }
    }

    /// ## Summary
    /// Returns `true` if `jti` has an acceptable length and has not been used
    /// for `target_uri` inside the replay window.
    ///
    /// Length is counted in characters; bad lengths yield `false`, not an error.
    ///
    /// ## Errors
    /// Returns an error if the replay store fails.
    pub async fn validate(&self, jti: &str, target_uri: &str) -> ServiceResult<bool> {
        let length = jti.chars().count();
        if length <= MIN_JTI_EXCLUSIVE || length >= MAX_JTI_EXCLUSIVE {
            tracing::debug!(length, "Rejected jti with unacceptable length");
            return Ok(false);
        }

        Ok(!self.detector.detect(jti, target_uri).await?)
    }
}
