//! Replay detection for DPoP proof identifiers.
//!
//! A `(jti, uri)` pair may be used once per window. Detectors record the pair
//! on first sight and report every later sighting inside the window.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, TimeDelta, Utc};
use kura_db::db::DbProvider;
use kura_db::db::query::jti as jti_query;

use crate::error::{ServiceError, ServiceResult};

/// Remembers `(jti, uri)` pairs for a validity window.
pub trait ReplayDetector: Send + Sync {
    /// Returns `true` if the pair was already seen inside the window.
    /// Otherwise records it and returns `false`.
    ///
    /// ## Errors
    /// Returns an error if the backing store fails. Callers must reject the
    /// proof in that case.
    fn detect<'a>(
        &'a self,
        jti: &'a str,
        uri: &'a str,
    ) -> Pin<Box<dyn Future<Output = ServiceResult<bool>> + Send + 'a>>;
}

/// Map size below which expired pairs are left in place.
const SWEEP_THRESHOLD: usize = 1024;

#[derive(Debug)]
struct SeenPairs {
    pairs: HashMap<(String, String), DateTime<Utc>>,
    next_sweep: usize,
}

/// Process-local detector for single-instance deployments and tests.
#[derive(Debug)]
pub struct MemoryReplayDetector {
    seen: Mutex<SeenPairs>,
    window: TimeDelta,
}

impl MemoryReplayDetector {
    #[must_use]
    pub fn new(window: TimeDelta) -> Self {
        Self {
            seen: Mutex::new(SeenPairs {
                pairs: HashMap::new(),
                next_sweep: SWEEP_THRESHOLD,
            }),
            window,
        }
    }

    /// ## Summary
    /// Checks and records the pair as of `now`.
    ///
    /// Only the pair itself is looked up. Expired pairs are swept once the map
    /// doubles in size since the last sweep.
    ///
    /// ## Errors
    /// Returns an error if the lock is poisoned.
    pub fn detect_at(&self, jti: &str, uri: &str, now: DateTime<Utc>) -> ServiceResult<bool> {
        let cutoff = now - self.window;
        let mut seen = self
            .seen
            .lock()
            .map_err(|_poisoned| ServiceError::InvariantViolation("replay cache lock poisoned"))?;

        let key = (jti.to_string(), uri.to_string());
        if seen
            .pairs
            .get(&key)
            .is_some_and(|request_time| *request_time > cutoff)
        {
            tracing::warn!(uri, "Replayed DPoP proof");
            return Ok(true);
        }
        seen.pairs.insert(key, now);

        if seen.pairs.len() >= seen.next_sweep {
            let before = seen.pairs.len();
            seen.pairs.retain(|_, request_time| *request_time > cutoff);
            seen.next_sweep = (seen.pairs.len() * 2).max(SWEEP_THRESHOLD);
            tracing::debug!(
                removed = before - seen.pairs.len(),
                kept = seen.pairs.len(),
                "Swept expired DPoP proof identifiers"
            );
        }
        Ok(false)
    }

    /// Number of pairs currently remembered, expired or not.
    #[must_use]
    pub fn len(&self) -> usize {
        self.seen.lock().map_or(0, |seen| seen.pairs.len())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ReplayDetector for MemoryReplayDetector {
    fn detect<'a>(
        &'a self,
        jti: &'a str,
        uri: &'a str,
    ) -> Pin<Box<dyn Future<Output = ServiceResult<bool>> + Send + 'a>> {
        Box::pin(async move { self.detect_at(jti, uri, Utc::now()) })
    }
}

/// Detector backed by the `dpop_jti` table, shared by every server instance.
#[derive(Clone)]
pub struct PgReplayDetector {
    provider: Arc<dyn DbProvider>,
    window: TimeDelta,
}

impl std::fmt::Debug for PgReplayDetector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PgReplayDetector")
            .field("window", &self.window)
            .finish_non_exhaustive()
    }
}

impl PgReplayDetector {
    #[must_use]
    pub fn new(provider: Arc<dyn DbProvider>, window: TimeDelta) -> Self {
        Self { provider, window }
    }

    /// ## Summary
    /// Deletes records that fell out of the window.
    ///
    /// ## Errors
    /// Returns an error if no connection is available or the delete fails.
    pub async fn purge_expired(&self) -> ServiceResult<usize> {
        let mut conn = self.provider.get_connection().await?;
        Ok(jti_query::purge_expired(&mut conn, Utc::now(), self.window).await?)
    }
}

impl ReplayDetector for PgReplayDetector {
    fn detect<'a>(
        &'a self,
        jti: &'a str,
        uri: &'a str,
    ) -> Pin<Box<dyn Future<Output = ServiceResult<bool>> + Send + 'a>> {
        Box::pin(async move {
            let mut conn = self.provider.get_connection().await?;
            let replayed =
                jti_query::record_unless_seen(&mut conn, jti, uri, Utc::now(), self.window).await?;
            if replayed {
                tracing::warn!(uri, "Replayed DPoP proof");
            }
            Ok(replayed)
        })
    }
}
