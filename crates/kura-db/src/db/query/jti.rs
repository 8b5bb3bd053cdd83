//! Replay-detection queries over the `dpop_jti` table.
//!
//! The unique index on `(jti, uri)` is what makes first use race-safe: two
//! concurrent inserts for the same pair cannot both succeed.

use chrono::{DateTime, TimeDelta, Utc};
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};

use crate::db::connection::DbConnection;
use crate::db::schema::dpop_jti;
use crate::error::{DbError, DbResult};
use crate::model::jti::{JtiRecord, NewJtiRecord};

/// ## Summary
/// Records `(jti, uri)` unless it was already seen after `now - window`.
///
/// Returns `true` when the pair was already present inside the window (a replay)
/// and `false` when this call recorded it.
///
/// ## Side Effects
/// - Deletes a stale row for the same pair, if one exists
/// - Inserts a row for the pair when it is not a replay
///
/// ## Errors
/// Returns an error if any statement or the surrounding transaction fails.
#[tracing::instrument(skip(conn, jti), fields(uri = %uri))]
pub async fn record_unless_seen(
    conn: &mut DbConnection<'_>,
    jti: &str,
    uri: &str,
    now: DateTime<Utc>,
    window: TimeDelta,
) -> DbResult<bool> {
    let cutoff = now - window;
    let jti = jti.to_owned();
    let uri = uri.to_owned();

    let replayed = conn
        .transaction::<bool, DbError, _>(|conn| {
            async move {
                let stale = diesel::delete(
                    dpop_jti::table
                        .filter(dpop_jti::jti.eq(&jti))
                        .filter(dpop_jti::uri.eq(&uri))
                        .filter(dpop_jti::request_time.le(cutoff)),
                )
                .execute(conn)
                .await?;

                if stale > 0 {
                    tracing::trace!(stale, "Removed expired JTI record");
                }

                let record = NewJtiRecord {
                    id: uuid::Uuid::now_v7(),
                    jti: &jti,
                    uri: &uri,
                    request_time: now,
                };

                let inserted = diesel::insert_into(dpop_jti::table)
                    .values(&record)
                    .on_conflict((dpop_jti::jti, dpop_jti::uri))
                    .do_nothing()
                    .execute(conn)
                    .await?;

                Ok(inserted == 0)
            }
            .scope_boxed()
        })
        .await?;

    tracing::debug!(replayed, "JTI lookup complete");
    Ok(replayed)
}

/// ## Summary
/// Loads the record for `(jti, uri)`, if any, regardless of age.
///
/// ## Errors
/// Returns an error if the query fails.
pub async fn find_record(
    conn: &mut DbConnection<'_>,
    jti: &str,
    uri: &str,
) -> DbResult<Option<JtiRecord>> {
    let record = dpop_jti::table
        .filter(dpop_jti::jti.eq(jti))
        .filter(dpop_jti::uri.eq(uri))
        .select(JtiRecord::as_select())
        .first::<JtiRecord>(conn)
        .await
        .optional()?;

    Ok(record)
}

/// ## Summary
/// Deletes every record older than `now - window`.
///
/// ## Errors
/// Returns an error if the delete fails.
#[tracing::instrument(skip(conn))]
pub async fn purge_expired(
    conn: &mut DbConnection<'_>,
    now: DateTime<Utc>,
    window: TimeDelta,
) -> DbResult<usize> {
    let cutoff = now - window;

    let removed = diesel::delete(dpop_jti::table.filter(dpop_jti::request_time.le(cutoff)))
        .execute(conn)
        .await?;

    tracing::info!(removed, "Purged expired JTI records");
    Ok(removed)
}
