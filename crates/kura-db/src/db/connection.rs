use diesel_async::AsyncPgConnection;
use diesel_async::pooled_connection::AsyncDieselConnectionManager;
use diesel_async::pooled_connection::bb8::{Pool, PooledConnection};
use kura_core::config::DatabaseConfig;

use crate::db::DbProvider;
use crate::error::DbResult;

pub type DbPool = Pool<AsyncPgConnection>;
pub type DbConnection<'pool> = PooledConnection<'pool, AsyncPgConnection>;

/// ## Summary
/// Creates the connection pool backing the replay-detection store.
///
/// ## Errors
/// Returns an error if the pool cannot be created with the configured database URL.
#[tracing::instrument(skip(config), fields(pool_size = config.max_connections))]
pub async fn create_pool(config: &DatabaseConfig) -> anyhow::Result<DbPool> {
    tracing::debug!("Creating database connection pool");

    let size = u32::from(config.max_connections);
    let manager = AsyncDieselConnectionManager::<AsyncPgConnection>::new(&config.url);

    let pool = Pool::builder()
        .max_size(size)
        .min_idle(Some(1))
        .test_on_check_out(false)
        .build(manager)
        .await?;

    tracing::info!(pool_size = size, "Database connection pool created");

    Ok(pool)
}

impl DbProvider for DbPool {
    #[tracing::instrument(skip(self))]
    fn get_connection<'a>(
        &'a self,
    ) -> std::pin::Pin<Box<dyn std::future::Future<Output = DbResult<DbConnection<'a>>> + Send + 'a>>
    {
        Box::pin(async move {
            let conn = self.get().await?;
            Ok(conn)
        })
    }
}
