use std::sync::Arc;

use chrono::TimeDelta;
use kura_app::app::routes;
use kura_app::config::ConfigHandler;
use kura_core::config::load_config;
use kura_db::db::DbProvider;
use kura_db::db::connection::create_pool;
use kura_db::db::migrate::run_migrations;
use kura_service::auth::{DpopValidator, JtiValidator, PgReplayDetector, WacEngine};
use kura_service::storage::DirectoryStore;
use salvo::conn::TcpListener;
use salvo::{Listener, Router};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, reload, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let (filter_layer, filter_handle) = reload::Layer::new(EnvFilter::new("debug"));

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(
            fmt::layer()
                .with_target(true)
                .with_thread_ids(true)
                .with_file(true)
                .with_line_number(true),
        )
        .init();

    tracing::info!("Starting Kura Solid Pod server");

    let config = load_config()?;

    tracing::info!(config = ?config, "Configuration loaded");

    if let Ok(filter) = EnvFilter::try_new(config.logging.level.as_str()) {
        if let Err(e) = filter_handle.modify(|current| *current = filter) {
            tracing::warn!(error = %e, "Failed to update log filter from config");
        }
    } else {
        tracing::warn!(level = %config.logging.level, "Invalid log level in config, keeping debug");
    }

    run_migrations(&config.database.url).await?;
    let pool = create_pool(&config.database).await?;
    let provider: Arc<dyn DbProvider> = Arc::new(pool);

    let replay_detector = Arc::new(PgReplayDetector::new(
        provider,
        TimeDelta::seconds(config.auth.dpop.jti_window_seconds),
    ));
    let purged = replay_detector.purge_expired().await?;
    tracing::info!(purged, "Expired DPoP proof records removed");

    let validator = DpopValidator::new(
        JtiValidator::new(replay_detector),
        config.auth.dpop.clone(),
    );
    let engine = WacEngine::new(
        DirectoryStore::new(&config.wac.root_dir),
        &config.wac.base_url,
    )?;
    tracing::info!(root = %config.wac.root_dir, base_url = %config.wac.base_url, "Serving Pod");

    let bind_addr = format!("{}:{}", config.server.host, config.server.port);
    let acceptor = TcpListener::new(bind_addr.clone()).bind().await;

    let router = Router::new()
        .hoop(ConfigHandler {
            settings: config.clone(),
        })
        .push(routes(Arc::new(engine), Arc::new(validator)));

    tracing::info!("Server listening on {bind_addr}");

    salvo::Server::new(acceptor).serve(router).await;

    Ok(())
}
