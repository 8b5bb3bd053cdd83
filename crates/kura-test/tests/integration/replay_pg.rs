#![allow(clippy::expect_used)]
//! PostgreSQL-backed replay detection.
//!
//! These tests need a database: set `DATABASE_URL` and run with `--ignored`.

use std::sync::Arc;

use chrono::TimeDelta;

use kura_test::component::auth::{JtiValidator, PgReplayDetector, ReplayDetector};
use kura_test::component::config::DatabaseConfig;
use kura_test::component::db::DbProvider;
use kura_test::component::db::connection::create_pool;
use kura_test::component::db::migrate::run_migrations;
use kura_test::component::db::query::jti::find_record;

const URI: &str = "https://pod.example/storage/doc.ttl";

async fn detector() -> (Arc<dyn DbProvider>, PgReplayDetector) {
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    run_migrations(&url).await.expect("migrations should apply");

    let pool = create_pool(&DatabaseConfig {
        url,
        max_connections: 4,
    })
    .await
    .expect("pool should be created");
    let provider: Arc<dyn DbProvider> = Arc::new(pool);
    let detector = PgReplayDetector::new(Arc::clone(&provider), TimeDelta::minutes(10));
    (provider, detector)
}

fn unique_jti() -> String {
    format!("pg-{}", uuid::Uuid::new_v4().simple())
}

#[test_log::test(tokio::test)]
#[ignore = "requires PostgreSQL"]
async fn second_sighting_is_a_replay() {
    let (provider, detector) = detector().await;
    let jti = unique_jti();

    assert!(!detector.detect(&jti, URI).await.unwrap());
    assert!(detector.detect(&jti, URI).await.unwrap());

    let mut conn = provider.get_connection().await.unwrap();
    let record = find_record(&mut conn, &jti, URI).await.unwrap();
    assert!(record.is_some_and(|record| record.uri == URI));
}

#[test_log::test(tokio::test)]
#[ignore = "requires PostgreSQL"]
async fn pairs_are_scoped_to_their_uri() {
    let (_, detector) = detector().await;
    let jti = unique_jti();

    assert!(!detector.detect(&jti, URI).await.unwrap());
    assert!(
        !detector
            .detect(&jti, "https://pod.example/storage/other.ttl")
            .await
            .unwrap()
    );
}

#[test_log::test(tokio::test)]
#[ignore = "requires PostgreSQL"]
async fn concurrent_first_use_admits_exactly_one() {
    let (_, detector) = detector().await;
    let detector = Arc::new(detector);
    let jti = unique_jti();

    let attempts: Vec<_> = (0..8)
        .map(|_| {
            let detector = Arc::clone(&detector);
            let jti = jti.clone();
            tokio::spawn(async move { detector.detect(&jti, URI).await.unwrap() })
        })
        .collect();
    let mut fresh = 0;
    for attempt in attempts {
        if !attempt.await.unwrap() {
            fresh += 1;
        }
    }
    assert_eq!(fresh, 1);
}

#[test_log::test(tokio::test)]
#[ignore = "requires PostgreSQL"]
async fn jti_validator_uses_the_shared_store() {
    let (_, detector) = detector().await;
    let validator = JtiValidator::new(Arc::new(detector));
    let jti = unique_jti();

    assert!(validator.validate(&jti, URI).await.unwrap());
    assert!(!validator.validate(&jti, URI).await.unwrap());
}

#[test_log::test(tokio::test)]
#[ignore = "requires PostgreSQL"]
async fn purge_keeps_recent_records() {
    let (provider, detector) = detector().await;
    let jti = unique_jti();

    assert!(!detector.detect(&jti, URI).await.unwrap());
    detector.purge_expired().await.unwrap();

    let mut conn = provider.get_connection().await.unwrap();
    assert!(find_record(&mut conn, &jti, URI).await.unwrap().is_some());
}
