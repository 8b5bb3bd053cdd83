#![allow(clippy::unused_async)]
//! DPoP authentication integration tests.
//!
//! Requests target `/doc.ttl`, which the public may read, so any status other
//! than 200 comes from the DPoP middleware rejecting the credentials.

use chrono::Utc;
use salvo::http::StatusCode;
use serde_json::json;

use kura_test::component::auth::make_jwk_thumbprint;

use super::helpers::*;

#[test_log::test(tokio::test)]
async fn identical_proof_is_accepted_once() {
    let service = create_test_service(seeded_store());
    let client = DpopClient::new(7);
    let proof = client.sign(&json!({
        "htm": "GET",
        "htu": pod_url("/doc.ttl"),
        "iat": Utc::now().timestamp(),
        "exp": Utc::now().timestamp() + 300,
        "jti": "aaaaaaaaaaaaaaaa",
    }));

    TestRequest::get("/doc.ttl")
        .with_proof(&client, ALICE, &proof)
        .send(&service)
        .await
        .assert_status(StatusCode::OK);

    TestRequest::get("/doc.ttl")
        .with_proof(&client, ALICE, &proof)
        .send(&service)
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

#[test_log::test(tokio::test)]
async fn method_mismatch_is_rejected() {
    let service = create_test_service(seeded_store());
    let client = DpopClient::new(7);
    let proof = client.proof("POST", &pod_url("/doc.ttl"));

    TestRequest::get("/doc.ttl")
        .with_proof(&client, ALICE, &proof)
        .send(&service)
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

#[test_log::test(tokio::test)]
async fn htu_matches_without_query() {
    let service = create_test_service(seeded_store());
    let client = DpopClient::new(7);

    let proof = client.proof("GET", &pod_url("/doc.ttl"));
    TestRequest::get("/doc.ttl?format=turtle")
        .with_proof(&client, ALICE, &proof)
        .send(&service)
        .await
        .assert_status(StatusCode::OK);

    let proof = client.proof("GET", &pod_url("/doc.ttl?format=turtle"));
    TestRequest::get("/doc.ttl?format=turtle")
        .with_proof(&client, ALICE, &proof)
        .send(&service)
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

#[test_log::test(tokio::test)]
async fn proof_for_another_resource_is_rejected() {
    let service = create_test_service(seeded_store());
    let client = DpopClient::new(7);
    let proof = client.proof("GET", &pod_url("/notes.txt"));

    TestRequest::get("/doc.ttl")
        .with_proof(&client, ALICE, &proof)
        .send(&service)
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

#[test_log::test(tokio::test)]
async fn short_jti_is_rejected() {
    let service = create_test_service(seeded_store());
    let client = DpopClient::new(7);
    let proof = client.sign(&json!({
        "htm": "GET",
        "htu": pod_url("/doc.ttl"),
        "iat": Utc::now().timestamp(),
        "jti": "aaaaaaaaaaaa",
    }));

    TestRequest::get("/doc.ttl")
        .with_proof(&client, ALICE, &proof)
        .send(&service)
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

#[test_log::test(tokio::test)]
async fn expired_proof_is_rejected() {
    let service = create_test_service(seeded_store());
    let client = DpopClient::new(7);
    let proof = client.sign(&json!({
        "htm": "GET",
        "htu": pod_url("/doc.ttl"),
        "iat": Utc::now().timestamp() - 900,
        "exp": Utc::now().timestamp() - 600,
        "jti": fresh_jti(),
    }));

    TestRequest::get("/doc.ttl")
        .with_proof(&client, ALICE, &proof)
        .send(&service)
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

#[test_log::test(tokio::test)]
async fn token_bound_to_another_key_is_rejected() {
    let service = create_test_service(seeded_store());
    let holder = DpopClient::new(7);
    let thief = DpopClient::new(9);
    let proof = thief.proof("GET", &pod_url("/doc.ttl"));

    TestRequest::get("/doc.ttl")
        .header("authorization", &format!("DPoP {}", holder.access_token(ALICE)))
        .header("dpop", &proof)
        .send(&service)
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

#[test_log::test(tokio::test)]
async fn missing_proof_header_is_rejected() {
    let service = create_test_service(seeded_store());
    let client = DpopClient::new(7);

    TestRequest::get("/doc.ttl")
        .header("authorization", &format!("DPoP {}", client.access_token(ALICE)))
        .send(&service)
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

#[test_log::test(tokio::test)]
async fn duplicate_proof_headers_are_rejected() {
    let service = create_test_service(seeded_store());
    let client = DpopClient::new(7);
    let first = client.proof("GET", &pod_url("/doc.ttl"));
    let second = client.proof("GET", &pod_url("/doc.ttl"));

    TestRequest::get("/doc.ttl")
        .with_proof(&client, ALICE, &first)
        .header("dpop", &second)
        .send(&service)
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

#[test_log::test(tokio::test)]
async fn bearer_scheme_is_rejected() {
    let service = create_test_service(seeded_store());
    let client = DpopClient::new(7);

    TestRequest::get("/doc.ttl")
        .header("authorization", &format!("Bearer {}", client.access_token(ALICE)))
        .header("dpop", &client.proof("GET", &pod_url("/doc.ttl")))
        .send(&service)
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

#[test_log::test(tokio::test)]
async fn options_ignores_credentials() {
    let service = create_test_service(seeded_store());

    TestRequest::options("/doc.ttl")
        .header("authorization", "DPoP not-a-token")
        .send(&service)
        .await
        .assert_status(StatusCode::NO_CONTENT);
}

#[test]
fn thumbprints_are_deterministic_per_key() {
    let alice = DpopClient::new(7);
    let bob = DpopClient::new(9);

    assert_eq!(alice.thumbprint(), DpopClient::new(7).thumbprint());
    assert_ne!(alice.thumbprint(), bob.thumbprint());

    let mut reordered = json!({"y": alice.jwk()["y"], "x": alice.jwk()["x"]});
    reordered["crv"] = json!("P-256");
    reordered["kty"] = json!("EC");
    assert_eq!(make_jwk_thumbprint(&reordered).unwrap(), alice.thumbprint());
}
