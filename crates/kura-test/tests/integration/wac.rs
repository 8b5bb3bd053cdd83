#![allow(clippy::unused_async)]
//! Web Access Control integration tests.
//!
//! Every test runs against [`seeded_store`]:
//! - `/.acl`: public `Read` on everything, Alice `Read`/`Write`/`Control`
//! - `/alice/note.ttl.acl`: Alice `Write` on the note only
//! - `/private/.acl`: Alice `Read`/`Write` on the container, no `Control`

use std::sync::Arc;

use salvo::http::{Method, StatusCode};

use kura_test::component::storage::MemoryStore;

use super::helpers::*;

// ============================================================================
// Public access
// ============================================================================

#[test_log::test(tokio::test)]
async fn public_read_is_served() {
    let service = create_test_service(seeded_store());

    TestRequest::get("/doc.ttl")
        .send(&service)
        .await
        .assert_status(StatusCode::OK)
        .assert_header("content-type", "text/turtle")
        .assert_header("link", "<doc.ttl.acl>; rel=\"acl\"")
        .assert_header("wac-allow", "user=\"read\", public=\"read\"")
        .assert_body("<#it> a <#Thing>.");
}

#[test_log::test(tokio::test)]
async fn public_read_of_the_root_container_is_allowed() {
    let service = create_test_service(seeded_store());

    // Containers have no document body to serve.
    TestRequest::get("/")
        .send(&service)
        .await
        .assert_status(StatusCode::NOT_FOUND)
        .assert_header("link", "<.acl>; rel=\"acl\"")
        .assert_header("wac-allow", "user=\"read\", public=\"read\"");
}

#[test_log::test(tokio::test)]
async fn public_delete_without_public_grant_is_unauthorized() {
    let service = create_test_service(seeded_store());

    TestRequest::delete("/alice/note.ttl")
        .send(&service)
        .await
        .assert_status(StatusCode::UNAUTHORIZED)
        .assert_header("wac-allow", "user=\"\", public=\"\"");
}

#[test_log::test(tokio::test)]
async fn public_read_of_private_data_is_unauthorized() {
    let service = create_test_service(seeded_store());

    TestRequest::get("/private/data.ttl")
        .send(&service)
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

#[test_log::test(tokio::test)]
async fn acl_documents_are_not_public() {
    let service = create_test_service(seeded_store());

    TestRequest::get("/.acl")
        .send(&service)
        .await
        .assert_status(StatusCode::UNAUTHORIZED)
        .assert_no_header("link");
}

#[test_log::test(tokio::test)]
async fn pod_without_any_acl_denies_everything() {
    let store = Arc::new(MemoryStore::new());
    store
        .put("/doc.ttl", "<#it> a <#Thing>.", "text/turtle")
        .unwrap();
    let service = create_test_service(store);

    TestRequest::get("/doc.ttl")
        .send(&service)
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

#[test_log::test(tokio::test)]
async fn options_needs_no_grant() {
    let service = create_test_service(seeded_store());

    TestRequest::options("/private/data.ttl")
        .send(&service)
        .await
        .assert_status(StatusCode::NO_CONTENT)
        .assert_header("allow", "GET, HEAD, OPTIONS");
}

#[test_log::test(tokio::test)]
async fn paths_outside_the_pod_are_not_found() {
    let service = create_test_service(seeded_store());

    TestRequest::raw(Method::GET, "/elsewhere/doc.ttl")
        .send(&service)
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[test_log::test(tokio::test)]
async fn unsupported_methods_are_rejected() {
    let service = create_test_service(seeded_store());

    TestRequest::new(Method::from_bytes(b"PROPFIND").unwrap(), "/doc.ttl")
        .send(&service)
        .await
        .assert_status(StatusCode::METHOD_NOT_ALLOWED);
}

// ============================================================================
// Authenticated access
// ============================================================================

#[test_log::test(tokio::test)]
async fn owner_sees_their_modes_in_wac_allow() {
    let service = create_test_service(seeded_store());
    let client = DpopClient::new(7);

    TestRequest::get("/doc.ttl")
        .authenticated(&client, ALICE)
        .send(&service)
        .await
        .assert_status(StatusCode::OK)
        .assert_header("wac-allow", "user=\"read write control\", public=\"read\"");
}

#[test_log::test(tokio::test)]
async fn owner_delete_passes_access_control() {
    let service = create_test_service(seeded_store());
    let client = DpopClient::new(7);

    // The resource handler is read-only, so an authorized DELETE ends at 405.
    TestRequest::delete("/alice/note.ttl")
        .authenticated(&client, ALICE)
        .send(&service)
        .await
        .assert_status(StatusCode::METHOD_NOT_ALLOWED);
}

#[test_log::test(tokio::test)]
async fn other_agents_are_forbidden() {
    let service = create_test_service(seeded_store());
    let client = DpopClient::new(9);

    TestRequest::delete("/alice/note.ttl")
        .authenticated(&client, BOB)
        .send(&service)
        .await
        .assert_status(StatusCode::FORBIDDEN);
}

#[test_log::test(tokio::test)]
async fn owner_reads_private_data_through_default_grant() {
    let service = create_test_service(seeded_store());
    let client = DpopClient::new(7);

    TestRequest::get("/private/data.ttl")
        .authenticated(&client, ALICE)
        .send(&service)
        .await
        .assert_status(StatusCode::OK)
        .assert_header("wac-allow", "user=\"read write\", public=\"\"");
}

#[test_log::test(tokio::test)]
async fn acl_needs_control_even_with_write() {
    let service = create_test_service(seeded_store());
    let client = DpopClient::new(7);

    TestRequest::get("/private/.acl")
        .authenticated(&client, ALICE)
        .send(&service)
        .await
        .assert_status(StatusCode::FORBIDDEN);
}

#[test_log::test(tokio::test)]
async fn owner_with_control_reads_acl() {
    let service = create_test_service(seeded_store());
    let client = DpopClient::new(7);

    TestRequest::get("/.acl")
        .authenticated(&client, ALICE)
        .send(&service)
        .await
        .assert_status(StatusCode::OK)
        .assert_header("content-type", "text/turtle");
}

// ============================================================================
// Origins
// ============================================================================

#[test_log::test(tokio::test)]
async fn untrusted_origin_without_origin_grant_is_denied() {
    let service = create_test_service(seeded_store());
    let client = DpopClient::new(7);

    TestRequest::get("/private/data.ttl")
        .header("origin", "https://app.example")
        .authenticated(&client, ALICE)
        .send(&service)
        .await
        .assert_status(StatusCode::FORBIDDEN);
}

#[test_log::test(tokio::test)]
async fn trusted_origin_skips_origin_check() {
    let service = create_test_service(seeded_store());
    let client = DpopClient::new(7);

    TestRequest::get("/private/data.ttl")
        .header("origin", ORIGIN)
        .authenticated(&client, ALICE)
        .send(&service)
        .await
        .assert_status(StatusCode::OK);
}

#[test_log::test(tokio::test)]
async fn public_grants_ignore_the_origin() {
    let service = create_test_service(seeded_store());

    TestRequest::get("/doc.ttl")
        .header("origin", "https://app.example")
        .send(&service)
        .await
        .assert_status(StatusCode::OK);
}
