//! In-process router tests: auth gate and request validation

use axum::http::{Method, StatusCode};
use serde_json::json;

use chrono::Utc;
use shelfmark_server::models::user::{Role, UserClaims};

use crate::common::{body_json, build_test_app, get, send, token_for};

#[tokio::test]
async fn health_check_returns_ok() {
    let response = get(build_test_app(), "/api/health", None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["status"], "healthy");
    assert!(json["version"].is_string());
}

#[tokio::test]
async fn readiness_reports_unreachable_database() {
    let response = get(build_test_app(), "/api/ready", None).await;
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn openapi_document_is_served() {
    let response = get(build_test_app(), "/api-docs/openapi.json", None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert!(json["paths"]["/borrowingsbystatus/user/{id}"].is_object());
}

#[tokio::test]
async fn unknown_route_returns_404() {
    let response = get(build_test_app(), "/api/nope", None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn borrowings_require_a_token() {
    for uri in [
        "/api/borrowings",
        "/api/filteredBorrowings",
        "/api/filteredBorrowings/five",
        "/api/borrowings/five",
        "/api/borrowings/monthly",
        "/api/borrowings/user/1",
    ] {
        let response = get(build_test_app(), uri, None).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{}", uri);

        let json = body_json(response).await;
        assert_eq!(json["error"], "NotAuthorized");
    }
}

#[tokio::test]
async fn malformed_or_foreign_tokens_are_rejected() {
    let response = get(build_test_app(), "/api/borrowings", Some("not-a-jwt")).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let now = Utc::now().timestamp();
    let foreign = UserClaims {
        sub: "intruder@example.org".to_string(),
        user_id: 1,
        email: "intruder@example.org".to_string(),
        roles: vec![Role::Admin],
        exp: now + 3600,
        iat: now,
    }
    .create_token("some-other-secret")
    .unwrap();
    let response = get(build_test_app(), "/api/me", Some(&foreign)).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn invalid_sort_field_is_rejected() {
    let token = token_for(1, vec![Role::User]);
    for uri in [
        "/api/borrowings/user/1?sortField=dropTable",
        "/api/borrowingsbystatus/user/1?sortField=dropTable&sortOrder=ASC",
    ] {
        let response = get(build_test_app(), uri, Some(&token)).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{}", uri);

        let json = body_json(response).await;
        assert_eq!(json["error"], "InvalidInput");
    }
}

#[tokio::test]
async fn invalid_sort_order_is_rejected() {
    let token = token_for(1, vec![Role::User]);
    for uri in [
        "/api/borrowings/user/1?sortOrder=UP",
        "/api/borrowingsbystatus/user/1?sortField=status&sortOrder=asc",
    ] {
        let response = get(build_test_app(), uri, Some(&token)).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{}", uri);
    }
}

#[tokio::test]
async fn invalid_status_filter_is_rejected() {
    let token = token_for(1, vec![Role::User]);
    let response = get(
        build_test_app(),
        "/api/borrowingsbystatus/user/1?status=lost",
        Some(&token),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = get(build_test_app(), "/api/count/borrowings?status=lost", Some(&token)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn create_borrowing_requires_all_keys() {
    let token = token_for(1, vec![Role::Employee]);

    let response = send(
        build_test_app(),
        Method::POST,
        "/api/readerdetails/1/borrow",
        Some(&token),
        Some(json!({ "book_id": 3, "borrowing_date": "2024-07-01" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = send(
        build_test_app(),
        Method::POST,
        "/api/readerdetails/1/borrow",
        Some(&token),
        Some(json!({ "book_id": 3, "borrowing_date": "01/07/2024", "realreturndate": "" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn prolongation_and_return_require_their_key() {
    let token = token_for(1, vec![Role::Employee]);

    for (uri, body) in [
        ("/api/borrowings/4/prolongation", json!({})),
        ("/api/borrowings/4/prolongation", json!({ "prolongation": null })),
        ("/api/borrowings/4/realreturndate", json!({ "comments": "late" })),
        ("/api/borrowings/4/realreturndate", json!({ "realreturndate": "yesterday" })),
    ] {
        let response = send(build_test_app(), Method::POST, uri, Some(&token), Some(body)).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{}", uri);
    }
}

#[tokio::test]
async fn malformed_json_body_is_a_bad_request() {
    let token = token_for(1, vec![Role::Employee]);
    let response = send(
        build_test_app(),
        Method::POST,
        "/api/borrowings/4/prolongation",
        Some(&token),
        Some(json!("not an object")),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn staff_only_endpoints_forbid_readers() {
    let token = token_for(7, vec![Role::User]);

    for uri in ["/api/count/users", "/api/users/monthly", "/api/count/books"] {
        let response = get(build_test_app(), uri, Some(&token)).await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN, "{}", uri);
    }

    let response = send(
        build_test_app(),
        Method::DELETE,
        "/api/users/8/delete",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = send(
        build_test_app(),
        Method::POST,
        "/api/books/post",
        Some(&token),
        Some(json!({ "title": "Dune", "author": "Frank Herbert" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn readers_cannot_edit_other_accounts_or_roles() {
    let token = token_for(7, vec![Role::User]);

    let response = send(
        build_test_app(),
        Method::PUT,
        "/api/users/8/put",
        Some(&token),
        Some(json!({ "first_name": "Eve" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = send(
        build_test_app(),
        Method::PUT,
        "/api/users/7/put",
        Some(&token),
        Some(json!({ "roles": ["ROLE_ADMIN"] })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn registration_is_validated_before_storage() {
    let response = send(
        build_test_app(),
        Method::POST,
        "/api/register",
        None,
        Some(json!({
            "email": "not-an-email",
            "password": "pw",
            "first_name": "Ada",
            "last_name": "Lovelace"
        })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn values_wider_than_their_columns_are_bad_requests() {
    let response = send(
        build_test_app(),
        Method::POST,
        "/api/register",
        None,
        Some(json!({
            "email": "ada@example.org",
            "password": "secret",
            "first_name": "a".repeat(300),
            "last_name": "Lovelace"
        })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "InvalidInput");

    let token = token_for(1, vec![Role::Employee]);
    let response = send(
        build_test_app(),
        Method::POST,
        "/api/readerdetails/1/borrow",
        Some(&token),
        Some(json!({
            "book_id": 3,
            "borrowing_date": "2024-07-01",
            "realreturndate": "",
            "comments": "c".repeat(300)
        })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = send(
        build_test_app(),
        Method::POST,
        "/api/books/post",
        Some(&token),
        Some(json!({ "title": "t".repeat(256), "author": "Frank Herbert" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = send(
        build_test_app(),
        Method::PUT,
        "/api/users/1/put",
        Some(&token),
        Some(json!({ "phone_number": "0".repeat(65) })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn login_requires_credentials() {
    let response = send(
        build_test_app(),
        Method::POST,
        "/api/login",
        None,
        Some(json!({ "email": "admin@shelfmark.local" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
