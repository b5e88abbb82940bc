//! End-to-end API tests against a running server.
//!
//! Expects the server on localhost:8080 with `auth.admin_email` /
//! `auth.admin_password` set to the values below.

use reqwest::Client;
use serde_json::{json, Value};

const BASE_URL: &str = "http://localhost:8080/api";
const ADMIN_EMAIL: &str = "admin@shelfmark.local";
const ADMIN_PASSWORD: &str = "admin";

/// Helper to get an authenticated client
async fn get_auth_token(client: &Client) -> String {
    let response = client
        .post(format!("{}/login", BASE_URL))
        .json(&json!({
            "email": ADMIN_EMAIL,
            "password": ADMIN_PASSWORD
        }))
        .send()
        .await
        .expect("Failed to send login request");

    let body: Value = response.json().await.expect("Failed to parse login response");
    body["token"].as_str().expect("No token in response").to_string()
}

/// Create a throwaway book and return its id
async fn create_book(client: &Client, token: &str, title: &str) -> i64 {
    let response = client
        .post(format!("{}/books/post", BASE_URL))
        .bearer_auth(token)
        .json(&json!({ "title": title, "author": "Test Author", "pageCount": 120 }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 201);

    let body: Value = response.json().await.expect("Failed to parse response");
    body["id"].as_i64().expect("No book id")
}

async fn current_user_id(client: &Client, token: &str) -> i64 {
    let body: Value = client
        .get(format!("{}/me", BASE_URL))
        .bearer_auth(token)
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");
    body["id"].as_i64().expect("No user id")
}

async fn borrowings_of_user(client: &Client, token: &str, user_id: i64) -> Vec<Value> {
    client
        .get(format!("{}/borrowings/user/{}?sortField=id&sortOrder=ASC", BASE_URL, user_id))
        .bearer_auth(token)
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response")
}

async fn borrowing_count(client: &Client, token: &str) -> i64 {
    let body: Value = client
        .get(format!("{}/count/borrowings", BASE_URL))
        .bearer_auth(token)
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");
    body["count"].as_i64().expect("No count")
}

#[tokio::test]
#[ignore] // Run with: cargo test -- --ignored
async fn test_health_check() {
    let client = Client::new();

    let response = client
        .get(format!("{}/health", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
#[ignore]
async fn test_login() {
    let client = Client::new();

    let response = client
        .post(format!("{}/login", BASE_URL))
        .json(&json!({
            "email": ADMIN_EMAIL,
            "password": ADMIN_PASSWORD
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["token"].is_string());
    assert_eq!(body["token_type"], "Bearer");
    assert!(body["user"]["password"].is_null());
}

#[tokio::test]
#[ignore]
async fn test_login_invalid_credentials() {
    let client = Client::new();

    let response = client
        .post(format!("{}/login", BASE_URL))
        .json(&json!({
            "email": ADMIN_EMAIL,
            "password": "wrong"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 401);
}

#[tokio::test]
#[ignore]
async fn test_borrowing_lifecycle() {
    let client = Client::new();
    let token = get_auth_token(&client).await;
    let user_id = current_user_id(&client, &token).await;
    let book_id = create_book(&client, &token, "Lifecycle").await;

    // Create
    let response = client
        .post(format!("{}/readerdetails/{}/borrow", BASE_URL, user_id))
        .bearer_auth(&token)
        .json(&json!({
            "book_id": book_id,
            "borrowing_date": "2024-07-01",
            "realreturndate": "",
            "comments": "e2e"
        }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["message"], "Borrowing record added successfully");
    let borrowing_id = body["id"].as_i64().expect("No borrowing id");

    let created = borrowings_of_user(&client, &token, user_id)
        .await
        .into_iter()
        .find(|b| b["id"].as_i64() == Some(borrowing_id))
        .expect("Borrowing not listed");
    assert_eq!(created["status"], "pending");
    assert_eq!(created["prolongation"], "0000-00-00");
    assert_eq!(created["realreturndate"], "0000-00-00");
    assert_eq!(created["book"]["id"].as_i64(), Some(book_id));

    // Prolong; status unchanged
    let response = client
        .post(format!("{}/borrowings/{}/prolongation", BASE_URL, borrowing_id))
        .bearer_auth(&token)
        .json(&json!({ "prolongation": "2024-08-15" }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["message"], "Prolongation updated successfully");

    // Return
    let response = client
        .post(format!("{}/borrowings/{}/realreturndate", BASE_URL, borrowing_id))
        .bearer_auth(&token)
        .json(&json!({ "realreturndate": "2024-08-10" }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["message"], "Real return date updated successfully");

    let returned = borrowings_of_user(&client, &token, user_id)
        .await
        .into_iter()
        .find(|b| b["id"].as_i64() == Some(borrowing_id))
        .expect("Borrowing not listed");
    assert_eq!(returned["status"], "returned");
    assert_eq!(returned["prolongation"], "2024-08-15");
    assert_eq!(returned["realreturndate"], "2024-08-10");
}

#[tokio::test]
#[ignore]
async fn test_create_borrowing_unknown_book() {
    let client = Client::new();
    let token = get_auth_token(&client).await;
    let user_id = current_user_id(&client, &token).await;

    let response = client
        .post(format!("{}/readerdetails/{}/borrow", BASE_URL, user_id))
        .bearer_auth(&token)
        .json(&json!({
            "book_id": i32::MAX,
            "borrowing_date": "2024-07-01",
            "realreturndate": ""
        }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 404);
}

#[tokio::test]
#[ignore]
async fn test_create_borrowing_unknown_user_writes_nothing() {
    let client = Client::new();
    let token = get_auth_token(&client).await;
    let book_id = create_book(&client, &token, "Orphan").await;
    let before = borrowing_count(&client, &token).await;

    let response = client
        .post(format!("{}/readerdetails/{}/borrow", BASE_URL, i32::MAX))
        .bearer_auth(&token)
        .json(&json!({
            "book_id": book_id,
            "borrowing_date": "2024-07-01",
            "realreturndate": ""
        }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 404);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["message"], "User or Book not found");

    assert_eq!(borrowing_count(&client, &token).await, before);
}

#[tokio::test]
#[ignore]
async fn test_record_return_twice_stays_returned() {
    let client = Client::new();
    let token = get_auth_token(&client).await;
    let user_id = current_user_id(&client, &token).await;
    let book_id = create_book(&client, &token, "Returned Twice").await;

    let body: Value = client
        .post(format!("{}/readerdetails/{}/borrow", BASE_URL, user_id))
        .bearer_auth(&token)
        .json(&json!({
            "book_id": book_id,
            "borrowing_date": "2024-07-01",
            "realreturndate": ""
        }))
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");
    let borrowing_id = body["id"].as_i64().expect("No borrowing id");

    for date in ["2024-07-20", ""] {
        let response = client
            .post(format!("{}/borrowings/{}/realreturndate", BASE_URL, borrowing_id))
            .bearer_auth(&token)
            .json(&json!({ "realreturndate": date }))
            .send()
            .await
            .expect("Failed to send request");
        assert_eq!(response.status(), 200);

        let borrowing = borrowings_of_user(&client, &token, user_id)
            .await
            .into_iter()
            .find(|b| b["id"].as_i64() == Some(borrowing_id))
            .expect("Borrowing not listed");
        assert_eq!(borrowing["status"], "returned");
    }
}

#[tokio::test]
#[ignore]
async fn test_unknown_borrowing_is_not_found() {
    let client = Client::new();
    let token = get_auth_token(&client).await;

    for (action, body) in [
        ("prolongation", json!({ "prolongation": "2024-08-15" })),
        ("realreturndate", json!({ "realreturndate": "2024-08-10" })),
    ] {
        let response = client
            .post(format!("{}/borrowings/{}/{}", BASE_URL, i32::MAX, action))
            .bearer_auth(&token)
            .json(&body)
            .send()
            .await
            .expect("Failed to send request");
        assert_eq!(response.status(), 404, "{}", action);

        let body: Value = response.json().await.expect("Failed to parse response");
        assert_eq!(body["message"], "Borrowing record not found");
    }
}

#[tokio::test]
#[ignore]
async fn test_register_email_is_case_insensitive_unique() {
    let client = Client::new();
    let email = format!("reader-{}@example.org", uuid::Uuid::new_v4().simple());

    let register = |email: String| {
        client.post(format!("{}/register", BASE_URL)).json(&json!({
            "email": email,
            "password": "secret",
            "first_name": "Case",
            "last_name": "Folding"
        }))
    };

    let response = register(email.clone()).send().await.expect("Failed to send request");
    assert_eq!(response.status(), 201);

    let response = register(email.to_uppercase())
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 409);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["error"], "Duplicate");

    let response = client
        .post(format!("{}/login", BASE_URL))
        .json(&json!({ "email": email.to_uppercase(), "password": "secret" }))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());
}

#[tokio::test]
#[ignore]
async fn test_bounded_listings() {
    let client = Client::new();
    let token = get_auth_token(&client).await;

    for uri in ["filteredBorrowings/five", "borrowings/five"] {
        let body: Vec<Value> = client
            .get(format!("{}/{}", BASE_URL, uri))
            .bearer_auth(&token)
            .send()
            .await
            .expect("Failed to send request")
            .json()
            .await
            .expect("Failed to parse response");
        assert!(body.len() <= 5, "{} returned {}", uri, body.len());
        assert!(body.iter().all(|b| b["status"] == "pending"));
    }

    let monthly: Vec<i64> = client
        .get(format!("{}/borrowings/monthly", BASE_URL))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");
    assert_eq!(monthly.len(), 12);
}

#[tokio::test]
#[ignore]
async fn test_book_search() {
    let client = Client::new();
    let token = get_auth_token(&client).await;
    create_book(&client, &token, "Searchable Zanzibar").await;

    let body: Vec<Value> = client
        .get(format!("{}/booksearch?query=zanzibar", BASE_URL))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");
    assert!(body.iter().any(|b| b["title"] == "Searchable Zanzibar"));
}
