//! API handlers for Shelfmark REST endpoints

pub mod auth;
pub mod books;
pub mod borrowings;
pub mod health;
pub mod openapi;
pub mod users;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
    routing::{delete, get, post, put},
    Router,
};
use serde::Serialize;
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};
use utoipa::ToSchema;

use crate::{error::AppError, models::user::UserClaims, AppState};

/// Extractor for authenticated user from JWT token
pub struct AuthenticatedUser(pub UserClaims);

#[async_trait]
impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| AppError::Authentication("Missing authorization header".to_string()))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or_else(|| AppError::Authentication("Invalid authorization header format".to_string()))?;

        let claims = UserClaims::from_token(token, &state.config.auth.jwt_secret)
            .map_err(|e| AppError::Authentication(e.to_string()))?;

        Ok(AuthenticatedUser(claims))
    }
}

/// Plain acknowledgement
#[derive(Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}

/// Acknowledgement carrying the id of a created record
#[derive(Serialize, ToSchema)]
pub struct CreatedResponse {
    pub message: String,
    pub id: i32,
}

/// Status acknowledgement used by user and book mutations
#[derive(Serialize, ToSchema)]
pub struct StatusResponse {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i32>,
}

impl StatusResponse {
    pub fn ok() -> Self {
        Self { status: "ok".to_string(), id: None }
    }
}

#[derive(Serialize, ToSchema)]
pub struct CountResponse {
    pub count: i64,
}

/// Create the application router with all routes
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let uploads = ServeDir::new(&state.config.uploads.dir);

    let api = Router::new()
        // Health check
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        // Authentication
        .route("/login", post(auth::login))
        .route("/me", get(auth::me))
        .route("/register", post(users::register))
        // Users
        .route("/users", get(users::list_users))
        .route("/users/monthly", get(users::monthly_registrations))
        .route("/users/:id", get(users::get_user))
        .route("/users/:id/put", put(users::update_user))
        .route("/users/:id/delete", delete(users::delete_user))
        .route("/count/users", get(users::count_users))
        // Books
        .route("/books", get(books::list_books))
        .route("/books/post", post(books::create_book))
        .route("/books/:id", get(books::get_book))
        .route("/books/:id/put", put(books::update_book))
        .route("/books/:id/delete", delete(books::delete_book))
        .route("/booksearch", get(books::search_books))
        .route("/count/books", get(books::count_books))
        // Borrowings
        .route("/borrowings", get(borrowings::list_borrowings))
        .route("/borrowings/five", get(borrowings::list_pending_five))
        .route("/borrowings/monthly", get(borrowings::monthly_borrowings))
        .route("/borrowings/book/:id", get(borrowings::list_book_borrowings))
        .route("/borrowings/user/:id", get(borrowings::list_user_borrowings))
        .route("/borrowingsbystatus/user/:id", get(borrowings::list_user_borrowings_by_status))
        .route("/borrowings/:id/prolongation", post(borrowings::set_prolongation))
        .route("/borrowings/:id/realreturndate", post(borrowings::record_return))
        .route("/filteredBorrowings", get(borrowings::list_actionable_overdue))
        .route("/filteredBorrowings/five", get(borrowings::list_actionable_overdue_five))
        .route("/readerdetails/:id/borrow", post(borrowings::create_borrowing))
        .route("/count/borrowings", get(borrowings::count_borrowings))
        .with_state(state);

    Router::new()
        .nest("/api", api)
        .nest_service("/uploads", uploads)
        .merge(openapi::create_openapi_router())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
