//! OpenAPI documentation

use axum::Router;
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{auth, books, borrowings, health, users};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Shelfmark API",
        version = "0.3.0",
        description = "Library lending REST API: readers, books and borrowings",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html")
    ),
    servers(
        (url = "/api", description = "API")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Auth
        auth::login,
        auth::me,
        // Users
        users::register,
        users::list_users,
        users::get_user,
        users::update_user,
        users::delete_user,
        users::count_users,
        users::monthly_registrations,
        // Books
        books::list_books,
        books::get_book,
        books::search_books,
        books::create_book,
        books::update_book,
        books::delete_book,
        books::count_books,
        // Borrowings
        borrowings::list_borrowings,
        borrowings::list_book_borrowings,
        borrowings::list_user_borrowings,
        borrowings::list_user_borrowings_by_status,
        borrowings::list_actionable_overdue,
        borrowings::list_actionable_overdue_five,
        borrowings::list_pending_five,
        borrowings::monthly_borrowings,
        borrowings::count_borrowings,
        borrowings::create_borrowing,
        borrowings::set_prolongation,
        borrowings::record_return,
    ),
    components(
        schemas(
            // Auth
            auth::LoginRequest,
            crate::services::auth::LoginResponse,
            // Users
            crate::models::user::User,
            crate::models::user::Role,
            crate::models::user::RegisterUser,
            crate::models::user::UpdateUser,
            // Books
            crate::models::book::Book,
            crate::models::book::BookInput,
            // Borrowings
            crate::models::borrowing::BorrowingDetails,
            crate::models::borrowing::BorrowingStatus,
            crate::models::borrowing::CreateBorrowingRequest,
            crate::models::borrowing::ProlongationRequest,
            crate::models::borrowing::ReturnDateRequest,
            // Shared
            super::MessageResponse,
            super::CreatedResponse,
            super::StatusResponse,
            super::CountResponse,
            health::HealthResponse,
            crate::error::ErrorResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "auth", description = "Authentication endpoints"),
        (name = "users", description = "Reader and staff accounts"),
        (name = "books", description = "Book catalog"),
        (name = "borrowings", description = "Borrowing lifecycle")
    )
)]
pub struct ApiDoc;

/// Registers the `bearer_auth` scheme referenced by secured paths
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
