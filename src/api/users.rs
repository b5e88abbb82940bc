//! User management endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use axum_extra::extract::WithRejection;

use crate::{
    error::{AppError, AppResult},
    models::user::{RegisterUser, UpdateUser, User},
    AppState,
};

use super::{AuthenticatedUser, CountResponse, StatusResponse};

/// Register a new reader account
#[utoipa::path(
    post,
    path = "/register",
    tag = "users",
    request_body = RegisterUser,
    responses(
        (status = 201, description = "User registered", body = StatusResponse),
        (status = 400, description = "Invalid input"),
        (status = 409, description = "Email already registered")
    )
)]
pub async fn register(
    State(state): State<AppState>,
    WithRejection(Json(request), _): WithRejection<Json<RegisterUser>, AppError>,
) -> AppResult<(StatusCode, Json<StatusResponse>)> {
    let user = state.services.users.register(request).await?;
    Ok((
        StatusCode::CREATED,
        Json(StatusResponse {
            status: "ok".to_string(),
            id: Some(user.id),
        }),
    ))
}

/// List all users
#[utoipa::path(
    get,
    path = "/users",
    tag = "users",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "All users", body = Vec<User>),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn list_users(
    State(state): State<AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
) -> AppResult<Json<Vec<User>>> {
    let users = state.services.users.list().await?;
    Ok(Json(users))
}

/// Get user by ID
#[utoipa::path(
    get,
    path = "/users/{id}",
    tag = "users",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "User ID")),
    responses(
        (status = 200, description = "User details", body = User),
        (status = 404, description = "User not found")
    )
)]
pub async fn get_user(
    State(state): State<AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<User>> {
    let user = state.services.users.get_by_id(id).await?;
    Ok(Json(user))
}

/// Update a user (own account, or any account for staff)
#[utoipa::path(
    put,
    path = "/users/{id}/put",
    tag = "users",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "User ID")),
    request_body = UpdateUser,
    responses(
        (status = 200, description = "User updated", body = StatusResponse),
        (status = 400, description = "Invalid input"),
        (status = 403, description = "Insufficient rights"),
        (status = 404, description = "User not found"),
        (status = 409, description = "Email already registered")
    )
)]
pub async fn update_user(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    WithRejection(Json(request), _): WithRejection<Json<UpdateUser>, AppError>,
) -> AppResult<Json<StatusResponse>> {
    state.services.users.update(&claims, id, request).await?;
    Ok(Json(StatusResponse::ok()))
}

/// Delete a user and their borrowings
#[utoipa::path(
    delete,
    path = "/users/{id}/delete",
    tag = "users",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "User ID")),
    responses(
        (status = 200, description = "User deleted", body = StatusResponse),
        (status = 403, description = "Insufficient rights"),
        (status = 404, description = "User not found")
    )
)]
pub async fn delete_user(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<StatusResponse>> {
    state.services.users.delete(&claims, id).await?;
    Ok(Json(StatusResponse::ok()))
}

/// Number of registered users
#[utoipa::path(
    get,
    path = "/count/users",
    tag = "users",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "User count", body = CountResponse),
        (status = 403, description = "Insufficient rights")
    )
)]
pub async fn count_users(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<CountResponse>> {
    claims.require_employee()?;

    let count = state.services.users.count().await?;
    Ok(Json(CountResponse { count }))
}

/// Registrations per calendar month (index 0 = January)
#[utoipa::path(
    get,
    path = "/users/monthly",
    tag = "users",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Twelve monthly counts", body = [i64]),
        (status = 403, description = "Insufficient rights")
    )
)]
pub async fn monthly_registrations(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<[i64; 12]>> {
    claims.require_employee()?;

    let counts = state.services.users.monthly_registrations().await?;
    Ok(Json(counts))
}
