//! Borrowing lifecycle endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use axum_extra::extract::WithRejection;

use crate::{
    error::{AppError, AppResult},
    models::borrowing::{
        BorrowingDetails, BorrowingsQuery, CreateBorrowing, CreateBorrowingRequest, ProlongationRequest,
        ReturnDateRequest,
    },
    AppState,
};

use super::{AuthenticatedUser, CountResponse, CreatedResponse, MessageResponse};

/// List every borrowing
#[utoipa::path(
    get,
    path = "/borrowings",
    tag = "borrowings",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "All borrowings", body = Vec<BorrowingDetails>),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn list_borrowings(
    State(state): State<AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
) -> AppResult<Json<Vec<BorrowingDetails>>> {
    let borrowings = state.services.borrowings.list_all().await?;
    Ok(Json(borrowings))
}

/// List the borrowings of a book
#[utoipa::path(
    get,
    path = "/borrowings/book/{id}",
    tag = "borrowings",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Book ID")),
    responses(
        (status = 200, description = "Borrowings of the book", body = Vec<BorrowingDetails>),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn list_book_borrowings(
    State(state): State<AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Path(book_id): Path<i32>,
) -> AppResult<Json<Vec<BorrowingDetails>>> {
    let borrowings = state.services.borrowings.list_by_book(book_id).await?;
    Ok(Json(borrowings))
}

/// List the borrowings of a user, sorted
#[utoipa::path(
    get,
    path = "/borrowings/user/{id}",
    tag = "borrowings",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "User ID"), BorrowingsQuery),
    responses(
        (status = 200, description = "Borrowings of the user", body = Vec<BorrowingDetails>),
        (status = 400, description = "Invalid sort parameters"),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn list_user_borrowings(
    State(state): State<AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Path(user_id): Path<i32>,
    WithRejection(Query(query), _): WithRejection<Query<BorrowingsQuery>, AppError>,
) -> AppResult<Json<Vec<BorrowingDetails>>> {
    let sort = query.sort()?;

    let borrowings = state
        .services
        .borrowings
        .list_by_user(user_id, None, sort)
        .await?;
    Ok(Json(borrowings))
}

/// List the borrowings of a user, filtered by status and sorted
#[utoipa::path(
    get,
    path = "/borrowingsbystatus/user/{id}",
    tag = "borrowings",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "User ID"), BorrowingsQuery),
    responses(
        (status = 200, description = "Matching borrowings of the user", body = Vec<BorrowingDetails>),
        (status = 400, description = "Invalid sort parameters or status"),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn list_user_borrowings_by_status(
    State(state): State<AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Path(user_id): Path<i32>,
    WithRejection(Query(query), _): WithRejection<Query<BorrowingsQuery>, AppError>,
) -> AppResult<Json<Vec<BorrowingDetails>>> {
    let sort = query.sort()?;
    let status = query.status_filter()?;

    let borrowings = state
        .services
        .borrowings
        .list_by_user(user_id, status, sort)
        .await?;
    Ok(Json(borrowings))
}

/// Pending borrowings past the overdue window with no running prolongation
#[utoipa::path(
    get,
    path = "/filteredBorrowings",
    tag = "borrowings",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Actionable overdue borrowings", body = Vec<BorrowingDetails>),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn list_actionable_overdue(
    State(state): State<AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
) -> AppResult<Json<Vec<BorrowingDetails>>> {
    let borrowings = state.services.borrowings.actionable_overdue().await?;
    Ok(Json(borrowings))
}

/// The first five actionable overdue borrowings in id order
#[utoipa::path(
    get,
    path = "/filteredBorrowings/five",
    tag = "borrowings",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "At most five actionable overdue borrowings", body = Vec<BorrowingDetails>),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn list_actionable_overdue_five(
    State(state): State<AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
) -> AppResult<Json<Vec<BorrowingDetails>>> {
    let borrowings = state.services.borrowings.actionable_overdue_bounded().await?;
    Ok(Json(borrowings))
}

/// The first five pending borrowings in id order
#[utoipa::path(
    get,
    path = "/borrowings/five",
    tag = "borrowings",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "At most five pending borrowings", body = Vec<BorrowingDetails>),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn list_pending_five(
    State(state): State<AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
) -> AppResult<Json<Vec<BorrowingDetails>>> {
    let borrowings = state.services.borrowings.pending_bounded().await?;
    Ok(Json(borrowings))
}

/// Borrowings per calendar month (index 0 = January)
#[utoipa::path(
    get,
    path = "/borrowings/monthly",
    tag = "borrowings",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Twelve monthly counts", body = [i64]),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn monthly_borrowings(
    State(state): State<AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
) -> AppResult<Json<[i64; 12]>> {
    let counts = state.services.borrowings.monthly_borrowings().await?;
    Ok(Json(counts))
}

/// Number of borrowings, optionally restricted to one status
#[utoipa::path(
    get,
    path = "/count/borrowings",
    tag = "borrowings",
    security(("bearer_auth" = [])),
    params(BorrowingsQuery),
    responses(
        (status = 200, description = "Borrowing count", body = CountResponse),
        (status = 400, description = "Invalid status"),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn count_borrowings(
    State(state): State<AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    WithRejection(Query(query), _): WithRejection<Query<BorrowingsQuery>, AppError>,
) -> AppResult<Json<CountResponse>> {
    let status = query.status_filter()?;

    let count = state.services.borrowings.count(status).await?;
    Ok(Json(CountResponse { count }))
}

/// Lend a book to a user
#[utoipa::path(
    post,
    path = "/readerdetails/{id}/borrow",
    tag = "borrowings",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Borrowing user ID")),
    request_body = CreateBorrowingRequest,
    responses(
        (status = 201, description = "Borrowing created", body = CreatedResponse),
        (status = 400, description = "Missing or invalid data"),
        (status = 404, description = "User or book not found")
    )
)]
pub async fn create_borrowing(
    State(state): State<AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Path(user_id): Path<i32>,
    WithRejection(Json(request), _): WithRejection<Json<CreateBorrowingRequest>, AppError>,
) -> AppResult<(StatusCode, Json<CreatedResponse>)> {
    let borrowing = CreateBorrowing::from_request(user_id, request)?;

    let id = state.services.borrowings.create(borrowing).await?;
    Ok((
        StatusCode::CREATED,
        Json(CreatedResponse {
            message: "Borrowing record added successfully".to_string(),
            id,
        }),
    ))
}

/// Set, replace or clear the prolongation date
#[utoipa::path(
    post,
    path = "/borrowings/{id}/prolongation",
    tag = "borrowings",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Borrowing ID")),
    request_body = ProlongationRequest,
    responses(
        (status = 200, description = "Prolongation updated", body = MessageResponse),
        (status = 400, description = "Missing or invalid date"),
        (status = 404, description = "Borrowing not found")
    )
)]
pub async fn set_prolongation(
    State(state): State<AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Path(id): Path<i32>,
    WithRejection(Json(request), _): WithRejection<Json<ProlongationRequest>, AppError>,
) -> AppResult<Json<MessageResponse>> {
    let prolongation = request.into_date()?;

    state.services.borrowings.set_prolongation(id, prolongation).await?;
    Ok(Json(MessageResponse::new("Prolongation updated successfully")))
}

/// Record the actual return of a borrowed book
#[utoipa::path(
    post,
    path = "/borrowings/{id}/realreturndate",
    tag = "borrowings",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Borrowing ID")),
    request_body = ReturnDateRequest,
    responses(
        (status = 200, description = "Return recorded", body = MessageResponse),
        (status = 400, description = "Missing or invalid date"),
        (status = 404, description = "Borrowing not found")
    )
)]
pub async fn record_return(
    State(state): State<AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Path(id): Path<i32>,
    WithRejection(Json(request), _): WithRejection<Json<ReturnDateRequest>, AppError>,
) -> AppResult<Json<MessageResponse>> {
    let real_return_date = request.into_date()?;

    state.services.borrowings.record_return(id, real_return_date).await?;
    Ok(Json(MessageResponse::new("Real return date updated successfully")))
}
