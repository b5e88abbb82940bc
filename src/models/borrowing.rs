//! Borrowing model: lifecycle status, overdue rules, sorting and request parsing

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Decode, Encode, FromRow, Postgres};
use utoipa::{IntoParams, ToSchema};

use super::{
    book::Book,
    dates::{legacy_date, parse_optional_date, parse_required_date},
    user::{roles_from_strings, User},
};
use crate::error::{AppError, AppResult};

/// Borrowing status. `Pending` until the actual return is recorded, then `Returned` for good.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum BorrowingStatus {
    Pending,
    Returned,
}

impl BorrowingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BorrowingStatus::Pending => "pending",
            BorrowingStatus::Returned => "returned",
        }
    }
}

impl std::fmt::Display for BorrowingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for BorrowingStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(BorrowingStatus::Pending),
            "returned" => Ok(BorrowingStatus::Returned),
            _ => Err(format!("Invalid borrowing status: {}", s)),
        }
    }
}

// SQLx conversion for BorrowingStatus (stored as VARCHAR)
impl sqlx::Type<Postgres> for BorrowingStatus {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<Postgres>>::compatible(ty)
    }
}

impl<'r> Decode<'r, Postgres> for BorrowingStatus {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s: String = Decode::<Postgres>::decode(value)?;
        s.parse().map_err(|e: String| e.into())
    }
}

impl Encode<'_, Postgres> for BorrowingStatus {
    fn encode_by_ref(&self, buf: &mut sqlx::postgres::PgArgumentBuffer) -> sqlx::encode::IsNull {
        <&str as Encode<Postgres>>::encode(self.as_str(), buf)
    }
}

/// A pending borrowing older than `window_days` is actionable unless an extension is
/// still running. A prolongation dated today counts as running.
pub fn is_actionable_overdue(
    status: BorrowingStatus,
    borrowing_date: NaiveDate,
    prolongation: Option<NaiveDate>,
    today: NaiveDate,
    window_days: i64,
) -> bool {
    let cutoff = today - Duration::days(window_days);

    status == BorrowingStatus::Pending
        && borrowing_date < cutoff
        && prolongation.map_or(true, |until| until < today)
}

/// Collect qualifying borrowings in the given (scan) order, stopping after `limit`.
pub fn select_actionable_overdue<I>(
    borrowings: I,
    today: NaiveDate,
    window_days: i64,
    limit: Option<usize>,
) -> Vec<BorrowingDetails>
where
    I: IntoIterator<Item = BorrowingDetails>,
{
    let qualifying = borrowings
        .into_iter()
        .filter(|b| b.is_actionable_overdue(today, window_days));

    match limit {
        Some(limit) => qualifying.take(limit).collect(),
        None => qualifying.collect(),
    }
}

/// Borrowing with its book and borrower, as returned by every listing
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BorrowingDetails {
    pub id: i32,
    pub book: Book,
    pub user: User,
    pub borrowing_date: NaiveDate,
    /// Actual return date, `0000-00-00` until recorded
    #[serde(rename = "realreturndate", with = "legacy_date", default)]
    #[schema(value_type = String, example = "2024-07-15")]
    pub real_return_date: Option<NaiveDate>,
    pub comments: String,
    pub status: BorrowingStatus,
    /// Extended due date, `0000-00-00` when none
    #[serde(with = "legacy_date", default)]
    #[schema(value_type = String, example = "0000-00-00")]
    pub prolongation: Option<NaiveDate>,
}

impl BorrowingDetails {
    pub fn is_actionable_overdue(&self, today: NaiveDate, window_days: i64) -> bool {
        is_actionable_overdue(
            self.status,
            self.borrowing_date,
            self.prolongation,
            today,
            window_days,
        )
    }
}

/// Flat row of the borrowings/books/users join
#[derive(Debug, Clone, FromRow)]
pub struct BorrowingRow {
    pub id: i32,
    pub borrowing_date: NaiveDate,
    pub real_return_date: Option<NaiveDate>,
    pub prolongation: Option<NaiveDate>,
    pub comments: String,
    pub status: BorrowingStatus,

    pub book_id: i32,
    pub book_title: String,
    pub book_author: String,
    pub book_isbn: Option<String>,
    pub book_publication_date: Option<String>,
    pub book_publisher: Option<String>,
    pub book_genre: Option<String>,
    pub book_summary: Option<String>,
    pub book_page_count: Option<i32>,
    pub book_cover_image: Option<String>,
    pub book_created_at: DateTime<Utc>,
    pub book_updated_at: DateTime<Utc>,

    pub user_id: i32,
    pub user_email: String,
    pub user_roles: Vec<String>,
    pub user_first_name: String,
    pub user_last_name: String,
    pub user_date_of_birth: Option<String>,
    pub user_gender: Option<String>,
    pub user_phone_number: Option<String>,
    pub user_address: Option<String>,
    pub user_profile_picture: Option<String>,
    pub user_is_active: bool,
    pub user_created_at: DateTime<Utc>,
    pub user_updated_at: DateTime<Utc>,
}

impl From<BorrowingRow> for BorrowingDetails {
    fn from(row: BorrowingRow) -> Self {
        BorrowingDetails {
            id: row.id,
            book: Book {
                id: row.book_id,
                title: row.book_title,
                author: row.book_author,
                isbn: row.book_isbn,
                publication_date: row.book_publication_date,
                publisher: row.book_publisher,
                genre: row.book_genre,
                summary: row.book_summary,
                page_count: row.book_page_count,
                cover_image: row.book_cover_image,
                created_at: row.book_created_at,
                updated_at: row.book_updated_at,
            },
            user: User {
                id: row.user_id,
                email: row.user_email,
                roles: roles_from_strings(&row.user_roles),
                first_name: row.user_first_name,
                last_name: row.user_last_name,
                date_of_birth: row.user_date_of_birth,
                gender: row.user_gender,
                phone_number: row.user_phone_number,
                address: row.user_address,
                profile_picture: row.user_profile_picture,
                is_active: row.user_is_active,
                created_at: row.user_created_at,
                updated_at: row.user_updated_at,
            },
            borrowing_date: row.borrowing_date,
            real_return_date: row.real_return_date,
            comments: row.comments,
            status: row.status,
            prolongation: row.prolongation,
        }
    }
}

/// Create borrowing request body. Keys are checked for presence by hand so that
/// a missing key is a 400 rather than a deserialization failure.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct CreateBorrowingRequest {
    pub book_id: Option<i32>,
    /// YYYY-MM-DD
    pub borrowing_date: Option<String>,
    /// Intended return date; empty string for none
    pub realreturndate: Option<String>,
    pub comments: Option<String>,
}

/// Column width of `borrowings.comments`
pub const MAX_COMMENTS_LEN: usize = 255;

/// Validated borrowing creation
#[derive(Debug, Clone, PartialEq)]
pub struct CreateBorrowing {
    pub user_id: i32,
    pub book_id: i32,
    pub borrowing_date: NaiveDate,
    pub real_return_date: Option<NaiveDate>,
    pub comments: String,
}

impl CreateBorrowing {
    pub fn from_request(user_id: i32, request: CreateBorrowingRequest) -> AppResult<Self> {
        let (Some(book_id), Some(borrowing_date), Some(real_return_date)) = (
            request.book_id,
            request.borrowing_date,
            request.realreturndate,
        ) else {
            return Err(AppError::BadRequest(
                "Invalid data: book_id, borrowing_date and realreturndate are required".to_string(),
            ));
        };

        let comments = request.comments.unwrap_or_default();
        if comments.chars().count() > MAX_COMMENTS_LEN {
            return Err(AppError::Validation(format!(
                "comments must be at most {} characters",
                MAX_COMMENTS_LEN
            )));
        }

        Ok(Self {
            user_id,
            book_id,
            borrowing_date: parse_required_date("borrowing_date", &borrowing_date)?,
            real_return_date: parse_optional_date("realreturndate", &real_return_date)?,
            comments,
        })
    }
}

/// Prolongation update body
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct ProlongationRequest {
    /// New extended due date; empty string clears it
    pub prolongation: Option<String>,
}

impl ProlongationRequest {
    pub fn into_date(self) -> AppResult<Option<NaiveDate>> {
        let raw = self.prolongation.ok_or_else(|| {
            AppError::BadRequest("Invalid data: prolongation is required".to_string())
        })?;
        parse_optional_date("prolongation", &raw)
    }
}

/// Actual return body
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct ReturnDateRequest {
    /// Date the book came back; empty string for unknown
    pub realreturndate: Option<String>,
}

impl ReturnDateRequest {
    pub fn into_date(self) -> AppResult<Option<NaiveDate>> {
        let raw = self.realreturndate.ok_or_else(|| {
            AppError::BadRequest("Invalid data: realreturndate is required".to_string())
        })?;
        parse_optional_date("realreturndate", &raw)
    }
}

/// Sortable borrowing columns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Id,
    BorrowingDate,
    RealReturnDate,
    Status,
}

impl SortField {
    fn column(&self) -> &'static str {
        match self {
            SortField::Id => "b.id",
            SortField::BorrowingDate => "b.borrowing_date",
            SortField::RealReturnDate => "b.real_return_date",
            SortField::Status => "b.status",
        }
    }
}

impl std::str::FromStr for SortField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "id" => Ok(SortField::Id),
            "borrowing_date" => Ok(SortField::BorrowingDate),
            "realreturndate" => Ok(SortField::RealReturnDate),
            "status" => Ok(SortField::Status),
            _ => Err(format!("Invalid sort field: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    fn keyword(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

impl std::str::FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ASC" => Ok(SortOrder::Asc),
            "DESC" => Ok(SortOrder::Desc),
            _ => Err(format!("Invalid sort order: {}", s)),
        }
    }
}

/// Validated sort specification. Only whitelisted columns ever reach SQL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BorrowingSort {
    pub field: SortField,
    pub order: SortOrder,
}

impl Default for BorrowingSort {
    fn default() -> Self {
        Self {
            field: SortField::Id,
            order: SortOrder::Desc,
        }
    }
}

impl BorrowingSort {
    pub fn parse(field: Option<&str>, order: Option<&str>) -> AppResult<Self> {
        let default = Self::default();
        let field = match field {
            Some(f) => f.parse().map_err(AppError::Validation)?,
            None => default.field,
        };
        let order = match order {
            Some(o) => o.parse().map_err(AppError::Validation)?,
            None => default.order,
        };
        Ok(Self { field, order })
    }

    /// ORDER BY clause body, with the id as tie-breaker
    pub fn order_by(&self) -> String {
        let order = self.order.keyword();
        match self.field {
            SortField::Id => format!("b.id {}", order),
            other => format!("{} {}, b.id {}", other.column(), order, order),
        }
    }
}

/// Query parameters for per-user borrowing listings
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct BorrowingsQuery {
    /// id, borrowing_date, realreturndate or status (default id)
    pub sort_field: Option<String>,
    /// ASC or DESC (default DESC)
    pub sort_order: Option<String>,
    /// pending or returned
    pub status: Option<String>,
}

impl BorrowingsQuery {
    pub fn sort(&self) -> AppResult<BorrowingSort> {
        BorrowingSort::parse(self.sort_field.as_deref(), self.sort_order.as_deref())
    }

    /// Status filter; an empty value means no filter
    pub fn status_filter(&self) -> AppResult<Option<BorrowingStatus>> {
        match self.status.as_deref() {
            None | Some("") => Ok(None),
            Some(s) => s.parse().map(Some).map_err(AppError::Validation),
        }
    }
}
