//! Borrowings repository for database operations

use chrono::NaiveDate;
use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::borrowing::{BorrowingDetails, BorrowingRow, BorrowingSort, BorrowingStatus, CreateBorrowing},
};

/// Borrowing joined with its book and borrower; column aliases match `BorrowingRow`
const SELECT_DETAILS: &str = r#"
    SELECT
        b.id, b.borrowing_date, b.real_return_date, b.prolongation, b.comments, b.status,
        bk.id AS book_id, bk.title AS book_title, bk.author AS book_author,
        bk.isbn AS book_isbn, bk.publication_date AS book_publication_date,
        bk.publisher AS book_publisher, bk.genre AS book_genre, bk.summary AS book_summary,
        bk.page_count AS book_page_count, bk.cover_image AS book_cover_image,
        bk.created_at AS book_created_at, bk.updated_at AS book_updated_at,
        u.id AS user_id, u.email AS user_email, u.roles AS user_roles,
        u.first_name AS user_first_name, u.last_name AS user_last_name,
        u.date_of_birth AS user_date_of_birth, u.gender AS user_gender,
        u.phone_number AS user_phone_number, u.address AS user_address,
        u.profile_picture AS user_profile_picture, u.is_active AS user_is_active,
        u.created_at AS user_created_at, u.updated_at AS user_updated_at
    FROM borrowings b
    JOIN books bk ON bk.id = b.book_id
    JOIN users u ON u.id = b.user_id
"#;

#[derive(Clone)]
pub struct BorrowingsRepository {
    pool: Pool<Postgres>,
}

impl BorrowingsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Every borrowing, ascending id
    pub async fn list_all(&self) -> AppResult<Vec<BorrowingDetails>> {
        let query = format!("{} ORDER BY b.id ASC", SELECT_DETAILS);
        let rows = sqlx::query_as::<_, BorrowingRow>(&query)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(BorrowingDetails::from).collect())
    }

    /// Borrowings of one book, ascending id
    pub async fn list_by_book(&self, book_id: i32) -> AppResult<Vec<BorrowingDetails>> {
        let query = format!("{} WHERE b.book_id = $1 ORDER BY b.id ASC", SELECT_DETAILS);
        let rows = sqlx::query_as::<_, BorrowingRow>(&query)
            .bind(book_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(BorrowingDetails::from).collect())
    }

    /// Borrowings of one user, optionally filtered by status, in the requested order
    pub async fn list_by_user(
        &self,
        user_id: i32,
        status: Option<BorrowingStatus>,
        sort: BorrowingSort,
    ) -> AppResult<Vec<BorrowingDetails>> {
        let query = format!(
            "{} WHERE b.user_id = $1 AND ($2::text IS NULL OR b.status = $2) ORDER BY {}",
            SELECT_DETAILS,
            sort.order_by()
        );
        let rows = sqlx::query_as::<_, BorrowingRow>(&query)
            .bind(user_id)
            .bind(status.map(|s| s.as_str()))
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(BorrowingDetails::from).collect())
    }

    /// Pending borrowings in ascending id order, optionally capped
    pub async fn list_pending(&self, limit: Option<i64>) -> AppResult<Vec<BorrowingDetails>> {
        let query = format!(
            "{} WHERE b.status = $1 ORDER BY b.id ASC LIMIT $2",
            SELECT_DETAILS
        );
        let rows = sqlx::query_as::<_, BorrowingRow>(&query)
            .bind(BorrowingStatus::Pending)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(BorrowingDetails::from).collect())
    }

    /// Insert a pending borrowing after checking that both the user and the book exist
    pub async fn create(&self, data: &CreateBorrowing) -> AppResult<i32> {
        let mut tx = self.pool.begin().await?;

        let user_exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE id = $1)")
            .bind(data.user_id)
            .fetch_one(&mut *tx)
            .await?;
        let book_exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM books WHERE id = $1)")
            .bind(data.book_id)
            .fetch_one(&mut *tx)
            .await?;

        if !user_exists || !book_exists {
            return Err(AppError::NotFound("User or Book not found".to_string()));
        }

        let id: i32 = sqlx::query_scalar(
            r#"
            INSERT INTO borrowings (book_id, user_id, borrowing_date, real_return_date, prolongation, comments, status)
            VALUES ($1, $2, $3, $4, NULL, $5, $6)
            RETURNING id
            "#,
        )
        .bind(data.book_id)
        .bind(data.user_id)
        .bind(data.borrowing_date)
        .bind(data.real_return_date)
        .bind(&data.comments)
        .bind(BorrowingStatus::Pending)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(id)
    }

    /// Set or clear the prolongation date; status is left as is
    pub async fn set_prolongation(&self, id: i32, prolongation: Option<NaiveDate>) -> AppResult<()> {
        let result = sqlx::query("UPDATE borrowings SET prolongation = $1 WHERE id = $2")
            .bind(prolongation)
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Borrowing record not found".to_string()));
        }
        Ok(())
    }

    /// Record the actual return date and mark the borrowing returned
    pub async fn record_return(&self, id: i32, real_return_date: Option<NaiveDate>) -> AppResult<()> {
        let result = sqlx::query(
            "UPDATE borrowings SET real_return_date = $1, status = $2 WHERE id = $3",
        )
        .bind(real_return_date)
        .bind(BorrowingStatus::Returned)
        .bind(id)
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Borrowing record not found".to_string()));
        }
        Ok(())
    }

    /// Borrowing dates of every borrowing
    pub async fn borrowing_dates(&self) -> AppResult<Vec<NaiveDate>> {
        let dates: Vec<NaiveDate> = sqlx::query_scalar("SELECT borrowing_date FROM borrowings")
            .fetch_all(&self.pool)
            .await?;
        Ok(dates)
    }

    /// Count borrowings, optionally restricted to one status
    pub async fn count(&self, status: Option<BorrowingStatus>) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM borrowings WHERE ($1::text IS NULL OR status = $1)",
        )
        .bind(status.map(|s| s.as_str()))
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }
}
