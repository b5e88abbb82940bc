//! Borrowing lifecycle service

use chrono::{NaiveDate, Utc};

use crate::{
    config::BorrowingsConfig,
    error::AppResult,
    models::{
        borrowing::{
            select_actionable_overdue, BorrowingDetails, BorrowingSort, BorrowingStatus, CreateBorrowing,
        },
        dates::monthly_counts,
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct BorrowingsService {
    repository: Repository,
    config: BorrowingsConfig,
}

impl BorrowingsService {
    pub fn new(repository: Repository, config: BorrowingsConfig) -> Self {
        Self { repository, config }
    }

    pub async fn list_all(&self) -> AppResult<Vec<BorrowingDetails>> {
        self.repository.borrowings.list_all().await
    }

    pub async fn list_by_book(&self, book_id: i32) -> AppResult<Vec<BorrowingDetails>> {
        self.repository.borrowings.list_by_book(book_id).await
    }

    pub async fn list_by_user(
        &self,
        user_id: i32,
        status: Option<BorrowingStatus>,
        sort: BorrowingSort,
    ) -> AppResult<Vec<BorrowingDetails>> {
        self.repository.borrowings.list_by_user(user_id, status, sort).await
    }

    /// Pending borrowings past the overdue window without a running prolongation
    pub async fn actionable_overdue(&self) -> AppResult<Vec<BorrowingDetails>> {
        self.actionable_overdue_at(today(), None).await
    }

    /// The first qualifying borrowings in ascending id order
    pub async fn actionable_overdue_bounded(&self) -> AppResult<Vec<BorrowingDetails>> {
        self.actionable_overdue_at(today(), Some(self.config.bounded_list_size))
            .await
    }

    async fn actionable_overdue_at(
        &self,
        today: NaiveDate,
        limit: Option<usize>,
    ) -> AppResult<Vec<BorrowingDetails>> {
        let pending = self.repository.borrowings.list_pending(None).await?;
        Ok(select_actionable_overdue(
            pending,
            today,
            self.config.overdue_window_days,
            limit,
        ))
    }

    /// The first pending borrowings in ascending id order
    pub async fn pending_bounded(&self) -> AppResult<Vec<BorrowingDetails>> {
        let limit = self.config.bounded_list_size as i64;
        self.repository.borrowings.list_pending(Some(limit)).await
    }

    pub async fn create(&self, data: CreateBorrowing) -> AppResult<i32> {
        let id = self.repository.borrowings.create(&data).await?;
        tracing::info!(
            borrowing_id = id,
            user_id = data.user_id,
            book_id = data.book_id,
            "Created borrowing"
        );
        Ok(id)
    }

    pub async fn set_prolongation(&self, id: i32, prolongation: Option<NaiveDate>) -> AppResult<()> {
        self.repository.borrowings.set_prolongation(id, prolongation).await?;
        tracing::info!(borrowing_id = id, ?prolongation, "Updated prolongation");
        Ok(())
    }

    /// Record the actual return; the borrowing is returned from then on
    pub async fn record_return(&self, id: i32, real_return_date: Option<NaiveDate>) -> AppResult<()> {
        self.repository.borrowings.record_return(id, real_return_date).await?;
        tracing::info!(borrowing_id = id, ?real_return_date, "Recorded return");
        Ok(())
    }

    /// Borrowings per calendar month, January first
    pub async fn monthly_borrowings(&self) -> AppResult<[i64; 12]> {
        let dates = self.repository.borrowings.borrowing_dates().await?;
        Ok(monthly_counts(dates))
    }

    pub async fn count(&self, status: Option<BorrowingStatus>) -> AppResult<i64> {
        self.repository.borrowings.count(status).await
    }
}

fn today() -> NaiveDate {
    Utc::now().date_naive()
}
