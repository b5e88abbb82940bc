//! Book catalog service

use validator::Validate;

use crate::{
    error::AppResult,
    models::book::{Book, BookInput},
    repository::Repository,
    services::uploads::UploadsService,
};

#[derive(Clone)]
pub struct BooksService {
    repository: Repository,
    uploads: UploadsService,
}

impl BooksService {
    pub fn new(repository: Repository, uploads: UploadsService) -> Self {
        Self { repository, uploads }
    }

    pub async fn list(&self) -> AppResult<Vec<Book>> {
        self.repository.books.list().await
    }

    pub async fn get_by_id(&self, id: i32) -> AppResult<Book> {
        self.repository.books.get_by_id(id).await
    }

    /// Search by title or author; a blank term lists everything
    pub async fn search(&self, term: Option<&str>) -> AppResult<Vec<Book>> {
        match term.map(str::trim) {
            Some(term) if !term.is_empty() => self.repository.books.search(term).await,
            _ => self.repository.books.list().await,
        }
    }

    pub async fn create(&self, data: BookInput) -> AppResult<Book> {
        data.validate()?;
        let upload = self.store_cover(&data).await?;
        let cover = upload.as_deref().or(data.cover_image.as_deref());

        let book = match self.repository.books.create(&data, cover).await {
            Ok(book) => book,
            Err(e) => {
                self.discard(upload).await;
                return Err(e);
            }
        };
        tracing::info!(book_id = book.id, "Created book {}", book.title);
        Ok(book)
    }

    pub async fn update(&self, id: i32, data: BookInput) -> AppResult<Book> {
        data.validate()?;
        // Fail on unknown ids before anything is written to disk
        let previous = self.repository.books.get_by_id(id).await?;
        let upload = self.store_cover(&data).await?;
        let cover = upload.as_deref().or(data.cover_image.as_deref());

        let book = match self.repository.books.update(id, &data, cover).await {
            Ok(book) => book,
            Err(e) => {
                self.discard(upload).await;
                return Err(e);
            }
        };
        if previous.cover_image != book.cover_image {
            self.discard(previous.cover_image).await;
        }
        tracing::info!(book_id = id, "Updated book");
        Ok(book)
    }

    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let cover = self.repository.books.delete(id).await?;
        self.discard(cover).await;
        tracing::info!(book_id = id, "Deleted book");
        Ok(())
    }

    pub async fn count(&self) -> AppResult<i64> {
        self.repository.books.count().await
    }

    /// Store an inline cover upload, if any; it wins over a plain cover URL
    async fn store_cover(&self, data: &BookInput) -> AppResult<Option<String>> {
        match data.cover_image_data.as_deref().filter(|d| !d.is_empty()) {
            Some(data_url) => self.uploads.store_image("book", data_url).await.map(Some),
            None => Ok(None),
        }
    }

    async fn discard(&self, cover: Option<String>) {
        if let Some(url) = cover {
            self.uploads.remove(&url).await;
        }
    }
}
