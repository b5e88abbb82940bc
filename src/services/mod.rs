//! Business logic services

pub mod auth;
pub mod books;
pub mod borrowings;
pub mod uploads;
pub mod users;

use crate::{config::AppConfig, repository::Repository};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub repository: Repository,
    pub auth: auth::AuthService,
    pub users: users::UsersService,
    pub books: books::BooksService,
    pub borrowings: borrowings::BorrowingsService,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(repository: Repository, config: &AppConfig) -> Self {
        let uploads = uploads::UploadsService::new(config.uploads.clone());

        Self {
            auth: auth::AuthService::new(repository.clone(), config.auth.clone()),
            users: users::UsersService::new(repository.clone()),
            books: books::BooksService::new(repository.clone(), uploads),
            borrowings: borrowings::BorrowingsService::new(repository.clone(), config.borrowings.clone()),
            repository,
        }
    }
}
