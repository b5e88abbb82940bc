//! Data models for Shelfmark

pub mod book;
pub mod borrowing;
pub mod dates;
pub mod user;

// Re-export commonly used types
pub use book::Book;
pub use borrowing::{BorrowingDetails, BorrowingStatus};
pub use user::{Role, User};
