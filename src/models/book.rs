//! Book model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

/// Book record
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    pub id: i32,
    pub title: String,
    pub author: String,
    pub isbn: Option<String>,
    pub publication_date: Option<String>,
    pub publisher: Option<String>,
    pub genre: Option<String>,
    pub summary: Option<String>,
    pub page_count: Option<i32>,
    /// Public URL of the cover image
    pub cover_image: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Create / update book request
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookInput {
    #[validate(length(min = 1, max = 255, message = "Title must be 1 to 255 characters"))]
    pub title: String,
    #[validate(length(min = 1, max = 255, message = "Author must be 1 to 255 characters"))]
    pub author: String,
    #[validate(length(max = 32))]
    pub isbn: Option<String>,
    #[validate(length(max = 32))]
    pub publication_date: Option<String>,
    #[validate(length(max = 255))]
    pub publisher: Option<String>,
    #[validate(length(max = 255))]
    pub genre: Option<String>,
    pub summary: Option<String>,
    #[validate(range(min = 0, message = "Page count cannot be negative"))]
    pub page_count: Option<i32>,
    /// Cover image URL, kept as-is unless `coverImageData` is supplied
    #[validate(length(max = 512))]
    pub cover_image: Option<String>,
    /// Inline upload as a `data:image/<type>;base64,...` URL
    #[serde(alias = "profile_picture_p")]
    pub cover_image_data: Option<String>,
}

/// Book search parameters
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct BookQuery {
    /// Substring matched against title and author
    pub query: Option<String>,
}
