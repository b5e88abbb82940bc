//! Users repository for database operations

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::user::{roles_to_strings, RegisterUser, Role, UpdateUser, User, UserRow},
};

#[derive(Clone)]
pub struct UsersRepository {
    pool: Pool<Postgres>,
}

impl UsersRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get user by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<User> {
        sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(User::from)
            .ok_or_else(|| AppError::NotFound(format!("User with id {} not found", id)))
    }

    /// Get user row (with password hash) by email, case-insensitive
    pub async fn get_row_by_email(&self, email: &str) -> AppResult<Option<UserRow>> {
        let row = sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE LOWER(email) = LOWER($1)")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    /// List all users in id order
    pub async fn list(&self) -> AppResult<Vec<User>> {
        let rows = sqlx::query_as::<_, UserRow>("SELECT * FROM users ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(User::from).collect())
    }

    /// Insert a new user with an already hashed password
    pub async fn create(&self, data: &RegisterUser, password_hash: &str, roles: &[Role]) -> AppResult<User> {
        let now = Utc::now();

        let row = sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO users (
                email, password, roles, first_name, last_name, date_of_birth, gender,
                phone_number, address, profile_picture, is_active, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $12)
            RETURNING *
            "#,
        )
        .bind(&data.email)
        .bind(password_hash)
        .bind(roles_to_strings(roles))
        .bind(&data.first_name)
        .bind(&data.last_name)
        .bind(&data.date_of_birth)
        .bind(&data.gender)
        .bind(&data.phone_number)
        .bind(&data.address)
        .bind(&data.profile_picture)
        .bind(data.is_active.unwrap_or(true))
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::from_unique_violation(e, format!("Email {} is already registered", data.email)))?;

        Ok(row.into())
    }

    /// Update the provided fields only
    pub async fn update(&self, id: i32, data: &UpdateUser, password_hash: Option<&str>) -> AppResult<User> {
        let now = Utc::now();
        let roles = data.roles.as_deref().map(roles_to_strings);
        let mut sets = vec!["updated_at = $1".to_string()];
        let mut idx = 2;

        macro_rules! add_field {
            ($field:expr, $name:expr) => {
                if $field.is_some() {
                    sets.push(format!("{} = ${}", $name, idx));
                    idx += 1;
                }
            };
        }

        add_field!(data.email, "email");
        add_field!(password_hash, "password");
        add_field!(data.first_name, "first_name");
        add_field!(data.last_name, "last_name");
        add_field!(data.date_of_birth, "date_of_birth");
        add_field!(data.gender, "gender");
        add_field!(data.phone_number, "phone_number");
        add_field!(data.address, "address");
        add_field!(data.profile_picture, "profile_picture");
        add_field!(data.is_active, "is_active");
        add_field!(roles, "roles");

        let query = format!("UPDATE users SET {} WHERE id = ${} RETURNING *", sets.join(", "), idx);

        let mut builder = sqlx::query_as::<_, UserRow>(&query).bind(now);

        macro_rules! bind_field {
            ($field:expr) => {
                if let Some(ref val) = $field {
                    builder = builder.bind(val);
                }
            };
        }

        bind_field!(data.email);
        bind_field!(password_hash);
        bind_field!(data.first_name);
        bind_field!(data.last_name);
        bind_field!(data.date_of_birth);
        bind_field!(data.gender);
        bind_field!(data.phone_number);
        bind_field!(data.address);
        bind_field!(data.profile_picture);
        bind_field!(data.is_active);
        bind_field!(roles);

        builder
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::from_unique_violation(e, "Email is already registered"))?
            .map(User::from)
            .ok_or_else(|| AppError::NotFound(format!("User with id {} not found", id)))
    }

    /// Delete a user (borrowings cascade)
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("User with id {} not found", id)));
        }
        Ok(())
    }

    /// Count users
    pub async fn count(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Registration dates of every user
    pub async fn registration_dates(&self) -> AppResult<Vec<NaiveDate>> {
        let stamps: Vec<DateTime<Utc>> = sqlx::query_scalar("SELECT created_at FROM users")
            .fetch_all(&self.pool)
            .await?;
        Ok(stamps.into_iter().map(|s| s.date_naive()).collect())
    }
}
