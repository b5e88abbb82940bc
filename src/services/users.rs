//! User management service

use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::{
        dates::monthly_counts,
        user::{RegisterUser, Role, UpdateUser, User, UserClaims},
    },
    repository::Repository,
    services::auth::hash_password,
};

#[derive(Clone)]
pub struct UsersService {
    repository: Repository,
}

impl UsersService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Register a new reader account
    pub async fn register(&self, data: RegisterUser) -> AppResult<User> {
        data.validate()?;

        let hash = hash_password(&data.password)?;
        let user = self.repository.users.create(&data, &hash, &[Role::User]).await?;

        tracing::info!(user_id = user.id, "Registered user {}", user.email);
        Ok(user)
    }

    pub async fn get_by_id(&self, id: i32) -> AppResult<User> {
        self.repository.users.get_by_id(id).await
    }

    pub async fn list(&self) -> AppResult<Vec<User>> {
        self.repository.users.list().await
    }

    /// Partial update. Role changes are reserved to administrators.
    pub async fn update(&self, claims: &UserClaims, id: i32, data: UpdateUser) -> AppResult<User> {
        claims.require_self_or_employee(id)?;
        if data.roles.is_some() {
            claims.require_admin()?;
        }
        data.validate()?;

        let hash = data.password.as_deref().map(hash_password).transpose()?;
        let user = self.repository.users.update(id, &data, hash.as_deref()).await?;

        tracing::info!(user_id = id, updated_by = claims.user_id, "Updated user");
        Ok(user)
    }

    pub async fn delete(&self, claims: &UserClaims, id: i32) -> AppResult<()> {
        claims.require_employee()?;
        if claims.user_id == id {
            return Err(AppError::BadRequest("Cannot delete your own account".to_string()));
        }

        self.repository.users.delete(id).await?;
        tracing::info!(user_id = id, deleted_by = claims.user_id, "Deleted user");
        Ok(())
    }

    pub async fn count(&self) -> AppResult<i64> {
        self.repository.users.count().await
    }

    /// Registrations per calendar month, January first
    pub async fn monthly_registrations(&self) -> AppResult<[i64; 12]> {
        let dates = self.repository.users.registration_dates().await?;
        Ok(monthly_counts(dates))
    }
}
