//! Authentication service: password hashing, login and token issuance

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::Utc;
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    config::AuthConfig,
    error::{AppError, AppResult},
    models::user::{RegisterUser, Role, User, UserClaims},
    repository::Repository,
};

/// Successful login payload
#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    pub token: String,
    pub token_type: String,
    /// Token lifetime in seconds
    pub expires_in: i64,
    pub user: User,
}

#[derive(Clone)]
pub struct AuthService {
    repository: Repository,
    config: AuthConfig,
}

impl AuthService {
    pub fn new(repository: Repository, config: AuthConfig) -> Self {
        Self { repository, config }
    }

    /// Authenticate by email and password and return a bearer token
    pub async fn login(&self, email: &str, password: &str) -> AppResult<LoginResponse> {
        let row = self
            .repository
            .users
            .get_row_by_email(email)
            .await?
            .ok_or_else(|| AppError::Authentication("Invalid email or password".to_string()))?;

        if !verify_password(&row.password, password)? {
            tracing::warn!("Failed login attempt for {}", email);
            return Err(AppError::Authentication("Invalid email or password".to_string()));
        }

        if !row.is_active {
            return Err(AppError::Authentication("Account is disabled".to_string()));
        }

        let user = User::from(row);
        let token = self.issue_token(&user)?;
        tracing::info!(user_id = user.id, "User logged in");

        Ok(LoginResponse {
            token,
            token_type: "Bearer".to_string(),
            expires_in: self.expires_in(),
            user,
        })
    }

    /// Sign a token carrying the user's identity and roles
    pub fn issue_token(&self, user: &User) -> AppResult<String> {
        let now = Utc::now().timestamp();
        let claims = UserClaims {
            sub: user.email.clone(),
            user_id: user.id,
            email: user.email.clone(),
            roles: user.roles.clone(),
            exp: now + self.expires_in(),
            iat: now,
        };

        claims
            .create_token(&self.config.jwt_secret)
            .map_err(|e| AppError::Internal(format!("Failed to create token: {}", e)))
    }

    fn expires_in(&self) -> i64 {
        self.config.jwt_expiration_hours as i64 * 3600
    }

    /// Create the configured administrator account when no account uses its email yet
    pub async fn ensure_admin(&self) -> AppResult<()> {
        let (Some(email), Some(password)) = (&self.config.admin_email, &self.config.admin_password) else {
            return Ok(());
        };

        if self.repository.users.get_row_by_email(email).await?.is_some() {
            return Ok(());
        }

        let admin = RegisterUser {
            email: email.clone(),
            password: password.clone(),
            first_name: "Admin".to_string(),
            last_name: "Admin".to_string(),
            date_of_birth: None,
            gender: None,
            phone_number: None,
            address: None,
            profile_picture: None,
            is_active: Some(true),
        };
        let hash = hash_password(password)?;
        let user = self
            .repository
            .users
            .create(&admin, &hash, &[Role::User, Role::Employee, Role::Admin])
            .await?;

        tracing::info!(user_id = user.id, "Created bootstrap administrator {}", email);
        Ok(())
    }
}

/// Hash a password using Argon2
pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))?;
    Ok(hash.to_string())
}

/// Check a password against a stored Argon2 hash
pub fn verify_password(hash: &str, password: &str) -> AppResult<bool> {
    let parsed_hash =
        PasswordHash::new(hash).map_err(|_| AppError::Internal("Invalid password hash".to_string()))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}
