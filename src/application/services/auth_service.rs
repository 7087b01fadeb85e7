//! User registration, login and bearer token authentication.

use std::sync::Arc;

use serde_json::json;
use tracing::{info, warn};

use crate::application::services::token_service::TokenService;
use crate::domain::entities::{NewUser, User};
use crate::domain::repositories::UserRepository;
use crate::error::AppError;
use crate::utils::password::{hash_password, verify_password};

/// A freshly authenticated user with their access token.
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub token: String,
    pub user: User,
}

/// Service for user accounts and access tokens.
///
/// Passwords are hashed with Argon2id on the blocking thread pool. Tokens are
/// stateless HS256 JWTs; nothing is stored server-side.
pub struct AuthService<R: UserRepository + ?Sized> {
    repository: Arc<R>,
    tokens: TokenService,
}

impl<R: UserRepository + ?Sized> AuthService<R> {
    pub fn new(repository: Arc<R>, tokens: TokenService) -> Self {
        Self { repository, tokens }
    }

    /// Creates an account and signs the user in.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] if the email is already registered.
    /// Returns [`AppError::Internal`] on hashing or database errors.
    pub async fn register(&self, email: &str, password: &str) -> Result<AuthSession, AppError> {
        let password_hash = hash_blocking(password.to_string()).await?;

        let user = self
            .repository
            .create(NewUser {
                email: email.to_string(),
                password_hash,
            })
            .await
            .map_err(|e| match e {
                AppError::Conflict { .. } => {
                    AppError::conflict("Email already registered", json!({ "email": email }))
                }
                other => other,
            })?;

        info!(user_id = user.id, "User registered");

        let token = self.tokens.issue(user.id)?;
        Ok(AuthSession { token, user })
    }

    /// Verifies credentials and issues a token.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Unauthorized`] for an unknown email or a wrong
    /// password; the two cases are indistinguishable to the caller.
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthSession, AppError> {
        let Some(user) = self.repository.find_by_email(email).await? else {
            warn!("Login failed: unknown email");
            return Err(invalid_credentials());
        };

        let valid = verify_blocking(password.to_string(), user.password_hash.clone()).await?;
        if !valid {
            warn!(user_id = user.id, "Login failed: wrong password");
            return Err(invalid_credentials());
        }

        let token = self.tokens.issue(user.id)?;
        Ok(AuthSession { token, user })
    }

    /// Resolves a bearer token to a user id.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Unauthorized`] if the token is invalid or expired.
    pub fn authenticate(&self, token: &str) -> Result<i64, AppError> {
        self.tokens.verify(token)
    }
}

fn invalid_credentials() -> AppError {
    AppError::unauthorized("Invalid credentials", json!({}))
}

async fn hash_blocking(password: String) -> Result<String, AppError> {
    tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| {
            AppError::internal("Password hashing task failed", json!({ "reason": e.to_string() }))
        })?
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to hash password");
            AppError::internal("Failed to hash password", json!({}))
        })
}

async fn verify_blocking(password: String, hash: String) -> Result<bool, AppError> {
    tokio::task::spawn_blocking(move || verify_password(&password, &hash))
        .await
        .map_err(|e| {
            AppError::internal("Password verification task failed", json!({ "reason": e.to_string() }))
        })?
        .map_err(|e| {
            tracing::error!(error = %e, "Stored password hash is unusable");
            AppError::internal("Failed to verify password", json!({}))
        })
}
