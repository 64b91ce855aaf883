// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Account service: signup, login, token verification and profile edits.

use crate::db::SocialDb;
use crate::error::{AppError, Result};
use crate::middleware::auth::{create_jwt, decode_jwt, AuthUser};
use crate::models::User;
use crate::services::uploads::{UploadStore, UploadedFile};
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use bson::oid::ObjectId;
use rand::rngs::OsRng;

/// Well-formed Argon2id hash (default parameters) that no password matches.
/// Checked on unknown-email logins so they cost the same as a wrong password.
const DUMMY_PASSWORD_HASH: &str = "$argon2id$v=19$m=19456,t=2,p=1$bWluaS1zb2NpYWwtbG9naW4$BwgJCgsMDQ4PEBESExQVFhcYGRobHB0eHyAhIiMkJSY";

/// A freshly issued session.
#[derive(Debug)]
pub struct AuthSession {
    pub token: String,
    pub user: User,
}

/// Partial profile update. `None` fields are left unchanged.
#[derive(Debug, Default)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub bio: Option<String>,
    pub picture: Option<UploadedFile>,
}

#[derive(Clone)]
pub struct AuthService {
    db: SocialDb,
    uploads: UploadStore,
    signing_key: Vec<u8>,
    token_ttl_secs: u64,
}

impl AuthService {
    pub fn new(
        db: SocialDb,
        uploads: UploadStore,
        signing_key: Vec<u8>,
        token_ttl_secs: u64,
    ) -> Self {
        Self {
            db,
            uploads,
            signing_key,
            token_ttl_secs,
        }
    }

    fn issue_token(&self, user_id: ObjectId) -> Result<String> {
        Ok(create_jwt(user_id, &self.signing_key, self.token_ttl_secs)?)
    }

    /// Register a new account and log it in.
    pub async fn signup(&self, name: &str, email: &str, password: &str) -> Result<AuthSession> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::BadRequest("Name is required".to_string()));
        }
        let email = normalize_email(email);

        if self.db.find_user_by_email(&email).await?.is_some() {
            return Err(AppError::Conflict("User already exists".to_string()));
        }

        let password_hash = hash_password(password.to_string()).await?;
        let user = User::new(name.to_string(), email, password_hash);
        self.db.insert_user(&user).await?;

        tracing::info!(user_id = %user.id, "User signed up");

        let token = self.issue_token(user.id)?;
        Ok(AuthSession { token, user })
    }

    /// Check credentials and issue a new token.
    ///
    /// Unknown email and wrong password are indistinguishable to the caller.
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthSession> {
        let email = normalize_email(email);

        let Some(user) = self.db.find_user_by_email(&email).await? else {
            verify_password(password.to_string(), DUMMY_PASSWORD_HASH.to_string()).await?;
            tracing::debug!("Login failed: unknown email");
            return Err(AppError::InvalidCredentials);
        };

        if !verify_password(password.to_string(), user.password.clone()).await? {
            tracing::debug!(user_id = %user.id, "Login failed: password mismatch");
            return Err(AppError::InvalidCredentials);
        }

        tracing::info!(user_id = %user.id, "User logged in");

        let token = self.issue_token(user.id)?;
        Ok(AuthSession { token, user })
    }

    /// Resolve a bearer token to a caller identity.
    ///
    /// Tokens whose user has since been deleted are rejected.
    pub async fn verify_token(&self, token: &str) -> Result<AuthUser> {
        let user_id = decode_jwt(token, &self.signing_key)?;

        if self.db.get_user(user_id).await?.is_none() {
            tracing::warn!(user_id = %user_id, "Token for missing user");
            return Err(AppError::InvalidToken);
        }

        Ok(AuthUser { user_id })
    }

    pub async fn current_user(&self, user_id: ObjectId) -> Result<User> {
        self.db
            .get_user(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))
    }

    /// Apply a partial profile update and return the stored user.
    pub async fn update_profile(&self, user_id: ObjectId, update: ProfileUpdate) -> Result<User> {
        let mut user = self.current_user(user_id).await?;

        if let Some(name) = non_blank(update.name) {
            user.name = name;
        }
        if let Some(email) = non_blank(update.email) {
            user.email = normalize_email(&email);
        }
        if let Some(password) = update.password.filter(|p| !p.trim().is_empty()) {
            user.password = hash_password(password).await?;
        }
        if let Some(bio) = update.bio {
            user.bio = bio.trim().to_string();
        }

        let new_picture = match &update.picture {
            Some(file) => Some(self.uploads.save(file).await?),
            None => None,
        };
        if let Some(url) = &new_picture {
            user.profile_pic_url = url.clone();
        }

        if let Err(e) = self.db.save_user(&user).await {
            if let Some(url) = &new_picture {
                self.uploads.remove(url).await;
            }
            return Err(e);
        }

        tracing::info!(user_id = %user.id, "Profile updated");
        Ok(user)
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Hash a password with a random salt (Argon2id, PHC string output).
pub fn hash_password_blocking(password: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| anyhow::anyhow!("Failed to hash password: {}", e))
}

/// Constant-time comparison of `password` against a stored PHC hash.
pub fn verify_password_blocking(password: &str, hash: &str) -> bool {
    let Ok(parsed_hash) = PasswordHash::new(hash) else {
        return false;
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}

async fn hash_password(password: String) -> Result<String> {
    tokio::task::spawn_blocking(move || hash_password_blocking(&password))
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Hashing task failed: {}", e)))?
        .map_err(AppError::Internal)
}

async fn verify_password(password: String, hash: String) -> Result<bool> {
    tokio::task::spawn_blocking(move || verify_password_blocking(&password, &hash))
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Verification task failed: {}", e)))
}
