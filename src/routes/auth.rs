// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Account routes: signup, login, current user, profile update.

use axum::{
    extract::State,
    routing::{get, post, put},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::error::Result;
use crate::middleware::auth::AuthUser;
use crate::models::User;
use crate::routes::form::{FormData, JsonBody};
use crate::services::{AuthSession, ProfileUpdate};
use crate::time_utils::format_bson_datetime;
use crate::AppState;

/// Public account routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/auth/signup", post(signup))
        .route("/api/auth/login", post(login))
}

/// Account routes behind the auth middleware (applied in routes/mod.rs).
pub fn protected_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/auth/me", get(get_me))
        .route("/api/auth/update", put(update_profile))
}

#[derive(Debug, Deserialize, Validate)]
pub struct SignupRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: String,
    #[validate(email(message = "A valid email is required"))]
    pub email: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "Email is required"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Text fields of a profile update. Blank fields count as absent and are
/// not validated. Name and email are trimmed, the password is kept as sent.
#[derive(Debug, Validate)]
pub struct ProfileForm {
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: Option<String>,
    #[validate(email(message = "A valid email is required"))]
    pub email: Option<String>,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: Option<String>,
    pub bio: Option<String>,
}

impl ProfileForm {
    fn take(form: &mut FormData) -> Self {
        let mut field = |name: &str| {
            form.take_text(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let name = field("name");
        let email = field("email");
        Self {
            name,
            email,
            password: form
                .take_text("password")
                .filter(|v| !v.trim().is_empty()),
            bio: form.take_text("bio"),
        }
    }
}

/// Short user summary returned with a session token.
#[derive(Debug, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct SessionUser {
    pub id: String,
    pub name: String,
    pub email: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct SessionResponse {
    pub token: String,
    pub user: SessionUser,
}

impl From<AuthSession> for SessionResponse {
    fn from(session: AuthSession) -> Self {
        Self {
            token: session.token,
            user: SessionUser {
                id: session.user.id.to_hex(),
                name: session.user.name,
                email: session.user.email,
            },
        }
    }
}

/// The caller's full account record, minus the password hash.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct MeResponse {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub email: String,
    pub created_at: String,
    pub profile_pic_url: String,
    pub cover_pic_url: String,
    pub bio: String,
    pub points: i32,
    pub followers: Vec<String>,
    pub following: Vec<String>,
}

impl From<User> for MeResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id.to_hex(),
            created_at: format_bson_datetime(user.created_at),
            followers: user.followers.iter().map(|id| id.to_hex()).collect(),
            following: user.following.iter().map(|id| id.to_hex()).collect(),
            name: user.name,
            email: user.email,
            profile_pic_url: user.profile_pic_url,
            cover_pic_url: user.cover_pic_url,
            bio: user.bio,
            points: user.points,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct UpdatedUserResponse {
    pub id: String,
    pub name: String,
    pub email: String,
    pub profile_pic_url: String,
    pub bio: String,
}

async fn signup(
    State(state): State<Arc<AppState>>,
    JsonBody(body): JsonBody<SignupRequest>,
) -> Result<Json<SessionResponse>> {
    body.validate()?;

    let session = state
        .auth_service
        .signup(&body.name, &body.email, &body.password)
        .await?;

    Ok(Json(session.into()))
}

async fn login(
    State(state): State<Arc<AppState>>,
    JsonBody(body): JsonBody<LoginRequest>,
) -> Result<Json<SessionResponse>> {
    body.validate()?;

    let session = state.auth_service.login(&body.email, &body.password).await?;
    Ok(Json(session.into()))
}

async fn get_me(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<MeResponse>> {
    let account = state.auth_service.current_user(user.user_id).await?;
    Ok(Json(account.into()))
}

/// Multipart profile update: `name`, `email`, `password`, `bio`, `profilePic`.
async fn update_profile(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    mut form: FormData,
) -> Result<Json<UpdatedUserResponse>> {
    let fields = ProfileForm::take(&mut form);
    fields.validate()?;

    let update = ProfileUpdate {
        name: fields.name,
        email: fields.email,
        password: fields.password,
        bio: fields.bio,
        picture: form.take_file("profilePic"),
    };

    let updated = state
        .auth_service
        .update_profile(user.user_id, update)
        .await?;

    Ok(Json(UpdatedUserResponse {
        id: updated.id.to_hex(),
        name: updated.name,
        email: updated.email,
        profile_pic_url: updated.profile_pic_url,
        bio: updated.bio,
    }))
}
