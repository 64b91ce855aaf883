// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! User profile and follow-graph routes.

use crate::error::Result;
use crate::middleware::auth::AuthUser;
use crate::models::User;
use crate::routes::{parse_object_id, MessageResponse};
use crate::services::Profile;
use crate::time_utils::format_bson_datetime;
use crate::AppState;
use axum::{
    extract::{Path, State},
    routing::{get, put},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/users/{id}", get(get_profile))
        .route("/api/users/{id}/follow", put(follow))
        .route("/api/users/{id}/unfollow", put(unfollow))
}

/// A follower or followee as listed on a profile.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct UserSummary {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub profile_pic_url: String,
}

impl From<User> for UserSummary {
    fn from(user: User) -> Self {
        Self {
            id: user.id.to_hex(),
            name: user.name,
            profile_pic_url: user.profile_pic_url,
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
pub struct ProfileResponse {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub email: String,
    pub created_at: String,
    pub profile_pic_url: String,
    pub cover_pic_url: String,
    pub bio: String,
    pub points: i32,
    pub followers: Vec<UserSummary>,
    pub following: Vec<UserSummary>,
}

impl From<Profile> for ProfileResponse {
    fn from(profile: Profile) -> Self {
        let user = profile.user;
        Self {
            id: user.id.to_hex(),
            created_at: format_bson_datetime(user.created_at),
            name: user.name,
            email: user.email,
            profile_pic_url: user.profile_pic_url,
            cover_pic_url: user.cover_pic_url,
            bio: user.bio,
            points: user.points,
            followers: profile.followers.into_iter().map(Into::into).collect(),
            following: profile.following.into_iter().map(Into::into).collect(),
        }
    }
}

async fn get_profile(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ProfileResponse>> {
    let user_id = parse_object_id(&id, "user")?;
    let profile = state.social_service.get_profile(user_id).await?;
    Ok(Json(profile.into()))
}

async fn follow(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>> {
    let target = parse_object_id(&id, "user")?;
    state.social_service.follow(user.user_id, target).await?;
    Ok(MessageResponse::new("User followed"))
}

async fn unfollow(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>> {
    let target = parse_object_id(&id, "user")?;
    state.social_service.unfollow(user.user_id, target).await?;
    Ok(MessageResponse::new("User unfollowed"))
}
