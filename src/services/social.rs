//! Profiles and the follow graph.

use crate::db::{FollowChange, SocialDb};
use crate::error::{AppError, Result};
use crate::models::User;
use bson::oid::ObjectId;
use std::collections::HashMap;

/// A user with follower/following lists resolved to user documents.
#[derive(Debug)]
pub struct Profile {
    pub user: User,
    pub followers: Vec<User>,
    pub following: Vec<User>,
}

#[derive(Clone)]
pub struct SocialService {
    db: SocialDb,
}

impl SocialService {
    pub fn new(db: SocialDb) -> Self {
        Self { db }
    }

    pub async fn get_profile(&self, user_id: ObjectId) -> Result<Profile> {
        let user = self
            .db
            .get_user(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        let followers = self.resolve(&user.followers).await?;
        let following = self.resolve(&user.following).await?;

        Ok(Profile {
            user,
            followers,
            following,
        })
    }

    /// Load users for `ids`, keeping list order and skipping dangling ids.
    async fn resolve(&self, ids: &[ObjectId]) -> Result<Vec<User>> {
        let mut by_id: HashMap<ObjectId, User> = self
            .db
            .get_users(ids)
            .await?
            .into_iter()
            .map(|u| (u.id, u))
            .collect();

        Ok(ids.iter().filter_map(|id| by_id.remove(id)).collect())
    }

    async fn target(&self, follower: ObjectId, target: ObjectId, verb: &str) -> Result<User> {
        if follower == target {
            return Err(AppError::BadRequest(format!("You cannot {} yourself", verb)));
        }
        self.db
            .get_user(target)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))
    }

    pub async fn follow(&self, follower: ObjectId, target: ObjectId) -> Result<()> {
        let target_user = self.target(follower, target, "follow").await?;
        if target_user.is_followed_by(&follower) {
            return Err(AppError::Conflict("You already follow this user".to_string()));
        }

        self.db
            .update_follow_edge(follower, target, FollowChange::Follow)
            .await?;

        tracing::info!(follower = %follower, target = %target, "User followed");
        Ok(())
    }

    pub async fn unfollow(&self, follower: ObjectId, target: ObjectId) -> Result<()> {
        let target_user = self.target(follower, target, "unfollow").await?;
        if !target_user.is_followed_by(&follower) {
            return Err(AppError::Conflict("You do not follow this user".to_string()));
        }

        self.db
            .update_follow_edge(follower, target, FollowChange::Unfollow)
            .await?;

        tracing::info!(follower = %follower, target = %target, "User unfollowed");
        Ok(())
    }
}
