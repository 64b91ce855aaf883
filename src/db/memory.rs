//! In-memory store used for local development and offline tests.
//!
//! Mirrors the MongoDB backend's read/write granularity: every call is one
//! document operation, and follow edges are two independent writes.

use crate::db::query::PostQuery;
use crate::db::FollowChange;
use crate::error::AppError;
use crate::models::{Post, User};
use bson::oid::ObjectId;
use dashmap::DashMap;

#[derive(Default)]
pub struct MemoryStore {
    users: DashMap<ObjectId, User>,
    posts: DashMap<ObjectId, Post>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn email_taken_by_other(&self, email: &str, id: &ObjectId) -> bool {
        self.users
            .iter()
            .any(|entry| entry.email == email && entry.id != *id)
    }

    // ─── Users ───────────────────────────────────────────────────

    pub fn get_user(&self, id: &ObjectId) -> Option<User> {
        self.users.get(id).map(|u| u.clone())
    }

    pub fn find_user_by_email(&self, email: &str) -> Option<User> {
        self.users
            .iter()
            .find(|entry| entry.email == email)
            .map(|entry| entry.clone())
    }

    pub fn get_users(&self, ids: &[ObjectId]) -> Vec<User> {
        ids.iter().filter_map(|id| self.get_user(id)).collect()
    }

    pub fn insert_user(&self, user: &User) -> Result<(), AppError> {
        if self.email_taken_by_other(&user.email, &user.id) || self.users.contains_key(&user.id) {
            return Err(AppError::Conflict("User already exists".to_string()));
        }
        self.users.insert(user.id, user.clone());
        Ok(())
    }

    pub fn save_user(&self, user: &User) -> Result<(), AppError> {
        if self.email_taken_by_other(&user.email, &user.id) {
            return Err(AppError::Conflict("User already exists".to_string()));
        }
        self.users.insert(user.id, user.clone());
        Ok(())
    }

    pub fn update_follow_edge(&self, follower: ObjectId, target: ObjectId, change: FollowChange) {
        if let Some(mut user) = self.users.get_mut(&target) {
            match change {
                FollowChange::Follow => user.followers.push(follower),
                FollowChange::Unfollow => user.followers.retain(|id| *id != follower),
            }
        }
        if let Some(mut user) = self.users.get_mut(&follower) {
            match change {
                FollowChange::Follow => user.following.push(target),
                FollowChange::Unfollow => user.following.retain(|id| *id != target),
            }
        }
    }

    // ─── Posts ───────────────────────────────────────────────────

    pub fn get_post(&self, id: &ObjectId) -> Option<Post> {
        self.posts.get(id).map(|p| p.clone())
    }

    pub fn save_post(&self, post: &Post) {
        self.posts.insert(post.id, post.clone());
    }

    pub fn delete_post(&self, id: &ObjectId) -> bool {
        self.posts.remove(id).is_some()
    }

    pub fn query_posts(&self, query: &PostQuery) -> Vec<Post> {
        let snapshot: Vec<Post> = self.posts.iter().map(|entry| entry.clone()).collect();
        query.apply(snapshot)
    }

    pub fn clear(&self) {
        self.users.clear();
        self.posts.clear();
    }
}
