// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Store handle shared by all services.

use crate::config::Config;
use crate::db::memory::MemoryStore;
use crate::db::mongo::MongoStore;
use crate::db::query::PostQuery;
use crate::db::FollowChange;
use crate::error::AppError;
use crate::models::{Post, User};
use bson::oid::ObjectId;
use std::sync::Arc;

/// Database client, cheap to clone.
#[derive(Clone)]
pub struct SocialDb {
    backend: Backend,
}

#[derive(Clone)]
enum Backend {
    Mongo(MongoStore),
    Memory(Arc<MemoryStore>),
    Offline,
}

impl SocialDb {
    /// Connect to the store selected by `config.mongo_uri`.
    pub async fn connect(config: &Config) -> Result<Self, AppError> {
        if config.uses_memory_store() {
            tracing::warn!("Using in-memory store; data is lost on restart");
            return Ok(Self::new_in_memory());
        }

        let store =
            MongoStore::connect(&config.mongo_uri, &config.db_name, config.mongo_transactions)
                .await?;
        store.ensure_indexes().await?;

        Ok(Self {
            backend: Backend::Mongo(store),
        })
    }

    /// Create an empty in-memory store.
    pub fn new_in_memory() -> Self {
        Self {
            backend: Backend::Memory(Arc::new(MemoryStore::new())),
        }
    }

    /// Create a mock client for testing (offline mode).
    ///
    /// All database operations will return an error if called.
    pub fn new_mock() -> Self {
        Self {
            backend: Backend::Offline,
        }
    }

    fn offline() -> AppError {
        AppError::Database("Database not connected (offline mode)".to_string())
    }

    // ─── User Operations ─────────────────────────────────────────

    pub async fn get_user(&self, id: ObjectId) -> Result<Option<User>, AppError> {
        match &self.backend {
            Backend::Mongo(db) => db.get_user(id).await,
            Backend::Memory(mem) => Ok(mem.get_user(&id)),
            Backend::Offline => Err(Self::offline()),
        }
    }

    pub async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        match &self.backend {
            Backend::Mongo(db) => db.find_user_by_email(email).await,
            Backend::Memory(mem) => Ok(mem.find_user_by_email(email)),
            Backend::Offline => Err(Self::offline()),
        }
    }

    pub async fn get_users(&self, ids: &[ObjectId]) -> Result<Vec<User>, AppError> {
        match &self.backend {
            Backend::Mongo(db) => db.get_users(ids).await,
            Backend::Memory(mem) => Ok(mem.get_users(ids)),
            Backend::Offline => Err(Self::offline()),
        }
    }

    /// Insert a new user; a taken email yields `Conflict`.
    pub async fn insert_user(&self, user: &User) -> Result<(), AppError> {
        match &self.backend {
            Backend::Mongo(db) => db.insert_user(user).await,
            Backend::Memory(mem) => mem.insert_user(user),
            Backend::Offline => Err(Self::offline()),
        }
    }

    /// Overwrite a user; an email owned by another user yields `Conflict`.
    pub async fn save_user(&self, user: &User) -> Result<(), AppError> {
        match &self.backend {
            Backend::Mongo(db) => db.save_user(user).await,
            Backend::Memory(mem) => mem.save_user(user),
            Backend::Offline => Err(Self::offline()),
        }
    }

    /// Write one follow edge to both the target's and the follower's lists.
    pub async fn update_follow_edge(
        &self,
        follower: ObjectId,
        target: ObjectId,
        change: FollowChange,
    ) -> Result<(), AppError> {
        match &self.backend {
            Backend::Mongo(db) => db.update_follow_edge(follower, target, change).await,
            Backend::Memory(mem) => {
                mem.update_follow_edge(follower, target, change);
                Ok(())
            }
            Backend::Offline => Err(Self::offline()),
        }
    }

    // ─── Post Operations ─────────────────────────────────────────

    pub async fn get_post(&self, id: ObjectId) -> Result<Option<Post>, AppError> {
        match &self.backend {
            Backend::Mongo(db) => db.get_post(id).await,
            Backend::Memory(mem) => Ok(mem.get_post(&id)),
            Backend::Offline => Err(Self::offline()),
        }
    }

    pub async fn insert_post(&self, post: &Post) -> Result<(), AppError> {
        match &self.backend {
            Backend::Mongo(db) => db.insert_post(post).await,
            Backend::Memory(mem) => {
                mem.save_post(post);
                Ok(())
            }
            Backend::Offline => Err(Self::offline()),
        }
    }

    pub async fn save_post(&self, post: &Post) -> Result<(), AppError> {
        match &self.backend {
            Backend::Mongo(db) => db.save_post(post).await,
            Backend::Memory(mem) => {
                mem.save_post(post);
                Ok(())
            }
            Backend::Offline => Err(Self::offline()),
        }
    }

    pub async fn delete_post(&self, id: ObjectId) -> Result<bool, AppError> {
        match &self.backend {
            Backend::Mongo(db) => db.delete_post(id).await,
            Backend::Memory(mem) => Ok(mem.delete_post(&id)),
            Backend::Offline => Err(Self::offline()),
        }
    }

    pub async fn query_posts(&self, query: &PostQuery) -> Result<Vec<Post>, AppError> {
        match &self.backend {
            Backend::Mongo(db) => db.query_posts(query).await,
            Backend::Memory(mem) => Ok(mem.query_posts(query)),
            Backend::Offline => Err(Self::offline()),
        }
    }

    /// Remove all users and posts.
    pub async fn clear(&self) -> Result<(), AppError> {
        match &self.backend {
            Backend::Mongo(db) => db.clear().await,
            Backend::Memory(mem) => {
                mem.clear();
                Ok(())
            }
            Backend::Offline => Err(Self::offline()),
        }
    }
}
