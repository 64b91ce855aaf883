// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! MongoDB backend with typed operations.
//!
//! Provides high-level operations for:
//! - Users (profiles and follow lists)
//! - Posts (feed items with embedded comments and poll options)

use crate::db::query::PostQuery;
use crate::db::{collections, FollowChange};
use crate::error::AppError;
use crate::models::{Post, User};
use bson::oid::ObjectId;
use bson::{doc, Document};
use futures_util::TryStreamExt;
use mongodb::options::{ClientOptions, IndexOptions};
use mongodb::{Client, Collection, Database, IndexModel};

/// MongoDB database handle.
#[derive(Clone)]
pub struct MongoStore {
    client: Client,
    db: Database,
    transactions: bool,
}

impl MongoStore {
    /// Connect and verify the deployment answers a ping.
    pub async fn connect(uri: &str, db_name: &str, transactions: bool) -> Result<Self, AppError> {
        let mut options = ClientOptions::parse(uri)
            .await
            .map_err(|e| AppError::Database(format!("Failed to parse MongoDB URI: {}", e)))?;
        options.app_name = Some("mini-social".to_string());

        let client = Client::with_options(options)
            .map_err(|e| AppError::Database(format!("Failed to create MongoDB client: {}", e)))?;
        let db = client.database(db_name);

        db.run_command(doc! { "ping": 1 })
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to MongoDB: {}", e)))?;

        tracing::info!(database = db_name, transactions, "Connected to MongoDB");

        Ok(Self {
            client,
            db,
            transactions,
        })
    }

    fn users(&self) -> Collection<User> {
        self.db.collection(collections::USERS)
    }

    fn posts(&self) -> Collection<Post> {
        self.db.collection(collections::POSTS)
    }

    /// Create the indexes the queries rely on.
    pub async fn ensure_indexes(&self) -> Result<(), AppError> {
        let unique_email = IndexModel::builder()
            .keys(doc! { "email": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();
        self.users().create_index(unique_email).await?;

        self.posts()
            .create_indexes([
                IndexModel::builder().keys(doc! { "userId": 1 }).build(),
                IndexModel::builder().keys(doc! { "createdAt": -1 }).build(),
            ])
            .await?;

        tracing::debug!("MongoDB indexes ensured");
        Ok(())
    }

    // ─── User Operations ─────────────────────────────────────────

    pub async fn get_user(&self, id: ObjectId) -> Result<Option<User>, AppError> {
        Ok(self.users().find_one(doc! { "_id": id }).await?)
    }

    pub async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        Ok(self.users().find_one(doc! { "email": email }).await?)
    }

    /// Fetch all users whose id is in `ids`. Unknown ids are skipped.
    pub async fn get_users(&self, ids: &[ObjectId]) -> Result<Vec<User>, AppError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let cursor = self
            .users()
            .find(doc! { "_id": { "$in": ids.to_vec() } })
            .await?;
        Ok(cursor.try_collect().await?)
    }

    pub async fn insert_user(&self, user: &User) -> Result<(), AppError> {
        self.users().insert_one(user).await?;
        Ok(())
    }

    /// Replace the stored user document with `user`.
    pub async fn save_user(&self, user: &User) -> Result<(), AppError> {
        self.users()
            .replace_one(doc! { "_id": user.id }, user)
            .await?;
        Ok(())
    }

    /// Push or pull one follow edge on both user documents.
    ///
    /// Without transactions the two updates are independent: if the second
    /// fails the relation stays one-sided and the error is returned as is.
    pub async fn update_follow_edge(
        &self,
        follower: ObjectId,
        target: ObjectId,
        change: FollowChange,
    ) -> Result<(), AppError> {
        let op = match change {
            FollowChange::Follow => "$push",
            FollowChange::Unfollow => "$pull",
        };
        let mut target_update = Document::new();
        target_update.insert(op, doc! { "followers": follower });
        let mut follower_update = Document::new();
        follower_update.insert(op, doc! { "following": target });

        if !self.transactions {
            self.users()
                .update_one(doc! { "_id": target }, target_update)
                .await?;
            self.users()
                .update_one(doc! { "_id": follower }, follower_update)
                .await?;
            return Ok(());
        }

        let mut session = self.client.start_session().await?;
        session.start_transaction().await?;

        let result = async {
            self.users()
                .update_one(doc! { "_id": target }, target_update)
                .session(&mut session)
                .await?;
            self.users()
                .update_one(doc! { "_id": follower }, follower_update)
                .session(&mut session)
                .await?;
            Ok::<_, mongodb::error::Error>(())
        }
        .await;

        match result {
            Ok(()) => {
                session.commit_transaction().await?;
                Ok(())
            }
            Err(e) => {
                let _ = session.abort_transaction().await;
                Err(e.into())
            }
        }
    }

    // ─── Post Operations ─────────────────────────────────────────

    pub async fn get_post(&self, id: ObjectId) -> Result<Option<Post>, AppError> {
        Ok(self.posts().find_one(doc! { "_id": id }).await?)
    }

    pub async fn insert_post(&self, post: &Post) -> Result<(), AppError> {
        self.posts().insert_one(post).await?;
        Ok(())
    }

    /// Replace the stored post document with `post`.
    pub async fn save_post(&self, post: &Post) -> Result<(), AppError> {
        self.posts()
            .replace_one(doc! { "_id": post.id }, post)
            .await?;
        Ok(())
    }

    /// Returns `true` if a document was deleted.
    pub async fn delete_post(&self, id: ObjectId) -> Result<bool, AppError> {
        let result = self.posts().delete_one(doc! { "_id": id }).await?;
        Ok(result.deleted_count > 0)
    }

    pub async fn query_posts(&self, query: &PostQuery) -> Result<Vec<Post>, AppError> {
        let cursor = self.posts().aggregate(query.pipeline()).await?;
        let docs: Vec<Document> = cursor.try_collect().await?;

        docs.into_iter()
            .map(|d| bson::from_document(d).map_err(AppError::from))
            .collect()
    }

    /// Remove every user and post (seeding only).
    pub async fn clear(&self) -> Result<(), AppError> {
        self.users().delete_many(doc! {}).await?;
        self.posts().delete_many(doc! {}).await?;
        Ok(())
    }
}
