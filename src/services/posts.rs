// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Post service: feed listing, creation, likes, comments, polls, deletion.
//!
//! Mutations follow one pattern: fetch the post, change it in memory through
//! the model, write the whole document back. There is no version check, so
//! two concurrent writers on the same post can overwrite each other.

use crate::db::{AuthorScope, FeedFilter, PostQuery, SocialDb, SortKey};
use crate::error::{AppError, Result};
use crate::models::Post;
use crate::services::uploads::{UploadStore, UploadedFile};
use bson::oid::ObjectId;

pub const MIN_POLL_OPTIONS: usize = 2;
pub const MAX_POLL_OPTIONS: usize = 4;
pub const DEFAULT_PAGE_SIZE: u64 = 10;
pub const MAX_PAGE_SIZE: u64 = 100;

/// Content for a new post. At least one part must be present.
#[derive(Debug, Default)]
pub struct NewPost {
    pub text: Option<String>,
    pub image: Option<UploadedFile>,
    /// Already-normalized poll option texts (empty = no poll)
    pub poll_options: Vec<String>,
}

/// Listing parameters after boundary parsing.
#[derive(Debug, Clone)]
pub struct ListParams {
    pub page: u64,
    pub limit: u64,
    pub filter: FeedFilter,
    pub author: Option<ObjectId>,
    pub search: Option<String>,
}

impl Default for ListParams {
    fn default() -> Self {
        Self {
            page: 1,
            limit: DEFAULT_PAGE_SIZE,
            filter: FeedFilter::All,
            author: None,
            search: None,
        }
    }
}

/// Decode the multipart `pollOptions` field (a JSON string array).
///
/// Entries are trimmed and blanks dropped. Zero remaining entries means no
/// poll; otherwise between two and four are required.
pub fn parse_poll_options(raw: Option<&str>) -> Result<Vec<String>> {
    let Some(raw) = raw.map(str::trim).filter(|r| !r.is_empty()) else {
        return Ok(Vec::new());
    };

    let entries: Vec<String> = serde_json::from_str(raw)
        .map_err(|_| AppError::BadRequest("pollOptions must be a JSON array of strings".into()))?;

    let options: Vec<String> = entries
        .into_iter()
        .map(|e| e.trim().to_string())
        .filter(|e| !e.is_empty())
        .collect();

    if !options.is_empty() && !(MIN_POLL_OPTIONS..=MAX_POLL_OPTIONS).contains(&options.len()) {
        return Err(AppError::BadRequest(format!(
            "A poll needs between {} and {} options",
            MIN_POLL_OPTIONS, MAX_POLL_OPTIONS
        )));
    }

    Ok(options)
}

#[derive(Clone)]
pub struct PostService {
    db: SocialDb,
    uploads: UploadStore,
}

impl PostService {
    pub fn new(db: SocialDb, uploads: UploadStore) -> Self {
        Self { db, uploads }
    }

    async fn author_name(&self, user_id: ObjectId) -> Result<String> {
        self.db
            .get_user(user_id)
            .await?
            .map(|u| u.name)
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))
    }

    async fn load(&self, post_id: ObjectId) -> Result<Post> {
        self.db
            .get_post(post_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Post not found".to_string()))
    }

    /// Create a post stamped with the author's current display name.
    pub async fn create_post(&self, author_id: ObjectId, new_post: NewPost) -> Result<Post> {
        let text = new_post
            .text
            .map(|t| t.trim().to_string())
            .unwrap_or_default();
        let image = new_post.image.filter(|f| !f.bytes.is_empty());

        if !new_post.poll_options.is_empty()
            && !(MIN_POLL_OPTIONS..=MAX_POLL_OPTIONS).contains(&new_post.poll_options.len())
        {
            return Err(AppError::BadRequest(format!(
                "A poll needs between {} and {} options",
                MIN_POLL_OPTIONS, MAX_POLL_OPTIONS
            )));
        }

        if text.is_empty() && image.is_none() && new_post.poll_options.is_empty() {
            return Err(AppError::BadRequest(
                "Post must contain text, image, or a poll".to_string(),
            ));
        }

        let username = self.author_name(author_id).await?;

        let image_url = match &image {
            Some(file) => self.uploads.save(file).await?,
            None => String::new(),
        };

        let post = Post::new(
            author_id,
            username,
            text,
            image_url,
            new_post.poll_options,
        );

        if let Err(e) = self.db.insert_post(&post).await {
            if !post.image_url.is_empty() {
                self.uploads.remove(&post.image_url).await;
            }
            return Err(e);
        }

        tracing::info!(
            post_id = %post.id,
            author_id = %author_id,
            has_image = !post.image_url.is_empty(),
            poll_options = post.poll_options.len(),
            "Post created"
        );

        Ok(post)
    }

    /// Resolve request parameters into a store query.
    ///
    /// Returns `None` when the result is known to be empty (a "for you"
    /// feed for someone who follows nobody).
    pub async fn resolve_query(
        &self,
        requester: ObjectId,
        params: &ListParams,
    ) -> Result<Option<PostQuery>> {
        if params.page < 1 {
            return Err(AppError::BadRequest(
                "Page must be greater than 0".to_string(),
            ));
        }
        if params.limit < 1 || params.limit > MAX_PAGE_SIZE {
            return Err(AppError::BadRequest(format!(
                "Limit must be between 1 and {}",
                MAX_PAGE_SIZE
            )));
        }

        let skip = (params.page - 1)
            .checked_mul(params.limit)
            .filter(|skip| i64::try_from(*skip).is_ok())
            .ok_or_else(|| AppError::BadRequest("Page number causes overflow".to_string()))?;

        let authors = match (params.author, params.filter) {
            (Some(author), _) => AuthorScope::One(author),
            (None, FeedFilter::ForYou) => {
                let following = self
                    .db
                    .get_user(requester)
                    .await?
                    .map(|u| u.following)
                    .unwrap_or_default();
                if following.is_empty() {
                    return Ok(None);
                }
                AuthorScope::AnyOf(following)
            }
            (None, _) => AuthorScope::Any,
        };

        let search = params
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);

        Ok(Some(PostQuery {
            authors,
            search,
            sort: SortKey::from(params.filter),
            skip,
            limit: params.limit,
        }))
    }

    pub async fn list_posts(&self, requester: ObjectId, params: &ListParams) -> Result<Vec<Post>> {
        let Some(query) = self.resolve_query(requester, params).await? else {
            tracing::debug!(requester = %requester, "Empty following list, empty feed");
            return Ok(Vec::new());
        };

        tracing::debug!(
            requester = %requester,
            filter = ?params.filter,
            page = params.page,
            limit = params.limit,
            "Listing posts"
        );

        self.db.query_posts(&query).await
    }

    pub async fn toggle_like(&self, post_id: ObjectId, user_id: ObjectId) -> Result<Post> {
        let mut post = self.load(post_id).await?;
        let liked = post.toggle_like(user_id);
        self.db.save_post(&post).await?;

        tracing::debug!(post_id = %post_id, user_id = %user_id, liked, "Like toggled");
        Ok(post)
    }

    pub async fn add_comment(
        &self,
        post_id: ObjectId,
        author_id: ObjectId,
        text: &str,
    ) -> Result<Post> {
        let text = text.trim();
        if text.is_empty() {
            return Err(AppError::BadRequest("Comment text is required".to_string()));
        }

        let mut post = self.load(post_id).await?;
        let username = self.author_name(author_id).await?;
        post.add_comment(author_id, username, text.to_string());
        self.db.save_post(&post).await?;

        Ok(post)
    }

    /// Move the caller's single vote on this post's poll to `option_id`.
    pub async fn vote(
        &self,
        post_id: ObjectId,
        option_id: ObjectId,
        user_id: ObjectId,
    ) -> Result<Post> {
        let mut post = self.load(post_id).await?;

        if !post.cast_vote(option_id, user_id) {
            return Err(AppError::NotFound("Option not found".to_string()));
        }
        self.db.save_post(&post).await?;

        tracing::debug!(post_id = %post_id, option_id = %option_id, "Vote recorded");
        Ok(post)
    }

    /// Delete a post owned by `requester`, removing its image first.
    pub async fn delete_post(&self, post_id: ObjectId, requester: ObjectId) -> Result<()> {
        let post = self.load(post_id).await?;

        if !post.is_authored_by(&requester) {
            return Err(AppError::Forbidden(
                "Not authorized to delete this post".to_string(),
            ));
        }

        if !post.image_url.is_empty() {
            self.uploads.remove(&post.image_url).await;
        }
        self.db.delete_post(post_id).await?;

        tracing::info!(post_id = %post_id, "Post deleted");
        Ok(())
    }
}
