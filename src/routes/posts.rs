// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Post routes: feed listing, creation, likes, comments, poll votes, deletion.

use crate::db::FeedFilter;
use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::{Comment, PollOption, Post};
use crate::routes::form::{FormData, JsonBody};
use crate::routes::{parse_object_id, MessageResponse};
use crate::services::posts::{parse_poll_options, DEFAULT_PAGE_SIZE};
use crate::services::{ListParams, NewPost};
use crate::time_utils::format_bson_datetime;
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    routing::{delete, get, patch, post, put},
    Extension, Json, Router,
};
use bson::oid::ObjectId;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/posts", get(list_posts).post(create_post))
        .route("/api/posts/{id}", delete(delete_post))
        .route("/api/posts/{id}/like", patch(toggle_like))
        .route("/api/posts/{id}/comment", post(add_comment))
        .route("/api/posts/{id}/vote", put(vote))
}

// ─── Response types ──────────────────────────────────────────

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct CommentResponse {
    #[serde(rename = "_id")]
    pub id: String,
    pub user_id: String,
    pub username: String,
    pub text: String,
    pub created_at: String,
}

impl From<Comment> for CommentResponse {
    fn from(c: Comment) -> Self {
        Self {
            id: c.id.to_hex(),
            user_id: c.user_id.to_hex(),
            username: c.username,
            text: c.text,
            created_at: format_bson_datetime(c.created_at),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct PollOptionResponse {
    #[serde(rename = "_id")]
    pub id: String,
    pub text: String,
    pub votes: Vec<String>,
}

impl From<PollOption> for PollOptionResponse {
    fn from(o: PollOption) -> Self {
        Self {
            id: o.id.to_hex(),
            text: o.text,
            votes: hex_ids(&o.votes),
        }
    }
}

/// A post as rendered to clients.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct PostResponse {
    #[serde(rename = "_id")]
    pub id: String,
    pub user_id: String,
    pub username: String,
    pub text: String,
    pub image_url: String,
    pub likes: Vec<String>,
    pub comments: Vec<CommentResponse>,
    pub poll_options: Vec<PollOptionResponse>,
    pub created_at: String,
}

impl From<Post> for PostResponse {
    fn from(p: Post) -> Self {
        Self {
            id: p.id.to_hex(),
            user_id: p.user_id.to_hex(),
            likes: hex_ids(&p.likes),
            created_at: format_bson_datetime(p.created_at),
            username: p.username,
            text: p.text,
            image_url: p.image_url,
            comments: p.comments.into_iter().map(Into::into).collect(),
            poll_options: p.poll_options.into_iter().map(Into::into).collect(),
        }
    }
}

fn hex_ids(ids: &[ObjectId]) -> Vec<String> {
    ids.iter().map(|id| id.to_hex()).collect()
}

// ─── Listing ─────────────────────────────────────────────────

/// Raw listing query. Everything arrives as text so malformed values get
/// the same error body as every other bad request.
#[derive(Debug, Default, Deserialize)]
pub struct ListPostsQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub filter: Option<String>,
    #[serde(rename = "userId")]
    pub user_id: Option<String>,
    pub search: Option<String>,
}

impl ListPostsQuery {
    fn into_params(self) -> Result<ListParams> {
        let page = parse_count(self.page.as_deref(), "page")?.unwrap_or(1);
        let limit = parse_count(self.limit.as_deref(), "limit")?.unwrap_or(DEFAULT_PAGE_SIZE);

        let filter = match present(self.filter.as_deref()) {
            Some(raw) => raw.parse::<FeedFilter>().map_err(AppError::BadRequest)?,
            None => FeedFilter::default(),
        };

        let author = present(self.user_id.as_deref())
            .map(|raw| parse_object_id(raw, "user"))
            .transpose()?;

        Ok(ListParams {
            page,
            limit,
            filter,
            author,
            search: self.search,
        })
    }
}

fn present(raw: Option<&str>) -> Option<&str> {
    raw.map(str::trim).filter(|s| !s.is_empty())
}

fn parse_count(raw: Option<&str>, name: &str) -> Result<Option<u64>> {
    present(raw)
        .map(|s| {
            s.parse::<u64>()
                .map_err(|_| AppError::BadRequest(format!("{} must be a positive integer", name)))
        })
        .transpose()
}

async fn list_posts(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Query(query): Query<ListPostsQuery>,
) -> Result<Json<Vec<PostResponse>>> {
    let params = query.into_params()?;
    let posts = state.post_service.list_posts(user.user_id, &params).await?;

    Ok(Json(posts.into_iter().map(Into::into).collect()))
}

// ─── Mutations ───────────────────────────────────────────────

/// Multipart post creation: `text`, `image`, `pollOptions` (JSON array).
async fn create_post(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    mut form: FormData,
) -> Result<Json<PostResponse>> {
    let poll_options = parse_poll_options(form.text("pollOptions"))?;

    let new_post = NewPost {
        text: form.take_text("text"),
        image: form.take_file("image"),
        poll_options,
    };

    let created = state.post_service.create_post(user.user_id, new_post).await?;
    Ok(Json(created.into()))
}

async fn toggle_like(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<Json<PostResponse>> {
    let post_id = parse_object_id(&id, "post")?;
    let updated = state.post_service.toggle_like(post_id, user.user_id).await?;
    Ok(Json(updated.into()))
}

#[derive(Debug, Deserialize, Validate)]
pub struct CommentRequest {
    #[validate(length(min = 1, max = 2000, message = "Comment must be 1-2000 characters"))]
    pub text: String,
}

async fn add_comment(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
    JsonBody(body): JsonBody<CommentRequest>,
) -> Result<Json<PostResponse>> {
    let post_id = parse_object_id(&id, "post")?;
    body.validate()?;

    let updated = state
        .post_service
        .add_comment(post_id, user.user_id, &body.text)
        .await?;
    Ok(Json(updated.into()))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteRequest {
    pub option_id: String,
}

async fn vote(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
    JsonBody(body): JsonBody<VoteRequest>,
) -> Result<Json<PostResponse>> {
    let post_id = parse_object_id(&id, "post")?;
    // An unparseable option id can never name an option on this post.
    let option_id = ObjectId::parse_str(&body.option_id)
        .map_err(|_| AppError::NotFound("Option not found".to_string()))?;

    let updated = state
        .post_service
        .vote(post_id, option_id, user.user_id)
        .await?;
    Ok(Json(updated.into()))
}

async fn delete_post(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>> {
    let post_id = parse_object_id(&id, "post")?;
    state.post_service.delete_post(post_id, user.user_id).await?;
    Ok(MessageResponse::new("Post deleted successfully"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_query_defaults() {
        let params = ListPostsQuery::default().into_params().unwrap();
        assert_eq!(params.page, 1);
        assert_eq!(params.limit, DEFAULT_PAGE_SIZE);
        assert_eq!(params.filter, FeedFilter::All);
        assert!(params.author.is_none());
    }

    #[test]
    fn test_list_query_parses_values() {
        let author = ObjectId::new();
        let query = ListPostsQuery {
            page: Some("3".into()),
            limit: Some("5".into()),
            filter: Some("most_liked".into()),
            user_id: Some(author.to_hex()),
            search: Some("rust".into()),
        };

        let params = query.into_params().unwrap();
        assert_eq!(params.page, 3);
        assert_eq!(params.limit, 5);
        assert_eq!(params.filter, FeedFilter::MostLiked);
        assert_eq!(params.author, Some(author));
        assert_eq!(params.search.as_deref(), Some("rust"));
    }

    #[test]
    fn test_list_query_blank_values_are_absent() {
        let query = ListPostsQuery {
            filter: Some("".into()),
            user_id: Some("  ".into()),
            ..Default::default()
        };
        let params = query.into_params().unwrap();
        assert_eq!(params.filter, FeedFilter::All);
        assert!(params.author.is_none());
    }

    #[test]
    fn test_list_query_rejects_garbage() {
        let bad_page = ListPostsQuery {
            page: Some("-1".into()),
            ..Default::default()
        };
        assert!(matches!(bad_page.into_params(), Err(AppError::BadRequest(_))));

        let bad_filter = ListPostsQuery {
            filter: Some("trending".into()),
            ..Default::default()
        };
        assert!(matches!(bad_filter.into_params(), Err(AppError::BadRequest(_))));

        let bad_user = ListPostsQuery {
            user_id: Some("not-an-id".into()),
            ..Default::default()
        };
        assert!(matches!(bad_user.into_params(), Err(AppError::BadRequest(_))));
    }

    #[test]
    fn test_post_response_shape() {
        let author = ObjectId::new();
        let mut post = Post::new(
            author,
            "alice".into(),
            "hello".into(),
            String::new(),
            vec!["yes".into(), "no".into()],
        );
        post.toggle_like(author);
        post.add_comment(author, "alice".into(), "first".into());

        let json = serde_json::to_value(PostResponse::from(post.clone())).unwrap();
        assert_eq!(json["_id"], post.id.to_hex());
        assert_eq!(json["userId"], author.to_hex());
        assert_eq!(json["likes"][0], author.to_hex());
        assert_eq!(json["comments"][0]["text"], "first");
        assert_eq!(json["pollOptions"][1]["text"], "no");
        assert!(json["pollOptions"][0]["votes"].as_array().unwrap().is_empty());
        assert!(json["createdAt"].as_str().unwrap().ends_with('Z'));
    }
}
