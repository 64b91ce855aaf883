// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Feed queries.
//!
//! A [`PostQuery`] is resolved by the post service from the request's filter
//! mode and then executed by the store: MongoDB runs it as an aggregation
//! pipeline, the in-memory store evaluates [`PostQuery::matches`] and
//! [`PostQuery::compare`] directly. Both must agree on ordering.

use crate::models::Post;
use bson::oid::ObjectId;
use bson::{doc, Bson, Document};
use serde::Deserialize;
use std::cmp::Ordering;

/// Feed mode requested by the client.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedFilter {
    #[default]
    All,
    ForYou,
    MostLiked,
    MostCommented,
}

impl std::str::FromStr for FeedFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(FeedFilter::All),
            "for_you" => Ok(FeedFilter::ForYou),
            "most_liked" => Ok(FeedFilter::MostLiked),
            "most_commented" => Ok(FeedFilter::MostCommented),
            other => Err(format!("Unknown filter: {}", other)),
        }
    }
}

/// Derived sort key computed at query time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    /// Newest first
    Recency,
    /// Most likes first, then newest
    LikeCount,
    /// Most comments first, then newest
    CommentCount,
}

impl From<FeedFilter> for SortKey {
    fn from(filter: FeedFilter) -> Self {
        match filter {
            FeedFilter::All | FeedFilter::ForYou => SortKey::Recency,
            FeedFilter::MostLiked => SortKey::LikeCount,
            FeedFilter::MostCommented => SortKey::CommentCount,
        }
    }
}

/// Which authors a query is restricted to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthorScope {
    Any,
    One(ObjectId),
    AnyOf(Vec<ObjectId>),
}

/// A resolved, store-independent post listing query.
#[derive(Debug, Clone)]
pub struct PostQuery {
    pub authors: AuthorScope,
    /// Case-insensitive literal substring matched against text or author name
    pub search: Option<String>,
    pub sort: SortKey,
    pub skip: u64,
    pub limit: u64,
}

const LIKES_COUNT: &str = "likesCount";
const COMMENTS_COUNT: &str = "commentsCount";

impl PostQuery {
    /// The `$match` stage filter.
    pub fn filter_document(&self) -> Document {
        let mut filter = Document::new();

        match &self.authors {
            AuthorScope::Any => {}
            AuthorScope::One(id) => {
                filter.insert("userId", *id);
            }
            AuthorScope::AnyOf(ids) => {
                filter.insert("userId", doc! { "$in": ids.clone() });
            }
        }

        if let Some(search) = &self.search {
            let pattern = regex::escape(search);
            let matcher = || doc! { "$regex": pattern.clone(), "$options": "i" };
            filter.insert(
                "$or",
                vec![
                    Bson::Document(doc! { "text": matcher() }),
                    Bson::Document(doc! { "username": matcher() }),
                ],
            );
        }

        filter
    }

    /// Full aggregation pipeline: match, optional count field, sort, page.
    pub fn pipeline(&self) -> Vec<Document> {
        let mut stages = vec![doc! { "$match": self.filter_document() }];

        let count_field = match self.sort {
            SortKey::Recency => None,
            SortKey::LikeCount => Some((LIKES_COUNT, "$likes")),
            SortKey::CommentCount => Some((COMMENTS_COUNT, "$comments")),
        };

        let mut sort = Document::new();
        if let Some((field, source)) = count_field {
            let mut fields = Document::new();
            fields.insert(field, doc! { "$size": { "$ifNull": [source, []] } });
            stages.push(doc! { "$addFields": fields });
            sort.insert(field, -1);
        }
        sort.insert("createdAt", -1);
        sort.insert("_id", -1);

        stages.push(doc! { "$sort": sort });
        stages.push(doc! { "$skip": self.skip as i64 });
        stages.push(doc! { "$limit": self.limit as i64 });

        if let Some((field, _)) = count_field {
            stages.push(doc! { "$unset": field });
        }

        stages
    }

    /// In-memory equivalent of [`Self::filter_document`].
    pub fn matches(&self, post: &Post) -> bool {
        let author_ok = match &self.authors {
            AuthorScope::Any => true,
            AuthorScope::One(id) => post.user_id == *id,
            AuthorScope::AnyOf(ids) => ids.contains(&post.user_id),
        };

        author_ok
            && self.search.as_deref().map_or(true, |needle| {
                let needle = needle.to_lowercase();
                post.text.to_lowercase().contains(&needle)
                    || post.username.to_lowercase().contains(&needle)
            })
    }

    /// In-memory equivalent of the pipeline's `$sort` stage.
    pub fn compare(&self, a: &Post, b: &Post) -> Ordering {
        let by_count = match self.sort {
            SortKey::Recency => Ordering::Equal,
            SortKey::LikeCount => b.likes.len().cmp(&a.likes.len()),
            SortKey::CommentCount => b.comments.len().cmp(&a.comments.len()),
        };

        by_count
            .then_with(|| b.created_at.cmp(&a.created_at))
            .then_with(|| b.id.cmp(&a.id))
    }

    /// Filter, sort and page an in-memory collection of posts.
    pub fn apply(&self, posts: impl IntoIterator<Item = Post>) -> Vec<Post> {
        let mut matched: Vec<Post> = posts.into_iter().filter(|p| self.matches(p)).collect();
        matched.sort_by(|a, b| self.compare(a, b));
        matched
            .into_iter()
            .skip(self.skip as usize)
            .take(self.limit as usize)
            .collect()
    }
}
