//! Post model with embedded comments and poll options.
//!
//! All mutations here are in-memory; callers fetch a post, apply one of
//! these methods and write the whole document back.

use bson::oid::ObjectId;
use bson::DateTime;
use serde::{Deserialize, Serialize};

/// Post document stored in the `posts` collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    /// Author
    pub user_id: ObjectId,
    /// Author display name at creation time
    pub username: String,
    #[serde(default)]
    pub text: String,
    /// Relative URL under `/uploads` (empty if none)
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub likes: Vec<ObjectId>,
    #[serde(default)]
    pub comments: Vec<Comment>,
    #[serde(default)]
    pub poll_options: Vec<PollOption>,
    pub created_at: DateTime,
}

/// A comment on a post. Append-only.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub user_id: ObjectId,
    pub username: String,
    pub text: String,
    pub created_at: DateTime,
}

/// One choice in a post's poll.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollOption {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub text: String,
    #[serde(default)]
    pub votes: Vec<ObjectId>,
}

impl PollOption {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            id: ObjectId::new(),
            text: text.into(),
            votes: Vec::new(),
        }
    }
}

impl Post {
    pub fn new(
        user_id: ObjectId,
        username: String,
        text: String,
        image_url: String,
        poll_options: Vec<String>,
    ) -> Self {
        Self {
            id: ObjectId::new(),
            user_id,
            username,
            text,
            image_url,
            likes: Vec::new(),
            comments: Vec::new(),
            poll_options: poll_options.into_iter().map(PollOption::new).collect(),
            created_at: DateTime::now(),
        }
    }

    /// Add or remove `user_id` from the like set.
    ///
    /// Returns `true` if the user likes the post afterwards.
    pub fn toggle_like(&mut self, user_id: ObjectId) -> bool {
        if self.likes.contains(&user_id) {
            self.likes.retain(|id| *id != user_id);
            false
        } else {
            self.likes.push(user_id);
            true
        }
    }

    pub fn add_comment(&mut self, user_id: ObjectId, username: String, text: String) {
        self.comments.push(Comment {
            id: ObjectId::new(),
            user_id,
            username,
            text,
            created_at: DateTime::now(),
        });
    }

    /// Move `user_id`'s vote to `option_id`, clearing it from every other option.
    ///
    /// Returns `false` without touching any votes if the option does not exist.
    pub fn cast_vote(&mut self, option_id: ObjectId, user_id: ObjectId) -> bool {
        if !self.poll_options.iter().any(|opt| opt.id == option_id) {
            return false;
        }

        for option in &mut self.poll_options {
            option.votes.retain(|id| *id != user_id);
            if option.id == option_id {
                option.votes.push(user_id);
            }
        }
        true
    }

    pub fn is_authored_by(&self, user_id: &ObjectId) -> bool {
        self.user_id == *user_id
    }
}
