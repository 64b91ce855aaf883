//! User model for storage and API.

use bson::oid::ObjectId;
use bson::DateTime;
use serde::{Deserialize, Serialize};

/// Points granted to every new account.
pub const DEFAULT_POINTS: i32 = 50;

/// User document stored in the `users` collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    /// Display name
    pub name: String,
    /// Email address (unique)
    pub email: String,
    /// Argon2 PHC string
    pub password: String,
    /// When the account was created
    pub created_at: DateTime,
    /// Profile picture URL (empty if unset)
    #[serde(default)]
    pub profile_pic_url: String,
    /// Cover picture URL (empty if unset)
    #[serde(default)]
    pub cover_pic_url: String,
    #[serde(default)]
    pub bio: String,
    #[serde(default = "default_points")]
    pub points: i32,
    /// Users following this user
    #[serde(default)]
    pub followers: Vec<ObjectId>,
    /// Users this user follows
    #[serde(default)]
    pub following: Vec<ObjectId>,
}

fn default_points() -> i32 {
    DEFAULT_POINTS
}

impl User {
    /// Build a fresh account with default profile fields.
    pub fn new(name: String, email: String, password_hash: String) -> Self {
        Self {
            id: ObjectId::new(),
            name,
            email,
            password: password_hash,
            created_at: DateTime::now(),
            profile_pic_url: String::new(),
            cover_pic_url: String::new(),
            bio: String::new(),
            points: DEFAULT_POINTS,
            followers: Vec::new(),
            following: Vec::new(),
        }
    }

    pub fn is_followed_by(&self, user_id: &ObjectId) -> bool {
        self.followers.contains(user_id)
    }
}
