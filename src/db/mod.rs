//! Database layer (MongoDB, with an in-memory stand-in).

pub mod memory;
pub mod mongo;
pub mod query;
pub mod store;

pub use query::{AuthorScope, FeedFilter, PostQuery, SortKey};
pub use store::SocialDb;

/// Collection names as constants.
pub mod collections {
    pub const USERS: &str = "users";
    pub const POSTS: &str = "posts";
}

/// Direction of a follow-edge write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FollowChange {
    Follow,
    Unfollow,
}
