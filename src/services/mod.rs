// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod auth;
pub mod posts;
pub mod social;
pub mod uploads;

pub use auth::{AuthService, AuthSession, ProfileUpdate};
pub use posts::{ListParams, NewPost, PostService};
pub use social::{Profile, SocialService};
pub use uploads::{UploadStore, UploadedFile};
