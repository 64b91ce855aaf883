// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Mini-Social: a small social feed backend
//!
//! This crate provides the REST API for accounts, posts with likes,
//! comments and polls, image uploads, and follow relationships.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use db::SocialDb;
use services::{AuthService, PostService, SocialService, UploadStore};

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub db: SocialDb,
    pub uploads: UploadStore,
    pub auth_service: AuthService,
    pub post_service: PostService,
    pub social_service: SocialService,
}

impl AppState {
    /// Wire all services onto one store handle.
    pub fn new(config: Config, db: SocialDb) -> Self {
        let uploads = UploadStore::new(config.upload_dir.clone());
        let auth_service = AuthService::new(
            db.clone(),
            uploads.clone(),
            config.jwt_signing_key.clone(),
            config.token_ttl_secs,
        );
        let post_service = PostService::new(db.clone(), uploads.clone());
        let social_service = SocialService::new(db.clone());

        Self {
            config,
            db,
            uploads,
            auth_service,
            post_service,
            social_service,
        }
    }
}
