// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Demo data seeder.
//!
//! Wipes the configured database, then creates a handful of users who follow
//! each other at random and a week's worth of posts with likes, comments and
//! polls. Every account's password is `password123`.

use bson::oid::ObjectId;
use mini_social::{
    config::Config,
    db::{FollowChange, SocialDb},
    models::{Post, User},
    services::auth::hash_password_blocking,
};
use rand::seq::SliceRandom;
use rand::Rng;

const DEMO_PASSWORD: &str = "password123";
const POST_COUNT: usize = 25;
const WEEK_MILLIS: i64 = 7 * 24 * 60 * 60 * 1000;

const USERS: &[(&str, &str, &str)] = &[
    ("Sarah Jenkins", "sarah@example.com", "Photographer and traveler"),
    ("David Chen", "david@example.com", "Full stack developer"),
    ("Maria Rodriguez", "maria@example.com", "Always trying new recipes"),
    ("James Wilson", "james@example.com", "Health is wealth"),
    ("Emily Davis", "emily@example.com", "Bookworm and aspiring writer"),
];

const POST_TEXTS: &[&str] = &[
    "Just captured an amazing sunset!",
    "Working on a new side project. Challenging but fun.",
    "Anyone have recommendations for a good Italian restaurant in the city?",
    "Morning workout done. Feeling energized.",
    "Just finished reading 'The Midnight Library'. Highly recommend!",
    "Explored a new hiking trail today.",
    "Trying out a new recipe tonight. Wish me luck!",
    "Tech tip: always back up your data!",
];

const POLLS: &[(&str, &[&str])] = &[
    ("What's your go-to coffee order?", &["Espresso", "Latte", "Cold brew", "Tea, thanks"]),
    ("Tabs or spaces?", &["Tabs", "Spaces"]),
    ("Best time for a run?", &["Sunrise", "Lunch", "Evening"]),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("info".parse().unwrap()),
        )
        .init();

    let config = Config::from_env()?;
    let db = SocialDb::connect(&config).await?;

    tracing::info!(db = %config.db_name, "Clearing old data");
    db.clear().await?;

    let password_hash = hash_password_blocking(DEMO_PASSWORD)?;
    let mut rng = rand::thread_rng();
    let now = bson::DateTime::now().timestamp_millis();

    let mut users = Vec::with_capacity(USERS.len());
    for (name, email, bio) in USERS {
        let mut user = User::new(name.to_string(), email.to_string(), password_hash.clone());
        user.bio = bio.to_string();
        user.created_at =
            bson::DateTime::from_millis(now - rng.gen_range(WEEK_MILLIS..4 * WEEK_MILLIS));
        db.insert_user(&user).await?;
        tracing::info!(user = %user.name, "Created user");
        users.push(user);
    }

    let mut edges = 0;
    for follower in &users {
        for target in &users {
            if follower.id != target.id && rng.gen_bool(0.5) {
                db.update_follow_edge(follower.id, target.id, FollowChange::Follow)
                    .await?;
                edges += 1;
            }
        }
    }
    tracing::info!(edges, "Created follow edges");

    let user_ids: Vec<ObjectId> = users.iter().map(|u| u.id).collect();
    for _ in 0..POST_COUNT {
        let Some(author) = users.choose(&mut rng) else {
            break;
        };

        let mut post = if rng.gen_bool(0.2) {
            let (question, options) = POLLS[rng.gen_range(0..POLLS.len())];
            let mut post = Post::new(
                author.id,
                author.name.clone(),
                question.to_string(),
                String::new(),
                options.iter().map(|o| o.to_string()).collect(),
            );
            for voter in &user_ids {
                if rng.gen_bool(0.6) {
                    let option_id = post.poll_options[rng.gen_range(0..options.len())].id;
                    post.cast_vote(option_id, *voter);
                }
            }
            post
        } else {
            let text = POST_TEXTS[rng.gen_range(0..POST_TEXTS.len())];
            Post::new(
                author.id,
                author.name.clone(),
                text.to_string(),
                String::new(),
                Vec::new(),
            )
        };

        for liker in &user_ids {
            if rng.gen_bool(0.4) {
                post.toggle_like(*liker);
            }
        }
        if rng.gen_bool(0.3) {
            if let Some(commenter) = users.choose(&mut rng) {
                post.add_comment(commenter.id, commenter.name.clone(), "Great post!".into());
            }
        }
        post.created_at = bson::DateTime::from_millis(now - rng.gen_range(0..WEEK_MILLIS));

        db.insert_post(&post).await?;
    }

    tracing::info!(users = users.len(), posts = POST_COUNT, "Database seeded");
    Ok(())
}
