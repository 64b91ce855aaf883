// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! End-to-end post tests against the in-memory store.

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use serde_json::{json, Value};

mod common;
use common::{create_text_post, json_request, multipart_request, send, FilePart};

fn post_id(post: &Value) -> String {
    post["_id"].as_str().unwrap().to_string()
}

fn texts(posts: &Value) -> Vec<String> {
    posts
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["text"].as_str().unwrap().to_string())
        .collect()
}

async fn list(app: &axum::Router, token: &str, query: &str) -> Value {
    let (status, body) = send(
        app,
        json_request(Method::GET, &format!("/api/posts{}", query), Some(token), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    body
}

#[tokio::test]
async fn test_create_text_post_and_toggle_like() {
    let (app, _) = common::create_test_app();
    let (token, user_id) = common::signup(&app, "Ada", "ada@example.com").await;

    let post = create_text_post(&app, &token, "hello").await;
    assert_eq!(post["text"], "hello");
    assert_eq!(post["username"], "Ada");
    assert_eq!(post["userId"], user_id);
    assert_eq!(post["likes"], json!([]));
    assert_eq!(post["comments"], json!([]));
    assert_eq!(post["pollOptions"], json!([]));

    let uri = format!("/api/posts/{}/like", post_id(&post));
    let (status, liked) = send(&app, json_request(Method::PATCH, &uri, Some(token.as_str()), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(liked["likes"], json!([user_id]));

    let (_, unliked) = send(&app, json_request(Method::PATCH, &uri, Some(token.as_str()), None)).await;
    assert_eq!(unliked["likes"], json!([]));
}

#[tokio::test]
async fn test_feed_is_newest_first_and_paged() {
    let (app, _) = common::create_test_app();
    let (token, _) = common::signup(&app, "Ada", "ada@example.com").await;

    for i in 1..=5 {
        create_text_post(&app, &token, &format!("post {}", i)).await;
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    }

    let first = list(&app, &token, "?limit=2").await;
    assert_eq!(texts(&first), vec!["post 5", "post 4"]);

    let third = list(&app, &token, "?limit=2&page=3").await;
    assert_eq!(texts(&third), vec!["post 1"]);

    let beyond = list(&app, &token, "?limit=2&page=4").await;
    assert_eq!(beyond, json!([]));
}

#[tokio::test]
async fn test_most_liked_orders_by_like_count() {
    let (app, _) = common::create_test_app();
    let (ada, _) = common::signup(&app, "Ada", "ada@example.com").await;
    let (bob, _) = common::signup(&app, "Bob", "bob@example.com").await;

    let p1 = create_text_post(&app, &ada, "one like").await;
    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    let p2 = create_text_post(&app, &ada, "two likes").await;
    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    create_text_post(&app, &ada, "no likes").await;

    for (token, post) in [(&ada, &p1), (&ada, &p2), (&bob, &p2)] {
        let uri = format!("/api/posts/{}/like", post_id(post));
        let (status, _) = send(&app, json_request(Method::PATCH, &uri, Some(token.as_str()), None)).await;
        assert_eq!(status, StatusCode::OK);
    }

    let ranked = list(&app, &ada, "?filter=most_liked").await;
    assert_eq!(texts(&ranked), vec!["two likes", "one like", "no likes"]);
}

#[tokio::test]
async fn test_most_commented_orders_by_comment_count() {
    let (app, _) = common::create_test_app();
    let (token, _) = common::signup(&app, "Ada", "ada@example.com").await;

    let quiet = create_text_post(&app, &token, "quiet").await;
    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    create_text_post(&app, &token, "newest, no comments").await;

    let uri = format!("/api/posts/{}/comment", post_id(&quiet));
    let (status, commented) = send(
        &app,
        json_request(Method::POST, &uri, Some(token.as_str()), Some(json!({"text": "  nice  "}))),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(commented["comments"][0]["text"], "nice");
    assert_eq!(commented["comments"][0]["username"], "Ada");
    assert!(commented["comments"][0]["_id"].is_string());

    let ranked = list(&app, &token, "?filter=most_commented").await;
    assert_eq!(texts(&ranked), vec!["quiet", "newest, no comments"]);
}

#[tokio::test]
async fn test_search_is_case_insensitive_and_literal() {
    let (app, _) = common::create_test_app();
    let (token, _) = common::signup(&app, "Ada", "ada@example.com").await;

    create_text_post(&app, &token, "Learning Rust today").await;
    create_text_post(&app, &token, "C++ is also fine").await;
    create_text_post(&app, &token, "Nothing to see").await;

    let rust = list(&app, &token, "?search=rust").await;
    assert_eq!(texts(&rust), vec!["Learning Rust today"]);

    // '+' must not act as a regex quantifier
    let cpp = list(&app, &token, "?search=c%2B%2B").await;
    assert_eq!(texts(&cpp), vec!["C++ is also fine"]);
}

#[tokio::test]
async fn test_poll_vote_moves_between_options() {
    let (app, _) = common::create_test_app();
    let (token, user_id) = common::signup(&app, "Ada", "ada@example.com").await;

    let (status, post) = send(
        &app,
        multipart_request(
            Method::POST,
            "/api/posts",
            &token,
            &[("text", "Lunch?"), ("pollOptions", r#"["Tacos","Pizza","Sushi"]"#)],
            &[],
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let options = post["pollOptions"].as_array().unwrap().clone();
    assert_eq!(options.len(), 3);
    let uri = format!("/api/posts/{}/vote", post_id(&post));

    let (_, voted) = send(
        &app,
        json_request(Method::PUT, &uri, Some(token.as_str()), Some(json!({"optionId": options[0]["_id"]}))),
    )
    .await;
    assert_eq!(voted["pollOptions"][0]["votes"], json!([user_id]));

    let (_, moved) = send(
        &app,
        json_request(Method::PUT, &uri, Some(token.as_str()), Some(json!({"optionId": options[2]["_id"]}))),
    )
    .await;
    assert_eq!(moved["pollOptions"][0]["votes"], json!([]));
    assert_eq!(moved["pollOptions"][1]["votes"], json!([]));
    assert_eq!(moved["pollOptions"][2]["votes"], json!([user_id]));

    // Voting for the same option again leaves the single vote in place
    let (_, again) = send(
        &app,
        json_request(Method::PUT, &uri, Some(token.as_str()), Some(json!({"optionId": options[2]["_id"]}))),
    )
    .await;
    assert_eq!(again["pollOptions"][2]["votes"], json!([user_id]));
}

#[tokio::test]
async fn test_vote_for_option_of_other_post_is_not_found() {
    let (app, _) = common::create_test_app();
    let (token, _) = common::signup(&app, "Ada", "ada@example.com").await;

    let poll_fields = [("pollOptions", r#"["A","B"]"#)];
    let (_, first) = send(
        &app,
        multipart_request(Method::POST, "/api/posts", &token, &poll_fields, &[]),
    )
    .await;
    let (_, second) = send(
        &app,
        multipart_request(Method::POST, "/api/posts", &token, &poll_fields, &[]),
    )
    .await;

    let uri = format!("/api/posts/{}/vote", post_id(&first));
    let foreign_option = second["pollOptions"][0]["_id"].clone();
    let (status, _) = send(
        &app,
        json_request(Method::PUT, &uri, Some(token.as_str()), Some(json!({"optionId": foreign_option}))),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_only_author_can_delete() {
    let (app, _) = common::create_test_app();
    let (ada, _) = common::signup(&app, "Ada", "ada@example.com").await;
    let (bob, _) = common::signup(&app, "Bob", "bob@example.com").await;

    let post = create_text_post(&app, &ada, "mine").await;
    let uri = format!("/api/posts/{}", post_id(&post));

    let (status, body) = send(&app, json_request(Method::DELETE, &uri, Some(bob.as_str()), None)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "Not authorized to delete this post");

    let (status, body) = send(&app, json_request(Method::DELETE, &uri, Some(ada.as_str()), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Post deleted successfully");

    let (status, _) = send(&app, json_request(Method::DELETE, &uri, Some(ada.as_str()), None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    assert_eq!(list(&app, &ada, "").await, json!([]));
}

#[tokio::test]
async fn test_image_post_is_served_and_removed_on_delete() {
    let (app, state) = common::create_test_app();
    let (token, _) = common::signup(&app, "Ada", "ada@example.com").await;

    let (status, post) = send(
        &app,
        multipart_request(
            Method::POST,
            "/api/posts",
            &token,
            &[],
            &[FilePart {
                field: "image",
                file_name: "sunset.PNG",
                bytes: b"not really a png",
            }],
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let image_url = post["imageUrl"].as_str().unwrap().to_string();
    assert!(image_url.starts_with("/uploads/"));
    assert!(image_url.ends_with(".png"));

    let response = tower::ServiceExt::oneshot(
        app.clone(),
        Request::builder()
            .uri(&image_url)
            .body(Body::empty())
            .unwrap(),
    )
    .await
    .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response
            .headers()
            .get("Cross-Origin-Resource-Policy")
            .unwrap(),
        "cross-origin"
    );
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(&bytes[..], b"not really a png");

    let file_name = image_url.trim_start_matches("/uploads/");
    let stored = state.config.upload_dir.join(file_name);
    assert!(stored.exists());

    let uri = format!("/api/posts/{}", post_id(&post));
    let (status, _) = send(&app, json_request(Method::DELETE, &uri, Some(token.as_str()), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(!stored.exists());
}

#[tokio::test]
async fn test_author_filter_lists_one_user() {
    let (app, _) = common::create_test_app();
    let (ada, ada_id) = common::signup(&app, "Ada", "ada@example.com").await;
    let (bob, _) = common::signup(&app, "Bob", "bob@example.com").await;

    create_text_post(&app, &ada, "from ada").await;
    create_text_post(&app, &bob, "from bob").await;

    let only_ada = list(&app, &bob, &format!("?userId={}", ada_id)).await;
    assert_eq!(texts(&only_ada), vec!["from ada"]);
}
