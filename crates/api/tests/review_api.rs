//! HTTP-level integration tests for reviews and comments.

mod common;

use axum::http::StatusCode;
use axum::Router;
use common::{
    body_json, delete_auth, get, patch_json_auth, post_json, post_json_auth, put_json_auth,
    user_token,
};
use serde_json::json;
use sqlx::PgPool;
use yamdb_core::roles::Role;
use yamdb_db::models::title::CreateTitle;
use yamdb_db::repositories::TitleRepo;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn insert_title(pool: &PgPool, name: &str) -> i64 {
    TitleRepo::create(
        pool,
        &CreateTitle {
            name: name.to_string(),
            year: 1972,
            description: None,
            category_id: None,
            genre_ids: vec![],
        },
    )
    .await
    .unwrap()
}

async fn post_review(app: Router, title_id: i64, score: i16, token: &str) -> i64 {
    let response = post_json_auth(
        app,
        &format!("/api/v1/titles/{title_id}/reviews"),
        json!({ "text": "Worth watching", "score": score }),
        token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["data"]["id"].as_i64().unwrap()
}

async fn post_comment(app: Router, title_id: i64, review_id: i64, token: &str) -> i64 {
    let response = post_json_auth(
        app,
        &format!("/api/v1/titles/{title_id}/reviews/{review_id}/comments"),
        json!({ "text": "Agreed" }),
        token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["data"]["id"].as_i64().unwrap()
}

// ---------------------------------------------------------------------------
// Reviews
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_create_and_read_review(pool: PgPool) {
    let title_id = insert_title(&pool, "Solaris").await;
    let token = user_token(&pool, "alice", Role::User).await;
    let app = common::build_test_app(pool);

    let review_id = post_review(app.clone(), title_id, 9, &token).await;

    let response = get(
        app.clone(),
        &format!("/api/v1/titles/{title_id}/reviews/{review_id}"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["author"], "alice");
    assert_eq!(json["data"]["score"], 9);
    assert!(json["data"]["pub_date"].is_string());
    assert!(json["data"].get("author_id").is_none());

    let response = get(app, &format!("/api/v1/titles/{title_id}/reviews")).await;
    let json = body_json(response).await;
    assert_eq!(json["total"], 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_score_defaults_to_five(pool: PgPool) {
    let title_id = insert_title(&pool, "Solaris").await;
    let token = user_token(&pool, "alice", Role::User).await;
    let app = common::build_test_app(pool);

    let response = post_json_auth(
        app,
        &format!("/api/v1/titles/{title_id}/reviews"),
        json!({ "text": "Fine" }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(body_json(response).await["data"]["score"], 5);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_second_review_by_same_author_returns_400(pool: PgPool) {
    let title_id = insert_title(&pool, "Mirror").await;
    let token = user_token(&pool, "alice", Role::User).await;
    let app = common::build_test_app(pool);

    post_review(app.clone(), title_id, 7, &token).await;

    let response = post_json_auth(
        app,
        &format!("/api/v1/titles/{title_id}/reviews"),
        json!({ "text": "Changed my mind", "score": 3 }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");
    assert_eq!(json["error"], "You have already reviewed this title");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_score_out_of_range_returns_400(pool: PgPool) {
    let title_id = insert_title(&pool, "Mirror").await;
    let token = user_token(&pool, "alice", Role::User).await;
    let app = common::build_test_app(pool);

    for score in [0, 11] {
        let response = post_json_auth(
            app.clone(),
            &format!("/api/v1/titles/{title_id}/reviews"),
            json!({ "text": "Hmm", "score": score }),
            &token,
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "score {score}");
    }
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_review_requires_authentication(pool: PgPool) {
    let title_id = insert_title(&pool, "Mirror").await;
    let app = common::build_test_app(pool);

    let response = post_json(
        app,
        &format!("/api/v1/titles/{title_id}/reviews"),
        json!({ "text": "Anonymous", "score": 5 }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_reviews_of_missing_title_return_404(pool: PgPool) {
    let token = user_token(&pool, "alice", Role::User).await;
    let app = common::build_test_app(pool);

    let response = get(app.clone(), "/api/v1/titles/999999/reviews").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = post_json_auth(
        app,
        "/api/v1/titles/999999/reviews",
        json!({ "text": "Ghost", "score": 5 }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_rating_is_truncated_mean(pool: PgPool) {
    let title_id = insert_title(&pool, "Andrei Rublev").await;
    let alice = user_token(&pool, "alice", Role::User).await;
    let bob = user_token(&pool, "bob", Role::User).await;
    let app = common::build_test_app(pool);

    let response = get(app.clone(), &format!("/api/v1/titles/{title_id}")).await;
    assert!(body_json(response).await["data"]["rating"].is_null());

    post_review(app.clone(), title_id, 10, &alice).await;
    post_review(app.clone(), title_id, 7, &bob).await;

    let response = get(app, &format!("/api/v1/titles/{title_id}")).await;
    assert_eq!(body_json(response).await["data"]["rating"], 8);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_only_author_or_staff_can_modify_review(pool: PgPool) {
    let title_id = insert_title(&pool, "Stalker").await;
    let author = user_token(&pool, "alice", Role::User).await;
    let stranger = user_token(&pool, "bob", Role::User).await;
    let moderator = user_token(&pool, "mod", Role::Moderator).await;
    let admin = user_token(&pool, "boss", Role::Admin).await;
    let app = common::build_test_app(pool);

    let review_id = post_review(app.clone(), title_id, 6, &author).await;
    let uri = format!("/api/v1/titles/{title_id}/reviews/{review_id}");

    let response = patch_json_auth(app.clone(), &uri, json!({ "score": 1 }), &stranger).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = patch_json_auth(app.clone(), &uri, json!({ "score": 8 }), &author).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["score"], 8);
    assert_eq!(json["data"]["text"], "Worth watching");

    let response = put_json_auth(app.clone(), &uri, json!({ "text": "Edited" }), &moderator).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["author"], "alice");

    let response = delete_auth(app.clone(), &uri, &stranger).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = delete_auth(app.clone(), &uri, &admin).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = get(app, &uri).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_review_not_reachable_through_other_title(pool: PgPool) {
    let first = insert_title(&pool, "First").await;
    let second = insert_title(&pool, "Second").await;
    let token = user_token(&pool, "alice", Role::User).await;
    let app = common::build_test_app(pool);

    let review_id = post_review(app.clone(), first, 5, &token).await;

    let response = get(app, &format!("/api/v1/titles/{second}/reviews/{review_id}")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Comments
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_comment_lifecycle(pool: PgPool) {
    let title_id = insert_title(&pool, "Solaris").await;
    let alice = user_token(&pool, "alice", Role::User).await;
    let bob = user_token(&pool, "bob", Role::User).await;
    let moderator = user_token(&pool, "mod", Role::Moderator).await;
    let app = common::build_test_app(pool);

    let review_id = post_review(app.clone(), title_id, 9, &alice).await;
    let comment_id = post_comment(app.clone(), title_id, review_id, &bob).await;
    let base = format!("/api/v1/titles/{title_id}/reviews/{review_id}/comments");
    let uri = format!("{base}/{comment_id}");

    let response = get(app.clone(), &base).await;
    let json = body_json(response).await;
    assert_eq!(json["total"], 1);
    assert_eq!(json["data"][0]["author"], "bob");
    assert_eq!(json["data"][0]["text"], "Agreed");

    let response = patch_json_auth(app.clone(), &uri, json!({ "text": "Hijacked" }), &alice).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = patch_json_auth(app.clone(), &uri, json!({ "text": "Strongly agreed" }), &bob).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["text"], "Strongly agreed");

    let response = delete_auth(app.clone(), &uri, &moderator).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = get(app, &uri).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_blank_comment_returns_400(pool: PgPool) {
    let title_id = insert_title(&pool, "Solaris").await;
    let alice = user_token(&pool, "alice", Role::User).await;
    let app = common::build_test_app(pool);
    let review_id = post_review(app.clone(), title_id, 9, &alice).await;

    let response = post_json_auth(
        app,
        &format!("/api/v1/titles/{title_id}/reviews/{review_id}/comments"),
        json!({ "text": "   " }),
        &alice,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_deleting_title_removes_reviews_and_comments(pool: PgPool) {
    let title_id = insert_title(&pool, "Solaris").await;
    let alice = user_token(&pool, "alice", Role::User).await;
    let admin = user_token(&pool, "boss", Role::Admin).await;
    let app = common::build_test_app(pool.clone());

    let review_id = post_review(app.clone(), title_id, 9, &alice).await;
    post_comment(app.clone(), title_id, review_id, &alice).await;

    let response = delete_auth(app.clone(), &format!("/api/v1/titles/{title_id}"), &admin).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let (reviews,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM reviews")
        .fetch_one(&pool)
        .await
        .unwrap();
    let (comments,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM comments")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!((reviews, comments), (0, 0));

    let response = get(app, &format!("/api/v1/titles/{title_id}/reviews")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
