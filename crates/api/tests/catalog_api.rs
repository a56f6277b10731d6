//! HTTP-level integration tests for categories, genres and titles.

mod common;

use axum::http::StatusCode;
use axum::Router;
use chrono::Datelike;
use common::{
    body_json, delete_auth, get, patch_json_auth, post_json, post_json_auth, put_json_auth,
    user_token,
};
use serde_json::{json, Value};
use sqlx::PgPool;
use yamdb_core::roles::Role;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn create_term(app: Router, resource: &str, name: &str, slug: &str, token: &str) {
    let response = post_json_auth(
        app,
        &format!("/api/v1/{resource}"),
        json!({ "name": name, "slug": slug }),
        token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
}

async fn create_title(app: Router, body: Value, token: &str) -> Value {
    let response = post_json_auth(app, "/api/v1/titles", body, token).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["data"].clone()
}

/// Admin token plus a catalog with two categories and two genres.
async fn seeded_app(pool: &PgPool) -> (Router, String) {
    let admin = user_token(pool, "boss", Role::Admin).await;
    let app = common::build_test_app(pool.clone());
    create_term(app.clone(), "categories", "Films", "films", &admin).await;
    create_term(app.clone(), "categories", "Books", "books", &admin).await;
    create_term(app.clone(), "genres", "Drama", "drama", &admin).await;
    create_term(app.clone(), "genres", "Science fiction", "sci-fi", &admin).await;
    (app, admin)
}

// ---------------------------------------------------------------------------
// Categories and genres
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_list_categories_is_public_and_ordered(pool: PgPool) {
    let (app, _admin) = seeded_app(&pool).await;

    let response = get(app.clone(), "/api/v1/categories").await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["total"], 2);
    assert_eq!(json["data"][0], json!({ "name": "Books", "slug": "books" }));

    let response = get(app, "/api/v1/genres?search=fict").await;
    let json = body_json(response).await;
    assert_eq!(json["total"], 1);
    assert_eq!(json["data"][0]["slug"], "sci-fi");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_slug_generated_from_name(pool: PgPool) {
    let admin = user_token(&pool, "boss", Role::Admin).await;
    let app = common::build_test_app(pool);

    let response = post_json_auth(
        app,
        "/api/v1/genres",
        json!({ "name": "Film Noir" }),
        &admin,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(body_json(response).await["data"]["slug"], "film-noir");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_duplicate_slug_returns_400(pool: PgPool) {
    let (app, admin) = seeded_app(&pool).await;

    let response = post_json_auth(
        app,
        "/api/v1/categories",
        json!({ "name": "Movies", "slug": "films" }),
        &admin,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(response).await["error"],
        "A category with that slug already exists"
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_catalog_writes_require_admin(pool: PgPool) {
    let moderator = user_token(&pool, "mod", Role::Moderator).await;
    let app = common::build_test_app(pool);

    let anonymous = post_json(
        app.clone(),
        "/api/v1/categories",
        json!({ "name": "Music", "slug": "music" }),
    )
    .await;
    assert_eq!(anonymous.status(), StatusCode::UNAUTHORIZED);

    let response = post_json_auth(
        app.clone(),
        "/api/v1/categories",
        json!({ "name": "Music", "slug": "music" }),
        &moderator,
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = post_json_auth(
        app,
        "/api/v1/titles",
        json!({ "name": "Solaris", "year": 1972 }),
        &moderator,
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_delete_unknown_genre_returns_404(pool: PgPool) {
    let admin = user_token(&pool, "boss", Role::Admin).await;
    let app = common::build_test_app(pool);

    let response = delete_auth(app, "/api/v1/genres/nope", &admin).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Titles
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_create_title_with_slugs(pool: PgPool) {
    let (app, admin) = seeded_app(&pool).await;

    let title = create_title(
        app.clone(),
        json!({
            "name": "Solaris",
            "year": 1972,
            "description": "Ocean planet",
            "genre": ["drama", "sci-fi"],
            "category": "films"
        }),
        &admin,
    )
    .await;

    assert_eq!(title["name"], "Solaris");
    assert!(title["rating"].is_null());
    assert_eq!(title["category"], json!({ "name": "Films", "slug": "films" }));
    assert_eq!(title["genre"].as_array().unwrap().len(), 2);

    let id = title["id"].as_i64().unwrap();
    let response = get(app, &format!("/api/v1/titles/{id}")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["description"], "Ocean planet");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_unknown_genre_slug_returns_400(pool: PgPool) {
    let (app, admin) = seeded_app(&pool).await;

    let response = post_json_auth(
        app,
        "/api/v1/titles",
        json!({ "name": "Solaris", "year": 1972, "genre": ["drama", "western"] }),
        &admin,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let message = body_json(response).await["error"].as_str().unwrap().to_string();
    assert!(message.contains("western"), "got: {message}");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_year_too_far_ahead_returns_400(pool: PgPool) {
    let (app, admin) = seeded_app(&pool).await;
    let year = chrono::Utc::now().year() + 3;

    let response = post_json_auth(
        app,
        "/api/v1/titles",
        json!({ "name": "Later", "year": year }),
        &admin,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_title_filters(pool: PgPool) {
    let (app, admin) = seeded_app(&pool).await;
    create_title(
        app.clone(),
        json!({ "name": "Solaris", "year": 1972, "genre": ["sci-fi"], "category": "films" }),
        &admin,
    )
    .await;
    create_title(
        app.clone(),
        json!({ "name": "Solaris", "year": 1961, "genre": ["sci-fi"], "category": "books" }),
        &admin,
    )
    .await;
    create_title(
        app.clone(),
        json!({ "name": "Mirror", "year": 1975, "genre": ["drama"], "category": "films" }),
        &admin,
    )
    .await;

    let cases = [
        ("/api/v1/titles", 3),
        ("/api/v1/titles?category=films", 2),
        ("/api/v1/titles?genre=sci", 2),
        ("/api/v1/titles?name=mirr", 1),
        ("/api/v1/titles?year=1961", 1),
        ("/api/v1/titles?genre=sci-fi&category=films", 1),
    ];
    for (uri, expected) in cases {
        let response = get(app.clone(), uri).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["total"], expected, "{uri}");
    }

    let response = get(app, "/api/v1/titles?limit=2&offset=2").await;
    let json = body_json(response).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 1);
    assert_eq!(json["limit"], 2);
    assert_eq!(json["offset"], 2);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_partial_update_keeps_other_fields(pool: PgPool) {
    let (app, admin) = seeded_app(&pool).await;
    let title = create_title(
        app.clone(),
        json!({ "name": "Stalker", "year": 1979, "genre": ["drama"], "category": "films" }),
        &admin,
    )
    .await;
    let uri = format!("/api/v1/titles/{}", title["id"]);

    let response = patch_json_auth(app.clone(), &uri, json!({ "year": 1980 }), &admin).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["year"], 1980);
    assert_eq!(json["data"]["name"], "Stalker");
    assert_eq!(json["data"]["genre"][0]["slug"], "drama");

    let response = put_json_auth(app, &uri, json!({ "genre": ["sci-fi"] }), &admin).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["genre"], json!([{ "name": "Science fiction", "slug": "sci-fi" }]));
    assert_eq!(json["data"]["category"]["slug"], "films");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_null_clears_description_and_category(pool: PgPool) {
    let (app, admin) = seeded_app(&pool).await;
    let title = create_title(
        app.clone(),
        json!({
            "name": "Mirror",
            "year": 1975,
            "description": "Memories",
            "category": "films",
        }),
        &admin,
    )
    .await;
    let uri = format!("/api/v1/titles/{}", title["id"]);

    let response = patch_json_auth(
        app,
        &uri,
        json!({ "description": null, "category": null }),
        &admin,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert!(json["data"]["description"].is_null());
    assert!(json["data"]["category"].is_null());
    assert_eq!(json["data"]["name"], "Mirror");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_deleting_category_nulls_title_category(pool: PgPool) {
    let (app, admin) = seeded_app(&pool).await;
    let title = create_title(
        app.clone(),
        json!({ "name": "Nostalghia", "year": 1983, "category": "films" }),
        &admin,
    )
    .await;

    let response = delete_auth(app.clone(), "/api/v1/categories/films", &admin).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = get(app, &format!("/api/v1/titles/{}", title["id"])).await;
    assert!(body_json(response).await["data"]["category"].is_null());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_missing_title_returns_404(pool: PgPool) {
    let app = common::build_test_app(pool);

    let response = get(app, "/api/v1/titles/999999").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_malformed_query_returns_json_400(pool: PgPool) {
    let app = common::build_test_app(pool);

    let response = get(app, "/api/v1/titles?year=abc").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "BAD_REQUEST");
    assert!(json["error"].as_str().unwrap().contains("year"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_non_numeric_id_returns_json_400(pool: PgPool) {
    let app = common::build_test_app(pool);

    for uri in ["/api/v1/titles/abc", "/api/v1/titles/1/reviews/abc"] {
        let response = get(app.clone(), uri).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(body_json(response).await["code"], "BAD_REQUEST", "{uri}");
    }
}
