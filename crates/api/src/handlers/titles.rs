//! Handlers for the `/titles` resource.
//!
//! Request bodies name genres and the category by slug; responses embed them
//! as `{name, slug}` objects together with the computed `rating`.

use std::collections::BTreeSet;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use validator::Validate;
use yamdb_core::error::CoreError;
use yamdb_core::types::DbId;
use yamdb_core::validation::{validate_not_blank, validate_year, MAX_NAME_LENGTH};
use yamdb_db::models::title::{CreateTitle, TitleListParams, TitleResponse, UpdateTitle};
use yamdb_db::repositories::{CategoryRepo, GenreRepo, TitleRepo};

use crate::error::{AppError, AppResult};
use crate::extract::{Path, Query, ValidatedJson};
use crate::middleware::rbac::RequireCatalogAdmin;
use crate::nullable::nullable;
use crate::query::page_bounds;
use crate::response::{DataResponse, PageResponse};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// Request body for `POST /titles`.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateTitleRequest {
    #[validate(
        length(min = 1, max = MAX_NAME_LENGTH),
        custom(function = "validate_not_blank")
    )]
    pub name: String,
    #[validate(custom(function = "validate_year"))]
    pub year: i32,
    pub description: Option<String>,
    /// Genre slugs.
    #[serde(default)]
    pub genre: Vec<String>,
    /// Category slug.
    pub category: Option<String>,
}

/// Request body for `PATCH` / `PUT /titles/{id}`. Absent fields are kept,
/// `null` clears a nullable field, and `genre` replaces the whole set.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateTitleRequest {
    #[validate(
        length(min = 1, max = MAX_NAME_LENGTH),
        custom(function = "validate_not_blank")
    )]
    pub name: Option<String>,
    #[validate(custom(function = "validate_year"))]
    pub year: Option<i32>,
    #[serde(default, deserialize_with = "nullable")]
    pub description: Option<Option<String>>,
    pub genre: Option<Vec<String>>,
    /// Category slug; `null` detaches the title from its category.
    #[serde(default, deserialize_with = "nullable")]
    pub category: Option<Option<String>>,
}

// ---------------------------------------------------------------------------
// Slug resolution
// ---------------------------------------------------------------------------

/// Map genre slugs to ids. Every slug must exist.
async fn resolve_genres(state: &AppState, slugs: &[String]) -> AppResult<Vec<DbId>> {
    let wanted: BTreeSet<&str> = slugs.iter().map(String::as_str).collect();
    if wanted.is_empty() {
        return Ok(Vec::new());
    }

    let unique: Vec<String> = wanted.iter().map(|s| s.to_string()).collect();
    let found = GenreRepo::find_by_slugs(&state.pool, &unique).await?;

    let missing: Vec<&str> = wanted
        .iter()
        .copied()
        .filter(|slug| !found.iter().any(|g| g.slug == *slug))
        .collect();
    if !missing.is_empty() {
        return Err(AppError::Core(CoreError::Validation(format!(
            "genre: unknown slug(s): {}",
            missing.join(", ")
        ))));
    }

    Ok(found.into_iter().map(|g| g.id).collect())
}

/// Map a category slug to its id.
async fn resolve_category(state: &AppState, slug: &str) -> AppResult<DbId> {
    CategoryRepo::find_by_slug(&state.pool, slug)
        .await?
        .map(|c| c.id)
        .ok_or_else(|| {
            AppError::Core(CoreError::Validation(format!(
                "category: unknown slug: {slug}"
            )))
        })
}

async fn load_title(state: &AppState, id: DbId) -> AppResult<TitleResponse> {
    TitleRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Title", id }))
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/v1/titles
///
/// Filters: `genre` and `category` (slug contains), `name` (contains),
/// `year` (exact). Ordered by id.
pub async fn list_titles(
    State(state): State<AppState>,
    Query(params): Query<TitleListParams>,
) -> AppResult<impl IntoResponse> {
    let (limit, offset) = page_bounds(params.limit, params.offset);
    let data = TitleRepo::list(&state.pool, &params, limit, offset).await?;
    let total = TitleRepo::count(&state.pool, &params).await?;

    Ok(Json(PageResponse {
        data,
        total,
        limit,
        offset,
    }))
}

/// POST /api/v1/titles
pub async fn create_title(
    RequireCatalogAdmin(admin): RequireCatalogAdmin,
    State(state): State<AppState>,
    ValidatedJson(input): ValidatedJson<CreateTitleRequest>,
) -> AppResult<impl IntoResponse> {
    let genre_ids = resolve_genres(&state, &input.genre).await?;
    let category_id = match &input.category {
        Some(slug) => Some(resolve_category(&state, slug).await?),
        None => None,
    };

    let id = TitleRepo::create(
        &state.pool,
        &CreateTitle {
            name: input.name.trim().to_string(),
            year: input.year,
            description: input.description,
            category_id,
            genre_ids,
        },
    )
    .await?;

    tracing::info!(title_id = id, user_id = admin.user_id, "Title created");

    let title = load_title(&state, id).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: title })))
}

/// GET /api/v1/titles/{id}
pub async fn get_title(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let title = load_title(&state, id).await?;
    Ok(Json(DataResponse { data: title }))
}

/// PATCH /api/v1/titles/{id}
///
/// Also mounted for `PUT`, with the same partial semantics.
pub async fn update_title(
    RequireCatalogAdmin(admin): RequireCatalogAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    ValidatedJson(input): ValidatedJson<UpdateTitleRequest>,
) -> AppResult<impl IntoResponse> {
    let genre_ids = match &input.genre {
        Some(slugs) => Some(resolve_genres(&state, slugs).await?),
        None => None,
    };
    let category_id = match &input.category {
        Some(Some(slug)) => Some(Some(resolve_category(&state, slug).await?)),
        Some(None) => Some(None),
        None => None,
    };

    let updated = TitleRepo::update(
        &state.pool,
        id,
        &UpdateTitle {
            name: input.name.map(|n| n.trim().to_string()),
            year: input.year,
            description: input.description,
            category_id,
            genre_ids,
        },
    )
    .await?;

    if !updated {
        return Err(AppError::Core(CoreError::NotFound { entity: "Title", id }));
    }

    tracing::info!(title_id = id, user_id = admin.user_id, "Title updated");

    let title = load_title(&state, id).await?;
    Ok(Json(DataResponse { data: title }))
}

/// DELETE /api/v1/titles/{id}
///
/// Reviews and their comments are deleted with the title.
pub async fn delete_title(
    RequireCatalogAdmin(admin): RequireCatalogAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let deleted = TitleRepo::delete(&state.pool, id).await?;

    if !deleted {
        return Err(AppError::Core(CoreError::NotFound { entity: "Title", id }));
    }

    tracing::info!(title_id = id, user_id = admin.user_id, "Title deleted");

    Ok(StatusCode::NO_CONTENT)
}
