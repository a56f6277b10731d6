//! Handlers for the `/genres` resource.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use yamdb_core::error::CoreError;
use yamdb_db::models::genre::CreateGenre;
use yamdb_db::repositories::GenreRepo;

use super::categories::TermRequest;
use crate::error::{AppError, AppResult};
use crate::extract::{Path, Query, ValidatedJson};
use crate::middleware::rbac::RequireCatalogAdmin;
use crate::query::SearchParams;
use crate::response::{DataResponse, PageResponse};
use crate::state::AppState;

/// GET /api/v1/genres
pub async fn list_genres(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> AppResult<impl IntoResponse> {
    let (limit, offset) = params.resolve();
    let data = GenreRepo::list(&state.pool, params.term(), limit, offset).await?;
    let total = GenreRepo::count(&state.pool, params.term()).await?;

    Ok(Json(PageResponse {
        data,
        total,
        limit,
        offset,
    }))
}

/// POST /api/v1/genres
pub async fn create_genre(
    RequireCatalogAdmin(admin): RequireCatalogAdmin,
    State(state): State<AppState>,
    ValidatedJson(input): ValidatedJson<TermRequest>,
) -> AppResult<impl IntoResponse> {
    let slug = input.resolve_slug()?;
    let genre = GenreRepo::create(
        &state.pool,
        &CreateGenre {
            name: input.name.trim().to_string(),
            slug,
        },
    )
    .await?;

    tracing::info!(slug = %genre.slug, user_id = admin.user_id, "Genre created");

    Ok((StatusCode::CREATED, Json(DataResponse { data: genre })))
}

/// DELETE /api/v1/genres/{slug}
///
/// The genre is unlinked from every title.
pub async fn delete_genre(
    RequireCatalogAdmin(admin): RequireCatalogAdmin,
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> AppResult<impl IntoResponse> {
    let deleted = GenreRepo::delete_by_slug(&state.pool, &slug).await?;

    if !deleted {
        return Err(AppError::Core(CoreError::NotFoundByKey {
            entity: "Genre",
            key: slug,
        }));
    }

    tracing::info!(%slug, user_id = admin.user_id, "Genre deleted");

    Ok(StatusCode::NO_CONTENT)
}
