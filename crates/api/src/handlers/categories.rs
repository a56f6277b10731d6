//! Handlers for the `/categories` resource.
//!
//! Reads are public; writes need [`RequireCatalogAdmin`].

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use validator::Validate;
use yamdb_core::error::CoreError;
use yamdb_core::slug::slugify;
use yamdb_core::validation::{validate_not_blank, validate_slug, MAX_NAME_LENGTH, MAX_SLUG_LENGTH};
use yamdb_db::models::category::CreateCategory;
use yamdb_db::repositories::CategoryRepo;

use crate::error::{AppError, AppResult};
use crate::extract::{Path, Query, ValidatedJson};
use crate::middleware::rbac::RequireCatalogAdmin;
use crate::query::SearchParams;
use crate::response::{DataResponse, PageResponse};
use crate::state::AppState;

/// Request body for creating a category or a genre.
#[derive(Debug, Deserialize, Validate)]
pub struct TermRequest {
    #[validate(
        length(min = 1, max = MAX_NAME_LENGTH),
        custom(function = "validate_not_blank")
    )]
    pub name: String,
    /// Derived from `name` when omitted.
    #[validate(length(min = 1, max = MAX_SLUG_LENGTH), custom(function = "validate_slug"))]
    pub slug: Option<String>,
}

impl TermRequest {
    /// The explicit slug, or one generated from the name.
    pub fn resolve_slug(&self) -> AppResult<String> {
        if let Some(slug) = &self.slug {
            return Ok(slug.clone());
        }
        let slug = slugify(&self.name);
        if slug.is_empty() {
            return Err(AppError::Core(CoreError::Validation(
                "slug: could not be derived from name, provide one explicitly".into(),
            )));
        }
        Ok(slug)
    }
}

/// GET /api/v1/categories
pub async fn list_categories(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> AppResult<impl IntoResponse> {
    let (limit, offset) = params.resolve();
    let data = CategoryRepo::list(&state.pool, params.term(), limit, offset).await?;
    let total = CategoryRepo::count(&state.pool, params.term()).await?;

    Ok(Json(PageResponse {
        data,
        total,
        limit,
        offset,
    }))
}

/// POST /api/v1/categories
pub async fn create_category(
    RequireCatalogAdmin(admin): RequireCatalogAdmin,
    State(state): State<AppState>,
    ValidatedJson(input): ValidatedJson<TermRequest>,
) -> AppResult<impl IntoResponse> {
    let slug = input.resolve_slug()?;
    let category = CategoryRepo::create(
        &state.pool,
        &CreateCategory {
            name: input.name.trim().to_string(),
            slug,
        },
    )
    .await?;

    tracing::info!(slug = %category.slug, user_id = admin.user_id, "Category created");

    Ok((StatusCode::CREATED, Json(DataResponse { data: category })))
}

/// DELETE /api/v1/categories/{slug}
///
/// Titles in the category keep existing with no category.
pub async fn delete_category(
    RequireCatalogAdmin(admin): RequireCatalogAdmin,
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> AppResult<impl IntoResponse> {
    let deleted = CategoryRepo::delete_by_slug(&state.pool, &slug).await?;

    if !deleted {
        return Err(AppError::Core(CoreError::NotFoundByKey {
            entity: "Category",
            key: slug,
        }));
    }

    tracing::info!(%slug, user_id = admin.user_id, "Category deleted");

    Ok(StatusCode::NO_CONTENT)
}
