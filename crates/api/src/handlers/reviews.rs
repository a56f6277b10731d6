//! Handlers for reviews nested under `/titles/{title_id}/reviews`.
//!
//! Anyone may read. Any authenticated user may post one review per title.
//! Edits and deletes are limited to the author, moderators and admins.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use validator::Validate;
use yamdb_core::error::CoreError;
use yamdb_core::permissions::can_modify_content;
use yamdb_core::types::DbId;
use yamdb_core::validation::{validate_not_blank, validate_score, DEFAULT_SCORE};
use yamdb_db::models::review::{CreateReview, Review, UpdateReview};
use yamdb_db::repositories::{ReviewRepo, TitleRepo};

use crate::error::{AppError, AppResult};
use crate::extract::{Path, Query, ValidatedJson};
use crate::middleware::auth::AuthUser;
use crate::query::PaginationParams;
use crate::response::{DataResponse, PageResponse};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// Request body for `POST /titles/{title_id}/reviews`.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateReviewRequest {
    #[validate(custom(function = "validate_not_blank"))]
    pub text: String,
    /// Defaults to [`DEFAULT_SCORE`].
    #[validate(custom(function = "validate_score"))]
    pub score: Option<i16>,
}

/// Request body for `PATCH` / `PUT` on a review.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateReviewRequest {
    #[validate(custom(function = "validate_not_blank"))]
    pub text: Option<String>,
    #[validate(custom(function = "validate_score"))]
    pub score: Option<i16>,
}

// ---------------------------------------------------------------------------
// Lookups
// ---------------------------------------------------------------------------

pub(crate) async fn ensure_title(state: &AppState, title_id: DbId) -> AppResult<()> {
    if !TitleRepo::exists(&state.pool, title_id).await? {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Title",
            id: title_id,
        }));
    }
    Ok(())
}

/// Load a review that belongs to `title_id`.
pub(crate) async fn load_review(
    state: &AppState,
    title_id: DbId,
    review_id: DbId,
) -> AppResult<Review> {
    ensure_title(state, title_id).await?;
    ReviewRepo::find(&state.pool, title_id, review_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Review",
            id: review_id,
        }))
}

/// Load a review and check the caller may change it.
async fn load_review_for_edit(
    state: &AppState,
    auth: &AuthUser,
    title_id: DbId,
    review_id: DbId,
) -> AppResult<Review> {
    let review = load_review(state, title_id, review_id).await?;
    if !can_modify_content(&auth.actor, review.author_id) {
        return Err(AppError::Core(CoreError::Forbidden(
            "Only the author, a moderator or an admin can change this review".into(),
        )));
    }
    Ok(review)
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/v1/titles/{title_id}/reviews
pub async fn list_reviews(
    State(state): State<AppState>,
    Path(title_id): Path<DbId>,
    Query(params): Query<PaginationParams>,
) -> AppResult<impl IntoResponse> {
    ensure_title(&state, title_id).await?;

    let (limit, offset) = params.resolve();
    let data = ReviewRepo::list_for_title(&state.pool, title_id, limit, offset).await?;
    let total = ReviewRepo::count_for_title(&state.pool, title_id).await?;

    Ok(Json(PageResponse {
        data,
        total,
        limit,
        offset,
    }))
}

/// POST /api/v1/titles/{title_id}/reviews
///
/// A second review of the same title by the same author is a validation
/// error. The unique constraint backs this check under concurrency.
pub async fn create_review(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(title_id): Path<DbId>,
    ValidatedJson(input): ValidatedJson<CreateReviewRequest>,
) -> AppResult<impl IntoResponse> {
    ensure_title(&state, title_id).await?;

    if ReviewRepo::exists_for_author(&state.pool, title_id, auth.user_id).await? {
        return Err(AppError::Core(CoreError::Validation(
            "You have already reviewed this title".into(),
        )));
    }

    let review = ReviewRepo::create(
        &state.pool,
        &CreateReview {
            title_id,
            author_id: auth.user_id,
            text: input.text,
            score: input.score.unwrap_or(DEFAULT_SCORE),
        },
    )
    .await?;

    tracing::info!(review_id = review.id, title_id, user_id = auth.user_id, "Review created");

    Ok((StatusCode::CREATED, Json(DataResponse { data: review })))
}

/// GET /api/v1/titles/{title_id}/reviews/{review_id}
pub async fn get_review(
    State(state): State<AppState>,
    Path((title_id, review_id)): Path<(DbId, DbId)>,
) -> AppResult<impl IntoResponse> {
    let review = load_review(&state, title_id, review_id).await?;
    Ok(Json(DataResponse { data: review }))
}

/// PATCH /api/v1/titles/{title_id}/reviews/{review_id}
///
/// Also mounted for `PUT`, with the same partial semantics.
pub async fn update_review(
    auth: AuthUser,
    State(state): State<AppState>,
    Path((title_id, review_id)): Path<(DbId, DbId)>,
    ValidatedJson(input): ValidatedJson<UpdateReviewRequest>,
) -> AppResult<impl IntoResponse> {
    load_review_for_edit(&state, &auth, title_id, review_id).await?;

    let review = ReviewRepo::update(
        &state.pool,
        review_id,
        &UpdateReview {
            text: input.text,
            score: input.score,
        },
    )
    .await?
    .ok_or(AppError::Core(CoreError::NotFound {
        entity: "Review",
        id: review_id,
    }))?;

    tracing::info!(review_id, user_id = auth.user_id, "Review updated");

    Ok(Json(DataResponse { data: review }))
}

/// DELETE /api/v1/titles/{title_id}/reviews/{review_id}
pub async fn delete_review(
    auth: AuthUser,
    State(state): State<AppState>,
    Path((title_id, review_id)): Path<(DbId, DbId)>,
) -> AppResult<impl IntoResponse> {
    load_review_for_edit(&state, &auth, title_id, review_id).await?;
    ReviewRepo::delete(&state.pool, review_id).await?;

    tracing::info!(review_id, user_id = auth.user_id, "Review deleted");

    Ok(StatusCode::NO_CONTENT)
}
