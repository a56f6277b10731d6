//! Handlers for comments nested under
//! `/titles/{title_id}/reviews/{review_id}/comments`.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use validator::Validate;
use yamdb_core::error::CoreError;
use yamdb_core::permissions::can_modify_content;
use yamdb_core::types::DbId;
use yamdb_core::validation::validate_not_blank;
use yamdb_db::models::comment::{Comment, CreateComment};
use yamdb_db::repositories::CommentRepo;

use super::reviews::load_review;
use crate::error::{AppError, AppResult};
use crate::extract::{Path, Query, ValidatedJson};
use crate::middleware::auth::AuthUser;
use crate::query::PaginationParams;
use crate::response::{DataResponse, PageResponse};
use crate::state::AppState;

/// Request body for `POST .../comments`.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateCommentRequest {
    #[validate(custom(function = "validate_not_blank"))]
    pub text: String,
}

/// Request body for `PATCH` / `PUT` on a comment.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateCommentRequest {
    #[validate(custom(function = "validate_not_blank"))]
    pub text: Option<String>,
}

/// Load a comment that belongs to `review_id`, itself under `title_id`.
async fn load_comment(
    state: &AppState,
    title_id: DbId,
    review_id: DbId,
    comment_id: DbId,
) -> AppResult<Comment> {
    load_review(state, title_id, review_id).await?;
    CommentRepo::find(&state.pool, review_id, comment_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Comment",
            id: comment_id,
        }))
}

async fn load_comment_for_edit(
    state: &AppState,
    auth: &AuthUser,
    (title_id, review_id, comment_id): (DbId, DbId, DbId),
) -> AppResult<Comment> {
    let comment = load_comment(state, title_id, review_id, comment_id).await?;
    if !can_modify_content(&auth.actor, comment.author_id) {
        return Err(AppError::Core(CoreError::Forbidden(
            "Only the author, a moderator or an admin can change this comment".into(),
        )));
    }
    Ok(comment)
}

/// GET /api/v1/titles/{title_id}/reviews/{review_id}/comments
pub async fn list_comments(
    State(state): State<AppState>,
    Path((title_id, review_id)): Path<(DbId, DbId)>,
    Query(params): Query<PaginationParams>,
) -> AppResult<impl IntoResponse> {
    load_review(&state, title_id, review_id).await?;

    let (limit, offset) = params.resolve();
    let data = CommentRepo::list_for_review(&state.pool, review_id, limit, offset).await?;
    let total = CommentRepo::count_for_review(&state.pool, review_id).await?;

    Ok(Json(PageResponse {
        data,
        total,
        limit,
        offset,
    }))
}

/// POST /api/v1/titles/{title_id}/reviews/{review_id}/comments
pub async fn create_comment(
    auth: AuthUser,
    State(state): State<AppState>,
    Path((title_id, review_id)): Path<(DbId, DbId)>,
    ValidatedJson(input): ValidatedJson<CreateCommentRequest>,
) -> AppResult<impl IntoResponse> {
    load_review(&state, title_id, review_id).await?;

    let comment = CommentRepo::create(
        &state.pool,
        &CreateComment {
            review_id,
            author_id: auth.user_id,
            text: input.text,
        },
    )
    .await?;

    tracing::info!(comment_id = comment.id, review_id, user_id = auth.user_id, "Comment created");

    Ok((StatusCode::CREATED, Json(DataResponse { data: comment })))
}

/// GET /api/v1/titles/{title_id}/reviews/{review_id}/comments/{comment_id}
pub async fn get_comment(
    State(state): State<AppState>,
    Path((title_id, review_id, comment_id)): Path<(DbId, DbId, DbId)>,
) -> AppResult<impl IntoResponse> {
    let comment = load_comment(&state, title_id, review_id, comment_id).await?;
    Ok(Json(DataResponse { data: comment }))
}

/// PATCH /api/v1/titles/{title_id}/reviews/{review_id}/comments/{comment_id}
///
/// Also mounted for `PUT`.
pub async fn update_comment(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(ids): Path<(DbId, DbId, DbId)>,
    ValidatedJson(input): ValidatedJson<UpdateCommentRequest>,
) -> AppResult<impl IntoResponse> {
    let comment = load_comment_for_edit(&state, &auth, ids).await?;

    let Some(text) = input.text else {
        return Ok(Json(DataResponse { data: comment }));
    };

    let updated = CommentRepo::update_text(&state.pool, comment.id, &text)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Comment",
            id: comment.id,
        }))?;

    tracing::info!(comment_id = updated.id, user_id = auth.user_id, "Comment updated");

    Ok(Json(DataResponse { data: updated }))
}

/// DELETE /api/v1/titles/{title_id}/reviews/{review_id}/comments/{comment_id}
pub async fn delete_comment(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(ids): Path<(DbId, DbId, DbId)>,
) -> AppResult<impl IntoResponse> {
    let comment = load_comment_for_edit(&state, &auth, ids).await?;
    CommentRepo::delete(&state.pool, comment.id).await?;

    tracing::info!(comment_id = comment.id, user_id = auth.user_id, "Comment deleted");

    Ok(StatusCode::NO_CONTENT)
}
