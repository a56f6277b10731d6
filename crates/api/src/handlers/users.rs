//! Handlers for the `/users` resource.
//!
//! Account management is admin-only; `/users/me` lets any authenticated user
//! read and edit their own profile, except for the role.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use validator::Validate;
use yamdb_core::error::CoreError;
use yamdb_core::roles::Role;
use yamdb_core::validation::{
    normalize_email, validate_username, MAX_BIO_LENGTH, MAX_EMAIL_LENGTH, MAX_PERSON_NAME_LENGTH,
    MAX_USERNAME_LENGTH,
};
use yamdb_db::models::user::{CreateUser, UpdateUser, User, UserResponse};
use yamdb_db::repositories::UserRepo;

use crate::error::{AppError, AppResult};
use crate::extract::{Path, Query, ValidatedJson};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireAdmin;
use crate::nullable::nullable;
use crate::query::SearchParams;
use crate::response::{DataResponse, PageResponse};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// Request body for `POST /users`.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[validate(
        length(min = 1, max = MAX_USERNAME_LENGTH),
        custom(function = "validate_username")
    )]
    pub username: String,
    #[validate(email, length(max = MAX_EMAIL_LENGTH))]
    pub email: String,
    #[serde(default)]
    #[validate(length(max = MAX_PERSON_NAME_LENGTH))]
    pub first_name: String,
    #[serde(default)]
    #[validate(length(max = MAX_PERSON_NAME_LENGTH))]
    pub last_name: String,
    #[validate(length(max = MAX_BIO_LENGTH))]
    pub bio: Option<String>,
    #[serde(default)]
    pub role: Role,
}

/// Request body for `PATCH /users/{username}` and `PATCH /users/me`.
///
/// `role` is honoured only on the admin endpoint.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateUserRequest {
    #[validate(
        length(min = 1, max = MAX_USERNAME_LENGTH),
        custom(function = "validate_username")
    )]
    pub username: Option<String>,
    #[validate(email, length(max = MAX_EMAIL_LENGTH))]
    pub email: Option<String>,
    #[validate(length(max = MAX_PERSON_NAME_LENGTH))]
    pub first_name: Option<String>,
    #[validate(length(max = MAX_PERSON_NAME_LENGTH))]
    pub last_name: Option<String>,
    /// `null` clears the bio.
    #[serde(default, deserialize_with = "nullable")]
    #[validate(length(max = MAX_BIO_LENGTH))]
    pub bio: Option<Option<String>>,
    pub role: Option<Role>,
}

impl UpdateUserRequest {
    fn into_update(self, allow_role: bool) -> UpdateUser {
        UpdateUser {
            username: self.username,
            email: self.email.as_deref().map(normalize_email),
            first_name: self.first_name,
            last_name: self.last_name,
            bio: self.bio,
            role: if allow_role { self.role } else { None },
        }
    }
}

async fn load_by_username(state: &AppState, username: &str) -> AppResult<User> {
    UserRepo::find_by_username(&state.pool, username)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::NotFoundByKey {
                entity: "User",
                key: username.to_string(),
            })
        })
}

// ---------------------------------------------------------------------------
// Admin handlers
// ---------------------------------------------------------------------------

/// GET /api/v1/users
///
/// List users ordered by username. `?search=` matches part of the username.
pub async fn list_users(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> AppResult<impl IntoResponse> {
    let (limit, offset) = params.resolve();
    let users = UserRepo::list(&state.pool, params.term(), limit, offset).await?;
    let total = UserRepo::count(&state.pool, params.term()).await?;

    Ok(Json(PageResponse {
        data: users.iter().map(UserResponse::from).collect(),
        total,
        limit,
        offset,
    }))
}

/// POST /api/v1/users
pub async fn create_user(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    ValidatedJson(input): ValidatedJson<CreateUserRequest>,
) -> AppResult<impl IntoResponse> {
    let create = CreateUser {
        username: input.username,
        email: normalize_email(&input.email),
        first_name: input.first_name,
        last_name: input.last_name,
        bio: input.bio,
        role: input.role,
    };
    let user = UserRepo::create(&state.pool, &create).await?;

    tracing::info!(user_id = user.id, admin_id = admin.user_id, "User created");

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: UserResponse::from(&user),
        }),
    ))
}

/// GET /api/v1/users/{username}
pub async fn get_user(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> AppResult<impl IntoResponse> {
    let user = load_by_username(&state, &username).await?;
    Ok(Json(DataResponse {
        data: UserResponse::from(&user),
    }))
}

/// PATCH /api/v1/users/{username}
pub async fn update_user(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(username): Path<String>,
    ValidatedJson(input): ValidatedJson<UpdateUserRequest>,
) -> AppResult<impl IntoResponse> {
    let user = load_by_username(&state, &username).await?;
    let updated = UserRepo::update(&state.pool, user.id, &input.into_update(true))
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "User",
            id: user.id,
        }))?;

    tracing::info!(user_id = updated.id, admin_id = admin.user_id, "User updated");

    Ok(Json(DataResponse {
        data: UserResponse::from(&updated),
    }))
}

/// DELETE /api/v1/users/{username}
///
/// The user's reviews and comments are removed with the account.
pub async fn delete_user(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> AppResult<impl IntoResponse> {
    let user = load_by_username(&state, &username).await?;
    UserRepo::delete(&state.pool, user.id).await?;

    tracing::info!(user_id = user.id, admin_id = admin.user_id, "User deleted");

    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Own profile
// ---------------------------------------------------------------------------

/// GET /api/v1/users/me
pub async fn get_me(auth: AuthUser) -> AppResult<impl IntoResponse> {
    Ok(Json(DataResponse {
        data: UserResponse::from(&auth.user),
    }))
}

/// PATCH /api/v1/users/me
///
/// A `role` in the body is ignored.
pub async fn update_me(
    auth: AuthUser,
    State(state): State<AppState>,
    ValidatedJson(input): ValidatedJson<UpdateUserRequest>,
) -> AppResult<impl IntoResponse> {
    let updated = UserRepo::update(&state.pool, auth.user_id, &input.into_update(false))
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "User",
            id: auth.user_id,
        }))?;

    Ok(Json(DataResponse {
        data: UserResponse::from(&updated),
    }))
}
