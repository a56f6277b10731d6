//! Handlers for the `/auth` resource (confirmation code, token exchange).

use axum::extract::State;
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use validator::Validate;
use yamdb_core::confirmation::{check_code, make_code, CodeSubject};
use yamdb_core::error::CoreError;
use yamdb_core::validation::{normalize_email, MAX_USERNAME_LENGTH};
use yamdb_db::models::user::User;
use yamdb_db::repositories::UserRepo;
use yamdb_mail::confirmation_email;

use crate::auth::jwt::generate_access_token;
use crate::error::{AppError, AppResult};
use crate::extract::ValidatedJson;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /auth/email`.
///
/// The address becomes the username of a new account, so it is held to the
/// username length limit.
#[derive(Debug, Deserialize, Validate)]
pub struct EmailRequest {
    #[validate(email, length(max = MAX_USERNAME_LENGTH))]
    pub email: String,
}

/// Response body for `POST /auth/email`.
#[derive(Debug, Serialize)]
pub struct EmailResponse {
    pub email: String,
}

/// Request body for `POST /auth/token`.
#[derive(Debug, Deserialize, Validate)]
pub struct TokenRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub confirmation_code: String,
}

/// Response body for `POST /auth/token`.
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
}

fn code_subject(user: &User) -> CodeSubject<'_> {
    CodeSubject {
        user_id: user.id,
        email: &user.email,
        last_login_at: user.last_login_at,
    }
}

fn rejected_code() -> AppError {
    AppError::Core(CoreError::Validation(
        "Invalid or expired confirmation code".into(),
    ))
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/auth/email
///
/// Register the address if it is new (username = email) and email a
/// confirmation code to it.
pub async fn send_confirmation_code(
    State(state): State<AppState>,
    ValidatedJson(input): ValidatedJson<EmailRequest>,
) -> AppResult<Json<EmailResponse>> {
    let email = normalize_email(&input.email);

    let (user, created) = UserRepo::get_or_create_by_email(&state.pool, &email).await?;
    if created {
        tracing::info!(user_id = user.id, "User registered by email");
    }

    let code = make_code(&state.config.jwt.secret, &code_subject(&user), Utc::now());

    state
        .mailer
        .send(&confirmation_email(&user.email, &code))
        .await
        .map_err(|e| AppError::InternalError(format!("Failed to send confirmation code: {e}")))?;

    tracing::info!(user_id = user.id, "Confirmation code sent");

    Ok(Json(EmailResponse { email: user.email }))
}

/// POST /api/v1/auth/token
///
/// Exchange an email + confirmation code for an access token. The code is
/// spent: issuing the token records a login, which invalidates it.
pub async fn issue_token(
    State(state): State<AppState>,
    ValidatedJson(input): ValidatedJson<TokenRequest>,
) -> AppResult<Json<TokenResponse>> {
    let email = normalize_email(&input.email);

    let user = UserRepo::find_by_email(&state.pool, &email)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::NotFoundByKey {
                entity: "User",
                key: email.clone(),
            })
        })?;

    let valid = check_code(
        &state.config.jwt.secret,
        &code_subject(&user),
        &input.confirmation_code,
        Utc::now(),
        state.config.confirmation_code_ttl_secs,
    );
    if !valid {
        tracing::warn!(user_id = user.id, "Rejected confirmation code");
        return Err(rejected_code());
    }

    // Loses to a concurrent exchange of the same code.
    if !UserRepo::record_login(&state.pool, user.id, user.last_login_at).await? {
        tracing::warn!(user_id = user.id, "Confirmation code already spent");
        return Err(rejected_code());
    }

    let token = generate_access_token(user.id, user.role(), &state.config.jwt)
        .map_err(|e| AppError::InternalError(format!("Token generation failed: {e}")))?;

    tracing::info!(user_id = user.id, "Access token issued");

    Ok(Json(TokenResponse { token }))
}
