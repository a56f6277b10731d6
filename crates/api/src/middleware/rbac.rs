//! Role-based access control (RBAC) extractors.
//!
//! Each extractor wraps [`AuthUser`] and rejects requests whose actor fails
//! the matching rule in [`yamdb_core::permissions`]. Ownership checks on
//! reviews and comments need the loaded row, so those stay in the handlers.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use yamdb_core::error::CoreError;
use yamdb_core::permissions::{can_manage_catalog, can_manage_users};

use super::auth::AuthUser;
use crate::error::AppError;
use crate::state::AppState;

/// Requires permission to manage user accounts. Rejects with 403 otherwise.
///
/// ```ignore
/// async fn admin_only(RequireAdmin(admin): RequireAdmin) -> AppResult<Json<()>> {
///     Ok(Json(()))
/// }
/// ```
pub struct RequireAdmin(pub AuthUser);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if !can_manage_users(&user.actor) {
            return Err(AppError::Core(CoreError::Forbidden(
                "Admin role required".into(),
            )));
        }
        Ok(RequireAdmin(user))
    }
}

/// Requires permission to write categories, genres and titles.
pub struct RequireCatalogAdmin(pub AuthUser);

impl FromRequestParts<AppState> for RequireCatalogAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if !can_manage_catalog(&user.actor) {
            return Err(AppError::Core(CoreError::Forbidden(
                "Admin role required to modify the catalog".into(),
            )));
        }
        Ok(RequireCatalogAdmin(user))
    }
}
