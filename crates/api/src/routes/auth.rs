//! Route definitions for the `/auth` resource.

use axum::routing::post;
use axum::Router;

use crate::handlers::auth;
use crate::state::AppState;

/// Routes mounted at `/auth`.
///
/// ```text
/// POST /email    -> send_confirmation_code
/// POST /token    -> issue_token
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/email", post(auth::send_confirmation_code))
        .route("/token", post(auth::issue_token))
}
