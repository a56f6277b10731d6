//! Route definitions for `/titles` and the reviews and comments nested
//! beneath it.

use axum::routing::get;
use axum::Router;

use crate::handlers::{comments, reviews, titles};
use crate::state::AppState;

/// Routes mounted at `/titles`.
///
/// ```text
/// GET    /                                                  -> list_titles
/// POST   /                                                  -> create_title (admin)
/// GET    /{title_id}                                        -> get_title
/// PATCH  /{title_id}                                        -> update_title (admin)
/// PUT    /{title_id}                                        -> update_title (admin)
/// DELETE /{title_id}                                        -> delete_title (admin)
///
/// GET    /{title_id}/reviews                                -> list_reviews
/// POST   /{title_id}/reviews                                -> create_review
/// GET    /{title_id}/reviews/{review_id}                    -> get_review
/// PATCH  /{title_id}/reviews/{review_id}                    -> update_review
/// PUT    /{title_id}/reviews/{review_id}                    -> update_review
/// DELETE /{title_id}/reviews/{review_id}                    -> delete_review
///
/// GET    /{title_id}/reviews/{review_id}/comments           -> list_comments
/// POST   /{title_id}/reviews/{review_id}/comments           -> create_comment
/// GET    /{title_id}/reviews/{review_id}/comments/{id}      -> get_comment
/// PATCH  /{title_id}/reviews/{review_id}/comments/{id}      -> update_comment
/// PUT    /{title_id}/reviews/{review_id}/comments/{id}      -> update_comment
/// DELETE /{title_id}/reviews/{review_id}/comments/{id}      -> delete_comment
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(titles::list_titles).post(titles::create_title))
        .route(
            "/{title_id}",
            get(titles::get_title)
                .patch(titles::update_title)
                .put(titles::update_title)
                .delete(titles::delete_title),
        )
        .route(
            "/{title_id}/reviews",
            get(reviews::list_reviews).post(reviews::create_review),
        )
        .route(
            "/{title_id}/reviews/{review_id}",
            get(reviews::get_review)
                .patch(reviews::update_review)
                .put(reviews::update_review)
                .delete(reviews::delete_review),
        )
        .route(
            "/{title_id}/reviews/{review_id}/comments",
            get(comments::list_comments).post(comments::create_comment),
        )
        .route(
            "/{title_id}/reviews/{review_id}/comments/{comment_id}",
            get(comments::get_comment)
                .patch(comments::update_comment)
                .put(comments::update_comment)
                .delete(comments::delete_comment),
        )
}
