//! Request handlers, one submodule per resource.
//!
//! Handlers delegate to the repositories in `yamdb_db`, apply the rules in
//! `yamdb_core::permissions`, and map errors via [`crate::error::AppError`].

pub mod auth;
pub mod categories;
pub mod comments;
pub mod genres;
pub mod reviews;
pub mod titles;
pub mod users;
