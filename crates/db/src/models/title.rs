//! Title model, read representation, and DTOs.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use yamdb_core::rating::rating_from_average;
use yamdb_core::types::DbId;

use super::category::Category;
use super::genre::{Genre, TitleGenre};

/// A `titles` row joined with its category and the average review score.
#[derive(Debug, Clone, FromRow)]
pub struct TitleRow {
    pub id: DbId,
    pub name: String,
    pub year: i32,
    pub description: Option<String>,
    pub category_id: Option<DbId>,
    pub category_name: Option<String>,
    pub category_slug: Option<String>,
    pub average_score: Option<f64>,
}

/// Read representation of a title, with nested genres and category.
#[derive(Debug, Clone, Serialize)]
pub struct TitleResponse {
    pub id: DbId,
    pub name: String,
    pub year: i32,
    pub rating: Option<i32>,
    pub description: Option<String>,
    pub genre: Vec<Genre>,
    pub category: Option<Category>,
}

impl TitleResponse {
    /// Combine a row with its genres.
    pub fn from_row(row: TitleRow, genre: Vec<Genre>) -> Self {
        let category = match (row.category_id, row.category_name, row.category_slug) {
            (Some(id), Some(name), Some(slug)) => Some(Category { id, name, slug }),
            _ => None,
        };
        Self {
            id: row.id,
            name: row.name,
            year: row.year,
            rating: rating_from_average(row.average_score),
            description: row.description,
            genre,
            category,
        }
    }

    /// Combine a page of rows with the genre links fetched for all of them.
    /// Row order is preserved.
    pub fn assemble(rows: Vec<TitleRow>, links: Vec<TitleGenre>) -> Vec<Self> {
        let mut by_title: HashMap<DbId, Vec<Genre>> = HashMap::new();
        for link in links {
            by_title.entry(link.title_id).or_default().push(link.into());
        }
        rows.into_iter()
            .map(|row| {
                let genre = by_title.remove(&row.id).unwrap_or_default();
                Self::from_row(row, genre)
            })
            .collect()
    }
}

/// Query parameters for `GET /api/v1/titles`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TitleListParams {
    /// Genre slug, case-insensitive substring match.
    pub genre: Option<String>,
    /// Category slug, case-insensitive substring match.
    pub category: Option<String>,
    /// Title name, case-insensitive substring match.
    pub name: Option<String>,
    /// Exact release year.
    pub year: Option<i32>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// DTO for creating a title. Slugs are already resolved to ids.
#[derive(Debug, Clone)]
pub struct CreateTitle {
    pub name: String,
    pub year: i32,
    pub description: Option<String>,
    pub category_id: Option<DbId>,
    pub genre_ids: Vec<DbId>,
}

/// DTO for updating a title. `genre_ids`, when present, replaces the whole set.
///
/// The nullable columns take `Some(None)` to clear them.
#[derive(Debug, Clone, Default)]
pub struct UpdateTitle {
    pub name: Option<String>,
    pub year: Option<i32>,
    pub description: Option<Option<String>>,
    pub category_id: Option<Option<DbId>>,
    pub genre_ids: Option<Vec<DbId>>,
}
