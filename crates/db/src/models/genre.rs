//! Genre model and DTOs.

use serde::Serialize;
use sqlx::FromRow;
use yamdb_core::types::DbId;

/// A row from the `genres` table. Serializes as `{name, slug}`.
#[derive(Debug, Clone, FromRow, Serialize, PartialEq, Eq)]
pub struct Genre {
    #[serde(skip_serializing)]
    pub id: DbId,
    pub name: String,
    pub slug: String,
}

/// DTO for creating a genre.
#[derive(Debug, Clone)]
pub struct CreateGenre {
    pub name: String,
    pub slug: String,
}

/// A genre joined through `title_genres`, tagged with the title it belongs to.
#[derive(Debug, Clone, FromRow)]
pub struct TitleGenre {
    pub title_id: DbId,
    pub id: DbId,
    pub name: String,
    pub slug: String,
}

impl From<TitleGenre> for Genre {
    fn from(row: TitleGenre) -> Self {
        Self {
            id: row.id,
            name: row.name,
            slug: row.slug,
        }
    }
}
