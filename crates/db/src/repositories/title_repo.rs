//! Repository for the `titles` and `title_genres` tables.
//!
//! Reads return [`TitleResponse`] values: the row, its category, its genres,
//! and the rating derived from `AVG(reviews.score)`.

use sqlx::PgPool;
use yamdb_core::types::DbId;
use yamdb_core::validation::contains_pattern;

use crate::models::title::{CreateTitle, TitleListParams, TitleResponse, TitleRow, UpdateTitle};
use crate::repositories::GenreRepo;

/// Select list for [`TitleRow`]. Expects `titles t LEFT JOIN categories c`.
const ROW_COLUMNS: &str = "\
    t.id, t.name, t.year, t.description, t.category_id, \
    c.name AS category_name, c.slug AS category_slug, \
    (SELECT AVG(r.score)::FLOAT8 FROM reviews r WHERE r.title_id = t.id) AS average_score";

/// Filter shared by `list` and `count`. Binds `$1` name pattern, `$2` year,
/// `$3` genre slug pattern, `$4` category slug pattern; `NULL` disables each.
const FILTER: &str = "\
    ($1::TEXT IS NULL OR t.name ILIKE $1) \
    AND ($2::INTEGER IS NULL OR t.year = $2) \
    AND ($3::TEXT IS NULL OR EXISTS ( \
        SELECT 1 FROM title_genres tg JOIN genres g ON g.id = tg.genre_id \
        WHERE tg.title_id = t.id AND g.slug ILIKE $3)) \
    AND ($4::TEXT IS NULL OR c.slug ILIKE $4)";

/// Provides CRUD operations for titles and their genre links.
pub struct TitleRepo;

impl TitleRepo {
    /// Insert a title and its genre links in one transaction.
    ///
    /// Returns the new title's ID.
    pub async fn create(pool: &PgPool, input: &CreateTitle) -> Result<DbId, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let (id,): (DbId,) = sqlx::query_as(
            "INSERT INTO titles (name, year, description, category_id) \
             VALUES ($1, $2, $3, $4) \
             RETURNING id",
        )
        .bind(&input.name)
        .bind(input.year)
        .bind(&input.description)
        .bind(input.category_id)
        .fetch_one(&mut *tx)
        .await?;

        Self::set_genres_inner(&mut tx, id, &input.genre_ids).await?;

        tx.commit().await?;
        Ok(id)
    }

    /// Update a title. Only non-`None` fields are applied, `Some(None)`
    /// clears `description` or `category_id`, and `genre_ids` replaces the
    /// full genre set when present.
    ///
    /// Returns `false` if no title with the given ID exists.
    pub async fn update(pool: &PgPool, id: DbId, input: &UpdateTitle) -> Result<bool, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let result = sqlx::query(
            "UPDATE titles SET \
                 name = COALESCE($2, name), \
                 year = COALESCE($3, year), \
                 description = CASE WHEN $4 THEN $5 ELSE description END, \
                 category_id = CASE WHEN $6 THEN $7 ELSE category_id END \
             WHERE id = $1",
        )
        .bind(id)
        .bind(&input.name)
        .bind(input.year)
        .bind(input.description.is_some())
        .bind(input.description.clone().flatten())
        .bind(input.category_id.is_some())
        .bind(input.category_id.flatten())
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(false);
        }

        if let Some(genre_ids) = &input.genre_ids {
            Self::set_genres_inner(&mut tx, id, genre_ids).await?;
        }

        tx.commit().await?;
        Ok(true)
    }

    /// Whether a title with this ID exists.
    pub async fn exists(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let (exists,): (bool,) = sqlx::query_as("SELECT EXISTS(SELECT 1 FROM titles WHERE id = $1)")
            .bind(id)
            .fetch_one(pool)
            .await?;
        Ok(exists)
    }

    /// Find a title by ID in its read representation.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<TitleResponse>, sqlx::Error> {
        let query = format!(
            "SELECT {ROW_COLUMNS} \
             FROM titles t LEFT JOIN categories c ON c.id = t.category_id \
             WHERE t.id = $1"
        );
        let row = sqlx::query_as::<_, TitleRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await?;

        match row {
            Some(row) => {
                let links = GenreRepo::list_for_titles(pool, &[row.id]).await?;
                Ok(TitleResponse::assemble(vec![row], links).pop())
            }
            None => Ok(None),
        }
    }

    /// List titles ordered by ID, filtered by `params`.
    pub async fn list(
        pool: &PgPool,
        params: &TitleListParams,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<TitleResponse>, sqlx::Error> {
        let query = format!(
            "SELECT {ROW_COLUMNS} \
             FROM titles t LEFT JOIN categories c ON c.id = t.category_id \
             WHERE {FILTER} \
             ORDER BY t.id \
             LIMIT $5 OFFSET $6"
        );
        let rows = sqlx::query_as::<_, TitleRow>(&query)
            .bind(params.name.as_deref().map(contains_pattern))
            .bind(params.year)
            .bind(params.genre.as_deref().map(contains_pattern))
            .bind(params.category.as_deref().map(contains_pattern))
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await?;

        let ids: Vec<DbId> = rows.iter().map(|r| r.id).collect();
        let links = GenreRepo::list_for_titles(pool, &ids).await?;
        Ok(TitleResponse::assemble(rows, links))
    }

    /// Count titles matching the same filter as [`TitleRepo::list`].
    pub async fn count(pool: &PgPool, params: &TitleListParams) -> Result<i64, sqlx::Error> {
        let query = format!(
            "SELECT COUNT(*) \
             FROM titles t LEFT JOIN categories c ON c.id = t.category_id \
             WHERE {FILTER}"
        );
        let (count,): (i64,) = sqlx::query_as(&query)
            .bind(params.name.as_deref().map(contains_pattern))
            .bind(params.year)
            .bind(params.genre.as_deref().map(contains_pattern))
            .bind(params.category.as_deref().map(contains_pattern))
            .fetch_one(pool)
            .await?;
        Ok(count)
    }

    /// Delete a title. Reviews and their comments cascade.
    ///
    /// Returns `true` if a row was deleted.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM titles WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // -----------------------------------------------------------------------
    // Internal helpers
    // -----------------------------------------------------------------------

    /// Replace genre links within an existing transaction.
    async fn set_genres_inner(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        title_id: DbId,
        genre_ids: &[DbId],
    ) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM title_genres WHERE title_id = $1")
            .bind(title_id)
            .execute(&mut **tx)
            .await?;

        if !genre_ids.is_empty() {
            sqlx::query(
                "INSERT INTO title_genres (title_id, genre_id) \
                 SELECT $1, UNNEST($2::BIGINT[]) \
                 ON CONFLICT DO NOTHING",
            )
            .bind(title_id)
            .bind(genre_ids)
            .execute(&mut **tx)
            .await?;
        }

        Ok(())
    }
}
