//! Material record queries
//!
//! Every write takes a [`MaterialFields`], so normalization has already
//! happened by the time SQL runs. Uniqueness of `code` is enforced by the
//! table constraint; violations surface as [`Error::Conflict`].

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use crate::{Error, Material, MaterialFields, Result};

const MATERIAL_COLUMNS: &str =
    "id, code, description, category, photo_url, created_at, updated_at";

/// Outcome of an upsert by code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Created,
    Updated,
}

/// Fixed-width UTC timestamp so that text ordering equals time ordering
fn timestamp(at: DateTime<Utc>) -> String {
    at.format("%Y-%m-%dT%H:%M:%S%.6fZ").to_string()
}

/// Conflict error for a code that is already taken
pub fn duplicate_code(code: &str) -> Error {
    Error::Conflict(format!("Material code already exists: {}", code))
}

fn map_unique_violation(err: sqlx::Error, code: &str) -> Error {
    match &err {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => duplicate_code(code),
        _ => Error::Database(err),
    }
}

/// All materials, newest first
pub async fn list_materials(pool: &SqlitePool) -> Result<Vec<Material>> {
    let materials = sqlx::query_as::<_, Material>(&format!(
        "SELECT {} FROM materials ORDER BY created_at DESC, id DESC",
        MATERIAL_COLUMNS
    ))
    .fetch_all(pool)
    .await?;

    Ok(materials)
}

/// Load material by id
pub async fn get_material(pool: &SqlitePool, id: i64) -> Result<Option<Material>> {
    let material = sqlx::query_as::<_, Material>(&format!(
        "SELECT {} FROM materials WHERE id = ?",
        MATERIAL_COLUMNS
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(material)
}

/// Load material by business code (expects normalized code)
pub async fn get_material_by_code(pool: &SqlitePool, code: &str) -> Result<Option<Material>> {
    let material = sqlx::query_as::<_, Material>(&format!(
        "SELECT {} FROM materials WHERE code = ?",
        MATERIAL_COLUMNS
    ))
    .bind(code)
    .fetch_optional(pool)
    .await?;

    Ok(material)
}

/// Insert a new material
///
/// Fails with [`Error::Conflict`] if the code already exists; the existing
/// row is left untouched.
pub async fn create_material(
    pool: &SqlitePool,
    fields: &MaterialFields,
    photo_url: Option<&str>,
) -> Result<Material> {
    let now = timestamp(Utc::now());

    sqlx::query_as::<_, Material>(&format!(
        r#"
        INSERT INTO materials (code, description, category, photo_url, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?)
        RETURNING {}
        "#,
        MATERIAL_COLUMNS
    ))
    .bind(fields.code())
    .bind(fields.description())
    .bind(fields.category())
    .bind(photo_url)
    .bind(&now)
    .bind(&now)
    .fetch_one(pool)
    .await
    .map_err(|e| map_unique_violation(e, fields.code()))
}

/// Update all fields of a material
///
/// `photo_url = None` preserves the stored photo URL.
/// Fails with [`Error::NotFound`] for an unknown id and [`Error::Conflict`]
/// if the new code belongs to another material.
pub async fn update_material(
    pool: &SqlitePool,
    id: i64,
    fields: &MaterialFields,
    photo_url: Option<&str>,
) -> Result<Material> {
    let now = timestamp(Utc::now());

    sqlx::query_as::<_, Material>(&format!(
        r#"
        UPDATE materials SET
            code = ?,
            description = ?,
            category = ?,
            photo_url = COALESCE(?, photo_url),
            updated_at = ?
        WHERE id = ?
        RETURNING {}
        "#,
        MATERIAL_COLUMNS
    ))
    .bind(fields.code())
    .bind(fields.description())
    .bind(fields.category())
    .bind(photo_url)
    .bind(&now)
    .bind(id)
    .fetch_optional(pool)
    .await
    .map_err(|e| map_unique_violation(e, fields.code()))?
    .ok_or_else(|| Error::NotFound(format!("Material {}", id)))
}

/// Delete a material row
///
/// Returns `false` if no row had that id.
pub async fn delete_material(pool: &SqlitePool, id: i64) -> Result<bool> {
    let result = sqlx::query("DELETE FROM materials WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// Create or update by code
///
/// An existing record gets its description and category replaced; its
/// photo URL and creation time are kept. A new record starts without photo.
pub async fn upsert_material(pool: &SqlitePool, fields: &MaterialFields) -> Result<UpsertOutcome> {
    let now = timestamp(Utc::now());
    let mut tx = pool.begin().await?;

    let existing: Option<i64> = sqlx::query_scalar("SELECT id FROM materials WHERE code = ?")
        .bind(fields.code())
        .fetch_optional(&mut *tx)
        .await?;

    let outcome = match existing {
        Some(id) => {
            sqlx::query(
                "UPDATE materials SET description = ?, category = ?, updated_at = ? WHERE id = ?",
            )
            .bind(fields.description())
            .bind(fields.category())
            .bind(&now)
            .bind(id)
            .execute(&mut *tx)
            .await?;
            UpsertOutcome::Updated
        }
        None => {
            sqlx::query(
                r#"
                INSERT INTO materials (code, description, category, photo_url, created_at, updated_at)
                VALUES (?, ?, ?, NULL, ?, ?)
                "#,
            )
            .bind(fields.code())
            .bind(fields.description())
            .bind(fields.category())
            .bind(&now)
            .bind(&now)
            .execute(&mut *tx)
            .await
            .map_err(|e| map_unique_violation(e, fields.code()))?;
            UpsertOutcome::Created
        }
    };

    tx.commit().await?;
    Ok(outcome)
}
