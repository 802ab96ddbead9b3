//! Material endpoints
//!
//! | Method | Path             | Body      |
//! |--------|------------------|-----------|
//! | GET    | /materiais       |           |
//! | POST   | /materiais       | multipart |
//! | PUT    | /materiais/:id   | multipart |
//! | DELETE | /materiais/:id   |           |
//!
//! Multipart fields: `code`, `description`, `category`, optional `photo`
//! file. The Portuguese names `codigo`, `descricao`, `categoria` and `foto`
//! are accepted as aliases.

use axum::{
    body::Bytes,
    extract::multipart::MultipartRejection,
    extract::rejection::PathRejection,
    extract::{Multipart, Path, State},
    routing::{get, put},
    Json, Router,
};
use serde::Serialize;
use stockroom_common::{db, Material, MaterialFields};
use tracing::info;

use crate::photos::StoredPhoto;
use crate::{ApiError, ApiResult, AppState};

/// Uploaded photo part
#[derive(Debug)]
pub struct PhotoUpload {
    pub file_name: String,
    pub bytes: Bytes,
}

/// Raw multipart form for create/update
#[derive(Debug, Default)]
pub struct MaterialUpload {
    pub code: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub photo: Option<PhotoUpload>,
}

impl MaterialUpload {
    /// Collect the known fields; unknown parts are skipped
    ///
    /// A photo part with no file name or an empty body counts as no photo,
    /// which is what browsers send for an untouched file input.
    pub async fn from_multipart(
        multipart: Result<Multipart, MultipartRejection>,
    ) -> ApiResult<Self> {
        let mut multipart = multipart?;
        let mut upload = Self::default();

        while let Some(field) = multipart.next_field().await? {
            let name = field.name().unwrap_or_default().to_string();
            match name.as_str() {
                "code" | "codigo" => upload.code = Some(field.text().await?),
                "description" | "descricao" => upload.description = Some(field.text().await?),
                "category" | "categoria" => upload.category = Some(field.text().await?),
                "photo" | "foto" => {
                    let file_name = field.file_name().unwrap_or_default().to_string();
                    let bytes = field.bytes().await?;
                    if !file_name.is_empty() && !bytes.is_empty() {
                        upload.photo = Some(PhotoUpload { file_name, bytes });
                    }
                }
                _ => {}
            }
        }

        Ok(upload)
    }

    /// Normalized fields, or 400 if code/description are missing
    pub fn fields(&self) -> ApiResult<MaterialFields> {
        let fields = MaterialFields::new(
            self.code.as_deref().unwrap_or_default(),
            self.description.as_deref().unwrap_or_default(),
            self.category.as_deref().unwrap_or_default(),
        )?;
        Ok(fields)
    }
}

/// Body of a successful delete
#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub message: String,
}

async fn store_photo(state: &AppState, photo: Option<&PhotoUpload>) -> ApiResult<Option<StoredPhoto>> {
    match photo {
        Some(photo) => Ok(Some(state.photos.save(&photo.file_name, &photo.bytes).await?)),
        None => Ok(None),
    }
}

/// 409 when `code` belongs to a material other than `except`
///
/// Checked before any photo is written; the table constraint still catches
/// a concurrent insert of the same code.
async fn ensure_code_free(state: &AppState, code: &str, except: Option<i64>) -> ApiResult<()> {
    match db::get_material_by_code(&state.db, code).await? {
        Some(other) if Some(other.id) != except => Err(db::duplicate_code(code).into()),
        _ => Ok(()),
    }
}

async fn discard_photo(state: &AppState, stored: Option<&StoredPhoto>) {
    if let Some(stored) = stored {
        state.photos.remove(&stored.url).await;
    }
}

/// GET /materiais
///
/// All materials, newest first.
pub async fn list_materials(State(state): State<AppState>) -> ApiResult<Json<Vec<Material>>> {
    let materials = db::list_materials(&state.db).await?;
    Ok(Json(materials))
}

/// POST /materiais
///
/// **Errors:**
/// - 400: missing code or description, malformed multipart body
/// - 409: code already exists (existing record untouched, no photo stored)
pub async fn create_material(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<Json<Material>> {
    let upload = MaterialUpload::from_multipart(multipart).await?;
    let fields = upload.fields()?;
    ensure_code_free(&state, fields.code(), None).await?;

    let stored = store_photo(&state, upload.photo.as_ref()).await?;
    let photo_url = stored.as_ref().map(|s| s.url.as_str());

    match db::create_material(&state.db, &fields, photo_url).await {
        Ok(material) => {
            info!("Created material {} (id {})", material.code, material.id);
            Ok(Json(material))
        }
        Err(e) => {
            discard_photo(&state, stored.as_ref()).await;
            Err(e.into())
        }
    }
}

/// PUT /materiais/:id
///
/// Replaces code, description and category. The photo URL changes only when
/// a new photo is uploaded, in which case the previous file is removed.
///
/// **Errors:**
/// - 400: non-numeric id, missing code or description
/// - 404: unknown id
/// - 409: new code belongs to another material
pub async fn update_material(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<Json<Material>> {
    let Path(id) = id?;
    let upload = MaterialUpload::from_multipart(multipart).await?;
    let fields = upload.fields()?;

    let existing = db::get_material(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Material {} not found", id)))?;
    ensure_code_free(&state, fields.code(), Some(id)).await?;

    let stored = store_photo(&state, upload.photo.as_ref()).await?;
    let photo_url = stored.as_ref().map(|s| s.url.as_str());

    let updated = match db::update_material(&state.db, id, &fields, photo_url).await {
        Ok(updated) => updated,
        Err(e) => {
            discard_photo(&state, stored.as_ref()).await;
            return Err(e.into());
        }
    };

    if stored.is_some() {
        if let Some(previous) = existing.photo_url.as_deref() {
            if updated.photo_url.as_deref() != Some(previous) {
                state.photos.remove(previous).await;
            }
        }
    }

    info!("Updated material {} (id {})", updated.code, updated.id);
    Ok(Json(updated))
}

/// DELETE /materiais/:id
///
/// Removes the photo file (best-effort) and then the record.
pub async fn delete_material(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<DeleteResponse>> {
    let Path(id) = id?;
    let existing = db::get_material(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Material {} not found", id)))?;

    if let Some(url) = existing.photo_url.as_deref() {
        state.photos.remove(url).await;
    }

    if !db::delete_material(&state.db, id).await? {
        return Err(ApiError::NotFound(format!("Material {} not found", id)));
    }

    info!("Deleted material {} (id {})", existing.code, id);
    Ok(Json(DeleteResponse {
        message: "Material deleted".to_string(),
    }))
}

/// Build material routes
pub fn material_routes() -> Router<AppState> {
    Router::new()
        .route("/materiais", get(list_materials).post(create_material))
        .route("/materiais/:id", put(update_material).delete(delete_material))
}
