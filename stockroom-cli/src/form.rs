//! Create/edit form state
//!
//! [`MaterialForm::new`] starts empty for a create; [`MaterialForm::edit`]
//! copies a record and shows its stored photo until a local file is picked.

use std::path::{Path, PathBuf};
use stockroom_common::categories::is_known_category;
use stockroom_common::text::normalize_field;
use stockroom_common::{Error, Material, MaterialFields};

use crate::client::resolve_photo_url;
use crate::error::{ClientError, Result};

/// Photo shown in the form
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PhotoPreview {
    None,
    /// Photo already stored on the server
    Stored(String),
    /// Local file picked for upload
    Local(PathBuf),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaterialForm {
    /// Record being edited; `None` for a create
    pub editing: Option<i64>,
    pub code: String,
    pub description: String,
    pub category: String,
    pub preview: PhotoPreview,
}

impl MaterialForm {
    /// Empty form for a new material
    pub fn new() -> Self {
        Self {
            editing: None,
            code: String::new(),
            description: String::new(),
            category: String::new(),
            preview: PhotoPreview::None,
        }
    }

    /// Form pre-populated from an existing material
    pub fn edit(material: &Material) -> Self {
        Self {
            editing: Some(material.id),
            code: material.code.clone(),
            description: material.description.clone(),
            category: material.category.clone(),
            preview: match &material.photo_url {
                Some(url) => PhotoPreview::Stored(url.clone()),
                None => PhotoPreview::None,
            },
        }
    }

    /// Pick a local photo; it replaces the preview and is uploaded on submit
    pub fn select_photo(&mut self, path: impl AsRef<Path>) {
        self.preview = PhotoPreview::Local(path.as_ref().to_path_buf());
    }

    /// Local photo to upload, if one was picked
    pub fn photo_to_upload(&self) -> Option<&Path> {
        match &self.preview {
            PhotoPreview::Local(path) => Some(path),
            _ => None,
        }
    }

    /// Where the preview image lives, as something a user can open
    pub fn preview_location(&self, api_base: &str) -> Option<String> {
        match &self.preview {
            PhotoPreview::None => None,
            PhotoPreview::Stored(url) => Some(resolve_photo_url(api_base, url)),
            PhotoPreview::Local(path) => Some(path.display().to_string()),
        }
    }

    /// True when a category is set that the picker does not offer
    ///
    /// Free-text categories are still accepted by the server.
    pub fn has_unlisted_category(&self) -> bool {
        let category = normalize_field(&self.category);
        !category.is_empty() && !is_known_category(&category)
    }

    /// One-line photo summary shown before the form is submitted
    pub fn preview_line(&self, api_base: &str) -> String {
        match (&self.preview, self.preview_location(api_base)) {
            (PhotoPreview::Stored(_), Some(location)) => format!("Photo (current): {}", location),
            (PhotoPreview::Local(_), Some(location)) => format!("Photo (new): {}", location),
            _ => "Photo: none".to_string(),
        }
    }

    /// Normalized (trimmed, uppercased) fields ready to send
    pub fn validate(&self) -> Result<MaterialFields> {
        MaterialFields::new(&self.code, &self.description, &self.category).map_err(|e| match e {
            Error::InvalidInput(msg) => ClientError::Validation(msg),
            other => ClientError::Validation(other.to_string()),
        })
    }
}

impl Default for MaterialForm {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn stored() -> Material {
        Material {
            id: 7,
            code: "ELE-001".to_string(),
            description: "DISJUNTOR".to_string(),
            category: "ELÉTRICA".to_string(),
            photo_url: Some("/uploads/1-a.jpg".to_string()),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_new_form_is_empty() {
        let form = MaterialForm::new();
        assert_eq!(form.editing, None);
        assert!(form.code.is_empty());
        assert_eq!(form.preview, PhotoPreview::None);
        assert!(form.validate().is_err());
    }

    #[test]
    fn test_edit_prefills_from_record() {
        let form = MaterialForm::edit(&stored());

        assert_eq!(form.editing, Some(7));
        assert_eq!(form.code, "ELE-001");
        assert_eq!(form.category, "ELÉTRICA");
        assert_eq!(form.preview, PhotoPreview::Stored("/uploads/1-a.jpg".to_string()));
        assert_eq!(form.photo_to_upload(), None);
        assert_eq!(
            form.preview_location("http://localhost:3333"),
            Some("http://localhost:3333/uploads/1-a.jpg".to_string())
        );
    }

    #[test]
    fn test_selected_photo_replaces_preview() {
        let mut form = MaterialForm::edit(&stored());
        form.select_photo("/tmp/nova.jpg");

        assert_eq!(form.photo_to_upload(), Some(Path::new("/tmp/nova.jpg")));
        assert_eq!(
            form.preview_location("http://localhost:3333"),
            Some("/tmp/nova.jpg".to_string())
        );
    }

    #[test]
    fn test_preview_line() {
        assert_eq!(MaterialForm::new().preview_line("http://h"), "Photo: none");

        let mut form = MaterialForm::edit(&stored());
        assert_eq!(
            form.preview_line("http://h"),
            "Photo (current): http://h/uploads/1-a.jpg"
        );

        form.select_photo("/tmp/nova.jpg");
        assert_eq!(form.preview_line("http://h"), "Photo (new): /tmp/nova.jpg");
    }

    #[test]
    fn test_validate_uppercases() {
        let mut form = MaterialForm::new();
        form.code = " hid-002 ".to_string();
        form.description = "registro".to_string();
        form.category = "hidráulica".to_string();

        let fields = form.validate().unwrap();
        assert_eq!(fields.code(), "HID-002");
        assert_eq!(fields.category(), "HIDRÁULICA");
    }

    #[test]
    fn test_unlisted_category() {
        let mut form = MaterialForm::new();
        assert!(!form.has_unlisted_category());

        form.category = "elétrica".to_string();
        assert!(!form.has_unlisted_category());

        form.category = "jardinagem".to_string();
        assert!(form.has_unlisted_category());
    }

    #[test]
    fn test_validate_reports_missing_description() {
        let mut form = MaterialForm::new();
        form.code = "X".to_string();

        let err = form.validate().unwrap_err();
        assert!(matches!(err, ClientError::Validation(ref msg) if msg.contains("description")));
    }
}
