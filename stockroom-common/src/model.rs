//! Material record model
//!
//! `Material` is both the database row and the JSON wire format (camelCase
//! field names, as consumed by the client).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::text::normalize_field;
use crate::{Error, Result};

/// Inventory item record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Material {
    /// System-assigned identifier
    pub id: i64,
    /// Business key, unique, uppercase
    pub code: String,
    pub description: String,
    pub category: String,
    /// Relative (`/uploads/<file>`) or legacy absolute URL
    pub photo_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Normalized editable fields of a material
///
/// Construct through [`MaterialFields::new`] so that every write path
/// persists the same normalized text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaterialFields {
    code: String,
    description: String,
    category: String,
}

impl MaterialFields {
    /// Normalize and validate raw field values
    ///
    /// Code and description are required; category may be empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use stockroom_common::MaterialFields;
    ///
    /// let fields = MaterialFields::new("ele-001", "disjuntor", "elétrica").unwrap();
    /// assert_eq!(fields.code(), "ELE-001");
    /// assert_eq!(fields.category(), "ELÉTRICA");
    ///
    /// assert!(MaterialFields::new("  ", "disjuntor", "").is_err());
    /// ```
    pub fn new(code: &str, description: &str, category: &str) -> Result<Self> {
        let code = normalize_field(code);
        let description = normalize_field(description);

        if code.is_empty() {
            return Err(Error::InvalidInput("code is required".to_string()));
        }
        if description.is_empty() {
            return Err(Error::InvalidInput("description is required".to_string()));
        }

        Ok(Self {
            code,
            description,
            category: normalize_field(category),
        })
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn category(&self) -> &str {
        &self.category
    }
}
