//! Upsert of sheet rows into the materials table

use sqlx::SqlitePool;
use stockroom_common::db::{self, UpsertOutcome};
use stockroom_common::MaterialFields;
use tracing::{debug, error, warn};

use crate::sheet::ImportRow;

/// Per-row outcome counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportReport {
    /// New materials inserted
    pub created: usize,
    /// Existing materials whose description/category were replaced
    pub updated: usize,
    /// Rows missing code or description
    pub skipped: usize,
    /// Rows the database rejected
    pub failed: usize,
}

impl ImportReport {
    /// Rows written (created + updated)
    pub fn imported(&self) -> usize {
        self.created + self.updated
    }

    pub fn total(&self) -> usize {
        self.imported() + self.skipped + self.failed
    }
}

/// Upsert each row by code
///
/// Rows are processed one at a time; a failing row is logged and counted,
/// and the job moves on.
pub async fn run_import(pool: &SqlitePool, rows: &[ImportRow]) -> ImportReport {
    let mut report = ImportReport::default();

    for row in rows {
        let fields = match MaterialFields::new(&row.code, &row.description, &row.category) {
            Ok(fields) => fields,
            Err(e) => {
                warn!(row = row.row_number, "Skipping row: {}", e);
                report.skipped += 1;
                continue;
            }
        };

        match db::upsert_material(pool, &fields).await {
            Ok(UpsertOutcome::Created) => {
                debug!(row = row.row_number, code = fields.code(), "Created");
                report.created += 1;
            }
            Ok(UpsertOutcome::Updated) => {
                debug!(row = row.row_number, code = fields.code(), "Updated");
                report.updated += 1;
            }
            Err(e) => {
                error!(row = row.row_number, code = fields.code(), "Failed to import row: {}", e);
                report.failed += 1;
            }
        }
    }

    report
}
