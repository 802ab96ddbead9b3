//! stockroom-import library
//!
//! One-shot import of a spreadsheet into the materials table. Rows are
//! matched to existing materials by code.

pub mod error;
pub mod job;
pub mod sheet;

pub use crate::error::{ImportError, Result};
pub use crate::job::{run_import, ImportReport};
pub use crate::sheet::{read_first_sheet, rows_from_range, ImportRow};

use sqlx::SqlitePool;
use std::path::Path;
use tracing::info;

/// Read the first sheet of `path` and upsert its rows
///
/// Fails only on setup problems (file, workbook, headers). Row-level
/// failures are reported in the returned counts.
pub async fn import_file(pool: &SqlitePool, path: &Path) -> Result<ImportReport> {
    let range = read_first_sheet(path)?;
    let rows = rows_from_range(&range)?;
    info!("Read {} data rows from {}", rows.len(), path.display());

    Ok(run_import(pool, &rows).await)
}
