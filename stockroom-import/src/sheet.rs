//! Worksheet reading
//!
//! The first row holds headers. Columns are located by name, so their order
//! in the sheet does not matter and extra columns are ignored.

use calamine::{open_workbook_auto, Data, Range, Reader};
use std::path::Path;
use stockroom_common::text::fold_for_search;
use tracing::debug;

use crate::error::{ImportError, Result};

pub const CODE_HEADER: &str = "CODIGO";
pub const DESCRIPTION_HEADER: &str = "DESCRICAO";
pub const CATEGORY_HEADER: &str = "CATEGORIA";

/// One data row, stringified but not yet normalized
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportRow {
    /// 1-based row number in the sheet
    pub row_number: usize,
    pub code: String,
    pub description: String,
    pub category: String,
}

/// Column positions located from the header row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnMap {
    pub code: usize,
    pub description: usize,
    /// Missing category column means every row gets an empty category
    pub category: Option<usize>,
}

impl ColumnMap {
    /// Locate columns by header text (trimmed, case- and accent-insensitive)
    pub fn from_headers(headers: &[Data]) -> Result<Self> {
        let find = |wanted: &str| {
            let wanted = fold_for_search(wanted);
            headers
                .iter()
                .position(|cell| fold_for_search(cell_text(cell).trim()) == wanted)
        };

        Ok(Self {
            code: find(CODE_HEADER).ok_or(ImportError::MissingColumn(CODE_HEADER))?,
            description: find(DESCRIPTION_HEADER)
                .ok_or(ImportError::MissingColumn(DESCRIPTION_HEADER))?,
            category: find(CATEGORY_HEADER),
        })
    }
}

/// Open a workbook (XLSX, XLS, XLSB or ODS) and return its first sheet
pub fn read_first_sheet(path: &Path) -> Result<Range<Data>> {
    if !path.exists() {
        return Err(ImportError::FileNotFound(path.to_path_buf()));
    }

    let mut workbook = open_workbook_auto(path)?;
    let first = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or(ImportError::NoSheets)?;

    debug!(sheet = %first, "Reading first sheet");
    Ok(workbook.worksheet_range(&first)?)
}

/// Convert a sheet into rows using its header row
pub fn rows_from_range(range: &Range<Data>) -> Result<Vec<ImportRow>> {
    let first_row = range.start().map(|(row, _)| row as usize).unwrap_or(0);
    let mut rows = range.rows();

    let headers = rows
        .next()
        .ok_or(ImportError::MissingColumn(CODE_HEADER))?;
    let columns = ColumnMap::from_headers(headers)?;

    let cell = |row: &[Data], index: usize| row.get(index).map(cell_text).unwrap_or_default();

    Ok(rows
        .enumerate()
        .filter(|(_, row)| !is_blank(row))
        .map(|(i, row)| ImportRow {
            // Header occupies the first row
            row_number: first_row + i + 2,
            code: cell(row, columns.code),
            description: cell(row, columns.description),
            category: columns
                .category
                .map(|index| cell(row, index))
                .unwrap_or_default(),
        })
        .collect())
}

/// Row with no visible content anywhere
fn is_blank(row: &[Data]) -> bool {
    row.iter().all(|cell| cell_text(cell).trim().is_empty())
}

/// Cell value as text
///
/// Whole numbers lose their fractional part, so a code typed as `1020`
/// stored as a float still reads `1020`.
pub fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", *f as i64),
        Data::Float(f) => f.to_string(),
        Data::Bool(b) => b.to_string(),
        other => other.to_string(),
    }
}
