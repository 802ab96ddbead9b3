//! Integration tests for the import job against a temp-file database

use calamine::{Data, Range};
use sqlx::SqlitePool;
use stockroom_common::db::{self, init_database};
use stockroom_common::MaterialFields;
use stockroom_import::{import_file, rows_from_range, run_import, ImportError, ImportReport};
use tempfile::TempDir;

async fn setup() -> (TempDir, SqlitePool) {
    let dir = TempDir::new().unwrap();
    let pool = init_database(&dir.path().join("stockroom.db")).await.unwrap();
    (dir, pool)
}

fn s(value: &str) -> Data {
    Data::String(value.to_string())
}

fn sheet(rows: Vec<Vec<Data>>) -> Range<Data> {
    let mut range = Range::new((0, 0), (rows.len() as u32 - 1, 2));
    for (r, row) in rows.into_iter().enumerate() {
        for (c, value) in row.into_iter().enumerate() {
            range.set_value((r as u32, c as u32), value);
        }
    }
    range
}

#[tokio::test]
async fn test_import_creates_normalized_records() {
    let (_dir, pool) = setup().await;
    let range = sheet(vec![
        vec![s("CODIGO"), s("DESCRICAO"), s("CATEGORIA")],
        vec![s(" ele-001 "), s("disjuntor 10a"), s("elétrica")],
        vec![Data::Float(1020.0), s("parafuso"), s("ferramenta")],
    ]);

    let rows = rows_from_range(&range).unwrap();
    let report = run_import(&pool, &rows).await;

    assert_eq!(
        report,
        ImportReport {
            created: 2,
            updated: 0,
            skipped: 0,
            failed: 0
        }
    );

    let ele = db::get_material_by_code(&pool, "ELE-001").await.unwrap().unwrap();
    assert_eq!(ele.description, "DISJUNTOR 10A");
    assert_eq!(ele.category, "ELÉTRICA");
    assert_eq!(ele.photo_url, None);

    let numeric = db::get_material_by_code(&pool, "1020").await.unwrap();
    assert!(numeric.is_some(), "whole-number code should import without .0");
}

#[tokio::test]
async fn test_rows_missing_code_or_description_are_skipped() {
    let (_dir, pool) = setup().await;
    let range = sheet(vec![
        vec![s("CODIGO"), s("DESCRICAO"), s("CATEGORIA")],
        vec![Data::Empty, s("sem codigo"), s("civil")],
        vec![s("X-1"), s("   "), s("civil")],
        vec![s("X-2"), s("valido"), Data::Empty],
    ]);

    let report = run_import(&pool, &rows_from_range(&range).unwrap()).await;

    assert_eq!(report.skipped, 2);
    assert_eq!(report.created, 1);
    assert_eq!(report.total(), 3);
    assert_eq!(db::list_materials(&pool).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_existing_code_updates_fields_but_keeps_photo() {
    let (_dir, pool) = setup().await;
    let fields = MaterialFields::new("ELE-001", "antigo", "civil").unwrap();
    let original = db::create_material(&pool, &fields, Some("/uploads/1-a.jpg"))
        .await
        .unwrap();

    let range = sheet(vec![
        vec![s("CODIGO"), s("DESCRICAO"), s("CATEGORIA")],
        vec![s("ele-001"), s("novo"), s("elétrica")],
    ]);
    let report = run_import(&pool, &rows_from_range(&range).unwrap()).await;

    assert_eq!(report.updated, 1);
    assert_eq!(report.imported(), 1);

    let updated = db::get_material(&pool, original.id).await.unwrap().unwrap();
    assert_eq!(updated.description, "NOVO");
    assert_eq!(updated.category, "ELÉTRICA");
    assert_eq!(updated.photo_url.as_deref(), Some("/uploads/1-a.jpg"));
    assert_eq!(updated.created_at, original.created_at);
    assert!(updated.updated_at >= original.updated_at);
    assert_eq!(db::list_materials(&pool).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_duplicate_codes_within_sheet_update_the_first() {
    let (_dir, pool) = setup().await;
    let range = sheet(vec![
        vec![s("CODIGO"), s("DESCRICAO"), s("CATEGORIA")],
        vec![s("A-1"), s("primeiro"), s("")],
        vec![s("a-1"), s("segundo"), s("")],
    ]);

    let report = run_import(&pool, &rows_from_range(&range).unwrap()).await;

    assert_eq!(report.created, 1);
    assert_eq!(report.updated, 1);
    let material = db::get_material_by_code(&pool, "A-1").await.unwrap().unwrap();
    assert_eq!(material.description, "SEGUNDO");
}

#[tokio::test]
async fn test_import_file_missing_is_setup_error() {
    let (dir, pool) = setup().await;

    let result = import_file(&pool, &dir.path().join("materiais.xlsx")).await;

    assert!(matches!(result, Err(ImportError::FileNotFound(_))));
}

#[tokio::test]
async fn test_import_file_unreadable_workbook() {
    let (dir, pool) = setup().await;
    let path = dir.path().join("materiais.xlsx");
    std::fs::write(&path, b"not a zip archive").unwrap();

    let result = import_file(&pool, &path).await;

    assert!(matches!(result, Err(ImportError::Workbook(_))));
}

#[tokio::test]
async fn test_blank_rows_are_not_counted() {
    let (_dir, pool) = setup().await;
    let range = sheet(vec![
        vec![s("CODIGO"), s("DESCRICAO"), s("CATEGORIA")],
        vec![s("A-1"), s("um"), s("")],
        vec![Data::Empty, Data::Empty, Data::Empty],
        vec![Data::Empty, Data::Empty, Data::Empty],
        vec![s("A-2"), s("dois"), s("")],
    ]);

    let report = run_import(&pool, &rows_from_range(&range).unwrap()).await;

    assert_eq!(report.created, 2);
    assert_eq!(report.skipped, 0);
    assert_eq!(report.total(), 2);
}
