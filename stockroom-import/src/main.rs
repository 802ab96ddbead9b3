//! stockroom-import - Spreadsheet import job
//!
//! Reads `materiais.xlsx` (or `--file`) and upserts every row into the
//! database used by stockroom-api. Exits non-zero when the workbook or the
//! database cannot be set up.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use stockroom_common::config::{
    first_configured, CompiledDefaults, RootFolderInitializer, RootFolderResolver, TomlConfig,
};
use stockroom_common::db::init_database;
use stockroom_import::import_file;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const MODULE_NAME: &str = "stockroom-import";

/// Command-line arguments for stockroom-import
#[derive(Parser, Debug)]
#[command(name = "stockroom-import")]
#[command(about = "Import materials from a spreadsheet")]
#[command(version)]
struct Args {
    /// Workbook to import (first sheet, header row CODIGO/DESCRICAO/CATEGORIA)
    #[arg(short, long, default_value = "materiais.xlsx")]
    file: PathBuf,

    /// Folder holding the database
    #[arg(short, long)]
    root_folder: Option<PathBuf>,

    /// Log level when RUST_LOG is unset
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let toml_config = TomlConfig::load_for_module(MODULE_NAME);
    let defaults = CompiledDefaults::for_current_platform();

    let log_level = first_configured(
        "log_level",
        args.log_level.clone(),
        Some(toml_config.logging.level.clone()),
        defaults.log_level,
    );
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log_level)),
        )
        .init();

    info!("Starting stockroom-import v{}", env!("CARGO_PKG_VERSION"));

    let root = RootFolderResolver::new(MODULE_NAME)
        .with_cli_arg(args.root_folder.clone())
        .with_toml(&toml_config)
        .resolve();
    let paths = RootFolderInitializer::new(root);
    paths
        .ensure_directory_exists()
        .with_context(|| format!("Failed to create root folder {}", paths.root().display()))?;

    let db_path = paths.database_path();
    let pool = init_database(&db_path)
        .await
        .with_context(|| format!("Failed to open database {}", db_path.display()))?;
    info!("Database: {}", db_path.display());
    info!("Importing {}", args.file.display());

    let report = import_file(&pool, &args.file)
        .await
        .with_context(|| format!("Import of {} failed", args.file.display()))?;

    info!(
        "Import finished: {} imported ({} created, {} updated), {} skipped, {} failed",
        report.imported(),
        report.created,
        report.updated,
        report.skipped,
        report.failed
    );
    if report.failed > 0 {
        warn!("{} rows could not be written, see errors above", report.failed);
    }

    pool.close().await;
    Ok(())
}
