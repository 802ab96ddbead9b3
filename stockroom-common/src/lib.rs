//! # Stockroom Common Library
//!
//! Shared code for the Stockroom binaries including:
//! - Material record model and database queries
//! - Text normalization (uppercase storage, accent-insensitive search)
//! - Credential and API-key verification
//! - Configuration loading and root folder resolution
//! - Common error type

pub mod auth;
pub mod categories;
pub mod config;
#[cfg(feature = "sqlx")]
pub mod db;
pub mod error;
pub mod model;
pub mod text;

pub use error::{Error, Result};
pub use model::{Material, MaterialFields};
