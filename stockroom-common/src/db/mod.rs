//! Database initialization and material queries

pub mod init;
pub mod materials;

pub use init::*;
pub use materials::*;
