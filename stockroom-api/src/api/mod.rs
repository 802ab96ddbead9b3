//! HTTP API handlers for stockroom-api

pub mod auth;
pub mod health;
pub mod materials;

pub use auth::auth_middleware;
pub use health::health_routes;
pub use materials::material_routes;
