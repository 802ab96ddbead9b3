//! stockroom-cli library
//!
//! Terminal client for stockroom-api: login sessions with role gating,
//! filtered listing, and the create/edit/delete flows.

pub mod client;
pub mod config;
pub mod error;
pub mod filter;
pub mod form;
pub mod session;

pub use crate::client::{resolve_photo_url, ApiClient};
pub use crate::error::{ClientError, Result};
pub use crate::filter::MaterialFilter;
pub use crate::form::{MaterialForm, PhotoPreview};
pub use crate::session::{Session, SessionStore};
