//! Credential and API-key verification
//!
//! # Architecture
//!
//! Two independent checks, both behind traits so deployments can plug in a
//! different store:
//! - [`ApiKeyVerifier`]: the shared secret every protected API request must
//!   carry in the [`API_KEY_HEADER`] header (checked by the API server)
//! - [`CredentialVerifier`]: username/password login that yields a [`Role`]
//!   (checked by the client before it opens a session)
//!
//! This module contains ONLY pure functions and types. HTTP middleware lives
//! in `stockroom-api`.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Header carrying the shared secret
pub const API_KEY_HEADER: &str = "x-api-key";

// ========================================
// Roles and credentials
// ========================================

/// Session role
///
/// `Master` is the elevated role allowed to create, edit and delete
/// materials. `Maintenance` may only list and filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Master,
    Maintenance,
}

impl Role {
    /// True for the role allowed to modify records
    pub fn is_elevated(self) -> bool {
        matches!(self, Role::Master)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Master => "master",
            Role::Maintenance => "maintenance",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One configured login
///
/// Loaded from the `[[users]]` tables of the TOML config.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserEntry {
    pub username: String,
    pub role: Role,
    pub password_salt: String,
    /// Hex SHA-256 of `password_salt + password`
    pub password_hash: String,
}

/// Verifies a username/password pair
pub trait CredentialVerifier {
    /// Role granted to the user, or `None` if the credentials are invalid
    fn verify(&self, username: &str, password: &str) -> Option<Role>;
}

/// Credential table loaded from configuration
#[derive(Debug, Clone, Default)]
pub struct CredentialTable {
    users: Vec<UserEntry>,
}

impl CredentialTable {
    pub fn new(users: Vec<UserEntry>) -> Self {
        Self { users }
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

impl CredentialVerifier for CredentialTable {
    fn verify(&self, username: &str, password: &str) -> Option<Role> {
        let user = self.users.iter().find(|u| u.username == username)?;
        let calculated = hash_password(&user.password_salt, password);

        if constant_time_eq(
            calculated.as_bytes(),
            user.password_hash.to_ascii_lowercase().as_bytes(),
        ) {
            Some(user.role)
        } else {
            None
        }
    }
}

/// Calculate the stored password hash
///
/// # Algorithm
///
/// 1. Concatenate salt and password
/// 2. Calculate SHA-256
/// 3. Return as 64 hex characters
///
/// # Examples
///
/// ```
/// use stockroom_common::auth::hash_password;
///
/// let hash = hash_password("salt", "665544");
/// assert_eq!(hash.len(), 64);
/// assert_eq!(hash, hash_password("salt", "665544"));
/// assert_ne!(hash, hash_password("other", "665544"));
/// ```
pub fn hash_password(salt: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    format!("{:x}", hasher.finalize())
}

// ========================================
// Shared secret
// ========================================

/// API key validation failure
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiKeyError {
    /// Header absent from request
    Missing,
    /// Header present but does not match
    Mismatch,
}

impl std::fmt::Display for ApiKeyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiKeyError::Missing => write!(f, "Missing API key"),
            ApiKeyError::Mismatch => write!(f, "Invalid API key"),
        }
    }
}

impl std::error::Error for ApiKeyError {}

/// Verifies the shared secret presented by a request
pub trait ApiKeyVerifier: Send + Sync {
    /// False when access control is switched off
    fn is_enabled(&self) -> bool;

    /// Check the header value (`None` when the header is absent)
    fn verify(&self, presented: Option<&str>) -> Result<(), ApiKeyError>;
}

/// Single statically configured secret
///
/// An empty secret disables checking. Comparison is over SHA-256 digests
/// in constant time.
#[derive(Clone)]
pub struct StaticApiKey {
    digest: Option<[u8; 32]>,
}

impl StaticApiKey {
    pub fn new(secret: &str) -> Self {
        if secret.is_empty() {
            return Self::disabled();
        }
        Self {
            digest: Some(Sha256::digest(secret.as_bytes()).into()),
        }
    }

    pub fn disabled() -> Self {
        Self { digest: None }
    }
}

impl std::fmt::Debug for StaticApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticApiKey")
            .field("enabled", &self.digest.is_some())
            .finish()
    }
}

impl ApiKeyVerifier for StaticApiKey {
    fn is_enabled(&self) -> bool {
        self.digest.is_some()
    }

    fn verify(&self, presented: Option<&str>) -> Result<(), ApiKeyError> {
        let Some(expected) = &self.digest else {
            return Ok(());
        };
        let presented = presented.ok_or(ApiKeyError::Missing)?;
        let digest: [u8; 32] = Sha256::digest(presented.as_bytes()).into();

        if constant_time_eq(&digest, expected) {
            Ok(())
        } else {
            Err(ApiKeyError::Mismatch)
        }
    }
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

// ========================================
// Tests
// ========================================
