//! Photo store
//!
//! Flat directory of uploaded images served under `/uploads/`. File names
//! are `<unix millis>-<random>-<sanitized original name>` so concurrent
//! uploads of the same file never collide.
//!
//! Removal is best-effort: a missing file is not an error, and any other
//! failure is logged so the record operation can proceed.

use rand::Rng;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{debug, warn};

/// URL prefix photos are served from
pub const URL_PREFIX: &str = "/uploads/";

const MAX_NAME_CHARS: usize = 100;

/// A photo written to the store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredPhoto {
    /// Relative URL persisted in the record
    pub url: String,
}

/// Directory-backed photo storage
#[derive(Debug, Clone)]
pub struct PhotoStore {
    dir: PathBuf,
}

impl PhotoStore {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Create the directory if missing
    pub async fn ensure_dir(&self) -> io::Result<()> {
        tokio::fs::create_dir_all(&self.dir).await
    }

    /// Write photo bytes under a freshly generated name
    pub async fn save(&self, original_name: &str, bytes: &[u8]) -> io::Result<StoredPhoto> {
        let filename = generate_filename(original_name);
        tokio::fs::write(self.dir.join(&filename), bytes).await?;
        debug!("Stored photo {} ({} bytes)", filename, bytes.len());

        Ok(StoredPhoto {
            url: url_for(&filename),
        })
    }

    /// Map a stored photo URL to a file inside the store
    ///
    /// Accepts relative URLs (`/uploads/x.jpg`) and legacy absolute URLs
    /// (`http://host/uploads/x.jpg`). Anything that would resolve outside the
    /// directory yields `None`.
    pub fn path_for_url(&self, url: &str) -> Option<PathBuf> {
        let start = url.find(URL_PREFIX)? + URL_PREFIX.len();
        let name = url[start..].split(['?', '#']).next()?;

        if name.is_empty()
            || name == "."
            || name == ".."
            || name.contains('/')
            || name.contains('\\')
        {
            return None;
        }

        Some(self.dir.join(name))
    }

    /// Remove the file behind a photo URL, ignoring absence
    pub async fn remove(&self, url: &str) {
        let Some(path) = self.path_for_url(url) else {
            warn!("Photo URL {} does not point into the photo store; not removed", url);
            return;
        };

        match tokio::fs::remove_file(&path).await {
            Ok(()) => debug!("Removed photo {}", path.display()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("Photo {} already absent", path.display())
            }
            Err(e) => warn!("Failed to remove photo {}: {}", path.display(), e),
        }
    }
}

/// Relative URL for a stored file name
pub fn url_for(filename: &str) -> String {
    format!("{}{}", URL_PREFIX, filename)
}

/// `<unix millis>-<random 0..1e9>-<sanitized name>`
pub fn generate_filename(original_name: &str) -> String {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default();
    let suffix: u32 = rand::thread_rng().gen_range(0..1_000_000_000);

    format!("{}-{}-{}", millis, suffix, sanitize_filename(original_name))
}

/// Keep the final path component and replace unsafe characters with `_`
pub fn sanitize_filename(original_name: &str) -> String {
    let base = original_name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default();

    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();

    // Keep the tail so the extension survives
    let skip = cleaned.chars().count().saturating_sub(MAX_NAME_CHARS);
    let cleaned: String = cleaned.chars().skip(skip).collect();

    if cleaned.trim_matches('.').is_empty() {
        "photo".to_string()
    } else {
        cleaned
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_sanitize_keeps_simple_names() {
        assert_eq!(sanitize_filename("disjuntor.jpg"), "disjuntor.jpg");
        assert_eq!(sanitize_filename("foto-01_a.PNG"), "foto-01_a.PNG");
    }

    #[test]
    fn test_sanitize_strips_directories_and_unsafe_chars() {
        assert_eq!(sanitize_filename("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_filename("C:\\fotos\\registro 3.jpg"), "registro_3.jpg");
        assert_eq!(sanitize_filename("elétrica.jpg"), "el_trica.jpg");
    }

    #[test]
    fn test_sanitize_empty_names() {
        assert_eq!(sanitize_filename(""), "photo");
        assert_eq!(sanitize_filename(".."), "photo");
        assert_eq!(sanitize_filename("dir/"), "photo");
    }

    #[test]
    fn test_sanitize_truncates_keeping_extension() {
        let long = format!("{}.jpg", "a".repeat(300));
        let cleaned = sanitize_filename(&long);
        assert_eq!(cleaned.chars().count(), MAX_NAME_CHARS);
        assert!(cleaned.ends_with(".jpg"));
    }

    #[test]
    fn test_generated_names_have_three_parts_and_differ() {
        let a = generate_filename("foto.jpg");
        let b = generate_filename("foto.jpg");
        assert_ne!(a, b);

        let parts: Vec<&str> = a.splitn(3, '-').collect();
        assert_eq!(parts.len(), 3);
        assert!(parts[0].parse::<u128>().is_ok());
        assert!(parts[1].parse::<u32>().unwrap() < 1_000_000_000);
        assert_eq!(parts[2], "foto.jpg");
    }

    #[test]
    fn test_path_for_url() {
        let store = PhotoStore::new(PathBuf::from("/data/uploads"));

        assert_eq!(
            store.path_for_url("/uploads/1-2-a.jpg"),
            Some(PathBuf::from("/data/uploads/1-2-a.jpg"))
        );
        assert_eq!(
            store.path_for_url("http://localhost:3333/uploads/1-2-a.jpg"),
            Some(PathBuf::from("/data/uploads/1-2-a.jpg"))
        );
        assert_eq!(store.path_for_url("/uploads/../secret"), None);
        assert_eq!(store.path_for_url("/uploads/.."), None);
        assert_eq!(store.path_for_url("/uploads/"), None);
        assert_eq!(store.path_for_url("https://cdn.example.com/a.jpg"), None);
    }

    #[tokio::test]
    async fn test_save_and_remove() {
        let temp = TempDir::new().unwrap();
        let store = PhotoStore::new(temp.path().join("uploads"));
        store.ensure_dir().await.unwrap();

        let stored = store.save("foto.jpg", b"jpeg-bytes").await.unwrap();
        assert!(stored.url.starts_with(URL_PREFIX));
        assert!(stored.url.ends_with("-foto.jpg"));

        let path = store.path_for_url(&stored.url).unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"jpeg-bytes");

        store.remove(&stored.url).await;
        assert!(!path.exists());

        // Second removal is a no-op
        store.remove(&stored.url).await;
    }

    #[tokio::test]
    async fn test_remove_never_written_photo_is_noop() {
        let temp = TempDir::new().unwrap();
        let store = PhotoStore::new(temp.path().join("uploads"));
        store.ensure_dir().await.unwrap();
        std::fs::write(store.dir().join("keep.jpg"), b"x").unwrap();

        store.remove("/uploads/1-2-missing.jpg").await;
        store.remove("http://old-host:3000/uploads/1-2-missing.jpg").await;

        assert!(store.dir().join("keep.jpg").exists());
    }
}
