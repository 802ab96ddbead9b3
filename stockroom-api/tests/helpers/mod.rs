//! Shared helpers for stockroom-api integration tests

#![allow(dead_code)]

use axum::{
    body::Body,
    http::{Request, Response},
    Router,
};
use http_body_util::BodyExt;
use serde_json::Value;
use std::path::PathBuf;
use std::sync::Arc;
use stockroom_api::{build_router, AppState, PhotoStore};
use stockroom_common::auth::StaticApiKey;
use stockroom_common::db::init_database;
use tempfile::TempDir;

pub const API_KEY: &str = "test-secret";
pub const BOUNDARY: &str = "----stockroom-test-boundary";

/// Test application backed by a temp-dir database and photo store
pub struct TestApp {
    pub dir: TempDir,
    pub state: AppState,
}

impl TestApp {
    /// App with API key checking enabled
    pub async fn new() -> Self {
        Self::with_key(API_KEY).await
    }

    /// App with an explicit key ("" disables checking)
    pub async fn with_key(key: &str) -> Self {
        let dir = TempDir::new().unwrap();
        let db = init_database(&dir.path().join("stockroom.db")).await.unwrap();
        let photos = PhotoStore::new(dir.path().join("uploads"));
        photos.ensure_dir().await.unwrap();

        let state = AppState::new(db, photos, Arc::new(StaticApiKey::new(key)));
        Self { dir, state }
    }

    pub fn router(&self) -> Router {
        build_router(self.state.clone())
    }

    pub fn uploads_dir(&self) -> PathBuf {
        self.dir.path().join("uploads")
    }

    /// Number of files currently in the photo store
    pub fn photo_count(&self) -> usize {
        std::fs::read_dir(self.uploads_dir()).unwrap().count()
    }

    pub fn photo_path(&self, url: &str) -> PathBuf {
        self.state.photos.path_for_url(url).unwrap()
    }
}

/// Multipart body with text fields and an optional `photo` file part
pub fn multipart_body(fields: &[(&str, &str)], photo: Option<(&str, &[u8])>) -> Vec<u8> {
    let mut body = Vec::new();

    for (name, value) in fields {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        body.extend_from_slice(
            format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", name).as_bytes(),
        );
        body.extend_from_slice(value.as_bytes());
        body.extend_from_slice(b"\r\n");
    }

    if let Some((file_name, bytes)) = photo {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        body.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"photo\"; filename=\"{}\"\r\n",
                file_name
            )
            .as_bytes(),
        );
        body.extend_from_slice(b"Content-Type: image/jpeg\r\n\r\n");
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }

    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}

/// Multipart request carrying the test API key
pub fn multipart_request(
    method: &str,
    uri: &str,
    fields: &[(&str, &str)],
    photo: Option<(&str, &[u8])>,
) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("x-api-key", API_KEY)
        .header(
            "content-type",
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(multipart_body(fields, photo)))
        .unwrap()
}

/// Body-less request carrying the test API key
pub fn request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("x-api-key", API_KEY)
        .body(Body::empty())
        .unwrap()
}

/// Collect a response body as JSON
pub async fn json_body(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).expect("Should parse JSON")
}

/// Collect a response body as raw bytes
pub async fn raw_body(response: Response<Body>) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .unwrap()
        .to_bytes()
        .to_vec()
}
