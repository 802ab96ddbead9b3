//! HTTP client for stockroom-api
//!
//! Every request carries the shared secret in the `x-api-key` header. A 401
//! becomes [`ClientError::Unauthorized`]; other failures carry the server's
//! `error` detail.

use reqwest::multipart::{Form, Part};
use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use stockroom_common::auth::API_KEY_HEADER;
use stockroom_common::Material;
use tracing::debug;

use crate::error::{ClientError, Result};
use crate::form::MaterialForm;

/// Error body returned by the API
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

#[derive(Debug, Deserialize)]
struct MessageBody {
    message: String,
}

/// stockroom-api client
#[derive(Debug, Clone)]
pub struct ApiClient {
    http_client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl ApiClient {
    pub fn new(base_url: &str, api_key: &str) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// All materials, newest first
    pub async fn list(&self) -> Result<Vec<Material>> {
        debug!("GET /materiais");
        let response = self
            .http_client
            .get(self.url("/materiais"))
            .header(API_KEY_HEADER, &self.api_key)
            .send()
            .await?;

        decode(check(response).await?).await
    }

    /// POST for a new form, PUT for an edit form
    pub async fn submit(&self, form: &MaterialForm) -> Result<Material> {
        let body = multipart(form).await?;

        let request = match form.editing {
            Some(id) => {
                debug!("PUT /materiais/{}", id);
                self.http_client.put(self.url(&format!("/materiais/{}", id)))
            }
            None => {
                debug!("POST /materiais");
                self.http_client.post(self.url("/materiais"))
            }
        };

        let response = request
            .header(API_KEY_HEADER, &self.api_key)
            .multipart(body)
            .send()
            .await?;

        decode(check(response).await?).await
    }

    /// Delete by id; returns the server's confirmation message
    pub async fn delete(&self, id: i64) -> Result<String> {
        debug!("DELETE /materiais/{}", id);
        let response = self
            .http_client
            .delete(self.url(&format!("/materiais/{}", id)))
            .header(API_KEY_HEADER, &self.api_key)
            .send()
            .await?;

        let body: MessageBody = decode(check(response).await?).await?;
        Ok(body.message)
    }
}

/// Multipart body from a validated form
async fn multipart(form: &MaterialForm) -> Result<Form> {
    let fields = form.validate()?;

    let mut body = Form::new()
        .text("code", fields.code().to_string())
        .text("description", fields.description().to_string())
        .text("category", fields.category().to_string());

    if let Some(path) = form.photo_to_upload() {
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "photo".to_string());
        body = body.part("photo", Part::bytes(bytes).file_name(file_name));
    }

    Ok(body)
}

/// Pass successful responses through; map failures to [`ClientError`]
async fn check(response: Response) -> Result<Response> {
    let status = response.status();

    if status.is_success() {
        return Ok(response);
    }

    if status == StatusCode::UNAUTHORIZED {
        return Err(ClientError::Unauthorized);
    }

    let text = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&text)
        .map(|body| body.error)
        .unwrap_or_else(|_| {
            if text.is_empty() {
                status.canonical_reason().unwrap_or("Unknown error").to_string()
            } else {
                text
            }
        });

    Err(ClientError::Server {
        status: status.as_u16(),
        message,
    })
}

/// Parse a successful response body
///
/// A body that cannot be read or parsed is reported as an unexpected
/// response, not a connection failure.
async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
    let text = response.text().await?;
    serde_json::from_str(&text).map_err(|e| ClientError::InvalidResponse(e.to_string()))
}

/// Absolute URL for a stored photo
///
/// Relative URLs (`/uploads/<file>`) are joined to the API base; absolute
/// URLs from older records are returned unchanged.
pub fn resolve_photo_url(base_url: &str, photo_url: &str) -> String {
    if photo_url.starts_with("http://") || photo_url.starts_with("https://") {
        return photo_url.to_string();
    }

    let base = base_url.trim_end_matches('/');
    if photo_url.starts_with('/') {
        format!("{}{}", base, photo_url)
    } else {
        format!("{}/{}", base, photo_url)
    }
}
