//! # Booking API
//!
//! The three backend calls an edit session makes, behind a trait so the
//! session driver can run against the real HTTP client or an in-memory fake.
//!
//! ```text
//! GET  services/{id}                  → Service (bare or {status, data})
//! POST seeb-cart/uploadImages         → {status, data: {images: [uri, ...]}}  (201)
//! PUT  seeb-cart/update/{cartItemId}  → 200
//! ```

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use url::Url;

use seeb_core::{CartItemId, CartUpdatePayload, Service, ServiceId};

use crate::error::{ClientError, ClientResult};

// =============================================================================
// Booking API Trait
// =============================================================================

/// Catalog and cart operations used by the session driver.
#[async_trait]
pub trait BookingApi: Send + Sync {
    /// Fetches a service with its add-on catalog.
    ///
    /// Returns `ClientError::ServiceNotFound` when the backend has no such
    /// service.
    async fn fetch_service(&self, id: ServiceId) -> ClientResult<Service>;

    /// Uploads picked images and returns their hosted URIs in upload order.
    async fn upload_images(&self, images: Vec<ImageUpload>) -> ClientResult<Vec<String>>;

    /// Replaces a cart line item's configuration.
    async fn update_cart_item(
        &self,
        id: CartItemId,
        payload: &CartUpdatePayload,
    ) -> ClientResult<()>;
}

// =============================================================================
// Response Envelope
// =============================================================================

/// `{status, message, data}` wrapper used by most endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct Envelope<T> {
    #[serde(default)]
    pub status: Option<serde_json::Value>,

    #[serde(default)]
    pub message: Option<String>,

    #[serde(default)]
    pub data: Option<T>,
}

/// `data` of a successful upload.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UploadedImages {
    #[serde(default)]
    pub images: Vec<String>,
}

// =============================================================================
// Image Upload
// =============================================================================

/// One picked image, read into memory for a multipart upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let file_name = file_name.into();
        let content_type = content_type_for(Path::new(&file_name)).to_string();
        ImageUpload {
            file_name,
            content_type,
            bytes,
        }
    }

    /// Reads a device-local image given as a `file://` URI or a plain path.
    pub async fn read(uri: &str) -> ClientResult<Self> {
        let path = local_path(uri)?;
        let bytes = tokio::fs::read(&path).await.map_err(|e| ClientError::ImageRead {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "image.jpg".to_string());

        Ok(ImageUpload::new(file_name, bytes))
    }
}

fn local_path(uri: &str) -> ClientResult<PathBuf> {
    if uri.starts_with("file:") {
        let url = Url::parse(uri)?;
        url.to_file_path().map_err(|_| ClientError::ImageRead {
            path: uri.to_string(),
            reason: "not a local file URI".to_string(),
        })
    } else {
        Ok(PathBuf::from(uri))
    }
}

/// MIME type from the file extension; JPEG when unknown.
pub fn content_type_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    match ext.as_deref() {
        Some("png") => "image/png",
        Some("webp") => "image/webp",
        Some("heic") => "image/heic",
        Some("heif") => "image/heif",
        Some("gif") => "image/gif",
        _ => "image/jpeg",
    }
}
