use async_trait::async_trait;
use base64::{engine::general_purpose, Engine as _};
use google_cloud_storage::client::{Client, ClientConfig};
use google_cloud_storage::http::objects::upload::{Media, UploadObjectRequest, UploadType};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, LazyLock};
use uuid::Uuid;

static FOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9][a-z0-9/_-]{0,63}$").expect("valid folder pattern"));

const DEFAULT_FOLDER: &str = "uploads";
const BASE64_REQUEST_OVERHEAD: usize = 16 * 1024;

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ImageData {
    pub data: String,
    #[serde(rename = "fileName")]
    pub file_name: String,
    #[serde(rename = "fileType")]
    pub file_type: String,
    #[serde(rename = "fileSize")]
    pub file_size: u64,
    #[serde(default)]
    pub folder: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UploadedImage {
    pub url: String,
    pub object_name: String,
    pub content_type: String,
    pub size: usize,
}

#[derive(Debug, thiserror::Error)]
pub enum ImageUploadError {
    #[error("Base64 decode error: {0}")]
    Base64Decode(String),

    #[error("Invalid image format: {0}")]
    InvalidImageFormat(String),

    #[error("Image is {size} bytes, the limit is {limit}")]
    TooLarge { size: usize, limit: usize },

    #[error("Image is empty")]
    Empty,

    #[error("Declared file size {declared} does not match the decoded {actual} bytes")]
    SizeMismatch { declared: u64, actual: usize },

    #[error("Invalid upload folder: {0}")]
    InvalidFolder(String),

    #[error("Storage upload error: {0}")]
    Storage(String),
}

/// Where uploaded bytes end up. Returns the public URL of the stored object.
#[async_trait]
pub trait ImageStorage: Send + Sync {
    async fn put(
        &self,
        object_name: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, ImageUploadError>;
}

pub struct GcsImageStorage {
    client: Client,
    bucket_name: String,
    base_url: String,
}

impl GcsImageStorage {
    pub async fn new(bucket_name: String, base_url: String) -> Result<Self, ImageUploadError> {
        let config = ClientConfig::default().with_auth().await.map_err(|e| {
            ImageUploadError::Storage(format!("Failed to create GCS client: {}", e))
        })?;

        Ok(Self {
            client: Client::new(config),
            bucket_name,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl ImageStorage for GcsImageStorage {
    async fn put(
        &self,
        object_name: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, ImageUploadError> {
        let mut media = Media::new(object_name.to_string());
        media.content_type = content_type.to_string().into();
        let upload_type = UploadType::Simple(media);
        let upload_request = UploadObjectRequest {
            bucket: self.bucket_name.clone(),
            ..Default::default()
        };

        self.client
            .upload_object(&upload_request, bytes, &upload_type)
            .await
            .map_err(|e| ImageUploadError::Storage(format!("Failed to upload to GCS: {}", e)))?;

        Ok(format!(
            "{}/{}/{}",
            self.base_url, self.bucket_name, object_name
        ))
    }
}

pub struct ImageService {
    storage: Arc<dyn ImageStorage>,
    max_bytes: usize,
}

impl ImageService {
    pub fn new(storage: Arc<dyn ImageStorage>, max_bytes: usize) -> Self {
        Self { storage, max_bytes }
    }

    pub fn file_extension(file_type: &str) -> Result<&'static str, ImageUploadError> {
        match file_type {
            "image/jpeg" | "image/jpg" => Ok("jpg"),
            "image/png" => Ok("png"),
            "image/gif" => Ok("gif"),
            "image/webp" => Ok("webp"),
            _ => Err(ImageUploadError::InvalidImageFormat(format!(
                "Unsupported file type: {}",
                file_type
            ))),
        }
    }

    /// Accepts raw base64 or a `data:<type>;base64,<payload>` URI.
    pub fn decode_base64(data: &str) -> Result<Vec<u8>, ImageUploadError> {
        let payload = if data.starts_with("data:") {
            data.split(',').nth(1).ok_or_else(|| {
                ImageUploadError::InvalidImageFormat("Invalid base64 data format".to_string())
            })?
        } else {
            data
        };

        general_purpose::STANDARD
            .decode(payload.trim())
            .map_err(|e| ImageUploadError::Base64Decode(e.to_string()))
    }

    /// `{tenant}/{folder}/{timestamp}-{uuid}.{ext}`. The tenant is already a validated slug.
    pub fn object_name(
        tenant: &str,
        folder: Option<&str>,
        extension: &str,
    ) -> Result<String, ImageUploadError> {
        let folder = folder
            .map(|f| f.trim().trim_matches('/'))
            .filter(|f| !f.is_empty())
            .unwrap_or(DEFAULT_FOLDER);
        if !FOLDER.is_match(folder) || folder.contains("..") {
            return Err(ImageUploadError::InvalidFolder(folder.to_string()));
        }

        let timestamp = chrono::Utc::now().timestamp();
        Ok(format!(
            "{}/{}/{}-{}.{}",
            tenant,
            folder,
            timestamp,
            Uuid::new_v4(),
            extension
        ))
    }

    pub async fn upload_bytes(
        &self,
        tenant: &str,
        bytes: Vec<u8>,
        content_type: &str,
        folder: Option<&str>,
    ) -> Result<UploadedImage, ImageUploadError> {
        if bytes.is_empty() {
            return Err(ImageUploadError::Empty);
        }
        if bytes.len() > self.max_bytes {
            return Err(ImageUploadError::TooLarge {
                size: bytes.len(),
                limit: self.max_bytes,
            });
        }

        let extension = Self::file_extension(content_type)?;
        let object_name = Self::object_name(tenant, folder, extension)?;
        let size = bytes.len();
        let url = self.storage.put(&object_name, bytes, content_type).await?;

        log::info!("Uploaded {} ({} bytes)", object_name, size);
        Ok(UploadedImage {
            url,
            object_name,
            content_type: content_type.to_string(),
            size,
        })
    }

    pub async fn upload_base64(
        &self,
        tenant: &str,
        image: ImageData,
    ) -> Result<UploadedImage, ImageUploadError> {
        if image.file_size > self.max_bytes as u64 {
            return Err(ImageUploadError::TooLarge {
                size: usize::try_from(image.file_size).unwrap_or(usize::MAX),
                limit: self.max_bytes,
            });
        }

        let bytes = Self::decode_base64(&image.data)?;
        if bytes.len() as u64 != image.file_size {
            return Err(ImageUploadError::SizeMismatch {
                declared: image.file_size,
                actual: bytes.len(),
            });
        }

        self.upload_bytes(tenant, bytes, &image.file_type, image.folder.as_deref())
            .await
    }

    /// Largest JSON body `upload_base64` needs to accept: base64 grows the
    /// payload by a third, plus room for a data URI prefix and the other fields.
    pub fn max_request_bytes(&self) -> usize {
        self.max_bytes.div_ceil(3) * 4 + BASE64_REQUEST_OVERHEAD
    }
}
