//! Image and attachment uploads to object storage.

use std::{fs, path::Path};

use rand::Rng;
use serde::Serialize;
use tracing::{debug, warn};
use vitrine_rest::{query::decode_component, FileOptions, RestError};
use vitrine_utils::string::to_base36;

use crate::{
    error::{CoreError, CoreResult, ErrorContext},
    AppContext,
};

const CACHE_CONTROL: &str = "3600";

/// A file to upload, held in memory.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImageFile {
    pub name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl ImageFile {
    pub fn new(name: impl Into<String>, content_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            content_type: content_type.into(),
            bytes,
        }
    }

    /// Reads a file from disk, guessing its content type from the extension.
    pub fn from_path(path: &Path) -> CoreResult<Self> {
        let bytes =
            fs::read(path).with_context(|| format!("reading {}", path.display()))?;
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .ok_or_else(|| CoreError::Custom(format!("{} is not a file", path.display())))?;
        let content_type = guess_content_type(&name).to_string();

        Ok(Self {
            name,
            content_type,
            bytes,
        })
    }

    pub fn is_image(&self) -> bool {
        self.content_type.starts_with("image/")
    }
}

pub fn guess_content_type(name: &str) -> &'static str {
    let ext = name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "avif" => "image/avif",
        "svg" => "image/svg+xml",
        "bmp" => "image/bmp",
        "ico" => "image/x-icon",
        "pdf" => "application/pdf",
        "txt" => "text/plain",
        _ => "application/octet-stream",
    }
}

/// Unique object name: `<millis>-<random base36>.<ext>`.
pub fn object_name(file_name: &str, millis: u64, random: u64) -> String {
    let ext = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext)
        .filter(|ext| !ext.is_empty())
        .unwrap_or("bin");
    format!("{millis}-{}.{ext}", to_base36(random))
}

fn now_millis() -> u64 {
    u64::try_from(chrono::Utc::now().timestamp_millis()).unwrap_or_default()
}

/// A file skipped during a batch upload.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct UploadFailure {
    pub name: String,
    pub reason: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct UploadReport {
    /// Public URLs of the uploaded files, in input order.
    pub urls: Vec<String>,
    pub failures: Vec<UploadFailure>,
}

fn storage_error(err: RestError, bucket: &str) -> CoreError {
    if err.api_error().is_some_and(|e| e.is_bucket_not_found()) {
        return CoreError::BucketNotFound {
            bucket: bucket.to_string(),
        };
    }
    CoreError::Rest(err)
}

/// Uploads product images next to `existing` ones.
///
/// Non-image files and per-file backend errors are skipped and reported; a
/// missing bucket or an unconfigured client aborts the batch.
pub async fn upload_images(
    ctx: &AppContext,
    existing: usize,
    files: Vec<ImageFile>,
) -> CoreResult<UploadReport> {
    let max = ctx.config().max_images();
    if existing + files.len() > max {
        return Err(CoreError::TooManyImages { max });
    }

    let bucket_name = ctx.config().image_bucket();
    let bucket = ctx.client().storage().from(bucket_name);
    let mut report = UploadReport::default();

    for file in files {
        if !file.is_image() {
            let err = CoreError::NotAnImage {
                name: file.name.clone(),
                content_type: file.content_type.clone(),
            };
            warn!("{err}");
            report.failures.push(UploadFailure {
                name: file.name,
                reason: err.to_string(),
            });
            continue;
        }

        let path = object_name(&file.name, now_millis(), rand::thread_rng().gen());
        let options = FileOptions::default()
            .content_type(file.content_type.as_str())
            .cache_control(CACHE_CONTROL)
            .upsert(false);

        match bucket.upload(&path, file.bytes, options).await {
            Ok(uploaded) => {
                debug!(name = %file.name, path = %uploaded.path, "image uploaded");
                report.urls.push(bucket.get_public_url(&uploaded.path));
            }
            Err(err) => {
                let err = storage_error(err, bucket_name);
                if matches!(err, CoreError::BucketNotFound { .. } | CoreError::Rest(RestError::NotConfigured)) {
                    return Err(err);
                }
                warn!(name = %file.name, "upload failed: {err}");
                report.failures.push(UploadFailure {
                    name: file.name,
                    reason: err.to_string(),
                });
            }
        }
    }

    debug!(
        uploaded = report.urls.len(),
        failed = report.failures.len(),
        "image upload finished"
    );
    Ok(report)
}

/// Uploads a quote attachment as `<millis>-<file name>` and returns its public URL.
pub async fn upload_attachment(ctx: &AppContext, file: ImageFile) -> CoreResult<String> {
    let bucket_name = ctx.config().image_bucket();
    let bucket = ctx.client().storage().from(bucket_name);
    let path = format!("{}-{}", now_millis(), file.name);
    let options = FileOptions::default().content_type(file.content_type);

    let uploaded = bucket
        .upload(&path, file.bytes, options)
        .await
        .map_err(|err| storage_error(err, bucket_name))?;
    Ok(bucket.get_public_url(&uploaded.path))
}

/// Removes an uploaded object given its public URL.
pub async fn remove_uploaded_image(ctx: &AppContext, url: &str) -> CoreResult<()> {
    let name = url
        .rsplit('/')
        .next()
        .filter(|name| !name.is_empty())
        .map(decode_component)
        .ok_or_else(|| CoreError::Custom(format!("`{url}` does not name a stored object")))?;

    let bucket_name = ctx.config().image_bucket();
    let removed = ctx
        .client()
        .storage()
        .from(bucket_name)
        .remove(&[name.as_str()])
        .await
        .map_err(|err| storage_error(err, bucket_name))?;
    if removed.is_empty() {
        debug!(%name, "object was already gone");
    }
    Ok(())
}
