//! Object storage: uploads, removals and public URLs.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;
use ureq::http::Method;

use crate::{
    client::{decode, encode, Client},
    error::Result,
    http::CONTENT_TYPE_JSON,
    query::encode_component,
};

const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Percent-encodes each `/`-separated segment of an object path.
fn encode_path(path: &str) -> String {
    path.split('/')
        .map(encode_component)
        .collect::<Vec<_>>()
        .join("/")
}

#[derive(Clone, Debug)]
pub struct StorageClient {
    client: Client,
}

impl StorageClient {
    pub(crate) fn new(client: Client) -> Self {
        Self {
            client,
        }
    }

    pub fn from(&self, bucket: impl Into<String>) -> Bucket {
        Bucket {
            client: self.client.clone(),
            bucket: bucket.into(),
        }
    }
}

/// Options forwarded as headers on upload.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FileOptions {
    /// Seconds (sent as `max-age=<n>`) or a full `cache-control` value.
    pub cache_control: Option<String>,
    /// Overwrite an existing object instead of failing.
    pub upsert: Option<bool>,
    pub content_type: Option<String>,
}

impl FileOptions {
    pub fn content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    pub fn cache_control(mut self, cache_control: impl Into<String>) -> Self {
        self.cache_control = Some(cache_control.into());
        self
    }

    pub fn upsert(mut self, upsert: bool) -> Self {
        self.upsert = Some(upsert);
        self
    }

    fn cache_control_header(&self) -> Option<String> {
        self.cache_control.as_deref().map(|value| {
            if !value.is_empty() && value.bytes().all(|b| b.is_ascii_digit()) {
                format!("max-age={value}")
            } else {
                value.to_string()
            }
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadResponse {
    /// Object path inside the bucket.
    pub path: String,
    /// `<bucket>/<path>` as reported by the backend, when present.
    pub key: Option<String>,
}

#[derive(Deserialize)]
struct UploadBody {
    #[serde(rename = "Key")]
    key: Option<String>,
}

#[derive(Serialize)]
struct RemoveBody<'a> {
    prefixes: Vec<&'a str>,
}

/// Operations on one storage bucket.
#[derive(Clone, Debug)]
pub struct Bucket {
    client: Client,
    bucket: String,
}

impl Bucket {
    pub fn name(&self) -> &str {
        &self.bucket
    }

    /// Uploads `bytes` to `<bucket>/<path>`.
    pub async fn upload(
        &self,
        path: &str,
        bytes: impl Into<Vec<u8>>,
        options: FileOptions,
    ) -> Result<UploadResponse> {
        let endpoint = self.client.endpoint()?;
        let content_type = options
            .content_type
            .clone()
            .unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string());

        let mut request = endpoint
            .request(
                Method::POST,
                &format!("storage/v1/object/{}/{}", self.bucket, encode_path(path)),
            )
            .header("Content-Type", content_type);
        if let Some(cache_control) = options.cache_control_header() {
            request = request.header("cache-control", cache_control);
        }
        if let Some(upsert) = options.upsert {
            request = request.header("x-upsert", upsert.to_string());
        }

        let response = self.client.dispatch(request.body(bytes.into())).await?;
        let key = decode::<Option<UploadBody>>(&response.body)
            .ok()
            .flatten()
            .and_then(|body| body.key);
        debug!(bucket = %self.bucket, path, "uploaded object");

        Ok(UploadResponse {
            path: path.to_string(),
            key,
        })
    }

    /// Deletes the given object paths and returns the backend's listing of
    /// removed objects.
    pub async fn remove<S: AsRef<str>>(&self, paths: &[S]) -> Result<Vec<Value>> {
        let endpoint = self.client.endpoint()?;
        let body = encode(&RemoveBody {
            prefixes: paths.iter().map(AsRef::as_ref).collect(),
        })?;
        let request = endpoint
            .request(Method::DELETE, &format!("storage/v1/object/{}", self.bucket))
            .header("Content-Type", CONTENT_TYPE_JSON)
            .body(body);

        let response = self.client.dispatch(request).await?;
        let removed: Option<Vec<Value>> = decode(&response.body)?;
        Ok(removed.unwrap_or_default())
    }

    /// Public URL of an object. Pure string construction; an unconfigured
    /// client yields an empty string.
    pub fn get_public_url(&self, path: &str) -> String {
        match self.client.base_url() {
            Some(base_url) => {
                format!(
                    "{base_url}/storage/v1/object/public/{}/{}",
                    self.bucket,
                    encode_path(path)
                )
            }
            None => String::new(),
        }
    }
}
