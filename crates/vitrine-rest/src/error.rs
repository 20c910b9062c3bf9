use std::fmt;

use miette::Diagnostic;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

/// Error body returned by the REST or storage backend.
///
/// PostgREST answers with `{code, message, details, hint}`; the storage API
/// uses `{statusCode, error, message}`. Both shapes land here, and the raw
/// body is kept for anything else.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct ApiError {
    #[serde(default)]
    pub message: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub code: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub details: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub hint: Option<String>,
    #[serde(default, rename = "error", deserialize_with = "lenient_string")]
    pub kind: Option<String>,
    #[serde(skip)]
    pub raw: Option<Value>,
}

fn lenient_string<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s),
        Some(other) => Some(other.to_string()),
    })
}

impl ApiError {
    /// Builds an error from a non-2xx response body.
    ///
    /// Bodies that are not JSON objects keep their text as the message.
    pub fn from_body(status: u16, body: &[u8]) -> Self {
        let text = String::from_utf8_lossy(body);
        match serde_json::from_slice::<Value>(body) {
            Ok(value @ Value::Object(_)) => {
                let mut error: ApiError =
                    serde_json::from_value(value.clone()).unwrap_or_default();
                if error.message.is_empty() {
                    error.message = error
                        .kind
                        .clone()
                        .unwrap_or_else(|| format!("HTTP {status}"));
                }
                error.raw = Some(value);
                error
            }
            Ok(value) => {
                Self {
                    message: value.to_string(),
                    raw: Some(value),
                    ..Self::default()
                }
            }
            Err(_) if text.trim().is_empty() => {
                Self {
                    message: format!("HTTP {status}"),
                    ..Self::default()
                }
            }
            Err(_) => {
                Self {
                    message: text.trim().to_string(),
                    ..Self::default()
                }
            }
        }
    }

    /// Whether the storage backend reported a missing bucket.
    pub fn is_bucket_not_found(&self) -> bool {
        let needle = "bucket not found";
        self.message.to_lowercase().contains(needle)
            || self
                .kind
                .as_deref()
                .is_some_and(|k| k.to_lowercase().contains(needle))
    }

    /// Whether PostgREST refused a singular response because zero or many rows matched.
    pub fn is_not_single_row(&self) -> bool {
        self.code.as_deref() == Some("PGRST116")
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;
        if let Some(code) = &self.code {
            write!(f, " ({code})")?;
        }
        if let Some(details) = &self.details {
            write!(f, ": {details}")?;
        }
        Ok(())
    }
}

#[derive(Error, Diagnostic, Debug)]
pub enum RestError {
    #[error("REST backend is not configured")]
    #[diagnostic(
        code(vitrine_rest::not_configured),
        help("Set BASE_URL and API_KEY in the environment or in config.toml")
    )]
    NotConfigured,

    #[error("HTTP {status}: {error}")]
    #[diagnostic(code(vitrine_rest::api))]
    Api { status: u16, error: ApiError },

    #[error(transparent)]
    #[diagnostic(
        code(vitrine_rest::network),
        help("Check your internet connection or try again later")
    )]
    Network(#[from] Box<ureq::Error>),

    #[error(transparent)]
    #[diagnostic(code(vitrine_rest::io))]
    Io(#[from] std::io::Error),

    #[error("Failed to encode request body: {0}")]
    #[diagnostic(code(vitrine_rest::encode))]
    Encode(#[source] serde_json::Error),

    #[error("Failed to decode response body: {0}")]
    #[diagnostic(
        code(vitrine_rest::decode),
        help("The response shape does not match the requested type")
    )]
    Decode(#[source] serde_json::Error),

    #[error("Invalid URL: {url}")]
    #[diagnostic(code(vitrine_rest::invalid_url))]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("Refusing to {method} `{table}` without a filter")]
    #[diagnostic(
        code(vitrine_rest::missing_filter),
        help("Add at least one `.eq(column, value)` to the chain")
    )]
    MissingFilter { method: &'static str, table: String },

    #[error("Unsupported HTTP method: {0}")]
    #[diagnostic(code(vitrine_rest::unsupported))]
    Unsupported(String),
}

impl RestError {
    /// Failures that happened before a response was received.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Network(_) | Self::Io(_))
    }

    /// The backend error body, if this is a backend rejection.
    pub fn api_error(&self) -> Option<&ApiError> {
        match self {
            Self::Api { error, .. } => Some(error),
            _ => None,
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<ureq::Error> for RestError {
    fn from(e: ureq::Error) -> Self {
        Self::Network(Box::new(e))
    }
}

pub type Result<T> = std::result::Result<T, RestError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_from_postgrest_body() {
        let body = br#"{"code":"PGRST116","details":"The result contains 0 rows","hint":null,"message":"JSON object requested, multiple (or no) rows returned"}"#;
        let err = ApiError::from_body(406, body);
        assert_eq!(err.code.as_deref(), Some("PGRST116"));
        assert_eq!(err.details.as_deref(), Some("The result contains 0 rows"));
        assert!(err.hint.is_none());
        assert!(err.is_not_single_row());
        assert!(err.raw.is_some());
        assert!(err.to_string().contains("(PGRST116)"));
    }

    #[test]
    fn test_api_error_from_storage_body() {
        let body = br#"{"statusCode":"404","error":"Bucket not found","message":"Bucket not found"}"#;
        let err = ApiError::from_body(400, body);
        assert!(err.is_bucket_not_found());

        let body = br#"{"statusCode":404,"error":"Bucket not found"}"#;
        let err = ApiError::from_body(404, body);
        assert_eq!(err.message, "Bucket not found");
        assert!(err.is_bucket_not_found());
    }

    #[test]
    fn test_api_error_from_non_json_body() {
        let err = ApiError::from_body(502, b"Bad Gateway\n");
        assert_eq!(err.message, "Bad Gateway");
        assert!(err.raw.is_none());

        let err = ApiError::from_body(500, b"");
        assert_eq!(err.message, "HTTP 500");
    }

    #[test]
    fn test_rest_error_display() {
        let err = RestError::Api {
            status: 409,
            error: ApiError {
                message: "duplicate key value".into(),
                code: Some("23505".into()),
                ..ApiError::default()
            },
        };
        assert_eq!(err.to_string(), "HTTP 409: duplicate key value (23505)");
        assert_eq!(err.status(), Some(409));
        assert!(!err.is_transport());

        let err = RestError::MissingFilter {
            method: "DELETE",
            table: "produtos".into(),
        };
        assert_eq!(
            err.to_string(),
            "Refusing to DELETE `produtos` without a filter"
        );
    }

    #[test]
    fn test_from_ureq_error() {
        let err: RestError = ureq::Error::ConnectionFailed.into();
        assert!(matches!(err, RestError::Network(_)));
        assert!(err.is_transport());
        assert!(err.api_error().is_none());
    }
}
