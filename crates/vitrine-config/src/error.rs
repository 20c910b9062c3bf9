use miette::Diagnostic;
use thiserror::Error;
use vitrine_utils::error::{PathError, UtilsError};

#[derive(Error, Diagnostic, Debug)]
pub enum ConfigError {
    #[error("TOML serialization error: {0}")]
    #[diagnostic(
        code(vitrine_config::toml_serialize),
        help("Check your configuration structure for invalid values")
    )]
    TomlSerError(#[from] toml::ser::Error),

    #[error("TOML deserialization error: {0}")]
    #[diagnostic(
        code(vitrine_config::toml_deserialize),
        help("Check your config.toml syntax and structure")
    )]
    TomlDeError(#[from] toml::de::Error),

    #[error("Configuration file already exists: {0}")]
    #[diagnostic(
        code(vitrine_config::already_exists),
        help("Remove the existing config file or use a different location")
    )]
    ConfigAlreadyExists(String),

    #[error("Invalid base URL `{url}`")]
    #[diagnostic(
        code(vitrine_config::invalid_base_url),
        help("Use the absolute http(s) root of the backend, e.g. https://project.example.co")
    )]
    InvalidBaseUrl {
        url: String,
        #[source]
        source: Option<url::ParseError>,
    },

    #[error("Invalid duration for `{field}`: {value}")]
    #[diagnostic(
        code(vitrine_config::invalid_duration),
        help("Durations look like `30s`, `15m`, `12h` or `7d`")
    )]
    InvalidDuration { field: &'static str, value: String },

    #[error("`max_images` must be at least 1 (got {0})")]
    #[diagnostic(code(vitrine_config::invalid_max_images))]
    InvalidMaxImages(usize),

    #[error("IO error: {0}")]
    #[diagnostic(code(vitrine_config::io))]
    IoError(#[from] std::io::Error),

    #[error(transparent)]
    #[diagnostic(code(vitrine_config::utils))]
    Utils(#[from] UtilsError),
}

impl From<PathError> for ConfigError {
    fn from(err: PathError) -> Self {
        Self::Utils(UtilsError::Path(err))
    }
}

pub type Result<T> = std::result::Result<T, ConfigError>;
