use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use url::Url;
use vitrine_utils::{
    path::{resolve_path, xdg_config_home},
    time::parse_duration,
};

use crate::error::{ConfigError, Result};

pub const ENV_BASE_URL: &str = "BASE_URL";
pub const ENV_API_KEY: &str = "API_KEY";
pub const ENV_ADMIN_SIGNUP_PASSWORD: &str = "ADMIN_SIGNUP_PASSWORD";
pub const ENV_SESSION_SECRET: &str = "SESSION_SECRET";
pub const ENV_CONFIG_PATH: &str = "VITRINE_CONFIG";

const DEFAULT_SESSION_TTL: &str = "7d";
const DEFAULT_REQUEST_TIMEOUT: &str = "30s";
const DEFAULT_IMAGE_BUCKET: &str = "produtos";
const DEFAULT_MAX_IMAGES: usize = 5;
const REDACTED: &str = "********";

/// Application's configuration
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct Config {
    /// Root URL of the REST backend (REST under `/rest/v1`, storage under `/storage/v1`).
    /// Env: BASE_URL
    pub base_url: Option<String>,

    /// API key sent as `apikey` and bearer token on every request.
    /// Env: API_KEY
    pub api_key: Option<String>,

    /// Password gating self-service account creation. Sign-up is disabled when unset.
    /// Env: ADMIN_SIGNUP_PASSWORD
    pub admin_signup_password: Option<String>,

    /// Secret used to sign session tokens. Sessions cannot be issued when unset.
    /// Env: SESSION_SECRET
    pub session_secret: Option<String>,

    /// Session lifetime (e.g. "12h", "7d").
    /// Default: "7d"
    pub session_ttl: Option<String>,

    /// Timeout applied to every backend request.
    /// Default: "30s"
    pub request_timeout: Option<String>,

    /// User agent sent to the backend.
    pub user_agent: Option<String>,

    /// Storage bucket holding product images.
    /// Default: "produtos"
    pub image_bucket: Option<String>,

    /// Maximum number of images per product.
    /// Default: 5
    pub max_images: Option<usize>,
}

/// Location of the configuration file: `$VITRINE_CONFIG`, or
/// `$XDG_CONFIG_HOME/vitrine/config.toml`.
pub fn default_config_path() -> Result<PathBuf> {
    match std::env::var(ENV_CONFIG_PATH) {
        Ok(path_str) if !path_str.trim().is_empty() => Ok(resolve_path(&path_str)?),
        _ => Ok(xdg_config_home().join("vitrine").join("config.toml")),
    }
}

fn non_empty(value: Option<&String>) -> Option<&str> {
    value.map(|v| v.trim()).filter(|v| !v.is_empty())
}

fn env_override(var: &str) -> Option<String> {
    std::env::var(var).ok().filter(|v| !v.trim().is_empty())
}

impl Config {
    pub fn default_config() -> Self {
        Self {
            session_ttl: Some(DEFAULT_SESSION_TTL.to_string()),
            request_timeout: Some(DEFAULT_REQUEST_TIMEOUT.to_string()),
            user_agent: Some(default_user_agent()),
            image_bucket: Some(DEFAULT_IMAGE_BUCKET.to_string()),
            max_images: Some(DEFAULT_MAX_IMAGES),
            ..Self::default()
        }
    }

    /// Loads the configuration from the default location.
    pub fn new() -> Result<Self> {
        Self::load(&default_config_path()?)
    }

    /// Loads the configuration from `path`, then applies environment overrides.
    ///
    /// A missing file is not an error; the defaults are used instead.
    pub fn load(path: &Path) -> Result<Self> {
        let mut config = match fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("no config file at {}, using defaults", path.display());
                Self::default_config()
            }
            Err(err) => return Err(ConfigError::IoError(err)),
        };

        config.apply_env();
        config.resolve()?;

        if !config.is_backend_configured() {
            warn!(
                "{} and {} are not both set; backend calls will fail until they are configured",
                ENV_BASE_URL, ENV_API_KEY
            );
        }

        Ok(config)
    }

    /// Overrides file values with non-empty environment variables.
    pub fn apply_env(&mut self) {
        let overrides = [
            (ENV_BASE_URL, &mut self.base_url),
            (ENV_API_KEY, &mut self.api_key),
            (ENV_ADMIN_SIGNUP_PASSWORD, &mut self.admin_signup_password),
            (ENV_SESSION_SECRET, &mut self.session_secret),
        ];

        for (var, field) in overrides {
            if let Some(value) = env_override(var) {
                *field = Some(value);
            }
        }
    }

    pub fn resolve(&mut self) -> Result<()> {
        self.session_ttl
            .get_or_insert_with(|| DEFAULT_SESSION_TTL.to_string());
        self.request_timeout
            .get_or_insert_with(|| DEFAULT_REQUEST_TIMEOUT.to_string());
        self.user_agent.get_or_insert_with(default_user_agent);
        self.image_bucket
            .get_or_insert_with(|| DEFAULT_IMAGE_BUCKET.to_string());
        let max_images = *self.max_images.get_or_insert(DEFAULT_MAX_IMAGES);

        if max_images == 0 {
            return Err(ConfigError::InvalidMaxImages(max_images));
        }

        if let Some(base_url) = non_empty(self.base_url.as_ref()) {
            validate_base_url(base_url)?;
        }

        for (field, value) in [
            ("session_ttl", &self.session_ttl),
            ("request_timeout", &self.request_timeout),
        ] {
            let value = value.as_deref().unwrap_or_default();
            if parse_duration(value).is_none() {
                return Err(ConfigError::InvalidDuration {
                    field,
                    value: value.to_string(),
                });
            }
        }

        Ok(())
    }

    /// Backend root without trailing slashes.
    pub fn base_url(&self) -> Option<&str> {
        non_empty(self.base_url.as_ref()).map(|url| url.trim_end_matches('/'))
    }

    pub fn api_key(&self) -> Option<&str> {
        non_empty(self.api_key.as_ref())
    }

    pub fn admin_signup_password(&self) -> Option<&str> {
        non_empty(self.admin_signup_password.as_ref())
    }

    pub fn session_secret(&self) -> Option<&str> {
        non_empty(self.session_secret.as_ref())
    }

    pub fn is_backend_configured(&self) -> bool {
        self.base_url().is_some() && self.api_key().is_some()
    }

    pub fn session_ttl(&self) -> Duration {
        self.session_ttl
            .as_deref()
            .and_then(parse_duration)
            .unwrap_or(Duration::from_secs(7 * 24 * 60 * 60))
    }

    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
            .as_deref()
            .and_then(parse_duration)
            .unwrap_or(Duration::from_secs(30))
    }

    pub fn user_agent(&self) -> String {
        non_empty(self.user_agent.as_ref())
            .map(String::from)
            .unwrap_or_else(default_user_agent)
    }

    pub fn image_bucket(&self) -> &str {
        non_empty(self.image_bucket.as_ref()).unwrap_or(DEFAULT_IMAGE_BUCKET)
    }

    pub fn max_images(&self) -> usize {
        self.max_images.unwrap_or(DEFAULT_MAX_IMAGES)
    }

    /// A copy safe to print: secrets are masked.
    pub fn redacted(&self) -> Self {
        let mask = |value: &Option<String>| value.as_ref().map(|_| REDACTED.to_string());
        Self {
            api_key: mask(&self.api_key),
            admin_signup_password: mask(&self.admin_signup_password),
            session_secret: mask(&self.session_secret),
            ..self.clone()
        }
    }

    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let serialized = self.to_toml()?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serialized)?;
        info!("Configuration saved to {}", path.display());
        Ok(())
    }
}

fn default_user_agent() -> String {
    format!("vitrine/{}", env!("CARGO_PKG_VERSION"))
}

fn validate_base_url(base_url: &str) -> Result<()> {
    let parsed = Url::parse(base_url).map_err(|err| {
        ConfigError::InvalidBaseUrl {
            url: base_url.to_string(),
            source: Some(err),
        }
    })?;

    if !matches!(parsed.scheme(), "http" | "https") || parsed.host_str().is_none() {
        return Err(ConfigError::InvalidBaseUrl {
            url: base_url.to_string(),
            source: None,
        });
    }

    Ok(())
}

/// Writes a default configuration file to `path`.
pub fn generate_default_config(path: &Path) -> Result<()> {
    if path.exists() {
        return Err(ConfigError::ConfigAlreadyExists(
            path.display().to_string(),
        ));
    }

    Config::default_config().save(path)?;
    info!("Default configuration file generated at: {}", path.display());
    Ok(())
}
