//! Error types for vitrine-core.

use miette::Diagnostic;
use thiserror::Error;
use vitrine_config::error::ConfigError;
use vitrine_rest::RestError;
use vitrine_utils::error::ValidationError;

/// Error type for catalog, upload and account operations.
#[derive(Error, Diagnostic, Debug)]
pub enum CoreError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Rest(#[from] RestError),

    #[error(transparent)]
    #[diagnostic(code(vitrine::validation), help("Correct the value and try again"))]
    Validation(#[from] ValidationError),

    #[error("{entity} `{id}` not found")]
    #[diagnostic(code(vitrine::not_found), help("Check the id and try again"))]
    NotFound { entity: &'static str, id: String },

    #[error("Storage bucket `{bucket}` not found")]
    #[diagnostic(
        code(vitrine::bucket_not_found),
        help("Create a public bucket named `{bucket}` in the storage dashboard before uploading images")
    )]
    BucketNotFound { bucket: String },

    #[error("`{name}` is not an image ({content_type})")]
    #[diagnostic(code(vitrine::not_an_image), help("Only image/* files are accepted"))]
    NotAnImage { name: String, content_type: String },

    #[error("A product can have at most {max} images")]
    #[diagnostic(
        code(vitrine::too_many_images),
        help("Remove an existing image first, or raise `max_images` in config.toml")
    )]
    TooManyImages { max: usize },

    #[error("Self-service sign-up is disabled")]
    #[diagnostic(
        code(vitrine::signup_disabled),
        help("Set ADMIN_SIGNUP_PASSWORD in the environment or `admin_signup_password` in config.toml")
    )]
    SignupDisabled,

    #[error("Invalid admin password")]
    #[diagnostic(code(vitrine::invalid_admin_password))]
    InvalidAdminPassword,

    #[error("An account with email `{0}` already exists")]
    #[diagnostic(code(vitrine::email_taken), help("Log in instead, or use another email"))]
    EmailTaken(String),

    #[error("New password and confirmation do not match")]
    #[diagnostic(code(vitrine::password_mismatch), help("Type the same new password twice"))]
    PasswordMismatch,

    #[error("Invalid email or password")]
    #[diagnostic(code(vitrine::invalid_credentials))]
    InvalidCredentials,

    #[error("Sessions are disabled")]
    #[diagnostic(
        code(vitrine::sessions_disabled),
        help("Set SESSION_SECRET in the environment or `session_secret` in config.toml")
    )]
    SessionsDisabled,

    #[error("Invalid session: {reason}")]
    #[diagnostic(code(vitrine::invalid_session), help("Log in again"))]
    InvalidSession { reason: &'static str },

    #[error("Error while {action}")]
    #[diagnostic(code(vitrine::io), help("Check file permissions and path"))]
    IoError {
        action: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{0}")]
    #[diagnostic(code(vitrine::error))]
    Custom(String),
}

impl CoreError {
    /// Maps "zero rows" answers of singular requests to [`CoreError::NotFound`].
    pub(crate) fn from_single(err: RestError, entity: &'static str, id: impl ToString) -> Self {
        if err.api_error().is_some_and(|e| e.is_not_single_row()) {
            return Self::NotFound {
                entity,
                id: id.to_string(),
            };
        }
        Self::Rest(err)
    }
}

/// Trait for adding context to IO errors.
pub trait ErrorContext<T> {
    fn with_context<C>(self, context: C) -> std::result::Result<T, CoreError>
    where
        C: FnOnce() -> String;
}

impl<T> ErrorContext<T> for std::io::Result<T> {
    fn with_context<C>(self, context: C) -> std::result::Result<T, CoreError>
    where
        C: FnOnce() -> String,
    {
        self.map_err(|err| {
            CoreError::IoError {
                action: context(),
                source: err,
            }
        })
    }
}

pub type CoreResult<T> = std::result::Result<T, CoreError>;
