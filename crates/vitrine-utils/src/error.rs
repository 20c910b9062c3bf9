use std::{error::Error, fmt};

#[derive(Debug)]
pub enum PathError {
    CurrentDir { source: std::io::Error },

    Empty,

    MissingEnvVar { var: String, input: String },

    UnclosedVariable { input: String },
}

impl fmt::Display for PathError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathError::Empty => write!(f, "Path is empty"),
            PathError::CurrentDir { source } => {
                write!(f, "Failed to get current directory: {source}")
            }
            PathError::UnclosedVariable { input } => {
                write!(f, "Unclosed variable expression starting at `{input}`")
            }
            PathError::MissingEnvVar { var, input } => {
                write!(f, "Environment variable `{var}` not set in `{input}`")
            }
        }
    }
}

impl Error for PathError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            PathError::CurrentDir { source } => Some(source),
            _ => None,
        }
    }
}

/// Rejected user input, reported per field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    Empty { field: &'static str },

    InvalidEmail { value: String },

    InvalidPhone { value: String },

    TooShort { field: &'static str, min: usize },

    Negative { field: &'static str },

    OutOfRange {
        field: &'static str,
        min: i64,
        max: i64,
    },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::Empty { field } => write!(f, "`{field}` must not be empty"),
            ValidationError::InvalidEmail { value } => {
                write!(f, "`{value}` is not a valid email address")
            }
            ValidationError::InvalidPhone { value } => {
                write!(f, "`{value}` is not a valid phone number (10 or 11 digits)")
            }
            ValidationError::TooShort { field, min } => {
                write!(f, "`{field}` must have at least {min} characters")
            }
            ValidationError::Negative { field } => write!(f, "`{field}` must not be negative"),
            ValidationError::OutOfRange { field, min, max } => {
                write!(f, "`{field}` must be between {min} and {max}")
            }
        }
    }
}

impl Error for ValidationError {}

#[derive(Debug)]
pub enum UtilsError {
    Path(PathError),
    Validation(ValidationError),
}

impl fmt::Display for UtilsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UtilsError::Path(err) => write!(f, "{err}"),
            UtilsError::Validation(err) => write!(f, "{err}"),
        }
    }
}

impl Error for UtilsError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            UtilsError::Path(err) => Some(err),
            UtilsError::Validation(err) => Some(err),
        }
    }
}

impl From<PathError> for UtilsError {
    fn from(err: PathError) -> Self {
        UtilsError::Path(err)
    }
}

impl From<ValidationError> for UtilsError {
    fn from(err: ValidationError) -> Self {
        UtilsError::Validation(err)
    }
}

pub type PathResult<T> = std::result::Result<T, PathError>;
pub type ValidationResult<T> = std::result::Result<T, ValidationError>;

pub type UtilsResult<T> = std::result::Result<T, UtilsError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_path_error_display_and_source() {
        let current_dir_error = PathError::CurrentDir {
            source: io::Error::other("some error"),
        };
        assert_eq!(
            current_dir_error.to_string(),
            "Failed to get current directory: some error"
        );
        assert!(current_dir_error.source().is_some());

        let empty_error = PathError::Empty;
        assert_eq!(empty_error.to_string(), "Path is empty");
        assert!(empty_error.source().is_none());

        let missing = PathError::MissingEnvVar {
            var: "VAR".to_string(),
            input: "$VAR".to_string(),
        };
        assert_eq!(
            missing.to_string(),
            "Environment variable `VAR` not set in `$VAR`"
        );
    }

    #[test]
    fn test_validation_error_display() {
        assert_eq!(
            ValidationError::Empty { field: "nome" }.to_string(),
            "`nome` must not be empty"
        );
        assert_eq!(
            ValidationError::InvalidEmail {
                value: "foo".into()
            }
            .to_string(),
            "`foo` is not a valid email address"
        );
        assert_eq!(
            ValidationError::TooShort {
                field: "senha",
                min: 6
            }
            .to_string(),
            "`senha` must have at least 6 characters"
        );
        assert_eq!(
            ValidationError::Negative { field: "preco" }.to_string(),
            "`preco` must not be negative"
        );
    }

    #[test]
    fn test_utils_error_from() {
        let err = UtilsError::from(ValidationError::Negative { field: "estoque" });
        assert_eq!(err.to_string(), "`estoque` must not be negative");
        assert!(err.source().is_some());

        let err = UtilsError::from(PathError::Empty);
        assert_eq!(err.to_string(), "Path is empty");
    }
}
