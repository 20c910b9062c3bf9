use vitrine_utils::error::{ValidationError, ValidationResult};

/// Boundary checks run on every payload before a request is built.
pub trait Validate {
    fn validate(&self) -> ValidationResult<()>;
}

pub(crate) fn require_non_negative_f64(field: &'static str, value: f64) -> ValidationResult<()> {
    if value.is_finite() && value >= 0.0 {
        return Ok(());
    }
    Err(ValidationError::Negative { field })
}

pub(crate) fn require_non_negative(field: &'static str, value: i64) -> ValidationResult<()> {
    if value >= 0 {
        return Ok(());
    }
    Err(ValidationError::Negative { field })
}
