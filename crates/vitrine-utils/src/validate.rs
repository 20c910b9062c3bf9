//! Input validation and the phone display mask.

use std::sync::LazyLock;

use regex::Regex;

use crate::{
    error::{ValidationError, ValidationResult},
    string::digits,
};

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("unable to compile email regex")
});

static PHONE_10_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d{2})(\d{4})(\d{0,4})").expect("unable to compile phone regex")
});

static PHONE_11_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d{2})(\d{5})(\d{0,4})").expect("unable to compile phone regex")
});

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

/// Accepts 10 or 11 digits (with or without area code formatting).
pub fn is_valid_phone(phone: &str) -> bool {
    (10..=11).contains(&digits(phone).len())
}

/// Masks a phone number as `(XX) XXXX-XXXX` or `(XX) XXXXX-XXXX`.
///
/// Inputs too short for the pattern are returned as bare digits.
///
/// # Examples
///
/// ```
/// use vitrine_utils::validate::mask_phone;
///
/// assert_eq!(mask_phone("11987654321"), "(11) 98765-4321");
/// assert_eq!(mask_phone("1133334444"), "(11) 3333-4444");
/// ```
pub fn mask_phone(value: &str) -> String {
    let numbers = digits(value);
    let re = if numbers.len() <= 10 {
        &PHONE_10_RE
    } else {
        &PHONE_11_RE
    };
    re.replace(&numbers, "($1) $2-$3").into_owned()
}

pub fn require_non_empty(field: &'static str, value: &str) -> ValidationResult<()> {
    if value.trim().is_empty() {
        return Err(ValidationError::Empty { field });
    }
    Ok(())
}

pub fn require_email(email: &str) -> ValidationResult<()> {
    if !is_valid_email(email) {
        return Err(ValidationError::InvalidEmail {
            value: email.to_string(),
        });
    }
    Ok(())
}

pub fn require_phone(phone: &str) -> ValidationResult<()> {
    if !is_valid_phone(phone) {
        return Err(ValidationError::InvalidPhone {
            value: phone.to_string(),
        });
    }
    Ok(())
}

pub fn require_min_len(field: &'static str, value: &str, min: usize) -> ValidationResult<()> {
    if value.chars().count() < min {
        return Err(ValidationError::TooShort { field, min });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_valid_email() {
        assert!(is_valid_email("contato@loja.com.br"));
        assert!(is_valid_email("a@b.c"));
        assert!(!is_valid_email("sem-arroba.com"));
        assert!(!is_valid_email("dois@@loja.com"));
        assert!(!is_valid_email("espaco @loja.com"));
        assert!(!is_valid_email("semdominio@loja"));
    }

    #[test]
    fn test_is_valid_phone() {
        assert!(is_valid_phone("(11) 98765-4321"));
        assert!(is_valid_phone("1133334444"));
        assert!(!is_valid_phone("123456789"));
        assert!(!is_valid_phone("119876543210"));
    }

    #[test]
    fn test_mask_phone() {
        assert_eq!(mask_phone("11987654321"), "(11) 98765-4321");
        assert_eq!(mask_phone("(11) 3333-4444"), "(11) 3333-4444");
        assert_eq!(mask_phone("119876"), "(11) 9876-");
        assert_eq!(mask_phone("11"), "11");
    }

    #[test]
    fn test_require_helpers() {
        assert!(require_non_empty("nome", "Mesa").is_ok());
        assert_eq!(
            require_non_empty("nome", "   "),
            Err(ValidationError::Empty { field: "nome" })
        );
        assert!(require_email("x@y.z").is_ok());
        assert!(require_phone("11 9999-8888").is_ok());
        assert_eq!(
            require_min_len("senha", "abc", 6),
            Err(ValidationError::TooShort {
                field: "senha",
                min: 6
            })
        );
    }
}
