use std::{fmt, sync::OnceLock};

use regex::Regex;
use thiserror::Error;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Field {
    Pan,
    FullName,
    Email,
    Mobile,
    Line1 { index: usize },
    Postcode { index: usize },
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pan => write!(f, "PAN"),
            Self::FullName => write!(f, "full name"),
            Self::Email => write!(f, "email"),
            Self::Mobile => write!(f, "mobile"),
            Self::Line1 { index } => write!(f, "address {} line 1", index + 1),
            Self::Postcode { index } => write!(f, "address {} postcode", index + 1),
        }
    }
}

/// A field failed its rule. Blocks submission until the input is corrected.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: Field,
    pub message: &'static str,
}

impl ValidationError {
    fn new(field: Field, message: &'static str) -> Self {
        Self { field, message }
    }
}

fn pan_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new("^[A-Z]{5}[0-9]{4}[A-Z]$").expect("hardcoded"))
}

fn email_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("hardcoded"))
}

fn all_digits(value: &str, len: usize) -> bool {
    value.len() == len && value.bytes().all(|x| x.is_ascii_digit())
}

pub fn pan(value: &str) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Err(ValidationError::new(Field::Pan, "required"));
    }
    if !pan_re().is_match(value) {
        return Err(ValidationError::new(Field::Pan, "invalid PAN format"));
    }
    Ok(())
}

pub fn full_name(value: &str) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Err(ValidationError::new(Field::FullName, "required"));
    }
    if value.chars().count() > 140 {
        return Err(ValidationError::new(
            Field::FullName,
            "cannot exceed 140 characters",
        ));
    }
    Ok(())
}

pub fn email(value: &str) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Err(ValidationError::new(Field::Email, "required"));
    }
    if value.len() > 255 {
        return Err(ValidationError::new(
            Field::Email,
            "cannot exceed 255 characters",
        ));
    }
    if !email_re().is_match(value) {
        return Err(ValidationError::new(Field::Email, "invalid email format"));
    }
    Ok(())
}

pub fn mobile(value: &str) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Err(ValidationError::new(Field::Mobile, "required"));
    }
    if !all_digits(value, 10) {
        return Err(ValidationError::new(
            Field::Mobile,
            "must be exactly 10 digits",
        ));
    }
    Ok(())
}

pub fn line1(index: usize, value: &str) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Err(ValidationError::new(Field::Line1 { index }, "required"));
    }
    Ok(())
}

pub fn postcode(index: usize, value: &str) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Err(ValidationError::new(Field::Postcode { index }, "required"));
    }
    if !all_digits(value, 6) {
        return Err(ValidationError::new(
            Field::Postcode { index },
            "must be exactly 6 digits",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pan_pattern() {
        assert!(pan("ABCDE1234F").is_ok());

        for bad in ["", "abcde1234f", "ABCD1234F", "ABCDE12345", "ABCDE1234F1"] {
            assert!(pan(bad).is_err(), "{bad:?} should fail");
        }
    }

    #[test]
    fn full_name_length_cap() {
        assert!(full_name("Jane Doe").is_ok());
        assert!(full_name(&"x".repeat(140)).is_ok());
        assert!(full_name(&"x".repeat(141)).is_err());
        assert!(full_name("").is_err());
    }

    #[test]
    fn email_syntax() {
        assert!(email("jane@example.com").is_ok());

        for bad in ["", "jane", "jane@", "@example.com", "jane @example.com"] {
            assert!(email(bad).is_err(), "{bad:?} should fail");
        }

        let long = format!("{}@example.com", "x".repeat(250));
        assert!(email(&long).is_err());
    }

    #[test]
    fn mobile_is_exactly_ten_digits() {
        assert!(mobile("9876543210").is_ok());

        for bad in ["", "987654321", "98765432101", "987654321x"] {
            assert!(mobile(bad).is_err(), "{bad:?} should fail");
        }
    }

    #[test]
    fn postcode_is_exactly_six_digits() {
        assert!(postcode(0, "400001").is_ok());

        for bad in ["", "40001", "4000011", "40000x"] {
            assert!(postcode(0, bad).is_err(), "{bad:?} should fail");
        }
    }

    #[test]
    fn errors_name_the_address_position() {
        let err = postcode(2, "").unwrap_err();
        assert_eq!(err.to_string(), "address 3 postcode: required");
    }
}
