//! Input validation for practice and prescriber records.
//!
//! Errors are collected per field so the wizard can surface them inline and
//! keep the "continue" action disabled until they are fixed. Nothing here
//! panics on malformed input.

use std::collections::BTreeMap;

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::{PracticeLocation, Prescriber};

lazy_static! {
    static ref DEA_PATTERN: Regex =
        Regex::new(r"^[A-Z]{2}[0-9]{7}$").expect("DEA pattern is a valid regex");
}

pub const DEA_FORMAT_MESSAGE: &str =
    "DEA format: 2 letters followed by 7 digits (e.g., AB1234567)";
pub const DEA_CHECKSUM_MESSAGE: &str = "Invalid DEA number checksum";
pub const NPI_FORMAT_MESSAGE: &str = "NPI must be exactly 10 digits";

/// One failed field check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn empty_field(field: &str, label: &str) -> Self {
        Self::new(field, format!("{} is required", label))
    }
}

/// Field errors of one record, in the order they were found.
#[derive(Debug, Default)]
pub struct ValidationErrors {
    errors: Vec<ValidationError>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self { errors: Vec::new() }
    }

    pub fn add(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Field name -> message, keeping the first error reported per field.
    pub fn field_map(&self) -> BTreeMap<String, String> {
        let mut map = BTreeMap::new();
        for error in &self.errors {
            map.entry(error.field.clone())
                .or_insert_with(|| error.message.clone());
        }
        map
    }
}

/// Validity flag plus a human-readable message (empty when valid).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct IdentifierCheck {
    pub valid: bool,
    pub message: String,
}

impl IdentifierCheck {
    fn ok() -> Self {
        Self {
            valid: true,
            message: String::new(),
        }
    }

    fn invalid(message: &str) -> Self {
        Self {
            valid: false,
            message: message.to_string(),
        }
    }
}

/// Result of validating one record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ValidationOutcome {
    pub valid: bool,
    pub errors: BTreeMap<String, String>,
}

impl From<ValidationErrors> for ValidationOutcome {
    fn from(errors: ValidationErrors) -> Self {
        Self {
            valid: errors.is_empty(),
            errors: errors.field_map(),
        }
    }
}

// ============================================================================
// Validation functions
// ============================================================================

/// Validate that a string is not empty after trimming
pub fn validate_required(value: &str, field: &str, label: &str, errors: &mut ValidationErrors) {
    if value.trim().is_empty() {
        errors.add(ValidationError::empty_field(field, label));
    }
}

/// DEA number: optional; otherwise 2 letters + 7 digits with a checksum.
///
/// With the digits d1..d7, `(d1 + d3 + d5) + 2 * (d2 + d4 + d6)` must end in d7.
pub fn validate_dea(code: &str) -> IdentifierCheck {
    if code.is_empty() {
        return IdentifierCheck::ok();
    }

    // Surrounding whitespace is a format error, not an empty field.
    let upper = code.to_ascii_uppercase();
    if !DEA_PATTERN.is_match(&upper) {
        return IdentifierCheck::invalid(DEA_FORMAT_MESSAGE);
    }

    let digits: Vec<u32> = upper[2..].chars().filter_map(|c| c.to_digit(10)).collect();
    let sum = (digits[0] + digits[2] + digits[4]) + 2 * (digits[1] + digits[3] + digits[5]);

    if sum % 10 != digits[6] {
        return IdentifierCheck::invalid(DEA_CHECKSUM_MESSAGE);
    }

    IdentifierCheck::ok()
}

/// NPI: optional; otherwise exactly 10 digits. No Luhn check.
pub fn validate_npi(code: &str) -> IdentifierCheck {
    if code.is_empty() {
        return IdentifierCheck::ok();
    }

    if code.len() != 10 || !code.chars().all(|c| c.is_ascii_digit()) {
        return IdentifierCheck::invalid(NPI_FORMAT_MESSAGE);
    }

    IdentifierCheck::ok()
}

pub fn validate_dea_field(value: &str, field: &str, errors: &mut ValidationErrors) {
    let check = validate_dea(value);
    if !check.valid {
        errors.add(ValidationError::new(field, check.message));
    }
}

pub fn validate_npi_field(value: &str, field: &str, errors: &mut ValidationErrors) {
    if !validate_npi(value).valid {
        errors.add(ValidationError::new(field, NPI_FORMAT_MESSAGE));
    }
}

pub fn practice_errors(practice: &PracticeLocation) -> ValidationErrors {
    let mut errors = ValidationErrors::new();

    validate_required(&practice.name, "name", "Practice name", &mut errors);
    validate_required(&practice.address, "address", "Address", &mut errors);
    validate_required(&practice.city, "city", "City", &mut errors);
    validate_required(&practice.state, "state", "State", &mut errors);
    validate_required(&practice.zip, "zip", "ZIP", &mut errors);
    validate_required(&practice.phone, "phone", "Telephone", &mut errors);

    errors
}

/// Required: name, address, city, state, zip, phone. Fax is optional.
pub fn validate_practice(practice: &PracticeLocation) -> ValidationOutcome {
    practice_errors(practice).into()
}

pub fn prescriber_errors(prescriber: &Prescriber) -> ValidationErrors {
    let mut errors = ValidationErrors::new();

    validate_required(&prescriber.name, "name", "Prescriber name", &mut errors);
    validate_required(
        &prescriber.credentials,
        "credentials",
        "Credentials",
        &mut errors,
    );
    validate_npi_field(&prescriber.npi_number, "npi_number", &mut errors);
    validate_dea_field(&prescriber.dea_number, "dea_number", &mut errors);

    errors
}

/// Required: name and credentials. NPI and DEA are checked when present.
pub fn validate_prescriber(prescriber: &Prescriber) -> ValidationOutcome {
    prescriber_errors(prescriber).into()
}

/// Re-punctuates a phone number as `(xxx) xxx-xxxx` while it is typed.
pub fn format_phone(raw: &str) -> String {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();

    match digits.len() {
        0..=3 => digits,
        4..=6 => format!("({}) {}", &digits[..3], &digits[3..]),
        len => format!(
            "({}) {}-{}",
            &digits[..3],
            &digits[3..6],
            &digits[6..len.min(10)]
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dea_lowercase_is_accepted() {
        // 1+3+5 + 2*(2+4+6) = 33
        assert!(validate_dea("ab1234563").valid);
    }

    #[test]
    fn test_dea_rejects_unicode_digits() {
        let check = validate_dea("AB١٢٣٤٥٦٣");
        assert!(!check.valid);
        assert_eq!(check.message, DEA_FORMAT_MESSAGE);
    }

    #[test]
    fn test_field_map_keeps_first_error() {
        let mut errors = ValidationErrors::new();
        errors.add(ValidationError::new("dea_number", "first"));
        errors.add(ValidationError::new("dea_number", "second"));
        errors.add(ValidationError::empty_field("name", "Practice name"));

        let map = errors.field_map();
        assert_eq!(map.len(), 2);
        assert_eq!(map["dea_number"], "first");
        assert_eq!(map["name"], "Practice name is required");
    }

    #[test]
    fn test_format_phone_truncates_extra_digits() {
        assert_eq!(format_phone("520555012399"), "(520) 555-0123");
        assert_eq!(format_phone(""), "");
        assert_eq!(format_phone("(520) 555-01"), "(520) 555-01");
    }
}
