//! Form and input validation
//!
//! Predicates over primitive input plus the contact form validator, which
//! reports at most one message per field with Spanish wording.

use crate::content::ContactFormData;
use crate::formatters::parse_date;
use chrono::Utc;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::OnceLock;

/// Length limits of the contact form fields
pub mod limits {
    /// Minimum name length
    pub const NAME_MIN: usize = 2;
    /// Maximum name length
    pub const NAME_MAX: usize = 100;
    /// Maximum email length
    pub const EMAIL_MAX: usize = 254;
    /// Minimum subject length
    pub const SUBJECT_MIN: usize = 3;
    /// Maximum subject length
    pub const SUBJECT_MAX: usize = 200;
    /// Minimum message length
    pub const MESSAGE_MIN: usize = 10;
    /// Maximum message length
    pub const MESSAGE_MAX: usize = 2000;
}

const SPECIAL_CHARS: &str = r#"!@#$%^&*()_+-=[]{};':"\|,.<>/?"#;

/// Outcome of validating a multi-field form
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormValidationResult {
    /// Whether no field has errors
    pub is_valid: bool,
    /// Messages per failing field
    pub errors: BTreeMap<String, Vec<String>>,
}

impl FormValidationResult {
    fn from_errors(errors: BTreeMap<String, Vec<String>>) -> Self {
        Self { is_valid: errors.is_empty(), errors }
    }

    /// Messages for `field`
    pub fn field_errors(&self, field: &str) -> &[String] {
        self.errors.get(field).map(Vec::as_slice).unwrap_or_default()
    }
}

/// Password rules
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PasswordOptions {
    /// Minimum length
    pub min_length: usize,
    /// Require an ASCII uppercase letter
    pub require_uppercase: bool,
    /// Require an ASCII lowercase letter
    pub require_lowercase: bool,
    /// Require a digit
    pub require_numbers: bool,
    /// Require a punctuation character
    pub require_special_chars: bool,
}

impl Default for PasswordOptions {
    fn default() -> Self {
        Self {
            min_length: 8,
            require_uppercase: true,
            require_lowercase: true,
            require_numbers: true,
            require_special_chars: true,
        }
    }
}

impl PasswordOptions {
    /// Create the default rules
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the minimum length
    pub fn min_length(mut self, length: usize) -> Self {
        self.min_length = length;
        self
    }

    /// Require an uppercase letter
    pub fn require_uppercase(mut self, required: bool) -> Self {
        self.require_uppercase = required;
        self
    }

    /// Require a lowercase letter
    pub fn require_lowercase(mut self, required: bool) -> Self {
        self.require_lowercase = required;
        self
    }

    /// Require a digit
    pub fn require_numbers(mut self, required: bool) -> Self {
        self.require_numbers = required;
        self
    }

    /// Require a punctuation character
    pub fn require_special_chars(mut self, required: bool) -> Self {
        self.require_special_chars = required;
        self
    }
}

/// Outcome of a password check
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordValidation {
    /// Whether every rule passed
    pub is_valid: bool,
    /// One message per failed rule
    pub errors: Vec<String>,
}

/// `local@domain.tld` with no whitespace
pub fn is_valid_email(email: &str) -> bool {
    static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();
    let re = EMAIL_REGEX.get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap());
    re.is_match(email)
}

/// Absolute URL
pub fn is_valid_url(url: &str) -> bool {
    url::Url::parse(url).is_ok()
}

/// 7 to 20 digits, spaces, dashes or parentheses, with an optional leading `+`
pub fn is_valid_phone(phone: &str) -> bool {
    static PHONE_REGEX: OnceLock<Regex> = OnceLock::new();
    let re = PHONE_REGEX.get_or_init(|| Regex::new(r"^\+?[0-9\s\-()]{7,20}$").unwrap());
    re.is_match(phone)
}

/// Non-blank
pub fn is_required(value: &str) -> bool {
    !value.trim().is_empty()
}

/// Trimmed length is at least `min_length`
pub fn has_min_length(value: &str, min_length: usize) -> bool {
    value.trim().chars().count() >= min_length
}

/// Trimmed length is at most `max_length`
pub fn has_max_length(value: &str, max_length: usize) -> bool {
    value.trim().chars().count() <= max_length
}

/// Latin letters (including Spanish accents) and whitespace only
pub fn is_only_letters(value: &str) -> bool {
    static LETTERS_REGEX: OnceLock<Regex> = OnceLock::new();
    let re = LETTERS_REGEX
        .get_or_init(|| Regex::new(r"^[a-zA-ZáéíóúÁÉÍÓÚñÑüÜ\s]+$").unwrap());
    re.is_match(value)
}

/// ASCII digits only
pub fn is_only_numbers(value: &str) -> bool {
    !value.is_empty() && value.chars().all(|c| c.is_ascii_digit())
}

/// `min <= value <= max`
pub fn is_in_range(value: f64, min: f64, max: f64) -> bool {
    value >= min && value <= max
}

/// Parses as a date
pub fn is_valid_date(date: &str) -> bool {
    parse_date(date).is_some()
}

/// Parses as a date after now
pub fn is_future_date(date: &str) -> bool {
    parse_date(date).is_some_and(|parsed| parsed > Utc::now())
}

/// Parses as a date before now
pub fn is_past_date(date: &str) -> bool {
    parse_date(date).is_some_and(|parsed| parsed < Utc::now())
}

/// Check `password` against `options`
pub fn is_valid_password(password: &str, options: &PasswordOptions) -> PasswordValidation {
    let mut errors = Vec::new();

    if password.chars().count() < options.min_length {
        errors.push(format!("Debe tener al menos {} caracteres", options.min_length));
    }
    if options.require_uppercase && !password.chars().any(|c| c.is_ascii_uppercase()) {
        errors.push("Debe contener al menos una letra mayúscula".to_string());
    }
    if options.require_lowercase && !password.chars().any(|c| c.is_ascii_lowercase()) {
        errors.push("Debe contener al menos una letra minúscula".to_string());
    }
    if options.require_numbers && !password.chars().any(|c| c.is_ascii_digit()) {
        errors.push("Debe contener al menos un número".to_string());
    }
    if options.require_special_chars && !password.chars().any(|c| SPECIAL_CHARS.contains(c)) {
        errors.push("Debe contener al menos un carácter especial".to_string());
    }

    PasswordValidation { is_valid: errors.is_empty(), errors }
}

/// Validate a contact form submission
pub fn validate_contact_form(data: &ContactFormData) -> FormValidationResult {
    use limits::*;

    let mut errors = BTreeMap::new();
    let mut fail = |field: &str, message: String| {
        errors.insert(field.to_string(), vec![message]);
    };

    if !is_required(&data.name) {
        fail("name", "El nombre es requerido".to_string());
    } else if !has_min_length(&data.name, NAME_MIN) {
        fail("name", format!("El nombre debe tener al menos {} caracteres", NAME_MIN));
    } else if !has_max_length(&data.name, NAME_MAX) {
        fail("name", format!("El nombre no puede exceder {} caracteres", NAME_MAX));
    } else if !is_only_letters(&data.name) {
        fail("name", "El nombre solo puede contener letras".to_string());
    }

    if !is_required(&data.email) {
        fail("email", "El email es requerido".to_string());
    } else if !is_valid_email(&data.email) {
        fail("email", "El formato del email no es válido".to_string());
    } else if !has_max_length(&data.email, EMAIL_MAX) {
        fail("email", format!("El email no puede exceder {} caracteres", EMAIL_MAX));
    }

    if !is_required(&data.subject) {
        fail("subject", "El asunto es requerido".to_string());
    } else if !has_min_length(&data.subject, SUBJECT_MIN) {
        fail("subject", format!("El asunto debe tener al menos {} caracteres", SUBJECT_MIN));
    } else if !has_max_length(&data.subject, SUBJECT_MAX) {
        fail("subject", format!("El asunto no puede exceder {} caracteres", SUBJECT_MAX));
    }

    if !is_required(&data.message) {
        fail("message", "El mensaje es requerido".to_string());
    } else if !has_min_length(&data.message, MESSAGE_MIN) {
        fail("message", format!("El mensaje debe tener al menos {} caracteres", MESSAGE_MIN));
    } else if !has_max_length(&data.message, MESSAGE_MAX) {
        fail("message", format!("El mensaje no puede exceder {} caracteres", MESSAGE_MAX));
    }

    FormValidationResult::from_errors(errors)
}

/// Escape HTML-significant characters
pub fn sanitize_string(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            '/' => escaped.push_str("&#x2F;"),
            other => escaped.push(other),
        }
    }
    escaped
}

/// Whether the text after the last `.` is one of `allowed_types` (lowercase)
pub fn is_valid_file_type(file_name: &str, allowed_types: &[&str]) -> bool {
    match file_name.rsplit('.').next() {
        Some(extension) if !extension.is_empty() => {
            allowed_types.contains(&extension.to_lowercase().as_str())
        }
        _ => false,
    }
}

/// Whether `file_size` bytes fits in `max_size_mb` mebibytes
pub fn is_valid_file_size(file_size: u64, max_size_mb: f64) -> bool {
    (file_size as f64) <= max_size_mb * 1024.0 * 1024.0
}
