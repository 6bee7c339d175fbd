// ============================
// crates/formflow-lib/src/validation/mod.rs
// ============================
//! Field validation module.
//!
//! Every validator here is pure: it takes the raw field value and reports a
//! [`ValidationResult`] without touching any form state. The account, login and
//! withdrawal flows all share these functions.

use formflow_common::{FieldId, ValidationResult};
use regex::Regex;
use std::sync::LazyLock;
use thiserror::Error;

/// Required length of a mobile number, after stripping separators
pub const PHONE_DIGITS: usize = 9;

pub const INVALID_EMAIL_MESSAGE: &str = "Please enter a valid email address";
pub const INVALID_PHONE_MESSAGE: &str = "Please enter a valid 9-digit phone number";
pub const MISSING_IDENTIFIER_MESSAGE: &str = "Please enter your email or phone number";
pub const INVALID_IDENTIFIER_MESSAGE: &str = "Please enter a valid email or phone number";
pub const MISSING_FIRST_NAME_MESSAGE: &str = "Please enter your first name";
pub const INVALID_AMOUNT_MESSAGE: &str = "Please enter a valid amount";
pub const INSUFFICIENT_BALANCE_MESSAGE: &str = "Amount exceeds your withdrawable balance";

// Regex patterns for validation
static EMAIL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").expect("email pattern")
});
// Regional mobile numbering: 9 digits starting with 6, 7, 8 or 9.
static PHONE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[6-9][0-9]{8}$").expect("phone pattern"));

/// Possible validation errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("First name is missing")]
    MissingFirstName,

    #[error("Invalid email address: {0}")]
    InvalidEmail(String),

    #[error("Invalid phone number: {0}")]
    InvalidPhone(String),

    #[error("Login identifier is missing")]
    MissingIdentifier,

    #[error("Invalid login identifier: {0}")]
    InvalidIdentifier(String),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Amount {requested} exceeds withdrawable balance {available}")]
    InsufficientBalance { requested: f64, available: f64 },
}

impl ValidationError {
    /// Message shown in the global banner when this error blocks a transition.
    pub fn user_message(&self) -> &'static str {
        match self {
            ValidationError::MissingFirstName => MISSING_FIRST_NAME_MESSAGE,
            ValidationError::InvalidEmail(_) => INVALID_EMAIL_MESSAGE,
            // The step banner is shorter than the inline field message.
            ValidationError::InvalidPhone(_) => "Please enter a valid phone number",
            ValidationError::MissingIdentifier => MISSING_IDENTIFIER_MESSAGE,
            ValidationError::InvalidIdentifier(_) => INVALID_IDENTIFIER_MESSAGE,
            ValidationError::InvalidAmount(_) => INVALID_AMOUNT_MESSAGE,
            ValidationError::InsufficientBalance { .. } => INSUFFICIENT_BALANCE_MESSAGE,
        }
    }

    /// The field this error refers to
    pub fn field_id(&self) -> FieldId {
        match self {
            ValidationError::MissingFirstName => FieldId::FirstName,
            ValidationError::InvalidEmail(_) => FieldId::Email,
            ValidationError::InvalidPhone(_) => FieldId::Phone,
            ValidationError::MissingIdentifier | ValidationError::InvalidIdentifier(_) => {
                FieldId::LoginIdentifier
            },
            ValidationError::InvalidAmount(_) | ValidationError::InsufficientBalance { .. } => {
                FieldId::Amount
            },
        }
    }
}

/// Whether `value` looks like an email address
pub fn is_valid_email(value: &str) -> bool {
    EMAIL_REGEX.is_match(value)
}

/// Whether `digits` is a 9-digit mobile number starting with 6-9
pub fn is_valid_phone(digits: &str) -> bool {
    PHONE_REGEX.is_match(digits)
}

/// Strip everything but ASCII digits from raw phone input
pub fn normalize_phone(raw: &str) -> String {
    raw.chars().filter(char::is_ascii_digit).collect()
}

/// Validate an email address
///
/// Empty input is reported as not yet validated (invalid, no message).
pub fn validate_email(email: &str) -> ValidationResult {
    if is_valid_email(email) {
        ValidationResult::valid(FieldId::Email)
    } else if email.is_empty() {
        ValidationResult::pending(FieldId::Email)
    } else {
        ValidationResult::invalid(FieldId::Email, INVALID_EMAIL_MESSAGE)
    }
}

/// Validate a phone number; separators in `raw` are ignored
pub fn validate_phone(raw: &str) -> ValidationResult {
    validate_phone_for(FieldId::Phone, raw)
}

/// Validate a phone number reported under a different field (e.g. mobile money number)
pub fn validate_phone_for(field_id: FieldId, raw: &str) -> ValidationResult {
    let digits = normalize_phone(raw);
    if is_valid_phone(&digits) {
        ValidationResult::valid(field_id)
    } else if digits.is_empty() {
        ValidationResult::pending(field_id)
    } else {
        ValidationResult::invalid(field_id, INVALID_PHONE_MESSAGE)
    }
}

/// Validate a login identifier, which may be an email or a phone number
pub fn validate_login_identifier(value: &str) -> ValidationResult {
    if value.trim().is_empty() {
        return ValidationResult::invalid(FieldId::LoginIdentifier, MISSING_IDENTIFIER_MESSAGE);
    }

    if !is_valid_email(value) && !is_valid_phone(value) {
        return ValidationResult::invalid(FieldId::LoginIdentifier, INVALID_IDENTIFIER_MESSAGE);
    }

    ValidationResult::valid(FieldId::LoginIdentifier)
}

/// Validate the (already sanitized) first name
pub fn validate_first_name(value: &str) -> ValidationResult {
    if value.trim().is_empty() {
        ValidationResult::invalid(FieldId::FirstName, MISSING_FIRST_NAME_MESSAGE)
    } else {
        ValidationResult::valid(FieldId::FirstName)
    }
}

/// Parse a user-entered amount
///
/// `,`, `_` and spaces are group separators and a trailing `F` currency
/// suffix is dropped, so `"480,848.00 F"` parses. What remains must be plain
/// decimal digits with at most one `.`; signs, exponents (`1e3`) and
/// `inf`/`NaN` are rejected.
pub fn parse_amount(input: &str) -> Result<f64, ValidationError> {
    let cleaned: String = input
        .trim()
        .trim_end_matches('F')
        .chars()
        .filter(|c| !matches!(c, ',' | '_' | ' '))
        .collect();

    if cleaned.is_empty() {
        return Err(ValidationError::InvalidAmount("amount is empty".to_string()));
    }
    if !cleaned.chars().all(|c| c.is_ascii_digit() || c == '.') {
        return Err(ValidationError::InvalidAmount(format!("'{cleaned}' is not a number")));
    }

    let amount: f64 = cleaned
        .parse()
        .map_err(|_| ValidationError::InvalidAmount(format!("'{cleaned}' is not a number")))?;

    if !amount.is_finite() || amount <= 0.0 {
        return Err(ValidationError::InvalidAmount(format!(
            "{amount} must be a positive amount"
        )));
    }

    Ok(amount)
}

/// Validate a withdrawal amount against the withdrawable balance
pub fn validate_amount(input: &str, available: f64) -> ValidationResult {
    if input.trim().is_empty() {
        return ValidationResult::pending(FieldId::Amount);
    }
    match check_amount(input, available) {
        Ok(_) => ValidationResult::valid(FieldId::Amount),
        Err(e) => ValidationResult::invalid(FieldId::Amount, e.user_message()),
    }
}

/// Parse and bound-check a withdrawal amount
pub fn check_amount(input: &str, available: f64) -> Result<f64, ValidationError> {
    let requested = parse_amount(input)?;
    if requested > available {
        return Err(ValidationError::InsufficientBalance {
            requested,
            available,
        });
    }
    Ok(requested)
}

/// Escape HTML-significant characters in free-text input before it is stored
pub fn sanitize_string(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Reverse [`sanitize_string`] for exactly the five entities it produces
pub fn decode_entities(input: &str) -> String {
    const ENTITIES: [(&str, char); 5] = [
        ("&lt;", '<'),
        ("&gt;", '>'),
        ("&amp;", '&'),
        ("&quot;", '"'),
        ("&#39;", '\''),
    ];

    let mut out = String::with_capacity(input.len());
    let mut rest = input;
    'outer: while let Some(c) = rest.chars().next() {
        if c == '&' {
            for (entity, decoded) in ENTITIES {
                if let Some(tail) = rest.strip_prefix(entity) {
                    out.push(decoded);
                    rest = tail;
                    continue 'outer;
                }
            }
        }
        out.push(c);
        rest = &rest[c.len_utf8()..];
    }
    out
}
