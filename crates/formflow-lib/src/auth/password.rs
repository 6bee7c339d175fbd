// ============================
// crates/formflow-lib/src/auth/password.rs
// ============================
//! Password strength scoring.
//!
//! Passwords are never hashed or stored here; the score only decides whether
//! the account form may be submitted.
use serde::Serialize;

/// Minimum password length; anything shorter scores zero
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Minimum score required before an account can be created
pub const MIN_ACCEPTED_SCORE: u8 = 3;

/// Highest score a password can reach
pub const MAX_SCORE: u8 = 6;

pub const TOO_SHORT_FEEDBACK: &str = "Password should be at least 8 characters long";
pub const WEAK_FEEDBACK: &str = "Weak password. Try adding numbers and special characters.";
pub const MODERATE_FEEDBACK: &str = "Moderate password. Try adding more variety.";
pub const GOOD_FEEDBACK: &str = "Good password.";
pub const STRONG_FEEDBACK: &str = "Strong password!";

/// Coarse strength bucket derived from the score
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StrengthLevel {
    Weak,
    Moderate,
    Good,
    Strong,
}

impl StrengthLevel {
    pub fn from_score(score: u8) -> Self {
        match score {
            0..=2 => StrengthLevel::Weak,
            3 => StrengthLevel::Moderate,
            4 => StrengthLevel::Good,
            _ => StrengthLevel::Strong,
        }
    }

    pub fn feedback(self) -> &'static str {
        match self {
            StrengthLevel::Weak => WEAK_FEEDBACK,
            StrengthLevel::Moderate => MODERATE_FEEDBACK,
            StrengthLevel::Good => GOOD_FEEDBACK,
            StrengthLevel::Strong => STRONG_FEEDBACK,
        }
    }
}

/// Score and feedback for a password
///
/// The default value (score 0, empty feedback) represents an empty password field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PasswordStrength {
    pub score: u8,
    pub feedback: String,
}

impl PasswordStrength {
    pub fn level(&self) -> StrengthLevel {
        StrengthLevel::from_score(self.score)
    }

    pub fn is_acceptable(&self, min_score: u8) -> bool {
        self.score >= min_score
    }
}

/// Character classes counted by the strength check
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CharacterClasses {
    pub uppercase: bool,
    pub lowercase: bool,
    pub digit: bool,
    pub symbol: bool,
}

impl CharacterClasses {
    pub fn of(password: &str) -> Self {
        let mut classes = Self::default();
        for c in password.chars() {
            if c.is_ascii_uppercase() {
                classes.uppercase = true;
            } else if c.is_ascii_lowercase() {
                classes.lowercase = true;
            } else if c.is_ascii_digit() {
                classes.digit = true;
            } else {
                classes.symbol = true;
            }
        }
        classes
    }

    pub fn count(self) -> u8 {
        [self.uppercase, self.lowercase, self.digit, self.symbol]
            .into_iter()
            .map(u8::from)
            .sum()
    }
}

/// Score a password with the default minimum length
pub fn check_password_strength(password: &str) -> PasswordStrength {
    check_password_strength_with(password, MIN_PASSWORD_LENGTH)
}

/// Score a password: up to two points for length, one per character class
pub fn check_password_strength_with(password: &str, min_length: usize) -> PasswordStrength {
    let length = password.chars().count();
    if length < min_length {
        return PasswordStrength {
            score: 0,
            feedback: TOO_SHORT_FEEDBACK.to_string(),
        };
    }

    let length_points = u8::try_from((length / 4).min(2)).unwrap_or(2);
    let score = (length_points + CharacterClasses::of(password).count()).min(MAX_SCORE);

    PasswordStrength {
        score,
        feedback: StrengthLevel::from_score(score).feedback().to_string(),
    }
}

/// Strict equality of the two password fields; an empty password never matches
pub fn passwords_match(password: &str, confirm: &str) -> bool {
    !password.is_empty() && password == confirm
}
