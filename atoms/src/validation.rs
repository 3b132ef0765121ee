//! Form validation predicates shared by every screen-level operation.

use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;

static NAME_DISALLOWED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[^a-zA-ZáéíóúÁÉÍÓÚñÑ\s]").expect("name filter pattern is valid")
});

static NAME_ALLOWED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-ZáéíóúÁÉÍÓÚñÑ\s]+$").expect("name pattern is valid")
});

static EMAIL_FORMAT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid")
});

pub const MIN_PASSWORD_LENGTH: usize = 8;
pub const MAX_DNI_LENGTH: usize = 9;

/// Strip every character that cannot appear in a name.
pub fn filter_name_input(text: &str) -> String {
    NAME_DISALLOWED.replace_all(text, "").into_owned()
}

/// Non-empty and made only of letters, Spanish accented vowels, ñ and spaces.
pub fn is_valid_name(text: &str) -> bool {
    NAME_ALLOWED.is_match(text)
}

/// Loose sign-up check: contains `@` and `.com`.
///
/// Addresses on other top-level domains are rejected. This mirrors the sign-up
/// form and is intentionally not RFC validation.
pub fn is_valid_email(text: &str) -> bool {
    text.contains('@') && text.contains(".com")
}

/// Shape check used before requesting a password reset.
pub fn is_valid_email_format(text: &str) -> bool {
    EMAIL_FORMAT.is_match(text)
}

/// Keep digits only, at most nine of them.
pub fn filter_dni_input(text: &str) -> String {
    text.chars()
        .filter(char::is_ascii_digit)
        .take(MAX_DNI_LENGTH)
        .collect()
}

/// Per-rule password state, as shown next to the password field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PasswordChecklist {
    pub length: bool,
    pub uppercase: bool,
    pub lowercase: bool,
    pub digit: bool,
}

impl PasswordChecklist {
    pub fn evaluate(password: &str) -> Self {
        Self {
            length: password.chars().count() >= MIN_PASSWORD_LENGTH,
            uppercase: password.chars().any(|c| c.is_ascii_uppercase()),
            lowercase: password.chars().any(|c| c.is_ascii_lowercase()),
            digit: password.chars().any(|c| c.is_ascii_digit()),
        }
    }

    pub fn all_met(&self) -> bool {
        self.length && self.uppercase && self.lowercase && self.digit
    }
}

pub fn is_strong_password(password: &str) -> bool {
    PasswordChecklist::evaluate(password).all_met()
}

/// Confirmation must be non-empty and identical.
pub fn passwords_match(password: &str, confirmation: &str) -> bool {
    !confirmation.is_empty() && password == confirmation
}

/// First letter of each present part, uppercased; `fallback` when none.
pub fn initials(first: &str, last: &str, fallback: &str) -> String {
    let letters: String = [first, last]
        .iter()
        .filter_map(|part| part.trim().chars().next())
        .flat_map(char::to_uppercase)
        .collect();

    if letters.is_empty() {
        fallback.to_string()
    } else {
        letters
    }
}

/// `true` when the trimmed value is empty.
pub fn is_blank(text: &str) -> bool {
    text.trim().is_empty()
}
