//! Contact validation
//!
//! Free-text contact details become either a compact email address or a
//! German phone number in `+49…` form.

use regex::Regex;
use std::fmt;
use std::sync::LazyLock;
use thiserror::Error;

static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]{2,}$").expect("email pattern is valid")
});

/// Minimum digit count of an accepted phone number, country code included
const MIN_PHONE_DIGITS: usize = 11;

/// Validated contact in canonical form
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Contact {
    Email(String),
    Phone(String),
}

impl Contact {
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Contact::Email(s) | Contact::Phone(s) => s,
        }
    }

    #[must_use]
    pub fn into_string(self) -> String {
        match self {
            Contact::Email(s) | Contact::Phone(s) => s,
        }
    }
}

impl fmt::Display for Contact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a contact was rejected. The message is shown to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ContactError {
    #[error("Bitte gib eine gültige E-Mail-Adresse ein.")]
    InvalidEmail,
    #[error("Bitte gib eine deutsche Telefonnummer im Format +49 ein.")]
    InvalidPhone,
}

/// Classify and normalize a contact string.
///
/// Anything containing `@` is treated as an email address, everything
/// else as a phone number.
///
/// # Errors
///
/// [`ContactError::InvalidEmail`] or [`ContactError::InvalidPhone`],
/// whose message is meant for the caller.
pub fn validate(raw: &str) -> Result<Contact, ContactError> {
    let trimmed = raw.trim();
    if trimmed.contains('@') {
        normalize_email(trimmed).map(Contact::Email)
    } else {
        normalize_phone(trimmed).map(Contact::Phone)
    }
}

fn normalize_email(input: &str) -> Result<String, ContactError> {
    let compact: String = input.chars().filter(|c| !c.is_whitespace()).collect();
    if EMAIL.is_match(&compact) {
        Ok(compact)
    } else {
        Err(ContactError::InvalidEmail)
    }
}

fn normalize_phone(input: &str) -> Result<String, ContactError> {
    // Digits only, plus a `+` if it leads
    let mut phone = String::with_capacity(input.len());
    for c in input.chars() {
        if c.is_ascii_digit() || (c == '+' && phone.is_empty()) {
            phone.push(c);
        }
    }

    if let Some(rest) = phone.strip_prefix("00") {
        phone = format!("+{rest}");
    }
    if let Some(rest) = phone.strip_prefix("49").filter(|r| !r.is_empty()) {
        phone = format!("+49{rest}");
    }
    if let Some(rest) = phone.strip_prefix('0').filter(|r| !r.is_empty()) {
        phone = format!("+49{rest}");
    }

    let digits = phone.chars().filter(char::is_ascii_digit).count();
    if phone.starts_with("+49") && digits >= MIN_PHONE_DIGITS {
        Ok(phone)
    } else {
        Err(ContactError::InvalidPhone)
    }
}
