//! Profile metadata: saved addresses, saved cards, and sign-up input.
//!
//! Cards are display metadata only. Nothing here charges a card.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{Email, EmailError};

/// Minimum password length accepted at sign-up.
pub const MIN_PASSWORD_LENGTH: usize = 6;

#[allow(clippy::unwrap_used)]
static CARD_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}-\d{4}-\d{4}-\d{4}$").unwrap());

#[allow(clippy::unwrap_used)]
static CARD_EXPIRY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(0[1-9]|1[0-2])/\d{2}$").unwrap());

/// Validation failures for profile forms.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProfileError {
    #[error("{0} is required")]
    MissingField(&'static str),
    #[error("card number must look like 1234-5678-9012-3456")]
    InvalidCardNumber,
    #[error("expiry must be MM/YY")]
    InvalidExpiry,
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] EmailError),
    #[error("password must be at least {MIN_PASSWORD_LENGTH} characters")]
    PasswordTooShort,
    #[error("passwords don't match")]
    PasswordMismatch,
}

fn required(value: &str, field: &'static str) -> Result<String, ProfileError> {
    let value = value.trim();
    if value.is_empty() {
        Err(ProfileError::MissingField(field))
    } else {
        Ok(value.to_owned())
    }
}

/// A saved delivery address.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Address {
    pub name: String,
    pub city: String,
    pub state: String,
    pub zipcode: String,
    pub mobile: String,
}

impl Address {
    /// Build a validated address; every field is required.
    ///
    /// # Errors
    ///
    /// Returns `ProfileError::MissingField` naming the first blank field.
    pub fn new(
        name: &str,
        city: &str,
        state: &str,
        zipcode: &str,
        mobile: &str,
    ) -> Result<Self, ProfileError> {
        Ok(Self {
            name: required(name, "name")?,
            city: required(city, "city")?,
            state: required(state, "state")?,
            zipcode: required(zipcode, "zipcode")?,
            mobile: required(mobile, "mobile")?,
        })
    }

    #[must_use]
    pub fn single_line(&self) -> String {
        format!(
            "{}, {}, {} {} ({})",
            self.name, self.city, self.state, self.zipcode, self.mobile
        )
    }
}

/// A saved payment card.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Card {
    pub number: String,
    pub name: String,
    pub expiry: String,
}

impl Card {
    /// Build a validated card. The number and expiry are normalized with
    /// [`format_card_number`] and [`format_expiry`] first, so raw digits are
    /// accepted.
    ///
    /// # Errors
    ///
    /// Returns `ProfileError` if the name is blank or the number or expiry
    /// does not match its pattern.
    pub fn new(number: &str, name: &str, expiry: &str) -> Result<Self, ProfileError> {
        let number = format_card_number(number);
        if !CARD_NUMBER.is_match(&number) {
            return Err(ProfileError::InvalidCardNumber);
        }
        let expiry = format_expiry(expiry);
        if !CARD_EXPIRY.is_match(&expiry) {
            return Err(ProfileError::InvalidExpiry);
        }
        Ok(Self {
            number,
            name: required(name, "name on card")?,
            expiry,
        })
    }

    /// Last four digits, for display.
    #[must_use]
    pub fn last4(&self) -> &str {
        let digits = self.number.len();
        self.number.get(digits.saturating_sub(4)..).unwrap_or("")
    }

    #[must_use]
    pub fn masked(&self) -> String {
        format!("**** **** **** {}", self.last4())
    }
}

/// Keep up to 16 digits and insert a dash after every group of four.
#[must_use]
pub fn format_card_number(input: &str) -> String {
    let digits: Vec<char> = input.chars().filter(char::is_ascii_digit).take(16).collect();
    digits
        .chunks(4)
        .map(|group| group.iter().collect::<String>())
        .collect::<Vec<_>>()
        .join("-")
}

/// Keep up to four digits and insert `/` after the month.
#[must_use]
pub fn format_expiry(input: &str) -> String {
    let digits: String = input.chars().filter(char::is_ascii_digit).take(4).collect();
    if digits.len() > 2 {
        let (month, year) = digits.split_at(2);
        format!("{month}/{year}")
    } else {
        digits
    }
}

/// Validated sign-up input.
#[derive(Clone, PartialEq, Eq)]
pub struct SignupForm {
    pub name: String,
    pub email: Email,
    pub password: String,
}

impl std::fmt::Debug for SignupForm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignupForm")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

impl SignupForm {
    /// Validate raw sign-up fields.
    ///
    /// # Errors
    ///
    /// Returns the first failing rule: blank name, bad email, short password,
    /// or mismatched confirmation.
    pub fn validate(
        name: &str,
        email: &str,
        password: &str,
        confirm: &str,
    ) -> Result<Self, ProfileError> {
        let name = required(name, "name")?;
        let email = Email::parse(email)?;
        if password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(ProfileError::PasswordTooShort);
        }
        if password != confirm {
            return Err(ProfileError::PasswordMismatch);
        }
        Ok(Self {
            name,
            email,
            password: password.to_owned(),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_address_requires_every_field() {
        assert!(Address::new("Asha", "Pune", "MH", "411001", "9876543210").is_ok());
        assert_eq!(
            Address::new("Asha", " ", "MH", "411001", "98"),
            Err(ProfileError::MissingField("city"))
        );
    }

    #[test]
    fn test_card_accepts_raw_digits() {
        let card = Card::new("1234567812345678", "Asha", "0927").unwrap();
        assert_eq!(card.number, "1234-5678-1234-5678");
        assert_eq!(card.expiry, "09/27");
        assert_eq!(card.last4(), "5678");
    }

    #[test]
    fn test_card_rejections() {
        assert_eq!(
            Card::new("1234-5678", "Asha", "09/27"),
            Err(ProfileError::InvalidCardNumber)
        );
        assert_eq!(
            Card::new("1234-5678-1234-5678", "Asha", "13/27"),
            Err(ProfileError::InvalidExpiry)
        );
        assert_eq!(
            Card::new("1234-5678-1234-5678", "", "12/27"),
            Err(ProfileError::MissingField("name on card"))
        );
    }

    #[test]
    fn test_formatters() {
        assert_eq!(format_card_number("12345"), "1234-5");
        assert_eq!(format_card_number("1234 5678 1234 5678 99"), "1234-5678-1234-5678");
        assert_eq!(format_expiry("1"), "1");
        assert_eq!(format_expiry("12"), "12");
        assert_eq!(format_expiry("1228"), "12/28");
        assert_eq!(format_expiry("12/289"), "12/28");
    }

    #[test]
    fn test_signup_rules() {
        assert!(SignupForm::validate("Asha", "a@b.in", "secret1", "secret1").is_ok());
        assert_eq!(
            SignupForm::validate("", "a@b.in", "secret1", "secret1"),
            Err(ProfileError::MissingField("name"))
        );
        assert!(matches!(
            SignupForm::validate("Asha", "nope", "secret1", "secret1"),
            Err(ProfileError::InvalidEmail(_))
        ));
        assert_eq!(
            SignupForm::validate("Asha", "a@b.in", "short", "short"),
            Err(ProfileError::PasswordTooShort)
        );
        assert_eq!(
            SignupForm::validate("Asha", "a@b.in", "secret1", "secret2"),
            Err(ProfileError::PasswordMismatch)
        );
    }
}
