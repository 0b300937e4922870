//! Validated values accepted from the editor forms.
//!
//! Client records coming back from the admin API stay loosely typed; these
//! wrappers only guard what the dashboard itself sends.
use std::fmt::{Display, Formatter};
use std::ops::Deref;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use validator::{ValidateEmail, ValidateUrl};

/// Errors produced when attempting to construct a constrained value object.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeConstraintError {
    #[error("invalid email address")]
    InvalidEmail,
    #[error("value cannot be empty")]
    EmptyString,
    #[error("invalid url address")]
    InvalidUrl,
    /// Color is neither `#rrggbb` nor an `r, g, b` triple.
    #[error("invalid color: {0}")]
    InvalidColor(String),
    /// Currency code is not three ASCII letters.
    #[error("invalid currency code: {0}")]
    InvalidCurrency(String),
}

/// Normalizes and validates an email string.
fn normalize_email<S: Into<String>>(email: S) -> Result<String, TypeConstraintError> {
    let normalized = email.into().trim().to_lowercase();
    if normalized.validate_email() {
        Ok(normalized)
    } else {
        Err(TypeConstraintError::InvalidEmail)
    }
}

/// Email address of a client tenant.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct ClientEmail(String);

impl ClientEmail {
    /// Trims and lower-cases before validating.
    pub fn new<S: Into<String>>(email: S) -> Result<Self, TypeConstraintError> {
        normalize_email(email).map(Self)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl Display for ClientEmail {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

fn trimmed_non_empty<S: Into<String>>(value: S) -> Result<String, TypeConstraintError> {
    let trimmed = value.into().trim().to_string();
    if trimmed.is_empty() {
        return Err(TypeConstraintError::EmptyString);
    }
    Ok(trimmed)
}

macro_rules! non_empty_string_newtype {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name(String);

        impl $name {
            pub fn new<S: Into<String>>(value: S) -> Result<Self, TypeConstraintError> {
                trimmed_non_empty(value).map(Self)
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl Deref for $name {
            type Target = str;

            fn deref(&self) -> &Self::Target {
                &self.0
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

non_empty_string_newtype!(ClientName, "Display name of a client tenant.");
non_empty_string_newtype!(
    ClientCuid,
    "Public identifier of a client, doubling as the widget access key."
);
non_empty_string_newtype!(
    Credential,
    "Integration secret such as an API key or OAuth client secret."
);

/// Absolute http(s) URL, or nothing.
///
/// Most URL-ish preferences are optional, so an empty input is accepted and
/// kept as an empty string.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub struct OptionalUrl(String);

impl OptionalUrl {
    pub fn new<S: Into<String>>(value: S) -> Result<Self, TypeConstraintError> {
        let trimmed = value.into().trim().to_string();
        if trimmed.is_empty() || trimmed.validate_url() {
            Ok(Self(trimmed))
        } else {
            Err(TypeConstraintError::InvalidUrl)
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

/// An RGB color as stored by the platform: a `"r, g, b"` triple.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub struct RgbColor {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
}

impl RgbColor {
    pub const fn new(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }

    /// Parses `#rrggbb`, `#rgb` or a comma separated triple such as `"12, 34, 56"`.
    pub fn parse(value: &str) -> Result<Self, TypeConstraintError> {
        let value = value.trim();
        let invalid = || TypeConstraintError::InvalidColor(value.to_string());

        if let Some(hex) = value.strip_prefix('#') {
            if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
                return Err(invalid());
            }
            let expanded = match hex.len() {
                3 => hex.chars().flat_map(|c| [c, c]).collect::<String>(),
                6 => hex.to_string(),
                _ => return Err(invalid()),
            };
            let channel = |range: std::ops::Range<usize>| {
                u8::from_str_radix(&expanded[range], 16).map_err(|_| invalid())
            };
            return Ok(Self::new(channel(0..2)?, channel(2..4)?, channel(4..6)?));
        }

        let channels = value
            .split(',')
            .map(|part| part.trim().parse::<u8>().map_err(|_| invalid()))
            .collect::<Result<Vec<u8>, _>>()?;
        match channels.as_slice() {
            [red, green, blue] => Ok(Self::new(*red, *green, *blue)),
            _ => Err(invalid()),
        }
    }

    /// Lowercase `#rrggbb` notation used by HTML color inputs.
    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.red, self.green, self.blue)
    }
}

impl Display for RgbColor {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}, {}, {}", self.red, self.green, self.blue)
    }
}

impl FromStr for RgbColor {
    type Err = TypeConstraintError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Converts a stored triple into `#rrggbb`, falling back to black.
pub fn rgb_to_hex(value: &str) -> String {
    RgbColor::parse(value).unwrap_or_default().to_hex()
}

/// ISO 4217 style currency code, upper-cased.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct CurrencyCode(String);

impl CurrencyCode {
    pub fn new<S: Into<String>>(value: S) -> Result<Self, TypeConstraintError> {
        let code = value.into().trim().to_uppercase();
        if code.len() == 3 && code.chars().all(|c| c.is_ascii_alphabetic()) {
            Ok(Self(code))
        } else {
            Err(TypeConstraintError::InvalidCurrency(code))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rgb_color_parses_hex_and_triples() {
        assert_eq!(RgbColor::parse("#0a1B2c"), Ok(RgbColor::new(10, 27, 44)));
        assert_eq!(RgbColor::parse("#fff"), Ok(RgbColor::new(255, 255, 255)));
        assert_eq!(RgbColor::parse(" 1,2, 3 "), Ok(RgbColor::new(1, 2, 3)));
        assert!(RgbColor::parse("1, 2").is_err());
        assert!(RgbColor::parse("256, 0, 0").is_err());
        assert!(RgbColor::parse("#12345").is_err());
        assert!(RgbColor::parse("#gg0000").is_err());
    }

    #[test]
    fn rgb_to_hex_falls_back_to_black() {
        assert_eq!(rgb_to_hex("255, 128, 0"), "#ff8000");
        assert_eq!(RgbColor::parse("#ff8000").unwrap().to_string(), "255, 128, 0");
        assert_eq!(rgb_to_hex(""), "#000000");
    }

    #[test]
    fn email_is_normalized() {
        let email = ClientEmail::new("  Owner@Example.COM ").unwrap();
        assert_eq!(email.as_str(), "owner@example.com");
        assert_eq!(
            ClientEmail::new("nope"),
            Err(TypeConstraintError::InvalidEmail)
        );
    }

    #[test]
    fn optional_url_accepts_empty_and_rejects_garbage() {
        assert_eq!(OptionalUrl::new("  ").unwrap().as_str(), "");
        assert_eq!(
            OptionalUrl::new("https://example.com/cms").unwrap().as_str(),
            "https://example.com/cms"
        );
        assert_eq!(
            OptionalUrl::new("not a url"),
            Err(TypeConstraintError::InvalidUrl)
        );
    }

    #[test]
    fn currency_code_is_upper_cased() {
        assert_eq!(CurrencyCode::new(" eur ").unwrap().as_str(), "EUR");
        assert!(CurrencyCode::new("EURO").is_err());
        assert!(CurrencyCode::new("E1R").is_err());
    }

    #[test]
    fn names_are_trimmed() {
        assert_eq!(ClientName::new("  Chalets ").unwrap().as_str(), "Chalets");
        assert_eq!(ClientName::new("   "), Err(TypeConstraintError::EmptyString));
    }
}
