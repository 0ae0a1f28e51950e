//! # Case Identity Newtypes
//!
//! Newtype wrappers for the identifiers a case carries through the engine.
//! You cannot pass a `StationId` where a `CaseId` is expected.
//!
//! `CaseId` doubles as the file stem of the case journal, so its
//! constructor restricts the alphabet to characters that are safe in a
//! path component on every platform.

use serde::{Deserialize, Serialize};

use crate::error::NyayaError;

/// Maximum length of a case identifier.
const MAX_CASE_ID_LEN: usize = 128;

/// Unique identifier of a case record held by the case-management backend.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CaseId(String);

/// Case Number Record reference, tracking a case across its lifecycle.
///
/// Zero-FIR registrations carry a `0/` prefix (e.g. `0/2024/DL/001`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CnrNumber(String);

/// Identifier of a police station (origin or target of a transfer).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct StationId(String);

impl CaseId {
    /// Validate and wrap a case identifier.
    ///
    /// Accepts 1–128 ASCII alphanumerics, `-`, `_` and `.`; rejects `.`
    /// and `..` on their own.
    pub fn new(raw: impl Into<String>) -> Result<Self, NyayaError> {
        let raw = raw.into();
        if raw.is_empty() || raw.len() > MAX_CASE_ID_LEN {
            return Err(NyayaError::Validation(format!(
                "case id must be 1..={MAX_CASE_ID_LEN} characters, got {}",
                raw.len()
            )));
        }
        if raw == "." || raw == ".." {
            return Err(NyayaError::Validation(format!(
                "case id {raw:?} is reserved"
            )));
        }
        if let Some(bad) = raw
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.')))
        {
            return Err(NyayaError::Validation(format!(
                "case id {raw:?} contains invalid character {bad:?}"
            )));
        }
        Ok(Self(raw))
    }

    /// Access the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl CnrNumber {
    /// Wrap a CNR reference. Blank references are rejected.
    pub fn new(raw: impl Into<String>) -> Result<Self, NyayaError> {
        let raw = raw.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(NyayaError::Validation("CNR number must not be blank".into()));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Access the reference as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this CNR was issued for a Zero FIR.
    pub fn is_zero_fir(&self) -> bool {
        self.0.starts_with("0/")
    }
}

impl StationId {
    /// Wrap a station identifier. Blank identifiers are rejected.
    pub fn new(raw: impl Into<String>) -> Result<Self, NyayaError> {
        let raw = raw.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(NyayaError::Validation("station id must not be blank".into()));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Access the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

macro_rules! string_newtype_conversions {
    ($ty:ident) => {
        impl TryFrom<String> for $ty {
            type Error = NyayaError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$ty> for String {
            fn from(value: $ty) -> Self {
                value.0
            }
        }

        impl std::fmt::Display for $ty {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

string_newtype_conversions!(CaseId);
string_newtype_conversions!(CnrNumber);
string_newtype_conversions!(StationId);
