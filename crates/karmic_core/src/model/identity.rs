//! Normalized email identity.
//!
//! # Invariants
//! - The inner string is trimmed and lowercased.
//! - Equality of two identities is equality of their normalized forms.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt::{Display, Formatter};

static EMAIL_SHAPE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"));

/// Email-like key used for authorization and profile ownership.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Identity(String);

/// Canonicalizes a raw identifier. Total over any input.
pub fn normalize(raw: &str) -> Identity {
    Identity(raw.trim().to_lowercase())
}

impl Identity {
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether the identity has the `local@domain.tld` shape the admin
    /// screen accepts.
    pub fn is_valid_email(&self) -> bool {
        EMAIL_SHAPE_RE.is_match(&self.0)
    }
}

impl Display for Identity {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Identity {
    fn from(value: &str) -> Self {
        normalize(value)
    }
}

impl From<String> for Identity {
    fn from(value: String) -> Self {
        normalize(&value)
    }
}

// Documents written by older builds may hold un-normalized keys.
impl<'de> Deserialize<'de> for Identity {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Ok(normalize(&raw))
    }
}
