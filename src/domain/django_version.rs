//! Django release line selection

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Canonical package name written to requirements.txt
pub const DJANGO_PACKAGE: &str = "Django";

/// A Django `major.minor` release line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DjangoVersion {
    pub major: u32,
    pub minor: u32,
}

impl DjangoVersion {
    /// Creates a new DjangoVersion
    pub const fn new(major: u32, minor: u32) -> Self {
        Self { major, minor }
    }

    /// Returns the compatible-release specifier, e.g. `~=1.11`
    pub fn specifier(&self) -> String {
        format!("~={}", self)
    }

    /// Returns true for long-term support release lines
    pub fn is_lts(&self) -> bool {
        matches!((self.major, self.minor), (1, 8) | (1, 11) | (2, 2) | (3, 2) | (4, 2))
    }

    /// Returns the display label, e.g. `1.11 (LTS)`
    pub fn label(&self) -> String {
        if self.is_lts() {
            format!("{} (LTS)", self)
        } else {
            self.to_string()
        }
    }
}

impl Default for DjangoVersion {
    fn default() -> Self {
        Self::new(1, 11)
    }
}

impl fmt::Display for DjangoVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

impl FromStr for DjangoVersion {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ConfigError::InvalidDjangoVersion {
            value: s.to_string(),
        };

        let (major, minor) = s.trim().split_once('.').ok_or_else(invalid)?;
        let major = major.parse::<u32>().map_err(|_| invalid())?;
        let minor = minor.parse::<u32>().map_err(|_| invalid())?;

        if major == 0 {
            return Err(invalid());
        }

        Ok(Self::new(major, minor))
    }
}

impl TryFrom<String> for DjangoVersion {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<DjangoVersion> for String {
    fn from(value: DjangoVersion) -> Self {
        value.to_string()
    }
}
