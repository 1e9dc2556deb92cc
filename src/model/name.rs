use serde::{Deserialize, Serialize};
use std::fmt;
use std::fmt::Display;
use std::str::FromStr;

/// A lowercase, fully qualified domain name stored without the trailing dot.
#[derive(Serialize, Deserialize, Debug, Clone, Hash, PartialEq, Eq, PartialOrd, Ord)]
#[serde(try_from = "String", into = "String")]
pub struct DomainName(String);

#[derive(Debug, PartialEq, Eq)]
pub enum DomainNameError {
    EmptyInput,
    LabelEmpty(String),
}

impl Display for DomainNameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DomainNameError::EmptyInput => write!(f, "Domain name cannot be empty"),
            DomainNameError::LabelEmpty(name) => write!(f, "Domain name '{}' contains an empty label (e.g., '..')", name),
        }
    }
}

impl std::error::Error for DomainNameError {}

impl DomainName {
    pub fn new(name: &str) -> Result<Self, DomainNameError> {
        let trimmed = name.trim();
        let to_validate = trimmed.strip_suffix('.').unwrap_or(trimmed);

        if to_validate.is_empty() {
            return Err(DomainNameError::EmptyInput);
        }

        if to_validate.split('.').any(|label| label.is_empty()) {
            return Err(DomainNameError::LabelEmpty(trimmed.to_string()));
        }

        Ok(DomainName(to_validate.to_lowercase()))
    }

    /// Qualifies a zone-file owner or target against `origin`.
    ///
    /// `@` is the origin itself, a trailing dot marks an absolute name, and
    /// anything else is relative to the origin.
    pub fn qualify(name: &str, origin: &DomainName) -> Result<Self, DomainNameError> {
        let name = name.trim();

        if name == "@" {
            return Ok(origin.clone());
        }

        if name.ends_with('.') {
            return DomainName::new(name);
        }

        if name.is_empty() {
            return Err(DomainNameError::EmptyInput);
        }

        DomainName::new(&format!("{}.{}", name, origin.0))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_child_of(&self, parent: &DomainName) -> bool {
        self.0.len() > parent.0.len()
            && self.0.ends_with(parent.0.as_str())
            && self.0.as_bytes()[self.0.len() - parent.0.len() - 1] == b'.'
    }

    /// The labels of `self` left of `parent`, or `None` when `self` is not
    /// inside `parent`. The apex itself yields an empty string.
    pub fn relative_to(&self, parent: &DomainName) -> Option<&str> {
        if self == parent {
            return Some("");
        }

        if !self.is_child_of(parent) {
            return None;
        }

        Some(&self.0[..self.0.len() - parent.0.len() - 1])
    }
}

impl FromStr for DomainName {
    type Err = DomainNameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DomainName::new(s)
    }
}

impl TryFrom<String> for DomainName {
    type Error = DomainNameError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        DomainName::new(&value)
    }
}

impl From<DomainName> for String {
    fn from(value: DomainName) -> Self {
        value.0
    }
}

impl Display for DomainName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
