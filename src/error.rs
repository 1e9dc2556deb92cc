use serde::{Deserialize, Serialize};
use std::fmt;
use std::fmt::Display;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    UnsupportedZoneKind(String),
    MalformedAddress(String),
}

impl Display for CodecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CodecError::UnsupportedZoneKind(zone) => write!(f, "Zone '{}' is neither an in-addr.arpa nor an ip6 reverse zone", zone),
            CodecError::MalformedAddress(detail) => write!(f, "Malformed address: {}", detail),
        }
    }
}

impl std::error::Error for CodecError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// The zone could not be retrieved at all. May succeed on a later pass.
    Transfer { zone: String, detail: String },
    /// The zone was retrieved but its content is broken.
    Parse { zone: String, line: usize, detail: String },
}

impl Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchError::Transfer { zone, detail } => write!(f, "Failed to transfer zone '{}': {}", zone, detail),
            FetchError::Parse { zone, line, detail } => write!(f, "Failed to parse zone '{}' at line {}: {}", zone, line, detail),
        }
    }
}

impl std::error::Error for FetchError {}

#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq, Eq)]
pub enum FailureKind {
    ZoneTransferFailure,
    ZoneParseFailure,
    UnsupportedZoneKind,
    MalformedZoneName,
}

/// A zone that was skipped during a build.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct IngestFailure {
    pub zone: String,
    pub kind: FailureKind,
    pub detail: String,
}

impl IngestFailure {
    pub fn from_fetch(zone: &str, error: &FetchError) -> Self {
        let kind = match error {
            FetchError::Transfer { .. } => FailureKind::ZoneTransferFailure,
            FetchError::Parse { .. } => FailureKind::ZoneParseFailure,
        };

        IngestFailure {
            zone: zone.to_string(),
            kind,
            detail: error.to_string(),
        }
    }

    pub fn from_codec(zone: &str, error: &CodecError) -> Self {
        let kind = match error {
            CodecError::UnsupportedZoneKind(_) => FailureKind::UnsupportedZoneKind,
            CodecError::MalformedAddress(_) => FailureKind::MalformedZoneName,
        };

        IngestFailure {
            zone: zone.to_string(),
            kind,
            detail: error.to_string(),
        }
    }
}

impl Display for IngestFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({:?}): {}", self.zone, self.kind, self.detail)
    }
}
