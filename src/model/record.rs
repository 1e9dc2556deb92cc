use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

/// The record types the analyzer consumes. Everything else in a zone is ignored.
#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq, Eq, Hash, EnumString, Display, AsRefStr)]
#[strum(ascii_case_insensitive)]
pub enum RecordType {
    A,
    AAAA,
    CNAME,
    PTR,
}

/// One `(owner, type, data)` tuple as handed over by a zone fetcher.
///
/// `owner` is kept exactly as the zone states it (relative, `@` or absolute);
/// qualification happens during ingestion.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
pub struct ZoneRecord {
    pub owner: String,
    pub record_type: RecordType,
    pub data: String,
}

impl ZoneRecord {
    pub fn new(owner: &str, record_type: RecordType, data: &str) -> Self {
        ZoneRecord {
            owner: owner.to_string(),
            record_type,
            data: data.to_string(),
        }
    }
}
