pub mod builder;
pub mod check;
pub mod lookup;

use crate::error::IngestFailure;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Key -> ordered values. Duplicates are kept and values stay in insertion
/// order. Keys iterate in sorted order, which makes every walk over the index
/// reproducible.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(transparent)]
pub struct MultiMap(BTreeMap<String, Vec<String>>);

impl MultiMap {
    pub fn new() -> Self {
        MultiMap(BTreeMap::new())
    }

    pub fn append(&mut self, key: &str, value: &str) {
        self.0
            .entry(key.to_string())
            .or_default()
            .push(value.to_string());
    }

    /// `None` when the key was never appended to. A present list is never empty.
    pub fn get(&self, key: &str) -> Option<&[String]> {
        self.0.get(key).map(|values| values.as_slice())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// The bidirectional view over a set of forward and reverse zones.
///
/// Built once by [`builder::ZoneIndexBuilder`] and read-only afterwards.
/// Addresses are always keyed by their canonical text.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ZoneIndex {
    /// name -> IPv4 addresses from A records
    pub a_records: MultiMap,
    /// IPv4 address -> A record owners
    pub a_owners: MultiMap,
    /// name -> IPv6 addresses from AAAA records
    pub aaaa_records: MultiMap,
    /// IPv6 address -> AAAA record owners
    pub aaaa_owners: MultiMap,
    /// alias -> canonical name
    pub cname_targets: BTreeMap<String, String>,
    /// canonical name -> aliases
    pub cname_aliases: MultiMap,
    /// address -> PTR targets
    pub ptr_targets: MultiMap,
    /// PTR target -> addresses pointing at it
    pub ptr_addresses: MultiMap,
    /// name -> addresses, from any record type including CNAME links
    pub name_addresses: MultiMap,
    /// address -> names, from any record type including CNAME links
    pub address_names: MultiMap,
    pub known_domains: BTreeSet<String>,
    pub failures: Vec<IngestFailure>,
    pub built_at: DateTime<Utc>,
}

impl ZoneIndex {
    pub fn new() -> Self {
        ZoneIndex {
            a_records: MultiMap::new(),
            a_owners: MultiMap::new(),
            aaaa_records: MultiMap::new(),
            aaaa_owners: MultiMap::new(),
            cname_targets: BTreeMap::new(),
            cname_aliases: MultiMap::new(),
            ptr_targets: MultiMap::new(),
            ptr_addresses: MultiMap::new(),
            name_addresses: MultiMap::new(),
            address_names: MultiMap::new(),
            known_domains: BTreeSet::new(),
            failures: Vec::new(),
            built_at: Utc::now(),
        }
    }

    pub fn is_known_domain(&self, domain: &str) -> bool {
        self.known_domains.contains(domain)
    }

    /// Age of the index relative to `now`.
    pub fn age(&self, now: DateTime<Utc>) -> chrono::Duration {
        now - self.built_at
    }
}

impl Default for ZoneIndex {
    fn default() -> Self {
        ZoneIndex::new()
    }
}
