use crate::error::{CodecError, FetchError, IngestFailure};
use crate::index::ZoneIndex;
use crate::model::name::DomainName;
use crate::model::record::{RecordType, ZoneRecord};
use crate::parser::reverse::{canonicalize_ipv4, canonicalize_ipv6, ReverseZone};
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Source of zone contents. Transport, retries and authentication live
/// behind this trait.
pub trait RecordFetcher: Send + Sync {
    fn fetch_zone(&self, zone: &str) -> Result<Vec<ZoneRecord>, FetchError>;
}

/// Populates one [`ZoneIndex`]. Each builder owns its index outright, so
/// independent builds never share state.
pub struct ZoneIndexBuilder {
    index: ZoneIndex,
    skipped_records: usize,
}

impl ZoneIndexBuilder {
    pub fn new() -> Self {
        ZoneIndexBuilder {
            index: ZoneIndex::new(),
            skipped_records: 0,
        }
    }

    fn record_failure(&mut self, failure: IngestFailure) -> IngestFailure {
        warn!("Skipping zone {}", failure);
        self.index.failures.push(failure.clone());
        failure
    }

    pub fn reject_zone(&mut self, zone: &str, error: &CodecError) -> IngestFailure {
        self.record_failure(IngestFailure::from_codec(zone, error))
    }

    /// Ingests one domain's forward records in two phases: every CNAME
    /// first, then every A/AAAA record. Aliases therefore link to their
    /// target's addresses wherever they appear in `records`, but only
    /// aliases known by the time an address is processed are linked.
    ///
    /// Returns the number of records ingested.
    pub fn ingest_forward_zone(&mut self, domain: &str, records: &[ZoneRecord]) -> Result<usize, IngestFailure> {
        let origin = match DomainName::new(domain) {
            Ok(origin) => origin,
            Err(e) => {
                let error = FetchError::Parse { zone: domain.to_string(), line: 0, detail: e.to_string() };
                return Err(self.record_failure(IngestFailure::from_fetch(domain, &error)));
            }
        };

        let aliases = self.ingest_cnames(&origin, records);
        let addresses = self.ingest_addresses(&origin, records);

        self.index.known_domains.insert(origin.to_string());

        info!("Ingested {} CNAME and {} address records from forward zone {}", aliases, addresses, origin);

        Ok(aliases + addresses)
    }

    fn ingest_cnames(&mut self, origin: &DomainName, records: &[ZoneRecord]) -> usize {
        let mut count = 0;

        for record in records.iter().filter(|r| r.record_type == RecordType::CNAME) {
            let (alias, target) = match (DomainName::qualify(&record.owner, origin), DomainName::qualify(&record.data, origin)) {
                (Ok(alias), Ok(target)) => (alias, target),
                (Err(e), _) | (_, Err(e)) => {
                    warn!("Invalid CNAME {:?} in zone {}: {}", record, origin, e);
                    self.skipped_records += 1;
                    continue;
                }
            };

            self.index.cname_targets.insert(alias.to_string(), target.to_string());
            self.index.cname_aliases.append(target.as_str(), alias.as_str());

            count += 1;
        }

        count
    }

    fn ingest_addresses(&mut self, origin: &DomainName, records: &[ZoneRecord]) -> usize {
        let mut count = 0;

        for record in records {
            let canonicalize: fn(&str) -> Result<String, CodecError> = match record.record_type {
                RecordType::A => canonicalize_ipv4,
                RecordType::AAAA => canonicalize_ipv6,
                RecordType::CNAME => continue,
                RecordType::PTR => {
                    debug!("Ignoring PTR record {:?} in forward zone {}", record, origin);
                    continue;
                }
            };

            let owner = match DomainName::qualify(&record.owner, origin) {
                Ok(owner) => owner,
                Err(e) => {
                    warn!("Invalid owner in record {:?} of zone {}: {}", record, origin, e);
                    self.skipped_records += 1;
                    continue;
                }
            };

            let address = match canonicalize(&record.data) {
                Ok(address) => address,
                Err(e) => {
                    warn!("Skipping record {:?} in zone {}: {}", record, origin, e);
                    self.skipped_records += 1;
                    continue;
                }
            };

            let index = &mut self.index;

            let (by_name, by_address) = match record.record_type {
                RecordType::AAAA => (&mut index.aaaa_records, &mut index.aaaa_owners),
                _ => (&mut index.a_records, &mut index.a_owners),
            };

            by_name.append(owner.as_str(), &address);
            by_address.append(&address, owner.as_str());

            index.name_addresses.append(owner.as_str(), &address);
            index.address_names.append(&address, owner.as_str());

            if let Some(aliases) = index.cname_aliases.get(owner.as_str()) {
                for alias in aliases {
                    index.address_names.append(&address, alias);
                    index.name_addresses.append(alias, &address);
                }
            }

            count += 1;
        }

        count
    }

    /// Ingests the PTR records of one reverse zone. Records whose owner does
    /// not decode to an address are skipped individually.
    pub fn ingest_reverse_zone(&mut self, zone: &str, records: &[ZoneRecord]) -> Result<usize, IngestFailure> {
        let reverse_zone = match ReverseZone::new(zone) {
            Ok(reverse_zone) => reverse_zone,
            Err(e) => return Err(self.reject_zone(zone, &e)),
        };

        let mut count = 0;

        for record in records {
            if record.record_type != RecordType::PTR {
                debug!("Ignoring {} record {:?} in reverse zone {}", record.record_type, record, zone);
                continue;
            }

            let address = match reverse_zone.decode_owner(&record.owner) {
                Ok(address) => address,
                Err(e) => {
                    warn!("Skipping PTR {:?} in zone {}: {}", record, zone, e);
                    self.skipped_records += 1;
                    continue;
                }
            };

            let target = match DomainName::qualify(&record.data, reverse_zone.name()) {
                Ok(target) => target,
                Err(e) => {
                    warn!("Invalid PTR target in record {:?} of zone {}: {}", record, zone, e);
                    self.skipped_records += 1;
                    continue;
                }
            };

            self.index.ptr_targets.append(&address, target.as_str());
            self.index.ptr_addresses.append(target.as_str(), &address);

            count += 1;
        }

        info!("Ingested {} PTR records from reverse zone {}", count, reverse_zone.name());

        Ok(count)
    }

    pub fn add_forward_result(&mut self, domain: &str, fetched: Result<Vec<ZoneRecord>, FetchError>) -> Result<usize, IngestFailure> {
        match fetched {
            Ok(records) => self.ingest_forward_zone(domain, &records),
            Err(e) => Err(self.record_failure(IngestFailure::from_fetch(domain, &e))),
        }
    }

    pub fn add_reverse_result(&mut self, zone: &str, fetched: Result<Vec<ZoneRecord>, FetchError>) -> Result<usize, IngestFailure> {
        match fetched {
            Ok(records) => self.ingest_reverse_zone(zone, &records),
            Err(e) => Err(self.record_failure(IngestFailure::from_fetch(zone, &e))),
        }
    }

    pub fn skipped_records(&self) -> usize {
        self.skipped_records
    }

    /// Freezes the index and stamps its build time.
    pub fn finish(mut self) -> ZoneIndex {
        self.index.built_at = Utc::now();

        info!(
            "Built index: {} known domains, {} PTR addresses, {} forward addresses, {} failed zones, {} skipped records",
            self.index.known_domains.len(),
            self.index.ptr_targets.len(),
            self.index.address_names.len(),
            self.index.failures.len(),
            self.skipped_records
        );

        self.index
    }
}

impl Default for ZoneIndexBuilder {
    fn default() -> Self {
        ZoneIndexBuilder::new()
    }
}

/// Fetches and ingests every forward domain, then every reverse zone, one
/// after another. Failing zones are recorded on the index and skipped.
pub fn build_index(forward_domains: &[String], reverse_zones: &[String], fetcher: &dyn RecordFetcher) -> ZoneIndex {
    let mut builder = ZoneIndexBuilder::new();

    for domain in forward_domains {
        info!("Domain: {}", domain);
        let _ = builder.add_forward_result(domain, fetcher.fetch_zone(domain));
    }

    for zone in reverse_zones {
        info!("Reverse zone: {}", zone);

        if let Err(e) = ReverseZone::new(zone) {
            builder.reject_zone(zone, &e);
            continue;
        }

        let _ = builder.add_reverse_result(zone, fetcher.fetch_zone(zone));
    }

    builder.finish()
}

type FetchHandle = tokio::task::JoinHandle<Result<Vec<ZoneRecord>, FetchError>>;

/// A reverse zone is checked for a supported kind before it is fetched.
enum PendingReverseZone {
    Rejected(CodecError),
    Fetching(FetchHandle),
}

async fn join_fetch(zone: &str, handle: FetchHandle) -> Result<Vec<ZoneRecord>, FetchError> {
    handle.await.unwrap_or_else(|e| {
        Err(FetchError::Transfer {
            zone: zone.to_string(),
            detail: format!("Fetch task failed: {}", e),
        })
    })
}

/// Like [`build_index`], but fetches all zones concurrently on the blocking
/// pool. Merging still happens on a single writer, in the same order as the
/// sequential build, so both produce the same index.
pub async fn build_index_concurrent(forward_domains: &[String], reverse_zones: &[String], fetcher: Arc<dyn RecordFetcher>) -> ZoneIndex {
    let spawn_fetch = |zone: &String| -> FetchHandle {
        let fetcher = fetcher.clone();
        let zone = zone.clone();
        tokio::task::spawn_blocking(move || fetcher.fetch_zone(&zone))
    };

    let forward: Vec<(&String, FetchHandle)> = forward_domains
        .iter()
        .map(|domain| (domain, spawn_fetch(domain)))
        .collect();

    let reverse: Vec<(&String, PendingReverseZone)> = reverse_zones
        .iter()
        .map(|zone| match ReverseZone::new(zone) {
            Ok(_) => (zone, PendingReverseZone::Fetching(spawn_fetch(zone))),
            Err(e) => (zone, PendingReverseZone::Rejected(e)),
        })
        .collect();

    info!("Fetching {} forward and {} reverse zones concurrently", forward.len(), reverse.len());

    let mut builder = ZoneIndexBuilder::new();

    for (domain, handle) in forward {
        let fetched = join_fetch(domain, handle).await;
        let _ = builder.add_forward_result(domain, fetched);
    }

    for (zone, pending) in reverse {
        match pending {
            PendingReverseZone::Fetching(handle) => {
                let fetched = join_fetch(zone, handle).await;
                let _ = builder.add_reverse_result(zone, fetched);
            }
            PendingReverseZone::Rejected(e) => {
                builder.reject_zone(zone, &e);
            }
        }
    }

    builder.finish()
}
