use crate::error::CodecError;
use crate::model::name::DomainName;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::str::FromStr;

const IPV4_REVERSE_SUFFIX: &str = "in-addr.arpa";
const IPV6_REVERSE_SUFFIXES: [&str; 2] = ["ip6.arpa", "ip6.int"];

const IPV4_OCTETS: usize = 4;
const IPV6_NIBBLES: usize = 32;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum AddressFamily {
    V4,
    V6,
}

/// A reverse zone split at its delegation boundary.
///
/// `prefix` holds the address components the zone name delegates, most
/// significant first. Record owners inside the zone supply the rest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReverseZone {
    name: DomainName,
    family: AddressFamily,
    prefix: Vec<u8>,
}

impl ReverseZone {
    pub fn new(zone: &str) -> Result<Self, CodecError> {
        let name = DomainName::new(zone)
            .map_err(|_| CodecError::UnsupportedZoneKind(zone.to_string()))?;

        let ipv4_suffix = DomainName::new(IPV4_REVERSE_SUFFIX)
            .map_err(|_| CodecError::UnsupportedZoneKind(zone.to_string()))?;

        if let Some(rest) = name.relative_to(&ipv4_suffix) {
            let mut labels: Vec<&str> = split_labels(rest);

            // 0/25.2.0.192.in-addr.arpa (RFC 2317): the classless label
            // names the delegated block and carries no octet of its own.
            if let Some(first) = labels.first()
                && is_classless_label(first)
            {
                labels.remove(0);
            }

            let prefix = parse_components(labels.into_iter().rev(), parse_octet)?;

            if prefix.len() > IPV4_OCTETS {
                return Err(CodecError::MalformedAddress(format!("Reverse zone '{}' has {} octets, at most {} expected", name, prefix.len(), IPV4_OCTETS)));
            }

            return Ok(ReverseZone { name, family: AddressFamily::V4, prefix });
        }

        for suffix in IPV6_REVERSE_SUFFIXES {
            let ipv6_suffix = DomainName::new(suffix)
                .map_err(|_| CodecError::UnsupportedZoneKind(zone.to_string()))?;

            if let Some(rest) = name.relative_to(&ipv6_suffix) {
                let prefix = parse_components(split_labels(rest).into_iter().rev(), parse_nibble)?;

                if prefix.len() > IPV6_NIBBLES {
                    return Err(CodecError::MalformedAddress(format!("Reverse zone '{}' has {} nibbles, at most {} expected", name, prefix.len(), IPV6_NIBBLES)));
                }

                return Ok(ReverseZone { name, family: AddressFamily::V6, prefix });
            }
        }

        Err(CodecError::UnsupportedZoneKind(zone.to_string()))
    }

    pub fn name(&self) -> &DomainName {
        &self.name
    }

    pub fn family(&self) -> AddressFamily {
        self.family
    }

    /// Decodes a PTR owner inside this zone into its canonical address.
    ///
    /// The owner may be relative (`10`, `10.2`), the apex (`@`) or absolute
    /// with a trailing dot, in which case it must lie inside the zone.
    pub fn decode_owner(&self, owner: &str) -> Result<String, CodecError> {
        let owner = owner.trim();

        let relative = if owner.is_empty() || owner == "@" {
            String::new()
        } else if owner.ends_with('.') {
            let absolute = DomainName::new(owner)
                .map_err(|e| CodecError::MalformedAddress(format!("Owner '{}': {}", owner, e)))?;

            absolute
                .relative_to(&self.name)
                .map(|s| s.to_string())
                .ok_or_else(|| CodecError::MalformedAddress(format!("Owner '{}' is outside zone '{}'", owner, self.name)))?
        } else {
            DomainName::new(owner)
                .map_err(|e| CodecError::MalformedAddress(format!("Owner '{}': {}", owner, e)))?
                .as_str()
                .to_string()
        };

        let mut components = self.prefix.clone();

        match self.family {
            AddressFamily::V4 => {
                components.extend(parse_components(split_labels(&relative).into_iter().rev(), parse_octet)?);

                if components.len() != IPV4_OCTETS {
                    return Err(CodecError::MalformedAddress(format!("Owner '{}' in zone '{}' yields {} octets, expected {}", owner, self.name, components.len(), IPV4_OCTETS)));
                }

                Ok(Ipv4Addr::new(components[0], components[1], components[2], components[3]).to_string())
            }
            AddressFamily::V6 => {
                components.extend(parse_components(split_labels(&relative).into_iter().rev(), parse_nibble)?);

                if components.len() != IPV6_NIBBLES {
                    return Err(CodecError::MalformedAddress(format!("Owner '{}' in zone '{}' yields {} nibbles, expected {}", owner, self.name, components.len(), IPV6_NIBBLES)));
                }

                let bits = components
                    .iter()
                    .fold(0u128, |acc, &nibble| (acc << 4) | nibble as u128);

                Ok(Ipv6Addr::from(bits).to_string())
            }
        }
    }
}

/// Decodes `owner` in reverse zone `zone` into a canonical address.
pub fn decode_reverse_owner(zone: &str, owner: &str) -> Result<String, CodecError> {
    ReverseZone::new(zone)?.decode_owner(owner)
}

/// Canonical text of an IPv4 or IPv6 literal. IPv6 comes out in RFC 5952
/// compressed form, so numerically equal addresses compare equal as strings.
pub fn canonicalize_address(address: &str) -> Result<String, CodecError> {
    IpAddr::from_str(address.trim())
        .map(|ip| ip.to_string())
        .map_err(|e| CodecError::MalformedAddress(format!("'{}': {}", address, e)))
}

pub fn canonicalize_ipv4(address: &str) -> Result<String, CodecError> {
    Ipv4Addr::from_str(address.trim())
        .map(|ip| ip.to_string())
        .map_err(|e| CodecError::MalformedAddress(format!("'{}' is not an IPv4 address: {}", address, e)))
}

pub fn canonicalize_ipv6(address: &str) -> Result<String, CodecError> {
    Ipv6Addr::from_str(address.trim())
        .map(|ip| ip.to_string())
        .map_err(|e| CodecError::MalformedAddress(format!("'{}' is not an IPv6 address: {}", address, e)))
}

/// Reverse-pointer labels of `ip`, least significant first, without the
/// `in-addr.arpa`/`ip6.arpa` suffix.
///
/// 192.0.2.10 -> ["10", "2", "0", "192"]
pub fn reverse_pointer_labels(ip: &IpAddr) -> Vec<String> {
    match ip {
        IpAddr::V4(ipv4) => ipv4.octets().iter().rev().map(|o| o.to_string()).collect(),
        IpAddr::V6(ipv6) => {
            let bits = u128::from(*ipv6);

            (0..IPV6_NIBBLES)
                .map(|i| format!("{:x}", (bits >> (i * 4)) & 0xF))
                .collect()
        }
    }
}

/// Full reverse-pointer name of `ip`, e.g. `10.2.0.192.in-addr.arpa`.
pub fn reverse_pointer_name(ip: &IpAddr) -> String {
    let suffix = match ip {
        IpAddr::V4(_) => IPV4_REVERSE_SUFFIX,
        IpAddr::V6(_) => IPV6_REVERSE_SUFFIXES[0],
    };

    format!("{}.{}", reverse_pointer_labels(ip).join("."), suffix)
}

fn split_labels(relative: &str) -> Vec<&str> {
    if relative.is_empty() {
        Vec::new()
    } else {
        relative.split('.').collect()
    }
}

fn is_classless_label(label: &str) -> bool {
    label.contains('/') || label.contains('-')
}

fn parse_components<'a>(labels: impl Iterator<Item = &'a str>, parse: fn(&str) -> Result<u8, CodecError>) -> Result<Vec<u8>, CodecError> {
    labels.map(parse).collect()
}

fn parse_octet(label: &str) -> Result<u8, CodecError> {
    if label.is_empty() || label.len() > 3 || !label.bytes().all(|b| b.is_ascii_digit()) {
        return Err(CodecError::MalformedAddress(format!("'{}' is not a decimal octet", label)));
    }

    label
        .parse::<u8>()
        .map_err(|_| CodecError::MalformedAddress(format!("Octet '{}' is out of range", label)))
}

fn parse_nibble(label: &str) -> Result<u8, CodecError> {
    let mut chars = label.chars();

    match (chars.next(), chars.next()) {
        (Some(c), None) => c
            .to_digit(16)
            .map(|d| d as u8)
            .ok_or_else(|| CodecError::MalformedAddress(format!("'{}' is not a hex nibble", label))),
        _ => Err(CodecError::MalformedAddress(format!("'{}' is not a single hex nibble", label))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ipv4_single_octet_owner() {
        assert_eq!(decode_reverse_owner("2.0.192.in-addr.arpa", "10"), Ok("192.0.2.10".to_string()));
    }

    #[test]
    fn test_ipv4_multi_octet_owner() {
        // 132.23 in 168.192.IN-ADDR.ARPA is 192.168.23.132
        assert_eq!(decode_reverse_owner("168.192.IN-ADDR.ARPA", "132.23"), Ok("192.168.23.132".to_string()));
        assert_eq!(decode_reverse_owner("10.in-addr.arpa.", "4.3.2"), Ok("10.2.3.4".to_string()));
    }

    #[test]
    fn test_ipv4_absolute_owner() {
        assert_eq!(decode_reverse_owner("2.0.192.in-addr.arpa", "10.2.0.192.in-addr.arpa."), Ok("192.0.2.10".to_string()));

        let outside = decode_reverse_owner("2.0.192.in-addr.arpa", "10.3.0.192.in-addr.arpa.");
        assert!(matches!(outside, Err(CodecError::MalformedAddress(_))));
    }

    #[test]
    fn test_ipv4_apex_owner() {
        assert_eq!(decode_reverse_owner("10.2.0.192.in-addr.arpa", "@"), Ok("192.0.2.10".to_string()));
    }

    #[test]
    fn test_ipv4_classless_zone() {
        assert_eq!(decode_reverse_owner("0/25.2.0.192.in-addr.arpa", "10"), Ok("192.0.2.10".to_string()));
        assert_eq!(decode_reverse_owner("128-25.2.0.192.in-addr.arpa", "200"), Ok("192.0.2.200".to_string()));
    }

    #[test]
    fn test_ipv4_wrong_octet_count() {
        // Three prefix octets and two owner octets make five.
        let too_many = decode_reverse_owner("2.0.192.in-addr.arpa", "10.1");
        assert!(matches!(too_many, Err(CodecError::MalformedAddress(_))));

        let too_few = decode_reverse_owner("0.192.in-addr.arpa", "10");
        assert!(matches!(too_few, Err(CodecError::MalformedAddress(_))));
    }

    #[test]
    fn test_ipv4_octet_out_of_range() {
        assert!(matches!(decode_reverse_owner("2.0.192.in-addr.arpa", "256"), Err(CodecError::MalformedAddress(_))));
        assert!(matches!(decode_reverse_owner("2.0.192.in-addr.arpa", "+1"), Err(CodecError::MalformedAddress(_))));
        assert!(matches!(decode_reverse_owner("2.0.192.in-addr.arpa", "ab"), Err(CodecError::MalformedAddress(_))));
    }

    #[test]
    fn test_unsupported_zone_kind() {
        assert_eq!(ReverseZone::new("example.com"), Err(CodecError::UnsupportedZoneKind("example.com".to_string())));
        assert!(matches!(ReverseZone::new("in-addr.arpa.example"), Err(CodecError::UnsupportedZoneKind(_))));
        assert!(matches!(ReverseZone::new(""), Err(CodecError::UnsupportedZoneKind(_))));
    }

    #[test]
    fn test_zone_family() {
        assert_eq!(ReverseZone::new("2.0.192.in-addr.arpa").unwrap().family(), AddressFamily::V4);
        assert_eq!(ReverseZone::new("8.b.d.0.1.0.0.2.ip6.arpa").unwrap().family(), AddressFamily::V6);
        assert_eq!(ReverseZone::new("8.0.8.0.1.1.e.f.f.3.IP6.INT").unwrap().family(), AddressFamily::V6);
    }

    #[test]
    fn test_ipv6_decode() {
        // f.e.1.2.3.4.1.2.3.4.1.2.3.4.1.2.3.4.1.2.3.4 in 8.0.8.0.1.1.e.f.f.3.IP6.ARPA
        let owner = "f.e.1.2.3.4.1.2.3.4.1.2.3.4.1.2.3.4.1.2.3.4";
        assert_eq!(
            decode_reverse_owner("8.0.8.0.1.1.e.f.f.3.IP6.ARPA", owner),
            Ok("3ffe:1108:843:2143:2143:2143:2143:21ef".to_string())
        );
    }

    #[test]
    fn test_ipv6_decode_compresses_zero_run() {
        let owner = "1.0.0.0.0.0.0.0.0.0.0.0.0.0.0.0.0.0.0.0.0.0.0.0";
        assert_eq!(decode_reverse_owner("8.b.d.0.1.0.0.2.ip6.arpa", owner), Ok("2001:db8::1".to_string()));
    }

    #[test]
    fn test_ipv6_wrong_nibble_count() {
        assert!(matches!(decode_reverse_owner("8.b.d.0.1.0.0.2.ip6.arpa", "1.0"), Err(CodecError::MalformedAddress(_))));
        assert!(matches!(decode_reverse_owner("8.b.d.0.1.0.0.2.ip6.arpa", "10.0"), Err(CodecError::MalformedAddress(_))));
        assert!(matches!(decode_reverse_owner("8.b.d.0.1.0.0.2.ip6.arpa", "g"), Err(CodecError::MalformedAddress(_))));
    }

    #[test]
    fn test_round_trip_every_split() {
        let addresses = [
            "192.0.2.10",
            "10.0.0.1",
            "255.255.255.255",
            "2001:db8::1",
            "3ffe:1108:843:2143:2143:2143:2143:21ef",
            "fe80::1:0:0:1",
            "::",
        ];

        for address in addresses {
            let ip = IpAddr::from_str(address).unwrap();
            let labels = reverse_pointer_labels(&ip);
            let suffix = match ip {
                IpAddr::V4(_) => "in-addr.arpa",
                IpAddr::V6(_) => "ip6.arpa",
            };

            // split = number of components delegated by the zone
            for split in 0..=labels.len() {
                let owner_labels = &labels[..labels.len() - split];
                let zone_labels = &labels[labels.len() - split..];

                let zone = if zone_labels.is_empty() {
                    suffix.to_string()
                } else {
                    format!("{}.{}", zone_labels.join("."), suffix)
                };

                let owner = if owner_labels.is_empty() {
                    "@".to_string()
                } else {
                    owner_labels.join(".")
                };

                assert_eq!(
                    decode_reverse_owner(&zone, &owner),
                    Ok(ip.to_string()),
                    "Round trip failed for {} split at {} (zone {}, owner {})", address, split, zone, owner
                );
            }
        }
    }

    #[test]
    fn test_reverse_pointer_name() {
        let ip = IpAddr::from_str("192.0.2.10").unwrap();
        assert_eq!(reverse_pointer_name(&ip), "10.2.0.192.in-addr.arpa");

        let ip6 = IpAddr::from_str("2001:db8::1").unwrap();
        assert_eq!(
            reverse_pointer_name(&ip6),
            "1.0.0.0.0.0.0.0.0.0.0.0.0.0.0.0.0.0.0.0.0.0.0.0.8.b.d.0.1.0.0.2.ip6.arpa"
        );
    }

    #[test]
    fn test_ipv6_canonicalization_equal_forms() {
        let forms = [
            "2001:db8::1",
            "2001:0db8:0000:0000:0000:0000:0000:0001",
            "2001:DB8:0:0:0:0:0:1",
            "2001:db8:0::0:1",
        ];

        for form in forms {
            assert_eq!(canonicalize_ipv6(form), Ok("2001:db8::1".to_string()), "Form {} did not canonicalize", form);
        }
    }

    #[test]
    fn test_ipv6_canonicalization_idempotent() {
        for form in ["2001:db8:0:0:1:0:0:1", "::1", "fe80::", "0:0:1::", "2001:db8:0:1:1:1:1:1"] {
            let once = canonicalize_ipv6(form).unwrap();
            let twice = canonicalize_ipv6(&once).unwrap();
            assert_eq!(once, twice);
        }
    }

    #[test]
    fn test_ipv6_canonicalization_leftmost_longest_run() {
        // Two equal runs of zeros: the leftmost one is compressed.
        assert_eq!(canonicalize_ipv6("2001:db8:0:0:1:0:0:1"), Ok("2001:db8::1:0:0:1".to_string()));
        // The longer run wins regardless of position.
        assert_eq!(canonicalize_ipv6("2001:0:0:1:0:0:0:1"), Ok("2001:0:0:1::1".to_string()));
    }

    #[test]
    fn test_canonicalize_family_mismatch() {
        assert!(canonicalize_ipv4("2001:db8::1").is_err());
        assert!(canonicalize_ipv6("192.0.2.1").is_err());
        assert_eq!(canonicalize_address(" 192.0.2.1 "), Ok("192.0.2.1".to_string()));
    }
}
