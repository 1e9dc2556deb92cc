use crate::index::{MultiMap, ZoneIndex};
use crate::model::output::{AddressLookup, HostnameLookup};

fn field(map: &MultiMap, key: &str) -> Option<Vec<String>> {
    map.get(key).map(|values| values.to_vec())
}

/// Everything known about a hostname. The query is trimmed and lowercased.
pub fn lookup_by_hostname(index: &ZoneIndex, name: &str) -> HostnameLookup {
    let hostname = name.trim().to_lowercase();

    let cname_target = index.cname_targets.get(&hostname).cloned();

    let cname_siblings = cname_target
        .as_deref()
        .and_then(|target| index.cname_aliases.get(target))
        .map(|aliases| {
            aliases
                .iter()
                .filter(|alias| **alias != hostname)
                .cloned()
                .collect::<Vec<String>>()
        })
        .filter(|siblings| !siblings.is_empty());

    HostnameLookup {
        a: field(&index.a_records, &hostname),
        aaaa: field(&index.aaaa_records, &hostname),
        addresses: field(&index.name_addresses, &hostname),
        cname_target,
        cname_aliases: field(&index.cname_aliases, &hostname),
        cname_siblings,
        ptr: field(&index.ptr_targets, &hostname),
        ptr_addresses: field(&index.ptr_addresses, &hostname),
        hostname,
    }
}

/// Everything known about an address. The query is only trimmed, so it must
/// be given in canonical form to match.
pub fn lookup_by_address(index: &ZoneIndex, address: &str) -> AddressLookup {
    let address = address.trim().to_string();

    AddressLookup {
        a: field(&index.a_owners, &address),
        aaaa: field(&index.aaaa_owners, &address),
        ptr: field(&index.ptr_targets, &address),
        names: field(&index.address_names, &address),
        address,
    }
}
