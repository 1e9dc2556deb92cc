use crate::index::ZoneIndex;
use crate::model::problem::Problem;
use tracing::info;

/// The domain a PTR target belongs to: the target minus its leftmost label.
fn owning_domain(name: &str) -> Option<&str> {
    name.split_once('.').map(|(_, domain)| domain)
}

/// Compares every PTR in `index` against the forward data for its address.
///
/// Problems come out in address order (the PTR map's key order), and in
/// record order for several PTRs on one address. PTR targets under a domain
/// that was never ingested are not judged.
pub fn find_problems(index: &ZoneIndex) -> Vec<Problem> {
    let mut problems = Vec::new();
    let mut unjudged = 0usize;

    for (address, ptr_targets) in index.ptr_targets.iter() {
        for ptr_target in ptr_targets {
            let known = owning_domain(ptr_target).is_some_and(|domain| index.is_known_domain(domain));

            if !known {
                unjudged += 1;
                continue;
            }

            match index.address_names.get(address) {
                None => problems.push(Problem::DanglingPTR {
                    address: address.to_string(),
                    ptr_target: ptr_target.clone(),
                }),
                Some(names) if !names.contains(ptr_target) => problems.push(Problem::MismatchedPTR {
                    address: address.to_string(),
                    ptr_target: ptr_target.clone(),
                    forward_names: names.to_vec(),
                }),
                Some(_) => {}
            }
        }
    }

    info!("Found {} problems, {} PTR records under unknown domains not checked", problems.len(), unjudged);

    problems
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::builder::tests::StaticFetcher;
    use crate::index::builder::{build_index, ZoneIndexBuilder};
    use crate::model::record::{RecordType, ZoneRecord};

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    fn scenario_index(forward_domains: &[&str], forward: Vec<ZoneRecord>, reverse: Vec<ZoneRecord>) -> ZoneIndex {
        let fetcher = StaticFetcher::new(&[
            ("example.com", forward),
            ("2.0.192.in-addr.arpa", reverse),
        ]);

        build_index(&strings(forward_domains), &strings(&["2.0.192.in-addr.arpa"]), &fetcher)
    }

    #[test]
    fn test_scenario_consistent() {
        let index = scenario_index(
            &["example.com"],
            vec![ZoneRecord::new("host1", RecordType::A, "192.0.2.10")],
            vec![ZoneRecord::new("10", RecordType::PTR, "host1.example.com.")],
        );

        assert_eq!(find_problems(&index), vec![]);
    }

    #[test]
    fn test_scenario_mismatched() {
        let index = scenario_index(
            &["example.com"],
            vec![ZoneRecord::new("host1", RecordType::A, "192.0.2.10")],
            vec![ZoneRecord::new("10", RecordType::PTR, "host2.example.com.")],
        );

        assert_eq!(find_problems(&index), vec![Problem::MismatchedPTR {
            address: "192.0.2.10".to_string(),
            ptr_target: "host2.example.com".to_string(),
            forward_names: strings(&["host1.example.com"]),
        }]);
    }

    #[test]
    fn test_scenario_dangling() {
        let index = scenario_index(
            &["example.com"],
            vec![ZoneRecord::new("other", RecordType::A, "192.0.2.99")],
            vec![ZoneRecord::new("10", RecordType::PTR, "host3.example.com.")],
        );

        assert_eq!(find_problems(&index), vec![Problem::DanglingPTR {
            address: "192.0.2.10".to_string(),
            ptr_target: "host3.example.com".to_string(),
        }]);
    }

    #[test]
    fn test_scenario_unknown_domain_suppresses_findings() {
        let index = scenario_index(
            &[],
            vec![],
            vec![ZoneRecord::new("10", RecordType::PTR, "host3.example.com.")],
        );

        assert_eq!(find_problems(&index), vec![]);
    }

    #[test]
    fn test_failed_transfer_suppresses_findings() {
        // example.net is requested but never transferred.
        let fetcher = StaticFetcher::new(&[
            ("2.0.192.in-addr.arpa", vec![ZoneRecord::new("10", RecordType::PTR, "host.example.net.")]),
        ]);

        let index = build_index(&strings(&["example.net"]), &strings(&["2.0.192.in-addr.arpa"]), &fetcher);

        assert_eq!(index.failures.len(), 1);
        assert_eq!(find_problems(&index), vec![]);
    }

    #[test]
    fn test_ptr_to_alias_is_consistent() {
        let mut builder = ZoneIndexBuilder::new();
        builder.ingest_forward_zone("example.com", &[
            ZoneRecord::new("host1", RecordType::A, "192.0.2.10"),
            ZoneRecord::new("www", RecordType::CNAME, "host1"),
        ]).unwrap();
        builder.ingest_reverse_zone("2.0.192.in-addr.arpa", &[
            ZoneRecord::new("10", RecordType::PTR, "www.example.com."),
        ]).unwrap();

        assert_eq!(find_problems(&builder.finish()), vec![]);
    }

    #[test]
    fn test_ordering_and_multiple_targets() {
        let mut builder = ZoneIndexBuilder::new();
        builder.ingest_forward_zone("example.com", &[
            ZoneRecord::new("host1", RecordType::A, "192.0.2.10"),
        ]).unwrap();
        builder.ingest_reverse_zone("2.0.192.in-addr.arpa", &[
            ZoneRecord::new("20", RecordType::PTR, "b.example.com."),
            ZoneRecord::new("10", RecordType::PTR, "host1.example.com."),
            ZoneRecord::new("10", RecordType::PTR, "a.example.com."),
            ZoneRecord::new("10", RecordType::PTR, "x.elsewhere.org."),
        ]).unwrap();
        let index = builder.finish();

        let problems = find_problems(&index);
        let summary: Vec<(&str, &str)> = problems.iter().map(|p| (p.address(), p.ptr_target())).collect();

        assert_eq!(summary, vec![("192.0.2.10", "a.example.com"), ("192.0.2.20", "b.example.com")]);
        assert!(matches!(problems[0], Problem::MismatchedPTR { .. }));
        assert!(matches!(problems[1], Problem::DanglingPTR { .. }));

        assert_eq!(find_problems(&index), problems, "Checking the same index twice gives the same result");
    }

    #[test]
    fn test_ipv6_forward_and_reverse_forms_match() {
        let mut builder = ZoneIndexBuilder::new();
        builder.ingest_forward_zone("example.com", &[
            ZoneRecord::new("host6", RecordType::AAAA, "2001:0DB8:0000:0000:0000:0000:0000:0001"),
        ]).unwrap();
        builder.ingest_reverse_zone("8.b.d.0.1.0.0.2.ip6.arpa", &[
            ZoneRecord::new("1.0.0.0.0.0.0.0.0.0.0.0.0.0.0.0.0.0.0.0.0.0.0.0", RecordType::PTR, "host6.example.com."),
        ]).unwrap();

        assert_eq!(find_problems(&builder.finish()), vec![]);
    }

    #[test]
    fn test_single_label_target_is_never_judged() {
        let mut builder = ZoneIndexBuilder::new();
        builder.ingest_forward_zone("example.com", &[]).unwrap();
        builder.ingest_reverse_zone("2.0.192.in-addr.arpa", &[
            ZoneRecord::new("10", RecordType::PTR, "localhost."),
        ]).unwrap();

        assert_eq!(find_problems(&builder.finish()), vec![]);
    }
}
