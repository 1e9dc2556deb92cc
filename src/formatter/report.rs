use crate::index::{MultiMap, ZoneIndex};
use crate::model::problem::Problem;

pub fn format_problem(problem: &Problem) -> String {
    match problem {
        Problem::DanglingPTR { address, ptr_target } => {
            format!("PTR for IP {} ({}) has no forward DNS entry (A or AAAA)", address, ptr_target)
        }
        Problem::MismatchedPTR { address, ptr_target, forward_names } => {
            format!(
                "PTR for IP {} ({}) has no corresponding forward DNS entry - records are: {}",
                address,
                ptr_target,
                forward_names.join(",")
            )
        }
    }
}

/// One line per problem, preceded by the build time of the index.
pub fn format_problems(index: &ZoneIndex, problems: &[Problem]) -> String {
    let mut buffer = String::new();

    buffer.push_str(format!("; Index built at {}\n", index.built_at.to_rfc3339()).as_str());

    for failure in &index.failures {
        buffer.push_str(format!("; Skipped zone {}\n", failure).as_str());
    }

    for problem in problems {
        buffer.push_str(&format_problem(problem));
        buffer.push('\n');
    }

    buffer
}

fn generate_section(buffer: &mut String, title: &str, map: &MultiMap) {
    buffer.push_str(format!("Dumping {}...\n", title).as_str());

    for (key, values) in map.iter() {
        buffer.push_str(format!("{}: [{}]\n", key, values.join(",")).as_str());
    }
}

/// Every map of the index as `key: [value,...]` lines.
pub fn format_index_dump(index: &ZoneIndex) -> String {
    let mut buffer = String::new();

    buffer.push_str(format!("Index built at {}\n", index.built_at.to_rfc3339()).as_str());

    generate_section(&mut buffer, "A->IPv4 map", &index.a_records);
    generate_section(&mut buffer, "AAAA->IPv6 map", &index.aaaa_records);
    generate_section(&mut buffer, "name->PTR map", &index.ptr_addresses);

    buffer.push_str("Dumping cname->name map...\n");
    for (alias, target) in &index.cname_targets {
        buffer.push_str(format!("{}: [{}]\n", alias, target).as_str());
    }

    generate_section(&mut buffer, "IPv4->A map", &index.a_owners);
    generate_section(&mut buffer, "IPv6->AAAA map", &index.aaaa_owners);
    generate_section(&mut buffer, "PTR->name map", &index.ptr_targets);
    generate_section(&mut buffer, "name->cname map", &index.cname_aliases);
    generate_section(&mut buffer, "name->IP map", &index.name_addresses);
    generate_section(&mut buffer, "IP->name map", &index.address_names);

    buffer.push_str(format!("Known domains: [{}]\n", index.known_domains.iter().cloned().collect::<Vec<String>>().join(",")).as_str());

    buffer
}
