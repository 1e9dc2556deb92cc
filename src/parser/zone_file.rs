use crate::error::FetchError;
use crate::model::name::DomainName;
use crate::model::record::{RecordType, ZoneRecord};
use std::str::FromStr;
use tracing::debug;

const CLASSES: [&str; 4] = ["IN", "CH", "HS", "CS"];

/// Strips a `;` comment, ignoring semicolons inside quoted strings.
fn strip_comment(line: &str) -> &str {
    let mut in_quotes = false;
    let mut escaped = false;

    for (i, c) in line.char_indices() {
        match c {
            _ if escaped => escaped = false,
            '\\' => escaped = true,
            '"' => in_quotes = !in_quotes,
            ';' if !in_quotes => return &line[..i],
            _ => {}
        }
    }

    line
}

fn is_ttl(token: &str) -> bool {
    token.chars().next().is_some_and(|c| c.is_ascii_digit())
        && token.chars().all(|c| c.is_ascii_alphanumeric())
}

fn is_class(token: &str) -> bool {
    CLASSES.iter().any(|class| class.eq_ignore_ascii_case(token))
}

/// Rewrites a relative name against a `$ORIGIN` that differs from the zone.
fn absolutize(name: &str, origin: Option<&DomainName>) -> String {
    match origin {
        Some(origin) if name == "@" => format!("{}.", origin),
        Some(origin) if !name.ends_with('.') => format!("{}.{}.", name, origin),
        _ => name.to_string(),
    }
}

/// Blanks out grouping parentheses and tracks their nesting in `depth`.
/// Parentheses inside quoted strings are data and are left alone.
fn strip_parentheses(line: &str, depth: &mut i32) -> String {
    let mut cleaned = String::with_capacity(line.len());
    let mut in_quotes = false;
    let mut escaped = false;

    for c in line.chars() {
        match c {
            _ if escaped => escaped = false,
            '\\' => escaped = true,
            '"' => in_quotes = !in_quotes,
            '(' if !in_quotes => {
                *depth += 1;
                cleaned.push(' ');
                continue;
            }
            ')' if !in_quotes => {
                *depth -= 1;
                cleaned.push(' ');
                continue;
            }
            _ => {}
        }

        cleaned.push(c);
    }

    cleaned
}

/// A logical entry: one line, or several joined by parentheses.
struct Entry {
    line: usize,
    continues_owner: bool,
    text: String,
}

fn collect_entries(zone: &str, content: &str) -> Result<Vec<Entry>, FetchError> {
    let mut entries = Vec::new();
    let mut pending: Option<Entry> = None;
    let mut depth: i32 = 0;

    for (index, raw_line) in content.lines().enumerate() {
        let line_number = index + 1;
        let line = strip_comment(raw_line);

        if pending.is_none() && line.trim().is_empty() {
            continue;
        }

        let cleaned = strip_parentheses(line, &mut depth);

        if depth < 0 {
            return Err(FetchError::Parse {
                zone: zone.to_string(),
                line: line_number,
                detail: "Unbalanced ')'".to_string(),
            });
        }

        let entry = pending.get_or_insert_with(|| Entry {
            line: line_number,
            continues_owner: line.starts_with(char::is_whitespace),
            text: String::new(),
        });

        entry.text.push(' ');
        entry.text.push_str(&cleaned);

        if depth == 0
            && let Some(entry) = pending.take()
        {
            entries.push(entry);
        }
    }

    if let Some(entry) = pending {
        return Err(FetchError::Parse {
            zone: zone.to_string(),
            line: entry.line,
            detail: "Unterminated '('".to_string(),
        });
    }

    Ok(entries)
}

/// Parses master-file text into the A, AAAA, CNAME and PTR records it contains.
///
/// Other record types are skipped. Names are returned as written, except
/// that relative names under a `$ORIGIN` different from the zone are made
/// absolute.
pub fn parse_zone_file(zone: &str, content: &str) -> Result<Vec<ZoneRecord>, FetchError> {
    let zone_name = DomainName::new(zone).map_err(|e| FetchError::Parse {
        zone: zone.to_string(),
        line: 0,
        detail: e.to_string(),
    })?;

    let mut origin: Option<DomainName> = None;
    let mut last_owner: Option<String> = None;
    let mut records = Vec::new();

    for entry in collect_entries(zone, content)? {
        let parse_error = |detail: String| FetchError::Parse {
            zone: zone.to_string(),
            line: entry.line,
            detail,
        };

        let mut tokens = entry.text.split_whitespace().peekable();

        let Some(&first) = tokens.peek() else {
            continue;
        };

        if first.starts_with('$') {
            let directive = first.to_ascii_uppercase();
            tokens.next();

            if directive == "$ORIGIN" {
                let value = tokens
                    .next()
                    .ok_or_else(|| parse_error("$ORIGIN without a name".to_string()))?;

                let value = DomainName::new(value).map_err(|e| parse_error(e.to_string()))?;

                origin = if value == zone_name { None } else { Some(value) };
            } else {
                debug!("Ignoring directive {} in zone {}", directive, zone);
            }

            continue;
        }

        let owner = if entry.continues_owner {
            last_owner
                .clone()
                .ok_or_else(|| parse_error("Record without an owner".to_string()))?
        } else {
            let owner = tokens.next().unwrap_or_default();
            absolutize(owner, origin.as_ref())
        };

        last_owner = Some(owner.clone());

        let mut seen_ttl = false;
        let mut seen_class = false;

        while let Some(&token) = tokens.peek() {
            if !seen_ttl && is_ttl(token) {
                seen_ttl = true;
            } else if !seen_class && is_class(token) {
                seen_class = true;
            } else {
                break;
            }

            tokens.next();
        }

        let type_token = tokens
            .next()
            .ok_or_else(|| parse_error(format!("Missing record type for owner '{}'", owner)))?;

        let record_type = match RecordType::from_str(type_token) {
            Ok(record_type) => record_type,
            Err(_) => continue,
        };

        let data = tokens
            .next()
            .ok_or_else(|| parse_error(format!("Missing {} data for owner '{}'", record_type, owner)))?;

        let data = match record_type {
            RecordType::CNAME | RecordType::PTR => absolutize(data, origin.as_ref()),
            RecordType::A | RecordType::AAAA => data.to_string(),
        };

        records.push(ZoneRecord {
            owner,
            record_type,
            data,
        });
    }

    Ok(records)
}
