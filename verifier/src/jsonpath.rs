//! # JSONPath
//!
//! The subset of JSONPath used by presentation definitions and submissions:
//! the root `$`, member access (`.name`, `['name']`), array indexes (`[n]`)
//! and wildcards (`[*]`, `.*`).

use anyhow::{Result, anyhow, bail};
use serde_json::Value;

#[derive(Clone, Debug, PartialEq, Eq)]
enum Segment {
    Member(String),
    Index(usize),
    Wildcard,
}

/// Evaluate `path` against `value`, returning every match in document order.
///
/// # Errors
///
/// Returns an error if the path does not start at the root or uses syntax
/// outside the supported subset.
pub fn query<'a>(value: &'a Value, path: &str) -> Result<Vec<&'a Value>> {
    let mut matches = vec![value];
    for segment in parse(path)? {
        matches = matches.into_iter().flat_map(|v| select(v, &segment)).collect();
    }
    Ok(matches)
}

/// The first value matched by any of `paths`, tried in order.
///
/// # Errors
///
/// Returns an error if a path is invalid.
pub fn first<'a>(value: &'a Value, paths: &[String]) -> Result<Option<&'a Value>> {
    for path in paths {
        if let Some(found) = query(value, path)?.into_iter().next() {
            return Ok(Some(found));
        }
    }
    Ok(None)
}

fn select<'a>(value: &'a Value, segment: &Segment) -> Vec<&'a Value> {
    match (segment, value) {
        (Segment::Member(name), Value::Object(map)) => map.get(name).into_iter().collect(),
        (Segment::Index(idx), Value::Array(items)) => items.get(*idx).into_iter().collect(),
        (Segment::Wildcard, Value::Object(map)) => map.values().collect(),
        (Segment::Wildcard, Value::Array(items)) => items.iter().collect(),
        _ => vec![],
    }
}

fn parse(path: &str) -> Result<Vec<Segment>> {
    let Some(mut rest) = path.trim().strip_prefix('$') else {
        bail!("JSONPath must start at the root: {path}");
    };

    let mut segments = vec![];
    while !rest.is_empty() {
        if let Some(after) = rest.strip_prefix('.') {
            let end = after.find(['.', '[']).unwrap_or(after.len());
            let name = &after[..end];
            if name.is_empty() {
                bail!("empty member name in JSONPath: {path}");
            }
            segments.push(if name == "*" { Segment::Wildcard } else { Segment::Member(name.to_string()) });
            rest = &after[end..];
        } else if let Some(after) = rest.strip_prefix('[') {
            let end = closing_bracket(after).ok_or_else(|| anyhow!("unclosed '[' in JSONPath: {path}"))?;
            segments.push(bracket(after[..end].trim(), path)?);
            rest = &after[end + 1..];
        } else {
            bail!("unexpected character in JSONPath: {path}");
        }
    }
    Ok(segments)
}

// position of the `]` closing a bracket, skipping quoted names
fn closing_bracket(s: &str) -> Option<usize> {
    let mut quote = None;
    for (i, c) in s.char_indices() {
        match (quote, c) {
            (None, '\'' | '"') => quote = Some(c),
            (Some(q), _) if c == q => quote = None,
            (None, ']') => return Some(i),
            _ => {}
        }
    }
    None
}

fn bracket(inner: &str, path: &str) -> Result<Segment> {
    if inner == "*" {
        return Ok(Segment::Wildcard);
    }
    for quote in ['\'', '"'] {
        if let Some(name) = inner.strip_prefix(quote).and_then(|s| s.strip_suffix(quote)) {
            return Ok(Segment::Member(name.to_string()));
        }
    }
    inner
        .parse()
        .map(Segment::Index)
        .map_err(|_| anyhow!("unsupported JSONPath selector [{inner}]: {path}"))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn members_and_indexes() {
        let doc = json!({
            "verifiableCredential": [
                {"issuer": {"id": "did:key:one"}, "credentialSubject": {"KYBPAMLAttestation": {"process": "p"}}},
                {"issuer": "did:key:two"}
            ]
        });

        let found = query(&doc, "$.verifiableCredential[0]").expect("should query");
        assert_eq!(found, vec![&doc["verifiableCredential"][0]]);

        let found = query(&doc, "$['verifiableCredential'][1].issuer").expect("should query");
        assert_eq!(found, vec![&json!("did:key:two")]);

        let found =
            query(&doc, "$.verifiableCredential[0].credentialSubject.KYBPAMLAttestation.process")
                .expect("should query");
        assert_eq!(found, vec![&json!("p")]);

        assert!(query(&doc, "$.verifiableCredential[2]").expect("should query").is_empty());
        assert_eq!(query(&doc, "$").expect("should query"), vec![&doc]);
    }

    #[test]
    fn wildcards() {
        let doc = json!({"a": [{"b": 1}, {"b": 2}, {"c": 3}]});
        let found = query(&doc, "$.a[*].b").expect("should query");
        assert_eq!(found, vec![&json!(1), &json!(2)]);

        let found = query(&doc, "$.a.*").expect("should query");
        assert_eq!(found.len(), 3);
    }

    #[test]
    fn first_path_wins() {
        let vc = json!({"issuer": "did:key:issuer"});
        let paths = ["$.issuer.id", "$.issuer", "$.iss"].map(String::from).to_vec();
        assert_eq!(first(&vc, &paths).expect("should query"), Some(&json!("did:key:issuer")));

        let vc = json!({"issuer": {"id": "did:key:nested"}});
        assert_eq!(first(&vc, &paths).expect("should query"), Some(&json!("did:key:nested")));

        assert_eq!(first(&json!({}), &paths).expect("should query"), None);
    }

    #[test]
    fn unsupported() {
        let doc = json!({});
        assert!(query(&doc, "verifiableCredential").is_err());
        assert!(query(&doc, "$..issuer").is_err());
        assert!(query(&doc, "$.a[?(@.b)]").is_err());
        assert!(query(&doc, "$.a[0").is_err());
    }
}
