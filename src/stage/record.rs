//! Record canonicalization and serialization.
//!
//! Object members are reordered so that `id` comes first and the rest follow
//! in ascending byte order of their names, at every nesting level. Two
//! records with the same content then always serialize to the same text,
//! which keeps later comparison against historical snapshots stable.

use std::cmp::Ordering;

use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};
use serde_json::{Map, Value};

use crate::schema::table::ID_FIELD;

/// Member order used by [`canonicalize`].
pub fn compare_member_names(a: &str, b: &str) -> Ordering {
    match (a == ID_FIELD, b == ID_FIELD) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        (false, false) => a.as_bytes().cmp(b.as_bytes()),
    }
}

/// Reorder object members in place, recursively.
pub fn canonicalize(value: &mut Value) {
    match value {
        Value::Object(map) => {
            let mut members: Vec<(String, Value)> = std::mem::take(map).into_iter().collect();
            members.sort_by(|(a, _), (b, _)| compare_member_names(a, b));
            let mut sorted = Map::with_capacity(members.len());
            for (name, mut member) in members {
                canonicalize(&mut member);
                sorted.insert(name, member);
            }
            *map = sorted;
        }
        Value::Array(items) => items.iter_mut().for_each(canonicalize),
        _ => {}
    }
}

/// Remove NUL characters from strings and member names, recursively.
///
/// Neither backend accepts U+0000 in text, and the JSONB parser rejects its
/// `\u0000` escape as well.
pub fn remove_nul(value: &mut Value) {
    match value {
        Value::String(s) => s.retain(|c| c != '\0'),
        Value::Object(map) => {
            if map.keys().any(|name| name.contains('\0')) {
                *map = std::mem::take(map)
                    .into_iter()
                    .map(|(name, member)| (name.replace('\0', ""), member))
                    .collect();
            }
            map.values_mut().for_each(remove_nul);
        }
        Value::Array(items) => items.iter_mut().for_each(remove_nul),
        _ => {}
    }
}

/// Whether members are already in canonical order at every level.
pub fn is_canonical(value: &Value) -> bool {
    match value {
        Value::Object(map) => {
            let names: Vec<&String> = map.keys().collect();
            names
                .windows(2)
                .all(|w| compare_member_names(w[0], w[1]) != Ordering::Greater)
                && map.values().all(is_canonical)
        }
        Value::Array(items) => items.iter().all(is_canonical),
        _ => true,
    }
}

/// Pretty-printed JSON text with four-space indentation.
pub fn to_pretty(value: &Value) -> Result<String, serde_json::Error> {
    let mut buf = Vec::new();
    let mut ser = Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"    "));
    value.serialize(&mut ser)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// Compact JSON text.
pub fn to_compact(value: &Value) -> Result<String, serde_json::Error> {
    serde_json::to_string(value)
}
