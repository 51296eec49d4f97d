//! Type statistics collected over the top-level fields of records.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

static UUID_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}$").unwrap()
});

static DATE_TIME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{4}-[0-9]{2}-[0-9]{2}T[0-9]{2}:[0-9]{2}:[0-9]{2}").unwrap());

/// Whether `s` has the canonical 8-4-4-4-12 hexadecimal UUID shape.
pub fn looks_like_uuid(s: &str) -> bool {
    UUID_RE.is_match(s)
}

/// Whether `s` starts with an ISO-8601 `YYYY-MM-DDTHH:MM:SS` prefix.
pub fn looks_like_date_time(s: &str) -> bool {
    DATE_TIME_RE.is_match(s)
}

/// Per-field value type counts.
///
/// `integer + floating == number`, and since a field occurs at most once per
/// record, `null + boolean + number + string` never exceeds the number of
/// records observed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Counts {
    pub null: u64,
    pub boolean: u64,
    pub number: u64,
    pub integer: u64,
    pub floating: u64,
    pub string: u64,
    pub uuid: u64,
    pub date_time: u64,
}

impl Counts {
    /// Classify one value.
    pub fn observe(&mut self, value: &Value) {
        match value {
            Value::Null => self.null += 1,
            Value::Bool(_) => self.boolean += 1,
            Value::Number(n) => {
                self.number += 1;
                if n.is_i64() || n.is_u64() {
                    self.integer += 1;
                } else {
                    self.floating += 1;
                }
            }
            Value::String(s) => {
                self.string += 1;
                if looks_like_uuid(s) {
                    self.uuid += 1;
                }
                if looks_like_date_time(s) {
                    self.date_time += 1;
                }
            }
            // Nested structure is stored in the document column only.
            Value::Array(_) | Value::Object(_) => {}
        }
    }

    /// Occurrences classified into a top-level bucket.
    pub fn classified(&self) -> u64 {
        self.null + self.boolean + self.number + self.string
    }
}

/// Counts for every top-level field seen in a table, ordered by field name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldStats {
    fields: BTreeMap<String, Counts>,
    records: u64,
}

impl FieldStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count the top-level fields of one record.
    pub fn observe_record(&mut self, record: &Value) {
        self.records += 1;
        if let Value::Object(map) = record {
            for (field, value) in map {
                // Fields holding only nested values get no column.
                if value.is_array() || value.is_object() {
                    continue;
                }
                self.fields.entry(field.clone()).or_default().observe(value);
            }
        }
    }

    /// Number of records observed.
    pub fn records(&self) -> u64 {
        self.records
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&Counts> {
        self.fields.get(field)
    }

    /// Fields in ascending name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Counts)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Log every field's counts at debug level.
    pub fn log(&self, table: &str) {
        for (field, c) in self.iter() {
            tracing::debug!(
                table,
                field,
                string = c.string,
                datetime = c.date_time,
                uuid = c.uuid,
                bool = c.boolean,
                number = c.number,
                int = c.integer,
                float = c.floating,
                null = c.null,
                "field stats"
            );
        }
    }
}

impl FromIterator<(String, Counts)> for FieldStats {
    fn from_iter<I: IntoIterator<Item = (String, Counts)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().collect(),
            records: 0,
        }
    }
}
