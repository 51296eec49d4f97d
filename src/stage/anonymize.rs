//! Redaction of personal data before records are stored.
//!
//! Anonymization is enabled per table. For an enabled table every scalar
//! whose JSON pointer path is classified as personal is replaced in place:
//! booleans become `false`, numbers `0`, strings the empty string. Nulls are
//! left alone.

use std::collections::BTreeSet;

use serde_json::Value;

/// Decides whether a value at a JSON pointer path may hold personal data.
pub trait PersonalDataClassifier: std::fmt::Debug + Send + Sync {
    fn is_personal(&self, path: &str) -> bool;
}

/// Classifies nothing as personal.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPersonalData;

impl PersonalDataClassifier for NoPersonalData {
    fn is_personal(&self, _path: &str) -> bool {
        false
    }
}

/// Paths known to hold personal data in user records.
pub const DEFAULT_PERSONAL_PATHS: &[&str] = &[
    "/barcode",
    "/externalSystemId",
    "/username",
    "/personal/lastName",
    "/personal/firstName",
    "/personal/middleName",
    "/personal/preferredFirstName",
    "/personal/email",
    "/personal/phone",
    "/personal/mobilePhone",
    "/personal/dateOfBirth",
    "/personal/addresses/*/addressLine1",
    "/personal/addresses/*/addressLine2",
    "/personal/addresses/*/city",
    "/personal/addresses/*/postalCode",
];

/// Classifies paths matching a list of patterns.
///
/// A pattern is a JSON pointer in which a `*` segment matches any single
/// segment, such as an array index.
#[derive(Debug, Clone, Default)]
pub struct PathClassifier {
    patterns: Vec<Vec<String>>,
}

impl PathClassifier {
    pub fn new(patterns: impl IntoIterator<Item = impl AsRef<str>>) -> Self {
        Self {
            patterns: patterns
                .into_iter()
                .map(|p| split_pointer(p.as_ref()))
                .collect(),
        }
    }

    /// Classifier over [`DEFAULT_PERSONAL_PATHS`] plus `extra`.
    pub fn with_defaults(extra: impl IntoIterator<Item = impl AsRef<str>>) -> Self {
        let mut classifier = Self::new(DEFAULT_PERSONAL_PATHS);
        classifier
            .patterns
            .extend(extra.into_iter().map(|p| split_pointer(p.as_ref())));
        classifier
    }
}

impl PersonalDataClassifier for PathClassifier {
    fn is_personal(&self, path: &str) -> bool {
        let segments = split_pointer(path);
        self.patterns.iter().any(|pattern| {
            pattern.len() == segments.len()
                && pattern
                    .iter()
                    .zip(&segments)
                    .all(|(p, s)| p == "*" || p == s)
        })
    }
}

fn split_pointer(path: &str) -> Vec<String> {
    path.split('/')
        .skip(1)
        .map(|s| s.replace("~1", "/").replace("~0", "~"))
        .collect()
}

fn escape_segment(segment: &str) -> String {
    segment.replace('~', "~0").replace('/', "~1")
}

/// Per-table anonymization switch plus the classifier it consults.
#[derive(Debug)]
pub struct Anonymizer {
    tables: BTreeSet<String>,
    classifier: Box<dyn PersonalDataClassifier>,
}

impl Default for Anonymizer {
    fn default() -> Self {
        Self::inactive()
    }
}

impl Anonymizer {
    /// Anonymize the listed tables using `classifier`.
    pub fn new(
        tables: impl IntoIterator<Item = impl Into<String>>,
        classifier: impl PersonalDataClassifier + 'static,
    ) -> Self {
        Self {
            tables: tables.into_iter().map(Into::into).collect(),
            classifier: Box::new(classifier),
        }
    }

    /// Anonymize nothing.
    pub fn inactive() -> Self {
        Self::new(Vec::<String>::new(), NoPersonalData)
    }

    pub fn is_active_for(&self, table: &str) -> bool {
        self.tables.contains(table)
    }

    /// Redact personal values of a record of `table`. Returns how many
    /// values were replaced.
    pub fn anonymize(&self, table: &str, record: &mut Value) -> usize {
        if !self.is_active_for(table) {
            return 0;
        }
        let mut path = String::new();
        self.redact(record, &mut path)
    }

    fn redact(&self, value: &mut Value, path: &mut String) -> usize {
        match value {
            Value::Object(map) => {
                let mut n = 0;
                for (name, member) in map.iter_mut() {
                    let len = path.len();
                    path.push('/');
                    path.push_str(&escape_segment(name));
                    n += self.redact(member, path);
                    path.truncate(len);
                }
                n
            }
            Value::Array(items) => {
                let mut n = 0;
                for (i, item) in items.iter_mut().enumerate() {
                    let len = path.len();
                    path.push('/');
                    path.push_str(&i.to_string());
                    n += self.redact(item, path);
                    path.truncate(len);
                }
                n
            }
            Value::Null => 0,
            scalar => {
                if !self.classifier.is_personal(path) {
                    return 0;
                }
                *scalar = match scalar {
                    Value::Bool(_) => Value::Bool(false),
                    Value::Number(_) => Value::from(0),
                    _ => Value::String(String::new()),
                };
                1
            }
        }
    }
}
