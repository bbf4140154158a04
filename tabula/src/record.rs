//! Record identity.

use std::cmp::Ordering;
use std::fmt;
use std::hash::Hash;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Trait for records that can be shown in a table.
///
/// Records are owned by whatever loaded them; the table only reads them and
/// asks for their deletion by id. The id must be unique and stable across
/// reloads, since selection and reconciliation are keyed on it.
///
/// # Example
///
/// ```
/// use tabula::record::Record;
///
/// #[derive(Clone)]
/// struct Customer {
///     id: u32,
///     name: String,
/// }
///
/// impl Record for Customer {
///     type Id = u32;
///
///     fn id(&self) -> u32 {
///         self.id
///     }
/// }
/// ```
pub trait Record: Clone + Send + Sync + 'static {
    /// The id type used to identify this record.
    type Id: Clone
        + Eq
        + Ord
        + Hash
        + fmt::Display
        + fmt::Debug
        + Serialize
        + DeserializeOwned
        + Send
        + Sync
        + 'static;

    /// Return the unique id for this record.
    fn id(&self) -> Self::Id;
}

/// A string-or-integer record id.
///
/// Serializes untagged, so `7` and `"job-7"` both round-trip as written.
/// Integers order before text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordKey {
    Int(i64),
    Text(String),
}

impl RecordKey {
    /// Parse a key from user input, preferring the integer form.
    pub fn parse(input: &str) -> Self {
        match input.trim().parse::<i64>() {
            Ok(n) => RecordKey::Int(n),
            Err(_) => RecordKey::Text(input.to_string()),
        }
    }
}

impl Ord for RecordKey {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (RecordKey::Int(a), RecordKey::Int(b)) => a.cmp(b),
            (RecordKey::Text(a), RecordKey::Text(b)) => a.cmp(b),
            (RecordKey::Int(_), RecordKey::Text(_)) => Ordering::Less,
            (RecordKey::Text(_), RecordKey::Int(_)) => Ordering::Greater,
        }
    }
}

impl PartialOrd for RecordKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for RecordKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordKey::Int(n) => write!(f, "{}", n),
            RecordKey::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for RecordKey {
    fn from(n: i64) -> Self {
        RecordKey::Int(n)
    }
}

impl From<String> for RecordKey {
    fn from(s: String) -> Self {
        RecordKey::Text(s)
    }
}

impl From<&str> for RecordKey {
    fn from(s: &str) -> Self {
        RecordKey::Text(s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_prefers_integers() {
        assert_eq!(RecordKey::parse("42"), RecordKey::Int(42));
        assert_eq!(RecordKey::parse("job-42"), RecordKey::Text("job-42".into()));
    }

    #[test]
    fn test_integers_order_before_text() {
        let mut keys = vec![
            RecordKey::from("b"),
            RecordKey::from(10),
            RecordKey::from("a"),
            RecordKey::from(2),
        ];
        keys.sort();
        assert_eq!(
            keys,
            vec![
                RecordKey::Int(2),
                RecordKey::Int(10),
                RecordKey::Text("a".into()),
                RecordKey::Text("b".into()),
            ]
        );
    }

    #[test]
    fn test_untagged_serde() {
        let keys: Vec<RecordKey> = serde_json::from_str(r#"[7, "job-7"]"#).unwrap();
        assert_eq!(keys, vec![RecordKey::Int(7), RecordKey::Text("job-7".into())]);
        assert_eq!(serde_json::to_string(&keys).unwrap(), r#"[7,"job-7"]"#);
    }
}
