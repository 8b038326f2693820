//! Raw directory entries and search results.
//!
//! These types are produced by a [`DirectoryDriver`](crate::driver::DirectoryDriver)
//! and consumed read-only by the mapper and the relationship resolver. They
//! live for a single lookup and are discarded once the user is hydrated.
//!
//! The serialized form follows the directory wire shape: an entry is an
//! object with a reserved `dn` key, and each attribute is either a plain
//! string, a list of strings, or a counted `{"count": n, "values": [...]}`
//! object.
//!
//! ```rust
//! use ldap_user_manager::entry::{AttributeValue, DirectoryEntry};
//! use serde_json::json;
//!
//! let entry: DirectoryEntry = serde_json::from_value(json!({
//!     "dn": "uid=jdoe,ou=people,dc=example,dc=com",
//!     "uid": "jdoe",
//!     "cn": {"count": 2, "values": ["John Doe", "Johnny"]}
//! })).unwrap();
//!
//! assert_eq!(entry.dn(), "uid=jdoe,ou=people,dc=example,dc=com");
//! assert_eq!(entry.get("cn").map(AttributeValue::len), Some(2));
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Value of a single attribute in a directory entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "WireValue", into = "WireValue")]
pub enum AttributeValue {
    /// Plain scalar value
    Single(String),
    /// Multi-valued result; the count is the length of the vector
    Multi(Vec<String>),
}

impl AttributeValue {
    /// Number of values carried by this attribute.
    pub fn len(&self) -> usize {
        match self {
            AttributeValue::Single(_) => 1,
            AttributeValue::Multi(values) => values.len(),
        }
    }

    /// True for a multi-valued result with no values.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// First value, if any.
    pub fn first(&self) -> Option<&str> {
        match self {
            AttributeValue::Single(value) => Some(value),
            AttributeValue::Multi(values) => values.first().map(String::as_str),
        }
    }

    /// All values as a slice-like iterator, in directory order.
    pub fn values(&self) -> impl Iterator<Item = &str> {
        let values: &[String] = match self {
            AttributeValue::Single(value) => std::slice::from_ref(value),
            AttributeValue::Multi(values) => values,
        };
        values.iter().map(String::as_str)
    }
}

impl From<String> for AttributeValue {
    fn from(value: String) -> Self {
        AttributeValue::Single(value)
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        AttributeValue::Single(value.to_string())
    }
}

impl From<Vec<String>> for AttributeValue {
    fn from(values: Vec<String>) -> Self {
        AttributeValue::Multi(values)
    }
}

impl From<Vec<&str>> for AttributeValue {
    fn from(values: Vec<&str>) -> Self {
        AttributeValue::Multi(values.into_iter().map(str::to_string).collect())
    }
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum WireValue {
    Counted { count: usize, values: Vec<String> },
    List(Vec<String>),
    Scalar(String),
}

impl TryFrom<WireValue> for AttributeValue {
    type Error = String;

    fn try_from(wire: WireValue) -> Result<Self, Self::Error> {
        match wire {
            WireValue::Counted { count, values } if count != values.len() => Err(format!(
                "attribute count {} does not match {} values",
                count,
                values.len()
            )),
            WireValue::Counted { values, .. } | WireValue::List(values) => {
                Ok(AttributeValue::Multi(values))
            }
            WireValue::Scalar(value) => Ok(AttributeValue::Single(value)),
        }
    }
}

impl From<AttributeValue> for WireValue {
    fn from(value: AttributeValue) -> Self {
        match value {
            AttributeValue::Single(value) => WireValue::Scalar(value),
            AttributeValue::Multi(values) => WireValue::Counted {
                count: values.len(),
                values,
            },
        }
    }
}

/// A single directory entry: its distinguished name plus its attributes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryEntry {
    dn: String,
    #[serde(flatten)]
    attributes: BTreeMap<String, AttributeValue>,
}

impl DirectoryEntry {
    /// Create an entry with no attributes.
    pub fn new(dn: impl Into<String>) -> Self {
        Self {
            dn: dn.into(),
            attributes: BTreeMap::new(),
        }
    }

    /// Builder-style attribute insertion, used by drivers and fixtures.
    pub fn with_attribute(
        mut self,
        name: impl Into<String>,
        value: impl Into<AttributeValue>,
    ) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// The entry's distinguished name.
    pub fn dn(&self) -> &str {
        &self.dn
    }

    pub fn get(&self, attribute: &str) -> Option<&AttributeValue> {
        self.attributes.get(attribute)
    }

    pub fn contains(&self, attribute: &str) -> bool {
        self.attributes.contains_key(attribute)
    }

    /// First value of an attribute, if present.
    pub fn first_value(&self, attribute: &str) -> Option<&str> {
        self.get(attribute).and_then(AttributeValue::first)
    }

    pub fn attribute_names(&self) -> impl Iterator<Item = &str> {
        self.attributes.keys().map(String::as_str)
    }
}

/// Ordered entries returned by a directory search.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "WireResult", into = "WireResult")]
pub struct SearchResult {
    entries: Vec<DirectoryEntry>,
}

impl SearchResult {
    pub fn new(entries: Vec<DirectoryEntry>) -> Self {
        Self { entries }
    }

    /// An empty result; zero matches is not an error.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Number of entries, always equal to the number of items iterated.
    pub fn count(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[DirectoryEntry] {
        &self.entries
    }

    pub fn iter(&self) -> std::slice::Iter<'_, DirectoryEntry> {
        self.entries.iter()
    }

    pub fn into_entries(self) -> Vec<DirectoryEntry> {
        self.entries
    }
}

impl FromIterator<DirectoryEntry> for SearchResult {
    fn from_iter<I: IntoIterator<Item = DirectoryEntry>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl IntoIterator for SearchResult {
    type Item = DirectoryEntry;
    type IntoIter = std::vec::IntoIter<DirectoryEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<'a> IntoIterator for &'a SearchResult {
    type Item = &'a DirectoryEntry;
    type IntoIter = std::slice::Iter<'a, DirectoryEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[derive(Serialize, Deserialize)]
struct WireResult {
    count: usize,
    entries: Vec<DirectoryEntry>,
}

impl TryFrom<WireResult> for SearchResult {
    type Error = String;

    fn try_from(wire: WireResult) -> Result<Self, Self::Error> {
        if wire.count != wire.entries.len() {
            return Err(format!(
                "result count {} does not match {} entries",
                wire.count,
                wire.entries.len()
            ));
        }
        Ok(Self::new(wire.entries))
    }
}

impl From<SearchResult> for WireResult {
    fn from(result: SearchResult) -> Self {
        Self {
            count: result.entries.len(),
            entries: result.entries,
        }
    }
}
