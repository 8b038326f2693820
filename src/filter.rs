//! Compound LDAP filter construction.
//!
//! A [`FilterBuilder`] combines a configured base filter with caller criteria.
//! Every criterion value is escaped with [`escape_value`](crate::escape::escape_value);
//! attribute names are written verbatim and must come from trusted
//! configuration, never from user input.
//!
//! ```rust
//! use ldap_user_manager::filter::{Criteria, FilterBuilder};
//!
//! let builder = FilterBuilder::new("(objectClass=*)");
//! let filter = builder.build(&Criteria::new().with("uid", "john*doe"));
//! assert_eq!(filter, r"(&(objectClass=*)(uid=john\2adoe))");
//! ```

use crate::escape::escape_value;
use std::collections::BTreeMap;
use std::fmt;

/// Boolean operator wrapping the base filter and the criteria clauses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum JoinOperator {
    #[default]
    And,
    Or,
}

impl JoinOperator {
    pub fn as_str(&self) -> &'static str {
        match self {
            JoinOperator::And => "&",
            JoinOperator::Or => "|",
        }
    }
}

impl fmt::Display for JoinOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Attribute → value criteria for a search.
///
/// Attributes iterate in sorted order so the generated filter is
/// deterministic; values of one attribute keep their insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Criteria {
    values: BTreeMap<String, Vec<String>>,
}

impl Criteria {
    pub fn new() -> Self {
        Self::default()
    }

    /// Single-criterion shortcut.
    pub fn single(attribute: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new().with(attribute, value)
    }

    /// Add a value for `attribute`; repeated calls accumulate values.
    pub fn with(mut self, attribute: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(attribute, value);
        self
    }

    pub fn insert(&mut self, attribute: impl Into<String>, value: impl Into<String>) {
        self.values
            .entry(attribute.into())
            .or_default()
            .push(value.into());
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Number of distinct attributes.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn get(&self, attribute: &str) -> Option<&[String]> {
        self.values.get(attribute).map(Vec::as_slice)
    }

    /// Every `(attribute, value)` pair in emission order.
    pub fn pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().flat_map(|(attribute, values)| {
            values
                .iter()
                .map(move |value| (attribute.as_str(), value.as_str()))
        })
    }
}

impl<K, V> FromIterator<(K, V)> for Criteria
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut criteria = Self::new();
        for (attribute, value) in iter {
            criteria.insert(attribute, value);
        }
        criteria
    }
}

/// Builds filters on top of a fixed base filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterBuilder {
    base_filter: String,
}

impl FilterBuilder {
    pub fn new(base_filter: impl Into<String>) -> Self {
        Self {
            base_filter: base_filter.into(),
        }
    }

    pub fn base_filter(&self) -> &str {
        &self.base_filter
    }

    /// AND the base filter with every criterion.
    pub fn build(&self, criteria: &Criteria) -> String {
        self.build_with(criteria, JoinOperator::And)
    }

    /// Join the base filter and every criterion clause with `operator`.
    pub fn build_with(&self, criteria: &Criteria, operator: JoinOperator) -> String {
        let mut filter = format!("({}{}", operator, self.base_filter);
        for (attribute, value) in criteria.pairs() {
            filter.push_str(&equality_clause(attribute, &escape_value(value)));
        }
        filter.push(')');
        filter
    }
}

/// `(attribute=value)` with `value` written as given.
pub(crate) fn equality_clause(attribute: &str, value: &str) -> String {
    format!("({}={})", attribute, value)
}
