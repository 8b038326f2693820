//! Capabilities the manager expects from a user entity.
//!
//! A user type implements [`DirectoryUser`] for the core operations and may
//! opt into [`Enableable`] and [`DirectoryAffiliated`] by overriding the
//! matching accessor. The manager checks for a capability before using it,
//! so entity types without an enabled flag or a stored DN work unchanged.
//!
//! Per-field setters are not part of the trait: they are registered by name
//! in a [`FieldSetters`] registry, and every field named in the attribute
//! mapping must be registered when the manager is built.

use std::collections::HashMap;
use std::fmt;

/// Core operations every hydrated user must support.
pub trait DirectoryUser: Send {
    /// Name used to bind when no DN is known.
    fn username(&self) -> &str;

    /// Replace the stored credential. Directory users are reset to an empty one.
    fn set_password(&mut self, password: &str);

    fn add_role(&mut self, role: String);

    /// Replace the list of entries this user manages.
    fn set_manages(&mut self, manages: Vec<String>);

    /// The enabled/disabled lifecycle, if this user type has one.
    fn enableable(&mut self) -> Option<&mut dyn Enableable> {
        None
    }

    /// The directory DN holder, if this user type stores one.
    fn directory_affiliation(&self) -> Option<&dyn DirectoryAffiliated> {
        None
    }

    fn directory_affiliation_mut(&mut self) -> Option<&mut dyn DirectoryAffiliated> {
        None
    }
}

/// Users that can be enabled or disabled.
pub trait Enableable {
    fn set_enabled(&mut self, enabled: bool);
}

/// Users that remember the distinguished name of their directory entry.
pub trait DirectoryAffiliated {
    fn set_dn(&mut self, dn: String);

    fn dn(&self) -> Option<&str>;
}

/// Creates blank users ready for hydration.
pub trait UserFactory<U>: Send + Sync {
    fn create_user(&self) -> U;
}

impl<U, F> UserFactory<U> for F
where
    F: Fn() -> U + Send + Sync,
{
    fn create_user(&self) -> U {
        self()
    }
}

/// Value handed to a field setter.
///
/// A mapped attribute with exactly one value arrives as [`FieldValue::Single`];
/// anything else (several values, or none at all) as [`FieldValue::Multi`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Single(String),
    Multi(Vec<String>),
}

impl FieldValue {
    /// Collapse a list of values: one value becomes a scalar.
    pub fn collapse(mut values: Vec<String>) -> Self {
        if values.len() == 1 {
            if let Some(value) = values.pop() {
                return FieldValue::Single(value);
            }
        }
        FieldValue::Multi(values)
    }

    /// The scalar value, or the first of several.
    pub fn first(&self) -> Option<&str> {
        match self {
            FieldValue::Single(value) => Some(value),
            FieldValue::Multi(values) => values.first().map(String::as_str),
        }
    }

    /// All values, regardless of shape.
    pub fn into_vec(self) -> Vec<String> {
        match self {
            FieldValue::Single(value) => vec![value],
            FieldValue::Multi(values) => values,
        }
    }

    /// Scalar values as-is; several values joined with `separator`.
    pub fn join(self, separator: &str) -> String {
        match self {
            FieldValue::Single(value) => value,
            FieldValue::Multi(values) => values.join(separator),
        }
    }
}

type Setter<U> = Box<dyn Fn(&mut U, FieldValue) + Send + Sync>;

/// Registry of named field setters for a user type.
///
/// ```rust
/// use ldap_user_manager::user::{FieldSetters, FieldValue};
///
/// #[derive(Default)]
/// struct Account { email: String }
///
/// let setters = FieldSetters::<Account>::new()
///     .register("email", |account, value| account.email = value.join(","));
///
/// let mut account = Account::default();
/// assert!(setters.apply("email", &mut account, FieldValue::Single("a@b.c".into())));
/// assert_eq!(account.email, "a@b.c");
/// assert!(!setters.contains("phone"));
/// ```
pub struct FieldSetters<U> {
    setters: HashMap<String, Setter<U>>,
}

impl<U> FieldSetters<U> {
    pub fn new() -> Self {
        Self {
            setters: HashMap::new(),
        }
    }

    /// Register (or replace) the setter for `field`.
    pub fn register<F>(mut self, field: impl Into<String>, setter: F) -> Self
    where
        F: Fn(&mut U, FieldValue) + Send + Sync + 'static,
    {
        self.insert(field, setter);
        self
    }

    pub fn insert<F>(&mut self, field: impl Into<String>, setter: F)
    where
        F: Fn(&mut U, FieldValue) + Send + Sync + 'static,
    {
        self.setters.insert(field.into(), Box::new(setter));
    }

    pub fn contains(&self, field: &str) -> bool {
        self.setters.contains_key(field)
    }

    pub fn len(&self) -> usize {
        self.setters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.setters.is_empty()
    }

    /// Run the setter for `field`. Returns false when none is registered.
    pub fn apply(&self, field: &str, user: &mut U, value: FieldValue) -> bool {
        match self.setters.get(field) {
            Some(setter) => {
                setter(user, value);
                true
            }
            None => false,
        }
    }

    /// Names from `fields` that have no registered setter, in input order.
    pub fn missing<'a>(&self, fields: impl IntoIterator<Item = &'a str>) -> Vec<String> {
        fields
            .into_iter()
            .filter(|field| !self.contains(field))
            .map(str::to_string)
            .collect()
    }
}

impl<U> Default for FieldSetters<U> {
    fn default() -> Self {
        Self::new()
    }
}

impl<U> fmt::Debug for FieldSetters<U> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut fields: Vec<&str> = self.setters.keys().map(String::as_str).collect();
        fields.sort_unstable();
        f.debug_struct("FieldSetters")
            .field("fields", &fields)
            .finish()
    }
}
