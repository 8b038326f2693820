//! Hydration of user entities from directory entries.
//!
//! The [`AttributeMapper`] walks the configured attribute mapping in order
//! and hands each present attribute to the setter registered for its entity
//! field. A multi-valued attribute holding exactly one value collapses to a
//! scalar; every other shape is passed as a list. Attributes missing from the
//! entry are skipped: directory entries routinely omit optional attributes.

use crate::config::AttributeMapping;
use crate::entry::{AttributeValue, DirectoryEntry};
use crate::error::{LdapError, LdapResult};
use crate::user::{DirectoryUser, FieldSetters, FieldValue};
use log::trace;

/// Applies an attribute mapping to users of type `U`.
#[derive(Debug)]
pub struct AttributeMapper<U> {
    mappings: Vec<AttributeMapping>,
    setters: FieldSetters<U>,
}

impl<U: DirectoryUser> AttributeMapper<U> {
    /// Create a mapper, failing if any mapped field has no registered setter.
    pub fn new(mappings: Vec<AttributeMapping>, setters: FieldSetters<U>) -> LdapResult<Self> {
        let missing = setters.missing(mappings.iter().map(|m| m.entity_field.as_str()));
        if !missing.is_empty() {
            return Err(LdapError::configuration(format!(
                "no setter registered for entity field(s): {}",
                missing.join(", ")
            )));
        }

        Ok(Self { mappings, setters })
    }

    pub fn mappings(&self) -> &[AttributeMapping] {
        &self.mappings
    }

    /// Reset the user for directory authentication and copy mapped attributes.
    ///
    /// The local password is cleared and, when the user type supports it, the
    /// account is enabled before any attribute is applied.
    pub fn hydrate(&self, user: &mut U, entry: &DirectoryEntry) {
        user.set_password("");
        if let Some(enableable) = user.enableable() {
            enableable.set_enabled(true);
        }

        for mapping in &self.mappings {
            let Some(value) = entry.get(&mapping.directory_attribute) else {
                trace!(
                    "Entry {} has no '{}', leaving '{}' untouched",
                    entry.dn(),
                    mapping.directory_attribute,
                    mapping.entity_field
                );
                continue;
            };

            // Presence of every setter was checked in `new`.
            self.setters
                .apply(&mapping.entity_field, user, field_value(value));
        }
    }
}

fn field_value(value: &AttributeValue) -> FieldValue {
    match value {
        AttributeValue::Single(value) => FieldValue::Single(value.clone()),
        AttributeValue::Multi(values) => FieldValue::collapse(values.clone()),
    }
}
