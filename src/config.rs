//! Configuration consumed when building an [`LdapManager`](crate::LdapManager).
//!
//! The shape mirrors the usual directory bundle configuration: a base DN and
//! base filter for user searches, an ordered attribute mapping, and optional
//! role and manages lookups. It deserializes from JSON (or any serde format)
//! and also accepts the `ldap_attr` / `user_method` key names.
//!
//! ```rust
//! use ldap_user_manager::LdapConfig;
//!
//! let config = LdapConfig::from_json(r#"{
//!     "base_dn": "ou=people,dc=example,dc=com",
//!     "filter": "(objectClass=inetOrgPerson)",
//!     "attributes": [
//!         {"ldap_attr": "uid", "user_method": "username"},
//!         {"ldap_attr": "mail", "user_method": "email"}
//!     ],
//!     "role": {
//!         "base_dn": "ou=groups,dc=example,dc=com",
//!         "filter": "(objectClass=groupOfNames)",
//!         "user_dn_attribute": "member",
//!         "name_attribute": "cn"
//!     }
//! }"#).unwrap();
//!
//! assert_eq!(config.username_attribute(), Some("uid"));
//! assert!(config.role.is_some());
//! assert!(config.manages.is_none());
//! ```

use crate::error::{LdapError, LdapResult};
use serde::{Deserialize, Serialize};

/// Maps one directory attribute onto one entity field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeMapping {
    #[serde(alias = "ldap_attr")]
    pub directory_attribute: String,
    #[serde(alias = "user_method")]
    pub entity_field: String,
}

impl AttributeMapping {
    pub fn new(directory_attribute: impl Into<String>, entity_field: impl Into<String>) -> Self {
        Self {
            directory_attribute: directory_attribute.into(),
            entity_field: entity_field.into(),
        }
    }
}

/// Describes a follow-up lookup keyed on a user's DN.
///
/// Used both for role membership (group entries listing the user as a
/// member) and for manages lists (entries naming the user as their manager).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationConfig {
    #[serde(alias = "baseDn")]
    pub base_dn: String,
    /// Extra filter ANDed in front of the DN match; empty means none
    #[serde(default)]
    pub filter: Option<String>,
    #[serde(alias = "userDnAttribute")]
    pub user_dn_attribute: String,
    #[serde(alias = "nameAttribute")]
    pub name_attribute: String,
}

impl RelationConfig {
    pub fn new(
        base_dn: impl Into<String>,
        user_dn_attribute: impl Into<String>,
        name_attribute: impl Into<String>,
    ) -> Self {
        Self {
            base_dn: base_dn.into(),
            filter: None,
            user_dn_attribute: user_dn_attribute.into(),
            name_attribute: name_attribute.into(),
        }
    }

    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    /// The configured filter, or an empty string.
    pub fn filter(&self) -> &str {
        self.filter.as_deref().unwrap_or("")
    }

    fn validate(&self, section: &str) -> LdapResult<()> {
        if self.base_dn.is_empty() {
            return Err(LdapError::configuration(format!(
                "{}.base_dn cannot be empty",
                section
            )));
        }
        if self.user_dn_attribute.is_empty() {
            return Err(LdapError::configuration(format!(
                "{}.user_dn_attribute cannot be empty",
                section
            )));
        }
        if self.name_attribute.is_empty() {
            return Err(LdapError::configuration(format!(
                "{}.name_attribute cannot be empty",
                section
            )));
        }
        Ok(())
    }
}

/// Top-level configuration for user lookups.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LdapConfig {
    #[serde(alias = "baseDn")]
    pub base_dn: String,
    /// Base filter prepended to every criteria search
    #[serde(default)]
    pub filter: String,
    /// Ordered mapping; the first entry names the username attribute
    pub attributes: Vec<AttributeMapping>,
    #[serde(default)]
    pub role: Option<RelationConfig>,
    #[serde(default)]
    pub manages: Option<RelationConfig>,
}

impl LdapConfig {
    pub fn new(base_dn: impl Into<String>, filter: impl Into<String>) -> Self {
        Self {
            base_dn: base_dn.into(),
            filter: filter.into(),
            attributes: Vec::new(),
            role: None,
            manages: None,
        }
    }

    /// Parse a configuration from JSON.
    pub fn from_json(json: &str) -> LdapResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn with_mapping(
        mut self,
        directory_attribute: impl Into<String>,
        entity_field: impl Into<String>,
    ) -> Self {
        self.attributes
            .push(AttributeMapping::new(directory_attribute, entity_field));
        self
    }

    pub fn with_role(mut self, role: RelationConfig) -> Self {
        self.role = Some(role);
        self
    }

    pub fn with_manages(mut self, manages: RelationConfig) -> Self {
        self.manages = Some(manages);
        self
    }

    /// Directory attribute holding the username: the first mapped attribute.
    pub fn username_attribute(&self) -> Option<&str> {
        self.attributes
            .first()
            .map(|mapping| mapping.directory_attribute.as_str())
    }

    /// Attributes requested from the directory for user searches.
    pub fn requested_attributes(&self) -> Vec<String> {
        self.attributes
            .iter()
            .map(|mapping| mapping.directory_attribute.clone())
            .collect()
    }

    /// Validate the configuration.
    ///
    /// Setter names are checked separately, against the registry the manager
    /// is built with.
    pub fn validate(&self) -> LdapResult<()> {
        if self.base_dn.is_empty() {
            return Err(LdapError::configuration("base_dn cannot be empty"));
        }
        if self.attributes.is_empty() {
            return Err(LdapError::configuration(
                "at least one attribute mapping is required; the first one names the username attribute",
            ));
        }
        if let Some(mapping) = self
            .attributes
            .iter()
            .find(|m| m.directory_attribute.is_empty() || m.entity_field.is_empty())
        {
            return Err(LdapError::configuration(format!(
                "attribute mapping {:?} has an empty side",
                mapping
            )));
        }
        if let Some(role) = &self.role {
            role.validate("role")?;
        }
        if let Some(manages) = &self.manages {
            manages.validate("manages")?;
        }
        Ok(())
    }
}
