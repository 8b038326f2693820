//! Role and manages lookups keyed on a user's DN.
//!
//! Both relationships are resolved the same way: search a configured subtree
//! for entries whose `user_dn_attribute` equals the user's DN and read the
//! first value of `name_attribute` from every hit. Role names are slugified
//! and prefixed with [`ROLE_PREFIX`]; manages names are used as-is.
//!
//! The DN is escaped like any other filter value before it is interpolated,
//! so DNs containing parentheses or backslashes cannot break the filter.

use crate::config::RelationConfig;
use crate::driver::DirectoryDriver;
use crate::error::{LdapError, LdapResult};
use crate::escape::escape_value;
use crate::filter::equality_clause;
use crate::user::DirectoryUser;
use log::{debug, warn};

/// Prefix applied to every slugified role name.
pub const ROLE_PREFIX: &str = "ROLE_";

/// Normalize a name into an uppercase, underscore-delimited token.
///
/// Runs of anything other than ASCII letters and digits collapse into a
/// single underscore, and leading or trailing separators are dropped.
///
/// ```rust
/// use ldap_user_manager::relations::slugify;
///
/// assert_eq!(slugify("Domain Admins"), "DOMAIN_ADMINS");
/// assert_eq!(slugify("__foo__bar--baz__"), "FOO_BAR_BAZ");
/// ```
pub fn slugify(name: &str) -> String {
    name.split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("_")
        .to_ascii_uppercase()
}

/// Role token for a directory group name, e.g. `Domain Admins` → `ROLE_DOMAIN_ADMINS`.
pub fn role_token(name: &str) -> String {
    format!("{}{}", ROLE_PREFIX, slugify(name))
}

/// `(&<filter>(<user_dn_attribute>=<escaped dn>))`
pub fn relation_filter(config: &RelationConfig, dn: &str) -> String {
    format!(
        "(&{}{})",
        config.filter(),
        equality_clause(&config.user_dn_attribute, &escape_value(dn))
    )
}

/// Issues the follow-up searches for one lookup.
#[derive(Debug)]
pub struct RelationshipResolver<'d, D> {
    driver: &'d D,
}

impl<'d, D: DirectoryDriver> RelationshipResolver<'d, D> {
    pub fn new(driver: &'d D) -> Self {
        Self { driver }
    }

    /// Raw names of the entries related to `dn`, in search-result order.
    ///
    /// Entries without `name_attribute` are skipped.
    pub async fn related_names(&self, dn: &str, config: &RelationConfig) -> LdapResult<Vec<String>> {
        let filter = relation_filter(config, dn);
        let attributes = [config.name_attribute.clone()];

        let result = self
            .driver
            .search(&config.base_dn, &filter, &attributes)
            .await
            .map_err(LdapError::driver)?;
        debug!(
            "Relation search {} under {} returned {} entries",
            filter,
            config.base_dn,
            result.count()
        );

        let mut names = Vec::with_capacity(result.count());
        for entry in &result {
            match entry.first_value(&config.name_attribute) {
                Some(name) => names.push(name.to_string()),
                None => warn!(
                    "Entry {} has no '{}' attribute, skipping",
                    entry.dn(),
                    config.name_attribute
                ),
            }
        }
        Ok(names)
    }

    /// `ROLE_*` tokens for the groups `dn` belongs to.
    pub async fn role_tokens(&self, dn: &str, config: &RelationConfig) -> LdapResult<Vec<String>> {
        let names = self.related_names(dn, config).await?;
        Ok(names.iter().map(String::as_str).map(role_token).collect())
    }

    /// Add a role to `user` for every group entry referencing `dn`.
    ///
    /// Roles are added in search-result order without deduplication.
    pub async fn resolve_roles<U: DirectoryUser>(
        &self,
        user: &mut U,
        dn: &str,
        config: &RelationConfig,
    ) -> LdapResult<()> {
        for role in self.role_tokens(dn, config).await? {
            user.add_role(role);
        }
        Ok(())
    }

    /// Replace the user's manages list with the names of entries referencing `dn`.
    pub async fn resolve_manages<U: DirectoryUser>(
        &self,
        user: &mut U,
        dn: &str,
        config: &RelationConfig,
    ) -> LdapResult<()> {
        let manages = self.related_names(dn, config).await?;
        user.set_manages(manages);
        Ok(())
    }
}
