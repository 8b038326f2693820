//! User lookups against a directory.
//!
//! [`LdapManager`] ties the pieces together: it builds a filter from the
//! criteria, runs the primary search through the driver, insists on at most
//! one match, and hydrates a fresh user from the winning entry before
//! resolving its roles and manages list.
//!
//! # Example
//!
//! ```rust,no_run
//! use ldap_user_manager::{LdapConfig, LdapManager, RelationConfig};
//! use ldap_user_manager::user::{DirectoryUser, FieldValue};
//! # use ldap_user_manager::driver::DirectoryDriver;
//! # use ldap_user_manager::entry::SearchResult;
//! # struct Driver;
//! # impl DirectoryDriver for Driver {
//! #     type Error = std::io::Error;
//! #     async fn search(&self, _: &str, _: &str, _: &[String]) -> Result<SearchResult, Self::Error> { Ok(SearchResult::empty()) }
//! #     async fn bind(&self, _: &str, _: &str) -> Result<bool, Self::Error> { Ok(false) }
//! # }
//!
//! #[derive(Default)]
//! struct User { username: String, roles: Vec<String>, manages: Vec<String> }
//!
//! impl DirectoryUser for User {
//!     fn username(&self) -> &str { &self.username }
//!     fn set_password(&mut self, _password: &str) {}
//!     fn add_role(&mut self, role: String) { self.roles.push(role) }
//!     fn set_manages(&mut self, manages: Vec<String>) { self.manages = manages }
//! }
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = LdapConfig::new("ou=people,dc=example,dc=com", "(objectClass=person)")
//!     .with_mapping("uid", "username")
//!     .with_role(RelationConfig::new("ou=groups,dc=example,dc=com", "member", "cn"));
//!
//! let manager = LdapManager::builder(Driver, config)
//!     .factory(User::default)
//!     .field("username", |user: &mut User, value: FieldValue| user.username = value.join(" "))
//!     .build()?;
//!
//! if let Some(user) = manager.find_user_by_username("jdoe").await? {
//!     println!("{} has roles {:?}", user.username, user.roles);
//! }
//! # Ok(())
//! # }
//! ```

use crate::config::LdapConfig;
use crate::driver::DirectoryDriver;
use crate::entry::DirectoryEntry;
use crate::error::{LdapError, LdapResult};
use crate::filter::{Criteria, FilterBuilder};
use crate::mapper::AttributeMapper;
use crate::relations::RelationshipResolver;
use crate::user::{DirectoryUser, FieldSetters, FieldValue, UserFactory};
use log::{debug, info, warn};
use std::fmt;

/// Finds, hydrates and authenticates directory users.
pub struct LdapManager<D, U> {
    driver: D,
    config: LdapConfig,
    filters: FilterBuilder,
    mapper: AttributeMapper<U>,
    factory: Box<dyn UserFactory<U>>,
    requested_attributes: Vec<String>,
    username_attribute: String,
}

impl<D: DirectoryDriver, U: DirectoryUser> LdapManager<D, U> {
    /// Start configuring a manager.
    pub fn builder(driver: D, config: LdapConfig) -> LdapManagerBuilder<D, U> {
        LdapManagerBuilder::new(driver, config)
    }

    pub fn config(&self) -> &LdapConfig {
        &self.config
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    /// Directory attribute used by [`find_user_by_username`](Self::find_user_by_username).
    pub fn username_attribute(&self) -> &str {
        &self.username_attribute
    }

    /// Find a user by the configured username attribute.
    pub async fn find_user_by_username(&self, username: &str) -> LdapResult<Option<U>> {
        self.find_user_by(&Criteria::single(self.username_attribute.as_str(), username))
            .await
    }

    /// Find the single user matching `criteria`.
    ///
    /// Returns `Ok(None)` when nothing matches and
    /// [`LdapError::AmbiguousResult`] when more than one entry does.
    pub async fn find_user_by(&self, criteria: &Criteria) -> LdapResult<Option<U>> {
        let Some(entry) = self.find_entry(criteria).await? else {
            return Ok(None);
        };

        let mut user = self.factory.create_user();
        self.hydrate(&mut user, &entry).await?;
        info!("Loaded directory user {}", entry.dn());

        Ok(Some(user))
    }

    /// `ROLE_*` tokens of the user named `username`, without hydrating a user.
    ///
    /// Returns `Ok(None)` when the user does not exist and an empty list when
    /// no role lookup is configured.
    pub async fn roles_for_username(&self, username: &str) -> LdapResult<Option<Vec<String>>> {
        let criteria = Criteria::single(self.username_attribute.as_str(), username);
        let Some(entry) = self.find_entry(&criteria).await? else {
            return Ok(None);
        };

        let roles = match &self.config.role {
            Some(role) => {
                RelationshipResolver::new(&self.driver)
                    .role_tokens(entry.dn(), role)
                    .await?
            }
            None => Vec::new(),
        };
        Ok(Some(roles))
    }

    /// Check `password` for `user` against the directory.
    ///
    /// The user's DN is used as bind name when it is known, its username
    /// otherwise. Verification is left entirely to the driver.
    pub async fn bind(&self, user: &U, password: &str) -> LdapResult<bool> {
        let bind_name = user
            .directory_affiliation()
            .and_then(|affiliation| affiliation.dn())
            .filter(|dn| !dn.is_empty())
            .unwrap_or_else(|| user.username());

        let accepted = self
            .driver
            .bind(bind_name, password)
            .await
            .map_err(LdapError::driver)?;
        if !accepted {
            debug!("Directory rejected credentials for {}", bind_name);
        }
        Ok(accepted)
    }

    async fn find_entry(&self, criteria: &Criteria) -> LdapResult<Option<DirectoryEntry>> {
        let filter = self.filters.build(criteria);
        debug!("Searching {} with {}", self.config.base_dn, filter);

        let result = self
            .driver
            .search(&self.config.base_dn, &filter, &self.requested_attributes)
            .await
            .map_err(LdapError::driver)?;

        match result.count() {
            0 => {
                debug!("No entry matched {}", filter);
                Ok(None)
            }
            1 => Ok(result.into_entries().pop()),
            count => {
                warn!("Search {} matched {} entries, expected at most one", filter, count);
                Err(LdapError::ambiguous(filter, count))
            }
        }
    }

    /// Attributes first, then roles and manages, then the DN.
    async fn hydrate(&self, user: &mut U, entry: &DirectoryEntry) -> LdapResult<()> {
        self.mapper.hydrate(user, entry);

        let resolver = RelationshipResolver::new(&self.driver);
        if let Some(role) = &self.config.role {
            resolver.resolve_roles(user, entry.dn(), role).await?;
        }
        if let Some(manages) = &self.config.manages {
            resolver.resolve_manages(user, entry.dn(), manages).await?;
        }

        if let Some(affiliation) = user.directory_affiliation_mut() {
            affiliation.set_dn(entry.dn().to_string());
        }
        Ok(())
    }
}

impl<D: fmt::Debug, U> fmt::Debug for LdapManager<D, U> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LdapManager")
            .field("driver", &self.driver)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Builder for [`LdapManager`].
///
/// All validation happens in [`build`](Self::build): the configuration must be
/// complete, a user factory must be set, and every entity field named in the
/// attribute mapping must have a registered setter.
pub struct LdapManagerBuilder<D, U> {
    driver: D,
    config: LdapConfig,
    factory: Option<Box<dyn UserFactory<U>>>,
    setters: FieldSetters<U>,
}

impl<D: DirectoryDriver, U: DirectoryUser> LdapManagerBuilder<D, U> {
    pub fn new(driver: D, config: LdapConfig) -> Self {
        Self {
            driver,
            config,
            factory: None,
            setters: FieldSetters::new(),
        }
    }

    /// Set the factory producing blank users.
    pub fn factory(mut self, factory: impl UserFactory<U> + 'static) -> Self {
        self.factory = Some(Box::new(factory));
        self
    }

    /// Register the setter for one entity field.
    pub fn field<F>(mut self, name: impl Into<String>, setter: F) -> Self
    where
        F: Fn(&mut U, FieldValue) + Send + Sync + 'static,
    {
        self.setters.insert(name, setter);
        self
    }

    /// Replace the setter registry wholesale.
    pub fn setters(mut self, setters: FieldSetters<U>) -> Self {
        self.setters = setters;
        self
    }

    pub fn build(self) -> LdapResult<LdapManager<D, U>> {
        self.config.validate()?;
        let factory = self
            .factory
            .ok_or_else(|| LdapError::configuration("a user factory is required"))?;

        let username_attribute = self
            .config
            .username_attribute()
            .map(str::to_string)
            .ok_or_else(|| LdapError::configuration("no username attribute configured"))?;
        let requested_attributes = self.config.requested_attributes();
        let filters = FilterBuilder::new(self.config.filter.clone());
        let mapper = AttributeMapper::new(self.config.attributes.clone(), self.setters)?;

        Ok(LdapManager {
            driver: self.driver,
            config: self.config,
            filters,
            mapper,
            factory,
            requested_attributes,
            username_attribute,
        })
    }
}

impl<D, U> fmt::Debug for LdapManagerBuilder<D, U> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LdapManagerBuilder")
            .field("config", &self.config)
            .field("has_factory", &self.factory.is_some())
            .field("setters", &self.setters)
            .finish_non_exhaustive()
    }
}
