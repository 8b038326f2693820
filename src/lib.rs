//! LDAP user lookup library for Rust.
//!
//! Maps application user lookups onto an LDAP directory: builds safe search
//! filters from criteria, retrieves the matching entry along with its role
//! and manages relationships, and hydrates a typed user from the raw
//! attributes.
//!
//! # Core Components
//!
//! - [`LdapManager`] - Finds, hydrates and authenticates users
//! - [`DirectoryDriver`] - Trait for the directory transport (search and bind)
//! - [`FilterBuilder`] - Compound filter construction with RFC 2254 escaping
//! - [`AttributeMapper`] - Attribute to entity field hydration
//! - [`RelationshipResolver`] - Role and manages lookups by DN
//!
//! The transport is pluggable. With the `ldap3` feature enabled,
//! `driver::ldap::Ldap3Driver` implements [`DirectoryDriver`] on top of the
//! `ldap3` crate.
//!
//! # Quick Start
//!
//! ```rust
//! use ldap_user_manager::escape::escape_value;
//! use ldap_user_manager::filter::{Criteria, FilterBuilder};
//!
//! let filter = FilterBuilder::new("(objectClass=person)")
//!     .build(&Criteria::single("uid", "jdoe"));
//! assert_eq!(filter, "(&(objectClass=person)(uid=jdoe))");
//! assert_eq!(escape_value("a*b"), r"a\2ab");
//! ```

pub mod config;
pub mod driver;
pub mod entry;
pub mod error;
pub mod escape;
pub mod filter;
pub mod manager;
pub mod mapper;
pub mod relations;
pub mod user;

// Re-export commonly used types for convenience
pub use config::{AttributeMapping, LdapConfig, RelationConfig};
pub use driver::DirectoryDriver;
pub use entry::{AttributeValue, DirectoryEntry, SearchResult};
pub use error::{LdapError, LdapResult};
pub use filter::{Criteria, FilterBuilder, JoinOperator};
pub use manager::{LdapManager, LdapManagerBuilder};
pub use mapper::AttributeMapper;
pub use relations::{RelationshipResolver, slugify};
pub use user::{DirectoryAffiliated, DirectoryUser, Enableable, FieldSetters, FieldValue, UserFactory};
