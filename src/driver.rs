//! The directory driver port.
//!
//! The manager never talks to the network itself. A [`DirectoryDriver`]
//! owns connection handling, binding and the actual search; the manager only
//! builds filters, checks cardinality and hydrates users from what the driver
//! returns.
//!
//! Drivers must report zero matches as an empty [`SearchResult`] and invalid
//! credentials as `Ok(false)`. Anything returned as `Err` is a transport or
//! protocol failure and is propagated to the caller unchanged.
//!
//! With the `ldap3` feature enabled, [`ldap::Ldap3Driver`] provides a driver
//! backed by the `ldap3` crate.

use crate::entry::SearchResult;
use std::future::Future;

#[cfg(feature = "ldap3")]
pub mod ldap;

/// Executes searches and binds against a directory.
pub trait DirectoryDriver: Send + Sync {
    /// The error type returned by driver operations.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Search `base_dn` (whole subtree) with `filter`, returning only the
    /// requested `attributes` of each entry plus its DN.
    fn search(
        &self,
        base_dn: &str,
        filter: &str,
        attributes: &[String],
    ) -> impl Future<Output = Result<SearchResult, Self::Error>> + Send;

    /// Verify `password` for the entry identified by `bind_name`.
    ///
    /// Returns `Ok(false)` for rejected credentials.
    fn bind(
        &self,
        bind_name: &str,
        password: &str,
    ) -> impl Future<Output = Result<bool, Self::Error>> + Send;
}
