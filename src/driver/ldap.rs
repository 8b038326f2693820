//! Directory driver backed by the `ldap3` crate.
//!
//! Every operation opens its own connection, optionally binds with service
//! credentials before searching, and unbinds when done. There is no pooling,
//! paging or retry here; callers that need those wrap the driver.
//!
//! Each connection is driven by a task spawned with `tokio::spawn`, so the
//! driver must be used from within a Tokio runtime.
//!
//! ```rust,no_run
//! use ldap_user_manager::driver::ldap::Ldap3Driver;
//! use std::time::Duration;
//!
//! let driver = Ldap3Driver::new("ldaps://ldap.example.com")
//!     .with_search_credentials("cn=reader,dc=example,dc=com", "secret")
//!     .with_connect_timeout(Duration::from_secs(5));
//! ```

use crate::driver::DirectoryDriver;
use crate::entry::{AttributeValue, DirectoryEntry, SearchResult};
use ::ldap3::{Ldap, LdapConnAsync, LdapConnSettings, LdapError, Scope, SearchEntry};
use log::{debug, trace};
use std::fmt;
use std::time::Duration;

/// LDAP `invalidCredentials` result code.
const INVALID_CREDENTIALS: u32 = 49;

/// Driver talking to a directory server through `ldap3`.
#[derive(Clone)]
pub struct Ldap3Driver {
    url: String,
    search_credentials: Option<(String, String)>,
    connect_timeout: Option<Duration>,
    starttls: bool,
}

impl Ldap3Driver {
    /// Create a driver for `url` (`ldap://`, `ldaps://` or `ldapi://`).
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            search_credentials: None,
            connect_timeout: None,
            starttls: false,
        }
    }

    /// Bind with these credentials before every search.
    pub fn with_search_credentials(
        mut self,
        bind_dn: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.search_credentials = Some((bind_dn.into(), password.into()));
        self
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Upgrade plain `ldap://` connections with StartTLS.
    pub fn with_starttls(mut self, starttls: bool) -> Self {
        self.starttls = starttls;
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    async fn connect(&self) -> Result<Ldap, LdapError> {
        let mut settings = LdapConnSettings::new().set_starttls(self.starttls);
        if let Some(timeout) = self.connect_timeout {
            settings = settings.set_conn_timeout(timeout);
        }

        let (conn, ldap) = LdapConnAsync::with_settings(settings, &self.url).await?;
        ::ldap3::drive!(conn);
        Ok(ldap)
    }

    async fn search_with(
        &self,
        ldap: &mut Ldap,
        base_dn: &str,
        filter: &str,
        attributes: &[String],
    ) -> Result<Vec<::ldap3::ResultEntry>, LdapError> {
        if let Some((bind_dn, password)) = &self.search_credentials {
            ldap.simple_bind(bind_dn, password).await?.success()?;
        }

        trace!("Searching {} with {}", base_dn, filter);
        let (entries, _res) = ldap
            .search(base_dn, Scope::Subtree, filter, attributes.to_vec())
            .await?
            .success()?;
        Ok(entries)
    }

    /// Unbind, ignoring failures.
    async fn close(mut ldap: Ldap) {
        if let Err(e) = ldap.unbind().await {
            debug!("Ignoring unbind failure: {}", e);
        }
    }
}

impl fmt::Debug for Ldap3Driver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ldap3Driver")
            .field("url", &self.url)
            .field(
                "search_bind_dn",
                &self.search_credentials.as_ref().map(|(dn, _)| dn),
            )
            .field("connect_timeout", &self.connect_timeout)
            .field("starttls", &self.starttls)
            .finish()
    }
}

impl DirectoryDriver for Ldap3Driver {
    type Error = LdapError;

    async fn search(
        &self,
        base_dn: &str,
        filter: &str,
        attributes: &[String],
    ) -> Result<SearchResult, Self::Error> {
        let mut ldap = self.connect().await?;
        let outcome = self.search_with(&mut ldap, base_dn, filter, attributes).await;
        Self::close(ldap).await;

        Ok(outcome?
            .into_iter()
            .map(SearchEntry::construct)
            .map(into_directory_entry)
            .collect())
    }

    async fn bind(&self, bind_name: &str, password: &str) -> Result<bool, Self::Error> {
        // An empty password would turn into an unauthenticated bind, which
        // most servers accept.
        if password.is_empty() {
            debug!("Rejecting empty password for {}", bind_name);
            return Ok(false);
        }

        let mut ldap = self.connect().await?;
        let outcome = ldap.simple_bind(bind_name, password).await;
        Self::close(ldap).await;

        // Only invalidCredentials means a wrong password; any other non-zero
        // code is a server failure.
        let res = outcome?;
        if res.rc == INVALID_CREDENTIALS {
            debug!("Invalid credentials for {}", bind_name);
            return Ok(false);
        }
        res.success().map(|_| true)
    }
}

/// Text attributes always come back multi-valued, like the directory wire
/// format. Binary attributes are not mapped.
fn into_directory_entry(entry: SearchEntry) -> DirectoryEntry {
    let SearchEntry { dn, attrs, .. } = entry;
    attrs
        .into_iter()
        .fold(DirectoryEntry::new(dn), |acc, (name, values)| {
            acc.with_attribute(name, AttributeValue::Multi(values))
        })
}
