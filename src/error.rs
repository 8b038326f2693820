//! Error types for directory lookups.
//!
//! Escaping and filter construction are infallible, and an empty search is a
//! normal outcome reported as `Ok(None)`. What remains is a small taxonomy:
//! ambiguous searches, configuration mistakes caught while building the
//! manager, and failures bubbling up from the directory driver.

/// Main error type for directory lookups.
#[derive(Debug, thiserror::Error)]
pub enum LdapError {
    /// A search expected to identify at most one entry matched several.
    #[error("Ambiguous search: filter {filter} matched {count} entries, expected at most one")]
    AmbiguousResult { filter: String, count: usize },

    /// Invalid configuration, detected when the manager is built
    #[error("Invalid configuration: {message}")]
    Configuration { message: String },

    /// Errors from the directory driver (transport, bind, search)
    #[error("Directory driver error: {0}")]
    Driver(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl LdapError {
    /// Create an ambiguous result error
    pub fn ambiguous(filter: impl Into<String>, count: usize) -> Self {
        Self::AmbiguousResult {
            filter: filter.into(),
            count,
        }
    }

    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Wrap a driver error
    pub fn driver<E>(error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Driver(Box::new(error))
    }

    /// Whether this error was raised by the directory driver.
    pub fn is_driver_error(&self) -> bool {
        matches!(self, Self::Driver(_))
    }
}

impl From<serde_json::Error> for LdapError {
    fn from(error: serde_json::Error) -> Self {
        Self::configuration(format!("malformed configuration: {}", error))
    }
}

pub type LdapResult<T> = Result<T, LdapError>;
