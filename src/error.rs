//! Error types for the swapcache library.
//!
//! ## Key Components
//!
//! - [`ConfigError`]: Returned when factory parameters are invalid
//!   (e.g. a zero LRU threshold or a zero TTL).
//! - [`LookupError`]: Returned by
//!   [`lookup_or_miss`](crate::shared::SharedCache::lookup_or_miss) when the entry kept
//!   disappearing between the write and the read-back.
//!
//! Absence of a value is never an error: lookups return `Option`.
//!
//! ## Example Usage
//!
//! ```
//! use swapcache::error::ConfigError;
//! use swapcache::factory::lru_cache_factory;
//!
//! let cell = lru_cache_factory(Vec::<(u32, u32)>::new(), 16);
//! assert!(cell.is_ok());
//!
//! // Zero threshold is caught without panicking
//! let bad: Result<_, ConfigError> = lru_cache_factory(Vec::<(u32, u32)>::new(), 0);
//! assert!(bad.is_err());
//! ```

use thiserror::Error;

// ---------------------------------------------------------------------------
// ConfigError
// ---------------------------------------------------------------------------

/// Error returned when cache configuration parameters are invalid.
///
/// Produced by [`LruConfig::try_new`](crate::policy::lru::LruConfig::try_new),
/// [`TtlConfig::try_from_millis`](crate::policy::ttl::TtlConfig::try_from_millis)
/// and the factories that use them. Carries a human-readable description of
/// which parameter failed validation.
///
/// # Example
///
/// ```
/// use swapcache::factory::ttl_cache_factory;
///
/// let err = ttl_cache_factory(Vec::<(u64, u64)>::new(), 0).unwrap_err();
/// assert!(err.to_string().contains("ttl"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct ConfigError(String);

impl ConfigError {
    /// Creates a new `ConfigError` with the given description.
    #[inline]
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }

    /// Returns the error description.
    #[inline]
    pub fn message(&self) -> &str {
        &self.0
    }
}

// ---------------------------------------------------------------------------
// LookupError
// ---------------------------------------------------------------------------

/// Error returned by the stampede-safe lookup.
///
/// A key that is legitimately absent is never reported here: `lookup_or_miss`
/// always fills absent keys. The only failure is a policy that drops the
/// entry every time before it can be read back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LookupError {
    /// Every attempt observed the entry missing right after writing it.
    #[error("entry expired after each of {attempts} write attempts")]
    Exhausted {
        /// Number of cell transforms performed before giving up.
        attempts: usize,
    },
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    // -- ConfigError ------------------------------------------------------

    #[test]
    fn config_display_shows_message() {
        let err = ConfigError::new("threshold must be > 0");
        assert_eq!(err.to_string(), "threshold must be > 0");
    }

    #[test]
    fn config_message_accessor() {
        let err = ConfigError::new("test");
        assert_eq!(err.message(), "test");
    }

    #[test]
    fn config_clone_and_eq() {
        let a = ConfigError::new("x");
        let b = a.clone();
        assert_eq!(a, b);
    }

    #[test]
    fn config_implements_std_error() {
        fn assert_error<T: std::error::Error>() {}
        assert_error::<ConfigError>();
    }

    // -- LookupError ------------------------------------------------------

    #[test]
    fn exhausted_display_includes_attempts() {
        let err = LookupError::Exhausted { attempts: 10 };
        assert_eq!(
            err.to_string(),
            "entry expired after each of 10 write attempts"
        );
    }

    #[test]
    fn lookup_error_implements_std_error() {
        fn assert_error<T: std::error::Error + Send + Sync + 'static>() {}
        assert_error::<LookupError>();
    }
}
