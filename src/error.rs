//! Error types for the shardlru library.
//!
//! The cache API itself is total (lookups signal absence with `None` and
//! inserts always succeed), so errors appear only at the edges:
//!
//! - [`ConfigError`]: invalid construction parameters caught by fallible
//!   builder methods.
//! - [`InvariantError`]: internal bookkeeping violations reported by the
//!   debug-only `check_invariants` methods.
//!
//! Precondition violations at runtime (releasing a foreign handle, dropping
//! a cache with outstanding handles) are programmer errors and abort via
//! `assert!` rather than surfacing as values.

use std::fmt;

// ---------------------------------------------------------------------------
// ConfigError
// ---------------------------------------------------------------------------

/// Error returned when cache configuration parameters are invalid.
///
/// Produced by fallible constructors such as
/// [`CacheBuilder::try_build_point`](crate::builder::CacheBuilder::try_build_point).
///
/// # Example
///
/// ```
/// use shardlru::builder::CacheBuilder;
///
/// let err = CacheBuilder::new(4096)
///     .point_kv_fraction(1.5)
///     .try_build_point::<Vec<u8>, u64>()
///     .unwrap_err();
/// assert!(err.to_string().contains("fraction"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
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

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for ConfigError {}

// ---------------------------------------------------------------------------
// InvariantError
// ---------------------------------------------------------------------------

/// Error returned when internal cache invariants are violated.
///
/// Produced by debug-only `check_invariants` methods; carries a description
/// of which invariant failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvariantError(String);

impl InvariantError {
    /// Creates a new `InvariantError` with the given description.
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

impl fmt::Display for InvariantError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for InvariantError {}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
