//! Error types for settings operations.

use std::io;

use thiserror::Error;

use crate::value::ValueKind;

/// Primary error type for settings operations.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// A present value did not parse under the requested kind.
    ///
    /// This is never silently replaced by a default: the explicit-default
    /// read path suppresses only the absent-key case.
    #[error("cannot coerce '{value}' for key '{key}' to {requested}")]
    Coercion {
        /// Key whose value failed to coerce.
        key: String,
        /// Kind requested by the caller.
        requested: ValueKind,
        /// Offending canonical value.
        value: String,
    },
    /// A persisted type tag was not one of the supported kinds.
    #[error("unknown value type tag '{tag}'")]
    UnknownTypeTag {
        /// Tag found in the backing store.
        tag: String,
    },
    /// Underlying data layer operation failed.
    #[error("data access failed")]
    DataAccess {
        /// Operation identifier.
        operation: &'static str,
        /// Source data-layer error.
        source: plinth_data::DataError,
    },
    /// Filesystem operation failed.
    #[error("filesystem operation failed")]
    Io {
        /// Operation identifier.
        operation: &'static str,
        /// Source IO error.
        source: io::Error,
    },
    /// Fallback file contents could not be read or written as JSON.
    #[error("fallback file format error")]
    FallbackFormat {
        /// Source serialisation error.
        source: serde_json::Error,
    },
}

/// Convenience alias for settings results.
pub type SettingsResult<T> = Result<T, SettingsError>;
