//! Error handling types

use thiserror::Error;

/// Result type alias for operations that can fail
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the resolution engine
#[derive(Error, Debug)]
pub enum Error {
    /// No declaration matched the qualifier at a single-result entry point
    #[error("no declaration matches qualifier `{qualifier}`")]
    NotFound {
        /// Label of the qualifier that matched nothing
        qualifier: String,
    },

    /// More than one declaration matched where exactly one was required
    #[error("{count} declarations match qualifier `{qualifier}`, expected exactly one")]
    Ambiguous {
        /// Label of the qualifier that matched more than once
        qualifier: String,
        /// Number of declarations that matched
        count: usize,
    },

    /// A deferred value was produced where a synchronous result was demanded
    #[error("qualifier `{qualifier}` resolved to a deferred value, synchronous resolution is impossible")]
    SyncResolution {
        /// Label of the qualifier whose resolution was deferred
        qualifier: String,
    },

    /// Invalid argument provided to a constructor
    #[error("invalid argument: {message}")]
    InvalidArgument {
        /// Description of the invalid argument
        message: String,
    },

    /// A typed accessor received an instance of a different type
    #[error("declaration matching `{qualifier}` did not produce a `{expected}`")]
    TypeMismatch {
        /// Label of the qualifier that was resolved
        qualifier: String,
        /// Name of the type the caller asked for
        expected: &'static str,
    },
}

impl Error {
    /// Create a not found error
    pub fn not_found<S: Into<String>>(qualifier: S) -> Self {
        Self::NotFound {
            qualifier: qualifier.into(),
        }
    }

    /// Create an ambiguous match error
    pub fn ambiguous<S: Into<String>>(qualifier: S, count: usize) -> Self {
        Self::Ambiguous {
            qualifier: qualifier.into(),
            count,
        }
    }

    /// Create a synchronous resolution error
    pub fn sync_resolution<S: Into<String>>(qualifier: S) -> Self {
        Self::SyncResolution {
            qualifier: qualifier.into(),
        }
    }

    /// Create an invalid argument error
    pub fn invalid_argument<S: Into<String>>(message: S) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Create a type mismatch error
    pub fn type_mismatch<S: Into<String>>(qualifier: S, expected: &'static str) -> Self {
        Self::TypeMismatch {
            qualifier: qualifier.into(),
            expected,
        }
    }
}
