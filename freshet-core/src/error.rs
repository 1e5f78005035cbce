// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Error types for the Freshet reactive engine
//!
//! Every failure that travels through a pipeline is a [`FreshetError`]. Errors are
//! terminal: once a stage forwards one, the run it belongs to is over.
//!
//! # Examples
//!
//! ```
//! use freshet_core::{FreshetError, Result};
//!
//! fn produce() -> Result<u32> {
//!     Err(FreshetError::source_failure("sensor offline"))
//! }
//!
//! assert!(produce().is_err());
//! ```

use std::fmt;

/// Root error type for all Freshet operations
#[derive(Debug, thiserror::Error)]
pub enum FreshetError {
    /// Value production raised an error
    #[error("Source failure: {context}")]
    SourceFailure {
        /// Description of what the source failed to produce
        context: String,
    },

    /// A stage's user function failed while processing a value
    #[error("Transform failure: {0}")]
    TransformFailure(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// The demand or signal-ordering contract was violated
    ///
    /// This is a programming error (e.g. `request(0)`), never a condition to recover from.
    #[error("Protocol fault: {context}")]
    ProtocolFault {
        /// Which rule was broken
        context: String,
    },

    /// One child of a coordinator (merge, zip, flat_map) failed
    #[error("Source {index} failed: {source}")]
    CoordinatorFailure {
        /// Position of the failing child
        index: usize,
        /// The child's own error
        #[source]
        source: Box<FreshetError>,
    },

    /// A time-driven producer had a value ready but no outstanding demand
    #[error("Overflow: {context}")]
    Overflow {
        /// What could not be emitted
        context: String,
    },

    /// Multiple errors occurred
    ///
    /// Collected by subscribers that run handlers without an error callback.
    #[error("Multiple errors occurred: {count} errors")]
    MultipleErrors {
        /// Number of errors that occurred
        count: usize,
        /// The individual errors
        errors: Vec<FreshetError>,
    },
}

impl FreshetError {
    /// Create a source failure with the given context
    pub fn source_failure(context: impl Into<String>) -> Self {
        Self::SourceFailure {
            context: context.into(),
        }
    }

    /// Wrap an error raised by a user-supplied stage function
    pub fn transform_failure(error: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::TransformFailure(Box::new(error))
    }

    /// Create a protocol fault with the given context
    pub fn protocol_fault(context: impl Into<String>) -> Self {
        Self::ProtocolFault {
            context: context.into(),
        }
    }

    /// Record that child `index` of a coordinator failed with `source`
    #[must_use]
    pub fn coordinator_failure(index: usize, source: FreshetError) -> Self {
        Self::CoordinatorFailure {
            index,
            source: Box::new(source),
        }
    }

    /// Create an overflow error with the given context
    pub fn overflow(context: impl Into<String>) -> Self {
        Self::Overflow {
            context: context.into(),
        }
    }

    /// Aggregate multiple user errors into a `MultipleErrors` variant
    pub fn from_user_errors<E>(errors: Vec<E>) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        let count = errors.len();
        let errors = errors
            .into_iter()
            .map(|e| Self::TransformFailure(Box::new(e)))
            .collect();

        Self::MultipleErrors { count, errors }
    }

    /// Follows nested coordinator failures down to the error that started them.
    #[must_use]
    pub fn root_cause(&self) -> &FreshetError {
        match self {
            Self::CoordinatorFailure { source, .. } => source.root_cause(),
            other => other,
        }
    }

    /// Check if this error reports a broken demand/signal contract
    #[must_use]
    pub const fn is_protocol_fault(&self) -> bool {
        matches!(self, Self::ProtocolFault { .. })
    }
}

/// Specialized Result type for Freshet operations
pub type Result<T> = std::result::Result<T, FreshetError>;

/// Extension trait for converting errors into `FreshetError`
///
/// Implemented for every `std::error::Error + Send + Sync + 'static`, so the
/// fallible closures handed to `try_map` can return their own error types.
pub trait IntoFreshetError {
    /// Convert this error into a `FreshetError::TransformFailure`
    fn into_freshet(self) -> FreshetError;
}

impl<E: std::error::Error + Send + Sync + 'static> IntoFreshetError for E {
    fn into_freshet(self) -> FreshetError {
        FreshetError::transform_failure(self)
    }
}

/// Stand-in for a boxed user error once it has been cloned.
#[derive(Debug)]
struct ClonedError(String);

impl fmt::Display for ClonedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for ClonedError {}

impl Clone for FreshetError {
    fn clone(&self) -> Self {
        match self {
            Self::SourceFailure { context } => Self::SourceFailure {
                context: context.clone(),
            },
            // The boxed error can't be cloned, keep its message
            Self::TransformFailure(e) => {
                Self::TransformFailure(Box::new(ClonedError(e.to_string())))
            }
            Self::ProtocolFault { context } => Self::ProtocolFault {
                context: context.clone(),
            },
            Self::CoordinatorFailure { index, source } => Self::CoordinatorFailure {
                index: *index,
                source: source.clone(),
            },
            Self::Overflow { context } => Self::Overflow {
                context: context.clone(),
            },
            Self::MultipleErrors { count, errors } => Self::MultipleErrors {
                count: *count,
                errors: errors.clone(),
            },
        }
    }
}
