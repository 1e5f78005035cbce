// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::error::FreshetError;

/// One event travelling from a publisher to a subscriber.
///
/// `Error` and `Complete` are terminal: nothing follows them on the same
/// subscription.
#[derive(Debug, Clone)]
pub enum Signal<T> {
    /// A value
    Next(T),
    /// A failure that terminates the run
    Error(FreshetError),
    /// Normal end of the run
    Complete,
}

impl<T: PartialEq> PartialEq for Signal<T> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Signal::Next(a), Signal::Next(b)) => a == b,
            (Signal::Complete, Signal::Complete) => true,
            _ => false, // Errors are never equal
        }
    }
}

impl<T> Signal<T> {
    /// Returns `true` if this is a `Next`.
    pub const fn is_next(&self) -> bool {
        matches!(self, Signal::Next(_))
    }

    /// Returns `true` if this is an `Error`.
    pub const fn is_error(&self) -> bool {
        matches!(self, Signal::Error(_))
    }

    /// Returns `true` for `Error` and `Complete`.
    pub const fn is_terminal(&self) -> bool {
        !self.is_next()
    }

    /// Converts into the carried value, discarding terminal signals.
    pub fn into_value(self) -> Option<T> {
        match self {
            Signal::Next(v) => Some(v),
            _ => None,
        }
    }

    /// Converts into the carried error, if any.
    pub fn into_error(self) -> Option<FreshetError> {
        match self {
            Signal::Error(e) => Some(e),
            _ => None,
        }
    }

    /// Maps the carried value. Terminal signals pass through unchanged.
    pub fn map<U, F>(self, f: F) -> Signal<U>
    where
        F: FnOnce(T) -> U,
    {
        match self {
            Signal::Next(v) => Signal::Next(f(v)),
            Signal::Error(e) => Signal::Error(e),
            Signal::Complete => Signal::Complete,
        }
    }
}

impl<T> From<Result<T, FreshetError>> for Signal<T> {
    fn from(result: Result<T, FreshetError>) -> Self {
        match result {
            Ok(v) => Signal::Next(v),
            Err(e) => Signal::Error(e),
        }
    }
}
