//! Tri-state result envelope for asynchronous operations.
//!
//! Every collaborator stream yields `Resource<T>` values: `Pending` while
//! the work is in flight, then exactly one terminal `Success` or `Failure`
//! per logical request. Multi-step sources (auth resolution) may restart
//! the cycle per step.
//!
//! This is a closed sum type on purpose. Consumers match exhaustively and
//! the compiler keeps them honest when a variant is added.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ProviderError;

/// Message used when a failing source supplied no message of its own.
pub const DEFAULT_FAILURE_MESSAGE: &str = "Unexpected Error";

/// Outcome of one step of an asynchronous operation.
///
/// Immutable once constructed. `Success` always carries a value and
/// `Failure` always carries a human-readable message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Resource<T> {
    /// The operation is in flight. Informational, not an error.
    Pending,
    /// The operation produced a value.
    Success { value: T },
    /// The operation failed; the message is fit for display.
    Failure { message: String },
}

impl<T> Resource<T> {
    /// Success envelope around `value`.
    pub fn success(value: T) -> Self {
        Resource::Success { value }
    }

    /// Failure envelope with an explicit message.
    pub fn failure(message: impl Into<String>) -> Self {
        Resource::Failure {
            message: message.into(),
        }
    }

    /// Failure envelope from a source that may not have supplied a message.
    ///
    /// Falls back to [`DEFAULT_FAILURE_MESSAGE`].
    pub fn failure_opt(message: Option<String>) -> Self {
        Resource::Failure {
            message: message.unwrap_or_else(|| DEFAULT_FAILURE_MESSAGE.to_string()),
        }
    }

    /// Failure envelope capturing any displayable error.
    ///
    /// Collaborator errors are never thrown across the engine boundary;
    /// they are folded into the envelope here.
    pub fn from_err(err: impl fmt::Display) -> Self {
        Resource::Failure {
            message: err.to_string(),
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, Resource::Pending)
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Resource::Success { .. })
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Resource::Failure { .. })
    }

    /// The success value, if this is a `Success`.
    pub fn success_value(&self) -> Option<&T> {
        match self {
            Resource::Success { value } => Some(value),
            _ => None,
        }
    }

    /// The failure message, if this is a `Failure`.
    pub fn failure_message(&self) -> Option<&str> {
        match self {
            Resource::Failure { message } => Some(message),
            _ => None,
        }
    }

    /// Map the success value, leaving the other variants untouched.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Resource<U> {
        match self {
            Resource::Pending => Resource::Pending,
            Resource::Success { value } => Resource::Success { value: f(value) },
            Resource::Failure { message } => Resource::Failure { message },
        }
    }

    /// Consume the envelope, returning the success value.
    pub fn into_success(self) -> Option<T> {
        match self {
            Resource::Success { value } => Some(value),
            _ => None,
        }
    }
}

impl<T> From<ProviderError> for Resource<T> {
    fn from(err: ProviderError) -> Self {
        Resource::from_err(err)
    }
}

impl<T, E: fmt::Display> From<Result<T, E>> for Resource<T> {
    fn from(res: Result<T, E>) -> Self {
        match res {
            Ok(value) => Resource::success(value),
            Err(err) => Resource::from_err(err),
        }
    }
}
