use crate::interface::{ConfigStoreError, DiscoveryError, ExecuteError, ValueFetchError};
use gridmeld_core::error::{FieldSetError, ResolveError};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error as ThisError;

///
/// Error
/// Public error type with a stable kind + origin taxonomy.
///
/// Every failure is terminal for the attempt that produced it; nothing
/// in this crate retries on its own.
///

#[derive(Clone, Debug, Deserialize, Serialize, ThisError)]
#[error("{message}")]
pub struct Error {
    pub kind: ErrorKind,
    pub origin: ErrorOrigin,
    pub message: String,
}

impl Error {
    pub fn new(kind: ErrorKind, origin: ErrorOrigin, message: impl Into<String>) -> Self {
        Self {
            kind,
            origin,
            message: message.into(),
        }
    }

    /// Construct a session-origin validation error.
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, ErrorOrigin::Session, message)
    }

    #[must_use]
    pub fn display_with_kind(&self) -> String {
        format!("{}:{}: {}", self.origin, self.kind, self.message)
    }
}

///
/// ErrorKind
/// Public error taxonomy for callers.
///

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[remain::sorted]
pub enum ErrorKind {
    /// Malformed persisted configuration; nothing was applied.
    ConfigParse,
    /// Schema or object lookup failed; the field list was cleared.
    Discovery,
    /// Query execution failed; previous results must be discarded.
    Execution,
    Internal,
    /// Context value fetch failed; tokens are intact, values are not.
    Resolution,
    /// Missing or unusable input; the operation did not start.
    Validation,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::ConfigParse => "config_parse",
            Self::Discovery => "discovery",
            Self::Execution => "execution",
            Self::Internal => "internal",
            Self::Resolution => "resolution",
            Self::Validation => "validation",
        };
        write!(f, "{label}")
    }
}

///
/// ErrorOrigin
/// Component that raised the failure.
///

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[remain::sorted]
pub enum ErrorOrigin {
    Compile,
    Config,
    Discovery,
    Execute,
    Render,
    Resolve,
    Session,
}

impl fmt::Display for ErrorOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Compile => "compile",
            Self::Config => "config",
            Self::Discovery => "discovery",
            Self::Execute => "execute",
            Self::Render => "render",
            Self::Resolve => "resolve",
            Self::Session => "session",
        };
        write!(f, "{label}")
    }
}

impl From<DiscoveryError> for Error {
    fn from(err: DiscoveryError) -> Self {
        Self::new(ErrorKind::Discovery, ErrorOrigin::Discovery, err.to_string())
    }
}

impl From<FieldSetError> for Error {
    fn from(err: FieldSetError) -> Self {
        // An empty field list is a discovery outcome, not engine misuse.
        Self::new(ErrorKind::Discovery, ErrorOrigin::Discovery, err.to_string())
    }
}

impl From<ResolveError> for Error {
    fn from(err: ResolveError) -> Self {
        Self::new(ErrorKind::Resolution, ErrorOrigin::Resolve, err.to_string())
    }
}

impl From<ValueFetchError> for Error {
    fn from(err: ValueFetchError) -> Self {
        Self::new(ErrorKind::Resolution, ErrorOrigin::Resolve, err.to_string())
    }
}

impl From<ExecuteError> for Error {
    fn from(err: ExecuteError) -> Self {
        Self::new(ErrorKind::Execution, ErrorOrigin::Execute, err.to_string())
    }
}

impl From<ConfigStoreError> for Error {
    fn from(err: ConfigStoreError) -> Self {
        let kind = match &err {
            ConfigStoreError::Malformed(_) => ErrorKind::ConfigParse,
            ConfigStoreError::NotFound(_) | ConfigStoreError::Backend(_) => ErrorKind::Internal,
        };
        Self::new(kind, ErrorOrigin::Config, err.to_string())
    }
}

impl From<crate::config::ConfigError> for Error {
    fn from(err: crate::config::ConfigError) -> Self {
        Self::new(ErrorKind::ConfigParse, ErrorOrigin::Config, err.to_string())
    }
}

///
/// TESTS
///
