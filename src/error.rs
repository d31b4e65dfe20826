#![allow(non_shorthand_field_patterns)]
#![doc = "Error handling primitives shared across the collection pipeline."]
// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

//! The derive emitted by [`masterror::Error`] expands pattern matches that
//! trigger the `non_shorthand_field_patterns` lint. The lint is disabled for
//! the module to keep the generated implementations warning-free.
//!
//! Client-facing variants follow the GitHub failure taxonomy: authentication
//! problems and rate-limit exhaustion are distinguished from generic API
//! failures so callers can tell fatal credential issues apart from transient
//! service trouble.

use std::path::{Path, PathBuf};

/// Unified error type returned by the clients, collectors, cache and CLI.
#[derive(Debug, masterror::Error)]
pub enum Error {
    /// Credential rejected (HTTP 401) or access forbidden (HTTP 403 without a
    /// rate-limit cause).
    #[error("authentication failed: {message}")]
    Authentication {
        /// Human readable reason reported to the user.
        message: String
    },
    /// API quota exhausted.
    #[error("rate limit exceeded: {message}")]
    RateLimit {
        /// Human readable description including the reset horizon.
        message:     String,
        /// `true` when the session already waited for the quota reset and the
        /// request may be issued again.
        recoverable: bool
    },
    /// Non-success HTTP status or a GraphQL `errors` payload.
    #[error("API request failed: {message}")]
    Api {
        /// HTTP status code, absent for GraphQL-level failures.
        status:  Option<u16>,
        /// Human readable description of the failure.
        message: String
    },
    /// Network level failure (connect, timeout, truncated body).
    #[error("transport error: {message}")]
    Transport {
        /// Description reported by the HTTP stack.
        message: String
    },
    /// Response body did not match the expected shape.
    #[error("failed to decode {context}: {source}")]
    Decode {
        /// Name of the payload being decoded.
        context: String,
        /// Underlying decoding error.
        source:  serde_json::Error
    },
    /// A record or configuration value violates its invariants.
    #[error("invalid data: {message}")]
    Validation {
        /// Human readable message describing the validation problem.
        message: String
    },
    /// Reading a configuration file or a stored summary failed.
    #[error("failed to read {path:?}: {source}")]
    Io {
        /// File that could not be read.
        path:   PathBuf,
        /// Underlying I/O error.
        source: std::io::Error
    },
    /// Configuration YAML could not be decoded.
    #[error("failed to parse configuration: {source}")]
    Parse {
        /// YAML decoding error.
        source: serde_yaml::Error
    },
    /// Wraps I/O errors raised while writing cache entries or summaries.
    #[error("failed to write {path:?}: {source}")]
    CacheIo {
        /// Location of the file being written.
        path:   PathBuf,
        /// Underlying I/O error reported by the operating system.
        source: std::io::Error
    },
    /// Wraps serialization errors when encoding JSON output.
    #[error("failed to serialize data: {source}")]
    Serialize {
        /// Underlying serialization error.
        source: serde_json::Error
    },
    /// A background collection task could not complete.
    #[error("internal error: {message}")]
    Internal {
        /// Human readable description of the failure.
        message: String
    }
}

impl Error {
    /// Constructs a validation error from the provided displayable value.
    ///
    /// # Parameters
    ///
    /// * `message` - Human-readable description of the validation failure.
    pub fn validation<M>(message: M) -> Self
    where
        M: Into<String>
    {
        Self::Validation {
            message: message.into()
        }
    }

    /// Constructs an API error with an optional HTTP status.
    pub fn api<M>(status: Option<u16>, message: M) -> Self
    where
        M: Into<String>
    {
        Self::Api {
            status,
            message: message.into()
        }
    }

    /// Constructs an authentication error.
    pub fn authentication<M>(message: M) -> Self
    where
        M: Into<String>
    {
        Self::Authentication {
            message: message.into()
        }
    }

    /// Constructs a rate-limit error.
    ///
    /// # Parameters
    ///
    /// * `message` - Human-readable description of the exhausted quota.
    /// * `recoverable` - Whether the quota has already been waited out.
    pub fn rate_limit<M>(message: M, recoverable: bool) -> Self
    where
        M: Into<String>
    {
        Self::RateLimit {
            message: message.into(),
            recoverable
        }
    }

    /// Constructs a transport error.
    pub fn transport<M>(message: M) -> Self
    where
        M: Into<String>
    {
        Self::Transport {
            message: message.into()
        }
    }

    /// Constructs an internal error.
    pub fn internal<M>(message: M) -> Self
    where
        M: Into<String>
    {
        Self::Internal {
            message: message.into()
        }
    }

    /// Wraps a JSON decoding failure with the name of the payload.
    pub fn decode<C>(context: C, source: serde_json::Error) -> Self
    where
        C: Into<String>
    {
        Self::Decode {
            context: context.into(),
            source
        }
    }

    /// HTTP status carried by the error, when there is one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api {
                status, ..
            } => *status,
            _ => None
        }
    }

    /// Formats the error for diagnostics without the variant name.
    ///
    /// The returned string matches the [`std::fmt::Display`] implementation.
    pub fn to_display_string(&self) -> String {
        format!("{self}")
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(source: serde_yaml::Error) -> Self {
        Self::Parse {
            source
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(source: serde_json::Error) -> Self {
        Self::Serialize {
            source
        }
    }
}

/// Creates an [`Error::Io`] for a file that could not be read.
pub fn io_error(path: &Path, source: std::io::Error) -> Error {
    Error::Io {
        path: path.to_path_buf(),
        source
    }
}

/// Creates an [`Error::CacheIo`] variant capturing the failing path and source.
///
/// # Parameters
///
/// * `path` - Location of the cache entry or summary that triggered the error.
/// * `source` - I/O error reported by the operating system.
pub fn cache_io_error(path: &Path, source: std::io::Error) -> Error {
    Error::CacheIo {
        path: path.to_path_buf(),
        source
    }
}
