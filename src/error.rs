#![allow(non_shorthand_field_patterns)]
#![doc = "Error types shared by the configuration loader, API clients and CLI."]
// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

//! The derive emitted by [`masterror::Error`] expands pattern matches that
//! trigger the `non_shorthand_field_patterns` lint. The lint is disabled for
//! the module to keep the generated implementations warning-free.
//!
//! Two error surfaces exist. [`Error`] covers failures that abort the whole
//! run (unreadable configuration, missing credentials, client construction).
//! [`ChainError`] covers failures scoped to a single chain; the pipeline logs
//! them and moves on to the next chain.

use std::path::{Path, PathBuf};

/// Fatal error returned by the configuration loader and the CLI.
#[derive(Debug, masterror::Error)]
pub enum Error {
    /// Wraps I/O errors that occur while reading configuration files.
    #[error("failed to read configuration from {path:?}: {source}")]
    Io {
        /// Location of the configuration file.
        path:   PathBuf,
        /// Underlying I/O error.
        source: std::io::Error
    },
    /// Wraps YAML decoding errors.
    #[error("failed to parse configuration: {source}")]
    Parse {
        /// Source decoding error from serde_yaml.
        source: serde_yaml::Error
    },
    /// Returned when the configuration or CLI input violates invariants.
    #[error("invalid configuration: {message}")]
    Validation {
        /// Human readable message describing the validation problem.
        message: String
    },
    /// Wraps serialization errors when writing JSON output.
    #[error("failed to serialize report: {source}")]
    Serialize {
        /// Underlying serialization error.
        source: serde_json::Error
    },
    /// Returned when an HTTP client cannot be constructed.
    #[error("client error: {message}")]
    Client {
        /// Human readable message describing the client failure.
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

    /// Constructs a client error from the provided displayable value.
    ///
    /// # Parameters
    ///
    /// * `message` - Human-readable description of the client failure.
    pub fn client<M>(message: M) -> Self
    where
        M: Into<String>
    {
        Self::Client {
            message: message.into()
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

/// Creates an [`Error::Io`] variant capturing the failing path and source.
///
/// # Parameters
///
/// * `path` - Location of the configuration file that triggered the error.
/// * `source` - I/O error reported by the operating system.
pub fn io_error(path: &Path, source: std::io::Error) -> Error {
    Error::Io {
        path: path.to_path_buf(),
        source
    }
}

/// Failure that skips a single chain without aborting the run.
#[derive(Debug, Clone, PartialEq, Eq, masterror::Error)]
pub enum ChainError {
    /// Repository or file is absent on the hosting API.
    #[error("{what} not found")]
    NotFound {
        /// Description of the missing resource including its context.
        what: String
    },
    /// The hosting API rejected the credential.
    #[error("authentication rejected while fetching {what}")]
    Unauthorized {
        /// Description of the resource being fetched.
        what: String
    },
    /// Any other non-success response or transport failure.
    #[error("error fetching {what}: {message}")]
    Upstream {
        /// Description of the resource being fetched.
        what:    String,
        /// Message surfaced from the response body or the transport.
        message: String
    },
    /// The file payload is missing or cannot be decoded to text.
    #[error("file {path} in {repository} at ref {reference} is empty or cannot be read")]
    EmptyContent {
        /// Repository identifier in `owner/name` form.
        repository: String,
        /// Path of the manifest inside the repository.
        path:       String,
        /// Ref the manifest was requested at.
        reference:  String
    },
    /// The chain entry cannot be turned into API requests.
    #[error("invalid chain entry '{repository}': {message}")]
    InvalidEntry {
        /// Repository identifier as configured.
        repository: String,
        /// Human readable description of the malformed field.
        message:    String
    },
    /// Every release returned by the API is flagged as a prerelease.
    #[error("no releases found for {repository}")]
    NoQualifyingRelease {
        /// Repository identifier in `owner/name` form.
        repository: String
    }
}

impl ChainError {
    /// Maps an HTTP status to the chain error taxonomy.
    ///
    /// Returns `None` for success statuses.
    ///
    /// # Parameters
    ///
    /// * `status` - HTTP status code reported by the hosting API.
    /// * `what` - Description of the resource that was requested.
    /// * `message` - Optional `message` field from the response body.
    pub fn from_status(status: u16, what: impl Into<String>, message: Option<String>) -> Option<Self> {
        let what = what.into();
        match status {
            200..=299 => None,
            404 => Some(Self::NotFound {
                what
            }),
            401 => Some(Self::Unauthorized {
                what
            }),
            _ => Some(Self::Upstream {
                what,
                message: message.unwrap_or_else(|| "Unknown error".to_owned())
            })
        }
    }
}
