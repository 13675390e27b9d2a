//! Domain-specific error types for the child submodule helper.
//!
//! Internal modules return typed errors (e.g., [`ConfigError`],
//! [`VersionError`]) while command handlers at the CLI boundary convert them
//! to [`anyhow::Error`] via the standard `?` operator.
//!
//! # Error hierarchy
//!
//! ```text
//! ConfigError   — .submoduler.ini lookup, parsing, validation, initialization
//! VersionError  — version file discovery and semantic version parsing
//! ReleaseError  — release target detection and release API failures
//! ```

use std::path::PathBuf;

use thiserror::Error;

/// Errors that arise from loading, validating, or creating `.submoduler.ini`.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The repository root does not contain a configuration file.
    #[error("Not in a Submoduler directory. Missing {}", .path.display())]
    NotFound {
        /// Path where the configuration file was expected.
        path: PathBuf,
    },

    /// `init` was run in a directory that is already initialized.
    #[error("{} already exists", .path.display())]
    AlreadyInitialized {
        /// Path of the existing configuration file.
        path: PathBuf,
    },

    /// The `submoduler.type` marker does not identify a child record.
    #[error("Invalid configuration: type must be 'child' (found '{found}')")]
    InvalidType {
        /// The marker value that was found (empty when the key is absent).
        found: String,
    },

    /// A required key is missing from the configuration.
    #[error("Invalid configuration: missing required key {section}.{key}")]
    MissingKey {
        /// Section that should contain the key.
        section: String,
        /// Name of the missing key.
        key: String,
    },

    /// A required section is missing from the configuration.
    #[error("Invalid configuration: missing required section [{0}]")]
    MissingSection(String),

    /// The INI file contains a syntax error that prevents parsing.
    #[error("Invalid INI syntax in {file}: {message}")]
    InvalidSyntax {
        /// File that failed to parse.
        file: String,
        /// Parser diagnostic including the line number.
        message: String,
    },

    /// An I/O error occurred while reading or writing the config file.
    #[error("IO error accessing config file {path}: {source}")]
    Io {
        /// Path to the file that could not be accessed.
        path: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}

/// Errors that arise from locating and parsing the version value.
#[derive(Error, Debug)]
pub enum VersionError {
    /// The version string is not `major.minor.patch[suffix]`.
    #[error("Invalid version '{0}': expected major.minor.patch")]
    Invalid(String),

    /// No version file could be found in any of the known locations.
    #[error("No version file found (looked in: {})", .searched.join(", "))]
    NotFound {
        /// Locations that were checked, relative to the repository root.
        searched: Vec<String>,
    },

    /// The version file exists but contains no `VERSION = "..."` constant.
    #[error("No VERSION constant found in {}", .path.display())]
    MissingConstant {
        /// Path of the version file.
        path: PathBuf,
    },

    /// Incrementing a component would exceed its numeric range.
    #[error("Cannot bump {0}: version component out of range")]
    Overflow(String),
}

/// Errors that arise while creating a hosted release.
#[derive(Error, Debug)]
pub enum ReleaseError {
    /// The `origin` remote does not point at a recognised hosting service.
    #[error("Could not detect GitHub repository from remote URL '{0}'")]
    UnknownRemote(String),

    /// The hosting API rejected or failed the request.
    #[error("Failed to create GitHub release for {tag}: {reason}")]
    Api {
        /// Tag the release was requested for.
        tag: String,
        /// Human-readable failure description.
        reason: String,
    },
}
