//! Typed error variants for the termprofile-config crate.
//!
//! Load failures are recorded on the profile and never reach getter or
//! setter callers. Save failures are returned from the setter that triggered
//! them. Pattern validation errors are returned to the search collaborator.

use std::path::PathBuf;
use thiserror::Error;

/// Errors produced by profile construction, persistence and search validation.
///
/// # Example
///
/// ```rust,no_run
/// use termprofile_config::{Profile, ProfileError};
///
/// let mut profile = Profile::new("Default").unwrap();
/// match profile.set_int("columns", 80) {
///     Ok(()) => {}
///     Err(ProfileError::SaveIo { path, source }) => {
///         eprintln!("kept in memory, not written to {}: {source}", path.display());
///     }
///     Err(other) => eprintln!("{other}"),
/// }
/// ```
#[derive(Debug, Error)]
pub enum ProfileError {
    // -----------------------------------------------------------------------
    // Construction
    // -----------------------------------------------------------------------
    /// A profile name was empty or whitespace only.
    #[error("profile name must not be empty")]
    EmptyName,

    /// A profile name would escape the configuration directory or cannot be
    /// used as a file name.
    #[error("invalid profile name '{0}': names must not contain path separators or '..'")]
    InvalidName(String),

    /// A key cannot be represented as a `key=value` line.
    #[error("invalid key '{0}'")]
    InvalidKey(String),

    // -----------------------------------------------------------------------
    // Persistence
    // -----------------------------------------------------------------------
    /// The backing file exists but could not be read.
    #[error("Error loading profile from '{}': {source}", path.display())]
    LoadIo {
        /// File that failed to load.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The backing file was read but is not a valid key file.
    #[error("Error loading profile from '{}': line {line}: {message}", path.display())]
    LoadParse {
        /// File that failed to parse.
        path: PathBuf,
        /// 1-based line number of the offending line.
        line: usize,
        /// Human-readable description of the problem.
        message: String,
    },

    /// The backing file could not be written. The in-memory value is kept.
    #[error("Error saving profile to '{}': {source}", path.display())]
    SaveIo {
        /// Destination file (or the directory that could not be created).
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    // -----------------------------------------------------------------------
    // Search collaborator
    // -----------------------------------------------------------------------
    /// A search pattern flagged as a regular expression failed to compile.
    #[error("Invalid search expression: {0}")]
    InvalidPattern(String),
}

impl ProfileError {
    /// Returns true for failures that were recovered by falling back to an
    /// empty in-memory store.
    pub fn is_load_error(&self) -> bool {
        matches!(self, ProfileError::LoadIo { .. } | ProfileError::LoadParse { .. })
    }
}

/// Convenience result alias for this crate.
pub type Result<T> = std::result::Result<T, ProfileError>;
