//! Error type for API key lookup.

use std::path::PathBuf;

/// Errors raised while locating or reading the API key.
///
/// None of these are transient; they surface straight to the caller.
#[derive(Debug, thiserror::Error)]
pub enum CredentialsError {
    /// No credential file was found in the start directory or any parent.
    #[error(
        "API key not found. Create a .env file with:\n  MORALIS_API_KEY=your_key_here\nSearched from: {}",
        .searched_from.display()
    )]
    NotFound {
        /// Directory the upward search started from
        searched_from: PathBuf,
    },

    /// The credential file is a symbolic link.
    #[error("Refusing to read credential file through symbolic link: {}", .path.display())]
    SymbolicLink {
        /// Path of the rejected link
        path: PathBuf,
    },

    /// The credential file has no usable key line.
    #[error("Invalid .env file {}. Format: {key}=your_key_here", .path.display())]
    Malformed {
        /// Path of the credential file
        path: PathBuf,
        /// The expected key name
        key: String,
    },

    /// Reading the credential file failed.
    #[error("Failed to read credential file {}", .path.display())]
    Io {
        /// Path of the credential file
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

impl CredentialsError {
    /// Helper to create an `Io` error for a path.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        CredentialsError::Io {
            path: path.into(),
            source,
        }
    }
}
