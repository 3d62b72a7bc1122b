//! API key lookup.
//!
//! The key lives in a `.env` file somewhere at or above a starting directory.
//! [`EnvFileCredentials`] walks upward until it finds one, refuses symbolic links,
//! and reads the `MORALIS_API_KEY` entry.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::config::constants::{API_KEY_ENV_VAR, CREDENTIAL_FILE_NAME};
use crate::errors::CredentialsError;

/// An API key that never prints itself.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    /// Wrap a raw key.
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Expose the key for use in a request header.
    ///
    /// Avoid logging or storing the returned value.
    pub fn expose_secret(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ApiKey(***REDACTED***)")
    }
}

impl fmt::Display for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "***REDACTED***")
    }
}

/// Source of the API key attached to every request.
///
/// Implement this to plug in a secret store; the client asks for the key once
/// per request it builds.
pub trait CredentialProvider: Send + Sync {
    /// Return the API key or explain why it is unavailable.
    fn api_key(&self) -> Result<ApiKey, CredentialsError>;
}

/// A fixed key, for tests and embedding.
#[derive(Debug, Clone)]
pub struct StaticCredentials(ApiKey);

impl StaticCredentials {
    /// Use `key` for every request.
    pub fn new(key: impl Into<String>) -> Self {
        Self(ApiKey::new(key))
    }
}

impl CredentialProvider for StaticCredentials {
    fn api_key(&self) -> Result<ApiKey, CredentialsError> {
        Ok(self.0.clone())
    }
}

/// Reads the key from the nearest `.env` file at or above a directory.
#[derive(Debug, Clone)]
pub struct EnvFileCredentials {
    start_dir: PathBuf,
}

impl EnvFileCredentials {
    /// Search upward from `start_dir`.
    pub fn new(start_dir: impl Into<PathBuf>) -> Self {
        Self {
            start_dir: start_dir.into(),
        }
    }

    /// The directory the search starts from.
    pub fn start_dir(&self) -> &Path {
        &self.start_dir
    }
}

impl CredentialProvider for EnvFileCredentials {
    fn api_key(&self) -> Result<ApiKey, CredentialsError> {
        let path = find_credential_file(&self.start_dir)?;
        read_api_key(&path)
    }
}

/// Find the nearest credential file at or above `start_dir`.
///
/// Symbolic links are rejected rather than followed.
pub fn find_credential_file(start_dir: &Path) -> Result<PathBuf, CredentialsError> {
    for dir in start_dir.ancestors() {
        let candidate = dir.join(CREDENTIAL_FILE_NAME);
        match std::fs::symlink_metadata(&candidate) {
            Ok(meta) if meta.file_type().is_symlink() => {
                return Err(CredentialsError::SymbolicLink { path: candidate });
            }
            Ok(meta) if meta.is_file() => return Ok(candidate),
            Ok(_) => continue,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
            Err(e) => return Err(CredentialsError::io(candidate, e)),
        }
    }
    Err(CredentialsError::NotFound {
        searched_from: start_dir.to_path_buf(),
    })
}

/// Read the `MORALIS_API_KEY` entry from a credential file.
///
/// Lines that do not parse as assignments are skipped.
pub fn read_api_key(path: &Path) -> Result<ApiKey, CredentialsError> {
    let malformed = || CredentialsError::Malformed {
        path: path.to_path_buf(),
        key: API_KEY_ENV_VAR.to_string(),
    };

    let entries = dotenvy::from_path_iter(path).map_err(|e| match e {
        dotenvy::Error::Io(io) => CredentialsError::io(path, io),
        _ => malformed(),
    })?;

    for entry in entries {
        let (key, value) = match entry {
            Ok(pair) => pair,
            Err(dotenvy::Error::Io(io)) => return Err(CredentialsError::io(path, io)),
            Err(_) => continue,
        };
        if key == API_KEY_ENV_VAR {
            let value = value.trim();
            if value.is_empty() {
                return Err(malformed());
            }
            return Ok(ApiKey::new(value));
        }
    }
    Err(malformed())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_key_is_redacted() {
        let key = ApiKey::new("super-secret");
        assert_eq!(format!("{key}"), "***REDACTED***");
        assert!(!format!("{key:?}").contains("super-secret"));
        assert_eq!(key.expose_secret(), "super-secret");
    }

    #[test]
    fn test_finds_file_in_parent_directory() {
        let root = tempfile::tempdir().unwrap();
        std::fs::write(root.path().join(".env"), "MORALIS_API_KEY=abc123\n").unwrap();
        let nested = root.path().join("skills").join("web3-shared");
        std::fs::create_dir_all(&nested).unwrap();

        let key = EnvFileCredentials::new(&nested).api_key().unwrap();
        assert_eq!(key.expose_secret(), "abc123");
    }

    #[test]
    fn test_nearest_file_wins() {
        let root = tempfile::tempdir().unwrap();
        std::fs::write(root.path().join(".env"), "MORALIS_API_KEY=outer\n").unwrap();
        let nested = root.path().join("inner");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(nested.join(".env"), "OTHER=1\nMORALIS_API_KEY= inner \n").unwrap();

        let key = EnvFileCredentials::new(&nested).api_key().unwrap();
        assert_eq!(key.expose_secret(), "inner");
    }

    #[test]
    fn test_missing_key_line_is_malformed() {
        let root = tempfile::tempdir().unwrap();
        std::fs::write(root.path().join(".env"), "SOMETHING_ELSE=1\n").unwrap();

        let err = EnvFileCredentials::new(root.path()).api_key().unwrap_err();
        assert!(matches!(err, CredentialsError::Malformed { .. }));
        assert!(err.to_string().contains("MORALIS_API_KEY=your_key_here"));
    }

    #[test]
    fn test_unparsable_lines_are_skipped() {
        let root = tempfile::tempdir().unwrap();
        std::fs::write(
            root.path().join(".env"),
            "[web3]\nthis is not an assignment\nMORALIS_API_KEY=after-noise\n",
        )
        .unwrap();

        let key = EnvFileCredentials::new(root.path()).api_key().unwrap();
        assert_eq!(key.expose_secret(), "after-noise");
    }

    #[cfg(unix)]
    #[test]
    fn test_symbolic_link_is_rejected() {
        let root = tempfile::tempdir().unwrap();
        let target = root.path().join("real.env");
        std::fs::write(&target, "MORALIS_API_KEY=abc\n").unwrap();
        std::os::unix::fs::symlink(&target, root.path().join(".env")).unwrap();

        let err = EnvFileCredentials::new(root.path()).api_key().unwrap_err();
        assert!(matches!(err, CredentialsError::SymbolicLink { .. }));
    }
}
