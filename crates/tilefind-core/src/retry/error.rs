//! Download attempt error type.

use std::fmt;
use std::path::PathBuf;

/// Error returned by a single download attempt. Everything except
/// `Destination` counts as a failed attempt and may be retried.
#[derive(Debug)]
pub enum AttemptError {
    /// Curl reported an error (timeout, connection, etc.).
    Curl(curl::Error),
    /// HTTP response had a non-2xx status.
    Http(u32),
    /// Opening or writing the destination file failed.
    Storage(std::io::Error),
    /// The destination directory could not be created. Aborts the batch.
    Destination {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl AttemptError {
    /// True when the error should abort the whole batch instead of being retried.
    pub fn is_fatal(&self) -> bool {
        matches!(self, AttemptError::Destination { .. })
    }
}

impl fmt::Display for AttemptError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttemptError::Curl(e) => write!(f, "{}", e),
            AttemptError::Http(code) => write!(f, "HTTP {}", code),
            AttemptError::Storage(e) => write!(f, "storage: {}", e),
            AttemptError::Destination { path, source } => {
                write!(f, "cannot create {}: {}", path.display(), source)
            }
        }
    }
}

impl std::error::Error for AttemptError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AttemptError::Curl(e) => Some(e),
            AttemptError::Storage(e) => Some(e),
            AttemptError::Destination { source, .. } => Some(source),
            AttemptError::Http(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_destination_is_fatal() {
        assert!(!AttemptError::Http(503).is_fatal());
        assert!(!AttemptError::Storage(std::io::Error::other("disk full")).is_fatal());
        let e = AttemptError::Destination {
            path: PathBuf::from("/nope"),
            source: std::io::Error::other("read-only"),
        };
        assert!(e.is_fatal());
        assert_eq!(e.to_string(), "cannot create /nope: read-only");
    }

    #[test]
    fn http_display() {
        assert_eq!(AttemptError::Http(404).to_string(), "HTTP 404");
    }
}
