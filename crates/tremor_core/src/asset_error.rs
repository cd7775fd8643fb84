//! Asset error types
//!
//! Errors raised while reading mesh files from disk.

use std::fmt;
use std::io;

/// Error type for asset operations
#[derive(Debug)]
pub enum AssetError {
    /// IO error (file not found, permission denied, etc.)
    Io(io::Error),
    /// Malformed record in a mesh file
    Parse {
        /// 1-based line number of the offending record
        line: usize,
        message: String,
    },
    /// Asset path does not exist
    NotFound(String),
}

impl AssetError {
    /// Parse error at a given line
    pub fn parse(line: usize, message: impl Into<String>) -> Self {
        AssetError::Parse {
            line,
            message: message.into(),
        }
    }
}

impl fmt::Display for AssetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssetError::Io(err) => write!(f, "Asset IO error: {}", err),
            AssetError::Parse { line, message } => {
                write!(f, "Asset parse error at line {}: {}", line, message)
            }
            AssetError::NotFound(path) => write!(f, "Asset not found: {}", path),
        }
    }
}

impl std::error::Error for AssetError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AssetError::Io(err) => Some(err),
            AssetError::Parse { .. } => None,
            AssetError::NotFound(_) => None,
        }
    }
}

impl From<io::Error> for AssetError {
    fn from(err: io::Error) -> Self {
        AssetError::Io(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_display() {
        let io_err = io::Error::new(io::ErrorKind::PermissionDenied, "locked");
        let msg = format!("{}", AssetError::Io(io_err));
        assert!(msg.contains("IO error"));
        assert!(msg.contains("locked"));
    }

    #[test]
    fn test_parse_error_display() {
        let err = AssetError::parse(12, "face index 9 out of range");
        let msg = format!("{}", err);
        assert!(msg.contains("line 12"));
        assert!(msg.contains("out of range"));
    }

    #[test]
    fn test_not_found_error_display() {
        let err = AssetError::NotFound("models/bed.obj".to_string());
        let msg = format!("{}", err);
        assert!(msg.contains("not found"));
        assert!(msg.contains("models/bed.obj"));
    }

    #[test]
    fn test_from_io_error() {
        let io_err = io::Error::new(io::ErrorKind::PermissionDenied, "access denied");
        let asset_err: AssetError = io_err.into();
        match asset_err {
            AssetError::Io(e) => assert_eq!(e.kind(), io::ErrorKind::PermissionDenied),
            _ => panic!("Expected Io variant"),
        }
    }

    #[test]
    fn test_error_source() {
        use std::error::Error;

        let io_err = io::Error::new(io::ErrorKind::NotFound, "missing");
        assert!(AssetError::Io(io_err).source().is_some());
        assert!(AssetError::parse(1, "bad").source().is_none());
        assert!(AssetError::NotFound("path".to_string()).source().is_none());
    }
}
