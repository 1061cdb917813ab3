//! Error types returned by workspace operations.
//!
//! Expected conditions such as a missing or pre-existing configuration are
//! ordinary variants, so the binary can map each of them to its own message
//! and exit code without inspecting error strings.

use std::path::PathBuf;

use thiserror::Error;

use crate::xml::XmlError;

/// Fatal error of an `init` or `sync` operation.
#[derive(Debug, Error)]
pub enum FlexRefError {
    #[error("Root directory not found: {}", .0.display())]
    RootDirectoryNotFound(PathBuf),

    #[error("Configuration already exists: {}", .0.display())]
    ConfigurationAlreadyExists(PathBuf),

    #[error("Configuration not found: {}", .0.display())]
    ConfigurationNotFound(PathBuf),

    #[error("Failed to access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid XML in {}: {source}", path.display())]
    Xml {
        path: PathBuf,
        #[source]
        source: XmlError,
    },
}

impl FlexRefError {
    /// Wrap an I/O error with the path it occurred on.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Wrap an XML load error with the file it occurred in.
    ///
    /// Read failures stay I/O errors so callers see the real cause.
    pub fn xml(path: impl Into<PathBuf>, source: XmlError) -> Self {
        match source {
            XmlError::Io(source) => Self::io(path, source),
            source => Self::Xml {
                path: path.into(),
                source,
            },
        }
    }
}

/// Convenience alias used throughout the library.
pub type Result<T> = std::result::Result<T, FlexRefError>;
