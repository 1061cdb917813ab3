//! Scanning configuration for directory traversal.
//!
//! This module defines the options that control how a workspace is traversed
//! when looking for project manifests and solution files.

/// Configuration for directory scanning behavior.
#[derive(Clone, Debug, Default)]
pub struct ScanOptions {
    /// Whether to hide the progress spinner
    pub quiet: bool,

    /// Number of threads to use for parsing (0 = default)
    pub threads: usize,

    /// Maximum directory depth to scan (None = unlimited)
    pub max_depth: Option<usize>,
}
