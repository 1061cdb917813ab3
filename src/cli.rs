//! Command-line interface definition and argument parsing.
//!
//! This module defines the `init` and `sync` subcommands and the scanning
//! options shared by both, using the [clap](https://docs.rs/clap/) library.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use flexref::config::ScanOptions;

/// Command-line arguments for controlling directory scanning behavior.
///
/// These options are global, so they may appear before or after the
/// subcommand.
#[derive(Parser)]
struct ScanningArgs {
    /// Only print warnings and errors
    ///
    /// Suppresses progress output and the scanning spinner. Warnings are
    /// still written to stderr.
    #[arg(short = 'q', long, global = true)]
    quiet: bool,

    /// The number of threads to use for parsing project files
    ///
    /// A value of 0 uses the default number of threads (typically the number of CPU cores).
    #[arg(short = 't', long, global = true)]
    threads: Option<usize>,

    /// Maximum directory depth to scan below the workspace root
    #[arg(long, global = true)]
    max_depth: Option<usize>,
}

/// Available subcommands.
#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Create FlexRef.config.xml and build/FlexRef.props
    Init {
        /// Workspace root (defaults to the current directory)
        directory: Option<PathBuf>,
    },

    /// Update all managed files based on the configuration
    Sync {
        /// Workspace root (defaults to the current directory)
        directory: Option<PathBuf>,
    },
}

/// Main command-line interface structure.
///
/// # Examples
///
/// ```bash
/// flexref init
/// flexref sync ~/src/acme
/// flexref --quiet sync
/// ```
#[derive(Parser)]
#[command(name = "flexref")]
#[command(
    about = "Switch between ProjectReference and PackageReference based on solution membership"
)]
#[command(version)]
#[command(author)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,

    /// Scanning options
    #[command(flatten)]
    scanning: ScanningArgs,
}

impl Cli {
    /// The workspace root, defaulting to the current directory.
    #[must_use]
    pub fn directory(&self) -> PathBuf {
        let (Commands::Init { directory } | Commands::Sync { directory }) = &self.command;
        directory.clone().unwrap_or_else(|| PathBuf::from("."))
    }

    /// Whether progress output is suppressed.
    #[must_use]
    pub const fn quiet(&self) -> bool {
        self.scanning.quiet
    }

    /// Build scanning options from the command line.
    #[must_use]
    pub fn scan_options(&self) -> ScanOptions {
        ScanOptions {
            quiet: self.scanning.quiet,
            threads: self.scanning.threads.unwrap_or(0),
            max_depth: self.scanning.max_depth,
        }
    }
}
