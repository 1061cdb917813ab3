//! # flexref
//!
//! Flexible references for .NET workspaces.
//!
//! A flex reference is a dependency of one project on another packable
//! project that resolves to a `ProjectReference` when both projects are in
//! the solution being built, and to a `PackageReference` otherwise. This
//! crate discovers the packable projects of a workspace, decides which of
//! them are flex-managed, and rewrites the MSBuild and NCrunch files that
//! implement the switch.
//!
//! ## Modules
//!
//! - [`workspace`]: the `init` and `sync` operations
//! - [`scanner`]: parallel discovery of project and solution files
//! - [`project`]: parsed project manifests
//! - [`solution`]: parsed `.slnx` solutions
//! - [`config`]: `FlexRef.config.xml` and scanning options
//! - [`resolver`]: selection of flex-managed packages
//! - [`reconcile`]: rewriting of the managed files
//! - [`xml`]: an order-preserving XML document model

pub mod config;
pub mod constants;
pub mod error;
pub mod output;
pub mod project;
pub mod reconcile;
pub mod resolver;
pub mod scanner;
pub mod solution;
pub mod utils;
pub mod workspace;
pub mod xml;

pub use error::{FlexRefError, Result};
pub use output::Reporter;
pub use workspace::{InitReport, SyncReport, Workspace};
