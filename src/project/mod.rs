//! Project manifest model.
//!
//! This module contains the data structures that describe the `.csproj` files
//! of a workspace: their package identity, packability and declared
//! dependencies.
//!
//! ## Main Parts
//!
//! - [`ProjectManifest`] - One parsed `.csproj` file
//! - [`DependencyEdge`] - A declared `ProjectReference` or `PackageReference`
//! - [`Projects`] - The manifests of one scan, in traversal order

#[allow(clippy::module_inception)]
// This is acceptable as it is the main module for project management
pub mod project;
pub mod projects;

pub use project::{DependencyEdge, ProjectManifest};
pub use projects::Projects;
