//! Utility functions and helpers.
//!
//! This module contains small helpers used throughout the application, such
//! as the case-insensitive comparisons MSBuild applies to names and the path
//! conversions needed to write Windows-style project references.

pub mod path;
pub mod text;

pub use path::{file_name, include_file_name, relative_path_with_backslashes};
pub use text::{cmp_ignore_case, eq_ignore_case};
