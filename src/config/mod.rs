//! Configuration types.
//!
//! - [`file`] - The workspace's `FlexRef.config.xml`
//! - [`scan`] - Options controlling directory traversal

pub mod file;
pub mod scan;

pub use file::{Configuration, ConfigurationFile};
pub use scan::ScanOptions;
