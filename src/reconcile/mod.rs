//! Reconcilers for the files `flexref sync` owns parts of.
//!
//! Each reconciler follows the same pattern: load the file, remove whatever a
//! previous run generated (each block together with its leading comment),
//! then append freshly generated content. Content the tool did not generate
//! is left in place, and running a reconciler twice yields the same file.
//!
//! - [`manifest`] - Conditional reference pairs in `.csproj` files
//! - [`props`] - Switch properties in the root `Directory.Build.props`
//! - [`settings`] - Custom build properties in NCrunch solution settings
//! - [`fragment`] - The `build/FlexRef.props` build logic

pub mod fragment;
pub mod manifest;
pub mod props;
pub mod settings;

use std::path::Path;

use crate::{
    error::{FlexRefError, Result},
    xml::Document,
};

pub use fragment::write_fragment;
pub use manifest::reconcile_manifest;
pub use props::reconcile_shared_properties;
pub use settings::reconcile_settings;

fn load_document(path: &Path) -> Result<Document> {
    Document::load(path).map_err(|err| FlexRefError::xml(path, err))
}

fn save_document(document: &Document, path: &Path) -> Result<()> {
    document
        .save(path)
        .map_err(|err| FlexRefError::io(path, err))
}
