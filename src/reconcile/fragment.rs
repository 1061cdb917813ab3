//! The `build/FlexRef.props` build-logic fragment.
//!
//! The fragment is embedded in the binary and copied verbatim. It computes
//! the `_FlexRef_SolutionProjects` property (`|A.csproj|B.csproj|`) that the
//! generated switch properties in `Directory.Build.props` test against.

use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::{
    constants::{BUILD_DIRECTORY_NAME, PROPS_FILE_NAME},
    error::{FlexRefError, Result},
    output::Reporter,
};

/// Content of `build/FlexRef.props`.
pub const FRAGMENT_TEMPLATE: &str = include_str!("../../assets/FlexRef.props");

/// Location of the fragment below the workspace root.
#[must_use]
pub fn fragment_path(root: &Path) -> PathBuf {
    root.join(BUILD_DIRECTORY_NAME).join(PROPS_FILE_NAME)
}

/// The `Project` value that imports the fragment from `Directory.Build.props`.
#[must_use]
pub fn import_project_value() -> String {
    format!("$(MSBuildThisFileDirectory){BUILD_DIRECTORY_NAME}\\{PROPS_FILE_NAME}")
}

/// Write the fragment below `root`, creating the `build` directory if needed.
///
/// # Errors
///
/// Returns [`FlexRefError::Io`] if the directory or file cannot be written.
pub fn write_fragment(root: &Path, reporter: &Reporter) -> Result<PathBuf> {
    let path = fragment_path(root);

    if let Some(directory) = path.parent() {
        fs::create_dir_all(directory).map_err(|err| FlexRefError::io(directory, err))?;
    }
    fs::write(&path, FRAGMENT_TEMPLATE).map_err(|err| FlexRefError::io(&path, err))?;

    reporter.info(format!("  Wrote: {}", path.display()));
    Ok(path)
}
