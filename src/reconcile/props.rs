//! Switch properties in the root `Directory.Build.props`.
//!
//! The shared properties file imports the build-logic fragment and defines
//! one switch property per flex-managed package. A switch turns on (package
//! reference) when a solution is being built and the package's project is
//! not among the solution's projects.

use std::path::{Path, PathBuf};

use crate::{
    constants::{
        DIRECTORY_BUILD_PROPS_FILE_NAME, PROPS_FILE_NAME, SOLUTION_PROJECTS_PROPERTY,
        SOLUTION_PROJECTS_SEPARATOR, SWITCH_PROPERTY_PREFIX,
    },
    error::Result,
    output::Reporter,
    resolver::{FlexManagedPackage, FlexManagedPackages},
    xml::Document,
};

use super::{fragment::import_project_value, load_document, save_document};

const IMPORT_COMMENT: &str = " Import FlexRef infrastructure (reads solution content) ";
const PROPERTIES_COMMENT: &str = " Per-dependency auto-detection managed by FlexRef ";

/// Rewrite the import and switch properties of `<root>/Directory.Build.props`.
///
/// The file is created when missing. Returns the path that was written.
///
/// # Errors
///
/// Returns an error if an existing file cannot be parsed or the file cannot
/// be written.
pub fn reconcile_shared_properties(
    root: &Path,
    packages: &FlexManagedPackages,
    reporter: &Reporter,
) -> Result<PathBuf> {
    let path = root.join(DIRECTORY_BUILD_PROPS_FILE_NAME);
    let mut document = if path.exists() {
        load_document(&path)?
    } else {
        Document::with_root("Project")
    };

    remove_generated(&mut document);
    append_generated(&mut document, packages);

    save_document(&document, &path)?;
    reporter.info(format!("  Updated: {}", path.display()));
    Ok(path)
}

/// The condition that enables the switch property of `package`.
///
/// An explicit `true` (for example from NCrunch settings) is left alone;
/// otherwise the switch turns on when the solution's project list is known
/// and does not contain the package's project file.
#[must_use]
pub fn switch_condition(package: &FlexManagedPackage) -> String {
    let separator = SOLUTION_PROJECTS_SEPARATOR;
    format!(
        "'$({property})' != 'true' And '$({SOLUTION_PROJECTS_PROPERTY})' != '' And !$({SOLUTION_PROJECTS_PROPERTY}.Contains('{separator}{file}{separator}'))",
        property = package.property_name,
        file = package.manifest_file_name,
    )
}

fn remove_generated(document: &mut Document) {
    let root = document.root();

    document.remove_generated(root, |document, node| {
        document.has_name(node, "Import")
            && document
                .attribute(node, "Project")
                .is_some_and(|project| project.contains(PROPS_FILE_NAME))
    });

    for group in document.child_elements_named(root, "PropertyGroup") {
        let removed = document.remove_generated(group, |document, node| {
            document
                .local_name(node)
                .is_some_and(|name| name.starts_with(SWITCH_PROPERTY_PREFIX))
        });

        if removed > 0 && !document.has_element_children(group) {
            document.remove_with_preceding_comment(group);
        }
    }
}

fn append_generated(document: &mut Document, packages: &FlexManagedPackages) {
    let root = document.root();

    let import = import_project_value();
    document.append_comment(root, IMPORT_COMMENT);
    document.append_element_with(root, "Import", &[("Project", import.as_str())]);

    if packages.is_empty() {
        return;
    }

    document.append_comment(root, PROPERTIES_COMMENT);
    let group = document.append_element(root, "PropertyGroup");

    for package in packages {
        let condition = switch_condition(package);
        document.append_comment(group, &format!(" {} ", package.package_id));
        let property = document.append_element_with(
            group,
            &package.property_name,
            &[("Condition", condition.as_str())],
        );
        document.append_text(property, "true");
    }
}
