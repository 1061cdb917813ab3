//! Custom build properties in NCrunch solution settings.
//!
//! NCrunch builds projects outside of a solution build, so the fragment
//! cannot see which projects the solution contains. Instead, each solution's
//! settings file sets the switch property of every package that is absent
//! from that solution.

use std::path::PathBuf;

use crate::{
    constants::SWITCH_PROPERTY_PREFIX,
    error::Result,
    output::Reporter,
    resolver::{FlexManagedPackage, FlexManagedPackages},
    solution::SolutionGroup,
    xml::{Document, NodeId},
};

use super::{load_document, save_document};

const ROOT_TAG: &str = "SolutionConfiguration";
const SETTINGS_TAG: &str = "Settings";
const PROPERTIES_TAG: &str = "CustomBuildProperties";
const VALUE_TAG: &str = "Value";

/// Create or update the NCrunch settings file of `solution`.
///
/// Custom build properties that do not belong to this tool are kept.
/// Returns the path of the settings file.
///
/// # Errors
///
/// Returns an error if an existing settings file cannot be parsed or the file
/// cannot be written.
pub fn reconcile_settings(
    solution: &SolutionGroup,
    packages: &FlexManagedPackages,
    reporter: &Reporter,
) -> Result<PathBuf> {
    let path = solution.settings_path();
    let absent = solution.absent_packages(packages.as_slice());
    let existed = path.exists();

    let mut document = if existed {
        load_document(&path)?
    } else {
        Document::with_root(ROOT_TAG)
    };

    let settings = find_or_append(&mut document, SETTINGS_TAG);
    let properties = match document.first_child_named(settings, PROPERTIES_TAG) {
        Some(properties) => properties,
        None => document.append_element(settings, PROPERTIES_TAG),
    };

    document.remove_generated(properties, |document, node| {
        document.has_name(node, VALUE_TAG)
            && document
                .text(node)
                .trim_start()
                .starts_with(SWITCH_PROPERTY_PREFIX)
    });

    for package in &absent {
        let value = document.append_element(properties, VALUE_TAG);
        document.append_text(value, &custom_build_property(package));
    }

    if !document.has_element_children(properties) {
        document.remove(properties);
    }

    save_document(&document, &path)?;
    reporter.info(format!(
        "  {}: {} ({} absent package(s))",
        if existed { "Updated" } else { "Created" },
        path.display(),
        absent.len()
    ));

    Ok(path)
}

/// The NCrunch custom build property that switches `package` to its package form.
#[must_use]
pub fn custom_build_property(package: &FlexManagedPackage) -> String {
    format!("{} = true", package.property_name)
}

fn find_or_append(document: &mut Document, tag: &str) -> NodeId {
    let root = document.root();
    match document.first_child_named(root, tag) {
        Some(existing) => existing,
        None => document.append_element(root, tag),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn setup(members: &[&str]) -> (TempDir, SolutionGroup, FlexManagedPackages) {
        let temp_dir = TempDir::new().unwrap();
        let solution = SolutionGroup {
            path: temp_dir.path().join("Acme.slnx"),
            member_file_names: members.iter().map(ToString::to_string).collect(),
        };
        let packages = FlexManagedPackages::from(vec![
            FlexManagedPackage::new("B", temp_dir.path().join("B/B.csproj")),
            FlexManagedPackage::new("A", temp_dir.path().join("A/A.csproj")),
        ]);
        (temp_dir, solution, packages)
    }

    #[test]
    fn test_creates_settings_with_absent_packages() {
        let (_temp_dir, solution, packages) = setup(&["App.csproj"]);
        let reporter = Reporter::new().with_quiet(true);

        let path = reconcile_settings(&solution, &packages, &reporter).unwrap();

        assert_eq!(
            fs::read_to_string(path).unwrap(),
            "<SolutionConfiguration>\n  <Settings>\n    <CustomBuildProperties>\n      <Value>UsePackageReference_A = true</Value>\n      <Value>UsePackageReference_B = true</Value>\n    </CustomBuildProperties>\n  </Settings>\n</SolutionConfiguration>\n"
        );
    }

    #[test]
    fn test_creates_empty_settings_when_nothing_is_absent() {
        let (_temp_dir, solution, packages) = setup(&["A.csproj", "B.csproj"]);
        let reporter = Reporter::new().with_quiet(true);

        let path = reconcile_settings(&solution, &packages, &reporter).unwrap();

        assert_eq!(
            fs::read_to_string(path).unwrap(),
            "<SolutionConfiguration>\n  <Settings />\n</SolutionConfiguration>\n"
        );
    }

    #[test]
    fn test_update_keeps_foreign_values_and_other_settings() {
        let (_temp_dir, solution, packages) = setup(&["A.csproj"]);
        let reporter = Reporter::new().with_quiet(true);
        fs::write(
            solution.settings_path(),
            r"<SolutionConfiguration>
  <Settings>
    <AllowParallelTestExecution>True</AllowParallelTestExecution>
    <CustomBuildProperties>
      <Value>Configuration = Debug</Value>
      <Value>  UsePackageReference_Old = true</Value>
    </CustomBuildProperties>
  </Settings>
</SolutionConfiguration>",
        )
        .unwrap();

        reconcile_settings(&solution, &packages, &reporter).unwrap();
        let first = fs::read_to_string(solution.settings_path()).unwrap();
        reconcile_settings(&solution, &packages, &reporter).unwrap();
        let second = fs::read_to_string(solution.settings_path()).unwrap();

        assert_eq!(first, second);
        assert_eq!(
            first,
            "<SolutionConfiguration>\n  <Settings>\n    <AllowParallelTestExecution>True</AllowParallelTestExecution>\n    <CustomBuildProperties>\n      <Value>Configuration = Debug</Value>\n      <Value>UsePackageReference_B = true</Value>\n    </CustomBuildProperties>\n  </Settings>\n</SolutionConfiguration>\n"
        );
    }

    #[test]
    fn test_update_drops_empty_custom_build_properties() {
        let (_temp_dir, solution, packages) = setup(&["A.csproj", "B.csproj"]);
        let reporter = Reporter::new().with_quiet(true);
        fs::write(
            solution.settings_path(),
            "<SolutionConfiguration><Settings><CustomBuildProperties><Value>UsePackageReference_A = true</Value></CustomBuildProperties></Settings></SolutionConfiguration>",
        )
        .unwrap();

        reconcile_settings(&solution, &packages, &reporter).unwrap();

        assert!(
            !fs::read_to_string(solution.settings_path())
                .unwrap()
                .contains("CustomBuildProperties")
        );
    }
}
