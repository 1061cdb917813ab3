//! Conditional reference pairs in project manifests.
//!
//! For every flex-managed package a manifest depends on, the manifest gets
//! two generated item groups: a `PackageReference` used when the switch
//! property is `true` and a `ProjectReference` used otherwise. Plain
//! references to flex-managed packages are removed, since the generated
//! pair replaces them.

use std::collections::HashMap;

use crate::{
    constants::WILDCARD_VERSION,
    error::Result,
    output::Reporter,
    project::{
        ProjectManifest,
        project::{include_values, package_version},
    },
    resolver::{FlexManagedPackage, FlexManagedPackages},
    utils::{eq_ignore_case, include_file_name, relative_path_with_backslashes},
    xml::{Document, NodeId},
};

use super::{load_document, save_document};

/// Rewrite the flex references of `manifest`.
///
/// Manifests without flex-managed dependencies are not touched at all.
/// Returns the number of flex references written, or `None` when the
/// manifest was skipped.
///
/// # Errors
///
/// Returns an error if the manifest cannot be read, parsed or written.
pub fn reconcile_manifest(
    manifest: &ProjectManifest,
    packages: &FlexManagedPackages,
    reporter: &Reporter,
) -> Result<Option<usize>> {
    let referenced = packages.referenced_by(manifest);
    if referenced.is_empty() {
        return Ok(None);
    }

    // Plain references to the manifest's own package are removed too.
    let managed: Vec<&FlexManagedPackage> = packages.iter().collect();

    let mut document = load_document(&manifest.path)?;
    let versions = explicit_versions(&document, &managed);

    remove_generated_groups(&mut document, &managed);
    remove_plain_references(&mut document, &managed);

    for package in &referenced {
        let version = versions
            .get(package.package_id.as_str())
            .map_or(WILDCARD_VERSION, String::as_str);
        let project_path = relative_path_with_backslashes(&manifest.path, &package.manifest_path);
        append_reference_pair(&mut document, package, version, &project_path);
    }

    save_document(&document, &manifest.path)?;
    reporter.info(format!(
        "  Updated: {} ({} flex reference(s))",
        manifest.path.display(),
        referenced.len()
    ));

    Ok(Some(referenced.len()))
}

/// Versions pinned on package references to flex-managed packages, keyed by
/// package identity. A later reference overrides an earlier one.
fn explicit_versions<'a>(
    document: &Document,
    managed: &[&'a FlexManagedPackage],
) -> HashMap<&'a str, String> {
    let mut versions = HashMap::new();

    for group in document.descendants_named(document.root(), "ItemGroup") {
        for reference in document.child_elements_named(group, "PackageReference") {
            let Some(version) = package_version(document, reference) else {
                continue;
            };

            for name in include_values(document, reference) {
                if let Some(package) = find_by_id(managed, name) {
                    versions.insert(package.package_id.as_str(), version.clone());
                }
            }
        }
    }

    versions
}

fn find_by_id<'a>(managed: &[&'a FlexManagedPackage], id: &str) -> Option<&'a FlexManagedPackage> {
    managed
        .iter()
        .copied()
        .find(|package| eq_ignore_case(&package.package_id, id))
}

/// Remove the item groups a previous run generated, recognized by a switch
/// property in their condition.
fn remove_generated_groups(document: &mut Document, managed: &[&FlexManagedPackage]) {
    let root = document.root();
    document.remove_generated(root, |document, node| {
        document.has_name(node, "ItemGroup")
            && document.attribute(node, "Condition").is_some_and(|condition| {
                managed
                    .iter()
                    .any(|package| condition.contains(&package.property_name))
            })
    });
}

/// Remove references to flex-managed packages from the remaining item
/// groups, dropping groups that end up empty.
fn remove_plain_references(document: &mut Document, managed: &[&FlexManagedPackage]) {
    for group in document.descendants_named(document.root(), "ItemGroup") {
        let mut touched = false;

        for item in document.child_elements(group) {
            let is_project = document.has_name(item, "ProjectReference");
            if !is_project && !document.has_name(item, "PackageReference") {
                continue;
            }

            let is_managed = |value: &str| {
                managed.iter().any(|package| {
                    if is_project {
                        eq_ignore_case(include_file_name(value), &package.manifest_file_name)
                    } else {
                        eq_ignore_case(value, &package.package_id)
                    }
                })
            };

            let values: Vec<&str> = include_values(document, item).collect();
            if !values.iter().copied().any(&is_managed) {
                continue;
            }

            let kept: Vec<String> = values
                .into_iter()
                .filter(|&value| !is_managed(value))
                .map(str::to_string)
                .collect();

            touched = true;
            if kept.is_empty() {
                document.remove(item);
            } else {
                document.set_attribute(item, "Include", &kept.join(";"));
            }
        }

        if touched && !document.has_element_children(group) {
            document.remove_with_preceding_comment(group);
        }
    }
}

fn append_reference_pair(
    document: &mut Document,
    package: &FlexManagedPackage,
    version: &str,
    project_path: &str,
) {
    let root = document.root();
    let property = &package.property_name;

    document.append_comment(root, &format!(" {} - flex reference ", package.package_id));

    let package_group = conditional_group(document, root, &format!("'$({property})' == 'true'"));
    document.append_element_with(
        package_group,
        "PackageReference",
        &[("Include", package.package_id.as_str()), ("Version", version)],
    );

    let project_group = conditional_group(document, root, &format!("'$({property})' != 'true'"));
    document.append_element_with(project_group, "ProjectReference", &[("Include", project_path)]);
}

fn conditional_group(document: &mut Document, root: NodeId, condition: &str) -> NodeId {
    document.append_element_with(root, "ItemGroup", &[("Condition", condition)])
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{fs, path::Path};
    use tempfile::TempDir;

    const CONSUMER: &str = r#"<Project Sdk="Microsoft.NET.Sdk">
  <PropertyGroup>
    <TargetFramework>net8.0</TargetFramework>
  </PropertyGroup>
  <ItemGroup>
    <PackageReference Include="Newtonsoft.Json" Version="13.0.3" />
    <ProjectReference Include="..\Acme.Core\Acme.Core.csproj" />
  </ItemGroup>
</Project>
"#;

    fn setup(consumer: &str) -> (TempDir, ProjectManifest, FlexManagedPackages) {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        let core = root.join("Acme.Core/Acme.Core.csproj");
        let app = root.join("App/App.csproj");
        fs::create_dir_all(core.parent().unwrap()).unwrap();
        fs::create_dir_all(app.parent().unwrap()).unwrap();
        fs::write(
            &core,
            "<Project><PropertyGroup><IsPackable>true</IsPackable></PropertyGroup></Project>",
        )
        .unwrap();
        fs::write(&app, consumer).unwrap();

        let manifest = ProjectManifest::load(&app, root).unwrap();
        let packages = FlexManagedPackages::from(vec![FlexManagedPackage::new("Acme.Core", core)]);
        (temp_dir, manifest, packages)
    }

    fn read(path: &Path) -> String {
        fs::read_to_string(path).unwrap()
    }

    #[test]
    fn test_generates_reference_pair() {
        let (_temp_dir, manifest, packages) = setup(CONSUMER);
        let reporter = Reporter::new().with_quiet(true);

        let written = reconcile_manifest(&manifest, &packages, &reporter).unwrap();

        assert_eq!(written, Some(1));
        assert_eq!(
            read(&manifest.path),
            r#"<Project Sdk="Microsoft.NET.Sdk">
  <PropertyGroup>
    <TargetFramework>net8.0</TargetFramework>
  </PropertyGroup>
  <ItemGroup>
    <PackageReference Include="Newtonsoft.Json" Version="13.0.3" />
  </ItemGroup>
  <!-- Acme.Core - flex reference -->
  <ItemGroup Condition="'$(UsePackageReference_Acme_Core)' == 'true'">
    <PackageReference Include="Acme.Core" Version="*-*" />
  </ItemGroup>
  <ItemGroup Condition="'$(UsePackageReference_Acme_Core)' != 'true'">
    <ProjectReference Include="..\Acme.Core\Acme.Core.csproj" />
  </ItemGroup>
</Project>
"#
        );
    }

    #[test]
    fn test_second_run_is_identical() {
        let (temp_dir, manifest, packages) = setup(CONSUMER);
        let reporter = Reporter::new().with_quiet(true);

        reconcile_manifest(&manifest, &packages, &reporter).unwrap();
        let first = read(&manifest.path);
        let reloaded = ProjectManifest::load(&manifest.path, temp_dir.path()).unwrap();
        reconcile_manifest(&reloaded, &packages, &reporter).unwrap();

        assert_eq!(read(&manifest.path), first);
    }

    #[test]
    fn test_explicit_version_is_preserved() {
        let (_temp_dir, manifest, packages) = setup(
            r#"<Project>
  <ItemGroup>
    <PackageReference Include="acme.core">
      <Version>2.3.1</Version>
    </PackageReference>
  </ItemGroup>
</Project>"#,
        );
        let reporter = Reporter::new().with_quiet(true);

        reconcile_manifest(&manifest, &packages, &reporter).unwrap();
        let content = read(&manifest.path);

        assert!(content.contains(r#"<PackageReference Include="Acme.Core" Version="2.3.1" />"#));
        assert!(!content.contains("acme.core"));
        assert_eq!(content.matches("<ItemGroup").count(), 2);
    }

    #[test]
    fn test_unrelated_entries_of_a_reference_list_are_kept() {
        let (_temp_dir, manifest, packages) = setup(
            r#"<Project>
  <ItemGroup>
    <ProjectReference Include="..\Acme.Core\Acme.Core.csproj;..\Other\Other.csproj" />
  </ItemGroup>
</Project>"#,
        );
        let reporter = Reporter::new().with_quiet(true);

        reconcile_manifest(&manifest, &packages, &reporter).unwrap();

        assert!(read(&manifest.path).contains(r#"<ProjectReference Include="..\Other\Other.csproj" />"#));
    }

    #[test]
    fn test_reference_to_own_package_is_removed() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        let core = root.join("Acme.Core/Acme.Core.csproj");
        let data = root.join("Acme.Data/Acme.Data.csproj");
        fs::create_dir_all(core.parent().unwrap()).unwrap();
        fs::write(
            &core,
            r#"<Project>
  <PropertyGroup>
    <PackageId>Acme.Core</PackageId>
  </PropertyGroup>
  <ItemGroup>
    <PackageReference Include="Acme.Core" Version="1.0.0" />
    <ProjectReference Include="..\Acme.Data\Acme.Data.csproj" />
  </ItemGroup>
</Project>"#,
        )
        .unwrap();
        let manifest = ProjectManifest::load(&core, root).unwrap();
        let packages = FlexManagedPackages::from(vec![
            FlexManagedPackage::new("Acme.Core", core.clone()),
            FlexManagedPackage::new("Acme.Data", data),
        ]);
        let reporter = Reporter::new().with_quiet(true);

        let written = reconcile_manifest(&manifest, &packages, &reporter).unwrap();
        let content = read(&core);

        assert_eq!(written, Some(1));
        assert!(!content.contains(r#"Include="Acme.Core""#));
        assert!(!content.contains("UsePackageReference_Acme_Core"));
        assert!(content.contains("<!-- Acme.Data - flex reference -->"));
    }

    #[test]
    fn test_manifest_without_flex_dependencies_is_untouched() {
        let original = "<Project>\n<ItemGroup><PackageReference Include=\"Serilog\" /></ItemGroup></Project>";
        let (_temp_dir, manifest, packages) = setup(original);
        let reporter = Reporter::new().with_quiet(true);

        let written = reconcile_manifest(&manifest, &packages, &reporter).unwrap();

        assert_eq!(written, None);
        assert_eq!(read(&manifest.path), original);
    }
}
