//! Reference resolution.
//!
//! Combines the workspace configuration with the scanned manifests to decide
//! which packable projects are flex-managed, and answers which of them a
//! given manifest depends on.
//!
//! ## Resolution order
//!
//! 1. Candidates are the packable manifests with a package identity, in scan
//!    order.
//! 2. With auto-discovery on, every candidate not excluded is taken.
//! 3. Explicit `<Package>` entries are added next, skipping identities that
//!    are already resolved. Unknown names produce a warning.
//! 4. Packages whose manifest is not named `<id>.csproj` produce a warning.
//! 5. The result is sorted by package identity, ignoring case.

use std::path::PathBuf;

use crate::{
    config::Configuration,
    constants::{MANIFEST_EXTENSION, SWITCH_PROPERTY_PREFIX},
    output::Reporter,
    project::{ProjectManifest, Projects},
    utils::{cmp_ignore_case, eq_ignore_case, file_name},
};

/// A packable project whose consumers switch between project and package
/// references.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FlexManagedPackage {
    /// Package identity, e.g. `Acme.Core`.
    pub package_id: String,

    /// Absolute path of the manifest that produces the package.
    pub manifest_path: PathBuf,

    /// File name of that manifest, e.g. `Acme.Core.csproj`.
    pub manifest_file_name: String,

    /// MSBuild switch property, e.g. `UsePackageReference_Acme_Core`.
    pub property_name: String,
}

impl FlexManagedPackage {
    /// Create a package record for `package_id` produced by `manifest_path`.
    #[must_use]
    pub fn new(package_id: &str, manifest_path: PathBuf) -> Self {
        Self {
            package_id: package_id.to_string(),
            manifest_file_name: file_name(&manifest_path),
            property_name: switch_property_name(package_id),
            manifest_path,
        }
    }

    /// The file name this package's manifest is expected to have.
    #[must_use]
    pub fn expected_manifest_file_name(&self) -> String {
        format!("{}.{MANIFEST_EXTENSION}", self.package_id)
    }
}

/// The MSBuild property that switches consumers of `package_id` to the
/// package form.
///
/// Every character that is not valid in an MSBuild property name is replaced
/// by `_`.
///
/// # Examples
///
/// ```
/// # use flexref::resolver::switch_property_name;
/// assert_eq!(
///     switch_property_name("Acme.Core-Utils"),
///     "UsePackageReference_Acme_Core_Utils"
/// );
/// ```
#[must_use]
pub fn switch_property_name(package_id: &str) -> String {
    let sanitized: String = package_id
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect();
    format!("{SWITCH_PROPERTY_PREFIX}{sanitized}")
}

/// The flex-managed packages of a workspace, sorted by identity.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FlexManagedPackages(Vec<FlexManagedPackage>);

impl From<Vec<FlexManagedPackage>> for FlexManagedPackages {
    fn from(mut packages: Vec<FlexManagedPackage>) -> Self {
        packages.sort_by(|a, b| cmp_ignore_case(&a.package_id, &b.package_id));
        Self(packages)
    }
}

impl FlexManagedPackages {
    /// Resolve the flex-managed packages for `projects` under `configuration`.
    ///
    /// Warnings about unknown explicit packages and unconventional manifest
    /// file names go to `reporter`; they never abort resolution.
    #[must_use]
    pub fn resolve(configuration: &Configuration, projects: &Projects, reporter: &Reporter) -> Self {
        let candidates: Vec<(&str, &ProjectManifest)> = projects
            .packable()
            .filter_map(|project| project.packable_id().map(|id| (id, project)))
            .collect();

        let mut resolved: Vec<FlexManagedPackage> = Vec::new();

        if configuration.auto_discover {
            for &(id, project) in &candidates {
                let excluded = configuration
                    .auto_discover_exclusions
                    .iter()
                    .any(|exclusion| eq_ignore_case(exclusion, id));

                if !excluded && !contains_id(&resolved, id) {
                    resolved.push(FlexManagedPackage::new(id, project.path.clone()));
                }
            }
        }

        for name in &configuration.explicit_package_names {
            if contains_id(&resolved, name) {
                continue;
            }

            match candidates.iter().find(|(id, _)| eq_ignore_case(id, name)) {
                Some(&(id, project)) => {
                    resolved.push(FlexManagedPackage::new(id, project.path.clone()));
                }
                None => reporter.warn(format!(
                    "Explicit package '{name}' was not found in any project."
                )),
            }
        }

        for package in &resolved {
            let expected = package.expected_manifest_file_name();
            if !eq_ignore_case(&package.manifest_file_name, &expected) {
                reporter.warn(format!(
                    "Package '{}' is in project file '{}' (expected '{expected}')",
                    package.package_id, package.manifest_file_name
                ));
            }
        }

        Self::from(resolved)
    }

    /// The packages in identity order.
    #[must_use]
    pub fn as_slice(&self) -> &[FlexManagedPackage] {
        &self.0
    }

    /// Iterate over the packages in identity order.
    pub fn iter(&self) -> std::slice::Iter<'_, FlexManagedPackage> {
        self.0.iter()
    }

    /// Number of flex-managed packages.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no package is flex-managed.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The flex-managed packages `manifest` depends on, sorted by identity.
    ///
    /// A package matches when the manifest references its project file by
    /// name or references the package by identity. A manifest never depends
    /// on the package it produces itself.
    #[must_use]
    pub fn referenced_by(&self, manifest: &ProjectManifest) -> Vec<&FlexManagedPackage> {
        self.0
            .iter()
            .filter(|package| package.manifest_path != manifest.path)
            .filter(|package| {
                manifest.references_project_file(&package.manifest_file_name)
                    || manifest.references_package(&package.package_id)
            })
            .collect()
    }

    /// Print the resolved packages, one per line.
    pub fn print_summary(&self, reporter: &Reporter) {
        reporter.info(format!("  Flex-managed package(s): {}", self.0.len()));
        for package in &self.0 {
            reporter.info(format!(
                "    - {} ({})",
                package.package_id, package.manifest_file_name
            ));
        }
    }
}

fn contains_id(packages: &[FlexManagedPackage], id: &str) -> bool {
    packages
        .iter()
        .any(|package| eq_ignore_case(&package.package_id, id))
}

impl<'a> IntoIterator for &'a FlexManagedPackages {
    type Item = &'a FlexManagedPackage;
    type IntoIter = std::slice::Iter<'a, FlexManagedPackage>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml::Document;

    fn create_manifest(path: &str, xml: &str) -> ProjectManifest {
        let document = Document::parse(xml).unwrap();
        ProjectManifest::from_document(PathBuf::from(path), &document, None)
    }

    fn packable(path: &str, id: &str) -> ProjectManifest {
        create_manifest(
            path,
            &format!("<Project><PropertyGroup><PackageId>{id}</PackageId></PropertyGroup></Project>"),
        )
    }

    fn auto_discover() -> Configuration {
        Configuration {
            auto_discover: true,
            ..Configuration::default()
        }
    }

    fn ids(packages: &FlexManagedPackages) -> Vec<&str> {
        packages.iter().map(|p| p.package_id.as_str()).collect()
    }

    // ── Switch property names ───────────────────────────────────────────

    #[test]
    fn test_switch_property_name_sanitizes_identity() {
        assert_eq!(switch_property_name("Acme.Core"), "UsePackageReference_Acme_Core");
        assert_eq!(
            switch_property_name("Acme.Core-Utils"),
            "UsePackageReference_Acme_Core_Utils"
        );
        assert_eq!(switch_property_name("A+B c"), "UsePackageReference_A_B_c");
        assert_eq!(switch_property_name("Under_Score"), "UsePackageReference_Under_Score");
    }

    #[test]
    fn test_new_package_derives_fields() {
        let package = FlexManagedPackage::new("Acme.Core", PathBuf::from("/ws/Core/Acme.Core.csproj"));

        assert_eq!(package.manifest_file_name, "Acme.Core.csproj");
        assert_eq!(package.property_name, "UsePackageReference_Acme_Core");
        assert_eq!(package.expected_manifest_file_name(), "Acme.Core.csproj");
    }

    // ── Resolution ──────────────────────────────────────────────────────

    #[test]
    fn test_auto_discover_takes_all_packable_sorted() {
        let projects = Projects::from(vec![
            packable("/ws/b/Beta.csproj", "Beta"),
            create_manifest("/ws/app/App.csproj", "<Project />"),
            packable("/ws/a/alpha.csproj", "alpha"),
        ]);
        let reporter = Reporter::new().with_quiet(true);

        let packages = FlexManagedPackages::resolve(&auto_discover(), &projects, &reporter);

        assert_eq!(ids(&packages), vec!["alpha", "Beta"]);
        assert!(reporter.warnings().is_empty());
    }

    #[test]
    fn test_auto_discover_exclusions_ignore_case() {
        let projects = Projects::from(vec![
            packable("/ws/A/A.csproj", "A"),
            packable("/ws/B/B.csproj", "B"),
        ]);
        let config = Configuration {
            auto_discover: true,
            auto_discover_exclusions: vec!["b".to_string()],
            explicit_package_names: vec![],
        };
        let reporter = Reporter::new().with_quiet(true);

        let packages = FlexManagedPackages::resolve(&config, &projects, &reporter);

        assert_eq!(ids(&packages), vec!["A"]);
    }

    #[test]
    fn test_explicit_and_auto_discover_deduplicate() {
        let projects = Projects::from(vec![packable("/ws/A/A.csproj", "A")]);
        let config = Configuration {
            auto_discover: true,
            auto_discover_exclusions: vec![],
            explicit_package_names: vec!["a".to_string(), "A".to_string()],
        };
        let reporter = Reporter::new().with_quiet(true);

        let packages = FlexManagedPackages::resolve(&config, &projects, &reporter);

        assert_eq!(packages.len(), 1);
        assert!(reporter.warnings().is_empty());
    }

    #[test]
    fn test_explicit_can_re_add_excluded_package() {
        let projects = Projects::from(vec![packable("/ws/A/A.csproj", "A")]);
        let config = Configuration {
            auto_discover: true,
            auto_discover_exclusions: vec!["A".to_string()],
            explicit_package_names: vec!["A".to_string()],
        };
        let reporter = Reporter::new().with_quiet(true);

        let packages = FlexManagedPackages::resolve(&config, &projects, &reporter);

        assert_eq!(ids(&packages), vec!["A"]);
    }

    #[test]
    fn test_unknown_explicit_package_warns() {
        let projects = Projects::from(vec![packable("/ws/A/A.csproj", "A")]);
        let config = Configuration {
            explicit_package_names: vec!["A".to_string(), "Ghost".to_string()],
            ..Configuration::default()
        };
        let reporter = Reporter::new().with_quiet(true);

        let packages = FlexManagedPackages::resolve(&config, &projects, &reporter);

        assert_eq!(ids(&packages), vec!["A"]);
        assert_eq!(
            reporter.warnings(),
            vec!["Explicit package 'Ghost' was not found in any project."]
        );
    }

    #[test]
    fn test_unconventional_file_name_warns_but_resolves() {
        let projects = Projects::from(vec![packable("/ws/Core/Core.csproj", "Acme.Core")]);
        let reporter = Reporter::new().with_quiet(true);

        let packages = FlexManagedPackages::resolve(&auto_discover(), &projects, &reporter);

        assert_eq!(ids(&packages), vec!["Acme.Core"]);
        assert_eq!(
            reporter.warnings(),
            vec!["Package 'Acme.Core' is in project file 'Core.csproj' (expected 'Acme.Core.csproj')"]
        );
    }

    #[test]
    fn test_no_configuration_resolves_nothing() {
        let projects = Projects::from(vec![packable("/ws/A/A.csproj", "A")]);
        let reporter = Reporter::new().with_quiet(true);

        let packages =
            FlexManagedPackages::resolve(&Configuration::default(), &projects, &reporter);

        assert!(packages.is_empty());
    }

    // ── Referenced packages ─────────────────────────────────────────────

    #[test]
    fn test_referenced_by_matches_project_and_package_edges() {
        let packages = FlexManagedPackages::from(vec![
            FlexManagedPackage::new("Acme.Data", PathBuf::from("/ws/Data/Acme.Data.csproj")),
            FlexManagedPackage::new("Acme.Core", PathBuf::from("/ws/Core/Acme.Core.csproj")),
            FlexManagedPackage::new("Acme.Web", PathBuf::from("/ws/Web/Acme.Web.csproj")),
        ]);
        let consumer = create_manifest(
            "/ws/App/App.csproj",
            r#"<Project><ItemGroup>
                 <PackageReference Include="acme.data" Version="1.0.0" />
                 <ProjectReference Include="..\Core\ACME.CORE.csproj" />
               </ItemGroup></Project>"#,
        );

        let found: Vec<_> = packages
            .referenced_by(&consumer)
            .into_iter()
            .map(|p| p.package_id.as_str())
            .collect();

        assert_eq!(found, vec!["Acme.Core", "Acme.Data"]);
    }

    #[test]
    fn test_referenced_by_skips_own_package() {
        let packages = FlexManagedPackages::from(vec![FlexManagedPackage::new(
            "Acme.Core",
            PathBuf::from("/ws/Core/Acme.Core.csproj"),
        )]);
        let own = create_manifest(
            "/ws/Core/Acme.Core.csproj",
            r#"<Project><ItemGroup><PackageReference Include="Acme.Core" /></ItemGroup></Project>"#,
        );

        assert!(packages.referenced_by(&own).is_empty());
    }
}
