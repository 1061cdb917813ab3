//! Collection management for scanned project manifests.
//!
//! This module provides the `Projects` struct which wraps the manifests found
//! by one workspace scan, in traversal order, and offers the queries the
//! resolver and the `init` summary need.

use crate::{output::Reporter, utils::cmp_ignore_case};

use super::ProjectManifest;

/// The manifests found by one workspace scan, in traversal order.
#[derive(Clone, Debug, Default)]
pub struct Projects(Vec<ProjectManifest>);

impl From<Vec<ProjectManifest>> for Projects {
    /// Create a `Projects` collection from scanned manifests.
    ///
    /// The order of `projects` is kept; the scanner hands them over sorted
    /// by path so every later step is deterministic.
    fn from(projects: Vec<ProjectManifest>) -> Self {
        Self(projects)
    }
}

impl<'a> IntoIterator for &'a Projects {
    type Item = &'a ProjectManifest;
    type IntoIter = std::slice::Iter<'a, ProjectManifest>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl Projects {
    /// Get the number of manifests in the collection.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if the collection is empty.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over the manifests in traversal order.
    pub fn iter(&self) -> std::slice::Iter<'_, ProjectManifest> {
        self.0.iter()
    }

    /// Packable manifests that carry a package identity, in traversal order.
    ///
    /// These are the candidates for flex management.
    pub fn packable(&self) -> impl Iterator<Item = &ProjectManifest> {
        self.0.iter().filter(|project| project.packable_id().is_some())
    }

    /// Packable package identities, sorted case-insensitively.
    #[must_use]
    pub fn packable_ids_sorted(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self
            .packable()
            .filter_map(ProjectManifest::packable_id)
            .collect();
        ids.sort_by(|a, b| cmp_ignore_case(a, b));
        ids
    }

    /// Print the packable projects found by `init`.
    ///
    /// Lists every packable project sorted by package identity and warns
    /// about projects whose file name does not follow the `<id>.csproj`
    /// convention, since their identity cannot be derived from the file name
    /// alone.
    ///
    /// # Output Format
    ///
    /// ```text
    ///   Found 2 packable project(s):
    ///     - Acme.Core (Acme.Core.csproj)
    ///     - Acme.Data (Data.csproj)
    /// ```
    pub fn print_packable_summary(&self, reporter: &Reporter) {
        let mut packable: Vec<&ProjectManifest> = self.packable().collect();
        packable.sort_by(|a, b| {
            cmp_ignore_case(
                a.packable_id().unwrap_or_default(),
                b.packable_id().unwrap_or_default(),
            )
        });

        reporter.info(format!("  Found {} packable project(s):", packable.len()));

        for project in packable {
            reporter.info(format!("    - {project}"));

            if let Some(id) = project.packable_id()
                && !project.has_conventional_file_name()
            {
                reporter.warn(format!(
                    "Package ID '{id}' does not match file name '{}'",
                    project.file_name()
                ));
            }
        }
    }
}
