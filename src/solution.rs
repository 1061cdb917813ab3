//! Solution membership model.
//!
//! A `.slnx` solution lists the projects it builds as `<Project Path="...">`
//! elements, possibly nested in `<Folder>` elements. Only the file name of
//! each member matters: membership decides which flex-managed packages are
//! *absent* from the solution and therefore have to be consumed as packages.

use std::path::{Path, PathBuf};

use crate::{
    constants::SETTINGS_FILE_SUFFIX,
    error::{FlexRefError, Result},
    resolver::FlexManagedPackage,
    utils::{cmp_ignore_case, eq_ignore_case, include_file_name},
    xml::Document,
};

/// The projects built together by one solution file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SolutionGroup {
    /// Absolute path to the `.slnx` file.
    pub path: PathBuf,

    /// File names of member projects, in document order.
    pub member_file_names: Vec<String>,
}

impl SolutionGroup {
    /// Load and parse the solution at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`FlexRefError::Io`] if the file cannot be read and
    /// [`FlexRefError::Xml`] if it is not well-formed XML.
    pub fn load(path: &Path) -> Result<Self> {
        let document = Document::load(path).map_err(|err| FlexRefError::xml(path, err))?;
        Ok(Self::from_document(path.to_path_buf(), &document))
    }

    /// Build a solution group from an already parsed document.
    #[must_use]
    pub fn from_document(path: PathBuf, document: &Document) -> Self {
        let member_file_names = document
            .descendants_named(document.root(), "Project")
            .into_iter()
            .filter_map(|project| document.attribute(project, "Path"))
            .map(include_file_name)
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .collect();

        Self {
            path,
            member_file_names,
        }
    }

    /// Whether a project with `file_name` is part of the solution.
    #[must_use]
    pub fn contains(&self, file_name: &str) -> bool {
        self.member_file_names
            .iter()
            .any(|member| eq_ignore_case(member, file_name))
    }

    /// The flex-managed packages whose projects are not in this solution,
    /// sorted by package identity.
    #[must_use]
    pub fn absent_packages<'a>(
        &self,
        packages: &'a [FlexManagedPackage],
    ) -> Vec<&'a FlexManagedPackage> {
        let mut absent: Vec<&FlexManagedPackage> = packages
            .iter()
            .filter(|package| !self.contains(&package.manifest_file_name))
            .collect();
        absent.sort_by(|a, b| cmp_ignore_case(&a.package_id, &b.package_id));
        absent
    }

    /// Path of the NCrunch settings file that belongs to this solution.
    ///
    /// `Acme.slnx` maps to `Acme.v3.ncrunchsolution` in the same directory.
    #[must_use]
    pub fn settings_path(&self) -> PathBuf {
        let stem = self
            .path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.path.with_file_name(format!("{stem}{SETTINGS_FILE_SUFFIX}"))
    }
}
