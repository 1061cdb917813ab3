//! Project manifest data structures and parsing.
//!
//! A [`ProjectManifest`] is the read-only view of one `.csproj` file: its
//! package identity, whether it produces a package, and the dependency edges
//! it declares. Manifests are built once per scan and never mutated; the
//! reconcilers reload the file when they need to rewrite it.

use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    path::{Path, PathBuf},
};

use crate::{
    constants::{DIRECTORY_BUILD_PROPS_FILE_NAME, MANIFEST_EXTENSION},
    error::{FlexRefError, Result},
    utils::{eq_ignore_case, file_name, include_file_name},
    xml::{Document, NodeId},
};

/// A dependency declared by a project manifest.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DependencyEdge {
    /// A `ProjectReference` item.
    Project {
        /// The raw include path, as written in the manifest.
        include: String,

        /// Last segment of the include path (`Acme.Core.csproj`).
        file_name: String,
    },

    /// A `PackageReference` item.
    Package {
        /// Package identity from the `Include` attribute.
        name: String,

        /// Version from the `Version` attribute or child element, if any.
        version: Option<String>,
    },
}

impl DependencyEdge {
    /// Create a project edge from an include path.
    #[must_use]
    pub fn project(include: &str) -> Self {
        Self::Project {
            include: include.to_string(),
            file_name: include_file_name(include).to_string(),
        }
    }

    /// Create a package edge.
    #[must_use]
    pub fn package(name: &str, version: Option<&str>) -> Self {
        Self::Package {
            name: name.to_string(),
            version: version.map(str::to_string),
        }
    }
}

/// Parsed view of a single `.csproj` file.
///
/// The manifest is packable when it is not explicitly marked
/// `IsPackable=false` and either declares a `PackageId` or is explicitly
/// marked `IsPackable=true`. A packable manifest without an explicit
/// `PackageId` takes its file stem as package identity, which matches what
/// `dotnet pack` does.
#[derive(Clone, Debug)]
pub struct ProjectManifest {
    /// Absolute path to the `.csproj` file. Identifies the manifest.
    pub path: PathBuf,

    /// Package identity, if the manifest has one.
    pub package_id: Option<String>,

    /// Whether the manifest produces a package.
    pub is_packable: bool,

    /// Declared dependencies in document order.
    pub edges: Vec<DependencyEdge>,
}

impl ProjectManifest {
    /// Load and parse the manifest at `path`.
    ///
    /// When the manifest does not set `IsPackable` itself, the value is
    /// inherited from the nearest `Directory.Build.props` between the
    /// manifest's directory and `root` (inclusive).
    ///
    /// # Arguments
    ///
    /// * `path` - Absolute path to the `.csproj` file
    /// * `root` - Workspace root that bounds the `Directory.Build.props` lookup
    ///
    /// # Errors
    ///
    /// Returns [`FlexRefError::Io`] if the file cannot be read and
    /// [`FlexRefError::Xml`] if it is not well-formed XML.
    pub fn load(path: &Path, root: &Path) -> Result<Self> {
        let document = Document::load(path).map_err(|err| FlexRefError::xml(path, err))?;
        let inherited = inherited_is_packable(path, root);

        Ok(Self::from_document(path.to_path_buf(), &document, inherited))
    }

    /// Build a manifest from an already parsed document.
    ///
    /// # Arguments
    ///
    /// * `path` - Path of the manifest the document was loaded from
    /// * `document` - The parsed manifest
    /// * `inherited_is_packable` - `IsPackable` imported from a shared
    ///   properties file, used only when the document does not set it
    #[must_use]
    pub fn from_document(
        path: PathBuf,
        document: &Document,
        inherited_is_packable: Option<bool>,
    ) -> Self {
        let explicit_package_id = last_property_value(document, "PackageId");
        let is_packable_value = last_property_value(document, "IsPackable")
            .and_then(|value| parse_bool(&value))
            .or(inherited_is_packable);

        let is_packable = is_packable_value != Some(false)
            && (explicit_package_id.is_some() || is_packable_value == Some(true));

        let package_id = explicit_package_id.or_else(|| {
            is_packable
                .then(|| path.file_stem().map(|stem| stem.to_string_lossy().into_owned()))
                .flatten()
        });

        Self {
            edges: read_edges(document),
            path,
            package_id,
            is_packable,
        }
    }

    /// The manifest's file name, e.g. `Acme.Core.csproj`.
    #[must_use]
    pub fn file_name(&self) -> String {
        file_name(&self.path)
    }

    /// The package identity, when the manifest is packable and has one.
    #[must_use]
    pub fn packable_id(&self) -> Option<&str> {
        self.package_id.as_deref().filter(|_| self.is_packable)
    }

    /// Whether the file name is `<package id>.csproj` (ignoring case).
    ///
    /// Manifests without a package identity trivially conform.
    #[must_use]
    pub fn has_conventional_file_name(&self) -> bool {
        self.package_id.as_deref().is_none_or(|id| {
            eq_ignore_case(&self.file_name(), &format!("{id}.{MANIFEST_EXTENSION}"))
        })
    }

    /// Whether any `ProjectReference` of this manifest points at `file_name`.
    #[must_use]
    pub fn references_project_file(&self, file_name: &str) -> bool {
        self.edges.iter().any(|edge| match edge {
            DependencyEdge::Project {
                file_name: referenced,
                ..
            } => eq_ignore_case(referenced, file_name),
            DependencyEdge::Package { .. } => false,
        })
    }

    /// Whether any `PackageReference` of this manifest names `package_id`.
    #[must_use]
    pub fn references_package(&self, package_id: &str) -> bool {
        self.edges.iter().any(|edge| match edge {
            DependencyEdge::Package { name, .. } => eq_ignore_case(name, package_id),
            DependencyEdge::Project { .. } => false,
        })
    }
}

impl Display for ProjectManifest {
    /// Formats as `Acme.Core (Acme.Core.csproj)`, or just the file name for
    /// manifests without a package identity.
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match &self.package_id {
            Some(id) => write!(f, "{id} ({})", self.file_name()),
            None => write!(f, "{}", self.file_name()),
        }
    }
}

/// The last non-empty value of property `name` in any `PropertyGroup`.
///
/// Later definitions override earlier ones, as in MSBuild evaluation.
pub(crate) fn last_property_value(document: &Document, name: &str) -> Option<String> {
    document
        .descendants_named(document.root(), "PropertyGroup")
        .into_iter()
        .flat_map(|group| document.child_elements_named(group, name))
        .map(|property| document.text(property).trim().to_string())
        .rev()
        .find(|value| !value.is_empty())
}

fn parse_bool(value: &str) -> Option<bool> {
    if eq_ignore_case(value, "true") {
        Some(true)
    } else if eq_ignore_case(value, "false") {
        Some(false)
    } else {
        None
    }
}

/// `IsPackable` from the nearest `Directory.Build.props` above `manifest`.
///
/// Only the nearest file is consulted, since MSBuild stops at the first one
/// it finds. Unreadable files are treated as not setting the property.
fn inherited_is_packable(manifest: &Path, root: &Path) -> Option<bool> {
    let directory = manifest.parent()?;

    let props = directory
        .ancestors()
        .take_while(|ancestor| ancestor.starts_with(root))
        .map(|ancestor| ancestor.join(DIRECTORY_BUILD_PROPS_FILE_NAME))
        .find(|candidate| candidate.is_file())?;

    let document = Document::load(&props).ok()?;
    last_property_value(&document, "IsPackable").and_then(|value| parse_bool(&value))
}

fn read_edges(document: &Document) -> Vec<DependencyEdge> {
    let mut edges = Vec::new();

    for group in document.descendants_named(document.root(), "ItemGroup") {
        for item in document.child_elements(group) {
            if document.has_name(item, "ProjectReference") {
                edges.extend(include_values(document, item).map(DependencyEdge::project));
            } else if document.has_name(item, "PackageReference") {
                let version = package_version(document, item);
                edges.extend(
                    include_values(document, item)
                        .map(|name| DependencyEdge::package(name, version.as_deref())),
                );
            }
        }
    }

    edges
}

/// The `Include` attribute split into its non-empty `;`-separated entries.
pub(crate) fn include_values(document: &Document, item: NodeId) -> impl Iterator<Item = &str> {
    document
        .attribute(item, "Include")
        .unwrap_or_default()
        .split(';')
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

/// Version of a `PackageReference`, from its attribute or a `<Version>` child.
pub(crate) fn package_version(document: &Document, item: NodeId) -> Option<String> {
    document
        .attribute(item, "Version")
        .map(str::to_string)
        .or_else(|| {
            document
                .first_child_named(item, "Version")
                .map(|version| document.text(version))
        })
        .map(|version| version.trim().to_string())
        .filter(|version| !version.is_empty())
}
