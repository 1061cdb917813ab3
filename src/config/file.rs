//! Workspace configuration file support.
//!
//! This module reads and creates `FlexRef.config.xml` at the workspace root.
//! The file decides which packable projects become flex-managed.
//!
//! # Example config
//!
//! ```xml
//! <FlexRef>
//!   <AutoDiscover>
//!     <Exclude Name="Acme.Experimental" />
//!   </AutoDiscover>
//!   <Package Name="Acme.Legacy" />
//! </FlexRef>
//! ```
//!
//! `<AutoDiscover>` turns every packable project into a flex-managed package,
//! minus its `<Exclude>` entries. Root-level `<Package>` entries name packages
//! explicitly and may be combined with auto-discovery.

use std::path::{Path, PathBuf};

use crate::{
    constants::CONFIGURATION_FILE_NAME,
    error::{FlexRefError, Result},
    output::Reporter,
    project::Projects,
    xml::{Document, NodeId},
};

const ROOT_TAG: &str = "FlexRef";
const AUTO_DISCOVER_TAG: &str = "AutoDiscover";
const EXCLUDE_TAG: &str = "Exclude";
const PACKAGE_TAG: &str = "Package";
const NAME_ATTRIBUTE: &str = "Name";

/// Parsed content of `FlexRef.config.xml`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Configuration {
    /// Whether every packable project is flex-managed by default.
    pub auto_discover: bool,

    /// Package identities excluded from auto-discovery.
    pub auto_discover_exclusions: Vec<String>,

    /// Package identities listed explicitly, in file order.
    pub explicit_package_names: Vec<String>,
}

/// Location of the configuration file for one workspace root.
#[derive(Clone, Debug)]
pub struct ConfigurationFile {
    path: PathBuf,
}

impl ConfigurationFile {
    /// The configuration file of the workspace rooted at `root`.
    #[must_use]
    pub fn in_directory(root: &Path) -> Self {
        Self {
            path: root.join(CONFIGURATION_FILE_NAME),
        }
    }

    /// Full path of the configuration file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the configuration file exists.
    #[must_use]
    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Load and interpret the configuration file.
    ///
    /// Entries without a `Name` attribute are ignored. Element names are
    /// matched by local name, so a namespaced file is accepted too.
    ///
    /// # Errors
    ///
    /// Returns [`FlexRefError::Io`] if the file cannot be read and
    /// [`FlexRefError::Xml`] if it is malformed or has no root element.
    pub fn load(&self) -> Result<Configuration> {
        let document = Document::load(&self.path).map_err(|err| FlexRefError::xml(&self.path, err))?;
        Ok(Self::interpret(&document))
    }

    fn interpret(document: &Document) -> Configuration {
        let root = document.root();
        let auto_discover = document.first_child_named(root, AUTO_DISCOVER_TAG);

        Configuration {
            auto_discover: auto_discover.is_some(),
            auto_discover_exclusions: auto_discover
                .map(|element| named_entries(document, element, EXCLUDE_TAG))
                .unwrap_or_default(),
            explicit_package_names: named_entries(document, root, PACKAGE_TAG),
        }
    }

    /// Write the default configuration for a freshly scanned workspace.
    ///
    /// The default enables auto-discovery. When packable projects exist, a
    /// comment lists them as explicit `<Package>` entries the user can switch
    /// to instead. The packable projects are printed as a summary first.
    ///
    /// # Errors
    ///
    /// Returns [`FlexRefError::Io`] if the file cannot be written.
    pub fn create_default(&self, projects: &Projects, reporter: &Reporter) -> Result<()> {
        projects.print_packable_summary(reporter);

        Self::default_document(&projects.packable_ids_sorted())
            .save(&self.path)
            .map_err(|err| FlexRefError::io(&self.path, err))?;

        reporter.info(format!("  Created: {}", self.path.display()));
        Ok(())
    }

    fn default_document(sorted_package_ids: &[&str]) -> Document {
        let mut document = Document::with_root(ROOT_TAG);
        let root = document.root();
        document.append_element(root, AUTO_DISCOVER_TAG);

        if !sorted_package_ids.is_empty() {
            let package_lines: Vec<String> = sorted_package_ids
                .iter()
                .map(|id| format!("  <{PACKAGE_TAG} {NAME_ATTRIBUTE}=\"{id}\" />"))
                .collect();
            document.append_comment(
                root,
                &format!(
                    " Alternatively, list packages explicitly instead of using {AUTO_DISCOVER_TAG}:\n{}\n  ",
                    package_lines.join("\n")
                ),
            );
        }

        document
    }
}

/// `Name` attributes of the `tag` children of `parent`, skipping unnamed ones.
fn named_entries(document: &Document, parent: NodeId, tag: &str) -> Vec<String> {
    document
        .child_elements_named(parent, tag)
        .into_iter()
        .filter_map(|element| document.attribute(element, NAME_ATTRIBUTE))
        .map(str::to_string)
        .collect()
}
