//! Workspace operations.
//!
//! A [`Workspace`] is one root directory plus the options and reporter used
//! to operate on it. Each operation scans the workspace exactly once and
//! keeps the results for its own duration; nothing is cached between
//! operations.
//!
//! - `init` writes the default configuration and the build-logic fragment.
//! - `sync` regenerates every managed file from the configuration.

use std::path::{Path, PathBuf};

use crate::{
    config::{ConfigurationFile, ScanOptions},
    error::{FlexRefError, Result},
    output::Reporter,
    project::Projects,
    reconcile::{reconcile_manifest, reconcile_settings, reconcile_shared_properties, write_fragment},
    resolver::FlexManagedPackages,
    scanner::Scanner,
};

/// Outcome of a successful `init`.
#[derive(Debug)]
pub struct InitReport {
    /// The configuration file that was created.
    pub configuration_path: PathBuf,

    /// The build-logic fragment that was written.
    pub fragment_path: PathBuf,

    /// Package identities of all packable projects, sorted.
    pub packable_ids: Vec<String>,
}

/// Outcome of a successful `sync`.
#[derive(Debug)]
pub struct SyncReport {
    /// The resolved flex-managed packages.
    pub packages: FlexManagedPackages,

    /// The shared properties file that was written.
    pub shared_properties_path: PathBuf,

    /// Manifests that were rewritten, with their number of flex references.
    pub updated_manifests: Vec<(PathBuf, usize)>,

    /// Solution settings files that were created or updated.
    pub settings_paths: Vec<PathBuf>,
}

/// A workspace root prepared for `init` or `sync`.
#[derive(Debug)]
pub struct Workspace<'r> {
    root: PathBuf,
    scanner: Scanner,
    reporter: &'r Reporter,
}

impl<'r> Workspace<'r> {
    /// Open the workspace rooted at `root`.
    ///
    /// The root is canonicalized so every reported path is absolute.
    ///
    /// # Errors
    ///
    /// Returns [`FlexRefError::RootDirectoryNotFound`] if `root` is not an
    /// existing directory.
    pub fn open(root: &Path, scan_options: ScanOptions, reporter: &'r Reporter) -> Result<Self> {
        if !root.is_dir() {
            return Err(FlexRefError::RootDirectoryNotFound(root.to_path_buf()));
        }

        let root = root
            .canonicalize()
            .map_err(|_| FlexRefError::RootDirectoryNotFound(root.to_path_buf()))?;

        Ok(Self {
            root,
            scanner: Scanner::new(scan_options),
            reporter,
        })
    }

    /// The canonical workspace root.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create the default configuration and write the build-logic fragment.
    ///
    /// # Errors
    ///
    /// Returns [`FlexRefError::ConfigurationAlreadyExists`] before anything is
    /// written if the workspace already has a configuration, or an I/O error
    /// if a file cannot be written.
    pub fn init(&self) -> Result<InitReport> {
        let configuration = ConfigurationFile::in_directory(&self.root);
        if configuration.exists() {
            return Err(FlexRefError::ConfigurationAlreadyExists(
                configuration.path().to_path_buf(),
            ));
        }

        let projects = self.scan_projects();
        configuration.create_default(&projects, self.reporter)?;
        let fragment_path = write_fragment(&self.root, self.reporter)?;

        Ok(InitReport {
            configuration_path: configuration.path().to_path_buf(),
            fragment_path,
            packable_ids: projects
                .packable_ids_sorted()
                .into_iter()
                .map(str::to_string)
                .collect(),
        })
    }

    /// Regenerate every managed file from the configuration.
    ///
    /// Files are written in a fixed order: the build-logic fragment, the
    /// shared properties file, every manifest with flex-managed
    /// dependencies, then the settings file of every solution. A failure
    /// stops the operation; files written before it stay written.
    ///
    /// # Errors
    ///
    /// Returns [`FlexRefError::ConfigurationNotFound`] if the workspace has
    /// no configuration, or any read, parse or write error of a managed file.
    pub fn sync(&self) -> Result<SyncReport> {
        let configuration = ConfigurationFile::in_directory(&self.root);
        if !configuration.exists() {
            return Err(FlexRefError::ConfigurationNotFound(
                configuration.path().to_path_buf(),
            ));
        }

        let projects = self.scan_projects();
        let packages = FlexManagedPackages::resolve(&configuration.load()?, &projects, self.reporter);
        packages.print_summary(self.reporter);

        write_fragment(&self.root, self.reporter)?;
        let shared_properties_path =
            reconcile_shared_properties(&self.root, &packages, self.reporter)?;

        let mut updated_manifests = Vec::new();
        for manifest in &projects {
            if let Some(count) = reconcile_manifest(manifest, &packages, self.reporter)? {
                updated_manifests.push((manifest.path.clone(), count));
            }
        }

        let mut settings_paths = Vec::new();
        for solution in self.scanner.scan_solutions(&self.root, self.reporter) {
            settings_paths.push(reconcile_settings(&solution, &packages, self.reporter)?);
        }

        Ok(SyncReport {
            packages,
            shared_properties_path,
            updated_manifests,
            settings_paths,
        })
    }

    fn scan_projects(&self) -> Projects {
        self.scanner.scan_manifests(&self.root, self.reporter)
    }
}
