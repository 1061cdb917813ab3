//! Directory scanning and manifest discovery.
//!
//! This module traverses a workspace to find `.csproj` manifests and `.slnx`
//! solutions. Traversal is sequential and sorted so results are stable;
//! parsing runs in parallel because it only reads files. A file that fails to
//! parse is reported as a warning and left out, the scan itself never fails.

use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use walkdir::{DirEntry, WalkDir};

use crate::{
    config::ScanOptions,
    constants::{DIRECTORIES_TO_SKIP, MANIFEST_EXTENSION, SOLUTION_EXTENSION},
    error::{FlexRefError, Result},
    output::Reporter,
    project::{ProjectManifest, Projects},
    solution::SolutionGroup,
    utils::eq_ignore_case,
};

/// Directory scanner for workspace manifests and solutions.
///
/// The `Scanner` struct encapsulates the traversal rules (skipped build and
/// tooling directories, optional depth limit) and the parallel parsing of
/// the files it finds.
#[derive(Debug)]
pub struct Scanner {
    /// Configuration options for scanning behavior
    scan_options: ScanOptions,
}

impl Scanner {
    /// Create a new scanner with the specified options.
    ///
    /// # Examples
    ///
    /// ```
    /// # use flexref::{config::ScanOptions, scanner::Scanner};
    /// let scanner = Scanner::new(ScanOptions {
    ///     quiet: true,
    ///     threads: 0,
    ///     max_depth: None,
    /// });
    /// ```
    #[must_use]
    pub const fn new(scan_options: ScanOptions) -> Self {
        Self { scan_options }
    }

    /// Find every file below `root` whose extension is `extension`.
    ///
    /// The extension is compared case-insensitively. Directories named in
    /// [`DIRECTORIES_TO_SKIP`] are not descended into at any depth, although
    /// `root` itself is always scanned. Results are ordered by traversal,
    /// which visits entries sorted by file name. Entries that cannot be read
    /// produce a warning and are left out.
    ///
    /// # Arguments
    ///
    /// * `root` - The directory to start from
    /// * `extension` - File extension without the leading dot
    /// * `reporter` - Receives a warning per unreadable entry
    #[must_use]
    pub fn find_files(&self, root: &Path, extension: &str, reporter: &Reporter) -> Vec<PathBuf> {
        let mut walker = WalkDir::new(root).sort_by_file_name();
        if let Some(max_depth) = self.scan_options.max_depth {
            walker = walker.max_depth(max_depth);
        }

        walker
            .into_iter()
            .filter_entry(|entry| entry.depth() == 0 || !Self::is_skipped_directory(entry))
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(err) => {
                    reporter.warn(Self::unreadable_entry_warning(&err));
                    None
                }
            })
            .filter(|entry| entry.file_type().is_file())
            .filter(|entry| Self::has_extension(entry.path(), extension))
            .map(DirEntry::into_path)
            .collect()
    }

    /// Find and parse every project manifest below `root`.
    ///
    /// Manifests that cannot be parsed produce a
    /// `Could not parse <path>: <reason>` warning and are skipped.
    pub fn scan_manifests(&self, root: &Path, reporter: &Reporter) -> Projects {
        let files = self.find_files(root, MANIFEST_EXTENSION, reporter);
        let manifests = self.parse_all(&files, reporter, "project files", |path| {
            ProjectManifest::load(path, root)
        });

        Projects::from(manifests)
    }

    /// Find and parse every solution file below `root`.
    ///
    /// Solutions that cannot be parsed produce a warning and are skipped.
    pub fn scan_solutions(&self, root: &Path, reporter: &Reporter) -> Vec<SolutionGroup> {
        let files = self.find_files(root, SOLUTION_EXTENSION, reporter);
        self.parse_all(&files, reporter, "solutions", SolutionGroup::load)
    }

    /// Parse `files` in parallel, keeping their order.
    ///
    /// Failures are reported after all files are parsed so warnings appear
    /// in traversal order too.
    fn parse_all<T, F>(&self, files: &[PathBuf], reporter: &Reporter, what: &str, parse: F) -> Vec<T>
    where
        T: Send,
        F: Fn(&Path) -> Result<T> + Sync,
    {
        let progress = self.spinner(&format!("Reading {} {what}...", files.len()));

        let results: Vec<(&PathBuf, Result<T>)> = files
            .par_iter()
            .map(|path| {
                let result = parse(path.as_path());
                progress.tick();
                (path, result)
            })
            .collect();

        progress.finish_and_clear();

        results
            .into_iter()
            .filter_map(|(path, result)| match result {
                Ok(item) => Some(item),
                Err(err) => {
                    reporter.warn(format!(
                        "Could not parse {}: {}",
                        path.display(),
                        Self::reason(&err)
                    ));
                    None
                }
            })
            .collect()
    }

    /// The innermost cause of a parse failure; the path is already reported.
    fn reason(err: &FlexRefError) -> String {
        std::error::Error::source(err).map_or_else(|| err.to_string(), ToString::to_string)
    }

    fn spinner(&self, message: &str) -> ProgressBar {
        if self.scan_options.quiet {
            return ProgressBar::hidden();
        }

        let progress = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
            progress.set_style(style);
        }
        progress.set_message(message.to_string());
        progress.enable_steady_tick(Duration::from_millis(100));
        progress
    }

    /// `Could not read <path>: <reason>` for a traversal failure.
    fn unreadable_entry_warning(err: &walkdir::Error) -> String {
        let reason = err
            .io_error()
            .map_or_else(|| err.to_string(), ToString::to_string);

        match err.path() {
            Some(path) => format!("Could not read {}: {reason}", path.display()),
            None => format!("Could not read directory entry: {reason}"),
        }
    }

    /// Check if an entry is a directory that must not be descended into.
    fn is_skipped_directory(entry: &DirEntry) -> bool {
        entry.file_type().is_dir()
            && entry.file_name().to_str().is_some_and(|name| {
                DIRECTORIES_TO_SKIP
                    .iter()
                    .any(|skipped| eq_ignore_case(name, skipped))
            })
    }

    /// Check if a path has the given extension, ignoring case.
    fn has_extension(path: &Path, extension: &str) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| eq_ignore_case(ext, extension))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    /// Create a quiet scanner with default options.
    fn default_scanner() -> Scanner {
        Scanner::new(ScanOptions {
            quiet: true,
            threads: 1,
            max_depth: None,
        })
    }

    /// Helper to create a file with content, ensuring parent dirs exist.
    fn create_file(path: &Path, content: &str) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }

    fn quiet_reporter() -> Reporter {
        Reporter::new().with_quiet(true)
    }

    fn relative_names(root: &Path, files: &[PathBuf]) -> Vec<String> {
        files
            .iter()
            .map(|file| {
                file.strip_prefix(root)
                    .unwrap()
                    .to_string_lossy()
                    .replace('\\', "/")
            })
            .collect()
    }

    // ── Static helper method tests ──────────────────────────────────────

    #[test]
    fn test_has_extension_ignores_case() {
        assert!(Scanner::has_extension(Path::new("A/A.csproj"), "csproj"));
        assert!(Scanner::has_extension(Path::new("A/A.CSPROJ"), "csproj"));
        assert!(!Scanner::has_extension(Path::new("A/A.csproj.user"), "csproj"));
        assert!(!Scanner::has_extension(Path::new("A/csproj"), "csproj"));
    }

    // ── Traversal ───────────────────────────────────────────────────────

    #[test]
    fn test_find_files_is_sorted_and_skips_build_directories() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path();
        create_file(&root.join("src/Zeta/Zeta.csproj"), "<Project />");
        create_file(&root.join("src/Alpha/Alpha.csproj"), "<Project />");
        create_file(&root.join("src/Alpha/bin/Debug/Copy.csproj"), "<Project />");
        create_file(&root.join("src/Alpha/OBJ/Gen.csproj"), "<Project />");
        create_file(&root.join("node_modules/pkg/Pkg.csproj"), "<Project />");
        create_file(&root.join(".git/Hidden.csproj"), "<Project />");
        create_file(&root.join(".vs/Cache.csproj"), "<Project />");
        create_file(&root.join(".idea/Ide.csproj"), "<Project />");
        create_file(&root.join("Root.csproj"), "<Project />");

        let files = default_scanner().find_files(root, "csproj", &quiet_reporter());

        assert_eq!(
            relative_names(root, &files),
            vec!["Root.csproj", "src/Alpha/Alpha.csproj", "src/Zeta/Zeta.csproj"]
        );
    }

    #[test]
    fn test_unreadable_root_warns() {
        let tmp = TempDir::new().unwrap();
        let reporter = Reporter::new().with_quiet(true);

        let files = default_scanner().find_files(&tmp.path().join("missing"), "csproj", &reporter);

        assert!(files.is_empty());
        let warnings = reporter.warnings();
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].starts_with("Could not read "));
        assert!(warnings[0].contains("missing"));
    }

    #[test]
    fn test_skipped_name_as_root_is_still_scanned() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().join("obj");
        create_file(&root.join("A/A.csproj"), "<Project />");

        let files = default_scanner().find_files(&root, "csproj", &quiet_reporter());

        assert_eq!(files.len(), 1);
    }

    #[test]
    fn test_skipped_name_as_file_is_not_a_directory() {
        let tmp = TempDir::new().unwrap();
        create_file(&tmp.path().join("obj.csproj"), "<Project />");

        let files = default_scanner().find_files(tmp.path(), "csproj", &quiet_reporter());

        assert_eq!(files.len(), 1);
    }

    #[test]
    fn test_max_depth_limits_traversal() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path();
        create_file(&root.join("Top.slnx"), "<Solution />");
        create_file(&root.join("a/b/Deep.slnx"), "<Solution />");

        let scanner = Scanner::new(ScanOptions {
            quiet: true,
            threads: 1,
            max_depth: Some(1),
        });

        assert_eq!(
            relative_names(root, &scanner.find_files(root, "slnx", &quiet_reporter())),
            vec!["Top.slnx"]
        );
    }

    #[test]
    fn test_scan_directory_with_spaces_in_path() {
        let tmp = TempDir::new().unwrap();
        let base = tmp.path().join("path with spaces");
        create_file(
            &base.join("my project/My.Lib.csproj"),
            "<Project><PropertyGroup><IsPackable>true</IsPackable></PropertyGroup></Project>",
        );

        let reporter = Reporter::new().with_quiet(true);
        let projects = default_scanner().scan_manifests(&base, &reporter);

        assert_eq!(projects.len(), 1);
        assert_eq!(
            projects.iter().next().unwrap().package_id.as_deref(),
            Some("My.Lib")
        );
    }

    // ── Parsing ─────────────────────────────────────────────────────────

    #[test]
    fn test_unparseable_manifest_warns_and_is_skipped() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path();
        create_file(&root.join("A/A.csproj"), "<Project />");
        create_file(&root.join("B/B.csproj"), "<Project><ItemGroup></Project>");
        create_file(&root.join("C/C.csproj"), "<Project />");

        let reporter = Reporter::new().with_quiet(true);
        let projects = default_scanner().scan_manifests(root, &reporter);

        let names: Vec<String> = projects.iter().map(ProjectManifest::file_name).collect();
        assert_eq!(names, vec!["A.csproj", "C.csproj"]);

        let warnings = reporter.warnings();
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].starts_with("Could not parse "));
        assert!(warnings[0].contains("B.csproj"));
    }

    #[test]
    fn test_scan_solutions() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path();
        create_file(
            &root.join("All.slnx"),
            r#"<Solution><Project Path="src\A\A.csproj" /></Solution>"#,
        );
        create_file(&root.join("Broken.slnx"), "<Solution>");

        let reporter = Reporter::new().with_quiet(true);
        let solutions = default_scanner().scan_solutions(root, &reporter);

        assert_eq!(solutions.len(), 1);
        assert_eq!(solutions[0].member_file_names, vec!["A.csproj"]);
        assert_eq!(reporter.warnings().len(), 1);
    }
}
