//! Fixed file names, extensions and prefixes shared by every component.
//!
//! These values are part of the on-disk contract with MSBuild, NCrunch and
//! the embedded `FlexRef.props` fragment, so they must not change between
//! releases.

/// Workspace configuration file, at the workspace root.
pub const CONFIGURATION_FILE_NAME: &str = "FlexRef.config.xml";

/// Build-logic fragment written below [`BUILD_DIRECTORY_NAME`].
pub const PROPS_FILE_NAME: &str = "FlexRef.props";

/// Directory (relative to the workspace root) that receives [`PROPS_FILE_NAME`].
pub const BUILD_DIRECTORY_NAME: &str = "build";

/// Shared MSBuild properties file at the workspace root.
pub const DIRECTORY_BUILD_PROPS_FILE_NAME: &str = "Directory.Build.props";

/// Prefix of every generated switch property.
pub const SWITCH_PROPERTY_PREFIX: &str = "UsePackageReference_";

/// MSBuild property populated by the fragment with `|File.csproj|` tokens.
pub const SOLUTION_PROJECTS_PROPERTY: &str = "_FlexRef_SolutionProjects";

/// Separator around each project file name inside [`SOLUTION_PROJECTS_PROPERTY`].
pub const SOLUTION_PROJECTS_SEPARATOR: char = '|';

/// Version written for generated package references without a known version.
pub const WILDCARD_VERSION: &str = "*-*";

/// Extension of project manifests (without the dot).
pub const MANIFEST_EXTENSION: &str = "csproj";

/// Extension of solution files (without the dot).
pub const SOLUTION_EXTENSION: &str = "slnx";

/// Suffix that replaces a solution file's extension to name its NCrunch settings.
pub const SETTINGS_FILE_SUFFIX: &str = ".v3.ncrunchsolution";

/// Directory names never descended into while scanning (compared case-insensitively).
pub const DIRECTORIES_TO_SKIP: [&str; 6] = ["bin", "obj", "node_modules", ".git", ".vs", ".idea"];
